// tests/pipeline.rs
use std::cell::Cell;
use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use rift_scrape::card::{Field, RawCardRecord};
use rift_scrape::config::options::{FetchOptions, SetDef};
use rift_scrape::core::net::ArchiveClient;
use rift_scrape::error::{Error, FetchError, StoreError};
use rift_scrape::progress::{NullProgress, Progress};
use rift_scrape::runner;
use rift_scrape::scrape::{ArchiveFetcher, CardSource};
use rift_scrape::store::JsonStore;
use serde_json::{Value, json};

fn tmp_dir(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("rift_pipeline_{}", name));
    let _ = fs::remove_dir_all(&p);
    fs::create_dir_all(&p).unwrap();
    p
}

/// Answers one request with `status` and `body`; the request head comes back on the channel.
fn serve_once(status: &'static str, body: &'static str) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let (mut conn, _) = listener.accept().unwrap();
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = conn.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            head.extend_from_slice(&buf[..n]);
        }
        let resp = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/jsonl\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        conn.write_all(resp.as_bytes()).unwrap();
        let _ = tx.send(String::from_utf8_lossy(&head).into_owned());
    });
    (format!("http://{addr}"), rx)
}

fn fetcher_for(base_url: String) -> ArchiveFetcher {
    let opts = FetchOptions { base_url, timeout_secs: 5, ..FetchOptions::default() };
    ArchiveFetcher::new(ArchiveClient::new(&opts).unwrap())
}

fn sets() -> Vec<SetDef> {
    vec![
        SetDef::new("origins", "OGN", "riftbound_origins.json"),
        SetDef::new("proving_grounds", "OGS", "riftbound_proving_grounds.json"),
    ]
}

struct StaticSource {
    cards: Vec<Value>,
    calls: Cell<usize>,
}

impl StaticSource {
    fn new(cards: Value) -> Self {
        Self { cards: cards.as_array().unwrap().clone(), calls: Cell::new(0) }
    }
}

impl CardSource for StaticSource {
    fn fetch_all(&self) -> Result<Vec<RawCardRecord>, FetchError> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.cards.iter().filter_map(|c| RawCardRecord::from_value(c.clone())).collect())
    }
}

struct FailingSource;

impl CardSource for FailingSource {
    fn fetch_all(&self) -> Result<Vec<RawCardRecord>, FetchError> {
        Err(FetchError::Status { status: 503, url: "http://archive.test".into() })
    }
}

#[derive(Default)]
struct Recorder {
    done: Vec<String>,
    failed: Vec<String>,
    finished: bool,
}

impl Progress for Recorder {
    fn item_done(&mut self, set_key: &str) {
        self.done.push(set_key.to_string());
    }
    fn item_failed(&mut self, set_key: &str, _err: &str) {
        self.failed.push(set_key.to_string());
    }
    fn finish(&mut self) {
        self.finished = true;
    }
}

fn archive() -> StaticSource {
    StaticSource::new(json!([
        {
            "name": "Bolt", "type": "Spell", "description": "Deals 3 damage.",
            "cardVariants": [{ "variantNumber": "OGN-010", "artist": "Y" }]
        },
        {
            "name": "Garen", "type": "Unit", "description": "Stand firm.",
            "cardVariants": [{ "variantNumber": "OGN-001", "flavorText": "Demacia!", "artist": "Z" }]
        },
        {
            "name": "Shield", "type": "Gear", "description": "Block.",
            "cardVariants": [{ "variantNumber": "OGS-003", "artist": "S" }]
        }
    ]))
}

fn write_catalogs(dir: &PathBuf) {
    fs::write(
        dir.join("riftbound_origins.json"),
        r#"[{"name":"Bolt","description":null,"artist":"X"},{"name":"Garen"},{"name":"Lonely"}]"#,
    )
    .unwrap();
    fs::write(dir.join("riftbound_proving_grounds.json"), r#"[{"name":"Shield"}]"#).unwrap();
}

fn read(path: PathBuf) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn merge_set_fills_and_saves() {
    let dir = tmp_dir("merge_set");
    write_catalogs(&dir);
    let store = JsonStore::new(dir.clone(), sets());
    let src = archive();

    let r = runner::merge_set(&src, &store, &sets()[0], &Field::ALL, &mut NullProgress).unwrap();
    assert_eq!(r.set_key, "origins");
    assert_eq!(r.entries_total, 3);
    assert_eq!(r.entries_updated, 2);
    assert_eq!(r.unmatched, vec!["Lonely".to_string()]);

    let saved = read(dir.join("riftbound_origins.json"));
    assert_eq!(saved[0]["description"], "Deals 3 damage.");
    assert_eq!(saved[0]["artist"], "X");
    assert_eq!(saved[1]["flavor_text"], "Demacia!");
    assert!(dir.join("riftbound_origins_backup.json").is_file());
    // other set untouched
    assert_eq!(fs::read_to_string(dir.join("riftbound_proving_grounds.json")).unwrap(), r#"[{"name":"Shield"}]"#);
}

#[test]
fn merge_all_fetches_once() {
    let dir = tmp_dir("merge_all");
    write_catalogs(&dir);
    let store = JsonStore::new(dir.clone(), sets());
    let src = archive();
    let mut rec = Recorder::default();

    let results = runner::merge_all(&src, &store, &sets(), &Field::ALL, &mut rec).unwrap();
    assert_eq!(src.calls.get(), 1);
    assert_eq!(results.len(), 2);
    assert_eq!(results[1].set_key, "proving_grounds");
    assert_eq!(results[1].entries_updated, 1);
    assert_eq!(rec.done, vec!["origins", "proving_grounds"]);
    assert!(rec.finished);

    assert_eq!(read(dir.join("riftbound_proving_grounds.json"))[0]["artist"], "S");
}

#[test]
fn fetch_failure_leaves_catalog_byte_identical() {
    let dir = tmp_dir("fetch_fail");
    write_catalogs(&dir);
    let before = fs::read(dir.join("riftbound_origins.json")).unwrap();
    let store = JsonStore::new(dir.clone(), sets());

    let err = runner::merge_set(&FailingSource, &store, &sets()[0], &Field::ALL, &mut NullProgress)
        .unwrap_err();
    assert!(matches!(err, Error::Fetch(FetchError::Status { status: 503, .. })));
    assert_eq!(fs::read(dir.join("riftbound_origins.json")).unwrap(), before);
    assert!(!dir.join("riftbound_origins_backup.json").exists());

    let mut rec = Recorder::default();
    let err = runner::merge_all(&FailingSource, &store, &sets(), &Field::ALL, &mut rec).unwrap_err();
    assert!(matches!(err, Error::Fetch(_)));
    assert!(rec.done.is_empty());
    assert_eq!(rec.failed, vec!["fetch"]);
    assert_eq!(fs::read(dir.join("riftbound_origins.json")).unwrap(), before);
}

#[test]
fn missing_catalog_aborts_before_fetch() {
    let dir = tmp_dir("missing");
    fs::write(dir.join("riftbound_origins.json"), "[]").unwrap();
    let store = JsonStore::new(dir.clone(), sets());
    let src = archive();
    let mut rec = Recorder::default();

    let err = runner::merge_all(&src, &store, &sets(), &Field::ALL, &mut rec).unwrap_err();
    assert!(matches!(err, Error::Store(StoreError::Missing(_))));
    assert_eq!(src.calls.get(), 0);
    assert_eq!(rec.failed, vec!["proving_grounds"]);
    assert!(!dir.join("riftbound_origins_backup.json").exists());

    let err = runner::merge_set(&src, &store, &sets()[1], &Field::ALL, &mut NullProgress).unwrap_err();
    assert!(matches!(err, Error::Store(StoreError::Missing(_))));
    assert_eq!(src.calls.get(), 0);
}

#[test]
fn probe_counts_sets_and_picks_a_sample() {
    let p = runner::probe(&archive(), &mut NullProgress).unwrap();
    assert_eq!(p.total, 3);
    assert_eq!(p.per_set, vec![("OGN".to_string(), 2), ("OGS".to_string(), 1)]);
    let s = p.sample.unwrap();
    assert_eq!(s.name, "Bolt");
    assert_eq!(s.variant.as_deref(), Some("OGN-010"));
    assert_eq!(s.fields.artist.as_deref(), Some("Y"));
}

#[test]
fn fetch_by_prefix_is_case_sensitive() {
    let src = archive();
    assert_eq!(src.fetch_by_prefix("OGN").unwrap().len(), 2);
    assert!(src.fetch_by_prefix("ogn").unwrap().is_empty());
}

#[test]
fn report_counts_blank_fields() {
    let dir = tmp_dir("report");
    write_catalogs(&dir);
    let store = JsonStore::new(dir.clone(), sets());

    let reports = runner::report(&store, &sets()).unwrap();
    let origins = &reports[0];
    assert_eq!(origins.total, 3);
    assert_eq!(origins.missing(Field::Description), 3);
    assert_eq!(origins.missing(Field::Artist), 2);
    assert_eq!(origins.incomplete.len(), 3);
    let artist = origins.fields.iter().find(|s| s.field == Field::Artist).unwrap();
    assert!((artist.filled_pct - 100.0 / 3.0).abs() < 1e-9);
    assert!(origins.to_string().starts_with("origins (3 cards)"));
}

#[test]
fn snapshot_runs_from_a_source() {
    let dir = tmp_dir("snapshot");
    let path = dir.join("cards.json");
    let out = runner::snapshot(&archive(), &path, &mut NullProgress).unwrap();
    assert!(matches!(out, rift_scrape::snapshot::SnapshotOutcome::Written { variants: 3, .. }));
    assert_eq!(read(path)["variants"][2]["variantNumber"], "OGS-003");
}

#[test]
fn unreachable_archive_is_an_http_error() {
    let opts = FetchOptions {
        base_url: "http://127.0.0.1:9".into(),
        timeout_secs: 2,
        ..FetchOptions::default()
    };
    let fetcher = ArchiveFetcher::new(ArchiveClient::new(&opts).unwrap());
    assert!(matches!(fetcher.fetch_all(), Err(FetchError::Http(_))));
}

#[test]
fn non_success_status_is_a_status_error() {
    let (url, _rx) = serve_once("503 Service Unavailable", "busy");
    match fetcher_for(url).fetch_all() {
        Err(FetchError::Status { status, url }) => {
            assert_eq!(status, 503);
            assert!(url.contains("/api/trpc/cards.search"));
        }
        other => panic!("expected a 503 status error, got {other:?}"),
    }
}

#[test]
fn jsonl_response_decodes_end_to_end() {
    let body = concat!(
        r#"{"result":{"data":{"json":[{"name":"Bolt","cardVariants":[{"variantNumber":"OGN-010"}]}]}}}"#,
        "\n",
        r#"{"result":{"data":[{"name":"Shield","cardVariants":[{"variantNumber":"OGS-003"}]}]}}"#,
        "\n"
    );
    let (url, rx) = serve_once("200 OK", body);

    let cards = fetcher_for(url).with_query("bolt").fetch_all().unwrap();
    let names: Vec<&str> = cards.iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["Bolt", "Shield"]);

    let head = rx.recv().unwrap();
    assert!(head.starts_with("GET /api/trpc/cards.search?batch=1&input="));
    assert!(head.contains("bolt"));
    assert!(head.to_ascii_lowercase().contains("trpc-accept: application/jsonl"));
}

#[test]
fn merge_set_reports_failure_and_finishes() {
    let dir = tmp_dir("merge_set_progress");
    let store = JsonStore::new(dir.clone(), sets());
    let mut rec = Recorder::default();

    let err = runner::merge_set(&archive(), &store, &sets()[0], &Field::ALL, &mut rec).unwrap_err();
    assert!(matches!(err, Error::Store(StoreError::Missing(_))));
    assert_eq!(rec.failed, vec!["origins"]);
    assert!(rec.done.is_empty());
    assert!(rec.finished);

    write_catalogs(&dir);
    let mut rec = Recorder::default();
    runner::merge_set(&FailingSource, &store, &sets()[0], &Field::ALL, &mut rec).unwrap_err();
    assert_eq!(rec.failed, vec!["origins"]);
    assert!(rec.finished);

    let mut rec = Recorder::default();
    runner::merge_set(&archive(), &store, &sets()[0], &Field::ALL, &mut rec).unwrap();
    assert_eq!(rec.done, vec!["origins"]);
    assert!(rec.failed.is_empty());
    assert!(rec.finished);
}
