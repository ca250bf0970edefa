// src/cli.rs
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::{
    card::Field,
    config::{
        consts::STORE_DIR,
        options::{AppOptions, SetDef},
    },
    core::net::ArchiveClient,
    error::{ConfigError, Error, Result, StoreError},
    log,
    merge::MergeResult,
    progress::Progress,
    runner,
    scrape::ArchiveFetcher,
    snapshot::SnapshotOutcome,
    store::JsonStore,
};

#[derive(Parser, Debug)]
#[command(name = "rift_scrape")]
#[command(about = "Fill missing Riftbound card text from Piltover Archive into local JSON catalogs", long_about = None)]
pub struct Cli {
    /// Directory holding the per-set catalog files
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// JSON options file (fetch + store sections)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Archive base URL
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Fields to fill, comma separated (default: all)
    #[arg(long, global = true, value_delimiter = ',', value_name = "FIELDS")]
    pub fields: Vec<String>,

    /// Debug-level file logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch once and show per-set counts and a sample card
    Test,
    /// Fetch all cards and summarize by set
    Scrape {
        /// Free-text search sent to the archive (default: every card)
        #[arg(long, value_name = "TEXT")]
        query: Option<String>,
    },
    /// Fill one set's catalog (key or prefix, e.g. `origins` or `OGN`)
    Merge {
        #[arg(value_name = "SET")]
        set: String,
    },
    /// Fill every configured set
    MergeAll,
    /// Show how many entries are still missing each field
    Report {
        #[arg(value_name = "SET")]
        set: Option<String>,
    },
    /// Refresh the flattened all-variants snapshot
    Snapshot {
        /// Output path (default: <data-dir>/cards.json)
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
}

impl Cli {
    /// File options (if any) with flags layered on top.
    pub fn options(&self) -> Result<AppOptions> {
        let mut opts = match &self.config {
            Some(path) => AppOptions::from_file(path)?,
            None => AppOptions::default(),
        };
        if let Some(dir) = &self.data_dir {
            opts.store.data_dir = dir.clone();
        }
        if let Some(url) = &self.base_url {
            opts.fetch.base_url = url.clone();
        }
        if let Some(secs) = self.timeout {
            opts.fetch.timeout_secs = secs;
        }
        Ok(opts)
    }

    pub fn field_list(&self) -> Result<Vec<Field>, ConfigError> {
        parse_fields(&self.fields)
    }
}

/// Empty input means all three fields. Duplicates collapse.
pub fn parse_fields(raw: &[String]) -> Result<Vec<Field>, ConfigError> {
    if raw.iter().all(|s| s.trim().is_empty()) {
        return Ok(Field::ALL.to_vec());
    }
    let mut out = Vec::new();
    for s in raw.iter().filter(|s| !s.trim().is_empty()) {
        let f = Field::from_key(s).ok_or_else(|| ConfigError::UnknownField(s.clone()))?;
        if !out.contains(&f) {
            out.push(f);
        }
    }
    Ok(out)
}

/// Prints progress lines to stdout.
struct CliProgress {
    done: usize,
    total: usize,
}

impl Progress for CliProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
        self.done = 0;
    }
    fn log(&mut self, msg: &str) {
        println!("{msg}");
    }
    fn item_done(&mut self, set_key: &str) {
        self.done += 1;
        println!("Saved {set_key} ({}/{})", self.done, self.total);
    }
    fn item_failed(&mut self, set_key: &str, err: &str) {
        eprintln!("Failed {set_key}: {err}");
    }
}

pub fn run(cli: Cli) -> Result<()> {
    log::init(&Path::new(STORE_DIR).join(log::LOG_FILE_NAME), cli.verbose);

    let opts = cli.options()?;
    let fields = cli.field_list()?;
    logf!("CLI: {:?} data_dir={}", cli.command, opts.store.data_dir.display());

    let store = JsonStore::from_options(&opts.store);
    let mut progress = CliProgress { done: 0, total: 0 };

    // Report reads local files only; no client needed.
    if let Command::Report { set } = &cli.command {
        let sets = select_sets(&opts, set.as_deref())?;
        for r in runner::report(&store, &sets)? {
            println!("{r}");
        }
        return Ok(());
    }

    let query = match &cli.command {
        Command::Scrape { query: Some(q) } => q.as_str(),
        _ => "",
    };
    let source = ArchiveFetcher::new(ArchiveClient::new(&opts.fetch)?).with_query(query);

    match &cli.command {
        Command::Test => {
            let p = runner::probe(&source, &mut progress)?;
            for (code, n) in &p.per_set {
                println!("  {code}: {n} cards");
            }
            if let Some(s) = &p.sample {
                println!("Sample: {} [{}] {}", s.name, s.card_type.as_deref().unwrap_or("?"), s.variant.as_deref().unwrap_or("?"));
                println!("  description: {}", s.fields.description.as_deref().unwrap_or("-"));
                println!("  flavor_text: {}", s.fields.flavor_text.as_deref().unwrap_or("-"));
                println!("  artist:      {}", s.fields.artist.as_deref().unwrap_or("-"));
            }
            if p.total == 0 {
                eprintln!("Warning: the archive returned no cards");
            }
        }
        Command::Scrape { .. } => {
            let p = runner::probe(&source, &mut progress)?;
            println!("Total cards: {}", p.total);
            for (code, n) in &p.per_set {
                let label = opts.store.find_set(code).map_or(code.as_str(), |s| s.key.as_str());
                println!("  {label} ({code}): {n}");
            }
        }
        Command::Merge { set } => {
            let def = select_sets(&opts, Some(set.as_str()))?.remove(0);
            let r = runner::merge_set(&source, &store, &def, &fields, &mut progress)?;
            print_merge(&r);
        }
        Command::MergeAll => {
            let results = runner::merge_all(&source, &store, &opts.store.sets, &fields, &mut progress)?;
            for r in &results {
                print_merge(r);
            }
            println!("Processed {}/{} sets", results.len(), opts.store.sets.len());
        }
        Command::Snapshot { out } => {
            let path = out.clone().unwrap_or_else(|| opts.store.snapshot_path());
            match runner::snapshot(&source, &path, &mut progress)? {
                SnapshotOutcome::Unchanged { variants } => {
                    println!("{} is up to date ({variants} variants)", path.display())
                }
                SnapshotOutcome::Written { variants, backup } => {
                    println!("Wrote {variants} variants to {}", path.display());
                    if let Some(b) = backup {
                        println!("Backup: {}", b.display());
                    }
                }
            }
        }
        Command::Report { .. } => {}
    }
    Ok(())
}

fn select_sets(opts: &AppOptions, name: Option<&str>) -> Result<Vec<SetDef>> {
    match name {
        None => Ok(opts.store.sets.clone()),
        Some(n) => opts
            .store
            .find_set(n)
            .cloned()
            .map(|s| vec![s])
            .ok_or_else(|| Error::from(StoreError::UnknownSet(n.to_string()))),
    }
}

fn print_merge(r: &MergeResult) {
    println!(
        "{}: {} of {} entries updated ({} fields), {} unmatched",
        r.set_key,
        r.entries_updated,
        r.entries_total,
        r.fields_filled(),
        r.unmatched_count()
    );
    for f in Field::ALL {
        let n = r.filled(f);
        if n > 0 {
            println!("  {:<12} +{n}", f.key());
        }
    }
    if r.duplicates_ignored > 0 {
        println!("  {} duplicate archive names ignored", r.duplicates_ignored);
    }
    for name in &r.unmatched {
        println!("  no match: {name}");
    }
}
