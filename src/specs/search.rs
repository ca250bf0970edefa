// src/specs/search.rs
//! Spec for the archive's `cards.search` tRPC procedure.
//!
//! Request: `GET <endpoint>?batch=1&input=<payload>` where the payload is a
//! batch map `{"0": {"json": {...filters...}, "meta": {...}}}`.
//!
//! Response: JSON Lines. Each line (and each value, when several are glued
//! on one line) is an independent fragment. Card objects sit under
//! `result.data.json`, `result.data`, or the legacy streamed
//! `json: [2, 0, [[cards]]]` layout, nested in arrays of varying depth.

use serde_json::{Deserializer, Value, json};

use crate::card::RawCardRecord;
use crate::core::json::{Step, lookup};
use crate::error::FetchError;

/// Where cards may sit inside a fragment (or inside a wrapper object), most specific first.
const CONTAINER_PATHS: &[&[Step]] = &[
    &[Step::Key("result"), Step::Key("data"), Step::Key("json")],
    &[Step::Key("result"), Step::Key("data")],
    &[Step::Key("json")],
    &[Step::Key("data")],
];

const MAX_DEPTH: usize = 8;

/// Query parameters for one search call.
pub fn search_query(search: &str) -> Vec<(&'static str, String)> {
    vec![
        ("batch", "1".to_string()),
        ("input", search_payload(search).to_string()),
    ]
}

/// Batch input with every filter open; only the free-text query varies.
pub fn search_payload(search: &str) -> Value {
    json!({
        "0": {
            "json": {
                "searchQuery": search,
                "colorIds": [],
                "type": null,
                "super": null,
                "rarity": null,
                "setName": null,
                "energyRange": { "min": 0, "max": 12 },
                "mightRange": { "min": 0, "max": 10 },
                "powerRange": { "min": 0, "max": 4 },
                "advancedSearchEnabled": false
            },
            "meta": {
                "values": {
                    "type": ["undefined"],
                    "super": ["undefined"],
                    "rarity": ["undefined"],
                    "setName": ["undefined"]
                }
            }
        }
    })
}

/// Decode a whole response body into card records, in response order.
/// Fails only when not a single fragment parses.
pub fn decode_body(text: &str) -> Result<Vec<RawCardRecord>, FetchError> {
    let (fragments, skipped) = split_fragments(text);
    if fragments.is_empty() {
        loge!("Search: no parseable fragment ({} skipped, {} bytes)", skipped, text.len());
        return Err(FetchError::NoFragments);
    }

    let mut cards = Vec::new();
    for frag in &fragments {
        collect_cards(frag, 0, &mut cards);
    }
    logd!(
        "Search: {} fragments ({} skipped) → {} cards",
        fragments.len(),
        skipped,
        cards.len()
    );
    Ok(cards)
}

/// Every object or array fragment in `text`, in order.
///
/// Lines are independent: a line holding one or more glued values counts only
/// if all of it parses, otherwise the whole line is dropped. Scalars are not
/// fragments. Returns (fragments, skipped line count).
pub fn split_fragments(text: &str) -> (Vec<Value>, usize) {
    let mut out = Vec::new();
    let mut skipped = 0usize;

    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_line(line) {
            Ok(values) => {
                out.extend(values.into_iter().filter(|v| v.is_object() || v.is_array()));
            }
            Err(e) => {
                skipped += 1;
                logw!("Search: skipping line {}: {e}", n + 1);
            }
        }
    }

    (out, skipped)
}

fn parse_line(line: &str) -> Result<Vec<Value>, serde_json::Error> {
    Deserializer::from_str(line).into_iter::<Value>().collect()
}

fn collect_cards(node: &Value, depth: usize, out: &mut Vec<RawCardRecord>) {
    if depth > MAX_DEPTH {
        return;
    }
    match node {
        Value::Array(items) => {
            for item in items {
                collect_cards(item, depth + 1, out);
            }
        }
        Value::Object(_) => {
            if let Some(card) = RawCardRecord::from_value(node.clone()) {
                // Don't descend: nested objects (set, variants) also carry `name`.
                out.push(card);
                return;
            }
            if let Some(inner) = CONTAINER_PATHS.iter().find_map(|p| lookup(node, p)) {
                collect_cards(inner, depth + 1, out);
            }
        }
        _ => {}
    }
}
