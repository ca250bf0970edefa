// src/snapshot.rs
//! Full archive snapshot: one row per print variant, sorted by variant number.
//!
//! `update_snapshot` only rewrites the file when the variant rows changed;
//! the metadata block (including the date) is not part of the comparison.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::card::RawCardRecord;
use crate::config::consts::{SNAPSHOT_DESCRIPTION, SNAPSHOT_SOURCE};
use crate::core::sanitize::split_variant_number;
use crate::error::StoreError;
use crate::store::{read_json, write_json_with_backup};

/// Card-level keys copied onto every variant row.
const BASE_KEYS: &[&str] = &[
    "id", "name", "type", "super", "description", "energy", "might", "power", "tags", "cardColors",
];

/// (variant key, row key)
const VARIANT_KEYS: &[(&str, &str)] = &[
    ("id", "variantId"),
    ("variantNumber", "variantNumber"),
    ("imageUrl", "imageUrl"),
    ("rarity", "rarity"),
    ("flavorText", "flavorText"),
    ("artist", "artist"),
    ("releaseDate", "releaseDate"),
    ("variantType", "variantType"),
    ("set", "set"),
];

pub type VariantRow = Map<String, Value>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMeta {
    pub source: String,
    pub total_variants: usize,
    pub last_updated: String,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub metadata: SnapshotMeta,
    pub variants: Vec<VariantRow>,
}

impl Snapshot {
    pub fn new(variants: Vec<VariantRow>) -> Self {
        Self {
            metadata: SnapshotMeta {
                source: SNAPSHOT_SOURCE.to_string(),
                total_variants: variants.len(),
                last_updated: chrono::Utc::now().format("%Y-%m-%d").to_string(),
                description: SNAPSHOT_DESCRIPTION.to_string(),
            },
            variants,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SnapshotOutcome {
    Unchanged { variants: usize },
    Written { variants: usize, backup: Option<PathBuf> },
}

/// One row per `cardVariants` entry, sorted by variant number.
/// Cards without an array of variants produce no rows.
pub fn flatten(records: &[RawCardRecord]) -> Vec<VariantRow> {
    let mut rows = Vec::new();
    for card in records {
        let mut base = Map::new();
        for key in BASE_KEYS {
            base.insert(key.to_string(), card.get(key).cloned().unwrap_or(Value::Null));
        }
        for variant in card.variants() {
            let mut row = base.clone();
            for (from, to) in VARIANT_KEYS {
                row.insert(to.to_string(), variant.get(*from).cloned().unwrap_or(Value::Null));
            }
            rows.push(row);
        }
    }
    rows.sort_by(|a, b| compare_variant_numbers(row_number(a), row_number(b)));
    rows
}

fn row_number(row: &VariantRow) -> &str {
    row.get("variantNumber").and_then(Value::as_str).unwrap_or_default()
}

/// `OGN-7` < `OGN-12` < `OGN-12a` < `OGN-12b`; within a prefix, unparsable
/// numbers come after parsed ones and compare as raw text.
pub fn compare_variant_numbers(a: &str, b: &str) -> Ordering {
    match (split_variant_number(a), split_variant_number(b)) {
        (Some((pa, na, sa)), Some((pb, nb, sb))) => {
            pa.cmp(pb).then(na.cmp(&nb)).then(sa.cmp(sb))
        }
        (Some((pa, ..)), None) => pa.cmp(prefix_of(b)).then(Ordering::Less),
        (None, Some((pb, ..))) => prefix_of(a).cmp(pb).then(Ordering::Greater),
        (None, None) => a.cmp(b),
    }
}

fn prefix_of(s: &str) -> &str {
    s.split_once('-').map_or(s, |(p, _)| p)
}

/// Write a fresh snapshot to `path` unless its variant rows match what is there.
pub fn update_snapshot(path: &Path, records: &[RawCardRecord]) -> Result<SnapshotOutcome, StoreError> {
    let variants = flatten(records);

    match read_json::<Snapshot>(path) {
        Ok(current) if current.variants == variants => {
            logf!("Snapshot: {} unchanged ({} variants)", path.display(), variants.len());
            return Ok(SnapshotOutcome::Unchanged { variants: variants.len() });
        }
        Ok(_) | Err(StoreError::Missing(_)) => {}
        // unreadable: overwritten, old bytes kept in the backup
        Err(StoreError::Json { .. }) => logw!("Snapshot: {} unreadable, replacing", path.display()),
        Err(e) => return Err(e),
    }

    let count = variants.len();
    let backup = write_json_with_backup(path, &Snapshot::new(variants))?;
    logf!("Snapshot: wrote {} variants → {}", count, path.display());
    Ok(SnapshotOutcome::Written { variants: count, backup })
}
