// src/merge.rs
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::card::{CatalogEntry, ExtractedFields, Field, RawCardRecord};
use crate::core::sanitize::{non_blank, normalize_ws};
use crate::extract::{extract, extract_for_variant};

/// Matching key: lowercase, trimmed, inner whitespace collapsed.
/// Epithets after a comma are part of the name.
pub fn normalize_name(name: &str) -> String {
    normalize_ws(name).to_lowercase()
}

/// Summary of one merge pass. Not persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MergeResult {
    pub set_key: String,
    pub entries_total: usize,
    pub entries_updated: usize,
    pub filled: BTreeMap<Field, usize>,
    pub unmatched: Vec<String>,
    pub duplicates_ignored: usize,
}

impl MergeResult {
    pub fn filled(&self, field: Field) -> usize {
        self.filled.get(&field).copied().unwrap_or(0)
    }

    pub fn fields_filled(&self) -> usize {
        self.filled.values().sum()
    }

    pub fn unmatched_count(&self) -> usize {
        self.unmatched.len()
    }
}

/// Run the extractor over a fetch so the result can feed [`merge`].
pub fn prepare_fresh(records: Vec<RawCardRecord>) -> Vec<(RawCardRecord, ExtractedFields)> {
    records
        .into_iter()
        .map(|r| {
            let fields = extract(&r);
            (r, fields)
        })
        .collect()
}

/// Fill blank fields in `existing` from `fresh`, never overwriting.
///
/// - Pairs by [`normalize_name`]. The first fresh record per name wins; later
///   ones are ignored and counted in `duplicates_ignored`.
/// - Every existing entry is decided on its own, so print variants sharing a
///   name are all filled from the same fresh card.
/// - If an entry's `card_number` names one of the fresh card's variants, that
///   variant's flavor text and artist are preferred.
///
/// Returns a new catalog; inputs are left as they are.
pub fn merge(
    existing: &[CatalogEntry],
    fresh: &[(RawCardRecord, ExtractedFields)],
    fields: &[Field],
) -> (Vec<CatalogEntry>, MergeResult) {
    let mut result = MergeResult { entries_total: existing.len(), ..MergeResult::default() };

    let mut lookup: HashMap<String, &(RawCardRecord, ExtractedFields)> =
        HashMap::with_capacity(fresh.len());
    for pair in fresh {
        let key = normalize_name(pair.0.name());
        if lookup.contains_key(&key) {
            result.duplicates_ignored += 1;
            logw!("Merge: duplicate fresh name {:?}; keeping first", pair.0.name());
            continue;
        }
        lookup.insert(key, pair);
    }

    let merged = existing
        .iter()
        .map(|entry| {
            let Some((record, extracted)) = lookup.get(&normalize_name(&entry.name)).copied() else {
                logd!("Merge: no match for {:?}", entry.name);
                result.unmatched.push(entry.name.clone());
                return entry.clone();
            };

            let by_variant = entry
                .card_number
                .as_deref()
                .filter(|n| record.variant_numbers().any(|v| v == n.trim()))
                .map(|n| extract_for_variant(record, n));
            let source = by_variant.as_ref().unwrap_or(extracted);

            let (updated, filled) = fill_blanks(entry, source, fields);
            if !filled.is_empty() {
                result.entries_updated += 1;
                logd!("Merge: {:?} filled {:?}", entry.name, filled);
                for f in filled {
                    *result.filled.entry(f).or_default() += 1;
                }
            }
            updated
        })
        .collect();

    (merged, result)
}

/// Copy of `entry` with each blank field in `fields` taken from `source`
/// when `source` has it. Also returns which fields were filled.
fn fill_blanks(
    entry: &CatalogEntry,
    source: &ExtractedFields,
    fields: &[Field],
) -> (CatalogEntry, Vec<Field>) {
    let mut out = entry.clone();
    let mut filled = Vec::new();
    for &field in fields {
        if filled.contains(&field) || !entry.is_blank(field) {
            continue;
        }
        let Some(v) = source.get(field).and_then(non_blank) else {
            continue;
        };
        out.set(field, v);
        filled.push(field);
    }
    (out, filled)
}
