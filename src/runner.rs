// src/runner.rs
//! Pipelines the CLI drives: fetch → extract → merge → save, plus the
//! read-only probe/report runs and the snapshot refresh.
//!
//! Every merge is computed in memory before `save` is called, so a fetch or
//! load failure leaves the catalog on disk exactly as it was.

use std::path::Path;

use crate::{
    card::{CatalogEntry, ExtractedFields, Field, RawCardRecord},
    config::options::SetDef,
    error::Result,
    extract::extract,
    merge::{MergeResult, merge, prepare_fresh},
    progress::Progress,
    report::{SetReport, completeness},
    scrape::{CardSource, summarize_sets},
    snapshot::{SnapshotOutcome, update_snapshot},
    store::CatalogStore,
};

/// What `test` prints: totals per set and one decoded sample.
#[derive(Clone, Debug)]
pub struct ProbeSummary {
    pub total: usize,
    pub per_set: Vec<(String, usize)>,
    pub sample: Option<Sample>,
}

#[derive(Clone, Debug)]
pub struct Sample {
    pub name: String,
    pub card_type: Option<String>,
    pub variant: Option<String>,
    pub fields: ExtractedFields,
}

impl Sample {
    fn of(record: &RawCardRecord) -> Self {
        Self {
            name: record.name().to_string(),
            card_type: record.card_type().map(str::to_string),
            variant: record.variant_numbers().next().map(str::to_string),
            fields: extract(record),
        }
    }
}

/// Fetch everything once and summarize it. Writes nothing.
pub fn probe(source: &dyn CardSource, progress: &mut dyn Progress) -> Result<ProbeSummary> {
    progress.log("Fetching all cards…");
    let records = source.fetch_all()?;
    let summary = ProbeSummary {
        total: records.len(),
        per_set: summarize_sets(&records),
        sample: records.first().map(Sample::of),
    };
    progress.log(&format!("Fetched {} cards", summary.total));
    Ok(summary)
}

/// Merge one set: load, fetch by prefix, merge, save.
pub fn merge_set(
    source: &dyn CardSource,
    store: &dyn CatalogStore,
    set: &SetDef,
    fields: &[Field],
    progress: &mut dyn Progress,
) -> Result<MergeResult> {
    progress.begin(1);
    let result = load_fetch_merge(source, store, set, fields, progress);
    if let Err(e) = &result {
        progress.item_failed(&set.key, &e.to_string());
    }
    progress.finish();
    result
}

fn load_fetch_merge(
    source: &dyn CardSource,
    store: &dyn CatalogStore,
    set: &SetDef,
    fields: &[Field],
    progress: &mut dyn Progress,
) -> Result<MergeResult> {
    let existing = store.load(&set.key)?;
    progress.log(&format!("Fetching {} cards…", set.prefix));
    let fetched = source.fetch_by_prefix(&set.prefix)?;
    merge_and_save(store, set, &existing, fetched, fields, progress)
}

/// Merge every set in order from a single full fetch.
/// Stops at the first error; sets saved before it stay saved.
pub fn merge_all(
    source: &dyn CardSource,
    store: &dyn CatalogStore,
    sets: &[SetDef],
    fields: &[Field],
    progress: &mut dyn Progress,
) -> Result<Vec<MergeResult>> {
    progress.begin(sets.len());

    // All catalogs load before the fetch; a bad file aborts with nothing written.
    let mut loaded = Vec::with_capacity(sets.len());
    for set in sets {
        match store.load(&set.key) {
            Ok(entries) => loaded.push(entries),
            Err(e) => {
                progress.item_failed(&set.key, &e.to_string());
                progress.finish();
                return Err(e.into());
            }
        }
    }

    progress.log("Fetching all cards…");
    let all = match source.fetch_all() {
        Ok(all) => all,
        Err(e) => {
            progress.item_failed("fetch", &e.to_string());
            progress.finish();
            return Err(e.into());
        }
    };

    let mut results = Vec::with_capacity(sets.len());
    for (set, existing) in sets.iter().zip(&loaded) {
        let fetched: Vec<_> = all.iter().filter(|c| c.belongs_to(&set.prefix)).cloned().collect();
        match merge_and_save(store, set, existing, fetched, fields, progress) {
            Ok(r) => results.push(r),
            Err(e) => {
                progress.item_failed(&set.key, &e.to_string());
                progress.finish();
                return Err(e);
            }
        }
    }
    progress.finish();
    Ok(results)
}

fn merge_and_save(
    store: &dyn CatalogStore,
    set: &SetDef,
    existing: &[CatalogEntry],
    fetched: Vec<RawCardRecord>,
    fields: &[Field],
    progress: &mut dyn Progress,
) -> Result<MergeResult> {
    let fresh_count = fetched.len();
    let fresh = prepare_fresh(fetched);
    let (merged, mut result) = merge(existing, &fresh, fields);
    result.set_key = set.key.clone();

    logf!(
        "Merge: {} ({}): {} entries, {} fresh, {} updated, {} unmatched, {} duplicates",
        set.key,
        set.prefix,
        result.entries_total,
        fresh_count,
        result.entries_updated,
        result.unmatched_count(),
        result.duplicates_ignored
    );

    store.save(&set.key, &merged)?;
    progress.item_done(&set.key);
    Ok(result)
}

/// Refresh the flattened archive snapshot at `path`.
pub fn snapshot(source: &dyn CardSource, path: &Path, progress: &mut dyn Progress) -> Result<SnapshotOutcome> {
    progress.log("Fetching all cards…");
    let records = source.fetch_all()?;
    Ok(update_snapshot(path, &records)?)
}

/// Completeness of each set's catalog. Read-only.
pub fn report(store: &dyn CatalogStore, sets: &[SetDef]) -> Result<Vec<SetReport>> {
    sets.iter()
        .map(|set| Ok(completeness(&set.key, &store.load(&set.key)?)))
        .collect()
}
