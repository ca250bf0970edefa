// src/scrape.rs
use std::collections::BTreeMap;

use crate::{
    card::RawCardRecord,
    core::net::ArchiveClient,
    error::FetchError,
    specs::search,
};

/// Anything that can hand back the full card list.
/// Implemented over HTTP by [`ArchiveFetcher`]; tests plug in their own.
pub trait CardSource {
    /// Every card the source knows about, in source order.
    fn fetch_all(&self) -> Result<Vec<RawCardRecord>, FetchError>;

    /// Cards whose identifying code starts with `prefix` (case-sensitive), in source order.
    fn fetch_by_prefix(&self, prefix: &str) -> Result<Vec<RawCardRecord>, FetchError> {
        let all = self.fetch_all()?;
        let total = all.len();
        let picked: Vec<_> = all.into_iter().filter(|c| c.belongs_to(prefix)).collect();
        logf!("Fetch: {} of {} cards match prefix {}", picked.len(), total, prefix);
        Ok(picked)
    }
}

pub struct ArchiveFetcher {
    client: ArchiveClient,
    query: String,
}

impl ArchiveFetcher {
    pub fn new(client: ArchiveClient) -> Self {
        Self { client, query: String::new() }
    }

    /// Narrow the remote search (empty = everything).
    pub fn with_query(mut self, query: &str) -> Self {
        self.query = query.to_string();
        self
    }
}

impl CardSource for ArchiveFetcher {
    fn fetch_all(&self) -> Result<Vec<RawCardRecord>, FetchError> {
        logf!("Fetch: Begin {} query={:?}", self.client.url(), self.query);
        let body = self
            .client
            .get_text(&search::search_query(&self.query))
            .inspect_err(|e| loge!("Fetch: {e}"))?;
        let cards = search::decode_body(&body)?;
        logf!("Fetch: OK {} cards", cards.len());
        Ok(cards)
    }
}

/// Card counts per set code, sorted by code. Cards without a code are left out.
pub fn summarize_sets(records: &[RawCardRecord]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for r in records {
        if let Some(code) = r.set_code() {
            *counts.entry(code).or_default() += 1;
        }
    }
    counts.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}
