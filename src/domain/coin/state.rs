//! Summary state container: what the panel currently shows for one symbol.

use super::{CacheEntry, CoinSummary};
use chrono::{DateTime, Utc};

/// Displayed summary plus its freshness flags.
///
/// Fetch failures never clear a displayed summary; they only raise
/// `rate_limited`, which hosts render as a warning.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryState {
    summary: Option<CoinSummary>,
    last_updated: Option<DateTime<Utc>>,
    rate_limited: bool,
    loading: bool,
}

impl Default for SummaryState {
    fn default() -> Self {
        Self {
            summary: None,
            last_updated: None,
            rate_limited: false,
            loading: true,
        }
    }
}

impl SummaryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve a cache entry as the current summary.
    pub fn apply_cached(&mut self, entry: CacheEntry) {
        self.summary = Some(entry.payload);
        self.last_updated = Some(entry.fetched_at);
        self.rate_limited = false;
        self.loading = false;
    }

    /// Serve a freshly fetched summary.
    pub fn apply_fetched(&mut self, summary: CoinSummary, now: DateTime<Utc>) {
        self.summary = Some(summary);
        self.last_updated = Some(now);
        self.rate_limited = false;
        self.loading = false;
    }

    /// Record an unavailable upstream.
    ///
    /// When nothing is displayed yet, `stale` (the last cached entry, however
    /// old) is served instead. Returns whether that fallback was used.
    pub fn apply_unavailable(&mut self, stale: Option<CacheEntry>) -> bool {
        self.rate_limited = true;
        self.loading = false;

        match (&self.summary, stale) {
            (None, Some(entry)) => {
                self.summary = Some(entry.payload);
                self.last_updated = Some(entry.fetched_at);
                true
            }
            _ => false,
        }
    }

    pub fn summary(&self) -> Option<&CoinSummary> {
        self.summary.as_ref()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    pub fn is_rate_limited(&self) -> bool {
        self.rate_limited
    }

    /// True until the first refresh completes.
    pub fn is_loading(&self) -> bool {
        self.loading
    }
}
