//! One refresh step: serve fresh cache, or fetch and update the cache.

use super::{CoinSummary, FreshnessCache, SummaryState};
use crate::error::SdkError;
use crate::shared::CoinSymbol;
use crate::source::SummarySource;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// What a refresh did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A fresh cache entry was served; no network call was made.
    Cached,
    /// The upstream delivered a new summary, now cached.
    Fetched,
    /// The upstream was unavailable. `fallback` is true when a stale cache
    /// entry was served because nothing was displayed yet.
    Unavailable { fallback: bool },
}

impl RefreshOutcome {
    /// Whether the displayed summary was (re)placed by this refresh.
    pub fn replaced_summary(&self) -> bool {
        match self {
            RefreshOutcome::Cached | RefreshOutcome::Fetched => true,
            RefreshOutcome::Unavailable { fallback } => *fallback,
        }
    }
}

/// Drives [`SummaryState`] for one symbol against a cache and a source.
pub struct SummaryRefresher {
    symbol: CoinSymbol,
    cache: FreshnessCache,
    source: Arc<dyn SummarySource>,
    state: SummaryState,
}

impl SummaryRefresher {
    pub fn new(symbol: CoinSymbol, cache: FreshnessCache, source: Arc<dyn SummarySource>) -> Self {
        Self {
            symbol,
            cache,
            source,
            state: SummaryState::new(),
        }
    }

    pub fn symbol(&self) -> &CoinSymbol {
        &self.symbol
    }

    pub fn state(&self) -> &SummaryState {
        &self.state
    }

    pub fn source(&self) -> &Arc<dyn SummarySource> {
        &self.source
    }

    /// Run one refresh at `now`.
    pub async fn refresh(&mut self, now: DateTime<Utc>) -> RefreshOutcome {
        if let Some(outcome) = self.serve_fresh(now) {
            return outcome;
        }
        let result = self.source.coin_summary(&self.symbol).await;
        self.apply_fetch(result, now)
    }

    /// First half of a refresh: serve the cache entry if it is still fresh
    /// at `now`. `None` means the upstream has to be asked.
    pub fn serve_fresh(&mut self, now: DateTime<Utc>) -> Option<RefreshOutcome> {
        let entry = self.cache.get(&self.symbol)?;
        if !self.cache.is_fresh(&entry, now) {
            return None;
        }
        tracing::debug!(symbol = %self.symbol, "Serving fresh cached summary");
        self.state.apply_cached(entry);
        Some(RefreshOutcome::Cached)
    }

    /// Second half of a refresh: apply the upstream `result` of a fetch
    /// started at `now`.
    pub fn apply_fetch(
        &mut self,
        result: Result<CoinSummary, SdkError>,
        now: DateTime<Utc>,
    ) -> RefreshOutcome {
        match result {
            Ok(summary) => {
                if let Err(e) = self.cache.put(&self.symbol, &summary, now) {
                    tracing::warn!(symbol = %self.symbol, "Failed to cache summary: {}", e);
                }
                self.state.apply_fetched(summary, now);
                RefreshOutcome::Fetched
            }
            Err(e) => {
                tracing::warn!(symbol = %self.symbol, "Summary upstream unavailable: {}", e);
                let stale = self.cache.get(&self.symbol);
                let fallback = self.state.apply_unavailable(stale);
                RefreshOutcome::Unavailable { fallback }
            }
        }
    }
}

impl std::fmt::Debug for SummaryRefresher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummaryRefresher")
            .field("symbol", &self.symbol)
            .field("cache", &self.cache)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
