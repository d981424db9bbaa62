//! Coins sub-client — summary fetch through the freshness cache.

use crate::client::CoinwatchClient;
use crate::domain::coin::{self, CacheEntry, CoinSummary};
use crate::error::{HttpError, SdkError};
use crate::shared::CoinSymbol;
use chrono::Utc;

/// Sub-client for coin summaries.
pub struct Coins<'a> {
    pub(crate) client: &'a CoinwatchClient,
}

impl<'a> Coins<'a> {
    /// Get the summary for `symbol`. Serves a fresh cache entry when one
    /// exists, otherwise fetches and caches.
    pub async fn get(&self, symbol: &CoinSymbol) -> Result<CoinSummary, SdkError> {
        let cache = &self.client.summary_cache;
        if let Some(entry) = cache.get(symbol) {
            if cache.is_fresh(&entry, Utc::now()) {
                tracing::debug!(%symbol, "Summary cache hit");
                return Ok(entry.payload);
            }
        }

        let summary = self.fetch(symbol).await?;
        cache.put(symbol, &summary, Utc::now())?;
        Ok(summary)
    }

    /// Fetch the summary for `symbol` from the network. The cache is neither
    /// read nor written.
    pub async fn fetch(&self, symbol: &CoinSymbol) -> Result<CoinSummary, SdkError> {
        let coin_id = symbol.coin_id();
        let resp = self.client.http.get_coin_markets(&coin_id).await?;

        let record = resp.into_iter().next().ok_or_else(|| {
            SdkError::Http(HttpError::NotFound(format!("Coin not found: {}", coin_id)))
        })?;

        record
            .try_into()
            .map_err(|e: coin::ValidationError| SdkError::Validation(e.to_string()))
    }

    /// The cached entry for `symbol`, fresh or not.
    pub fn cached(&self, symbol: &CoinSymbol) -> Option<CacheEntry> {
        self.client.summary_cache.get(symbol)
    }

    /// Drop the cached entry for `symbol`.
    pub fn invalidate(&self, symbol: &CoinSymbol) {
        self.client.summary_cache.invalidate(symbol);
    }
}
