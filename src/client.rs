//! High-level client — `CoinwatchClient` with nested sub-client accessors.
//!
//! Each domain has its own sub-client in `domain/<name>/client.rs`.
//! This module keeps the builder, the shared summary cache, and the
//! collaborator impls the session runs against.

use crate::domain::chart::client::Charts;
use crate::domain::chart::PriceSample;
use crate::domain::coin::client::Coins;
use crate::domain::coin::{CacheStore, CoinSummary, FreshnessCache, MemoryStore};
use crate::error::SdkError;
use crate::http::{CoinGeckoHttp, RetryPolicy};
use crate::network;
use crate::shared::{CoinId, CoinSymbol};
use crate::source::{ChartSource, SummarySource};

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

// Re-export sub-client types for convenience.
pub use crate::domain::chart::client::Charts as ChartsClient;
pub use crate::domain::coin::client::Coins as CoinsClient;

/// The primary entry point for the SDK.
///
/// Provides nested sub-client accessors: `client.coins()`, `client.charts()`.
/// Clones share the HTTP connection pool and the summary cache.
#[derive(Debug, Clone)]
pub struct CoinwatchClient {
    pub(crate) http: CoinGeckoHttp,
    pub(crate) summary_cache: FreshnessCache,
}

impl CoinwatchClient {
    pub fn builder() -> CoinwatchClientBuilder {
        CoinwatchClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn coins(&self) -> Coins<'_> {
        Coins { client: self }
    }

    pub fn charts(&self) -> Charts<'_> {
        Charts { client: self }
    }

    /// The summary cache shared by `coins().get()` and sessions.
    pub fn summary_cache(&self) -> &FreshnessCache {
        &self.summary_cache
    }

    /// Replace the API key used for subsequent requests.
    pub async fn set_api_key(&self, key: Option<String>) {
        self.http.set_api_key(key).await;
    }

    /// Start a panel session for `symbol` with default settings.
    ///
    /// Must be called inside a tokio runtime.
    #[cfg(feature = "session")]
    pub fn session(&self, symbol: impl Into<CoinSymbol>) -> crate::session::CoinSession {
        self.session_with(symbol, crate::session::SessionConfig::default())
    }

    /// Start a panel session for `symbol`.
    #[cfg(feature = "session")]
    pub fn session_with(
        &self,
        symbol: impl Into<CoinSymbol>,
        config: crate::session::SessionConfig,
    ) -> crate::session::CoinSession {
        let this = Arc::new(self.clone());
        crate::session::CoinSession::spawn(
            symbol.into(),
            self.summary_cache.clone(),
            this.clone(),
            this,
            config,
        )
    }
}

#[async_trait]
impl SummarySource for CoinwatchClient {
    /// Any failure of the summary endpoint is reported as
    /// [`SdkError::UpstreamUnavailable`].
    async fn coin_summary(&self, symbol: &CoinSymbol) -> Result<CoinSummary, SdkError> {
        self.coins()
            .fetch(symbol)
            .await
            .map_err(|e| SdkError::UpstreamUnavailable(e.to_string()))
    }
}

#[async_trait]
impl ChartSource for CoinwatchClient {
    async fn market_chart(&self, coin_id: &CoinId, days: u32) -> Result<Vec<PriceSample>, SdkError> {
        self.charts().raw_series(coin_id, days).await
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct CoinwatchClientBuilder {
    base_url: String,
    api_key: Option<String>,
    summary_cache_ttl: Duration,
    cache_store: Option<Arc<dyn CacheStore>>,
    chart_retry: RetryPolicy,
}

impl Default for CoinwatchClientBuilder {
    fn default() -> Self {
        Self {
            base_url: network::DEFAULT_API_URL.to_string(),
            api_key: None,
            summary_cache_ttl: FreshnessCache::DEFAULT_TTL,
            cache_store: None,
            chart_retry: RetryPolicy::Idempotent,
        }
    }
}

impl CoinwatchClientBuilder {
    /// Defaults overridden by `COINGECKO_API_URL` and `COINGECKO_API_KEY`
    /// when set and non-empty.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let mut builder = Self::default();
        if let Some(url) = var(network::ENV_API_URL) {
            builder.base_url = url;
        }
        builder.api_key = var(network::ENV_API_KEY);
        builder
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn summary_cache_ttl(mut self, ttl: Duration) -> Self {
        self.summary_cache_ttl = ttl;
        self
    }

    /// Storage backing the summary cache (default: a fresh [`MemoryStore`]).
    pub fn cache_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.cache_store = Some(store);
        self
    }

    /// Retry policy for market-chart requests. Summary requests are never
    /// retried; the next poll takes care of them.
    pub fn chart_retry(mut self, retry: RetryPolicy) -> Self {
        self.chart_retry = retry;
        self
    }

    pub fn build(self) -> Result<CoinwatchClient, SdkError> {
        if self.base_url.trim().is_empty() {
            return Err(SdkError::Validation("base_url must not be empty".into()));
        }

        let http = CoinGeckoHttp::new(&self.base_url)?
            .with_chart_retry(self.chart_retry)
            .with_api_key(self.api_key);

        let store: Arc<dyn CacheStore> = match self.cache_store {
            Some(store) => store,
            None => Arc::new(MemoryStore::new()),
        };

        Ok(CoinwatchClient {
            http,
            summary_cache: FreshnessCache::new(store).with_ttl(self.summary_cache_ttl),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_builder_defaults() {
        let client = CoinwatchClient::builder().build().unwrap();
        assert_eq!(client.http.base_url(), network::DEFAULT_API_URL);
        assert_eq!(client.summary_cache().ttl(), Duration::from_secs(60));
        assert!(!client.http.has_api_key().await);
    }

    #[tokio::test]
    async fn test_builder_overrides() {
        let store = Arc::new(MemoryStore::new());
        let client = CoinwatchClient::builder()
            .base_url("http://localhost:9000/api/v3/")
            .api_key("demo-key")
            .summary_cache_ttl(Duration::from_secs(5))
            .cache_store(store.clone())
            .build()
            .unwrap();

        assert_eq!(client.http.base_url(), "http://localhost:9000/api/v3");
        assert_eq!(client.summary_cache().ttl(), Duration::from_secs(5));
        assert!(client.http.has_api_key().await);

        let summary = crate::domain::coin::cache::tests::summary("bitcoin", 1);
        client
            .summary_cache()
            .put(&CoinSymbol::from("BTC"), &summary, chrono::Utc::now())
            .unwrap();
        assert_eq!(store.len(), 2);
        assert!(client.coins().cached(&CoinSymbol::from("BTC")).is_some());
    }

    #[test]
    fn test_build_rejects_empty_base_url() {
        let err = CoinwatchClient::builder().base_url("  ").build().unwrap_err();
        assert!(matches!(err, SdkError::Validation(_)));
    }

    #[tokio::test]
    async fn test_fresh_cache_served_without_network() {
        // Closed port: any network call fails.
        let client = CoinwatchClient::builder()
            .base_url("http://127.0.0.1:9")
            .build()
            .unwrap();
        let btc = CoinSymbol::from("BTC");
        let summary = crate::domain::coin::cache::tests::summary("bitcoin", 7);
        client
            .summary_cache()
            .put(&btc, &summary, chrono::Utc::now())
            .unwrap();

        assert_eq!(client.coins().get(&btc).await.unwrap(), summary);

        client.coins().invalidate(&btc);
        assert!(client.coins().get(&btc).await.is_err());
    }

    #[tokio::test]
    async fn test_summary_source_reports_upstream_unavailable() {
        let client = CoinwatchClient::builder()
            .base_url("http://127.0.0.1:9")
            .build()
            .unwrap();

        let err = client
            .coin_summary(&CoinSymbol::from("BTC"))
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::UpstreamUnavailable(_)));
    }
}
