//! Low-level HTTP client — `CoinGeckoHttp`.
//!
//! One method per API endpoint. Returns wire types; conversion to domain types
//! happens in the sub-clients.

use crate::domain::chart::wire::MarketChartResponse;
use crate::domain::coin::wire::CoinMarketResponse;
use crate::error::HttpError;
use crate::http::retry::{RetryConfig, RetryPolicy};
use crate::network;
use crate::shared::CoinId;

use async_lock::RwLock;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Low-level HTTP client for the CoinGecko REST API.
pub struct CoinGeckoHttp {
    base_url: String,
    client: Client,
    /// API key sent with every request. NEVER exposed publicly.
    api_key: Arc<RwLock<Option<String>>>,
    key_header: &'static str,
    chart_retry: RetryPolicy,
}

impl CoinGeckoHttp {
    pub fn new(base_url: &str) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            api_key: Arc::new(RwLock::new(None)),
            key_header: network::api_key_header(base_url),
            chart_retry: RetryPolicy::Idempotent,
        })
    }

    /// Retry policy for market-chart requests (default: idempotent).
    pub fn with_chart_retry(mut self, retry: RetryPolicy) -> Self {
        self.chart_retry = retry;
        self
    }

    /// Initial API key, before the client is shared.
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = Arc::new(RwLock::new(key));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) async fn set_api_key(&self, key: Option<String>) {
        *self.api_key.write().await = key;
    }

    pub(crate) async fn has_api_key(&self) -> bool {
        self.api_key.read().await.is_some()
    }

    // ── Coins ────────────────────────────────────────────────────────────

    /// `GET /coins/markets?vs_currency=usd&ids={id}`.
    ///
    /// Not retried: a failed summary fetch waits for the next poll.
    pub async fn get_coin_markets(
        &self,
        coin_id: &CoinId,
    ) -> Result<Vec<CoinMarketResponse>, HttpError> {
        let url = markets_url(&self.base_url, coin_id);
        self.get(&url, RetryPolicy::None).await
    }

    // ── Charts ───────────────────────────────────────────────────────────

    /// `GET /coins/{id}/market_chart?vs_currency=usd&days={days}`.
    pub async fn get_market_chart(
        &self,
        coin_id: &CoinId,
        days: u32,
    ) -> Result<MarketChartResponse, HttpError> {
        let url = market_chart_url(&self.base_url, coin_id, days);
        self.get(&url, self.chart_retry.clone()).await
    }

    // ── Internal HTTP methods ────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: &str, retry: RetryPolicy) -> Result<T, HttpError> {
        let config = match &retry {
            RetryPolicy::None => {
                return self.do_request(url).await;
            }
            RetryPolicy::Idempotent => RetryConfig::idempotent(),
            RetryPolicy::Custom(c) => c.clone(),
        };

        let mut last_error = None;

        for attempt in 0..=config.max_retries {
            match self.do_request::<T>(url).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    let should_retry = match &e {
                        HttpError::ServerError { status, .. } => {
                            config.retryable_statuses.contains(status)
                        }
                        HttpError::RateLimited { retry_after_ms } => {
                            if let Some(ms) = retry_after_ms {
                                let delay = Duration::from_millis(*ms).min(config.max_delay);
                                futures_timer::Delay::new(delay).await;
                            }
                            config.retryable_statuses.contains(&429)
                        }
                        HttpError::Timeout => true,
                        HttpError::Reqwest(re) => re.is_connect() || re.is_request(),
                        _ => false,
                    };

                    if should_retry && attempt < config.max_retries {
                        let delay = config.delay_for_attempt(attempt);
                        tracing::debug!(
                            attempt = attempt + 1,
                            max = config.max_retries,
                            delay_ms = delay.as_millis() as u64,
                            "Retrying request to {}",
                            url
                        );
                        futures_timer::Delay::new(delay).await;
                        last_error = Some(e);
                    } else {
                        return Err(e);
                    }
                }
            }
        }

        Err(HttpError::MaxRetriesExceeded {
            attempts: config.max_retries + 1,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    async fn do_request<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        let mut req = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json");

        if let Some(key) = self.api_key.read().await.as_ref() {
            req = req.header(self.key_header, key);
        }

        let resp = req.send().await.map_err(transport_error)?;
        let status = resp.status();

        if status.is_success() {
            let parsed = resp.json::<T>().await.map_err(transport_error)?;
            return Ok(parsed);
        }

        let status_code = status.as_u16();
        let retry_after_ms = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);
        let body_text = resp.text().await.unwrap_or_default();

        match status_code {
            401 | 403 => Err(HttpError::Unauthorized),
            404 => Err(HttpError::NotFound(body_text)),
            429 => Err(HttpError::RateLimited { retry_after_ms }),
            400..=499 => Err(HttpError::BadRequest(body_text)),
            _ => Err(HttpError::ServerError {
                status: status_code,
                body: body_text,
            }),
        }
    }
}

impl Clone for CoinGeckoHttp {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            client: self.client.clone(),
            api_key: self.api_key.clone(),
            key_header: self.key_header,
            chart_retry: self.chart_retry.clone(),
        }
    }
}

impl std::fmt::Debug for CoinGeckoHttp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinGeckoHttp")
            .field("base_url", &self.base_url)
            .field("chart_retry", &self.chart_retry)
            .finish_non_exhaustive()
    }
}

fn transport_error(e: reqwest::Error) -> HttpError {
    if e.is_timeout() {
        HttpError::Timeout
    } else {
        HttpError::Reqwest(e)
    }
}

pub(crate) fn markets_url(base_url: &str, coin_id: &CoinId) -> String {
    format!(
        "{}/coins/markets?vs_currency={}&ids={}",
        base_url,
        network::VS_CURRENCY,
        urlencoding::encode(coin_id.as_str())
    )
}

pub(crate) fn market_chart_url(base_url: &str, coin_id: &CoinId, days: u32) -> String {
    format!(
        "{}/coins/{}/market_chart?vs_currency={}&days={}",
        base_url,
        urlencoding::encode(coin_id.as_str()),
        network::VS_CURRENCY,
        days
    )
}

/// `Retry-After` in delay-seconds form, as milliseconds. HTTP dates are ignored.
pub(crate) fn parse_retry_after(value: &str) -> Option<u64> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| secs.saturating_mul(1_000))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        let id = CoinId::from("bitcoin");
        assert_eq!(
            markets_url(network::DEFAULT_API_URL, &id),
            "https://api.coingecko.com/api/v3/coins/markets?vs_currency=usd&ids=bitcoin"
        );
        assert_eq!(
            market_chart_url(network::DEFAULT_API_URL, &id, 30),
            "https://api.coingecko.com/api/v3/coins/bitcoin/market_chart?vs_currency=usd&days=30"
        );
    }

    #[test]
    fn test_coin_id_is_url_encoded() {
        let id = CoinId::from("weird coin/x");
        assert!(markets_url("http://h", &id).ends_with("ids=weird%20coin%2Fx"));
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after("30"), Some(30_000));
        assert_eq!(parse_retry_after(" 2 "), Some(2_000));
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
    }

    #[tokio::test]
    async fn test_new_trims_base_url_and_picks_key_header() {
        let http = CoinGeckoHttp::new("https://pro-api.coingecko.com/api/v3/").unwrap();
        assert_eq!(http.base_url(), network::PRO_API_URL);
        assert_eq!(http.key_header, network::PRO_API_KEY_HEADER);

        assert!(!http.has_api_key().await);
        http.set_api_key(Some("k".into())).await;
        assert!(http.clone().has_api_key().await);
    }
}
