//! Freshness cache for coin summaries.
//!
//! Each symbol owns two keys in a string key-value store:
//! `coin_data_{symbol}` (JSON payload) and `coin_data_timestamp_{symbol}`
//! (epoch milliseconds as a decimal string). Entries are overwritten, never
//! merged. Absent or malformed entries read as a cache miss.

use super::CoinSummary;
use crate::error::SdkError;
use crate::shared::CoinSymbol;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// String key-value storage backing the freshness cache.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

/// In-process [`CacheStore`]; lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
    }
}

/// A cached summary and the moment it was fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub payload: CoinSummary,
    pub fetched_at: DateTime<Utc>,
}

/// TTL-checked view over a [`CacheStore`], keyed by coin symbol.
#[derive(Clone)]
pub struct FreshnessCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl FreshnessCache {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            ttl: Self::DEFAULT_TTL,
        }
    }

    /// A cache over a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    pub fn data_key(symbol: &CoinSymbol) -> String {
        format!("coin_data_{}", symbol)
    }

    pub fn timestamp_key(symbol: &CoinSymbol) -> String {
        format!("coin_data_timestamp_{}", symbol)
    }

    /// Read the entry for `symbol`, fresh or not.
    pub fn get(&self, symbol: &CoinSymbol) -> Option<CacheEntry> {
        let raw_payload = self.store.get(&Self::data_key(symbol))?;
        let raw_timestamp = self.store.get(&Self::timestamp_key(symbol))?;

        let fetched_at = match raw_timestamp
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
        {
            Some(ts) => ts,
            None => {
                tracing::warn!(%symbol, "Discarding cache entry with malformed timestamp {:?}", raw_timestamp);
                return None;
            }
        };

        match serde_json::from_str::<CoinSummary>(&raw_payload) {
            Ok(payload) => Some(CacheEntry {
                payload,
                fetched_at,
            }),
            Err(e) => {
                tracing::warn!(%symbol, "Discarding malformed cache payload: {}", e);
                None
            }
        }
    }

    /// Whether `entry` is younger than the TTL at `now`.
    pub fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        let age_ms = (now - entry.fetched_at).num_milliseconds();
        age_ms < self.ttl.as_millis() as i64
    }

    /// Overwrite the entry for `symbol` with `(payload, now)`.
    pub fn put(
        &self,
        symbol: &CoinSymbol,
        payload: &CoinSummary,
        now: DateTime<Utc>,
    ) -> Result<(), SdkError> {
        let json = serde_json::to_string(payload)?;
        self.store.set(&Self::data_key(symbol), json);
        self.store
            .set(&Self::timestamp_key(symbol), now.timestamp_millis().to_string());
        Ok(())
    }

    /// Drop the entry for `symbol`.
    pub fn invalidate(&self, symbol: &CoinSymbol) {
        self.store.remove(&Self::data_key(symbol));
        self.store.remove(&Self::timestamp_key(symbol));
    }
}

impl std::fmt::Debug for FreshnessCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FreshnessCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
