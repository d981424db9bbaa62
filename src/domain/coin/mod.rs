//! Coin summary domain: market snapshot, freshness cache, refresh state.

pub mod cache;
#[cfg(feature = "http")]
pub mod client;
pub mod convert;
pub mod display;
pub mod refresh;
pub mod state;
pub mod wire;

use crate::shared::CoinId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cache::{CacheEntry, CacheStore, FreshnessCache, MemoryStore};
pub use display::SummaryDisplay;
pub use refresh::{RefreshOutcome, SummaryRefresher};
pub use state::SummaryState;

/// Market snapshot for one coin, quoted in USD.
///
/// Immutable once built; every successful fetch replaces the whole value.
/// Optional upstream fields follow explicit default policies, see
/// [`convert`](self::convert).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinSummary {
    pub id: CoinId,
    pub symbol: String,
    pub name: String,
    pub image: String,
    pub current_price: Decimal,
    pub price_change_24h: Decimal,
    pub price_change_percentage_24h: Decimal,
    pub market_cap: Decimal,
    pub market_cap_rank: Option<u32>,
    pub total_volume: Decimal,
    pub circulating_supply: Option<Decimal>,
    pub total_supply: Option<Decimal>,
    pub max_supply: Option<Decimal>,
    pub ath: Decimal,
    pub ath_change_percentage: Decimal,
    pub atl: Decimal,
    pub atl_change_percentage: Decimal,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Reasons an upstream market record cannot become a [`CoinSummary`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing coin id")]
    MissingId,

    #[error("Missing current price for {0}")]
    MissingPrice(String),

    #[error("Field {field} of {coin} is not a representable decimal")]
    InvalidNumber { coin: String, field: &'static str },
}
