//! Wire types for coin market responses (REST).

use serde::{Deserialize, Serialize};

/// One element of `GET /coins/markets`.
///
/// Every numeric field is optional upstream; defaults are applied during
/// conversion, not here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinMarketResponse {
    pub id: Option<String>,
    pub symbol: String,
    pub name: String,
    pub image: Option<String>,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub market_cap_rank: Option<u32>,
    pub total_volume: Option<f64>,
    pub price_change_24h: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
    pub circulating_supply: Option<f64>,
    pub total_supply: Option<f64>,
    pub max_supply: Option<f64>,
    pub ath: Option<f64>,
    pub ath_change_percentage: Option<f64>,
    pub atl: Option<f64>,
    pub atl_change_percentage: Option<f64>,
    pub last_updated: Option<String>,
}
