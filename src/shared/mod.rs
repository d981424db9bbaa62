//! Shared newtypes and utilities used across all domain modules.
//!
//! These types are serialization-transparent: they serialize/deserialize identically
//! to the raw strings the upstream API sends, so they can be used directly in wire
//! types without conversion overhead.

pub mod fmt;

use crate::error::SdkError;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

// ─── CoinSymbol ──────────────────────────────────────────────────────────────

/// Ticker symbol of the displayed coin (e.g. `"BTC"` or `"BTC/USDT"`).
///
/// Cache keys are scoped by this value exactly as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoinSymbol(String);

impl CoinSymbol {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base ticker of a trading pair (`"BTC/USDT"` → `"BTC"`).
    pub fn base(&self) -> &str {
        self.0.split('/').next().unwrap_or(&self.0).trim()
    }

    /// Resolve the upstream coin identifier for this symbol.
    ///
    /// Known tickers map through a fixed table; anything else falls back to the
    /// lowercased base ticker.
    pub fn coin_id(&self) -> CoinId {
        let base = self.base().to_ascii_uppercase();
        match known_coin_id(&base) {
            Some(id) => CoinId::from(id),
            None => {
                tracing::debug!(symbol = %self, "Symbol not mapped, using lowercase fallback");
                CoinId(base.to_ascii_lowercase())
            }
        }
    }
}

fn known_coin_id(base: &str) -> Option<&'static str> {
    let id = match base {
        "BTC" => "bitcoin",
        "ETH" => "ethereum",
        "SOL" => "solana",
        "XRP" => "ripple",
        "ADA" => "cardano",
        "DOGE" => "dogecoin",
        "BNB" => "binancecoin",
        "MATIC" => "matic-network",
        "DOT" => "polkadot",
        "AVAX" => "avalanche-2",
        "LINK" => "chainlink",
        "UNI" => "uniswap",
        "LTC" => "litecoin",
        "USDT" => "tether",
        "USDC" => "usd-coin",
        _ => return None,
    };
    Some(id)
}

impl std::fmt::Display for CoinSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CoinSymbol {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CoinSymbol {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ─── CoinId ──────────────────────────────────────────────────────────────────

/// Upstream coin identifier (e.g. `"bitcoin"`), used as the API key for
/// summary and chart requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoinId(String);

impl CoinId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CoinId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CoinId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CoinId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Serialize for CoinId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CoinId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(CoinId(s))
    }
}

// ─── Timeframe ───────────────────────────────────────────────────────────────

/// Chart timeframe selectable in the panel.
///
/// Each value fixes both the lookback window requested upstream and the
/// trimming applied to the returned series (roughly one sample per minute for
/// the intraday codes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "2h")]
    Hour2,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "6h")]
    Hour6,
    #[serde(rename = "12h")]
    Hour12,
    #[serde(rename = "24h")]
    Hour24,
    #[default]
    #[serde(rename = "7d")]
    Day7,
    #[serde(rename = "30d")]
    Day30,
}

impl Timeframe {
    /// Every selectable timeframe, in selector order.
    pub const ALL: [Timeframe; 8] = [
        Self::Hour1,
        Self::Hour2,
        Self::Hour4,
        Self::Hour6,
        Self::Hour12,
        Self::Hour24,
        Self::Day7,
        Self::Day30,
    ];

    /// Wire code (`"1h"` … `"30d"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hour1 => "1h",
            Self::Hour2 => "2h",
            Self::Hour4 => "4h",
            Self::Hour6 => "6h",
            Self::Hour12 => "12h",
            Self::Hour24 => "24h",
            Self::Day7 => "7d",
            Self::Day30 => "30d",
        }
    }

    /// Selector button label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Hour1 => "1H",
            Self::Hour2 => "2H",
            Self::Hour4 => "4H",
            Self::Hour6 => "6H",
            Self::Hour12 => "12H",
            Self::Hour24 => "24H",
            Self::Day7 => "7D",
            Self::Day30 => "30D",
        }
    }

    /// Days of raw samples to request from the market-chart endpoint.
    pub fn lookback_days(&self) -> u32 {
        match self {
            Self::Hour1 | Self::Hour2 => 1,
            Self::Hour4 => 2,
            Self::Hour6 => 3,
            Self::Hour12 => 4,
            Self::Hour24 | Self::Day7 => 7,
            Self::Day30 => 30,
        }
    }

    /// Trailing samples kept for intraday codes; `None` keeps the full series.
    pub fn trailing_samples(&self) -> Option<usize> {
        match self {
            Self::Hour1 => Some(60),
            Self::Hour2 => Some(120),
            Self::Hour4 => Some(240),
            Self::Hour6 => Some(360),
            Self::Hour12 => Some(720),
            Self::Hour24 => Some(1440),
            Self::Day7 | Self::Day30 => None,
        }
    }

    pub fn is_intraday(&self) -> bool {
        self.trailing_samples().is_some()
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tf| tf.as_str() == s)
            .ok_or_else(|| SdkError::InvalidTimeframe(s.to_string()))
    }
}

// ─── Utilities ───────────────────────────────────────────────────────────────

/// Convert an upstream JSON float to a `Decimal`.
///
/// Goes through the shortest round-trip string so `0.1` stays `0.1` instead of
/// picking up binary noise. Returns `None` for non-finite or out-of-range values.
pub fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_str(&value.to_string())
        .ok()
        .or_else(|| Decimal::from_f64(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_from_f64() {
        assert_eq!(decimal_from_f64(0.1), Some(Decimal::new(1, 1)));
        assert_eq!(decimal_from_f64(101958.25), Some(Decimal::new(10195825, 2)));
        assert_eq!(decimal_from_f64(0.000123), Some(Decimal::new(123, 6)));
        assert_eq!(decimal_from_f64(f64::NAN), None);
        assert_eq!(decimal_from_f64(f64::INFINITY), None);
    }

    #[test]
    fn test_coin_id_known_symbols() {
        assert_eq!(CoinSymbol::from("BTC").coin_id().as_str(), "bitcoin");
        assert_eq!(CoinSymbol::from("eth").coin_id().as_str(), "ethereum");
        assert_eq!(CoinSymbol::from("AVAX/USDT").coin_id().as_str(), "avalanche-2");
        assert_eq!(CoinSymbol::from("MATIC/USDT").coin_id().as_str(), "matic-network");
    }

    #[test]
    fn test_coin_id_fallback_lowercases_base() {
        assert_eq!(CoinSymbol::from("PEPE").coin_id().as_str(), "pepe");
        assert_eq!(CoinSymbol::from("ARB/USDT").coin_id().as_str(), "arb");
    }

    #[test]
    fn test_coin_id_serde() {
        let id = CoinId::from("bitcoin");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"bitcoin\"");
        let back: CoinId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn test_timeframe_table() {
        let days: Vec<u32> = Timeframe::ALL.iter().map(|tf| tf.lookback_days()).collect();
        assert_eq!(days, vec![1, 1, 2, 3, 4, 7, 7, 30]);

        let kept: Vec<Option<usize>> =
            Timeframe::ALL.iter().map(|tf| tf.trailing_samples()).collect();
        assert_eq!(
            kept,
            vec![
                Some(60),
                Some(120),
                Some(240),
                Some(360),
                Some(720),
                Some(1440),
                None,
                None
            ]
        );
    }

    #[test]
    fn test_timeframe_default_is_seven_days() {
        assert_eq!(Timeframe::default(), Timeframe::Day7);
        assert!(!Timeframe::default().is_intraday());
    }

    #[test]
    fn test_timeframe_parse() {
        assert_eq!("12h".parse::<Timeframe>().unwrap(), Timeframe::Hour12);
        assert_eq!("30d".parse::<Timeframe>().unwrap(), Timeframe::Day30);
        assert!(matches!(
            "3h".parse::<Timeframe>(),
            Err(SdkError::InvalidTimeframe(code)) if code == "3h"
        ));
    }

    #[test]
    fn test_timeframe_serde() {
        let tf: Timeframe = serde_json::from_str("\"24h\"").unwrap();
        assert_eq!(tf, Timeframe::Hour24);
        assert_eq!(tf.label(), "24H");
        assert_eq!(serde_json::to_string(&Timeframe::Hour2).unwrap(), "\"2h\"");
    }
}
