//! Chart domain: raw price samples, timeframe trimming, percent change.

#[cfg(feature = "http")]
pub mod client;
pub mod convert;
pub mod state;
pub mod wire;

use crate::error::SdkError;
use crate::shared::fmt::Trend;
use crate::shared::{CoinId, Timeframe};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use state::{ChartApply, ChartRequest, ChartState};

/// One raw `(timestamp, price)` pair from the market-chart endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSample {
    /// Unix timestamp in milliseconds.
    pub timestamp_ms: i64,
    pub price: Decimal,
}

impl PriceSample {
    pub fn new(timestamp_ms: i64, price: Decimal) -> Self {
        Self {
            timestamp_ms,
            price,
        }
    }
}

/// A retained sample with its position in the trimmed series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Ordinal position, starting at 0. Hosts use it as the x axis.
    pub index: usize,
    pub timestamp_ms: i64,
    pub price: Decimal,
}

/// Trim `raw` to `timeframe` and index what remains.
///
/// Intraday timeframes keep the trailing N samples, or everything when fewer
/// exist. Day timeframes keep the series as delivered.
pub fn derive(raw: &[PriceSample], timeframe: Timeframe) -> Vec<PricePoint> {
    let start = match timeframe.trailing_samples() {
        Some(keep) => raw.len().saturating_sub(keep),
        None => 0,
    };

    raw[start..]
        .iter()
        .enumerate()
        .map(|(index, s)| PricePoint {
            index,
            timestamp_ms: s.timestamp_ms,
            price: s.price,
        })
        .collect()
}

/// [`derive`] keyed by a timeframe code such as `"4h"`.
pub fn derive_code(raw: &[PriceSample], code: &str) -> Result<Vec<PricePoint>, SdkError> {
    let timeframe: Timeframe = code.parse()?;
    Ok(derive(raw, timeframe))
}

/// `(last - first) / first * 100`.
///
/// Zero for fewer than two points, and when the first price is zero.
pub fn percent_change(points: &[PricePoint]) -> Decimal {
    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() >= 2 => (first.price, last.price),
        _ => return Decimal::ZERO,
    };

    (last - first)
        .checked_div(first)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

/// Derived series plus the coin and timeframe it was derived for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub coin_id: CoinId,
    pub timeframe: Timeframe,
    pub points: Vec<PricePoint>,
}

impl ChartSeries {
    pub fn derive(coin_id: CoinId, timeframe: Timeframe, raw: &[PriceSample]) -> Self {
        Self {
            coin_id,
            timeframe,
            points: derive(raw, timeframe),
        }
    }

    pub fn percent_change(&self) -> Decimal {
        percent_change(&self.points)
    }

    pub fn trend(&self) -> Trend {
        Trend::of(&self.percent_change())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(prices: &[i64]) -> Vec<PriceSample> {
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| PriceSample::new(i as i64 * 60_000, Decimal::new(*p, 0)))
            .collect()
    }

    fn points(prices: &[i64]) -> Vec<PricePoint> {
        derive(&samples(prices), Timeframe::Day7)
    }

    #[test]
    fn test_derive_1h_keeps_trailing_60() {
        let prices: Vec<i64> = (0..100).collect();
        let derived = derive(&samples(&prices), Timeframe::Hour1);

        assert_eq!(derived.len(), 60);
        assert_eq!(derived[0].index, 0);
        assert_eq!(derived[0].price, Decimal::new(40, 0));
        assert_eq!(derived[0].timestamp_ms, 40 * 60_000);
        assert_eq!(derived[59].index, 59);
        assert_eq!(derived[59].price, Decimal::new(99, 0));
    }

    #[test]
    fn test_derive_short_series_kept_whole() {
        let prices: Vec<i64> = (0..30).collect();
        let raw = samples(&prices);
        let derived = derive(&raw, Timeframe::Hour1);

        assert_eq!(derived.len(), 30);
        for (i, p) in derived.iter().enumerate() {
            assert_eq!(p.index, i);
            assert_eq!(p.price, raw[i].price);
        }
    }

    #[test]
    fn test_derive_day_timeframes_keep_everything() {
        let prices: Vec<i64> = (0..2_000).collect();
        let raw = samples(&prices);
        assert_eq!(derive(&raw, Timeframe::Day7).len(), 2_000);
        assert_eq!(derive(&raw, Timeframe::Day30).len(), 2_000);
        assert_eq!(derive(&raw, Timeframe::Hour24).len(), 1_440);
    }

    #[test]
    fn test_derive_empty() {
        for tf in Timeframe::ALL {
            assert!(derive(&[], tf).is_empty());
        }
    }

    #[test]
    fn test_derive_code() {
        let prices: Vec<i64> = (0..500).collect();
        let raw = samples(&prices);
        assert_eq!(derive_code(&raw, "4h").unwrap().len(), 240);
        assert!(matches!(
            derive_code(&raw, "5m"),
            Err(SdkError::InvalidTimeframe(_))
        ));
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(&[]), Decimal::ZERO);
        assert_eq!(percent_change(&points(&[100])), Decimal::ZERO);
        assert_eq!(percent_change(&points(&[100, 110])), Decimal::new(10, 0));
        assert_eq!(percent_change(&points(&[200, 1, 150])), Decimal::new(-25, 0));
    }

    #[test]
    fn test_percent_change_zero_first_price() {
        assert_eq!(percent_change(&points(&[0, 10])), Decimal::ZERO);
    }

    #[test]
    fn test_series_trend() {
        let series = ChartSeries::derive(
            CoinId::from("bitcoin"),
            Timeframe::Hour1,
            &samples(&[100, 90]),
        );
        assert_eq!(series.len(), 2);
        assert_eq!(series.percent_change(), Decimal::new(-10, 0));
        assert_eq!(series.trend(), Trend::Down);

        let flat = ChartSeries::derive(CoinId::from("bitcoin"), Timeframe::Hour1, &[]);
        assert!(flat.is_empty());
        assert_eq!(flat.trend(), Trend::Up);
    }
}
