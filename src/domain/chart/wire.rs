//! Wire types for the market-chart endpoint (REST).

use serde::{Deserialize, Serialize};

/// `GET /coins/{id}/market_chart`.
///
/// `prices` is a list of `[timestamp_ms, price]` pairs; prices are
/// occasionally `null` upstream. The `market_caps` and `total_volumes`
/// series are not read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketChartResponse {
    #[serde(default)]
    pub prices: Option<Vec<(f64, Option<f64>)>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_market_chart() {
        let json = r#"{
            "prices": [[1711843200000, 69702.3], [1711846800000, null]],
            "market_caps": [[1711843200000, 1370000000000.5]],
            "total_volumes": [[1711843200000, 16408802301.8]]
        }"#;
        let resp: MarketChartResponse = serde_json::from_str(json).unwrap();
        let prices = resp.prices.unwrap();
        assert_eq!(prices.len(), 2);
        assert_eq!(prices[0], (1711843200000.0, Some(69702.3)));
        assert_eq!(prices[1].1, None);
    }

    #[test]
    fn test_deserialize_missing_prices() {
        let resp: MarketChartResponse = serde_json::from_str(r#"{"error":"coin not found"}"#).unwrap();
        assert!(resp.prices.is_none());
    }
}
