//! Conversion: market-chart wire response → price samples.

use super::wire::MarketChartResponse;
use super::PriceSample;
use crate::error::SdkError;
use crate::shared::{decimal_from_f64, CoinId};

impl MarketChartResponse {
    /// Extract the price series.
    ///
    /// A response without a `prices` field is [`SdkError::NoChartData`]; an
    /// empty array is a valid, empty series. Pairs with a null or non-finite
    /// price are skipped.
    pub fn into_samples(self, coin_id: &CoinId) -> Result<Vec<PriceSample>, SdkError> {
        let prices = self
            .prices
            .ok_or_else(|| SdkError::NoChartData(coin_id.to_string()))?;

        let total = prices.len();
        let samples: Vec<PriceSample> = prices
            .into_iter()
            .filter_map(|(ts, price)| {
                let price = price.and_then(decimal_from_f64)?;
                Some(PriceSample::new(ts as i64, price))
            })
            .collect();

        if samples.len() < total {
            tracing::debug!(
                %coin_id,
                skipped = total - samples.len(),
                "Skipped chart samples without a usable price"
            );
        }

        Ok(samples)
    }
}
