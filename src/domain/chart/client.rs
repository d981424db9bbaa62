//! Charts sub-client — market-chart queries.

use crate::client::CoinwatchClient;
use crate::domain::chart::{ChartSeries, PriceSample};
use crate::error::SdkError;
use crate::shared::{CoinId, Timeframe};

/// Sub-client for chart data.
pub struct Charts<'a> {
    pub(crate) client: &'a CoinwatchClient,
}

impl<'a> Charts<'a> {
    /// Raw price samples covering the last `days` days.
    pub async fn raw_series(
        &self,
        coin_id: &CoinId,
        days: u32,
    ) -> Result<Vec<PriceSample>, SdkError> {
        self.client
            .http
            .get_market_chart(coin_id, days)
            .await?
            .into_samples(coin_id)
    }

    /// Fetch and derive the series for `timeframe`.
    pub async fn series(
        &self,
        coin_id: &CoinId,
        timeframe: Timeframe,
    ) -> Result<ChartSeries, SdkError> {
        let raw = self.raw_series(coin_id, timeframe.lookback_days()).await?;
        Ok(ChartSeries::derive(coin_id.clone(), timeframe, &raw))
    }
}
