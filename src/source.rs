//! Collaborator traits for upstream data.
//!
//! The refresh logic and the session task only talk to these traits, so they
//! run unchanged against the HTTP client or an in-memory double.

use crate::domain::chart::PriceSample;
use crate::domain::coin::CoinSummary;
use crate::error::SdkError;
use crate::shared::{CoinId, CoinSymbol};
use async_trait::async_trait;

/// Fetches the current market summary for a symbol.
///
/// Any error means "unavailable"; callers do not inspect it beyond logging.
#[async_trait]
pub trait SummarySource: Send + Sync {
    async fn coin_summary(&self, symbol: &CoinSymbol) -> Result<CoinSummary, SdkError>;
}

/// Fetches the raw `(timestamp, price)` series for a coin.
///
/// A response without price data must surface as [`SdkError::NoChartData`].
#[async_trait]
pub trait ChartSource: Send + Sync {
    async fn market_chart(
        &self,
        coin_id: &CoinId,
        days: u32,
    ) -> Result<Vec<PriceSample>, SdkError>;
}
