//! Chart state container: selected timeframe, current series, request tags.
//!
//! Every fetch is issued as a [`ChartRequest`] carrying a generation tag. A
//! result is only applied while its tag is still the latest one, so a slow
//! response for an old timeframe cannot overwrite a newer selection.

use super::{ChartSeries, PriceSample};
use crate::error::SdkError;
use crate::shared::{CoinId, Timeframe};

/// One chart fetch to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub tag: u64,
    pub coin_id: CoinId,
    pub timeframe: Timeframe,
}

impl ChartRequest {
    /// Lookback to request upstream.
    pub fn days(&self) -> u32 {
        self.timeframe.lookback_days()
    }
}

/// What happened to a fetch result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartApply {
    /// The series was replaced.
    Applied,
    /// A newer request was issued; the result was dropped.
    Superseded,
    /// The fetch failed; the previous series is kept.
    Failed,
}

#[derive(Debug, Clone, Default)]
pub struct ChartState {
    coin_id: Option<CoinId>,
    timeframe: Timeframe,
    series: Option<ChartSeries>,
    generation: u64,
    pending: bool,
}

impl ChartState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeframe(timeframe: Timeframe) -> Self {
        Self {
            timeframe,
            ..Self::default()
        }
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn coin_id(&self) -> Option<&CoinId> {
        self.coin_id.as_ref()
    }

    pub fn series(&self) -> Option<&ChartSeries> {
        self.series.as_ref()
    }

    /// True while the latest request has not resolved.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Point the chart at `coin_id` and issue a fetch.
    ///
    /// A different coin drops the displayed series.
    pub fn set_coin(&mut self, coin_id: CoinId) -> ChartRequest {
        if self.coin_id.as_ref() != Some(&coin_id) {
            self.series = None;
        }
        self.coin_id = Some(coin_id.clone());
        self.issue(coin_id)
    }

    /// Select a timeframe. Issues a fetch once a coin is known.
    pub fn select_timeframe(&mut self, timeframe: Timeframe) -> Option<ChartRequest> {
        self.timeframe = timeframe;
        self.request()
    }

    /// [`select_timeframe`](Self::select_timeframe) by code. Unknown codes
    /// leave the state untouched.
    pub fn select_code(&mut self, code: &str) -> Result<Option<ChartRequest>, SdkError> {
        let timeframe: Timeframe = code.parse()?;
        Ok(self.select_timeframe(timeframe))
    }

    /// Re-issue a fetch for the current coin and timeframe.
    pub fn request(&mut self) -> Option<ChartRequest> {
        let coin_id = self.coin_id.clone()?;
        Some(self.issue(coin_id))
    }

    /// Whether `request` is still the latest one issued.
    pub fn is_current(&self, request: &ChartRequest) -> bool {
        request.tag == self.generation
    }

    /// Apply the result of `request`.
    pub fn apply(
        &mut self,
        request: &ChartRequest,
        result: Result<Vec<PriceSample>, SdkError>,
    ) -> ChartApply {
        if !self.is_current(request) {
            tracing::debug!(
                tag = request.tag,
                latest = self.generation,
                timeframe = %request.timeframe,
                "Discarding superseded chart result"
            );
            return ChartApply::Superseded;
        }
        self.pending = false;

        match result {
            Ok(raw) => {
                self.series = Some(ChartSeries::derive(
                    request.coin_id.clone(),
                    request.timeframe,
                    &raw,
                ));
                ChartApply::Applied
            }
            Err(e) => {
                tracing::error!(
                    coin_id = %request.coin_id,
                    timeframe = %request.timeframe,
                    "Chart fetch failed: {}",
                    e
                );
                ChartApply::Failed
            }
        }
    }

    fn issue(&mut self, coin_id: CoinId) -> ChartRequest {
        self.generation += 1;
        self.pending = true;
        ChartRequest {
            tag: self.generation,
            coin_id,
            timeframe: self.timeframe,
        }
    }
}
