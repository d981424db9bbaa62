//! Formatted view of a [`CoinSummary`]: every string a panel shows.

use super::CoinSummary;
use crate::shared::fmt::{self, Trend};

/// Display strings for one summary. Rendering stays with the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryDisplay {
    pub name: String,
    /// Upper-cased ticker.
    pub symbol: String,
    pub price: String,
    /// 24h change in percent, signed (`+1.25%`).
    pub change_24h_percent: String,
    /// 24h change in USD, signed (`-$1,250.75`).
    pub change_24h_price: String,
    pub trend_24h: Trend,
    pub market_cap: String,
    /// `Rank #1`, or `None` when the upstream has no rank.
    pub market_cap_rank: Option<String>,
    pub volume_24h: String,
    /// Circulating supply, `None` when unknown.
    pub circulating_supply: Option<String>,
    /// `of 21.00M`, shown under the circulating supply when a total exists.
    pub total_supply: Option<String>,
    pub ath: String,
    /// `-19.13% from ATH`
    pub ath_change: String,
    pub atl: String,
    /// `+150200.40% from ATL`
    pub atl_change: String,
}

impl From<&CoinSummary> for SummaryDisplay {
    fn from(s: &CoinSummary) -> Self {
        Self {
            name: s.name.clone(),
            symbol: s.symbol.to_uppercase(),
            price: fmt::format_price(&s.current_price),
            change_24h_percent: fmt::format_signed_percent(&s.price_change_percentage_24h),
            change_24h_price: fmt::format_signed_price(&s.price_change_24h),
            trend_24h: Trend::of(&s.price_change_percentage_24h),
            market_cap: fmt::format_large_number(&s.market_cap),
            market_cap_rank: s.market_cap_rank.map(|rank| format!("Rank #{}", rank)),
            volume_24h: fmt::format_large_number(&s.total_volume),
            circulating_supply: s.circulating_supply.as_ref().map(fmt::format_supply),
            total_supply: s
                .total_supply
                .as_ref()
                .map(|total| format!("of {}", fmt::format_supply(total))),
            ath: fmt::format_price(&s.ath),
            ath_change: format!("{} from ATH", fmt::format_percent(&s.ath_change_percentage)),
            atl: fmt::format_price(&s.atl),
            atl_change: format!(
                "+{} from ATL",
                fmt::format_percent(&s.atl_change_percentage)
            ),
        }
    }
}
