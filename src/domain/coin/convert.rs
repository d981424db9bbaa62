//! Conversion: CoinMarketResponse → CoinSummary (TryFrom + default policies).
//!
//! Default policies for absent upstream fields:
//! - 24h change (absolute and percent): 0
//! - ATH/ATL change percent: 0
//! - market cap, 24h volume: 0
//! - ATH/ATL: the current price
//! - rank, supplies, image, last update: left absent (image as empty string)
//!
//! A record without an id or a current price is rejected.

use super::wire::CoinMarketResponse;
use super::{CoinSummary, ValidationError};
use crate::shared::{decimal_from_f64, CoinId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

impl TryFrom<CoinMarketResponse> for CoinSummary {
    type Error = ValidationError;

    fn try_from(source: CoinMarketResponse) -> Result<Self, Self::Error> {
        let id = source
            .id
            .filter(|id| !id.is_empty())
            .ok_or(ValidationError::MissingId)?;

        let decimal = |value: Option<f64>, field: &'static str| -> Result<Option<Decimal>, ValidationError> {
            match value {
                None => Ok(None),
                Some(v) => decimal_from_f64(v).map(Some).ok_or_else(|| {
                    ValidationError::InvalidNumber {
                        coin: id.clone(),
                        field,
                    }
                }),
            }
        };

        let current_price = decimal(source.current_price, "current_price")?
            .ok_or_else(|| ValidationError::MissingPrice(id.clone()))?;

        let summary = CoinSummary {
            current_price,
            price_change_24h: decimal(source.price_change_24h, "price_change_24h")?
                .unwrap_or_default(),
            price_change_percentage_24h: decimal(
                source.price_change_percentage_24h,
                "price_change_percentage_24h",
            )?
            .unwrap_or_default(),
            market_cap: decimal(source.market_cap, "market_cap")?.unwrap_or_default(),
            market_cap_rank: source.market_cap_rank,
            total_volume: decimal(source.total_volume, "total_volume")?.unwrap_or_default(),
            circulating_supply: decimal(source.circulating_supply, "circulating_supply")?,
            total_supply: decimal(source.total_supply, "total_supply")?,
            max_supply: decimal(source.max_supply, "max_supply")?,
            ath: decimal(source.ath, "ath")?.unwrap_or(current_price),
            ath_change_percentage: decimal(source.ath_change_percentage, "ath_change_percentage")?
                .unwrap_or_default(),
            atl: decimal(source.atl, "atl")?.unwrap_or(current_price),
            atl_change_percentage: decimal(source.atl_change_percentage, "atl_change_percentage")?
                .unwrap_or_default(),
            last_updated: source.last_updated.as_deref().and_then(parse_timestamp),
            image: source.image.unwrap_or_default(),
            symbol: source.symbol,
            name: source.name,
            id: CoinId::from(id.clone()),
        };

        Ok(summary)
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| tracing::debug!("Ignoring malformed last_updated {:?}: {}", raw, e))
        .ok()
}
