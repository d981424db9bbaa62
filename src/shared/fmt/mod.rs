//! Display formatting: prices, abbreviated magnitudes, percentages, ages.

pub mod decimal;
pub mod num;

pub use decimal::{
    format_large_number, format_percent, format_price, format_signed_percent,
    format_signed_price, format_supply,
};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Direction of a price move, used to pick up/down styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    /// Non-negative changes count as up.
    pub fn of(change: &Decimal) -> Self {
        if change.is_sign_negative() && !change.is_zero() {
            Trend::Down
        } else {
            Trend::Up
        }
    }

    pub fn is_up(&self) -> bool {
        matches!(self, Trend::Up)
    }
}

/// Relative age of a timestamp: `"12s ago"` under a minute, `"3m ago"` after.
pub fn format_age(since: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - since).num_seconds().max(0);
    if seconds < 60 {
        format!("{}s ago", seconds)
    } else {
        format!("{}m ago", seconds / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_trend_of() {
        assert_eq!(Trend::of(&Decimal::new(-1, 2)), Trend::Down);
        assert_eq!(Trend::of(&Decimal::ZERO), Trend::Up);
        assert!(Trend::of(&Decimal::new(5, 0)).is_up());
    }

    #[test]
    fn test_format_age() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        assert_eq!(format_age(now - Duration::milliseconds(12_900), now), "12s ago");
        assert_eq!(format_age(now - Duration::seconds(59), now), "59s ago");
        assert_eq!(format_age(now - Duration::seconds(60), now), "1m ago");
        assert_eq!(format_age(now - Duration::seconds(199), now), "3m ago");
        assert_eq!(format_age(now + Duration::seconds(5), now), "0s ago");
    }
}
