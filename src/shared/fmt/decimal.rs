//! Decimal formatting for prices, market caps, volumes and supplies.
//!
//! All rounding is half away from zero, so `0.125` at two places shows as `0.13`.

use super::num::{group_thousands, trim_fraction};
use rust_decimal::prelude::*;

/// Below 1 a price keeps up to six fraction digits.
const SUB_UNIT_DECIMALS: u32 = 6;
const STANDARD_DECIMALS: u32 = 2;

fn round(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

fn sign_of(value: &Decimal, rounded_abs: &Decimal) -> &'static str {
    if value.is_sign_negative() && !rounded_abs.is_zero() {
        "-"
    } else {
        ""
    }
}

/// Format a USD price.
///
/// Two fraction digits, or up to six when `value < 1` so sub-cent prices keep
/// their significant digits. Negative amounts always take the six-digit
/// branch. Thousands are grouped.
pub fn format_price(value: &Decimal) -> String {
    let max_decimals = if *value < Decimal::ONE {
        SUB_UNIT_DECIMALS
    } else {
        STANDARD_DECIMALS
    };
    let rounded = round(value.abs(), max_decimals);
    let fixed = format!("{:.precision$}", rounded, precision = max_decimals as usize);
    let body = group_thousands(&trim_fraction(&fixed, STANDARD_DECIMALS as usize));
    format!("{}${}", sign_of(value, &rounded), body)
}

/// Format a price delta with an explicit `+` for non-negative values.
pub fn format_signed_price(value: &Decimal) -> String {
    if value.is_sign_negative() && !value.is_zero() {
        format_price(value)
    } else {
        format!("+{}", format_price(value))
    }
}

/// Format a percentage with two places and an explicit sign (`+2.35%`).
pub fn format_signed_percent(value: &Decimal) -> String {
    let rounded = round(*value, 2);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("{:.2}%", rounded)
    } else {
        format!("+{:.2}%", rounded.abs())
    }
}

/// Format a percentage with two places and no forced sign (`-12.40%`).
pub fn format_percent(value: &Decimal) -> String {
    let rounded = round(*value, 2);
    if rounded.is_zero() {
        return "0.00%".to_string();
    }
    format!("{:.2}%", rounded)
}

/// Abbreviate a USD amount (market cap, volume) with T/B/M suffixes.
///
/// Below one million the value renders as a grouped integer.
pub fn format_large_number(value: &Decimal) -> String {
    abbreviate(value, &SCALES, "$")
}

/// Abbreviate a token quantity with B/M suffixes, without a currency symbol.
pub fn format_supply(value: &Decimal) -> String {
    abbreviate(value, &SCALES[1..], "")
}

const SCALES: [(u64, char); 3] = [
    (1_000_000_000_000, 'T'),
    (1_000_000_000, 'B'),
    (1_000_000, 'M'),
];

fn abbreviate(value: &Decimal, scales: &[(u64, char)], currency: &str) -> String {
    let abs_value = value.abs();

    for (threshold, suffix) in scales {
        let threshold = Decimal::from(*threshold);
        if abs_value >= threshold {
            let scaled = round(abs_value / threshold, 2);
            return format!(
                "{}{}{:.2}{}",
                sign_of(value, &scaled),
                currency,
                scaled,
                suffix
            );
        }
    }

    let whole = round(abs_value, 0);
    format!(
        "{}{}{}",
        sign_of(value, &whole),
        currency,
        group_thousands(&format!("{:.0}", whole))
    )
}
