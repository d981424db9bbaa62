//! String-level helpers for human-readable numbers.
//!
//! These operate on already-rounded plain numeric strings (`"-1234.50"`), so the
//! `decimal` sibling module decides precision and this module only lays out digits.

/// Adds thousands separators to the integer part, keeping sign and fraction.
pub fn group_thousands(formatted: &str) -> String {
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (integer_part, fraction) = match unsigned.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (unsigned, None),
    };

    let grouped = integer_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|c| std::str::from_utf8(c).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(",");

    match fraction {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// Trims trailing fractional zeros, never going below `min_decimals` digits.
pub fn trim_fraction(formatted: &str, min_decimals: usize) -> String {
    let Some((integer_part, fraction)) = formatted.split_once('.') else {
        return formatted.to_string();
    };

    let trimmed = fraction.trim_end_matches('0');
    let kept = if trimmed.len() >= min_decimals {
        trimmed.to_string()
    } else {
        format!("{:0<width$}", trimmed, width = min_decimals)
    };

    if kept.is_empty() {
        integer_part.to_string()
    } else {
        format!("{}.{}", integer_part, kept)
    }
}
