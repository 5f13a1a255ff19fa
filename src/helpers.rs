//! Shared numeric helpers for adapter payloads.
//!
//! - `round_1dp`: weather averages (temperature, humidity) are kept to 0.1
//!   precision, which is what the upstream API reports anyway.
//! - `parse_price`: mandi prices arrive as strings and are kept as exact
//!   `Decimal` values.
//!
//! Both tolerate garbage input instead of failing the whole response.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Round an f64 to 1 decimal place, defaulting to 0 for non-finite inputs.
pub(crate) fn round_1dp(v: f64) -> f64 {
    if !v.is_finite() {
        tracing::warn!("round_1dp received non-finite value {}, defaulting to 0", v);
        return 0.0;
    }
    (v * 10.0).round() / 10.0
}

/// Arithmetic mean rounded to 1 decimal place. `None` for an empty slice.
pub(crate) fn mean_1dp(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().sum();
    Some(round_1dp(sum / values.len() as f64))
}

/// Parse a price string ("2150", "2150.50", " 1,980 ") into a Decimal.
pub(crate) fn parse_price(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}
