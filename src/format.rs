//! Display helpers for fee values and timestamps.

use chrono::{DateTime, SecondsFormat, Utc};

/// Render a Gwei value with magnitude-dependent precision.
///
/// `>= 10` → 1 decimal, `>= 1` → 2, `>= 0.1` → 3, anything smaller → 4.
/// The tier is picked from the raw value, so `9.999` renders as `"10.00"`.
/// Rounding is done by `core::fmt`, which rounds the exact binary value
/// half-to-even.
pub fn format_gwei(value: f64) -> String {
    if value >= 10.0 {
        format!("{value:.1}")
    } else if value >= 1.0 {
        format!("{value:.2}")
    } else if value >= 0.1 {
        format!("{value:.3}")
    } else {
        format!("{value:.4}")
    }
}

/// ISO-8601 in UTC, seconds precision, `Z` suffix (e.g. `2025-05-19T08:09:20Z`).
pub fn iso_utc(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Human timestamp used in chat messages: `2025-05-19 08:09:20 UTC`.
pub fn human_utc(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
