//! Timestamp normalization
//!
//! Tool logs record time in several shapes: epoch seconds, epoch
//! milliseconds, and ISO-like strings with or without a trailing `Z`.
//! Everything here is total: bad input yields `None`, never a panic.
//!
//! Epoch values become local wall-clock time. Strings keep the wall-clock
//! value exactly as written, so `2024-01-01T23:30:00Z` lands on January 1st
//! regardless of the machine's zone.

use chrono::{DateTime, Local, NaiveDateTime};
use serde_json::Value;

/// Numeric values above this are epoch milliseconds, otherwise seconds.
pub const MILLIS_THRESHOLD: f64 = 1e12;

/// String layouts accepted, tried in order.
const STRING_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%M:%SZ",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
];

/// Normalize an arbitrary JSON value into a point in time.
///
/// Numbers are treated as epochs, strings are matched against the supported
/// layouts, anything else (including an absent value) is `None`.
pub fn normalize_timestamp(value: Option<&Value>) -> Option<NaiveDateTime> {
    match value? {
        Value::Number(n) => from_epoch(n.as_f64()?),
        Value::String(s) => parse_timestamp_str(s),
        _ => None,
    }
}

/// Convert an epoch number (seconds or milliseconds) to local time.
pub fn from_epoch(value: f64) -> Option<NaiveDateTime> {
    if !value.is_finite() {
        return None;
    }

    let secs = if value > MILLIS_THRESHOLD {
        value / 1000.0
    } else {
        value
    };

    // Outside chrono's representable range (and far outside any real log)
    if secs.abs() > 1e14 {
        return None;
    }

    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9).round().min(999_999_999.0) as u32;
    let utc = DateTime::from_timestamp(whole as i64, nanos)?;
    Some(utc.with_timezone(&Local).naive_local())
}

/// Parse a timestamp string against the supported layouts; first match wins.
pub fn parse_timestamp_str(raw: &str) -> Option<NaiveDateTime> {
    STRING_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}
