//! Timestamp deserialization helpers for values arriving from data
//! subsystems (JSON entries, float strings, millisecond integers, dated text).
//!
//! # Invariants
//! - Timestamps are whole, non-negative UTC epoch seconds.
//! - Dated text without an explicit offset is read as UTC.

use super::error::ParseError;
use super::pattern::DatePattern;
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde_json::Value;

/// Special format name that selects ISO 8601 parsing.
pub const ISO8601_FORMAT: &str = "iso8601";

const ISO8601_NAIVE_PATTERNS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"];

/// Deserializes a timestamp from a JSON integer, exact float or numeric string.
pub fn deserialize_timestamp(value: &Value) -> Result<i64, ParseError> {
    let invalid = || ParseError::InvalidTimestamp {
        value: value.to_string(),
        location: "timestamp entry".to_string(),
    };

    let timestamp = match value {
        Value::Number(number) => match number.as_i64() {
            Some(whole) => whole,
            None => exact_whole(number.as_f64().ok_or_else(invalid)?).ok_or_else(invalid)?,
        },
        Value::String(text) => {
            let trimmed = text.trim();
            match trimmed.parse::<i64>() {
                Ok(whole) => whole,
                Err(_) => {
                    let float = trimmed.parse::<f64>().map_err(|_| invalid())?;
                    exact_whole(float).ok_or_else(invalid)?
                }
            }
        }
        _ => return Err(invalid()),
    };

    if timestamp < 0 {
        return Err(invalid());
    }
    Ok(timestamp)
}

/// Deserializes a timestamp from a fractional-seconds string, truncating.
pub fn timestamp_from_float_str(value: &str, location: &str) -> Result<i64, ParseError> {
    let invalid = || ParseError::InvalidTimestamp {
        value: value.to_string(),
        location: location.to_string(),
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid());
    }
    if let Ok(whole) = trimmed.parse::<i64>() {
        return Ok(whole);
    }
    let float = trimmed.parse::<f64>().map_err(|_| invalid())?;
    if !float.is_finite() || float.abs() >= i64::MAX as f64 {
        return Err(invalid());
    }
    Ok(float.trunc() as i64)
}

/// Converts epoch milliseconds to epoch seconds.
pub fn timestamp_from_millis(millis: i64) -> i64 {
    millis / 1000
}

/// Deserializes a timestamp from dated text in `format`.
///
/// `format` may be [`ISO8601_FORMAT`]. A trailing `Z` is ignored for other
/// formats. With `skip_milliseconds`, anything after the first `.` is dropped.
pub fn timestamp_from_date(
    date: &str,
    format: &str,
    location: &str,
    skip_milliseconds: bool,
) -> Result<i64, ParseError> {
    if date.is_empty() {
        return Err(ParseError::InvalidTimestamp {
            value: String::new(),
            location: location.to_string(),
        });
    }

    let date = if skip_milliseconds {
        date.split_once('.').map_or(date, |(whole, _)| whole)
    } else {
        date
    };

    if format == ISO8601_FORMAT {
        return iso8601_to_timestamp(date).ok_or_else(|| ParseError::InvalidTimestamp {
            value: date.to_string(),
            location: location.to_string(),
        });
    }

    let utc = FixedOffset::east_opt(0).ok_or_else(|| ParseError::InvalidTimestamp {
        value: date.to_string(),
        location: location.to_string(),
    })?;
    let parsed = DatePattern::compile(format)?.parse(date.trim_end_matches('Z'), utc)?;
    Ok(parsed.timestamp())
}

fn iso8601_to_timestamp(date: &str) -> Option<i64> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(date) {
        return Some(parsed.timestamp());
    }
    ISO8601_NAIVE_PATTERNS.iter().find_map(|pattern| {
        NaiveDateTime::parse_from_str(date, pattern)
            .ok()
            .map(|naive| naive.and_utc().timestamp())
    })
}

fn exact_whole(value: f64) -> Option<i64> {
    if !value.is_finite() || value.fract() != 0.0 || value.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(value as i64)
}
