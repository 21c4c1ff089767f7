//! Host-enumerated display date formats.
//!
//! # Responsibility
//! - Map host format identifiers to date-input token patterns.
//! - Convert user-typed date input to epoch seconds/milliseconds.
//!
//! # Invariants
//! - Identifiers are the `%`-directive strings the host stores in settings.
//! - Input patterns are extended with clock components only when the value
//!   visibly carries them.

use super::error::{FormatError, ParseError};
use super::pattern::DatePattern;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

/// Display date format identifiers known to this host version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateFormat {
    #[serde(rename = "%d/%m/%Y %H:%M:%S")]
    DateMonthYearHourMinuteSecond,
    #[serde(rename = "%m/%d/%Y %H:%M:%S")]
    MonthDateYearHourMinuteSecond,
    #[serde(rename = "%Y/%m/%d %H:%M:%S")]
    YearMonthDateHourMinuteSecond,
}

impl DateFormat {
    pub const ALL: [DateFormat; 3] = [
        Self::DateMonthYearHourMinuteSecond,
        Self::MonthDateYearHourMinuteSecond,
        Self::YearMonthDateHourMinuteSecond,
    ];

    /// Stable identifier string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DateMonthYearHourMinuteSecond => "%d/%m/%Y %H:%M:%S",
            Self::MonthDateYearHourMinuteSecond => "%m/%d/%Y %H:%M:%S",
            Self::YearMonthDateHourMinuteSecond => "%Y/%m/%d %H:%M:%S",
        }
    }

    pub fn from_id(id: &str) -> Result<Self, FormatError> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == id)
            .ok_or_else(|| FormatError::UnknownDateFormat(id.to_string()))
    }

    /// Token pattern for the date part of user input.
    pub fn input_pattern(self) -> &'static str {
        match self {
            Self::DateMonthYearHourMinuteSecond => "DD/MM/YYYY",
            Self::MonthDateYearHourMinuteSecond => "MM/DD/YYYY",
            Self::YearMonthDateHourMinuteSecond => "YYYY/MM/DD",
        }
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        Self::DateMonthYearHourMinuteSecond
    }
}

/// Returns the date-input token pattern for one host format identifier.
pub fn date_input_iso_format(id: &str) -> Result<&'static str, FormatError> {
    DateFormat::from_id(id).map(DateFormat::input_pattern)
}

/// Converts user date input to epoch seconds.
pub fn convert_to_timestamp(
    value: &str,
    id: &str,
    host_offset: FixedOffset,
) -> Result<i64, ParseError> {
    let pattern = input_pattern_for(value, DateFormat::from_id(id)?, false);
    let parsed = DatePattern::compile(&pattern)?.parse(value, host_offset)?;
    Ok(parsed.timestamp())
}

/// Converts user date input to epoch milliseconds, honoring `.SSS` suffixes.
pub fn convert_to_timestamp_millis(
    value: &str,
    id: &str,
    host_offset: FixedOffset,
) -> Result<i64, ParseError> {
    let pattern = input_pattern_for(value, DateFormat::from_id(id)?, true);
    let parsed = DatePattern::compile(&pattern)?.parse(value, host_offset)?;
    Ok(parsed.timestamp_millis())
}

fn input_pattern_for(value: &str, format: DateFormat, milliseconds: bool) -> String {
    let mut pattern = format.input_pattern().to_string();
    if value.contains(' ') {
        pattern.push_str(" HH:mm");
        let fraction = milliseconds && char_from_end(value, 4) == Some('.');
        let seconds_colon_at = if fraction { 10 } else { 6 };
        if char_from_end(value, seconds_colon_at) == Some(':') {
            pattern.push_str(":ss");
        }
        if fraction {
            pattern.push_str(".SSS");
        }
    }
    pattern
}

fn char_from_end(value: &str, position: usize) -> Option<char> {
    value.chars().rev().nth(position.checked_sub(1)?)
}

#[cfg(test)]
mod tests {
    use super::{
        convert_to_timestamp, convert_to_timestamp_millis, date_input_iso_format, DateFormat,
    };
    use crate::time::error::{FormatError, ParseError};
    use chrono::FixedOffset;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).expect("utc offset")
    }

    #[test]
    fn maps_every_host_format_to_input_pattern() {
        assert_eq!(
            date_input_iso_format("%d/%m/%Y %H:%M:%S").expect("known"),
            "DD/MM/YYYY"
        );
        assert_eq!(
            date_input_iso_format("%m/%d/%Y %H:%M:%S").expect("known"),
            "MM/DD/YYYY"
        );
        assert_eq!(
            date_input_iso_format("%Y/%m/%d %H:%M:%S").expect("known"),
            "YYYY/MM/DD"
        );
    }

    #[test]
    fn rejects_unknown_host_format() {
        let err = date_input_iso_format("%Y").expect_err("unknown id");
        assert_eq!(err, FormatError::UnknownDateFormat("%Y".to_string()));

        let err = convert_to_timestamp("11/06/2023", "nope", utc()).expect_err("unknown id");
        assert_eq!(err, ParseError::UnknownDateFormat("nope".to_string()));
    }

    #[test]
    fn converts_date_only_input() {
        let ts = convert_to_timestamp("11/06/2023", DateFormat::default().as_str(), utc())
            .expect("convert");
        assert_eq!(ts, 1_686_441_600);
    }

    #[test]
    fn converts_input_with_minutes_and_seconds() {
        let id = DateFormat::YearMonthDateHourMinuteSecond.as_str();
        assert_eq!(
            convert_to_timestamp("2023/06/11 14:51", id, utc()).expect("minutes"),
            1_686_495_060
        );
        assert_eq!(
            convert_to_timestamp("2023/06/11 14:51:23", id, utc()).expect("seconds"),
            1_686_495_083
        );
    }

    #[test]
    fn converts_input_with_milliseconds() {
        let id = DateFormat::MonthDateYearHourMinuteSecond.as_str();
        let ms = convert_to_timestamp_millis("06/11/2023 14:51:23.250", id, utc())
            .expect("milliseconds");
        assert_eq!(ms, 1_686_495_083_250);
    }

    #[test]
    fn rejects_input_in_other_order() {
        let id = DateFormat::YearMonthDateHourMinuteSecond.as_str();
        assert!(convert_to_timestamp("11/06/2023", id, utc()).is_err());
    }
}
