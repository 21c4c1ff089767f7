//! Time normalizer: epoch seconds <-> formatted strings.
//!
//! # Responsibility
//! - Convert between UTC epoch seconds and pattern-formatted strings without
//!   exposing the host's date library or the user's display format.
//! - Translate host display-format identifiers for date input.
//!
//! # Invariants
//! - Epochs are whole UTC seconds; rendering applies the host offset.
//! - Only `to_user_selected_format` reads mutable host state.
//! - Failures are explicit `FormatError`/`ParseError` results; the
//!   `"Invalid Date"` sentinel exists only in `format_lossy`.

pub mod clock;
pub mod date_format;
pub mod error;
pub(crate) mod pattern;
pub mod timestamp;

use crate::settings::SettingsStore;
use chrono::{DateTime, FixedOffset, Months, NaiveDate, TimeZone, Utc};
use clock::Clock;
use once_cell::sync::Lazy;
use pattern::DatePattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

pub use date_format::DateFormat;
pub use error::{FormatError, ParseError};

/// Legacy sentinel returned by `format_lossy` on failure.
pub const INVALID_DATE: &str = "Invalid Date";

static LOOSE_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\d{4})[-/]?(\d{1,2})?[-/]?(\d{0,2})[Tt\s]*(\d{1,2})?:?(\d{1,2})?:?(\d{1,2})?[.:]?(\d+)?$",
    )
    .expect("valid loose date regex")
});

/// Units accepted by `epoch_start_subtract`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    fn fixed_seconds(self) -> Option<i64> {
        match self {
            Self::Second => Some(1),
            Self::Minute => Some(60),
            Self::Hour => Some(3_600),
            Self::Day => Some(86_400),
            Self::Week => Some(604_800),
            Self::Month | Self::Year => None,
        }
    }
}

impl FromStr for TimeUnit {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().trim_end_matches('s') {
            "second" => Ok(Self::Second),
            "minute" => Ok(Self::Minute),
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            other => Err(format!("unsupported time unit: {other}")),
        }
    }
}

/// Date utilities exposed on each surface.
#[derive(Clone)]
pub struct TimeNormalizer {
    clock: Arc<dyn Clock>,
    host_offset: FixedOffset,
    settings: Arc<dyn SettingsStore>,
}

impl TimeNormalizer {
    pub(crate) fn new(
        clock: Arc<dyn Clock>,
        host_offset: FixedOffset,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        Self {
            clock,
            host_offset,
            settings,
        }
    }

    /// Current time as whole epoch seconds.
    pub fn epoch(&self) -> i64 {
        self.clock.now().timestamp()
    }

    /// Re-emits `value` in `target_format`.
    ///
    /// The input shape is auto-detected (RFC 3339, then `YYYY[-MM[-DD]][ HH[:mm[:ss[.SSS]]]]`);
    /// `source_format` is only consulted when detection fails. Output is always
    /// rendered at the host offset, whatever offset the input carried.
    pub fn format(
        &self,
        value: &str,
        source_format: &str,
        target_format: &str,
    ) -> Result<String, FormatError> {
        let target = DatePattern::compile(target_format)?;
        let parsed = self
            .detect(value)
            .or_else(|| {
                DatePattern::compile(source_format)
                    .ok()?
                    .parse(value, self.host_offset)
                    .ok()
            })
            .ok_or_else(|| FormatError::UnrecognizedInput {
                value: value.to_string(),
            })?;
        target.render(&parsed.with_timezone(&self.host_offset))
    }

    /// `format` for legacy callers: failures collapse into [`INVALID_DATE`].
    pub fn format_lossy(&self, value: &str, source_format: &str, target_format: &str) -> String {
        self.format(value, source_format, target_format)
            .unwrap_or_else(|_| INVALID_DATE.to_string())
    }

    /// Current time rendered in `format`.
    pub fn now(&self, format: &str) -> Result<String, FormatError> {
        self.epoch_to_format(self.epoch(), format)
    }

    /// Renders `epoch_seconds` in `format` at the host offset.
    pub fn epoch_to_format(&self, epoch_seconds: i64, format: &str) -> Result<String, FormatError> {
        let pattern = DatePattern::compile(format)?;
        pattern.render(&self.at(epoch_seconds)?)
    }

    /// Parses `value` strictly against `format`.
    ///
    /// Formats without time-of-day yield the start of that day. Two-digit years
    /// (`YY`) resolve into the 1970..=2069 window, so instants outside it do not
    /// survive a render/parse round trip.
    pub fn date_to_epoch(&self, value: &str, format: &str) -> Result<i64, ParseError> {
        let pattern = DatePattern::compile(format)?;
        Ok(pattern.parse(value, self.host_offset)?.timestamp())
    }

    /// Current time minus `amount` units, as epoch seconds.
    ///
    /// Calendar units clamp to the end of shorter months. Results before the
    /// earliest representable instant clamp to it.
    pub fn epoch_start_subtract(&self, amount: u32, unit: TimeUnit) -> i64 {
        let now = self.clock.now().with_timezone(&self.host_offset);
        let floor = DateTime::<Utc>::MIN_UTC.timestamp();

        if let Some(seconds) = unit.fixed_seconds() {
            return now
                .timestamp()
                .saturating_sub(i64::from(amount) * seconds)
                .max(floor);
        }

        let months = match unit {
            TimeUnit::Year => amount.saturating_mul(12),
            _ => amount,
        };
        now.checked_sub_months(Months::new(months))
            .map_or(floor, |start| start.timestamp())
    }

    /// Renders `epoch_seconds` in the user's configured display format.
    pub fn to_user_selected_format(&self, epoch_seconds: i64) -> Result<String, FormatError> {
        let format = self.settings.snapshot().date_display_format;
        self.epoch_to_format(epoch_seconds, &format)
    }

    /// Date-input token pattern for a host display-format identifier.
    pub fn get_date_input_iso_format(&self, host_format_id: &str) -> Result<&'static str, FormatError> {
        date_format::date_input_iso_format(host_format_id)
    }

    /// User date input to epoch seconds, per host display-format identifier.
    pub fn convert_to_timestamp(&self, value: &str, host_format_id: &str) -> Result<i64, ParseError> {
        date_format::convert_to_timestamp(value, host_format_id, self.host_offset)
    }

    /// User date input to epoch milliseconds, per host display-format identifier.
    pub fn convert_to_timestamp_millis(
        &self,
        value: &str,
        host_format_id: &str,
    ) -> Result<i64, ParseError> {
        date_format::convert_to_timestamp_millis(value, host_format_id, self.host_offset)
    }

    fn at(&self, epoch_seconds: i64) -> Result<DateTime<FixedOffset>, FormatError> {
        DateTime::<Utc>::from_timestamp(epoch_seconds, 0)
            .map(|utc| utc.with_timezone(&self.host_offset))
            .ok_or(FormatError::OutOfRange {
                epoch: epoch_seconds,
            })
    }

    fn detect(&self, value: &str) -> Option<DateTime<FixedOffset>> {
        let trimmed = value.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
            return Some(parsed);
        }

        let caps = LOOSE_DATE_RE.captures(trimmed)?;
        let number = |index: usize, default: u32| -> Option<u32> {
            match caps.get(index).map(|m| m.as_str()).filter(|s| !s.is_empty()) {
                Some(digits) => digits.parse().ok(),
                None => Some(default),
            }
        };
        let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
        let millis = caps
            .get(7)
            .map(|m| {
                let digits: String = m.as_str().chars().chain("000".chars()).take(3).collect();
                digits.parse::<u32>().unwrap_or(0)
            })
            .unwrap_or(0);

        let naive = NaiveDate::from_ymd_opt(year, number(2, 1)?, number(3, 1)?)?
            .and_hms_milli_opt(number(4, 0)?, number(5, 0)?, number(6, 0)?, millis)?;
        self.host_offset.from_local_datetime(&naive).single()
    }
}

impl std::fmt::Debug for TimeNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeNormalizer")
            .field("host_offset", &self.host_offset)
            .finish_non_exhaustive()
    }
}
