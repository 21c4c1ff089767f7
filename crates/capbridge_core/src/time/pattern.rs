//! Date pattern compilation.
//!
//! Two dialects are accepted wherever a format string crosses the boundary:
//! token patterns (`YYYY-MM-DD HH:mm:ss`, `[literal]` escapes) and
//! `%`-directive patterns (`%d/%m/%Y %H:%M:%S`). Token patterns are translated
//! into directives once, so rendering and parsing share one code path.
//!
//! # Invariants
//! - A pattern is a directive pattern when some `%` is followed by a directive
//!   character; a bare `%` (trailing, or before whitespace) stays literal.
//! - `YY` parses into the 1970..=2069 window (chrono's `%y` rule).
//! - A compiled pattern never contains an invalid directive item.

use super::error::{FormatError, ParseError};
use chrono::format::{parse, Fixed, Item, Numeric, Parsed, StrftimeItems};
use chrono::{DateTime, FixedOffset, TimeZone};
use std::fmt::Write;
use std::iter::Peekable;
use std::str::Chars;

/// Calendar and clock components a pattern carries.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PatternFields {
    pub year: bool,
    pub month: bool,
    pub day: bool,
    pub week_based: bool,
    pub hour: bool,
    pub minute: bool,
    pub second: bool,
    pub offset: bool,
    pub unix: bool,
}

impl PatternFields {
    fn has_date(&self) -> bool {
        self.year || self.week_based
    }
}

/// Compiled, validated date pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DatePattern {
    source: String,
    directives: String,
    fields: PatternFields,
}

impl DatePattern {
    pub(crate) fn compile(pattern: &str) -> Result<Self, FormatError> {
        let directives = if is_directive_pattern(pattern) {
            pattern.to_string()
        } else {
            translate_tokens(pattern)?
        };
        let fields = inspect_directives(pattern, &directives)?;
        Ok(Self {
            source: pattern.to_string(),
            directives,
            fields,
        })
    }

    /// True when rendering then parsing returns the same instant.
    #[cfg(test)]
    pub(crate) fn has_second_precision(&self) -> bool {
        let short_year = self.directives.contains("%y");
        self.fields.unix || (self.fields.has_date() && self.fields.second && !short_year)
    }

    pub(crate) fn render<Tz>(&self, value: &DateTime<Tz>) -> Result<String, FormatError>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let mut output = String::new();
        write!(
            output,
            "{}",
            value.format_with_items(StrftimeItems::new(&self.directives))
        )
        .map_err(|_| FormatError::UnsupportedPattern {
            pattern: self.source.clone(),
            token: self.directives.clone(),
        })?;
        Ok(output)
    }

    /// Parses `value` strictly: every character must be consumed by the pattern.
    ///
    /// Missing clock components default to zero, a missing day defaults to the
    /// first of the month. Values without an explicit offset are read in
    /// `host_offset`.
    pub(crate) fn parse(
        &self,
        value: &str,
        host_offset: FixedOffset,
    ) -> Result<DateTime<FixedOffset>, ParseError> {
        let mismatch = |reason: String| ParseError::Mismatch {
            value: value.to_string(),
            format: self.source.clone(),
            reason,
        };

        let mut parsed = Parsed::new();
        parse(&mut parsed, value, StrftimeItems::new(&self.directives))
            .map_err(|err| mismatch(err.to_string()))?;

        if self.fields.unix {
            return parsed
                .to_datetime_with_timezone(&host_offset)
                .map_err(|err| mismatch(err.to_string()));
        }
        if !self.fields.has_date() {
            return Err(ParseError::Incomplete {
                value: value.to_string(),
                format: self.source.clone(),
            });
        }

        self.fill_defaults(&mut parsed)
            .map_err(|err| mismatch(err.to_string()))?;

        if self.fields.offset {
            return parsed.to_datetime().map_err(|err| mismatch(err.to_string()));
        }
        let naive = parsed
            .to_naive_datetime_with_offset(0)
            .map_err(|err| mismatch(err.to_string()))?;
        host_offset
            .from_local_datetime(&naive)
            .single()
            .ok_or_else(|| mismatch("local time does not exist in host offset".to_string()))
    }

    fn fill_defaults(&self, parsed: &mut Parsed) -> chrono::format::ParseResult<()> {
        if !self.fields.week_based {
            if !self.fields.month {
                parsed.set_month(1)?;
            }
            if !self.fields.day {
                parsed.set_day(1)?;
            }
        }
        if !self.fields.hour {
            parsed.set_hour(0)?;
        }
        if !self.fields.minute {
            parsed.set_minute(0)?;
        }
        if !self.fields.second {
            parsed.set_second(0)?;
        }
        Ok(())
    }
}

fn inspect_directives(pattern: &str, directives: &str) -> Result<PatternFields, FormatError> {
    let mut fields = PatternFields::default();
    for item in StrftimeItems::new(directives) {
        match item {
            Item::Error => {
                return Err(FormatError::UnsupportedPattern {
                    pattern: pattern.to_string(),
                    token: directives.to_string(),
                })
            }
            Item::Numeric(numeric, _) => match numeric {
                Numeric::Year | Numeric::YearDiv100 | Numeric::YearMod100 => fields.year = true,
                Numeric::IsoYear
                | Numeric::IsoYearDiv100
                | Numeric::IsoYearMod100
                | Numeric::IsoWeek
                | Numeric::WeekFromSun
                | Numeric::WeekFromMon => fields.week_based = true,
                Numeric::Month => fields.month = true,
                Numeric::Day => fields.day = true,
                Numeric::Ordinal => {
                    fields.month = true;
                    fields.day = true;
                }
                Numeric::Hour | Numeric::Hour12 => fields.hour = true,
                Numeric::Minute => fields.minute = true,
                Numeric::Second => fields.second = true,
                Numeric::Timestamp => fields.unix = true,
                _ => {}
            },
            Item::Fixed(fixed) => match fixed {
                Fixed::ShortMonthName | Fixed::LongMonthName => fields.month = true,
                Fixed::TimezoneOffset
                | Fixed::TimezoneOffsetColon
                | Fixed::TimezoneOffsetColonZ
                | Fixed::TimezoneOffsetZ
                | Fixed::TimezoneOffsetDoubleColon
                | Fixed::TimezoneOffsetTripleColon => fields.offset = true,
                Fixed::RFC2822 | Fixed::RFC3339 => {
                    fields.year = true;
                    fields.month = true;
                    fields.day = true;
                    fields.hour = true;
                    fields.minute = true;
                    fields.second = true;
                    fields.offset = true;
                }
                _ => {}
            },
            _ => {}
        }
    }
    Ok(fields)
}

fn is_directive_pattern(pattern: &str) -> bool {
    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        if ch != '%' {
            continue;
        }
        match chars.next() {
            Some(next)
                if next.is_ascii_alphanumeric()
                    || matches!(next, '%' | '-' | '_' | ':' | '.' | '#' | '+') =>
            {
                return true
            }
            _ => {}
        }
    }
    false
}

fn translate_tokens(pattern: &str) -> Result<String, FormatError> {
    let mut output = String::new();
    let mut chars = pattern.chars().peekable();
    while let Some(&ch) = chars.peek() {
        if ch == '[' {
            consume_literal(&mut chars, &mut output);
        } else if is_token_letter(ch) {
            consume_token(&mut chars, &mut output, pattern)?;
        } else {
            push_literal(&mut output, ch);
            chars.next();
        }
    }
    Ok(output)
}

fn is_token_letter(ch: char) -> bool {
    matches!(
        ch,
        'Y' | 'M' | 'D' | 'd' | 'H' | 'h' | 'm' | 's' | 'S' | 'A' | 'a' | 'Z' | 'X' | 'x'
    )
}

fn consume_literal(chars: &mut Peekable<Chars<'_>>, output: &mut String) {
    chars.next(); // opening bracket
    for ch in chars.by_ref() {
        if ch == ']' {
            return;
        }
        push_literal(output, ch);
    }
}

fn push_literal(output: &mut String, ch: char) {
    if ch == '%' {
        output.push_str("%%");
    } else {
        output.push(ch);
    }
}

fn consume_token(
    chars: &mut Peekable<Chars<'_>>,
    output: &mut String,
    pattern: &str,
) -> Result<(), FormatError> {
    let Some(ch) = chars.next() else {
        return Ok(());
    };
    let mut len = 1;
    while matches!(chars.peek(), Some(&next) if next == ch) {
        chars.next();
        len += 1;
    }

    let directive = match (ch, len) {
        ('Y', 4) => "%Y",
        ('Y', 2) => "%y",
        ('M', 1) => "%-m",
        ('M', 2) => "%m",
        ('M', 3) => "%b",
        ('M', 4) => "%B",
        ('D', 1) => "%-d",
        ('D', 2) => "%d",
        ('d', 1) => "%w",
        ('d', 3) => "%a",
        ('d', 4) => "%A",
        ('H', 1) => "%-H",
        ('H', 2) => "%H",
        ('h', 1) => "%-I",
        ('h', 2) => "%I",
        ('m', 1) => "%-M",
        ('m', 2) => "%M",
        ('s', 1) => "%-S",
        ('s', 2) => "%S",
        ('S', 3) => "%3f",
        ('A', 1) => "%p",
        ('a', 1) => "%P",
        ('Z', 1) => "%:z",
        ('Z', 2) => "%z",
        ('X', 1) => "%s",
        _ => {
            return Err(FormatError::UnsupportedPattern {
                pattern: pattern.to_string(),
                token: ch.to_string().repeat(len),
            })
        }
    };
    output.push_str(directive);
    Ok(())
}
