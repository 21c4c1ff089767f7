//! Time normalizer error types.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rendering or re-formatting failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The pattern contains a token that cannot be rendered or parsed.
    UnsupportedPattern { pattern: String, token: String },
    /// The input could not be recognized as a date in any accepted shape.
    UnrecognizedInput { value: String },
    /// The epoch is outside the representable calendar range.
    OutOfRange { epoch: i64 },
    /// The host date-format identifier is not part of the enumerated set.
    UnknownDateFormat(String),
}

impl Display for FormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedPattern { pattern, token } => {
                write!(f, "date pattern `{pattern}` contains unsupported token `{token}`")
            }
            Self::UnrecognizedInput { value } => {
                write!(f, "input is not a recognizable date: `{value}`")
            }
            Self::OutOfRange { epoch } => write!(f, "epoch {epoch} is out of range"),
            Self::UnknownDateFormat(value) => write!(f, "unknown host date format: {value}"),
        }
    }
}

impl Error for FormatError {}

/// Strict parse failure for `date_to_epoch` and host-format conversions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The pattern itself is invalid.
    Pattern(FormatError),
    /// The value does not match the pattern.
    Mismatch {
        value: String,
        format: String,
        reason: String,
    },
    /// The pattern matched but carries no calendar date.
    Incomplete { value: String, format: String },
    /// The host date-format identifier is not part of the enumerated set.
    UnknownDateFormat(String),
    /// Input cannot be turned into a non-negative whole-second timestamp.
    InvalidTimestamp { value: String, location: String },
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pattern(err) => write!(f, "{err}"),
            Self::Mismatch {
                value,
                format,
                reason,
            } => write!(f, "`{value}` does not match format `{format}`: {reason}"),
            Self::Incomplete { value, format } => write!(
                f,
                "`{value}` parsed with format `{format}` carries no calendar date"
            ),
            Self::UnknownDateFormat(value) => write!(f, "unknown host date format: {value}"),
            Self::InvalidTimestamp { value, location } => {
                write!(f, "failed to deserialize timestamp `{value}` from {location}")
            }
        }
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Pattern(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FormatError> for ParseError {
    fn from(value: FormatError) -> Self {
        match value {
            FormatError::UnknownDateFormat(id) => Self::UnknownDateFormat(id),
            other => Self::Pattern(other),
        }
    }
}
