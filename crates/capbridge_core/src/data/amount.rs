//! Money values carried across the boundary as validated decimal strings.
//!
//! # Invariants
//! - An `Amount` always matches `-?digits[.digits]`; no exponent, no
//!   thousands separators. Formatting for display belongs to the host.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static DECIMAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("valid decimal regex"));

/// Rejected amount literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    Empty,
    NotDecimal(String),
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "amount is empty"),
            Self::NotDecimal(value) => write!(f, "amount is not a plain decimal: {value}"),
        }
    }
}

impl std::error::Error for AmountError {}

/// Exact decimal amount, stored as its canonical string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Amount(String);

impl Amount {
    pub fn parse(value: &str) -> Result<Self, AmountError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }
        if !DECIMAL_RE.is_match(trimmed) {
            return Err(AmountError::NotDecimal(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn zero() -> Self {
        Self("0".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0.starts_with('-') && self.0.chars().any(|ch| ch.is_ascii_digit() && ch != '0')
    }

    /// Lossy conversion for charting and sorting; never use for arithmetic
    /// that is shown back to the user.
    pub fn to_f64_lossy(&self) -> f64 {
        self.0.parse().unwrap_or(0.0)
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::zero()
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
