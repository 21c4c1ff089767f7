//! Theme color schemes.
//!
//! # Invariants
//! - Default schemes are compile-time constants and never change at runtime.
//! - Every color is a `#rrggbb` hex string.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid hex color regex"));

const LIGHT_PRIMARY: &str = "#7e4a3b";
const LIGHT_ACCENT: &str = "#e45325";
const LIGHT_GRAPH: &str = "#96dfd2";
const DARK_PRIMARY: &str = "#ff5722";
const DARK_ACCENT: &str = "#ff8a50";
const DARK_GRAPH: &str = "#e96930";

/// One color scheme (light or dark variant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorScheme {
    pub primary: String,
    pub accent: String,
    pub graph: String,
}

impl ColorScheme {
    pub fn new(
        primary: impl Into<String>,
        accent: impl Into<String>,
        graph: impl Into<String>,
    ) -> Self {
        Self {
            primary: primary.into(),
            accent: accent.into(),
            graph: graph.into(),
        }
    }

    /// Host-shipped light scheme.
    pub fn default_light() -> Self {
        Self::new(LIGHT_PRIMARY, LIGHT_ACCENT, LIGHT_GRAPH)
    }

    /// Host-shipped dark scheme.
    pub fn default_dark() -> Self {
        Self::new(DARK_PRIMARY, DARK_ACCENT, DARK_GRAPH)
    }

    /// Returns the name of the first color that is not `#rrggbb`.
    pub fn invalid_color(&self) -> Option<&'static str> {
        [
            ("primary", &self.primary),
            ("accent", &self.accent),
            ("graph", &self.graph),
        ]
        .into_iter()
        .find(|(_, value)| !HEX_COLOR_RE.is_match(value))
        .map(|(name, _)| name)
    }
}

/// Light and dark schemes as one immutable snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemePair {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl ThemePair {
    pub fn defaults() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Theme variant chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectedTheme {
    #[default]
    Auto,
    Light,
    Dark,
}
