//! Host configuration loaded from TOML.
//!
//! # Responsibility
//! - Describe how the host assembles its bridge: rendering flag, time zone
//!   offset, logging and settings persistence.
//!
//! # Invariants
//! - Every field has a default; an empty file is a valid configuration.
//! - The capability version is not configurable.

use crate::db::DbLocation;
use crate::settings::{InMemorySettingsStore, PersistenceError, SettingsStore, SqliteSettingsStore};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const MAX_UTC_OFFSET_SECONDS: i32 = 24 * 60 * 60;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    pub bridge: BridgeConfig,
    pub time: TimeConfig,
    pub logging: LoggingConfig,
    pub settings: SettingsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    pub uses_host_components: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            uses_host_components: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeConfig {
    /// Host offset east of UTC, in seconds.
    pub utc_offset_seconds: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Falls back to [`crate::default_log_level`] when absent.
    pub level: Option<String>,
    /// Absolute directory; file logging stays off when absent.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsConfig {
    /// SQLite file for frontend settings; in-memory store when absent.
    pub db_path: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    InvalidOffset(i32),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid host config: {err}"),
            Self::InvalidOffset(value) => write!(
                f,
                "time.utc_offset_seconds must be within +/-{MAX_UTC_OFFSET_SECONDS}, got {value}"
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidOffset(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

impl HostConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.host_offset()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn host_offset(&self) -> Result<FixedOffset, ConfigError> {
        let seconds = self.time.utc_offset_seconds;
        if seconds.abs() >= MAX_UTC_OFFSET_SECONDS {
            return Err(ConfigError::InvalidOffset(seconds));
        }
        FixedOffset::east_opt(seconds).ok_or(ConfigError::InvalidOffset(seconds))
    }

    /// Opens the configured settings store.
    pub fn open_settings_store(&self) -> Result<Arc<dyn SettingsStore>, PersistenceError> {
        match &self.settings.db_path {
            Some(path) => Ok(Arc::new(SqliteSettingsStore::open(&DbLocation::File(
                path.clone(),
            ))?)),
            None => Ok(Arc::new(InMemorySettingsStore::new())),
        }
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .level
            .as_deref()
            .unwrap_or(crate::logging::default_log_level())
    }
}
