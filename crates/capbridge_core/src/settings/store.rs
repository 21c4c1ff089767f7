//! Settings store contract and in-memory implementation.
//!
//! # Responsibility
//! - Own the mutable frontend settings state on the host side.
//! - Validate and durably apply partial updates, one at a time.
//!
//! # Invariants
//! - Updates are validated against the merged result before anything is
//!   applied; a rejected update leaves state and revision untouched.
//! - `revision()` increases by exactly one per applied non-empty update and
//!   never decreases.
//! - Concurrent updates are serialized by the store, never by callers.

use super::model::{FrontendSettings, FrontendSettingsPayload, SettingKey};
use crate::db::DbError;
use crate::time::pattern::DatePattern;
use async_trait::async_trait;
use log::{info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Failure to durably apply a settings update.
#[derive(Debug)]
pub enum PersistenceError {
    UnknownKey(String),
    Rejected { key: SettingKey, reason: String },
    Serialization(serde_json::Error),
    Db(DbError),
    Unavailable(String),
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownKey(key) => write!(f, "unknown setting key: {key}"),
            Self::Rejected { key, reason } => {
                write!(f, "setting `{}` rejected: {reason}", key.as_str())
            }
            Self::Serialization(err) => write!(f, "settings serialization failed: {err}"),
            Self::Db(err) => write!(f, "settings storage failed: {err}"),
            Self::Unavailable(reason) => write!(f, "settings store unavailable: {reason}"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialization(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

impl From<DbError> for PersistenceError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Host-owned settings state.
///
/// Reads return live snapshots; the only mutation path is `update_setting`.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Current effective settings.
    fn snapshot(&self) -> FrontendSettings;

    /// Monotonic counter of applied updates.
    fn revision(&self) -> u64;

    /// Validates and applies a partial update; resolves once it is durable.
    async fn update_setting(&self, payload: FrontendSettingsPayload)
        -> Result<(), PersistenceError>;

    /// Parses a raw JSON payload, rejecting keys outside `SettingKey`, then applies it.
    async fn update_setting_json(&self, json: &str) -> Result<(), PersistenceError> {
        let payload = parse_payload_json(json)?;
        self.update_setting(payload).await
    }
}

/// Parses a raw JSON object into a payload, naming the first unknown key.
pub fn parse_payload_json(json: &str) -> Result<FrontendSettingsPayload, PersistenceError> {
    let value: Value = serde_json::from_str(json)?;
    if let Value::Object(map) = &value {
        if let Some(unknown) = map.keys().find(|key| SettingKey::from_wire(key).is_none()) {
            return Err(PersistenceError::UnknownKey(unknown.clone()));
        }
    }
    Ok(serde_json::from_value(value)?)
}

/// Merges `payload` into `current` and validates the result.
pub fn validate_update(
    current: &FrontendSettings,
    payload: &FrontendSettingsPayload,
) -> Result<FrontendSettings, PersistenceError> {
    let next = current.merged(payload);

    if payload.date_display_format.is_some() {
        if next.date_display_format.trim().is_empty() {
            return Err(rejected(SettingKey::DateDisplayFormat, "must not be empty"));
        }
        if let Err(err) = DatePattern::compile(&next.date_display_format) {
            return Err(rejected(SettingKey::DateDisplayFormat, err.to_string()));
        }
    }
    if let Some(color) = next.light_theme.invalid_color() {
        return Err(rejected(
            SettingKey::LightTheme,
            format!("{color} must be a #rrggbb color"),
        ));
    }
    if let Some(color) = next.dark_theme.invalid_color() {
        return Err(rejected(
            SettingKey::DarkTheme,
            format!("{color} must be a #rrggbb color"),
        ));
    }
    if next.thousand_separator.is_empty() {
        return Err(rejected(SettingKey::ThousandSeparator, "must not be empty"));
    }
    if next.decimal_separator.is_empty() {
        return Err(rejected(SettingKey::DecimalSeparator, "must not be empty"));
    }
    if next.thousand_separator == next.decimal_separator {
        return Err(rejected(
            SettingKey::DecimalSeparator,
            "must differ from the thousand separator",
        ));
    }
    Ok(next)
}

fn rejected(key: SettingKey, reason: impl Into<String>) -> PersistenceError {
    PersistenceError::Rejected {
        key,
        reason: reason.into(),
    }
}

pub(crate) fn log_rejection(store: &str, payload: &FrontendSettingsPayload, err: &PersistenceError) {
    warn!(
        "event=settings_update module=settings status=error store={} keys={} error={}",
        store,
        payload.keys().len(),
        err
    );
}

/// Process-local settings store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    state: RwLock<FrontendSettings>,
    revision: AtomicU64,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: FrontendSettings) -> Self {
        Self {
            state: RwLock::new(settings),
            revision: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    fn snapshot(&self) -> FrontendSettings {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    async fn update_setting(
        &self,
        payload: FrontendSettingsPayload,
    ) -> Result<(), PersistenceError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| PersistenceError::Unavailable("settings lock poisoned".to_string()))?;
        if payload.is_empty() {
            return Ok(());
        }

        let next = match validate_update(&state, &payload) {
            Ok(next) => next,
            Err(err) => {
                log_rejection("memory", &payload, &err);
                return Err(err);
            }
        };
        *state = next;
        let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            "event=settings_update module=settings status=ok store=memory keys={} revision={}",
            payload.keys().len(),
            revision
        );
        Ok(())
    }
}
