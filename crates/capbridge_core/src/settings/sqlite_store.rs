//! SQLite-backed settings store.
//!
//! # Responsibility
//! - Persist one row per changed setting key as JSON text.
//! - Keep an in-process snapshot cache consistent with committed rows.
//!
//! # Invariants
//! - Rows and revision are written in one transaction; the cache is swapped
//!   only after commit.
//! - The cached settings and revision live under one lock, so readers never
//!   observe a new snapshot paired with an old revision.
//! - Rows whose key is not a known `SettingKey` are ignored on load.

use super::model::{FrontendSettings, FrontendSettingsPayload, SettingKey};
use super::store::{log_rejection, validate_update, PersistenceError, SettingsStore};
use crate::db::{open_db, DbLocation};
use async_trait::async_trait;
use chrono::Utc;
use log::{info, warn};
use rusqlite::{params, Connection};
use serde_json::{Map, Value};
use std::sync::{Mutex, RwLock};

/// Settings store persisted in the `frontend_settings` table.
pub struct SqliteSettingsStore {
    conn: Mutex<Connection>,
    cache: RwLock<Cached>,
}

struct Cached {
    settings: FrontendSettings,
    revision: u64,
}

impl SqliteSettingsStore {
    /// Opens (and migrates) the database at `location`, then loads settings.
    pub fn open(location: &DbLocation) -> Result<Self, PersistenceError> {
        let conn = open_db(location)?;
        Self::from_connection(conn)
    }

    /// Wraps an already migrated connection.
    pub fn from_connection(conn: Connection) -> Result<Self, PersistenceError> {
        let settings = load_settings(&conn)?;
        let revision = conn.query_row(
            "SELECT revision FROM settings_meta WHERE id = 1;",
            [],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
            cache: RwLock::new(Cached {
                settings,
                revision: u64::try_from(revision).unwrap_or(0),
            }),
        })
    }
}

fn load_settings(conn: &Connection) -> Result<FrontendSettings, PersistenceError> {
    let Value::Object(mut merged) = serde_json::to_value(FrontendSettings::default())? else {
        return Err(PersistenceError::Unavailable(
            "default settings did not serialize to an object".to_string(),
        ));
    };

    let mut stmt = conn.prepare("SELECT key, value FROM frontend_settings;")?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
    let mut stored = Map::new();
    for row in rows {
        let (key, raw) = row?;
        if SettingKey::from_wire(&key).is_none() {
            warn!("event=settings_load module=settings status=skip reason=unknown_key key={key}");
            continue;
        }
        stored.insert(key, serde_json::from_str::<Value>(&raw)?);
    }
    merged.extend(stored);

    Ok(serde_json::from_value(Value::Object(merged))?)
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    fn snapshot(&self) -> FrontendSettings {
        self.cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .settings
            .clone()
    }

    fn revision(&self) -> u64 {
        self.cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .revision
    }

    async fn update_setting(
        &self,
        payload: FrontendSettingsPayload,
    ) -> Result<(), PersistenceError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| PersistenceError::Unavailable("connection lock poisoned".to_string()))?;
        if payload.is_empty() {
            return Ok(());
        }

        let next = match validate_update(&self.snapshot(), &payload) {
            Ok(next) => next,
            Err(err) => {
                log_rejection("sqlite", &payload, &err);
                return Err(err);
            }
        };

        let now = Utc::now().timestamp();
        let tx = conn.transaction()?;
        for (key, value) in payload.entries() {
            tx.execute(
                "INSERT INTO frontend_settings (key, value, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;",
                params![key.as_str(), serde_json::to_string(&value)?, now],
            )?;
        }
        tx.execute(
            "UPDATE settings_meta SET revision = revision + 1 WHERE id = 1;",
            [],
        )?;
        tx.commit()?;

        let revision = {
            let mut cache = self
                .cache
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            cache.settings = next;
            cache.revision += 1;
            cache.revision
        };

        info!(
            "event=settings_update module=settings status=ok store=sqlite keys={} revision={}",
            payload.keys().len(),
            revision
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteSettingsStore;
    use crate::db::DbLocation;
    use crate::settings::model::FrontendSettingsPayload;
    use crate::settings::store::SettingsStore;
    use crate::settings::theme::SelectedTheme;

    #[tokio::test]
    async fn fresh_database_yields_defaults() {
        let store = SqliteSettingsStore::open(&DbLocation::Memory).expect("open store");
        assert_eq!(store.snapshot(), Default::default());
        assert_eq!(store.revision(), 0);
    }

    #[tokio::test]
    async fn update_is_visible_through_snapshot() {
        let store = SqliteSettingsStore::open(&DbLocation::Memory).expect("open store");
        store
            .update_setting(FrontendSettingsPayload::new().with_selected_theme(SelectedTheme::Dark))
            .await
            .expect("update");

        assert_eq!(store.snapshot().selected_theme, SelectedTheme::Dark);
        assert_eq!(store.revision(), 1);
    }

    #[tokio::test]
    async fn cached_snapshot_and_revision_move_together() {
        let store = SqliteSettingsStore::open(&DbLocation::Memory).expect("open store");
        for (expected, theme) in [(1, SelectedTheme::Dark), (2, SelectedTheme::Light)] {
            store
                .update_setting(FrontendSettingsPayload::new().with_selected_theme(theme))
                .await
                .expect("update");
            let snapshot = store.snapshot();
            let cache = store.cache.read().expect("cache lock");
            assert_eq!(cache.revision, expected);
            assert_eq!(cache.settings, snapshot);
            assert_eq!(cache.settings.selected_theme, theme);
        }
    }
}
