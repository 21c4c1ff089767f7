//! Settings gateway and the host-side state it mediates.
//!
//! # Responsibility
//! - Model frontend display settings, themes and update payloads.
//! - Provide the store contract plus in-memory and SQLite stores.
//! - Provide the gateway and translation accessor handed to extensions.
//!
//! # Invariants
//! - Extensions never get a direct mutation path; every write goes through
//!   `SettingsGateway::update` into `SettingsStore::update_setting`.

pub mod gateway;
pub mod i18n;
pub mod model;
pub mod sqlite_store;
pub mod store;
pub mod theme;
pub mod user;

pub use gateway::SettingsGateway;
pub use i18n::{
    CatalogTranslator, I18n, I18nSource, LegacyTcCall, StaticI18nSource, SwitchableI18nSource,
    TranslationArg, TranslationValues, Translator,
};
pub use model::{
    CurrencyLocation, FrontendSettings, FrontendSettingsPayload, SettingKey,
    DEFAULT_DATE_DISPLAY_FORMAT,
};
pub use sqlite_store::SqliteSettingsStore;
pub use store::{parse_payload_json, InMemorySettingsStore, PersistenceError, SettingsStore};
pub use theme::{ColorScheme, SelectedTheme, ThemePair};
pub use user::{StaticUserSettings, UserSettings};
