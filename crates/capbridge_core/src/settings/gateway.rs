//! Settings gateway exposed on each surface.
//!
//! # Responsibility
//! - Forward partial updates to the host store, in call order.
//! - Expose theme reads, the user accessor and translations.
//!
//! # Invariants
//! - The gateway never validates, retries or swallows store errors.
//! - `default_themes()` does not depend on store state.

use super::i18n::I18n;
use super::model::FrontendSettingsPayload;
use super::store::{PersistenceError, SettingsStore};
use super::theme::ThemePair;
use super::user::UserSettings;
use log::debug;
use std::sync::Arc;

/// Mediated read/write access to frontend display settings.
#[derive(Clone)]
pub struct SettingsGateway {
    store: Arc<dyn SettingsStore>,
    user: Arc<dyn UserSettings>,
    i18n: I18n,
}

impl SettingsGateway {
    pub(crate) fn new(
        store: Arc<dyn SettingsStore>,
        user: Arc<dyn UserSettings>,
        i18n: I18n,
    ) -> Self {
        Self { store, user, i18n }
    }

    /// Applies a partial update; resolves once the store has persisted it.
    pub async fn update(&self, payload: FrontendSettingsPayload) -> Result<(), PersistenceError> {
        debug!(
            "event=settings_forward module=settings status=start keys={}",
            payload.keys().len()
        );
        self.store.update_setting(payload).await
    }

    /// Host-shipped color schemes.
    pub fn default_themes(&self) -> ThemePair {
        ThemePair::defaults()
    }

    /// Effective color schemes at the time of the call.
    pub fn themes(&self) -> ThemePair {
        self.store.snapshot().themes()
    }

    pub fn user(&self) -> &dyn UserSettings {
        self.user.as_ref()
    }

    pub fn i18n(&self) -> &I18n {
        &self.i18n
    }
}

impl std::fmt::Debug for SettingsGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsGateway")
            .field("revision", &self.store.revision())
            .finish_non_exhaustive()
    }
}
