//! User-identity-scoped settings accessor.

use serde::{Deserialize, Serialize};

/// Read-only view over account-level settings owned by the host.
pub trait UserSettings: Send + Sync {
    fn main_currency(&self) -> String;
    fn floating_precision(&self) -> u8;
    fn premium_should_sync(&self) -> bool;
}

/// Fixed account settings, used when the host has no live account session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticUserSettings {
    pub main_currency: String,
    pub floating_precision: u8,
    pub premium_should_sync: bool,
}

impl Default for StaticUserSettings {
    fn default() -> Self {
        Self {
            main_currency: "USD".to_string(),
            floating_precision: 2,
            premium_should_sync: false,
        }
    }
}

impl UserSettings for StaticUserSettings {
    fn main_currency(&self) -> String {
        self.main_currency.clone()
    }

    fn floating_precision(&self) -> u8 {
        self.floating_precision
    }

    fn premium_should_sync(&self) -> bool {
        self.premium_should_sync
    }
}
