//! Frontend display settings and partial update payloads.
//!
//! # Responsibility
//! - Define the full effective settings record with host defaults.
//! - Define the partial payload accepted by `settings.update`.
//!
//! # Invariants
//! - Payload keys are drawn from the fixed `SettingKey` set; unknown keys
//!   fail deserialization.
//! - Absent payload fields leave the current value untouched.

use super::theme::{ColorScheme, SelectedTheme, ThemePair};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default user display format (`%`-directive dialect).
pub const DEFAULT_DATE_DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M:%S %Z";

/// Where the currency symbol is rendered relative to an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyLocation {
    Before,
    #[default]
    After,
}

/// Frontend-configurable setting names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SettingKey {
    DateDisplayFormat,
    SelectedTheme,
    LightTheme,
    DarkTheme,
    ThousandSeparator,
    DecimalSeparator,
    CurrencyLocation,
    GraphZeroBased,
    ShowGraphRangeSelector,
}

impl SettingKey {
    pub const ALL: [SettingKey; 9] = [
        Self::DateDisplayFormat,
        Self::SelectedTheme,
        Self::LightTheme,
        Self::DarkTheme,
        Self::ThousandSeparator,
        Self::DecimalSeparator,
        Self::CurrencyLocation,
        Self::GraphZeroBased,
        Self::ShowGraphRangeSelector,
    ];

    /// Wire name used in payload JSON and storage rows.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DateDisplayFormat => "dateDisplayFormat",
            Self::SelectedTheme => "selectedTheme",
            Self::LightTheme => "lightTheme",
            Self::DarkTheme => "darkTheme",
            Self::ThousandSeparator => "thousandSeparator",
            Self::DecimalSeparator => "decimalSeparator",
            Self::CurrencyLocation => "currencyLocation",
            Self::GraphZeroBased => "graphZeroBased",
            Self::ShowGraphRangeSelector => "showGraphRangeSelector",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == value)
    }
}

/// Effective frontend settings snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontendSettings {
    pub date_display_format: String,
    pub selected_theme: SelectedTheme,
    pub light_theme: ColorScheme,
    pub dark_theme: ColorScheme,
    pub thousand_separator: String,
    pub decimal_separator: String,
    pub currency_location: CurrencyLocation,
    pub graph_zero_based: bool,
    pub show_graph_range_selector: bool,
}

impl Default for FrontendSettings {
    fn default() -> Self {
        let themes = ThemePair::defaults();
        Self {
            date_display_format: DEFAULT_DATE_DISPLAY_FORMAT.to_string(),
            selected_theme: SelectedTheme::Auto,
            light_theme: themes.light,
            dark_theme: themes.dark,
            thousand_separator: ",".to_string(),
            decimal_separator: ".".to_string(),
            currency_location: CurrencyLocation::After,
            graph_zero_based: false,
            show_graph_range_selector: true,
        }
    }
}

impl FrontendSettings {
    /// Current effective theme pair.
    pub fn themes(&self) -> ThemePair {
        ThemePair {
            light: self.light_theme.clone(),
            dark: self.dark_theme.clone(),
        }
    }

    /// Returns a copy with every present payload field applied.
    pub fn merged(&self, payload: &FrontendSettingsPayload) -> Self {
        let mut next = self.clone();
        if let Some(value) = &payload.date_display_format {
            next.date_display_format = value.clone();
        }
        if let Some(value) = payload.selected_theme {
            next.selected_theme = value;
        }
        if let Some(value) = &payload.light_theme {
            next.light_theme = value.clone();
        }
        if let Some(value) = &payload.dark_theme {
            next.dark_theme = value.clone();
        }
        if let Some(value) = &payload.thousand_separator {
            next.thousand_separator = value.clone();
        }
        if let Some(value) = &payload.decimal_separator {
            next.decimal_separator = value.clone();
        }
        if let Some(value) = payload.currency_location {
            next.currency_location = value;
        }
        if let Some(value) = payload.graph_zero_based {
            next.graph_zero_based = value;
        }
        if let Some(value) = payload.show_graph_range_selector {
            next.show_graph_range_selector = value;
        }
        next
    }
}

/// Partial settings update. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FrontendSettingsPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_display_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_theme: Option<SelectedTheme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light_theme: Option<ColorScheme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_theme: Option<ColorScheme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thousand_separator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimal_separator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_location: Option<CurrencyLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_zero_based: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_graph_range_selector: Option<bool>,
}

impl FrontendSettingsPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_display_format(mut self, value: impl Into<String>) -> Self {
        self.date_display_format = Some(value.into());
        self
    }

    pub fn with_selected_theme(mut self, value: SelectedTheme) -> Self {
        self.selected_theme = Some(value);
        self
    }

    pub fn with_light_theme(mut self, value: ColorScheme) -> Self {
        self.light_theme = Some(value);
        self
    }

    pub fn with_dark_theme(mut self, value: ColorScheme) -> Self {
        self.dark_theme = Some(value);
        self
    }

    pub fn with_separators(
        mut self,
        thousand: impl Into<String>,
        decimal: impl Into<String>,
    ) -> Self {
        self.thousand_separator = Some(thousand.into());
        self.decimal_separator = Some(decimal.into());
        self
    }

    pub fn with_currency_location(mut self, value: CurrencyLocation) -> Self {
        self.currency_location = Some(value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    /// Keys present in this payload, in `SettingKey` order.
    pub fn keys(&self) -> Vec<SettingKey> {
        self.entries().into_iter().map(|(key, _)| key).collect()
    }

    /// Present fields as `(key, json value)` pairs, in `SettingKey` order.
    pub fn entries(&self) -> Vec<(SettingKey, Value)> {
        let Ok(Value::Object(map)) = serde_json::to_value(self) else {
            return Vec::new();
        };
        SettingKey::ALL
            .into_iter()
            .filter_map(|key| map.get(key.as_str()).map(|value| (key, value.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{FrontendSettings, FrontendSettingsPayload, SettingKey};
    use crate::settings::theme::SelectedTheme;

    #[test]
    fn merge_leaves_absent_fields_untouched() {
        let current = FrontendSettings::default();
        let payload = FrontendSettingsPayload::new().with_date_display_format("DD/MM/YYYY");
        let next = current.merged(&payload);

        assert_eq!(next.date_display_format, "DD/MM/YYYY");
        assert_eq!(next.selected_theme, current.selected_theme);
        assert_eq!(next.light_theme, current.light_theme);
        assert_eq!(next.thousand_separator, current.thousand_separator);
    }

    #[test]
    fn payload_reports_present_keys_in_stable_order() {
        let payload = FrontendSettingsPayload::new()
            .with_selected_theme(SelectedTheme::Dark)
            .with_date_display_format("YYYY");
        assert_eq!(
            payload.keys(),
            vec![SettingKey::DateDisplayFormat, SettingKey::SelectedTheme]
        );
        assert!(FrontendSettingsPayload::new().is_empty());
    }

    #[test]
    fn payload_json_uses_camel_case_and_rejects_unknown_keys() {
        let payload: FrontendSettingsPayload =
            serde_json::from_str(r#"{"dateDisplayFormat":"DD/MM/YYYY","selectedTheme":"dark"}"#)
                .expect("known keys");
        assert_eq!(payload.date_display_format.as_deref(), Some("DD/MM/YYYY"));
        assert_eq!(payload.selected_theme, Some(SelectedTheme::Dark));

        let err = serde_json::from_str::<FrontendSettingsPayload>(r#"{"fontSize":12}"#)
            .expect_err("unknown key must fail");
        assert!(err.to_string().contains("fontSize"));
    }

    #[test]
    fn wire_names_round_trip() {
        for key in SettingKey::ALL {
            assert_eq!(SettingKey::from_wire(key.as_str()), Some(key));
        }
        assert_eq!(SettingKey::from_wire("fontSize"), None);
    }
}
