//! Translation accessor handed to extensions.
//!
//! # Responsibility
//! - Expose `t` with its three call shapes as explicit methods.
//! - Keep the deprecated `tc` overload resolution for older extensions.
//!
//! # Invariants
//! - A missing key renders as the key itself.
//! - `tc(key, choice, values)` is `t(key, values, choice)`; with no values
//!   the second argument is forwarded to `t` unchanged.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\s*(\w+)\s*\}").expect("valid placeholder regex"));

/// Named interpolation values.
pub type TranslationValues = BTreeMap<String, String>;

/// Locale-specific message renderer supplied by the host.
pub trait Translator: Send + Sync {
    fn translate(&self, key: &str, values: Option<&TranslationValues>, choice: Option<u32>)
        -> String;
}

/// Resolves the translator that is current at surface construction time.
pub trait I18nSource: Send + Sync {
    fn current(&self) -> Arc<dyn Translator>;
}

/// Single argument form of `t(key, arg)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationArg {
    Choice(u32),
    Values(TranslationValues),
}

/// The legacy `tc` call shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegacyTcCall {
    /// `tc(key)`
    Key,
    /// `tc(key, arg)`
    Single(TranslationArg),
    /// `tc(key, choice, values)`
    ChoiceWithValues {
        choice: u32,
        values: TranslationValues,
    },
}

impl LegacyTcCall {
    /// Resolves positional legacy arguments into one call shape.
    ///
    /// A values map in the choice position carries no plural count, so it is
    /// superseded by explicit `values` when both are given.
    pub fn from_args(choice: Option<TranslationArg>, values: Option<TranslationValues>) -> Self {
        match (choice, values) {
            (None, _) => Self::Key,
            (Some(arg), None) => Self::Single(arg),
            (Some(TranslationArg::Choice(choice)), Some(values)) => {
                Self::ChoiceWithValues { choice, values }
            }
            (Some(TranslationArg::Values(_)), Some(values)) => {
                Self::Single(TranslationArg::Values(values))
            }
        }
    }
}

/// Translation accessor exposed on the settings gateway.
#[derive(Clone)]
pub struct I18n {
    translator: Arc<dyn Translator>,
}

impl I18n {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self { translator }
    }

    /// `t(key)`
    pub fn t(&self, key: &str) -> String {
        self.translator.translate(key, None, None)
    }

    /// `t(key, choiceOrValues)`
    pub fn t_with(&self, key: &str, arg: &TranslationArg) -> String {
        match arg {
            TranslationArg::Choice(choice) => self.translator.translate(key, None, Some(*choice)),
            TranslationArg::Values(values) => self.translator.translate(key, Some(values), None),
        }
    }

    /// `t(key, values, choice)`
    pub fn t_plural(&self, key: &str, values: &TranslationValues, choice: u32) -> String {
        self.translator.translate(key, Some(values), Some(choice))
    }

    /// Legacy pluralizing translation kept for extensions built before `t`
    /// accepted a choice.
    #[deprecated(note = "use `t`, `t_with` or `t_plural`")]
    pub fn tc(&self, key: &str, call: &LegacyTcCall) -> String {
        match call {
            LegacyTcCall::Key => self.t(key),
            LegacyTcCall::Single(arg) => self.t_with(key, arg),
            LegacyTcCall::ChoiceWithValues { choice, values } => {
                self.t_plural(key, values, *choice)
            }
        }
    }
}

impl std::fmt::Debug for I18n {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("I18n").finish_non_exhaustive()
    }
}

/// Message catalog for one locale.
///
/// Messages use `{name}` placeholders and `a | b | c` plural branches.
#[derive(Debug, Clone, Default)]
pub struct CatalogTranslator {
    locale: String,
    messages: BTreeMap<String, String>,
}

impl CatalogTranslator {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            messages: BTreeMap::new(),
        }
    }

    pub fn with_message(mut self, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.messages.insert(key.into(), message.into());
        self
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }
}

impl Translator for CatalogTranslator {
    fn translate(
        &self,
        key: &str,
        values: Option<&TranslationValues>,
        choice: Option<u32>,
    ) -> String {
        let Some(message) = self.messages.get(key) else {
            return key.to_string();
        };
        let branch = match choice {
            Some(choice) => select_plural_branch(message, choice),
            None => message.as_str(),
        };

        let mut implicit = TranslationValues::new();
        if let Some(choice) = choice {
            implicit.insert("n".to_string(), choice.to_string());
            implicit.insert("count".to_string(), choice.to_string());
        }
        interpolate(branch, values, &implicit)
    }
}

fn select_plural_branch(message: &str, choice: u32) -> &str {
    let branches: Vec<&str> = message.split('|').map(str::trim).collect();
    let index = match branches.len() {
        0 | 1 => 0,
        2 => usize::from(choice != 1),
        _ => match choice {
            0 => 0,
            1 => 1,
            _ => 2,
        },
    };
    branches.get(index).copied().unwrap_or(message)
}

fn interpolate(
    message: &str,
    values: Option<&TranslationValues>,
    implicit: &TranslationValues,
) -> String {
    PLACEHOLDER_RE
        .replace_all(message, |caps: &Captures<'_>| {
            let name = &caps[1];
            values
                .and_then(|values| values.get(name))
                .or_else(|| implicit.get(name))
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Fixed translator source.
pub struct StaticI18nSource {
    translator: Arc<dyn Translator>,
}

impl StaticI18nSource {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self { translator }
    }
}

impl I18nSource for StaticI18nSource {
    fn current(&self) -> Arc<dyn Translator> {
        Arc::clone(&self.translator)
    }
}

/// Translator source whose active locale the host can switch at runtime.
pub struct SwitchableI18nSource {
    active: RwLock<Arc<dyn Translator>>,
}

impl SwitchableI18nSource {
    pub fn new(initial: Arc<dyn Translator>) -> Self {
        Self {
            active: RwLock::new(initial),
        }
    }

    /// Replaces the active translator; existing surfaces keep the old one.
    pub fn switch_to(&self, translator: Arc<dyn Translator>) {
        *self
            .active
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = translator;
    }
}

impl I18nSource for SwitchableI18nSource {
    fn current(&self) -> Arc<dyn Translator> {
        self.active
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[cfg(test)]
#[allow(deprecated)]
mod tests {
    use super::{
        CatalogTranslator, I18n, LegacyTcCall, TranslationArg, TranslationValues, Translator,
    };
    use std::sync::Arc;

    fn values(pairs: &[(&str, &str)]) -> TranslationValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn i18n() -> I18n {
        I18n::new(Arc::new(
            CatalogTranslator::new("en")
                .with_message("greeting", "Hello {name}")
                .with_message("items", "no items | one item | {n} items")
                .with_message("apples", "one apple for {who} | {count} apples for {who}"),
        ))
    }

    #[test]
    fn missing_key_renders_key() {
        assert_eq!(i18n().t("nope.missing"), "nope.missing");
    }

    #[test]
    fn t_interpolates_and_pluralizes() {
        let i18n = i18n();
        assert_eq!(
            i18n.t_with("greeting", &TranslationArg::Values(values(&[("name", "Ada")]))),
            "Hello Ada"
        );
        assert_eq!(i18n.t_with("items", &TranslationArg::Choice(0)), "no items");
        assert_eq!(i18n.t_with("items", &TranslationArg::Choice(1)), "one item");
        assert_eq!(i18n.t_with("items", &TranslationArg::Choice(7)), "7 items");
        assert_eq!(
            i18n.t_plural("apples", &values(&[("who", "Bo")]), 3),
            "3 apples for Bo"
        );
    }

    #[test]
    fn unknown_placeholders_are_left_intact() {
        assert_eq!(i18n().t("greeting"), "Hello {name}");
    }

    #[test]
    fn tc_with_key_only_matches_t() {
        let i18n = i18n();
        assert_eq!(i18n.tc("greeting", &LegacyTcCall::Key), i18n.t("greeting"));
    }

    #[test]
    fn tc_with_single_values_argument_matches_t() {
        let i18n = i18n();
        let arg = TranslationArg::Values(values(&[("n", "1")]));
        assert_eq!(
            i18n.tc("items", &LegacyTcCall::Single(arg.clone())),
            i18n.t_with("items", &arg)
        );
    }

    #[test]
    fn tc_with_choice_and_values_swaps_into_t_order() {
        let i18n = i18n();
        let vals = values(&[("who", "Cy")]);
        let call = LegacyTcCall::ChoiceWithValues {
            choice: 2,
            values: vals.clone(),
        };
        assert_eq!(i18n.tc("apples", &call), i18n.t_plural("apples", &vals, 2));
        assert_eq!(i18n.tc("apples", &call), "2 apples for Cy");
    }

    #[test]
    fn legacy_argument_resolution_picks_call_shape() {
        assert_eq!(LegacyTcCall::from_args(None, None), LegacyTcCall::Key);
        assert_eq!(
            LegacyTcCall::from_args(None, Some(values(&[("a", "b")]))),
            LegacyTcCall::Key
        );
        assert_eq!(
            LegacyTcCall::from_args(Some(TranslationArg::Choice(2)), None),
            LegacyTcCall::Single(TranslationArg::Choice(2))
        );
        assert_eq!(
            LegacyTcCall::from_args(Some(TranslationArg::Choice(2)), Some(values(&[("n", "1")]))),
            LegacyTcCall::ChoiceWithValues {
                choice: 2,
                values: values(&[("n", "1")]),
            }
        );
    }

    #[test]
    fn catalog_reports_locale() {
        let catalog = CatalogTranslator::new("de");
        assert_eq!(catalog.locale(), "de");
        assert_eq!(catalog.translate("x", None, None), "x");
    }
}
