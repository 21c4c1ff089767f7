use async_trait::async_trait;
use capbridge_core::settings::{
    CatalogTranslator, ColorScheme, FrontendSettings, FrontendSettingsPayload, LegacyTcCall,
    PersistenceError, SettingsStore, StaticI18nSource, StaticUserSettings, ThemePair,
    TranslationArg, TranslationValues,
};
use capbridge_core::{
    CapabilityBridge, EmptyData, HostServices, InMemorySettingsStore, ManualClock,
    SqliteSettingsStore,
};
use std::sync::Arc;

const SCENARIO_EPOCH: i64 = 1_686_495_083;

fn bridge_over(store: Arc<dyn SettingsStore>) -> CapabilityBridge {
    let catalog = CatalogTranslator::new("en")
        .with_message("greeting", "Hello {name}")
        .with_message("apples", "no apples | one apple | {n} apples");
    let services = HostServices::new(
        store,
        Arc::new(StaticUserSettings::default()),
        Arc::new(StaticI18nSource::new(Arc::new(catalog))),
        Arc::new(EmptyData),
    )
    .with_clock(Arc::new(ManualClock::new(SCENARIO_EPOCH)));
    CapabilityBridge::new(true, services)
}

fn values(pairs: &[(&str, &str)]) -> TranslationValues {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

struct FailingStore;

#[async_trait]
impl SettingsStore for FailingStore {
    fn snapshot(&self) -> FrontendSettings {
        FrontendSettings::default()
    }

    fn revision(&self) -> u64 {
        0
    }

    async fn update_setting(
        &self,
        _payload: FrontendSettingsPayload,
    ) -> Result<(), PersistenceError> {
        Err(PersistenceError::Unavailable("settings backend offline".to_string()))
    }
}

#[tokio::test]
async fn display_format_update_drives_user_selected_format() {
    let bridge = bridge_over(Arc::new(InMemorySettingsStore::new()));
    let before = bridge
        .surface()
        .date
        .to_user_selected_format(SCENARIO_EPOCH)
        .unwrap();

    bridge
        .surface()
        .settings
        .update(FrontendSettingsPayload::default().with_date_display_format("DD/MM/YYYY"))
        .await
        .unwrap();

    let after = bridge
        .surface()
        .date
        .to_user_selected_format(SCENARIO_EPOCH)
        .unwrap();
    assert_eq!(after, "11/06/2023");
    assert_ne!(before, after);
}

#[tokio::test]
async fn user_selected_format_is_stable_across_unrelated_updates() {
    let bridge = bridge_over(Arc::new(InMemorySettingsStore::new()));
    let surface = bridge.surface();
    let first = surface.date.to_user_selected_format(SCENARIO_EPOCH).unwrap();

    surface
        .settings
        .update(FrontendSettingsPayload::default().with_separators(".", ","))
        .await
        .unwrap();

    let second = surface.date.to_user_selected_format(SCENARIO_EPOCH).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, "11/06/2023 14:51:23 +00:00");
}

#[tokio::test]
async fn default_themes_ignore_updates_while_themes_follow_them() {
    let bridge = bridge_over(Arc::new(InMemorySettingsStore::new()));
    let settings = bridge.surface().settings;
    assert_eq!(settings.themes(), ThemePair::defaults());

    let custom_light = ColorScheme::new("#112233", "#445566", "#778899");
    settings
        .update(FrontendSettingsPayload::default().with_light_theme(custom_light.clone()))
        .await
        .unwrap();
    let custom_dark = ColorScheme::new("#000000", "#ffffff", "#abcdef");
    settings
        .update(FrontendSettingsPayload::default().with_dark_theme(custom_dark.clone()))
        .await
        .unwrap();

    assert_eq!(settings.default_themes(), ThemePair::defaults());
    let themes = settings.themes();
    assert_eq!(themes.light, custom_light);
    assert_eq!(themes.dark, custom_dark);
}

#[tokio::test]
async fn rejected_update_leaves_themes_untouched() {
    let bridge = bridge_over(Arc::new(InMemorySettingsStore::new()));
    let settings = bridge.surface().settings;

    let err = settings
        .update(
            FrontendSettingsPayload::default()
                .with_light_theme(ColorScheme::new("red", "#445566", "#778899")),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PersistenceError::Rejected { .. }));
    assert_eq!(settings.themes(), ThemePair::defaults());
    assert!(!bridge.surface().is_stale());
}

#[tokio::test]
async fn store_failure_propagates_unchanged() {
    let bridge = bridge_over(Arc::new(FailingStore));
    let err = bridge
        .surface()
        .settings
        .update(FrontendSettingsPayload::default().with_date_display_format("YYYY"))
        .await
        .unwrap_err();
    match err {
        PersistenceError::Unavailable(message) => {
            assert_eq!(message, "settings backend offline")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unknown_payload_keys_are_rejected_by_the_store() {
    let store = Arc::new(InMemorySettingsStore::new());
    let err = store
        .update_setting_json(r#"{"dateDisplayFormat": "YYYY", "fontSize": 12}"#)
        .await
        .unwrap_err();
    match err {
        PersistenceError::UnknownKey(key) => assert_eq!(key, "fontSize"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.revision(), 0);

    store
        .update_setting_json(r#"{"dateDisplayFormat": "YYYY"}"#)
        .await
        .unwrap();
    assert_eq!(store.snapshot().date_display_format, "YYYY");
}

#[test]
#[allow(deprecated)]
fn legacy_tc_matches_t_overloads() {
    let bridge = bridge_over(Arc::new(InMemorySettingsStore::new()));
    let surface = bridge.surface();
    let i18n = surface.settings.i18n();
    let n_one = values(&[("n", "1")]);

    assert_eq!(
        i18n.tc("greeting", &LegacyTcCall::from_args(None, None)),
        i18n.t("greeting")
    );
    assert_eq!(
        i18n.tc(
            "greeting",
            &LegacyTcCall::from_args(Some(TranslationArg::Values(n_one.clone())), None)
        ),
        i18n.t_with("greeting", &TranslationArg::Values(n_one.clone()))
    );
    assert_eq!(
        i18n.tc(
            "apples",
            &LegacyTcCall::from_args(Some(TranslationArg::Choice(2)), Some(n_one.clone()))
        ),
        i18n.t_plural("apples", &n_one, 2)
    );
    assert_eq!(
        i18n.tc(
            "apples",
            &LegacyTcCall::from_args(Some(TranslationArg::Choice(0)), None)
        ),
        "no apples"
    );
    assert_eq!(
        i18n.t_with("greeting", &TranslationArg::Values(values(&[("name", "Ada")]))),
        "Hello Ada"
    );
}

#[tokio::test]
async fn sqlite_store_persists_updates_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let location = capbridge_core::db::DbLocation::File(dir.path().join("settings.db"));

    {
        let bridge = bridge_over(Arc::new(SqliteSettingsStore::open(&location).unwrap()));
        bridge
            .surface()
            .settings
            .update(FrontendSettingsPayload::default().with_date_display_format("DD/MM/YYYY"))
            .await
            .unwrap();
    }

    let store = Arc::new(SqliteSettingsStore::open(&location).unwrap());
    assert_eq!(store.revision(), 1);
    let bridge = bridge_over(store);
    assert_eq!(
        bridge
            .surface()
            .date
            .to_user_selected_format(SCENARIO_EPOCH)
            .unwrap(),
        "11/06/2023"
    );
}

fn iso_payload() -> FrontendSettingsPayload {
    FrontendSettingsPayload::default()
        .with_date_display_format("YYYY-MM-DD")
        .with_separators(",", ".")
}

fn european_payload() -> FrontendSettingsPayload {
    FrontendSettingsPayload::default()
        .with_date_display_format("DD/MM/YYYY")
        .with_separators(".", ",")
}

fn assert_applied_wholesale(store: &dyn SettingsStore) {
    let settings = store.snapshot();
    let fields = (
        settings.date_display_format.as_str(),
        settings.thousand_separator.as_str(),
        settings.decimal_separator.as_str(),
    );
    assert!(
        fields == ("YYYY-MM-DD", ",", ".") || fields == ("DD/MM/YYYY", ".", ","),
        "updates interleaved: {fields:?}"
    );
    assert_eq!(store.revision(), 2);
}

async fn race_two_updates(store: Arc<dyn SettingsStore>) {
    let bridge = bridge_over(Arc::clone(&store));
    let surface = bridge.surface();
    let (first, second) = tokio::join!(
        surface.settings.update(iso_payload()),
        surface.settings.update(european_payload()),
    );
    first.unwrap();
    second.unwrap();
    assert_applied_wholesale(store.as_ref());
}

#[tokio::test]
async fn joined_updates_serialize_on_memory_store() {
    race_two_updates(Arc::new(InMemorySettingsStore::new())).await;
}

#[tokio::test]
async fn joined_updates_serialize_on_sqlite_store() {
    let dir = tempfile::tempdir().unwrap();
    let location = capbridge_core::db::DbLocation::File(dir.path().join("settings.db"));
    race_two_updates(Arc::new(SqliteSettingsStore::open(&location).unwrap())).await;

    let reopened = SqliteSettingsStore::open(&location).unwrap();
    assert_applied_wholesale(&reopened);
}

fn update_from_threads(store: Arc<dyn SettingsStore>) {
    let barrier = Arc::new(tokio::sync::Barrier::new(2));
    std::thread::scope(|scope| {
        for payload in [iso_payload(), european_payload()] {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            scope.spawn(move || {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .build()
                    .unwrap();
                runtime.block_on(async move {
                    barrier.wait().await;
                    store.update_setting(payload).await.unwrap();
                });
            });
        }
    });
    assert_applied_wholesale(store.as_ref());
}

#[test]
fn parallel_updates_never_mix_fields_on_either_store() {
    update_from_threads(Arc::new(InMemorySettingsStore::new()));

    let dir = tempfile::tempdir().unwrap();
    let location = capbridge_core::db::DbLocation::File(dir.path().join("settings.db"));
    update_from_threads(Arc::new(SqliteSettingsStore::open(&location).unwrap()));
}
