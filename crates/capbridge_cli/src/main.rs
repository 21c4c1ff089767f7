//! Command-line host for the capability bridge.
//!
//! # Responsibility
//! - Assemble a host from an optional TOML config and print what an
//!   extension would observe through the bridge.
//! - Keep output line-oriented for quick local sanity checks.
//!
//! # Invariants
//! - The configured settings store is only read. The update demonstration
//!   runs against an in-memory copy of its snapshot.

use capbridge_core::settings::{
    CatalogTranslator, SettingsStore, StaticI18nSource, StaticUserSettings,
};
use capbridge_core::{
    CapabilityBridge, ConfigError, EmptyData, FrontendSettingsPayload, HostConfig, HostServices,
    InMemorySettingsStore,
};
use std::error::Error;
use std::path::Path;
use std::sync::Arc;

fn host_bridge(
    config: &HostConfig,
    store: Arc<dyn SettingsStore>,
) -> Result<CapabilityBridge, ConfigError> {
    let services = HostServices::new(
        store,
        Arc::new(StaticUserSettings::default()),
        Arc::new(StaticI18nSource::new(Arc::new(CatalogTranslator::new("en")))),
        Arc::new(EmptyData),
    )
    .with_host_offset(config.host_offset()?);
    Ok(CapabilityBridge::new(
        config.bridge.uses_host_components,
        services,
    ))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => HostConfig::load(Path::new(&path))?,
        None => HostConfig::default(),
    };
    if let Some(dir) = config.logging.dir.as_deref().and_then(Path::to_str) {
        capbridge_core::init_logging(config.log_level(), dir)?;
    }

    let store = config.open_settings_store()?;
    let bridge = host_bridge(&config, Arc::clone(&store))?;

    println!("capbridge_core version={}", capbridge_core::core_version());
    println!("capability_version={}", bridge.version());
    println!("uses_host_components={}", bridge.uses_host_components());

    let epoch = bridge.surface().date.epoch();
    println!("epoch={epoch}");
    println!(
        "user_format={}",
        bridge.surface().date.to_user_selected_format(epoch)?
    );

    let (stale, formatted) = preview_update(&config, store.as_ref(), epoch).await?;
    println!("surface_stale={stale}");
    println!("user_format_after_update={formatted}");
    println!("stored_revision={}", store.revision());
    Ok(())
}

/// Applies a display-format change to a copy of `store` and reports what a
/// surface would then observe. `store` itself is left untouched.
async fn preview_update(
    config: &HostConfig,
    store: &dyn SettingsStore,
    epoch: i64,
) -> Result<(bool, String), Box<dyn Error>> {
    let scratch: Arc<dyn SettingsStore> =
        Arc::new(InMemorySettingsStore::with_settings(store.snapshot()));
    let bridge = host_bridge(config, scratch)?;
    let surface = bridge.surface();
    surface
        .settings
        .update(FrontendSettingsPayload::default().with_date_display_format("DD/MM/YYYY"))
        .await?;
    let formatted = bridge.surface().date.to_user_selected_format(epoch)?;
    Ok((surface.is_stale(), formatted))
}
