//! Capability bridge between a host application and independently versioned
//! extension bundles.
//!
//! The host builds one [`CapabilityBridge`] per process; extensions receive it
//! at activation and pull a fresh [`Surface`] for every task.

pub mod bridge;
pub mod config;
pub mod data;
pub mod db;
pub mod extension;
pub mod logging;
pub mod settings;
pub mod time;

pub use bridge::{
    host_bridge, install_host_bridge, BridgeInstallError, CapabilityBridge, CapabilityVersion,
    GatedSurface, HostServices, Surface, SurfaceAccessError, SurfaceMember, SurfaceSchema,
    VersionMismatchError,
};
pub use config::{ConfigError, HostConfig};
pub use data::{Amount, AmountError, DataSubsystems, DomainDataFacade, EmptyData};
pub use extension::capability::{parse_surface_member, SurfaceMemberParseError};
pub use extension::kernel::{
    ActivationState, ExtensionAdapter, ExtensionKernelError, ExtensionRegistry, ExtensionSource,
    RegisteredExtension,
};
pub use extension::manifest::{ExtensionManifest, ManifestValidationError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use settings::{
    FrontendSettings, FrontendSettingsPayload, I18n, InMemorySettingsStore, LegacyTcCall,
    PersistenceError, SettingsGateway, SettingsStore, SqliteSettingsStore, ThemePair,
};
pub use time::clock::{Clock, ManualClock, SystemClock};
pub use time::{DateFormat, FormatError, ParseError, TimeNormalizer, TimeUnit, INVALID_DATE};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Capability version this build hands to extensions.
pub fn capability_version() -> CapabilityVersion {
    CapabilityVersion::CURRENT
}
