//! Capability bridge assembly.
//!
//! # Responsibility
//! - Hold the rendering-strategy flag and the capability version.
//! - Build a fresh [`Surface`] from current host state on every request.
//! - Provide the process-wide bridge instance for the extension loader.
//!
//! # Invariants
//! - The bridge is immutable once built; only the services it reads from
//!   change over time.
//! - The factory reads the settings revision, then the active translator,
//!   then the data accessors, and only then assembles the surface.

pub mod schema;
pub mod surface;

use crate::data::{DataSubsystems, DomainDataFacade};
use crate::settings::{I18n, I18nSource, SettingsGateway, SettingsStore, UserSettings};
use crate::time::clock::{Clock, SystemClock};
use crate::time::TimeNormalizer;
use chrono::{FixedOffset, Offset, Utc};
use log::{debug, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub use schema::{
    CapabilityVersion, SurfaceAccessError, SurfaceMember, SurfaceSchema, VersionMismatchError,
};
pub use surface::{GatedSurface, Surface};

/// Host-owned state a surface is built from.
#[derive(Clone)]
pub struct HostServices {
    settings: Arc<dyn SettingsStore>,
    user: Arc<dyn UserSettings>,
    i18n: Arc<dyn I18nSource>,
    data: Arc<dyn DataSubsystems>,
    clock: Arc<dyn Clock>,
    host_offset: FixedOffset,
}

impl HostServices {
    /// Services on the system clock at UTC.
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        user: Arc<dyn UserSettings>,
        i18n: Arc<dyn I18nSource>,
        data: Arc<dyn DataSubsystems>,
    ) -> Self {
        Self {
            settings,
            user,
            i18n,
            data,
            clock: Arc::new(SystemClock),
            host_offset: Utc.fix(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_host_offset(mut self, host_offset: FixedOffset) -> Self {
        self.host_offset = host_offset;
        self
    }

    pub fn settings_store(&self) -> Arc<dyn SettingsStore> {
        Arc::clone(&self.settings)
    }

    fn build_surface(&self, version: CapabilityVersion) -> Surface {
        let settings_revision = self.settings.revision();
        let translator = self.i18n.current();
        let data = DomainDataFacade::from_subsystems(self.data.as_ref());

        let date = TimeNormalizer::new(
            Arc::clone(&self.clock),
            self.host_offset,
            Arc::clone(&self.settings),
        );
        let settings = SettingsGateway::new(
            Arc::clone(&self.settings),
            Arc::clone(&self.user),
            I18n::new(translator),
        );
        let surface = Surface::assemble(
            version,
            settings_revision,
            Arc::clone(&self.settings),
            date,
            data,
            settings,
        );
        debug!(
            "event=surface_build module=bridge status=ok surface_id={} version={} settings_revision={}",
            surface.id(),
            version,
            settings_revision
        );
        surface
    }
}

impl std::fmt::Debug for HostServices {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostServices")
            .field("host_offset", &self.host_offset)
            .finish_non_exhaustive()
    }
}

type SurfaceFactory = Arc<dyn Fn() -> Surface + Send + Sync>;

/// The versioned value handed to extension entry points.
#[derive(Clone)]
pub struct CapabilityBridge {
    uses_host_components: bool,
    version: CapabilityVersion,
    factory: SurfaceFactory,
}

impl CapabilityBridge {
    /// Bridge at [`CapabilityVersion::CURRENT`].
    pub fn new(uses_host_components: bool, services: HostServices) -> Self {
        let version = CapabilityVersion::CURRENT;
        info!(
            "event=bridge_init module=bridge status=ok version={} uses_host_components={}",
            version, uses_host_components
        );
        Self {
            uses_host_components,
            version,
            factory: Arc::new(move || services.build_surface(version)),
        }
    }

    /// Whether UI primitives inside the extension should delegate to host components.
    pub fn uses_host_components(&self) -> bool {
        self.uses_host_components
    }

    pub fn version(&self) -> CapabilityVersion {
        self.version
    }

    /// Builds a fresh surface from current host state.
    pub fn surface(&self) -> Surface {
        (self.factory)()
    }

    /// Fresh surface restricted to members known at `target`.
    pub fn gated_surface(&self, target: CapabilityVersion) -> GatedSurface {
        GatedSurface::new(self.surface(), target)
    }
}

impl std::fmt::Debug for CapabilityBridge {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityBridge")
            .field("uses_host_components", &self.uses_host_components)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

static HOST_BRIDGE: OnceCell<CapabilityBridge> = OnceCell::new();

/// Installs the process-wide bridge.
pub fn install_host_bridge(
    bridge: CapabilityBridge,
) -> Result<&'static CapabilityBridge, BridgeInstallError> {
    HOST_BRIDGE
        .set(bridge)
        .map_err(|_| BridgeInstallError::AlreadyInstalled)?;
    HOST_BRIDGE.get().ok_or(BridgeInstallError::AlreadyInstalled)
}

/// The process-wide bridge, if installed.
pub fn host_bridge() -> Option<&'static CapabilityBridge> {
    HOST_BRIDGE.get()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeInstallError {
    AlreadyInstalled,
}

impl Display for BridgeInstallError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyInstalled => write!(f, "host bridge is already installed"),
        }
    }
}

impl Error for BridgeInstallError {}
