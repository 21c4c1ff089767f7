//! Surface snapshots handed to extension code.
//!
//! # Responsibility
//! - Bundle the date, data and settings accessors produced by one factory call.
//! - Answer whether host settings moved since the bundle was built.
//! - Restrict a surface to the members an extension's target version knows.
//!
//! # Invariants
//! - Staleness is a query against the live store, never a pushed signal.
//! - A gated surface never grants a member newer than its target version.

use super::schema::{CapabilityVersion, SurfaceAccessError, SurfaceMember};
use crate::data::DomainDataFacade;
use crate::settings::{SettingsGateway, SettingsStore};
use crate::time::TimeNormalizer;
use std::sync::Arc;
use uuid::Uuid;

/// The callable contract: one fresh bundle per factory invocation.
#[derive(Clone)]
pub struct Surface {
    id: Uuid,
    version: CapabilityVersion,
    settings_revision: u64,
    store: Arc<dyn SettingsStore>,
    pub date: TimeNormalizer,
    pub data: DomainDataFacade,
    pub settings: SettingsGateway,
}

impl Surface {
    pub(crate) fn assemble(
        version: CapabilityVersion,
        settings_revision: u64,
        store: Arc<dyn SettingsStore>,
        date: TimeNormalizer,
        data: DomainDataFacade,
        settings: SettingsGateway,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            version,
            settings_revision,
            store,
            date,
            data,
            settings,
        }
    }

    /// Per-construction id; distinct for every factory call.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn version(&self) -> CapabilityVersion {
        self.version
    }

    /// Store revision observed when this surface was built.
    pub fn settings_revision(&self) -> u64 {
        self.settings_revision
    }

    /// True once any settings update was applied after construction.
    pub fn is_stale(&self) -> bool {
        self.store.revision() != self.settings_revision
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("id", &self.id)
            .field("version", &self.version)
            .field("settings_revision", &self.settings_revision)
            .finish_non_exhaustive()
    }
}

/// A surface viewed through an extension's target capability version.
#[derive(Debug, Clone)]
pub struct GatedSurface {
    surface: Surface,
    target: CapabilityVersion,
}

impl GatedSurface {
    pub(crate) fn new(surface: Surface, target: CapabilityVersion) -> Self {
        Self { surface, target }
    }

    pub fn target(&self) -> CapabilityVersion {
        self.target
    }

    /// Version members are checked against: the lower of target and host.
    pub fn effective_version(&self) -> CapabilityVersion {
        self.target.min(self.surface.version())
    }

    pub fn require(&self, member: SurfaceMember) -> Result<(), SurfaceAccessError> {
        if member.is_available_at(self.effective_version()) {
            return Ok(());
        }
        Err(SurfaceAccessError::NotAvailable {
            member,
            target: self.target,
        })
    }

    /// Dotted-id form of [`GatedSurface::require`].
    pub fn require_id(&self, member_id: &str) -> Result<SurfaceMember, SurfaceAccessError> {
        let member = SurfaceMember::from_id(member_id)
            .ok_or_else(|| SurfaceAccessError::UnknownMember(member_id.to_string()))?;
        self.require(member)?;
        Ok(member)
    }

    /// Runs `read` against the surface after checking `member` is granted.
    pub fn access<T>(
        &self,
        member: SurfaceMember,
        read: impl FnOnce(&Surface) -> T,
    ) -> Result<T, SurfaceAccessError> {
        self.require(member)?;
        Ok(read(&self.surface))
    }

    pub fn is_stale(&self) -> bool {
        self.surface.is_stale()
    }

    pub fn into_inner(self) -> Surface {
        self.surface
    }
}
