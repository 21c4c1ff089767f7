//! Extension registry and activation.
//!
//! # Responsibility
//! - Register validated manifests with duplicate detection.
//! - Negotiate the capability version before any bridge is handed over.
//! - Guard member access against what each extension declared.
//!
//! # Invariants
//! - An extension whose minimum version exceeds the host's never reaches its
//!   entry point.
//! - Activation state changes only through `activate`.

use crate::bridge::{CapabilityBridge, SurfaceMember, VersionMismatchError};
use crate::extension::manifest::{ExtensionManifest, ManifestValidationError};
use log::{info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Where an extension bundle comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionSource {
    FirstParty,
    Premium,
}

/// Activation lifecycle of one registered extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationState {
    Registered,
    Active,
    Refused,
    Failed,
}

/// Loader-side handle to one extension bundle.
pub trait ExtensionAdapter: Send + Sync {
    fn manifest(&self) -> &ExtensionManifest;
    fn source(&self) -> ExtensionSource;

    /// Entry point invoked with the host bridge after version negotiation.
    fn entry(&self, bridge: &CapabilityBridge) -> Result<(), String>;
}

/// Registered extension snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredExtension {
    pub manifest: ExtensionManifest,
    pub source: ExtensionSource,
    pub state: ActivationState,
}

struct Entry {
    adapter: Arc<dyn ExtensionAdapter>,
    snapshot: RegisteredExtension,
}

/// In-process extension registry.
#[derive(Default)]
pub struct ExtensionRegistry {
    entries: BTreeMap<String, Entry>,
    member_index: BTreeMap<SurfaceMember, BTreeSet<String>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one adapter after manifest validation.
    pub fn register_adapter(
        &mut self,
        adapter: Arc<dyn ExtensionAdapter>,
    ) -> Result<(), ExtensionKernelError> {
        let manifest = adapter.manifest().clone();
        manifest
            .validate()
            .map_err(ExtensionKernelError::InvalidManifest)?;
        let id = manifest.id.trim().to_string();
        if self.entries.contains_key(id.as_str()) {
            return Err(ExtensionKernelError::DuplicateExtensionId(id));
        }

        for member in manifest.declared_members() {
            self.member_index
                .entry(member)
                .or_default()
                .insert(id.clone());
        }

        info!(
            "event=extension_register module=extension status=ok extension_id={} min_capability_version={} members={}",
            id,
            manifest.min_capability_version,
            manifest.members.len()
        );
        let source = adapter.source();
        self.entries.insert(
            id,
            Entry {
                adapter,
                snapshot: RegisteredExtension {
                    manifest,
                    source,
                    state: ActivationState::Registered,
                },
            },
        );
        Ok(())
    }

    /// Negotiates the version, then hands `bridge` to the extension entry point.
    ///
    /// # Errors
    /// - `VersionMismatch` when the extension requires a newer host; the entry
    ///   point is not called.
    /// - `EntryFailed` when the entry point reports an error.
    pub fn activate(
        &mut self,
        extension_id: &str,
        bridge: &CapabilityBridge,
    ) -> Result<(), ExtensionKernelError> {
        let entry = self
            .entries
            .get_mut(extension_id)
            .ok_or_else(|| ExtensionKernelError::UnknownExtension(extension_id.to_string()))?;

        let required = entry.snapshot.manifest.min_capability_version;
        let provided = bridge.version();
        if !provided.satisfies(required) {
            entry.snapshot.state = ActivationState::Refused;
            warn!(
                "event=extension_activate module=extension status=error extension_id={} reason=version_mismatch required={} provided={}",
                extension_id, required, provided
            );
            return Err(ExtensionKernelError::VersionMismatch(VersionMismatchError {
                extension_id: extension_id.to_string(),
                required,
                provided,
            }));
        }

        if let Err(message) = entry.adapter.entry(bridge) {
            entry.snapshot.state = ActivationState::Failed;
            warn!(
                "event=extension_activate module=extension status=error extension_id={} reason=entry_failed",
                extension_id
            );
            return Err(ExtensionKernelError::EntryFailed {
                extension_id: extension_id.to_string(),
                message,
            });
        }

        entry.snapshot.state = ActivationState::Active;
        info!(
            "event=extension_activate module=extension status=ok extension_id={} required={} provided={}",
            extension_id, required, provided
        );
        Ok(())
    }

    /// Activates every registered extension in id order.
    pub fn activate_all(
        &mut self,
        bridge: &CapabilityBridge,
    ) -> Vec<(String, Result<(), ExtensionKernelError>)> {
        let ids: Vec<String> = self.entries.keys().cloned().collect();
        ids.into_iter()
            .map(|id| {
                let result = self.activate(&id, bridge);
                (id, result)
            })
            .collect()
    }

    /// Denies access to members the extension did not declare.
    pub fn assert_surface_member(
        &self,
        extension_id: &str,
        member: SurfaceMember,
    ) -> Result<(), ExtensionKernelError> {
        let entry = self
            .entries
            .get(extension_id)
            .ok_or_else(|| ExtensionKernelError::UnknownExtension(extension_id.to_string()))?;
        let declared = self
            .member_index
            .get(&member)
            .is_some_and(|ids| ids.contains(extension_id));
        if !declared {
            return Err(ExtensionKernelError::MemberDenied {
                extension_id: extension_id.to_string(),
                member,
            });
        }
        if entry.snapshot.state != ActivationState::Active {
            return Err(ExtensionKernelError::NotActive(extension_id.to_string()));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, extension_id: &str) -> Option<&RegisteredExtension> {
        self.entries.get(extension_id).map(|entry| &entry.snapshot)
    }

    pub fn list_by_member(&self, member: SurfaceMember) -> Vec<&RegisteredExtension> {
        let Some(ids) = self.member_index.get(&member) else {
            return vec![];
        };
        ids.iter()
            .filter_map(|id| self.entries.get(id).map(|entry| &entry.snapshot))
            .collect()
    }
}

impl std::fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("extensions", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Kernel registration and activation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionKernelError {
    InvalidManifest(ManifestValidationError),
    DuplicateExtensionId(String),
    UnknownExtension(String),
    VersionMismatch(VersionMismatchError),
    EntryFailed {
        extension_id: String,
        message: String,
    },
    MemberDenied {
        extension_id: String,
        member: SurfaceMember,
    },
    NotActive(String),
}

impl Display for ExtensionKernelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidManifest(err) => write!(f, "invalid extension manifest: {err}"),
            Self::DuplicateExtensionId(value) => {
                write!(f, "extension id already registered: {value}")
            }
            Self::UnknownExtension(value) => write!(f, "extension is not registered: {value}"),
            Self::VersionMismatch(err) => write!(f, "{err}"),
            Self::EntryFailed {
                extension_id,
                message,
            } => write!(f, "extension {extension_id} entry point failed: {message}"),
            Self::MemberDenied {
                extension_id,
                member,
            } => write!(
                f,
                "extension {extension_id} did not declare surface member {member}"
            ),
            Self::NotActive(value) => write!(f, "extension is not active: {value}"),
        }
    }
}

impl Error for ExtensionKernelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidManifest(err) => Some(err),
            Self::VersionMismatch(err) => Some(err),
            _ => None,
        }
    }
}
