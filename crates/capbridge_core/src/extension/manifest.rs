//! Extension manifest declaration and validation.
//!
//! A manifest is packaged with each extension bundle and states the minimum
//! capability version the bundle was built against plus the surface members
//! it reads.

use crate::bridge::{CapabilityVersion, SurfaceMember};
use crate::extension::capability::{parse_surface_member, SurfaceMemberParseError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Declarative extension manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionManifest {
    /// Stable extension identifier, e.g. `premium.dashboard.pools`.
    pub id: String,
    /// Bundle semantic version string (`major.minor.patch`).
    pub version: String,
    /// Lowest host capability version the bundle can run against.
    pub min_capability_version: CapabilityVersion,
    /// Surface member ids the bundle reads (`date.epoch`, `data.balancer`, ...).
    pub members: Vec<String>,
    /// Entry point identifier the loader invokes with the bridge.
    pub entrypoint: Option<String>,
}

impl ExtensionManifest {
    /// Validates declaration-level manifest invariants.
    pub fn validate(&self) -> Result<(), ManifestValidationError> {
        if self.id.trim().is_empty() {
            return Err(ManifestValidationError::EmptyId);
        }
        if !is_valid_extension_id(self.id.trim()) {
            return Err(ManifestValidationError::InvalidId(self.id.clone()));
        }

        if self.version.trim().is_empty() {
            return Err(ManifestValidationError::EmptyVersion);
        }
        if !is_semver_triplet(self.version.trim()) {
            return Err(ManifestValidationError::InvalidVersion(
                self.version.clone(),
            ));
        }

        if self.min_capability_version.get() == 0 {
            return Err(ManifestValidationError::ZeroCapabilityVersion);
        }

        if self.members.is_empty() {
            return Err(ManifestValidationError::MissingMembers);
        }

        let mut dedup = BTreeSet::<SurfaceMember>::new();
        for raw in &self.members {
            let member =
                parse_surface_member(raw).map_err(ManifestValidationError::InvalidMember)?;
            if !dedup.insert(member) {
                return Err(ManifestValidationError::DuplicateMember(
                    member.id().to_string(),
                ));
            }
            if !member.is_available_at(self.min_capability_version) {
                return Err(ManifestValidationError::MemberNewerThanTarget {
                    member: member.id().to_string(),
                    introduced_in: member.introduced_in(),
                    target: self.min_capability_version,
                });
            }
        }

        match &self.entrypoint {
            Some(raw) if !raw.trim().is_empty() => Ok(()),
            _ => Err(ManifestValidationError::MissingEntrypoint),
        }
    }

    /// Declared members; ids that do not parse are skipped.
    pub fn declared_members(&self) -> Vec<SurfaceMember> {
        self.members
            .iter()
            .filter_map(|raw| parse_surface_member(raw).ok())
            .collect()
    }

    pub fn declares(&self, member: SurfaceMember) -> bool {
        self.declared_members().contains(&member)
    }
}

fn is_valid_extension_id(value: &str) -> bool {
    let mut chars = value.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };
    if !first.is_ascii_lowercase() && !first.is_ascii_digit() {
        return false;
    }

    let mut prev_separator = false;
    for c in chars {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            prev_separator = false;
            continue;
        }
        if c == '.' || c == '_' || c == '-' {
            if prev_separator {
                return false;
            }
            prev_separator = true;
            continue;
        }
        return false;
    }
    !prev_separator
}

fn is_semver_triplet(value: &str) -> bool {
    let parts: Vec<&str> = value.split('.').collect();
    if parts.len() != 3 {
        return false;
    }
    parts
        .iter()
        .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}

/// Manifest validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestValidationError {
    EmptyId,
    InvalidId(String),
    EmptyVersion,
    InvalidVersion(String),
    ZeroCapabilityVersion,
    MissingMembers,
    InvalidMember(SurfaceMemberParseError),
    DuplicateMember(String),
    MemberNewerThanTarget {
        member: String,
        introduced_in: CapabilityVersion,
        target: CapabilityVersion,
    },
    MissingEntrypoint,
}

impl Display for ManifestValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "manifest id must not be empty"),
            Self::InvalidId(value) => write!(f, "manifest id is invalid: {value}"),
            Self::EmptyVersion => write!(f, "manifest version must not be empty"),
            Self::InvalidVersion(value) => write!(
                f,
                "manifest version is invalid: {value} (expected major.minor.patch)"
            ),
            Self::ZeroCapabilityVersion => {
                write!(f, "manifest min_capability_version must be at least 1")
            }
            Self::MissingMembers => write!(f, "manifest members must not be empty"),
            Self::InvalidMember(err) => write!(f, "manifest member is invalid: {err}"),
            Self::DuplicateMember(value) => write!(f, "manifest member is duplicated: {value}"),
            Self::MemberNewerThanTarget {
                member,
                introduced_in,
                target,
            } => write!(
                f,
                "manifest member {member} was introduced in capability version {introduced_in}, \
                 after the declared minimum {target}"
            ),
            Self::MissingEntrypoint => write!(f, "manifest missing required entrypoint"),
        }
    }
}

impl Error for ManifestValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidMember(err) => Some(err),
            _ => None,
        }
    }
}
