//! Versioned surface schema.
//!
//! # Responsibility
//! - Enumerate every surface member with the capability version that
//!   introduced it, so compatibility is a lookup rather than a convention.
//!
//! # Invariants
//! - `CapabilityVersion::CURRENT` only ever grows between releases.
//! - A member's `introduced_in` never changes once released; removing a
//!   member requires a version bump and a `deprecated_in` entry first.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Integer contract version gating which surface members an extension may use.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CapabilityVersion(u32);

impl CapabilityVersion {
    /// Version exposed by this host build.
    pub const CURRENT: Self = Self(25);

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    /// True when every member guaranteed at `required` is present here.
    pub fn satisfies(self, required: CapabilityVersion) -> bool {
        self >= required
    }
}

impl Display for CapabilityVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One callable or readable member of the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SurfaceMember {
    DateEpoch,
    DateFormat,
    DateNow,
    DateEpochToFormat,
    DateDateToEpoch,
    DateEpochStartSubtract,
    DateToUserSelectedFormat,
    DateGetDateInputIsoFormat,
    DateConvertToTimestamp,
    DataAssets,
    DataBalances,
    DataStatistics,
    DataCompound,
    DataBalancer,
    DataSushi,
    DataUtils,
    SettingsUpdate,
    SettingsDefaultThemes,
    SettingsThemes,
    SettingsUser,
    SettingsI18nT,
    SettingsI18nTc,
}

impl SurfaceMember {
    pub const ALL: [SurfaceMember; 22] = [
        Self::DateEpoch,
        Self::DateFormat,
        Self::DateNow,
        Self::DateEpochToFormat,
        Self::DateDateToEpoch,
        Self::DateEpochStartSubtract,
        Self::DateToUserSelectedFormat,
        Self::DateGetDateInputIsoFormat,
        Self::DateConvertToTimestamp,
        Self::DataAssets,
        Self::DataBalances,
        Self::DataStatistics,
        Self::DataCompound,
        Self::DataBalancer,
        Self::DataSushi,
        Self::DataUtils,
        Self::SettingsUpdate,
        Self::SettingsDefaultThemes,
        Self::SettingsThemes,
        Self::SettingsUser,
        Self::SettingsI18nT,
        Self::SettingsI18nTc,
    ];

    /// Stable dotted id used in manifests and logs.
    pub fn id(self) -> &'static str {
        match self {
            Self::DateEpoch => "date.epoch",
            Self::DateFormat => "date.format",
            Self::DateNow => "date.now",
            Self::DateEpochToFormat => "date.epoch_to_format",
            Self::DateDateToEpoch => "date.date_to_epoch",
            Self::DateEpochStartSubtract => "date.epoch_start_subtract",
            Self::DateToUserSelectedFormat => "date.to_user_selected_format",
            Self::DateGetDateInputIsoFormat => "date.get_date_input_iso_format",
            Self::DateConvertToTimestamp => "date.convert_to_timestamp",
            Self::DataAssets => "data.assets",
            Self::DataBalances => "data.balances",
            Self::DataStatistics => "data.statistics",
            Self::DataCompound => "data.compound",
            Self::DataBalancer => "data.balancer",
            Self::DataSushi => "data.sushi",
            Self::DataUtils => "data.utils",
            Self::SettingsUpdate => "settings.update",
            Self::SettingsDefaultThemes => "settings.default_themes",
            Self::SettingsThemes => "settings.themes",
            Self::SettingsUser => "settings.user",
            Self::SettingsI18nT => "settings.i18n.t",
            Self::SettingsI18nTc => "settings.i18n.tc",
        }
    }

    pub fn from_id(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|member| member.id() == value)
    }

    pub fn introduced_in(self) -> CapabilityVersion {
        let version = match self {
            Self::DateEpoch
            | Self::DateFormat
            | Self::DateNow
            | Self::DateEpochToFormat
            | Self::DateDateToEpoch
            | Self::DateEpochStartSubtract
            | Self::DataAssets
            | Self::DataBalances
            | Self::DataStatistics
            | Self::SettingsUpdate
            | Self::SettingsI18nT
            | Self::SettingsI18nTc => 1,
            Self::SettingsDefaultThemes | Self::SettingsThemes => 3,
            Self::DataCompound => 5,
            Self::DateToUserSelectedFormat => 9,
            Self::DataBalancer => 11,
            Self::SettingsUser => 13,
            Self::DataSushi => 15,
            Self::DataUtils => 18,
            Self::DateGetDateInputIsoFormat | Self::DateConvertToTimestamp => 21,
        };
        CapabilityVersion(version)
    }

    /// Version from which new extensions should stop using the member.
    /// Deprecated members stay callable.
    pub fn deprecated_in(self) -> Option<CapabilityVersion> {
        match self {
            Self::SettingsI18nTc => Some(CapabilityVersion(25)),
            _ => None,
        }
    }

    pub fn is_available_at(self, version: CapabilityVersion) -> bool {
        version >= self.introduced_in()
    }
}

impl Display for SurfaceMember {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Mapping from capability version to the members guaranteed present.
pub struct SurfaceSchema;

impl SurfaceSchema {
    /// Members guaranteed at `version`, in declaration order.
    pub fn members_at(version: CapabilityVersion) -> Vec<SurfaceMember> {
        SurfaceMember::ALL
            .into_iter()
            .filter(|member| member.is_available_at(version))
            .collect()
    }

    /// Members introduced after `from` and present at `to`.
    pub fn added_between(from: CapabilityVersion, to: CapabilityVersion) -> Vec<SurfaceMember> {
        SurfaceMember::ALL
            .into_iter()
            .filter(|member| !member.is_available_at(from) && member.is_available_at(to))
            .collect()
    }
}

/// Extension requires a newer host than this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMismatchError {
    pub extension_id: String,
    pub required: CapabilityVersion,
    pub provided: CapabilityVersion,
}

impl Display for VersionMismatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "extension {} requires capability version {} but host provides {}",
            self.extension_id, self.required, self.provided
        )
    }
}

impl Error for VersionMismatchError {}

/// Member access refused for a target version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceAccessError {
    NotAvailable {
        member: SurfaceMember,
        target: CapabilityVersion,
    },
    UnknownMember(String),
}

impl Display for SurfaceAccessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAvailable { member, target } => write!(
                f,
                "surface member {member} requires capability version {} (target is {target})",
                member.introduced_in()
            ),
            Self::UnknownMember(value) => write!(f, "unknown surface member: {value}"),
        }
    }
}

impl Error for SurfaceAccessError {}

#[cfg(test)]
mod tests {
    use super::{CapabilityVersion, SurfaceMember, SurfaceSchema};

    #[test]
    fn current_version_exposes_every_member() {
        let members = SurfaceSchema::members_at(CapabilityVersion::CURRENT);
        assert_eq!(members.len(), SurfaceMember::ALL.len());
        assert!(members.contains(&SurfaceMember::DataBalancer));
    }

    #[test]
    fn older_versions_see_a_subset() {
        let members = SurfaceSchema::members_at(CapabilityVersion::new(10));
        assert!(members.contains(&SurfaceMember::DateToUserSelectedFormat));
        assert!(!members.contains(&SurfaceMember::DataBalancer));
        assert!(!members.contains(&SurfaceMember::DateConvertToTimestamp));
        assert!(SurfaceSchema::members_at(CapabilityVersion::new(0)).is_empty());
    }

    #[test]
    fn members_never_shrink_as_version_grows() {
        let mut previous = 0;
        for version in 0..=CapabilityVersion::CURRENT.get() {
            let count = SurfaceSchema::members_at(CapabilityVersion::new(version)).len();
            assert!(count >= previous, "version {version} lost members");
            previous = count;
        }
    }

    #[test]
    fn added_between_lists_new_members() {
        let added =
            SurfaceSchema::added_between(CapabilityVersion::new(18), CapabilityVersion::new(21));
        assert_eq!(
            added,
            vec![
                SurfaceMember::DateGetDateInputIsoFormat,
                SurfaceMember::DateConvertToTimestamp
            ]
        );
    }

    #[test]
    fn ids_round_trip_and_are_unique() {
        for member in SurfaceMember::ALL {
            assert_eq!(SurfaceMember::from_id(member.id()), Some(member));
        }
        assert_eq!(SurfaceMember::from_id("data.uniswap"), None);
        assert_eq!(
            SurfaceMember::SettingsI18nTc.deprecated_in(),
            Some(CapabilityVersion::new(25))
        );
    }
}
