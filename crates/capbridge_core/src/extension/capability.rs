//! Surface member declarations for extension manifests.

use crate::bridge::SurfaceMember;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Returns every member id an extension may declare.
pub fn supported_surface_member_ids() -> Vec<&'static str> {
    SurfaceMember::ALL.iter().map(|member| member.id()).collect()
}

/// Parses one declared member id, e.g. `data.balancer`.
pub fn parse_surface_member(value: &str) -> Result<SurfaceMember, SurfaceMemberParseError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(SurfaceMemberParseError::EmptyMember);
    }
    SurfaceMember::from_id(normalized)
        .ok_or_else(|| SurfaceMemberParseError::UnsupportedMember(normalized.to_string()))
}

/// Member declaration parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceMemberParseError {
    EmptyMember,
    UnsupportedMember(String),
}

impl Display for SurfaceMemberParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMember => write!(f, "surface member value must not be empty"),
            Self::UnsupportedMember(value) => write!(f, "surface member is unsupported: {value}"),
        }
    }
}

impl Error for SurfaceMemberParseError {}
