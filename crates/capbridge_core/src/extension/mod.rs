//! Extension loader contracts.
//!
//! Manifests declare the capability version and surface members a bundle
//! relies on; the registry refuses activation before the bridge is handed
//! over when the host is too old.

pub mod capability;
pub mod kernel;
pub mod manifest;
