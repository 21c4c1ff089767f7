use capbridge_core::settings::{CatalogTranslator, StaticI18nSource, StaticUserSettings};
use capbridge_core::{
    host_bridge, install_host_bridge, ActivationState, BridgeInstallError, CapabilityBridge,
    CapabilityVersion, EmptyData, ExtensionAdapter, ExtensionKernelError, ExtensionManifest,
    ExtensionRegistry, ExtensionSource, HostServices, InMemorySettingsStore, SurfaceAccessError,
    SurfaceMember, SurfaceSchema,
};
use std::sync::{Arc, Mutex};

fn host_bridge_for_tests() -> CapabilityBridge {
    CapabilityBridge::new(
        true,
        HostServices::new(
            Arc::new(InMemorySettingsStore::new()),
            Arc::new(StaticUserSettings::default()),
            Arc::new(StaticI18nSource::new(Arc::new(CatalogTranslator::new("en")))),
            Arc::new(EmptyData),
        ),
    )
}

/// Extension that records the members it could reach at activation.
struct PoolsDashboard {
    manifest: ExtensionManifest,
    seen: Mutex<Vec<SurfaceMember>>,
}

impl PoolsDashboard {
    fn requiring(min_version: u32, members: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            manifest: ExtensionManifest {
                id: format!("premium.pools.v{min_version}"),
                version: "1.0.0".to_string(),
                min_capability_version: CapabilityVersion::new(min_version),
                members: members.iter().map(|member| member.to_string()).collect(),
                entrypoint: Some("premium.pools.mount".to_string()),
            },
            seen: Mutex::new(Vec::new()),
        })
    }
}

impl ExtensionAdapter for PoolsDashboard {
    fn manifest(&self) -> &ExtensionManifest {
        &self.manifest
    }

    fn source(&self) -> ExtensionSource {
        ExtensionSource::Premium
    }

    fn entry(&self, bridge: &CapabilityBridge) -> Result<(), String> {
        let gated = bridge.gated_surface(self.manifest.min_capability_version);
        let mut seen = self.seen.lock().map_err(|err| err.to_string())?;
        for member in self.manifest.declared_members() {
            gated.require(member).map_err(|err| err.to_string())?;
            seen.push(member);
        }
        gated
            .access(SurfaceMember::DataBalancer, |surface| {
                surface.data.balancer.pool_balances().len()
            })
            .map_err(|err| err.to_string())?;
        Ok(())
    }
}

#[test]
fn version_25_surface_exposes_balancer() {
    let bridge = host_bridge_for_tests();
    assert_eq!(bridge.version(), CapabilityVersion::new(25));
    assert!(SurfaceSchema::members_at(bridge.version()).contains(&SurfaceMember::DataBalancer));

    let surface = bridge.surface();
    assert!(surface.data.balancer.pool_balances().is_empty());

    let gated = bridge.gated_surface(CapabilityVersion::new(25));
    assert!(gated.require(SurfaceMember::DataBalancer).is_ok());
}

#[test]
fn extension_requiring_newer_version_is_refused_before_entry() {
    let bridge = host_bridge_for_tests();
    let mut registry = ExtensionRegistry::new();
    let future = PoolsDashboard::requiring(30, &["data.balancer"]);
    registry.register_adapter(future.clone()).unwrap();

    let err = registry.activate("premium.pools.v30", &bridge).unwrap_err();
    match err {
        ExtensionKernelError::VersionMismatch(mismatch) => {
            assert_eq!(mismatch.extension_id, "premium.pools.v30");
            assert_eq!(mismatch.required, CapabilityVersion::new(30));
            assert_eq!(mismatch.provided, CapabilityVersion::new(25));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(future.seen.lock().unwrap().is_empty());
    assert_eq!(
        registry.get("premium.pools.v30").unwrap().state,
        ActivationState::Refused
    );
}

#[test]
fn compatible_extension_reaches_declared_members() {
    let bridge = host_bridge_for_tests();
    let mut registry = ExtensionRegistry::new();
    let current = PoolsDashboard::requiring(11, &["data.balancer", "date.epoch"]);
    registry.register_adapter(current.clone()).unwrap();

    let results = registry.activate_all(&bridge);
    assert_eq!(results.len(), 1);
    assert!(results[0].1.is_ok());
    assert_eq!(
        *current.seen.lock().unwrap(),
        vec![SurfaceMember::DataBalancer, SurfaceMember::DateEpoch]
    );
    registry
        .assert_surface_member("premium.pools.v11", SurfaceMember::DataBalancer)
        .unwrap();
}

#[test]
fn extension_targeting_old_version_cannot_reach_newer_members() {
    let bridge = host_bridge_for_tests();
    let mut registry = ExtensionRegistry::new();
    let legacy = PoolsDashboard::requiring(5, &["data.compound"]);
    registry.register_adapter(legacy.clone()).unwrap();

    let err = registry.activate("premium.pools.v5", &bridge).unwrap_err();
    assert!(matches!(err, ExtensionKernelError::EntryFailed { .. }));
    assert_eq!(
        registry.get("premium.pools.v5").unwrap().state,
        ActivationState::Failed
    );

    let gated = bridge.gated_surface(CapabilityVersion::new(5));
    assert_eq!(
        gated.require(SurfaceMember::DataBalancer),
        Err(SurfaceAccessError::NotAvailable {
            member: SurfaceMember::DataBalancer,
            target: CapabilityVersion::new(5),
        })
    );
}

#[test]
fn process_wide_bridge_installs_once() {
    assert!(host_bridge().is_none());
    let installed = install_host_bridge(host_bridge_for_tests()).unwrap();
    assert_eq!(installed.version(), CapabilityVersion::CURRENT);
    assert!(host_bridge().is_some());

    let err = install_host_bridge(host_bridge_for_tests()).unwrap_err();
    assert_eq!(err, BridgeInstallError::AlreadyInstalled);
}
