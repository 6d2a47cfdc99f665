//! Collector registry tests

mod common;

use common::{provider, ScriptedTransport};
use openstack_exporter::collectors::{
    new_compute_collector, CollectorContext, CollectorRegistry,
};
use openstack_exporter::error::ExporterError;
use openstack_exporter::openstack::{EndpointOpts, ProviderClient, ServiceCatalog};
use std::sync::Arc;

fn names(enabled: &[&str]) -> Vec<String> {
    enabled.iter().map(|name| name.to_string()).collect()
}

#[test]
fn test_default_registry_contains_compute() {
    let registry = CollectorRegistry::with_defaults();

    assert!(registry.contains("compute"));
    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["compute"]);
}

#[test]
fn test_duplicate_registration_is_rejected() {
    let mut registry = CollectorRegistry::new();
    registry
        .register("compute", new_compute_collector)
        .expect("first registration");

    let err = registry
        .register("compute", new_compute_collector)
        .unwrap_err();
    assert!(matches!(err, ExporterError::Config(_)));
}

#[test]
fn test_build_enabled_collectors() {
    // Given: A provider whose catalog has a compute endpoint
    let provider = provider(Arc::new(ScriptedTransport::new()));
    let endpoint = EndpointOpts::default();
    let ctx = CollectorContext {
        provider: &provider,
        endpoint: &endpoint,
        namespace: "openstack",
    };

    // When: Building the compute collector
    let built = CollectorRegistry::with_defaults()
        .build(&ctx, &names(&["compute"]))
        .expect("compute collector should build");

    // Then: It is returned under its registry name and describes its metrics
    assert_eq!(built.len(), 1);
    assert_eq!(built[0].name, "compute");
    assert_eq!(built[0].collector.describe().len(), 3);
}

#[test]
fn test_unknown_collector_is_config_error() {
    let provider = provider(Arc::new(ScriptedTransport::new()));
    let endpoint = EndpointOpts::default();
    let ctx = CollectorContext {
        provider: &provider,
        endpoint: &endpoint,
        namespace: "openstack",
    };

    let err = CollectorRegistry::with_defaults()
        .build(&ctx, &names(&["compute", "network"]))
        .err()
        .expect("unknown collector");

    assert!(matches!(err, ExporterError::Config(_)));
    assert!(err.to_string().contains("network"));
}

#[test]
fn test_missing_catalog_entry_fails_construction() {
    // Given: A provider with an empty service catalog
    let provider = ProviderClient::new(
        ServiceCatalog::default(),
        Arc::new(ScriptedTransport::new()),
    );
    let endpoint = EndpointOpts::default();
    let ctx = CollectorContext {
        provider: &provider,
        endpoint: &endpoint,
        namespace: "openstack",
    };

    // When: Calling the factory directly
    let err = new_compute_collector(&ctx).err().expect("no compute endpoint");

    // Then: Construction fails with a client init error
    assert!(matches!(err, ExporterError::ClientInit(_)));

    // And: The registry refuses to start with no usable collector
    let err = CollectorRegistry::with_defaults()
        .build(&ctx, &names(&["compute"]))
        .err()
        .expect("nothing to build");
    assert!(matches!(err, ExporterError::ClientInit(_)));
}
