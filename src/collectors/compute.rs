//! Compute Service Status Collector
//!
//! Lists the compute services (`nova-compute`, `nova-scheduler`, `nova-conductor`, ...)
//! and exports their liveness and administrative state.
//!
//! # Metrics Produced
//! - `<ns>_compute_up` - Liveness reported by the control plane (1=up, 0=anything else)
//! - `<ns>_compute_enabled` - Administrative status (1=enabled, 0=anything else)
//! - `<ns>_compute_last_seen` - Unix timestamp of the last heartbeat. Exposed as a
//!   counter although it is a freshness signal, not a count.
//!
//! All three are labelled `id`, `binary`, `service_host`, `zone`.

use super::{Collector, CollectorContext, MetricDesc, MetricSink, Sample, ValueKind};
use crate::error::Result;
use crate::openstack::services;
use crate::openstack::types::{ServiceRecord, ServiceState, ServiceStatus};
use crate::openstack::ServiceClient;
use async_trait::async_trait;
use tracing::debug;

const SUBSYSTEM: &str = "compute";
const LABELS: [&str; 4] = ["id", "binary", "service_host", "zone"];

/// Collects compute service status from the `os-services` API
pub struct ComputeCollector {
    client: ServiceClient,
    up: MetricDesc,
    enabled: MetricDesc,
    last_seen: MetricDesc,
}

impl ComputeCollector {
    pub fn new(client: ServiceClient, namespace: &str) -> Self {
        Self {
            client,
            up: MetricDesc::new(
                namespace,
                SUBSYSTEM,
                "up",
                "Status of compute services",
                ValueKind::Gauge,
                &LABELS,
            ),
            enabled: MetricDesc::new(
                namespace,
                SUBSYSTEM,
                "enabled",
                "Admin status of compute services",
                ValueKind::Gauge,
                &LABELS,
            ),
            last_seen: MetricDesc::new(
                namespace,
                SUBSYSTEM,
                "last_seen",
                "Last time the service was seen by OpenStack",
                ValueKind::Counter,
                &LABELS,
            ),
        }
    }

    fn emit_service(&self, service: &ServiceRecord, sink: &MetricSink) -> Result<()> {
        let labels = [
            service.id.as_str(),
            service.binary.as_str(),
            service.host.as_str(),
            service.zone.as_str(),
        ];

        sink.emit(Sample::new(&self.up, state_value(&service.state), &labels))?;
        sink.emit(Sample::new(
            &self.enabled,
            status_value(&service.status),
            &labels,
        ))?;
        sink.emit(Sample::new(
            &self.last_seen,
            service.last_seen_seconds() as f64,
            &labels,
        ))
    }
}

/// 1 for a service reported up, 0 otherwise
pub fn state_value(state: &ServiceState) -> f64 {
    match state {
        ServiceState::Up => 1.0,
        _ => 0.0,
    }
}

/// 1 for an administratively enabled service, 0 otherwise
pub fn status_value(status: &ServiceStatus) -> f64 {
    match status {
        ServiceStatus::Enabled => 1.0,
        _ => 0.0,
    }
}

/// Factory registered under `"compute"`
pub fn new_compute_collector(ctx: &CollectorContext<'_>) -> Result<Box<dyn Collector>> {
    let client = ctx.provider.compute_client(ctx.endpoint)?;
    Ok(Box::new(ComputeCollector::new(client, ctx.namespace)))
}

#[async_trait]
impl Collector for ComputeCollector {
    fn describe(&self) -> Vec<MetricDesc> {
        vec![
            self.up.clone(),
            self.enabled.clone(),
            self.last_seen.clone(),
        ]
    }

    async fn update(&self, sink: &MetricSink) -> Result<()> {
        let mut pager = services::list(&self.client).await?;

        while let Some(page) = pager.next_page().await {
            let page = page?;
            let records = services::extract_services(&page)?;
            debug!("{} compute services on {}", records.len(), page.url());

            for service in &records {
                self.emit_service(service, sink)?;
            }
        }

        Ok(())
    }
}
