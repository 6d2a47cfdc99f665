//! Metrics Collectors
//!
//! This module contains the collector abstraction and the collectors for the
//! individual OpenStack services. Each collector is responsible for querying one
//! API and emitting the corresponding metric samples.
//!
//! # Architecture
//!
//! Collectors follow a consistent pattern:
//! - Are built once at startup by a factory from a [`CollectorContext`]
//! - Declare every metric they may emit through [`Collector::describe`]
//! - On each scrape, query the API and write [`Sample`]s into a [`MetricSink`]
//! - Return an error for the scrape loop to report; they never retry
//!
//! # Error Handling
//!
//! A failing collector is non-fatal for the exporter: [`run_collector`] logs the
//! error, keeps the samples that were emitted before it, and reports
//! [`CollectionStatus::Failed`] so the scrape loop can expose it.

use crate::error::{ExporterError, Result};
use crate::openstack::{EndpointOpts, ProviderClient};
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};

pub mod compute;
pub mod registry;

pub use compute::{new_compute_collector, ComputeCollector};
pub use registry::{CollectorRegistry, NamedCollector};

/// How a sample value is to be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Gauge,
    Counter,
}

/// Static description of a metric family a collector may emit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDesc {
    pub name: String,
    pub help: String,
    pub kind: ValueKind,
    pub labels: Vec<String>,
}

impl MetricDesc {
    pub fn new(
        namespace: &str,
        subsystem: &str,
        name: &str,
        help: &str,
        kind: ValueKind,
        labels: &[&str],
    ) -> Self {
        Self {
            name: build_fq_name(namespace, subsystem, name),
            help: help.to_string(),
            kind,
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }
}

/// Join the non-empty name parts with `_`
pub fn build_fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    [namespace, subsystem, name]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}

/// One value of one labelled series
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: String,
    pub kind: ValueKind,
    /// Label pairs in the order declared by the descriptor
    pub labels: Vec<(String, String)>,
    pub value: f64,
}

impl Sample {
    pub fn new(desc: &MetricDesc, value: f64, label_values: &[&str]) -> Self {
        debug_assert_eq!(desc.labels.len(), label_values.len());
        Self {
            name: desc.name.clone(),
            kind: desc.kind,
            labels: desc
                .labels
                .iter()
                .zip(label_values)
                .map(|(name, value)| (name.clone(), value.to_string()))
                .collect(),
            value,
        }
    }

    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(label, _)| label == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn label_values(&self) -> Vec<&str> {
        self.labels.iter().map(|(_, value)| value.as_str()).collect()
    }
}

/// Write-only end of the per-scrape sample channel
#[derive(Clone)]
pub struct MetricSink {
    tx: mpsc::UnboundedSender<Sample>,
}

impl MetricSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Sample>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, sample: Sample) -> Result<()> {
        self.tx
            .send(sample)
            .map_err(|e| ExporterError::Sink(format!("dropped sample {}", e.0.name)))
    }
}

/// A metrics source that can be scraped
#[async_trait]
pub trait Collector: Send + Sync {
    /// Every metric family this collector may emit
    fn describe(&self) -> Vec<MetricDesc>;

    /// Query the backing API once and emit the resulting samples
    async fn update(&self, sink: &MetricSink) -> Result<()>;
}

/// Everything a collector factory needs at startup
#[derive(Clone, Copy)]
pub struct CollectorContext<'a> {
    pub provider: &'a ProviderClient,
    pub endpoint: &'a EndpointOpts,
    /// Metric name prefix, e.g. "openstack"
    pub namespace: &'a str,
}

/// Builds a collector; fails with [`ExporterError::ClientInit`] when its API is unavailable
pub type CollectorFactory = fn(&CollectorContext<'_>) -> Result<Box<dyn Collector>>;

/// Status of a metrics collection operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStatus {
    /// Metrics were successfully collected
    Success,
    /// Collection failed; samples emitted before the failure are still kept
    Failed,
}

/// Result of running one collector for one scrape
#[derive(Debug)]
pub struct CollectionOutcome {
    pub status: CollectionStatus,
    pub samples: Vec<Sample>,
    pub error: Option<ExporterError>,
    pub duration: Duration,
}

/// Run a single collector update and gather what it emitted
///
/// - On success: logs the sample count, returns `CollectionStatus::Success`
/// - On error: logs a warning, returns `CollectionStatus::Failed` together with the
///   error and any samples written before it
pub async fn run_collector(name: &str, collector: &dyn Collector) -> CollectionOutcome {
    let (sink, mut rx) = MetricSink::channel();
    let started = Instant::now();
    let result = collector.update(&sink).await;
    let duration = started.elapsed();
    drop(sink);

    let mut samples = Vec::new();
    while let Ok(sample) = rx.try_recv() {
        samples.push(sample);
    }

    match result {
        Ok(()) => {
            info!("Updated {} metrics ({} samples)", name, samples.len());
            CollectionOutcome {
                status: CollectionStatus::Success,
                samples,
                error: None,
                duration,
            }
        }
        Err(e) => {
            warn!(
                "Failed to collect {} metrics: {} ({} samples kept)",
                name,
                e,
                samples.len()
            );
            CollectionOutcome {
                status: CollectionStatus::Failed,
                samples,
                error: Some(e),
                duration,
            }
        }
    }
}
