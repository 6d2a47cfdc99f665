//! Prometheus Metrics Definitions
//!
//! This module owns the Prometheus registry exposed on `/metrics`.
//!
//! # Metric Families
//!
//! ## Collector metrics
//! Built at startup from the descriptors returned by every enabled collector's
//! `describe`. Registering them up front lets the registry reject duplicate names
//! before the first scrape.
//!
//! ## Exporter health
//! - `<ns>_up` - 1 if at least one collector succeeded in the last cycle
//! - `<ns>_collector_success` - Per collector result of the last cycle
//! - `<ns>_collector_duration_seconds` - Per collector duration of the last cycle
//!
//! # Metric Types
//!
//! - **GaugeVec**: collector gauges and the health series
//! - **CounterVec**: collector counters. Values are replaced each cycle, never
//!   accumulated across cycles.
//!
//! # Consistency
//!
//! Replacing a cycle's series holds a write lock that rendering shares, so a
//! scrape sees either the previous cycle or the new one, never a mix.

use crate::collectors::{CollectionOutcome, CollectionStatus, MetricDesc, Sample, ValueKind};
use prometheus::{CounterVec, Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::warn;

enum Family {
    Gauge(GaugeVec),
    Counter(CounterVec),
}

impl Family {
    fn reset(&self) {
        match self {
            Self::Gauge(vec) => vec.reset(),
            Self::Counter(vec) => vec.reset(),
        }
    }
}

/// Metrics collector for the exporter
#[derive(Clone)]
pub struct MetricsCollector {
    registry: Arc<Registry>,
    families: Arc<HashMap<String, Family>>,
    cycle: Arc<RwLock<()>>,

    pub up: Arc<Gauge>,
    pub collector_success: Arc<GaugeVec>,
    pub collector_duration_seconds: Arc<GaugeVec>,
}

impl MetricsCollector {
    pub fn new(namespace: &str, descs: &[MetricDesc]) -> anyhow::Result<Self> {
        let registry = Registry::new();
        let mut families = HashMap::with_capacity(descs.len());

        for desc in descs {
            let labels: Vec<&str> = desc.labels.iter().map(String::as_str).collect();
            let opts = Opts::new(desc.name.clone(), desc.help.clone());
            let family = match desc.kind {
                ValueKind::Gauge => {
                    let vec = GaugeVec::new(opts, &labels)?;
                    registry.register(Box::new(vec.clone()))?;
                    Family::Gauge(vec)
                }
                ValueKind::Counter => {
                    let vec = CounterVec::new(opts, &labels)?;
                    registry.register(Box::new(vec.clone()))?;
                    Family::Counter(vec)
                }
            };
            families.insert(desc.name.clone(), family);
        }

        let up = Gauge::with_opts(
            Opts::new(
                "up",
                "Whether the OpenStack APIs were reachable in the last cycle (1=up, 0=down)",
            )
            .namespace(namespace.to_string()),
        )?;

        let collector_success = GaugeVec::new(
            Opts::new(
                "collector_success",
                "Whether the collector succeeded in the last cycle (1=success, 0=failure)",
            )
            .namespace(namespace.to_string()),
            &["collector"],
        )?;

        let collector_duration_seconds = GaugeVec::new(
            Opts::new(
                "collector_duration_seconds",
                "Time the collector spent in the last cycle",
            )
            .namespace(namespace.to_string()),
            &["collector"],
        )?;

        registry.register(Box::new(up.clone()))?;
        registry.register(Box::new(collector_success.clone()))?;
        registry.register(Box::new(collector_duration_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            families: Arc::new(families),
            cycle: Arc::new(RwLock::new(())),
            up: Arc::new(up),
            collector_success: Arc::new(collector_success),
            collector_duration_seconds: Arc::new(collector_duration_seconds),
        })
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = {
            let _cycle = self.cycle.read().unwrap_or_else(|e| e.into_inner());
            self.registry.gather()
        };
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Swap the collector series for a new cycle's samples in one step
    ///
    /// Returns how many samples were stored.
    pub fn replace(&self, samples: &[Sample]) -> usize {
        let _cycle = self.cycle.write().unwrap_or_else(|e| e.into_inner());
        self.reset_families();
        self.apply_samples(samples)
    }

    /// Drop every collector series
    pub fn reset(&self) {
        let _cycle = self.cycle.write().unwrap_or_else(|e| e.into_inner());
        self.reset_families();
    }

    /// Apply emitted samples on top of the current series; returns how many were stored
    ///
    /// A sample repeated within one cycle overwrites the earlier value.
    pub fn apply(&self, samples: &[Sample]) -> usize {
        let _cycle = self.cycle.write().unwrap_or_else(|e| e.into_inner());
        self.apply_samples(samples)
    }

    fn reset_families(&self) {
        for family in self.families.values() {
            family.reset();
        }
    }

    fn apply_samples(&self, samples: &[Sample]) -> usize {
        let mut applied = 0;
        for sample in samples {
            let Some(family) = self.families.get(&sample.name) else {
                warn!("Sample for undescribed metric {} ignored", sample.name);
                continue;
            };
            let values = sample.label_values();

            let stored = match family {
                Family::Gauge(vec) => vec
                    .get_metric_with_label_values(values.as_slice())
                    .map(|gauge| gauge.set(sample.value)),
                Family::Counter(vec) => vec
                    .get_metric_with_label_values(values.as_slice())
                    .map(|counter| {
                        counter.reset();
                        if sample.value > 0.0 {
                            counter.inc_by(sample.value);
                        }
                    }),
            };

            match stored {
                Ok(()) => applied += 1,
                Err(e) => warn!("Sample for {} rejected: {}", sample.name, e),
            }
        }
        applied
    }

    /// Record the health series for one collector run
    pub fn record_outcome(&self, collector: &str, outcome: &CollectionOutcome) {
        let success = match outcome.status {
            CollectionStatus::Success => 1.0,
            CollectionStatus::Failed => 0.0,
        };
        self.collector_success
            .with_label_values(&[collector])
            .set(success);
        self.collector_duration_seconds
            .with_label_values(&[collector])
            .set(outcome.duration.as_secs_f64());
    }
}
