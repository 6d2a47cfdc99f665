//! Named collector factories
//!
//! The exporter decides at startup which collectors to run. Factories are
//! registered explicitly on a [`CollectorRegistry`] which is then handed to the
//! server; there is no process-wide registration.

use super::{compute, Collector, CollectorContext, CollectorFactory};
use crate::error::{ExporterError, Result};
use std::collections::BTreeMap;
use tracing::{error, info};

/// Factories shipped with the exporter
pub const DEFAULT_FACTORIES: &[(&str, CollectorFactory)] =
    &[("compute", compute::new_compute_collector as CollectorFactory)];

/// A constructed collector together with the name it was registered under
pub struct NamedCollector {
    pub name: String,
    pub collector: Box<dyn Collector>,
}

#[derive(Default)]
pub struct CollectorRegistry {
    factories: BTreeMap<String, CollectorFactory>,
}

impl CollectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry populated with [`DEFAULT_FACTORIES`]
    pub fn with_defaults() -> Self {
        let factories = DEFAULT_FACTORIES
            .iter()
            .map(|(name, factory)| (name.to_string(), *factory))
            .collect();
        Self { factories }
    }

    pub fn register(&mut self, name: &str, factory: CollectorFactory) -> Result<()> {
        if self.factories.contains_key(name) {
            return Err(ExporterError::Config(format!(
                "collector {:?} registered twice",
                name
            )));
        }
        self.factories.insert(name.to_string(), factory);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Instantiate the `enabled` collectors
    ///
    /// Unknown names are a configuration error. A factory failing with
    /// [`ExporterError::ClientInit`] only drops that collector; if none can be built
    /// the whole call fails.
    pub fn build(
        &self,
        ctx: &CollectorContext<'_>,
        enabled: &[String],
    ) -> Result<Vec<NamedCollector>> {
        if let Some(unknown) = enabled.iter().find(|name| !self.contains(name)) {
            return Err(ExporterError::Config(format!(
                "unknown collector {:?} (available: {})",
                unknown,
                self.names().collect::<Vec<_>>().join(", ")
            )));
        }

        let mut built = Vec::with_capacity(enabled.len());
        for name in enabled {
            let Some(factory) = self.factories.get(name) else {
                continue;
            };
            match factory(ctx) {
                Ok(collector) => {
                    info!("Enabled collector: {}", name);
                    built.push(NamedCollector {
                        name: name.clone(),
                        collector,
                    });
                }
                Err(e) => error!("Collector {} disabled: {}", name, e),
            }
        }

        if built.is_empty() {
            return Err(ExporterError::ClientInit(format!(
                "none of the requested collectors could be initialized: [{}]",
                enabled.join(", ")
            )));
        }

        Ok(built)
    }
}
