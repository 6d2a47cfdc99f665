//! OpenStack Prometheus Exporter
//!
//! A Prometheus metrics exporter for OpenStack clouds.
//!
//! # Overview
//!
//! The exporter queries the OpenStack service APIs with a pre-issued token and
//! republishes what it finds as Prometheus metrics. The compute collector reports
//! the liveness and administrative state of every compute service.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐       HTTPS          ┌──────────────┐
//! │  OpenStack  │ ◄─────────────────►  │   Exporter   │
//! │  Compute    │  GET /os-services    │              │
//! └─────────────┘                      │  ┌────────┐  │      HTTP      ┌────────────┐
//!                                      │  │Collect.│  │ ◄────────────► │ Prometheus │
//!                                      │  └────────┘  │   /metrics     └────────────┘
//!                                      │  ┌────────┐  │
//!                                      │  │Metrics │  │
//!                                      │  └────────┘  │
//!                                      └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`openstack`] - Provider/service clients, pagination and API types
//! - [`collectors`] - Collector trait, registry and the compute collector
//! - [`metrics`] - Prometheus registry and rendering
//! - [`server`] - HTTP server and collection loop
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! ```no_run
//! use openstack_exporter::{collectors::CollectorRegistry, config::Config, server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/Default.toml")?;
//!     server::start(config, CollectorRegistry::with_defaults()).await?;
//!     Ok(())
//! }
//! ```

pub mod collectors;
pub mod config;
pub mod error;
pub mod metrics;
pub mod openstack;
pub mod server;
