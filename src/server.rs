//! HTTP Server and Metrics Collection
//!
//! This module implements the Prometheus exporter HTTP server and the collection loop.
//!
//! # Architecture
//!
//! - **HTTP Server**: Axum-based server exposing `/metrics`, `/health`, and `/` endpoints
//! - **Collection Loop**: Background task that periodically runs every enabled collector
//! - **State Management**: Shared state (config, metrics, collectors) using Arc for thread-safety
//!
//! # Endpoints
//!
//! - `GET /` - HTML landing page with links to metrics and health
//! - `GET /metrics` - Prometheus metrics in text format
//! - `GET /health` - Health check (returns 200 if any collector succeeded, 503 otherwise)
//!
//! # Metrics Collection
//!
//! The collection loop runs every N seconds (configured via `scrape_interval_seconds`) and:
//! 1. Runs each collector's update in turn, gathering its samples
//! 2. Replaces the previous cycle's series with the new samples
//! 3. Sets `<ns>_up` to 1 if any collector succeeded, 0 if all failed
//!
//! # Error Handling
//!
//! A collector failure is logged and exposed through `<ns>_collector_success`.
//! Samples it emitted before failing are still published.

use crate::collectors::{self, CollectionStatus, CollectorContext, CollectorRegistry, NamedCollector};
use crate::config::Config;
use crate::metrics::MetricsCollector;
use crate::openstack::{EndpointOpts, ProviderClient};
use anyhow::Context;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    config: Config,
    metrics: MetricsCollector,
    collectors: Arc<Vec<NamedCollector>>,
}

impl AppState {
    /// Build the collectors named in the configuration and their metric registry
    pub fn new(config: Config, registry: &CollectorRegistry) -> anyhow::Result<Self> {
        let provider = ProviderClient::from_config(&config.openstack)
            .context("Failed to create OpenStack provider client")?;
        let endpoint = EndpointOpts::from_config(&config.openstack)?;
        let ctx = CollectorContext {
            provider: &provider,
            endpoint: &endpoint,
            namespace: &config.metrics.namespace,
        };

        let collectors = registry
            .build(&ctx, &config.metrics.collectors)
            .context("Failed to initialize collectors")?;
        Self::with_collectors(config, collectors)
    }

    pub fn with_collectors(config: Config, collectors: Vec<NamedCollector>) -> anyhow::Result<Self> {
        let descs: Vec<_> = collectors
            .iter()
            .flat_map(|named| named.collector.describe())
            .collect();
        let metrics = MetricsCollector::new(&config.metrics.namespace, &descs)
            .context("Failed to register collector metrics")?;

        Ok(Self {
            config,
            metrics,
            collectors: Arc::new(collectors),
        })
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }
}

pub async fn start(config: Config, registry: CollectorRegistry) -> anyhow::Result<()> {
    let state = AppState::new(config.clone(), &registry)?;

    // Start background metrics collection
    let collection_state = state.clone();
    tokio::spawn(async move {
        collect_metrics_loop(collection_state).await;
    });

    // Build the router
    let app = router(state);

    // Start the server
    let addr = format!("{}:{}", config.server.addr, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Metrics server listening on {}", addr);
    info!("Metrics available at http://{}/metrics", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

async fn collect_metrics_loop(state: AppState) {
    let mut ticker = interval(Duration::from_secs(
        state.config.metrics.scrape_interval_seconds,
    ));

    loop {
        ticker.tick().await;

        if let Err(e) = collect_metrics(&state).await {
            error!("Failed to collect metrics: {}", e);
        }
    }
}

/// Run one collection cycle over every enabled collector
pub async fn collect_metrics(state: &AppState) -> anyhow::Result<()> {
    info!("Collecting metrics from OpenStack");

    let mut samples = Vec::new();
    let mut any_success = false;

    for named in state.collectors.iter() {
        let outcome = collectors::run_collector(&named.name, named.collector.as_ref()).await;
        if outcome.status == CollectionStatus::Success {
            any_success = true;
        }
        state.metrics.record_outcome(&named.name, &outcome);
        samples.extend(outcome.samples);
    }

    state.metrics.replace(&samples);
    state.metrics.up.set(if any_success { 1.0 } else { 0.0 });

    // If all collectors failed, return error so the cycle is logged as failed
    if !any_success {
        anyhow::bail!("Failed to collect any metrics from OpenStack - check token and catalog");
    }

    Ok(())
}

async fn root_handler() -> impl IntoResponse {
    axum::response::Html(
        r#"<html>
<head><title>OpenStack Exporter</title></head>
<body>
<h1>OpenStack Prometheus Exporter</h1>
<p><a href="/metrics">Metrics</a></p>
<p><a href="/health">Health</a></p>
</body>
</html>"#,
    )
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(metrics) => metrics.into_response(),
        Err(e) => {
            error!("Failed to render metrics: {}", e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error rendering metrics: {}", e),
            )
                .into_response()
        }
    }
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let up_value = state.metrics.up.get();

    if up_value > 0.0 {
        (axum::http::StatusCode::OK, "OK")
    } else {
        (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            "OpenStack API unreachable",
        )
    }
}
