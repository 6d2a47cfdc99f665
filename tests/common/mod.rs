//! Shared test fixtures: a scripted compute API and JSON builders

#![allow(dead_code)]

use async_trait::async_trait;
use openstack_exporter::collectors::ComputeCollector;
use openstack_exporter::error::{ExporterError, Result};
use openstack_exporter::openstack::client::{CatalogEndpoint, CatalogEntry};
use openstack_exporter::openstack::{
    EndpointOpts, Interface, ProviderClient, Request, ServiceCatalog, Transport,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const COMPUTE_ENDPOINT: &str = "http://nova.test/v2.1";
pub const SERVICES_URL: &str = "http://nova.test/v2.1/os-services";

/// Transport answering from a fixed URL -> response table
#[derive(Default)]
pub struct ScriptedTransport {
    responses: HashMap<String, std::result::Result<String, String>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: impl Into<String>) -> Self {
        self.responses.insert(url.to_string(), Ok(body.into()));
        self
    }

    pub fn with_failure(mut self, url: &str, message: &str) -> Self {
        self.responses
            .insert(url.to_string(), Err(message.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, request: Request<'_>) -> Result<String> {
        self.requests.lock().unwrap().push(request.url.to_string());
        match self.responses.get(request.url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(message)) => Err(ExporterError::OpenStackApi(message.clone())),
            None => Err(ExporterError::OpenStackApi(format!(
                "GET {} returned 404 Not Found",
                request.url
            ))),
        }
    }
}

pub fn compute_catalog() -> ServiceCatalog {
    ServiceCatalog::new(vec![CatalogEntry {
        service_type: "compute".to_string(),
        name: "nova".to_string(),
        endpoints: vec![CatalogEndpoint {
            region: Some("RegionOne".to_string()),
            interface: Interface::Public,
            url: COMPUTE_ENDPOINT.to_string(),
        }],
    }])
}

pub fn provider(transport: Arc<ScriptedTransport>) -> ProviderClient {
    ProviderClient::new(compute_catalog(), transport)
}

pub fn compute_collector(transport: Arc<ScriptedTransport>) -> ComputeCollector {
    let client = provider(transport)
        .compute_client(&EndpointOpts::default())
        .expect("compute endpoint in catalog");
    ComputeCollector::new(client, "openstack")
}

pub fn service(id: &str, host: &str, state: &str, status: &str, updated_at: &str) -> Value {
    json!({
        "id": id,
        "binary": "nova-compute",
        "host": host,
        "zone": "az1",
        "state": state,
        "status": status,
        "updated_at": updated_at,
        "disabled_reason": null,
        "forced_down": false
    })
}

pub fn page_body(services: Vec<Value>, next: Option<&str>) -> String {
    let mut body = json!({ "services": services });
    if let Some(href) = next {
        body["services_links"] = json!([{ "rel": "next", "href": href }]);
    }
    body.to_string()
}
