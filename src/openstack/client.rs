//! OpenStack Provider and Service Clients
//!
//! A [`ProviderClient`] holds everything shared by all services of one cloud: the
//! service catalog that came with the token and the authenticated [`Transport`].
//! A [`ServiceClient`] is a provider narrowed to one resolved endpoint.
//!
//! # Example
//!
//! ```no_run
//! use openstack_exporter::config::Config;
//! use openstack_exporter::openstack::{services, EndpointOpts, ProviderClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::load("config/Default.toml")?;
//! let provider = ProviderClient::from_config(&config.openstack)?;
//! let opts = EndpointOpts::from_config(&config.openstack)?;
//!
//! let compute = provider.compute_client(&opts)?;
//! let mut pager = services::list(&compute).await?;
//! while let Some(page) = pager.next_page().await {
//!     let records = services::extract_services(&page?)?;
//!     println!("{} services", records.len());
//! }
//! # Ok(())
//! # }
//! ```

use crate::config::{CatalogEntryConfig, OpenStackConfig};
use crate::error::{ExporterError, Result};
use crate::openstack::pagination::{Page, Pager};
use crate::openstack::transport::{HttpTransport, Request, Transport};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Endpoint interface type as listed in the service catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interface {
    #[default]
    Public,
    Internal,
    Admin,
}

impl Interface {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Internal => "internal",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interface {
    type Err = ExporterError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().trim_end_matches("url") {
            "public" => Ok(Self::Public),
            "internal" => Ok(Self::Internal),
            "admin" => Ok(Self::Admin),
            _ => Err(ExporterError::Config(format!(
                "unknown endpoint interface {:?} (expected public, internal or admin)",
                raw
            ))),
        }
    }
}

/// Endpoint selection: which region and interface to use, and at which microversion
#[derive(Debug, Clone, Default)]
pub struct EndpointOpts {
    pub region: Option<String>,
    pub interface: Interface,
    pub microversion: Option<String>,
}

impl EndpointOpts {
    pub fn from_config(config: &OpenStackConfig) -> Result<Self> {
        Ok(Self {
            region: config.region.clone().filter(|r| !r.is_empty()),
            interface: config.interface.parse()?,
            microversion: config
                .compute_api_version
                .clone()
                .filter(|v| !v.is_empty()),
        })
    }
}

#[derive(Debug, Clone)]
pub struct CatalogEndpoint {
    pub region: Option<String>,
    pub interface: Interface,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub service_type: String,
    pub name: String,
    pub endpoints: Vec<CatalogEndpoint>,
}

/// The service catalog returned alongside a Keystone token
#[derive(Debug, Clone, Default)]
pub struct ServiceCatalog {
    entries: Vec<CatalogEntry>,
}

impl ServiceCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn from_config(entries: &[CatalogEntryConfig]) -> Result<Self> {
        let entries = entries
            .iter()
            .map(|entry| {
                let endpoints = entry
                    .endpoints
                    .iter()
                    .map(|endpoint| {
                        Ok(CatalogEndpoint {
                            region: endpoint.region.clone(),
                            interface: endpoint.interface.parse()?,
                            url: endpoint.url.clone(),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(CatalogEntry {
                    service_type: entry.service_type.clone(),
                    name: entry.name.clone(),
                    endpoints,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(entries))
    }

    /// Find the endpoint URL for `service_type` matching the region and interface
    pub fn locate(&self, service_type: &str, opts: &EndpointOpts) -> Result<String> {
        self.entries
            .iter()
            .filter(|entry| entry.service_type == service_type)
            .flat_map(|entry| entry.endpoints.iter())
            .find(|endpoint| {
                endpoint.interface == opts.interface
                    && match &opts.region {
                        Some(region) => endpoint.region.as_deref() == Some(region.as_str()),
                        None => true,
                    }
            })
            .map(|endpoint| endpoint.url.clone())
            .ok_or_else(|| {
                ExporterError::ClientInit(format!(
                    "no {} endpoint in service catalog (region: {}, interface: {})",
                    service_type,
                    opts.region.as_deref().unwrap_or("any"),
                    opts.interface
                ))
            })
    }
}

/// Authenticated handle to one OpenStack cloud
///
/// Cheap to clone; the transport is shared.
#[derive(Clone)]
pub struct ProviderClient {
    catalog: ServiceCatalog,
    transport: Arc<dyn Transport>,
}

impl ProviderClient {
    pub fn new(catalog: ServiceCatalog, transport: Arc<dyn Transport>) -> Self {
        Self { catalog, transport }
    }

    pub fn from_config(config: &OpenStackConfig) -> Result<Self> {
        let catalog = ServiceCatalog::from_config(&config.catalog)?;
        let transport = HttpTransport::new(
            config.token.clone(),
            Duration::from_secs(config.request_timeout_seconds),
            config.verify_ssl,
        )?;
        Ok(Self::new(catalog, Arc::new(transport)))
    }

    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    /// Build a client for any catalog service type
    pub fn service_client(&self, service_type: &str, opts: &EndpointOpts) -> Result<ServiceClient> {
        let endpoint = self.catalog.locate(service_type, opts)?;
        debug!("Resolved {} endpoint: {}", service_type, endpoint);
        Ok(ServiceClient {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            service_type: service_type.to_string(),
            microversion: opts.microversion.clone(),
            transport: self.transport.clone(),
        })
    }

    /// Build a client for the compute (v2.1) API
    pub fn compute_client(&self, opts: &EndpointOpts) -> Result<ServiceClient> {
        self.service_client("compute", opts)
    }
}

/// Client bound to a single resolved service endpoint
///
/// This client is `Send` and `Sync` and is only ever read after construction, so
/// concurrent scrapes may share it.
#[derive(Clone)]
pub struct ServiceClient {
    endpoint: String,
    service_type: String,
    microversion: Option<String>,
    transport: Arc<dyn Transport>,
}

impl ServiceClient {
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    /// Absolute URL for a path relative to the endpoint
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }

    /// Fetch a raw response body
    pub async fn get(&self, url: &str) -> Result<String> {
        self.transport
            .get(Request {
                url,
                service_type: &self.service_type,
                microversion: self.microversion.as_deref(),
            })
            .await
    }

    /// Start a paginated listing of `path`
    ///
    /// The first page is requested eagerly; a failure there is reported as
    /// [`ExporterError::Fetch`]. Later pages are fetched lazily by the [`Pager`].
    pub async fn list(&self, path: &str, links_key: &'static str) -> Result<Pager<'_>> {
        let url = self.url(path);
        let body = self
            .get(&url)
            .await
            .map_err(|e| ExporterError::Fetch(format!("GET {}: {}", url, e)))?;
        Ok(Pager::new(self, Page::new(url, body), links_key))
    }
}
