//! Compute service listing (`GET /os-services`)

use crate::error::{ExporterError, Result};
use crate::openstack::client::ServiceClient;
use crate::openstack::pagination::{Page, Pager};
use crate::openstack::types::{ServicePage, ServiceRecord};

const SERVICES_PATH: &str = "os-services";
const SERVICES_LINKS: &str = "services_links";

/// List all compute services, one page at a time
pub async fn list(client: &ServiceClient) -> Result<Pager<'_>> {
    client.list(SERVICES_PATH, SERVICES_LINKS).await
}

/// Decode the service records carried by one page
pub fn extract_services(page: &Page) -> Result<Vec<ServiceRecord>> {
    ServicePage::from_body(page.body())
        .map(|decoded| decoded.services)
        .map_err(|e| ExporterError::Decode(format!("{}: {}", page.url(), e)))
}
