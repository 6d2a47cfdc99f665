//! HTTP Transport for the OpenStack APIs
//!
//! The exporter only ever issues authenticated `GET` requests. [`Transport`] is the
//! seam between the API clients and the network so that the page walk and the
//! collectors can be driven by a scripted transport in tests.

use crate::error::{ExporterError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::debug;

const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";
const NOVA_VERSION_HEADER: &str = "X-OpenStack-Nova-API-Version";
const API_VERSION_HEADER: &str = "OpenStack-API-Version";

/// A request against one OpenStack service
#[derive(Debug, Clone)]
pub struct Request<'a> {
    pub url: &'a str,
    /// Service type used for the microversion header, e.g. "compute"
    pub service_type: &'a str,
    pub microversion: Option<&'a str>,
}

/// Performs authenticated GET requests and returns the raw response body
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, request: Request<'_>) -> Result<String>;
}

/// [`Transport`] backed by a `reqwest` client carrying a pre-issued token
pub struct HttpTransport {
    client: reqwest::Client,
    token: SecretString,
}

impl HttpTransport {
    pub fn new(token: SecretString, timeout: Duration, verify_ssl: bool) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .danger_accept_invalid_certs(!verify_ssl)
            .build()
            .map_err(|e| ExporterError::ClientInit(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, token })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, request: Request<'_>) -> Result<String> {
        let mut token = HeaderValue::from_str(self.token.expose_secret().trim())
            .map_err(|e| ExporterError::Config(format!("invalid token: {}", e)))?;
        token.set_sensitive(true);

        let mut builder = self
            .client
            .get(request.url)
            .header(AUTH_TOKEN_HEADER, token);
        if let Some(version) = request.microversion {
            if request.service_type == "compute" {
                builder = builder.header(NOVA_VERSION_HEADER, version);
            }
            builder = builder.header(
                API_VERSION_HEADER,
                format!("{} {}", request.service_type, version),
            );
        }

        debug!("GET {}", request.url);
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ExporterError::OpenStackApi(format!(
                "GET {} returned {}: {}",
                request.url, status, error_text
            )));
        }

        Ok(response.text().await?)
    }
}
