use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub openstack: OpenStackConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Connection settings for the OpenStack APIs
///
/// The exporter does not authenticate on its own: `token` must be an already
/// issued Keystone token and `catalog` the service catalog that came with it.
#[derive(Debug, Deserialize, Clone)]
pub struct OpenStackConfig {
    /// Usually supplied through `OS_TOKEN` rather than the config file
    #[serde(default = "default_token")]
    pub token: SecretString,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default = "default_interface")]
    pub interface: String,
    /// Compute API microversion, e.g. "2.53"
    #[serde(default)]
    pub compute_api_version: Option<String>,
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default)]
    pub catalog: Vec<CatalogEntryConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogEntryConfig {
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EndpointConfig {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default = "default_interface")]
    pub interface: String,
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricsConfig {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_scrape_interval")]
    pub scrape_interval_seconds: u64,
    /// Names of the collectors to instantiate at startup
    #[serde(default = "default_collectors")]
    pub collectors: Vec<String>,
}

impl Default for OpenStackConfig {
    fn default() -> Self {
        Self {
            token: default_token(),
            region: None,
            interface: default_interface(),
            compute_api_version: None,
            verify_ssl: default_verify_ssl(),
            request_timeout_seconds: default_request_timeout(),
            catalog: Vec::new(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            port: default_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            scrape_interval_seconds: default_scrape_interval(),
            collectors: default_collectors(),
        }
    }
}

fn default_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9180
}

fn default_token() -> SecretString {
    SecretString::from(String::new())
}

fn default_interface() -> String {
    "public".to_string()
}

fn default_verify_ssl() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    30
}

fn default_namespace() -> String {
    "openstack".to_string()
}

fn default_scrape_interval() -> u64 {
    60
}

fn default_collectors() -> Vec<String> {
    vec!["compute".to_string()]
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        // Load environment variables from .env if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("OPENSTACK_EXPORTER").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
