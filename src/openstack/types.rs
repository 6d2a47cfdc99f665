//! OpenStack Compute API Type Definitions
//!
//! Rust definitions for the `os-services` listing of the compute API. These types
//! are only ever read: the exporter never creates or mutates services.
//!
//! # Design Notes
//!
//! - **Identifiers**: `id` is an integer before microversion 2.53 and a UUID string
//!   afterwards. Both decode into a `String`.
//! - **Open enumerations**: `state` and `status` keep unexpected values instead of
//!   failing the whole page.
//! - **Timestamps**: `updated_at` is usually sent without a zone offset
//!   (`2012-10-29T13:42:02.000000`) and is interpreted as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Liveness of a service as detected by the control plane heartbeat
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ServiceState {
    Up,
    Down,
    Unknown(String),
}

impl From<String> for ServiceState {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "up" => Self::Up,
            "down" => Self::Down,
            _ => Self::Unknown(raw),
        }
    }
}

impl Default for ServiceState {
    fn default() -> Self {
        Self::Unknown(String::new())
    }
}

/// Administrative toggle, independent of [`ServiceState`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ServiceStatus {
    Enabled,
    Disabled,
    Unknown(String),
}

impl From<String> for ServiceStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "enabled" => Self::Enabled,
            "disabled" => Self::Disabled,
            _ => Self::Unknown(raw),
        }
    }
}

impl Default for ServiceStatus {
    fn default() -> Self {
        Self::Unknown(String::new())
    }
}

/// One compute service instance (`nova-compute`, `nova-scheduler`, ...)
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub binary: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub state: ServiceState,
    #[serde(default)]
    pub status: ServiceStatus,
    #[serde(default, deserialize_with = "deserialize_updated_at")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub disabled_reason: Option<String>,
    #[serde(default)]
    pub forced_down: Option<bool>,
}

impl ServiceRecord {
    /// Unix timestamp of the last heartbeat, 0 if the service was never seen
    pub fn last_seen_seconds(&self) -> i64 {
        self.updated_at.map(|ts| ts.timestamp()).unwrap_or(0)
    }
}

/// A decoded `GET /os-services` page
///
/// `services_links` is left to [`Page::next_link`](crate::openstack::Page::next_link).
#[derive(Debug, Deserialize)]
pub struct ServicePage {
    pub services: Vec<ServiceRecord>,
}

impl ServicePage {
    pub fn from_body(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }
}

/// Parse a compute API timestamp, with or without a zone offset
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("invalid timestamp {:?}: {}", raw, e))
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}

fn deserialize_updated_at<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(text) => parse_timestamp(text)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
