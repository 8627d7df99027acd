//! API request and response types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Warning text returned when the provider could not be reached
pub const UPSTREAM_WARNING: &str = "Unable to check VPN";

/// Body of `POST /vpncheck`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LookupRequest {
    /// Address to check
    pub ip_address: String,
}

impl LookupRequest {
    /// Extract the request from an already parsed JSON body.
    ///
    /// Returns `None` when `ip_address` is absent, not a string, or empty.
    /// Address syntax is left for the provider to judge.
    pub fn from_json(body: &Value) -> Option<Self> {
        body.get("ip_address")
            .and_then(Value::as_str)
            .filter(|ip| !ip.is_empty())
            .map(|ip| Self {
                ip_address: ip.to_string(),
            })
    }
}

/// Successful (200) response of `POST /vpncheck`
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum VpnCheckResponse {
    /// Provider lookup failed; the request is let through
    Unchecked(UpstreamWarning),

    /// Provider result passed through unchanged
    Clean(Value),
}

/// Fail-open warning body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamWarning {
    /// Always [`UPSTREAM_WARNING`]
    pub warning: String,

    /// Failure message
    pub details: String,
}

impl UpstreamWarning {
    /// Create a warning carrying the failure message
    pub fn new(details: impl Into<String>) -> Self {
        Self {
            warning: UPSTREAM_WARNING.to_string(),
            details: details.into(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Service status
    pub status: HealthStatus,

    /// Service version
    pub version: String,

    /// Uptime in seconds
    pub uptime_seconds: u64,

    /// Name of the configured reputation provider
    pub provider: String,
}

/// Health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Service is healthy
    Healthy,
    /// Service is unhealthy
    Unhealthy,
}
