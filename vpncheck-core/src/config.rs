//! Process configuration loaded once at startup

use crate::error::ConfigError;
use reqwest::Url;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

/// Inbound shared secret
pub const BEARER_TOKEN_VAR: &str = "BEARER_TOKEN";
/// Provider API key
pub const API_KEY_VAR: &str = "VPNAPIIO_API_KEY";
/// Provider base URL override
pub const BASE_URL_VAR: &str = "VPNAPI_BASE_URL";
/// Upstream timeout override in milliseconds
pub const TIMEOUT_VAR: &str = "VPNAPI_TIMEOUT_MS";
/// Listening socket override
pub const BIND_ADDRESS_VAR: &str = "BIND_ADDRESS";

/// Default provider base URL
pub const DEFAULT_BASE_URL: &str = "https://vpnapi.io";
/// Default upstream timeout
pub const DEFAULT_TIMEOUT_MS: u64 = 1500;
/// Default listening socket
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:5001";

/// Immutable process configuration
#[derive(Clone)]
pub struct Config {
    /// Secret expected in the inbound `Authorization: Bearer` header
    pub bearer_token: String,

    /// Upstream provider settings
    pub upstream: UpstreamConfig,

    /// Address the HTTP server listens on
    pub bind_address: SocketAddr,
}

/// Upstream provider settings
#[derive(Clone)]
pub struct UpstreamConfig {
    /// Provider base URL, e.g. `https://vpnapi.io`
    pub base_url: Url,

    /// Provider credential, sent as the `key` query parameter
    pub api_key: String,

    /// Bound on a single lookup
    pub timeout: Duration,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bearer_token = required(&lookup, BEARER_TOKEN_VAR)?;
        let api_key = required(&lookup, API_KEY_VAR)?;

        let base_url = optional(&lookup, BASE_URL_VAR)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = parse_base_url(&base_url)?;

        let timeout_ms = match optional(&lookup, TIMEOUT_VAR) {
            Some(raw) => parse_timeout_ms(&raw)?,
            None => DEFAULT_TIMEOUT_MS,
        };

        let bind_address = optional(&lookup, BIND_ADDRESS_VAR)
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address = bind_address
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: BIND_ADDRESS_VAR,
                reason: e.to_string(),
            })?;

        Ok(Self {
            bearer_token,
            upstream: UpstreamConfig {
                base_url,
                api_key,
                timeout: Duration::from_millis(timeout_ms),
            },
            bind_address,
        })
    }
}

impl UpstreamConfig {
    /// Create upstream settings with the default timeout
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            base_url,
            api_key: api_key.into(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Override the lookup timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, name).ok_or(ConfigError::Missing(name))
}

// Empty values count as unset.
fn optional<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|value| !value.is_empty())
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::Invalid {
        name: BASE_URL_VAR,
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ConfigError::Invalid {
            name: BASE_URL_VAR,
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    Ok(url)
}

fn parse_timeout_ms(raw: &str) -> Result<u64, ConfigError> {
    let ms = raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
        name: TIMEOUT_VAR,
        reason: e.to_string(),
    })?;

    if ms == 0 {
        return Err(ConfigError::Invalid {
            name: TIMEOUT_VAR,
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(ms)
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bearer_token", &"<redacted>")
            .field("upstream", &self.upstream)
            .field("bind_address", &self.bind_address)
            .finish()
    }
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}
