//! Upstream reputation provider client

use crate::config::UpstreamConfig;
use crate::error::UpstreamError;
use crate::lookup::LookupResult;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Source of per-IP reputation data
#[async_trait]
pub trait LookupProvider: Send + Sync {
    /// Look up a single IP address. Called at most once per inbound request.
    async fn lookup(&self, ip_address: &str) -> Result<LookupResult, UpstreamError>;

    /// Provider name for logging and metrics
    fn name(&self) -> &str;
}

/// vpnapi.io client
pub struct VpnApiClient {
    client: Client,
    base_url: Url,
    api_key: String,
    timeout: Duration,
}

impl VpnApiClient {
    /// Create a client from upstream settings
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| UpstreamError::Transport(e.without_url().to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            timeout: config.timeout,
        })
    }

    /// Build `{base}/api/{ip}?key={api_key}`
    pub fn lookup_url(&self, ip_address: &str) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::Url(self.base_url.to_string()))?
            .pop_if_empty()
            .push("api")
            .push(ip_address);
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    fn map_send_error(&self, err: reqwest::Error) -> UpstreamError {
        if err.is_timeout() {
            UpstreamError::Timeout(self.timeout.as_millis() as u64)
        } else {
            err.into()
        }
    }
}

#[async_trait]
impl LookupProvider for VpnApiClient {
    async fn lookup(&self, ip_address: &str) -> Result<LookupResult, UpstreamError> {
        let url = self.lookup_url(ip_address)?;

        debug!(ip = %ip_address, provider = self.name(), "Querying reputation provider");

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        let body: Value = response.json().await.map_err(|e| self.map_send_error(e))?;

        debug!(ip = %ip_address, "Reputation lookup complete");

        Ok(LookupResult::new(body))
    }

    fn name(&self) -> &str {
        "vpnapi.io"
    }
}
