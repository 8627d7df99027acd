//! Error types for vpncheck

use thiserror::Error;

/// Startup configuration error. Always fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is unset or empty
    #[error("{0} is not set")]
    Missing(&'static str),

    /// An environment variable is set but cannot be used
    #[error("{name} is invalid: {reason}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

/// Failure of a single upstream lookup.
///
/// The display text is what callers see in the `details` field of the
/// fail-open warning, so keep it free of credentials.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// Provider answered with a non-2xx status
    #[error("vpnapi.io returned {0}")]
    Status(u16),

    /// Lookup did not complete within the configured timeout
    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    /// Connection or protocol failure
    #[error("Request failed: {0}")]
    Transport(String),

    /// Response body was not valid JSON
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// Lookup URL could not be built
    #[error("Invalid lookup URL: {0}")]
    Url(String),
}

impl UpstreamError {
    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Status(_) => "status",
            UpstreamError::Timeout(_) => "timeout",
            UpstreamError::Transport(_) => "transport",
            UpstreamError::Decode(_) => "decode",
            UpstreamError::Url(_) => "url",
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest embeds the request URL, which carries the API key
        let err = err.without_url();
        if err.is_decode() {
            UpstreamError::Decode(err.to_string())
        } else {
            UpstreamError::Transport(err.to_string())
        }
    }
}
