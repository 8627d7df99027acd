//! Application state

use std::sync::Arc;
use std::time::Instant;
use vpncheck_core::{Config, LookupProvider};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Startup configuration
    pub config: Arc<Config>,

    /// Reputation provider queried once per request
    pub provider: Arc<dyn LookupProvider>,

    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Arc<Config>, provider: Arc<dyn LookupProvider>) -> Self {
        Self {
            config,
            provider,
            start_time: Instant::now(),
        }
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
