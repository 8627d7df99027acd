//! Prometheus metrics collection for the vpncheck server

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Instant;

/// Upstream lookup latency histogram name
pub const UPSTREAM_LATENCY: &str = "vpncheck_upstream_latency_seconds";

/// Initialize all metric descriptions
pub fn init_metrics() {
    describe_counter!("vpncheck_requests_total", "Total number of /vpncheck requests by outcome");
    describe_counter!("vpncheck_blocked_total", "Total number of requests blocked by policy");
    describe_counter!(
        "vpncheck_upstream_failures_total",
        "Total number of failed upstream lookups (served fail-open)"
    );
    describe_histogram!(UPSTREAM_LATENCY, "Upstream lookup latency in seconds");
}

/// Record the outcome of a /vpncheck request
pub fn record_request(outcome: &str) {
    counter!("vpncheck_requests_total", 1, "outcome" => outcome.to_string());
}

/// Record a policy block
pub fn record_blocked(reason: &str) {
    counter!("vpncheck_blocked_total", 1, "reason" => reason.to_string());
}

/// Record a failed upstream lookup
pub fn record_upstream_failure(kind: &str) {
    counter!("vpncheck_upstream_failures_total", 1, "kind" => kind.to_string());
}

/// Timer for measuring operation latency
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }

    pub fn record(self) {
        let elapsed = self.start.elapsed().as_secs_f64();
        histogram!(self.metric_name, elapsed);
    }
}

/// Storage for Prometheus handle
static PROMETHEUS_HANDLE: std::sync::OnceLock<metrics_exporter_prometheus::PrometheusHandle> =
    std::sync::OnceLock::new();

/// Initialize Prometheus exporter and install it as the global recorder
pub fn init_prometheus() -> anyhow::Result<()> {
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let handle = builder.install_recorder()?;
    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| anyhow::anyhow!("Failed to set Prometheus handle"))?;
    Ok(())
}

/// Get Prometheus metrics string
pub fn get_prometheus_metrics() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Prometheus metrics not initialized\n".to_string())
}
