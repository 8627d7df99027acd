//! HTTP request handlers

use crate::api::{HealthResponse, HealthStatus, LookupRequest, UpstreamWarning, VpnCheckResponse};
use crate::error::{ApiError, ApiResult};
use crate::metrics::{self as server_metrics, LatencyTimer, UPSTREAM_LATENCY};
use crate::state::AppState;
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap},
    Json,
};
use serde_json::Value;
use tracing::{debug, info, warn};
use vpncheck_core::{auth, policy, LookupResult, UpstreamError, Verdict};

/// Largest request body read from an authenticated caller
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Handle `POST /vpncheck`.
///
/// The body is taken unread so that authentication always runs before any
/// size limit is applied to it.
#[tracing::instrument(
    name = "vpncheck",
    skip_all,
    fields(outcome = tracing::field::Empty)
)]
pub async fn vpncheck(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> ApiResult<Json<VpnCheckResponse>> {
    let result = check(&state, &headers, body).await;

    let outcome = match &result {
        Ok(Json(VpnCheckResponse::Unchecked(_))) => "unchecked",
        Ok(Json(VpnCheckResponse::Clean(_))) => "allowed",
        Err(e) => e.outcome(),
    };
    server_metrics::record_request(outcome);
    crate::tracing::record_outcome(outcome);

    result
}

async fn check(
    state: &AppState,
    headers: &HeaderMap,
    body: Body,
) -> ApiResult<Json<VpnCheckResponse>> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if !auth::verify_bearer(authorization, &state.config.bearer_token) {
        warn!("Rejected request with missing or invalid bearer token");
        return Err(ApiError::Unauthorized);
    }

    let body = read_body(body).await?;
    let payload = parse_json_body(headers, &body)?;
    let request = LookupRequest::from_json(&payload).ok_or(ApiError::MissingIpAddress)?;

    debug!(ip = %request.ip_address, "Checking IP address");

    let result = match lookup(state, &request.ip_address).await {
        Ok(result) => result,
        Err(e) => {
            warn!(
                ip = %request.ip_address,
                provider = state.provider.name(),
                error = %e,
                "Upstream lookup failed, allowing request"
            );
            server_metrics::record_upstream_failure(e.kind());
            return Ok(Json(VpnCheckResponse::Unchecked(UpstreamWarning::new(
                e.to_string(),
            ))));
        }
    };

    match policy::evaluate(&result) {
        Verdict::Block(reason) => {
            info!(ip = %request.ip_address, reason = %reason, "Request blocked");
            server_metrics::record_blocked(reason.as_str());
            Err(reason.into())
        }
        Verdict::Allow => {
            info!(ip = %request.ip_address, "Request allowed");
            Ok(Json(VpnCheckResponse::Clean(result.into_body())))
        }
    }
}

/// Query the provider, bounded by the configured upstream timeout
async fn lookup(state: &AppState, ip_address: &str) -> Result<LookupResult, UpstreamError> {
    let timeout = state.config.upstream.timeout;
    let timer = LatencyTimer::new(UPSTREAM_LATENCY);

    let result = match tokio::time::timeout(timeout, state.provider.lookup(ip_address)).await {
        Ok(result) => result,
        Err(_) => Err(UpstreamError::Timeout(timeout.as_millis() as u64)),
    };

    timer.record();
    result
}

/// Oversized or unreadable bodies are reported like any other non-JSON body
async fn read_body(body: Body) -> ApiResult<Bytes> {
    axum::body::to_bytes(body, MAX_BODY_BYTES).await.map_err(|e| {
        debug!(error = %e, "Failed to read request body");
        ApiError::InvalidContentType
    })
}

fn parse_json_body(headers: &HeaderMap, body: &Bytes) -> ApiResult<Value> {
    if body.is_empty() || !is_json_content_type(headers) {
        return Err(ApiError::InvalidContentType);
    }

    serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, "Request body is not valid JSON");
        ApiError::InvalidContentType
    })
}

/// `application/json` or any `+json` media type, parameters ignored
fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

fn health(state: &AppState) -> HealthResponse {
    HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        provider: state.provider.name().to_string(),
    }
}

/// Health check - liveness probe
pub async fn health_live(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health(&state))
}

/// Health check - readiness probe.
///
/// Never calls the provider: each lookup is billed against the API key.
pub async fn health_ready(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health(&state))
}

/// Prometheus metrics endpoint
pub async fn metrics() -> String {
    server_metrics::get_prometheus_metrics()
}
