//! Error types for the HTTP API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use vpncheck_core::BlockReason;

/// API error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    /// Missing, malformed or wrong bearer token (401)
    Unauthorized,

    /// Body is empty, not declared as JSON, or not parseable (400)
    InvalidContentType,

    /// Body has no usable `ip_address` (400)
    MissingIpAddress,

    /// Blocking policy rejected the address (400)
    Blocked(BlockReason),
}

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::InvalidContentType
            | ApiError::MissingIpAddress
            | ApiError::Blocked(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Short label used for metrics
    pub fn outcome(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "unauthorized",
            ApiError::InvalidContentType => "invalid_content_type",
            ApiError::MissingIpAddress => "missing_ip_address",
            ApiError::Blocked(_) => "blocked",
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized => write!(f, "Unauthorized"),
            ApiError::InvalidContentType => write!(f, "Invalid Content-Type"),
            ApiError::MissingIpAddress => write!(f, "Missing IP address"),
            ApiError::Blocked(reason) => write!(f, "Request blocked: {}", reason),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<BlockReason> for ApiError {
    fn from(reason: BlockReason) -> Self {
        ApiError::Blocked(reason)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (self.status(), body).into_response()
    }
}
