//! vpncheck HTTP server - authenticated IP reputation relay
//!
//! Exposes `POST /vpncheck`, which forwards an IP address to the reputation
//! provider and turns the answer into an allow or block decision.
//!
//! Provider outages fail open: when the lookup cannot be completed the
//! request is answered with a 200 warning instead of a block, so an
//! unreachable provider disables every blocking rule. Treat this as a
//! deliberate trust tradeoff when deploying.

pub mod api;
pub mod app;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod state;
pub mod tracing;

pub use api::{HealthResponse, LookupRequest, UpstreamWarning, VpnCheckResponse};
pub use app::router;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
