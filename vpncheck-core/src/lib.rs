//! vpncheck core - IP reputation lookup and blocking policy
//!
//! This crate holds everything the relay needs apart from the HTTP server:
//! startup configuration, bearer-token verification, the upstream reputation
//! client and the static decision policy applied to its results.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod error;
pub mod lookup;
pub mod policy;
pub mod upstream;

pub use config::{Config, UpstreamConfig};
pub use error::{ConfigError, UpstreamError};
pub use lookup::LookupResult;
pub use policy::{evaluate, BlockReason, Verdict};
pub use upstream::{LookupProvider, VpnApiClient};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
