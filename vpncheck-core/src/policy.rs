//! Static blocking policy applied to lookup results
//!
//! Rules are checked in a fixed order and the first match wins:
//! provider block, VPN, Tor, then geolocation.

use crate::lookup::LookupResult;
use std::fmt;

/// Provider error value that marks an address as blocked
pub const PROVIDER_BLOCKED: &str = "Blocked";

/// Country codes rejected by the geolocation rule
pub const BLOCKED_COUNTRY_CODES: &[&str] = &["RU"];

/// Why a request was blocked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockReason {
    /// Provider reported the address as blocked
    Blocked,
    /// Address belongs to a VPN
    Vpn,
    /// Address is a Tor node
    Tor,
    /// Address geolocates to a blocked country
    Geolocation,
}

impl BlockReason {
    /// Label used in responses
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockReason::Blocked => "Blocked",
            BlockReason::Vpn => "VPN",
            BlockReason::Tor => "Tor",
            BlockReason::Geolocation => "Geolocation",
        }
    }
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of applying the policy to a lookup result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// No rule matched
    Allow,
    /// A rule matched
    Block(BlockReason),
}

impl Verdict {
    /// True if the request should be rejected
    pub fn is_block(&self) -> bool {
        matches!(self, Verdict::Block(_))
    }
}

/// Apply the blocking rules to a lookup result
pub fn evaluate(result: &LookupResult) -> Verdict {
    if result.error() == Some(PROVIDER_BLOCKED) {
        return Verdict::Block(BlockReason::Blocked);
    }

    if result.is_vpn() {
        return Verdict::Block(BlockReason::Vpn);
    }

    if result.is_tor() {
        return Verdict::Block(BlockReason::Tor);
    }

    if result
        .country_code()
        .is_some_and(|code| BLOCKED_COUNTRY_CODES.iter().any(|blocked| *blocked == code))
    {
        return Verdict::Block(BlockReason::Geolocation);
    }

    Verdict::Allow
}
