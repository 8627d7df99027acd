//! Parsed reputation lookup results

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Result object returned by the reputation provider.
///
/// The payload is kept as raw JSON so it can be passed back to the caller
/// unmodified; only the handful of fields the blocking policy needs are
/// read through typed accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LookupResult(Value);

impl LookupResult {
    /// Wrap a parsed provider response
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Provider-level error string, e.g. `"Blocked"`
    pub fn error(&self) -> Option<&str> {
        self.0.get("error").and_then(Value::as_str)
    }

    /// `security.vpn` is exactly `true`
    pub fn is_vpn(&self) -> bool {
        self.security_flag("vpn")
    }

    /// `security.tor` is exactly `true`
    pub fn is_tor(&self) -> bool {
        self.security_flag("tor")
    }

    /// `location.country_code`
    pub fn country_code(&self) -> Option<&str> {
        self.0
            .get("location")
            .and_then(|location| location.get("country_code"))
            .and_then(Value::as_str)
    }

    /// Borrow the raw payload
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Payload to return to the caller; `null` becomes `{}`
    pub fn into_body(self) -> Value {
        match self.0 {
            Value::Null => Value::Object(Map::new()),
            other => other,
        }
    }

    fn security_flag(&self, flag: &str) -> bool {
        self.0
            .get("security")
            .and_then(|security| security.get(flag))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

impl From<Value> for LookupResult {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}
