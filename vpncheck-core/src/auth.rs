//! Bearer token verification for inbound requests

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the credential from an `Authorization` header value.
///
/// Returns `None` unless the value starts with the exact `Bearer ` prefix.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    header_value.strip_prefix(BEARER_PREFIX)
}

/// Check an optional `Authorization` header against the configured secret
pub fn verify_bearer(header_value: Option<&str>, expected: &str) -> bool {
    header_value
        .and_then(bearer_token)
        .is_some_and(|provided| constant_time_eq(provided, expected))
}

/// Compare two secrets without short-circuiting on the first differing byte
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let diff = a
        .bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y));

    diff == 0
}
