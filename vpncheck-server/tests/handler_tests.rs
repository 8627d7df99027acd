//! In-process tests for the /vpncheck handler using a fake provider

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use vpncheck_core::{Config, LookupProvider, LookupResult, UpstreamError};
use vpncheck_server::handlers::MAX_BODY_BYTES;
use vpncheck_server::{router, AppState};

const TOKEN: &str = "test-token";

enum Behavior {
    Respond(Value),
    Status(u16),
    Hang,
}

struct FakeProvider {
    behavior: Behavior,
    calls: AtomicUsize,
    last_ip: Mutex<Option<String>>,
}

impl FakeProvider {
    fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_ip: Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LookupProvider for FakeProvider {
    async fn lookup(&self, ip_address: &str) -> Result<LookupResult, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_ip.lock().unwrap() = Some(ip_address.to_string());

        match &self.behavior {
            Behavior::Respond(value) => Ok(LookupResult::new(value.clone())),
            Behavior::Status(code) => Err(UpstreamError::Status(*code)),
            Behavior::Hang => std::future::pending().await,
        }
    }

    fn name(&self) -> &str {
        "fake"
    }
}

fn test_config(timeout_ms: u64) -> Config {
    Config::from_lookup(move |name| match name {
        "BEARER_TOKEN" => Some(TOKEN.to_string()),
        "VPNAPIIO_API_KEY" => Some("test-key".to_string()),
        "VPNAPI_TIMEOUT_MS" => Some(timeout_ms.to_string()),
        _ => None,
    })
    .expect("test config should be valid")
}

fn app_with(provider: Arc<FakeProvider>) -> Router {
    router(AppState::new(Arc::new(test_config(1500)), provider))
}

fn vpncheck_request(auth: Option<&str>, content_type: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/vpncheck");
    if let Some(auth) = auth {
        builder = builder.header("Authorization", auth);
    }
    if let Some(content_type) = content_type {
        builder = builder.header("Content-Type", content_type);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn authed_json(body: Value) -> Request<Body> {
    vpncheck_request(
        Some(format!("Bearer {}", TOKEN).as_str()),
        Some("application/json"),
        &body.to_string(),
    )
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn check_with_upstream(upstream: Value) -> (StatusCode, Value) {
    let provider = FakeProvider::new(Behavior::Respond(upstream));
    send(app_with(provider), authed_json(json!({ "ip_address": "203.0.113.7" }))).await
}

#[tokio::test]
async fn test_unauthorized_regardless_of_body() {
    let cases = [
        vpncheck_request(None, Some("application/json"), r#"{"ip_address":"1.2.3.4"}"#),
        vpncheck_request(
            Some("Bearer wrong-token"),
            Some("application/json"),
            r#"{"ip_address":"1.2.3.4"}"#,
        ),
        vpncheck_request(Some(TOKEN), Some("application/json"), r#"{"ip_address":"1.2.3.4"}"#),
        vpncheck_request(Some("Basic dGVzdDp0ZXN0"), None, "not json"),
        vpncheck_request(Some("bearer test-token"), Some("application/json"), "{}"),
        vpncheck_request(None, None, ""),
    ];

    for request in cases {
        let provider = FakeProvider::new(Behavior::Respond(json!({})));
        let (status, body) = send(app_with(provider.clone()), request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "Unauthorized" }));
        assert_eq!(provider.calls(), 0);
    }
}

#[tokio::test]
async fn test_invalid_content_type() {
    let auth = format!("Bearer {}", TOKEN);
    let cases = [
        vpncheck_request(Some(auth.as_str()), None, r#"{"ip_address":"1.2.3.4"}"#),
        vpncheck_request(Some(auth.as_str()), Some("text/plain"), r#"{"ip_address":"1.2.3.4"}"#),
        vpncheck_request(Some(auth.as_str()), Some("application/json"), ""),
        vpncheck_request(Some(auth.as_str()), Some("application/json"), "ip_address=1.2.3.4"),
    ];

    for request in cases {
        let provider = FakeProvider::new(Behavior::Respond(json!({})));
        let (status, body) = send(app_with(provider.clone()), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Invalid Content-Type" }));
        assert_eq!(provider.calls(), 0);
    }
}

#[tokio::test]
async fn test_oversized_body_without_token_is_unauthorized() {
    let provider = FakeProvider::new(Behavior::Respond(json!({})));
    let oversized = "a".repeat(3 * 1024 * 1024);
    let request = vpncheck_request(None, Some("text/plain"), &oversized);

    let (status, body) = send(app_with(provider.clone()), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_oversized_body_with_token_is_invalid() {
    let provider = FakeProvider::new(Behavior::Respond(json!({})));
    let padding = " ".repeat(MAX_BODY_BYTES);
    let request = vpncheck_request(
        Some(format!("Bearer {}", TOKEN).as_str()),
        Some("application/json"),
        &format!(r#"{{"ip_address":"1.2.3.4"}}{}"#, padding),
    );

    let (status, body) = send(app_with(provider.clone()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid Content-Type" }));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_missing_ip_address() {
    for payload in [
        json!({}),
        json!({ "ip": "1.2.3.4" }),
        json!({ "ip_address": "" }),
        json!({ "ip_address": null }),
        json!(["1.2.3.4"]),
    ] {
        let provider = FakeProvider::new(Behavior::Respond(json!({})));
        let (status, body) = send(app_with(provider.clone()), authed_json(payload)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Missing IP address" }));
        assert_eq!(provider.calls(), 0);
    }
}

#[tokio::test]
async fn test_clean_result_passed_through() {
    let upstream = json!({
        "ip": "203.0.113.7",
        "security": { "vpn": false, "proxy": false, "tor": false, "relay": false },
        "location": { "city": "Berlin", "country_code": "DE" },
        "network": { "autonomous_system_number": "AS3320" }
    });

    let provider = FakeProvider::new(Behavior::Respond(upstream.clone()));
    let (status, body) = send(
        app_with(provider.clone()),
        authed_json(json!({ "ip_address": "203.0.113.7" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, upstream);
    assert_eq!(provider.calls(), 1);
    assert_eq!(
        provider.last_ip.lock().unwrap().as_deref(),
        Some("203.0.113.7")
    );
}

#[tokio::test]
async fn test_null_result_becomes_empty_object() {
    let (status, body) = check_with_upstream(Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn test_blocked_by_provider() {
    let (status, body) = check_with_upstream(json!({ "error": "Blocked" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Request blocked: Blocked" }));
}

#[tokio::test]
async fn test_blocked_vpn() {
    let (status, body) = check_with_upstream(json!({ "security": { "vpn": true } })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Request blocked: VPN" }));
}

#[tokio::test]
async fn test_blocked_tor() {
    let (status, body) =
        check_with_upstream(json!({ "security": { "vpn": false, "tor": true } })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Request blocked: Tor" }));
}

#[tokio::test]
async fn test_blocked_geolocation() {
    let (status, body) = check_with_upstream(json!({ "location": { "country_code": "RU" } })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Request blocked: Geolocation" }));
}

#[tokio::test]
async fn test_first_matching_rule_wins() {
    let (_, body) = check_with_upstream(json!({
        "error": "Blocked",
        "security": { "vpn": true, "tor": true },
        "location": { "country_code": "RU" }
    }))
    .await;
    assert_eq!(body, json!({ "error": "Request blocked: Blocked" }));

    let (_, body) = check_with_upstream(json!({
        "security": { "vpn": true, "tor": true },
        "location": { "country_code": "RU" }
    }))
    .await;
    assert_eq!(body, json!({ "error": "Request blocked: VPN" }));

    let (_, body) = check_with_upstream(json!({
        "security": { "tor": true },
        "location": { "country_code": "RU" }
    }))
    .await;
    assert_eq!(body, json!({ "error": "Request blocked: Tor" }));
}

#[tokio::test]
async fn test_upstream_error_fails_open() {
    let provider = FakeProvider::new(Behavior::Status(502));
    let (status, body) = send(
        app_with(provider.clone()),
        authed_json(json!({ "ip_address": "198.51.100.1" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "warning": "Unable to check VPN", "details": "vpnapi.io returned 502" })
    );
    assert!(body.get("error").is_none());
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_upstream_timeout_fails_open() {
    let provider = FakeProvider::new(Behavior::Hang);
    let app = router(AppState::new(Arc::new(test_config(50)), provider.clone()));

    let (status, body) = send(app, authed_json(json!({ "ip_address": "198.51.100.1" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["warning"], "Unable to check VPN");
    assert_eq!(body["details"], "Request timed out after 50ms");
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_json_content_type_with_charset() {
    let provider = FakeProvider::new(Behavior::Respond(json!({ "ip": "1.1.1.1" })));
    let request = vpncheck_request(
        Some(format!("Bearer {}", TOKEN).as_str()),
        Some("application/json; charset=utf-8"),
        r#"{"ip_address":"1.1.1.1"}"#,
    );

    let (status, body) = send(app_with(provider), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ip": "1.1.1.1" }));
}

#[tokio::test]
async fn test_health_endpoints_skip_auth_and_upstream() {
    for uri in ["/health/live", "/health/ready"] {
        let provider = FakeProvider::new(Behavior::Hang);
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, body) = send(app_with(provider.clone()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["provider"], "fake");
        assert_eq!(provider.calls(), 0);
    }
}

#[tokio::test]
async fn test_wrong_method_rejected() {
    let provider = FakeProvider::new(Behavior::Respond(json!({})));
    let request = Request::builder()
        .method("GET")
        .uri("/vpncheck")
        .body(Body::empty())
        .unwrap();

    let response = app_with(provider).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
