//! Integration tests for the API layer.
//!
//! These tests spin up a real HTTP server on a random port so that
//! `ConnectInfo<SocketAddr>` is populated for the rate limiter.

use frontline_api::{create_router, AppState, RateLimitConfig};
use frontline_common::ServiceDirectory;
use frontline_coordinator::CoordinatorConfig;
use std::net::SocketAddr;
use std::sync::Arc;

async fn spawn(state: AppState) -> String {
    let router = create_router(Arc::new(state), Some(vec!["*".to_string()]));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    format!("http://{}", addr)
}

/// Spin up a test server over the bundled reference data.
async fn start_test_server() -> String {
    spawn(AppState::new(CoordinatorConfig::default()).unwrap()).await
}

/// Helper to GET a URL and return (status, body_string).
async fn get(base: &str, path: &str) -> (u16, String) {
    let client = reqwest::Client::new();
    let resp = client
        .get(format!("{}{}", base, path))
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap();
    (status, body)
}

/// Helper to POST JSON and return (status, body_string).
async fn post_json(base: &str, path: &str, json: &str) -> (u16, String) {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}{}", base, path))
        .header("content-type", "application/json")
        .body(json.to_string())
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap();
    (status, body)
}

fn parse(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap()
}

// ============================================================================
// Health endpoint
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let base = start_test_server().await;
    let (status, body) = get(&base, "/health").await;
    assert_eq!(status, 200);

    let json = parse(&body);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["system_mode"], "degraded");
    assert_eq!(json["datasets_loaded"], 2);
    assert!(json["services_loaded"].as_u64().unwrap() > 0);
}

// ============================================================================
// Emergency endpoint
// ============================================================================

#[tokio::test]
async fn test_full_workflow_chest_pain_lahore() {
    let base = start_test_server().await;
    let (status, body) = post_json(
        &base,
        "/api/emergency",
        r#"{"action": "full_workflow", "case_data": {"symptoms": "severe chest pain", "emergency_type": "medical", "location": "Lahore"}}"#,
    )
    .await;
    assert_eq!(status, 200);

    let json = parse(&body);
    assert_eq!(json["status"], "success");
    assert_eq!(json["action"], "full_workflow");
    assert_eq!(json["system_mode"], "degraded");
    assert!(json["case_id"].as_str().unwrap().starts_with("case_"));
    assert_eq!(json["result"]["priority"], "high");
    assert_eq!(json["result"]["urgency"], "immediate");
    assert!(!json["result"]["recommended_service"].is_null());
    assert!(json["result"]["confirmation_details"]["confirmation_number"]
        .as_str()
        .unwrap()
        .starts_with("CNF-"));
    assert!(!json["result"]["reminder_schedule"].as_array().unwrap().is_empty());
    assert_eq!(
        json["agent_trace"],
        serde_json::json!(["triage_agent", "guidance_agent", "booking_agent", "followup_agent"])
    );
}

#[tokio::test]
async fn test_action_defaults_to_full_workflow() {
    let base = start_test_server().await;
    let (status, body) = post_json(
        &base,
        "/api/emergency",
        r#"{"case_data": {"symptoms": "fever", "emergency_type": "medical", "location": "UnknownTown"}}"#,
    )
    .await;
    assert_eq!(status, 200);

    let json = parse(&body);
    assert_eq!(json["action"], "full_workflow");
    assert_eq!(json["result"]["priority"], "medium");
    assert_eq!(json["result"]["recommended_service"]["name"], "General Hospital");
}

#[tokio::test]
async fn test_triage_action_only_runs_triage() {
    let base = start_test_server().await;
    let (status, body) = post_json(
        &base,
        "/api/emergency",
        r#"{"action": "triage", "case_data": {"symptoms": "man with a weapon outside", "emergency_type": "police"}}"#,
    )
    .await;
    assert_eq!(status, 200);

    let json = parse(&body);
    assert_eq!(json["result"]["priority"], "high");
    assert_eq!(json["agent_trace"], serde_json::json!(["triage_agent"]));
    assert!(json["result"].get("appointment_details").is_none());
}

#[tokio::test]
async fn test_unknown_action_runs_full_workflow() {
    let base = start_test_server().await;
    let (status, body) = post_json(
        &base,
        "/api/emergency",
        r#"{"action": "teleport", "case_data": {"symptoms": "fever", "location": "Lahore"}}"#,
    )
    .await;
    assert_eq!(status, 200);

    let json = parse(&body);
    assert_eq!(json["status"], "success");
    assert_eq!(json["action"], "teleport");
    assert_eq!(json["agent_trace"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_wrong_typed_field_uses_default() {
    let base = start_test_server().await;
    let (status, body) = post_json(
        &base,
        "/api/emergency",
        r#"{"case_data": {"symptoms": "fever", "location": 42, "priority": 3}}"#,
    )
    .await;
    assert_eq!(status, 200, "Expected 200, got {}: {}", status, body);

    let json = parse(&body);
    assert_eq!(json["result"]["recommended_service"]["name"], "General Hospital");
    assert_eq!(json["result"]["recommended_service"]["location"], "Unknown");
    assert_eq!(json["result"]["priority"], "medium");
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let base = start_test_server().await;
    let (status, body) = post_json(&base, "/api/emergency", r#"{"action": "#).await;
    assert_eq!(status, 400);
    assert_eq!(parse(&body)["status"], "error");
}

#[tokio::test]
async fn test_empty_directory_returns_sentinel() {
    let state = AppState::with_directory(CoordinatorConfig::default(), ServiceDirectory::empty()).unwrap();
    let base = spawn(state).await;

    let (status, body) = post_json(
        &base,
        "/api/emergency",
        r#"{"action": "guidance", "case_data": {"symptoms": "fever", "location": "Lahore"}}"#,
    )
    .await;
    assert_eq!(status, 200);

    let json = parse(&body);
    assert!(json["result"]["recommended_service"].is_null());
    assert_eq!(json["result"]["match_method"], "no_service_available");
}

// ============================================================================
// Parse endpoint
// ============================================================================

#[tokio::test]
async fn test_parse_endpoint() {
    let base = start_test_server().await;
    let (status, body) = post_json(
        &base,
        "/api/parse",
        r#"{"message": "There is a fire in a building in Karachi, people trapped"}"#,
    )
    .await;
    assert_eq!(status, 200);

    let json = parse(&body);
    assert_eq!(json["parsed"]["emergency_type"], "fire");
    assert_eq!(json["parsed"]["location"], "Karachi");
    assert_eq!(json["priority"], "high");
    assert!(!json["suggested_actions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_parse_empty_message_is_bad_request() {
    let base = start_test_server().await;
    let (status, body) = post_json(&base, "/api/parse", r#"{"message": "   "}"#).await;
    assert_eq!(status, 400);
    assert_eq!(parse(&body)["code"], "INVALID_REQUEST");
}

// ============================================================================
// Self-test endpoint
// ============================================================================

#[tokio::test]
async fn test_agents_endpoint() {
    let base = start_test_server().await;
    let (status, body) = get(&base, "/api/test-agents").await;
    assert_eq!(status, 200);

    let json = parse(&body);
    let agents = json["agents"].as_array().unwrap();
    assert_eq!(agents.len(), 4);
    assert!(agents.iter().all(|a| a["status"] == "working"));
}

// ============================================================================
// Limits
// ============================================================================

#[tokio::test]
async fn test_payload_too_large() {
    let base = start_test_server().await;
    let large = "x".repeat(600_000);
    let (status, _body) = post_json(
        &base,
        "/api/parse",
        &format!(r#"{{"message": "{}"}}"#, large),
    )
    .await;
    assert_eq!(status, 413, "Expected 413 Payload Too Large, got {}", status);
}

#[tokio::test]
async fn test_rate_limit_returns_429() {
    let state = AppState::new(CoordinatorConfig::default())
        .unwrap()
        .with_rate_limit(RateLimitConfig {
            max_requests: 2,
            ..Default::default()
        });
    let base = spawn(state).await;

    assert_eq!(get(&base, "/api/test-agents").await.0, 200);
    assert_eq!(get(&base, "/api/test-agents").await.0, 200);

    let (status, body) = get(&base, "/api/test-agents").await;
    assert_eq!(status, 429);
    assert_eq!(parse(&body)["code"], "RATE_LIMITED");

    // Health is not rate limited.
    assert_eq!(get(&base, "/health").await.0, 200);
}
