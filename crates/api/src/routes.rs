//! HTTP route handlers for the API.

use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use frontline_common::FrontlineError;
use frontline_coordinator::{
    EmergencyRequest, EmergencyResponse, OperatingMode, ParseRequest, ParseResponse, SelfTestReport,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub system_mode: OperatingMode,
    pub ai_configured: bool,
    pub datasets_loaded: usize,
    pub services_loaded: usize,
    pub uptime_seconds: u64,
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let coordinator = &state.coordinator;
    let status = coordinator.status();

    Json(HealthResponse {
        status: "healthy",
        service: "frontline",
        version: env!("CARGO_PKG_VERSION"),
        system_mode: status.mode,
        ai_configured: status.ai_configured,
        datasets_loaded: coordinator.directory().datasets_loaded(),
        services_loaded: coordinator.directory().services().len(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// API error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(skip)]
    pub http_status: StatusCode,
    pub status: &'static str,
    pub message: String,
    pub code: &'static str,
}

impl ErrorResponse {
    pub fn new(http_status: StatusCode, message: impl Into<String>, code: &'static str) -> Self {
        Self {
            http_status,
            status: "error",
            message: message.into(),
            code,
        }
    }
}

impl From<FrontlineError> for ErrorResponse {
    fn from(err: FrontlineError) -> Self {
        let http_status = match err {
            FrontlineError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(http_status, err.to_string(), err.code())
    }
}

impl From<JsonRejection> for ErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text(), "INVALID_JSON")
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.http_status, Json(self)).into_response()
    }
}

/// Run one action over the submitted case. A missing or unknown action
/// runs the full workflow.
pub async fn emergency(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EmergencyRequest>, JsonRejection>,
) -> Result<Json<EmergencyResponse>, ErrorResponse> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Rejected emergency request body");
        ErrorResponse::from(rejection)
    })?;

    info!(
        action = request.action.as_deref().unwrap_or("full_workflow"),
        "Received emergency request"
    );

    Ok(Json(state.coordinator.handle(request)))
}

/// Turn a free-text message into structured case fields.
pub async fn parse(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ParseRequest>, JsonRejection>,
) -> Result<Json<ParseResponse>, ErrorResponse> {
    let Json(request) = payload?;

    info!(
        message_preview = %request.message.chars().take(50).collect::<String>(),
        "Received parse request"
    );

    state
        .coordinator
        .parse(&request.message)
        .map(Json)
        .map_err(ErrorResponse::from)
}

/// Run the built-in sample case through every stage.
pub async fn test_agents(State(state): State<Arc<AppState>>) -> Json<SelfTestReport> {
    let report = state.coordinator.self_test();
    info!(status = %report.status, "Agent self-test completed");
    Json(report)
}
