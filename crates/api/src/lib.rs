//! HTTP gateway for the Frontline triage pipeline.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check with operating mode and dataset counts
//! - `POST /api/emergency` - Run one action (`triage`, `guidance`, `booking`,
//!   `followup`, `full_workflow`) over a case
//! - `POST /api/parse` - Parse a free-text message into case fields
//! - `GET /api/test-agents` - Run the sample case through every stage
//!
//! Every route except `/health` is rate limited per client address, and
//! request bodies are capped by [`RateLimitConfig::max_body_size`].

pub mod rate_limit;
pub mod routes;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use state::AppState;

/// Build the CORS layer. `None` or a `*` entry allows any origin.
fn cors_layer(origins: Option<Vec<String>>) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    match origins {
        Some(list) if !list.iter().any(|o| o == "*") => {
            let parsed: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match origin.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!(origin = %origin, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            base.allow_origin(parsed)
        }
        _ => base.allow_origin(Any),
    }
}

/// Create the API router with all routes configured.
pub fn create_router(state: Arc<AppState>, cors_origins: Option<Vec<String>>) -> Router {
    let body_limit = state.rate_limiter.config().max_body_size;

    let api = Router::new()
        .route("/api/emergency", post(routes::emergency))
        .route("/api/parse", post(routes::parse))
        .route("/api/test-agents", get(routes::test_agents))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit_middleware,
        ));

    Router::new()
        .route("/health", get(routes::health))
        .merge(api)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// Start the API server on the given address.
///
/// Served with `ConnectInfo` so the rate limiter can key on client address.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr, cors_origins: Option<Vec<String>>) -> anyhow::Result<()> {
    let router = create_router(state, cors_origins);

    info!(%addr, "Starting Frontline API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
