//! Per-IP request rate limiting.

use crate::routes::ErrorResponse;
use crate::AppState;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// Configuration for rate limiting.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 120,
            window: Duration::from_secs(60),
            max_body_size: 256 * 1024,
        }
    }
}

/// Sliding window of request timestamps for one address.
#[derive(Debug, Default)]
struct Window {
    requests: Vec<Instant>,
}

impl Window {
    fn prune(&mut self, now: Instant, window: Duration) {
        self.requests.retain(|t| now.duration_since(*t) < window);
    }
}

/// Thread-safe rate limiter using a sliding window per client address.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    entries: RwLock<HashMap<IpAddr, Window>>,
    last_cleanup: RwLock<Instant>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
            last_cleanup: RwLock::new(Instant::now()),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Record a request from `ip`. Returns `false` when the window is full.
    pub fn check_request(&self, ip: IpAddr) -> bool {
        self.maybe_cleanup();

        let now = Instant::now();
        let mut entries = self.entries.write();
        let entry = entries.entry(ip).or_default();
        entry.prune(now, self.config.window);

        if entry.requests.len() >= self.config.max_requests as usize {
            return false;
        }

        entry.requests.push(now);
        true
    }

    /// Drop idle addresses every five minutes.
    fn maybe_cleanup(&self) {
        const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

        if self.last_cleanup.read().elapsed() <= CLEANUP_INTERVAL {
            return;
        }

        let mut entries = self.entries.write();
        let mut last = self.last_cleanup.write();
        if last.elapsed() > CLEANUP_INTERVAL {
            let now = Instant::now();
            entries.retain(|_, entry| {
                entry.prune(now, self.config.window);
                !entry.requests.is_empty()
            });
            *last = now;
        }
    }

    pub fn stats(&self) -> RateLimitStats {
        let entries = self.entries.read();
        RateLimitStats {
            tracked_ips: entries.len(),
            requests_in_window: entries.values().map(|w| w.requests.len()).sum(),
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RateLimitStats {
    pub tracked_ips: usize,
    pub requests_in_window: usize,
}

/// Middleware rejecting requests over the per-IP limit with 429.
pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    if !state.rate_limiter.check_request(addr.ip()) {
        warn!(ip = %addr.ip(), path = %request.uri().path(), "Rate limit exceeded");
        return ErrorResponse::new(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests, slow down",
            "RATE_LIMITED",
        )
        .into_response();
    }

    next.run(request).await
}
