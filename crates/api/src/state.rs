//! Application state for the API server.

use crate::rate_limit::{RateLimitConfig, RateLimiter};
use frontline_common::ServiceDirectory;
use frontline_coordinator::{Coordinator, CoordinatorConfig};
use std::sync::Arc;

/// Shared application state for the API server.
pub struct AppState {
    /// Pipeline entry point. Immutable after start-up, so no lock.
    pub coordinator: Arc<Coordinator>,

    pub rate_limiter: RateLimiter,

    /// Server start time (for health checks)
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create state with reference data loaded from the configured paths.
    pub fn new(config: CoordinatorConfig) -> frontline_common::Result<Self> {
        Ok(Self::with_coordinator(Coordinator::new(config)?))
    }

    /// Create state over an explicit directory.
    pub fn with_directory(config: CoordinatorConfig, directory: ServiceDirectory) -> frontline_common::Result<Self> {
        Ok(Self::with_coordinator(Coordinator::with_directory(config, directory)?))
    }

    pub fn with_coordinator(coordinator: Coordinator) -> Self {
        Self {
            coordinator: Arc::new(coordinator),
            rate_limiter: RateLimiter::default(),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn with_rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limiter = RateLimiter::new(config);
        self
    }

    /// Get the uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
