//! Enhanced vs degraded mode selection.
//!
//! Both modes execute the same rule tables; there is no AI-backed stage
//! implementation. The selector exists so the configured intent and the
//! mode actually in effect are both visible in responses and health checks.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// Requested mode from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeSetting {
    #[default]
    Auto,
    Enhanced,
    Degraded,
}

/// Mode the pipeline is actually running in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingMode {
    Enhanced,
    Degraded,
}

impl OperatingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enhanced => "enhanced",
            Self::Degraded => "degraded",
        }
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot reported by `/health` and `/api/test-agents`.
#[derive(Debug, Clone, Serialize)]
pub struct SystemStatus {
    pub requested: ModeSetting,
    pub mode: OperatingMode,
    pub ai_configured: bool,
    pub reason: String,
}

/// Decides which mode the pipeline runs in.
pub struct ModeSelector;

impl ModeSelector {
    /// Resolve the requested setting. Never fails; anything that cannot be
    /// honoured resolves to degraded.
    pub fn select(requested: ModeSetting, ai_configured: bool) -> SystemStatus {
        let reason = match requested {
            ModeSetting::Degraded => "degraded mode requested",
            ModeSetting::Enhanced => {
                warn!(
                    ai_configured,
                    "Enhanced mode requested but no enhanced stages are available, using rule tables"
                );
                "enhanced stages unavailable, running rule tables"
            }
            ModeSetting::Auto if ai_configured => {
                info!("AI key present but no enhanced stages are available, using rule tables");
                "enhanced stages unavailable, running rule tables"
            }
            ModeSetting::Auto => "no AI provider configured",
        };

        info!(requested = ?requested, mode = %OperatingMode::Degraded, reason, "Operating mode selected");

        SystemStatus {
            requested,
            mode: OperatingMode::Degraded,
            ai_configured,
            reason: reason.to_string(),
        }
    }
}
