//! Action dispatch and request/response types.

use crate::mode::OperatingMode;
use chrono::{DateTime, Utc};
use frontline_agents::intake::lenient_string;
use frontline_agents::{ParsedIntake, RawCase, WorkflowResult};
use frontline_common::{Appointment, Case, FrontlineError, Priority, ServiceRecord, Urgency};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Which part of the pipeline a request runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Triage,
    Guidance,
    Booking,
    Followup,
    #[default]
    FullWorkflow,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Triage,
        Action::Guidance,
        Action::Booking,
        Action::Followup,
        Action::FullWorkflow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Triage => "triage",
            Self::Guidance => "guidance",
            Self::Booking => "booking",
            Self::Followup => "followup",
            Self::FullWorkflow => "full_workflow",
        }
    }
}

impl Action {
    /// Lenient selector: missing or empty means `full_workflow`, and so
    /// does anything unrecognised, with a warning.
    pub fn resolve(requested: Option<&str>) -> Self {
        let requested = requested.unwrap_or_default();
        requested.parse().unwrap_or_else(|e: FrontlineError| {
            warn!(action = %requested.trim(), error = %e, "Unknown action, running full workflow");
            Self::FullWorkflow
        })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = FrontlineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        if wanted.is_empty() {
            return Ok(Self::FullWorkflow);
        }
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == wanted)
            .ok_or_else(|| {
                let expected: Vec<&str> = Self::ALL.iter().map(Action::as_str).collect();
                FrontlineError::InvalidRequest(format!(
                    "Unknown action '{}'. Expected one of: {}",
                    s.trim(),
                    expected.join(", ")
                ))
            })
    }
}

/// Body of `POST /api/emergency`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmergencyRequest {
    /// Defaults to `full_workflow` when absent or unrecognised.
    #[serde(deserialize_with = "lenient_string")]
    pub action: Option<String>,
    pub case_data: CaseData,
}

impl EmergencyRequest {
    pub fn new(action: Action, case_data: CaseData) -> Self {
        Self {
            action: Some(action.as_str().to_string()),
            case_data,
        }
    }
}

/// Case fields plus the hints standalone booking and follow-up accept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseData {
    #[serde(flatten)]
    pub case: RawCase,

    /// Service chosen by an earlier guidance call: a record or just a name.
    pub recommended_service: Option<Value>,

    /// Appointment from an earlier booking call.
    pub appointment_details: Option<Value>,
}

impl CaseData {
    /// Service hint for a standalone booking.
    pub fn service_hint(&self) -> Option<ServiceRecord> {
        match self.recommended_service.as_ref()? {
            Value::String(name) if !name.trim().is_empty() => Some(ServiceRecord {
                name: name.trim().to_string(),
                ..Default::default()
            }),
            Value::Object(map) => serde_json::from_value::<ServiceRecord>(Value::Object(map.clone()))
                .ok()
                .or_else(|| {
                    let name = map.get("name")?.as_str()?.trim();
                    (!name.is_empty()).then(|| ServiceRecord {
                        name: name.to_string(),
                        ..Default::default()
                    })
                }),
            _ => None,
        }
    }

    /// Appointment for a standalone follow-up.
    ///
    /// Uses a complete appointment when given one. Otherwise builds one from
    /// `appointment_time` (RFC 3339), or from `fallback_time` when that is
    /// missing or unparseable.
    pub fn appointment_hint(&self, case: &Case, fallback_time: DateTime<Utc>) -> Appointment {
        let details = self.appointment_details.as_ref();

        if let Some(appointment) = details.and_then(|d| serde_json::from_value::<Appointment>(d.clone()).ok()) {
            return appointment;
        }

        let field = |name: &str| details.and_then(|d| d.get(name)).and_then(Value::as_str).map(str::trim);

        let appointment_time = field("appointment_time")
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or(fallback_time);

        let service_name = field("service_name")
            .filter(|n| !n.is_empty())
            .map(String::from)
            .or_else(|| self.service_hint().map(|s| s.name))
            .unwrap_or_else(|| "Service Provider".into());

        let (slot_type, duration_minutes) = frontline_agents::booking::slot_for(case.priority);
        Appointment {
            appointment_id: field("appointment_id")
                .filter(|id| !id.is_empty())
                .map(String::from)
                .unwrap_or_else(|| "APT-PENDING".into()),
            service_name,
            appointment_time,
            slot_type,
            duration_minutes,
            priority: case.priority,
            location: case.location.clone(),
            instructions: String::new(),
        }
    }
}

/// Body of a successful `POST /api/emergency` response.
#[derive(Debug, Clone, Serialize)]
pub struct EmergencyResponse {
    pub status: String,

    /// Action as the caller named it; unknown names still run the full
    /// workflow.
    pub action: String,
    pub system_mode: OperatingMode,
    pub timestamp: DateTime<Utc>,
    pub case_id: String,
    pub citizen_id: String,
    pub result: WorkflowResult,
    pub agent_trace: Vec<String>,
}

/// Body of `POST /api/parse`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseRequest {
    pub message: String,
}

/// Structured view of a free-text message, with its triage outcome.
#[derive(Debug, Clone, Serialize)]
pub struct ParseResponse {
    pub status: String,
    pub summary: String,
    pub priority: Priority,
    pub urgency: Urgency,
    pub suggested_actions: Vec<String>,
    pub parsed: ParsedIntake,

    /// Normalized case, ready to resubmit as `case_data`.
    pub case: Case,
}
