//! Typed outputs produced by each pipeline stage.

use crate::case::{EmergencyType, Priority, Urgency};
use crate::service::ServiceRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How confident the rule table is in its own answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Medium,
    High,
}

/// Patient risk derived from age and existing conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Output of the triage agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageAssessment {
    pub priority: Priority,
    pub urgency: Urgency,

    /// The keyword of the rule that fired, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_keyword: Option<String>,

    pub assessment_method: String,
    pub confidence: Confidence,
    pub risk_factors: RiskLevel,
}

/// How the recommended service was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    LocationMatch,
    DefaultFallback,
    NoServiceAvailable,
}

/// Output of the guidance agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuidanceReport {
    pub service_type: EmergencyType,

    /// `None` only when the directory is empty.
    pub recommended_service: Option<ServiceRecord>,

    #[serde(default)]
    pub alternative_services: Vec<ServiceRecord>,

    pub match_method: MatchMethod,
    pub instructions: String,
    pub contact_information: String,
    pub estimated_response_time: String,
    pub selection_criteria: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotType {
    Emergency,
    Urgent,
    Standard,
}

impl SlotType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emergency => "Emergency",
            Self::Urgent => "Urgent",
            Self::Standard => "Standard",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub appointment_id: String,
    pub service_name: String,
    pub appointment_time: DateTime<Utc>,
    pub slot_type: SlotType,
    pub duration_minutes: u32,
    pub priority: Priority,
    pub location: String,
    pub instructions: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Confirmation {
    pub confirmation_number: String,
    pub confirmation_time: DateTime<Utc>,
    pub customer_name: String,
    pub next_steps: Vec<String>,
    pub contact_information: String,
    pub important_notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub field: String,
    pub value: String,
    pub required: bool,
}

/// Pre-filled intake form handed to the service provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormData {
    pub service_type: EmergencyType,
    pub service_provider: String,
    pub status: String,
    pub required_documents: Vec<String>,
    pub form_fields: Vec<FormField>,
}

/// Output of the booking agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingReport {
    pub appointment_details: Appointment,
    pub confirmation_details: Confirmation,
    pub form_data: FormData,
    pub booking_status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderChannel {
    Sms,
    Email,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub kind: String,

    /// Minutes relative to the appointment; always negative.
    pub offset_minutes: i64,

    pub scheduled_time: DateTime<Utc>,
    pub channel: ReminderChannel,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowupPlan {
    pub service_type: EmergencyType,
    pub priority_level: Priority,
    pub followup_steps: Vec<String>,
    pub expected_duration: String,
    pub success_metrics: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingInfo {
    pub tracking_id: String,
    pub status: String,
    pub current_stage: String,
    pub next_milestone: String,
    pub estimated_completion: String,
    pub update_frequency: String,
    pub support_contact: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactChannel {
    Sms,
    Email,
    Whatsapp,
    InAppNotifications,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMethod {
    pub method: ContactChannel,
    pub priority: Priority,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Output of the follow-up agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowupReport {
    pub reminder_schedule: Vec<Reminder>,
    pub followup_plan: FollowupPlan,
    pub tracking_system: TrackingInfo,
    pub contact_methods: Vec<ContactMethod>,
}
