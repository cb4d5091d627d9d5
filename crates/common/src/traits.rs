//! Stage traits implemented by the agents.
//!
//! Each stage of the pipeline is a trait with one rule-based implementation
//! today. The workflow is generic over them, so a different implementation
//! can be dropped in without paying for dynamic dispatch.

use crate::case::{Case, Priority};
use crate::report::{Appointment, BookingReport, FollowupReport, GuidanceReport, TriageAssessment};
use crate::service::ServiceRecord;
use chrono::{DateTime, Utc};

/// Identity shared by every stage.
pub trait Stage: Send + Sync {
    /// Identifier recorded in `agent_trace`.
    fn id(&self) -> &str;

    /// Human-readable name.
    fn name(&self) -> &str;
}

/// Assigns priority and urgency to a case. Never fails.
pub trait TriageEvaluator: Stage {
    fn assess(&self, case: &Case) -> TriageAssessment;
}

/// Picks a service for an already-prioritised case.
pub trait ServiceMatcher: Stage {
    fn guide(&self, case: &Case, priority: Priority) -> GuidanceReport;
}

/// Produces an appointment slot and confirmation.
pub trait BookingGenerator: Stage {
    fn book(
        &self,
        case: &Case,
        priority: Priority,
        service: Option<&ServiceRecord>,
        now: DateTime<Utc>,
    ) -> BookingReport;
}

/// Produces reminders relative to an appointment.
pub trait FollowupScheduler: Stage {
    fn schedule(&self, case: &Case, priority: Priority, appointment: &Appointment) -> FollowupReport;
}
