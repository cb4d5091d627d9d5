//! Common types and traits shared across the Frontline crates.
//!
//! This crate holds the case model, the read-only service directory, the
//! typed outputs of each stage and the stage traits themselves, so the
//! agents and the coordinator can depend on them without depending on
//! each other.

pub mod case;
pub mod error;
pub mod report;
pub mod service;
pub mod traits;

pub use case::{Case, Citizen, EmergencyType, Priority, Urgency};
pub use error::{FrontlineError, Result};
pub use report::{
    Appointment, BookingReport, Confidence, Confirmation, ContactChannel, ContactMethod, FollowupPlan,
    FollowupReport, FormData, FormField, GuidanceReport, MatchMethod, Reminder, ReminderChannel, RiskLevel,
    SlotType, TrackingInfo, TriageAssessment,
};
pub use service::{title_case, LocationRecord, ServiceDirectory, ServiceRecord};
pub use traits::{BookingGenerator, FollowupScheduler, ServiceMatcher, Stage, TriageEvaluator};
