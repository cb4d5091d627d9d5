//! Rule-based pipeline stages.
//!
//! This crate provides one implementation of each stage trait from
//! `frontline-common`, plus the intake layer that builds a [`Case`] and the
//! workflow that chains the stages:
//!
//! - **Intake**: request normalization and free-text parsing
//! - **Triage Agent**: keyword rule tables to priority and urgency
//! - **Guidance Agent**: service lookup in the reference directory
//! - **Booking Agent**: appointment slot and confirmation code
//! - **Follow-up Agent**: reminders, post-visit plan and tracking
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     EMERGENCY WORKFLOW                       │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  RawCase ─▶ Normalizer ─▶ Case                               │
//! │                            │                                 │
//! │                            ▼                                 │
//! │  ┌─────────┐  ┌──────────┐  ┌─────────┐  ┌──────────┐        │
//! │  │ Triage  │─▶│ Guidance │─▶│ Booking │─▶│ Followup │        │
//! │  └─────────┘  └────┬─────┘  └─────────┘  └──────────┘        │
//! │                    │                                         │
//! │                    ▼                                         │
//! │  ┌──────────────────────────────────────────────────────┐    │
//! │  │        ServiceDirectory (read-only, Arc-shared)       │    │
//! │  └──────────────────────────────────────────────────────┘    │
//! │                                                              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`Case`]: frontline_common::Case

pub mod booking;
pub mod followup;
pub mod guidance;
pub mod intake;
pub mod triage;
pub mod workflow;

pub use booking::{BookingAgent, BookingConfig};
pub use followup::FollowupAgent;
pub use guidance::{GuidanceAgent, GuidanceConfig, ServiceMatch};
pub use intake::{IntakeDefaults, IntakeParser, Normalizer, ParsedIntake, RawCase};
pub use triage::{RuleTable, TriageAgent, TriageRule};
pub use workflow::{EmergencyWorkflow, StepResult, WorkflowResult};
