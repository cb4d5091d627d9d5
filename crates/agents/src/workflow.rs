//! Sequential pipeline over the four stages.
//!
//! The workflow owns one implementation of each stage trait and runs them
//! in a fixed order, each consuming the previous stages' typed outputs:
//!
//! ```text
//! Case ─▶ triage ─▶ guidance ─▶ booking ─▶ followup ─▶ WorkflowResult
//! ```
//!
//! Standalone entry points run a single stage against a case whose
//! priority was already set by the normalizer.
//!
//! # Example
//!
//! ```ignore
//! let workflow = EmergencyWorkflow::new(directory);
//! let result = workflow.run(&case);
//! assert_eq!(result.agent_trace.len(), 4);
//! ```

use crate::booking::BookingAgent;
use crate::followup::FollowupAgent;
use crate::guidance::GuidanceAgent;
use crate::triage::TriageAgent;
use chrono::{DateTime, Utc};
use frontline_common::{
    Appointment, BookingGenerator, BookingReport, Case, FollowupReport, FollowupScheduler, GuidanceReport, Priority,
    ServiceDirectory, ServiceMatcher, ServiceRecord, Stage, TriageAssessment, TriageEvaluator, Urgency,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Timing for one executed stage.
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub agent_id: String,
    pub agent_name: String,
    pub duration_ms: u64,
}

/// Everything a pipeline run produced.
///
/// Serializes as the `result` object of an API response: stage outputs are
/// flattened in, absent stages are omitted.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResult {
    #[serde(skip)]
    pub workflow_name: String,

    /// Priority the downstream stages used.
    pub priority: Priority,
    pub urgency: Urgency,

    #[serde(rename = "triage_assessment", skip_serializing_if = "Option::is_none")]
    pub triage: Option<TriageAssessment>,

    #[serde(flatten)]
    pub guidance: Option<GuidanceReport>,

    #[serde(flatten)]
    pub booking: Option<BookingReport>,

    #[serde(flatten)]
    pub followup: Option<FollowupReport>,

    /// Stage ids in execution order.
    pub agent_trace: Vec<String>,

    #[serde(rename = "processing_steps")]
    pub steps: Vec<StepResult>,

    pub workflow_complete: bool,
    pub duration_ms: u64,
}

impl WorkflowResult {
    fn new(workflow_name: &str, priority: Priority) -> Self {
        Self {
            workflow_name: workflow_name.to_string(),
            priority,
            urgency: priority.urgency(),
            triage: None,
            guidance: None,
            booking: None,
            followup: None,
            agent_trace: Vec::new(),
            steps: Vec::new(),
            workflow_complete: false,
            duration_ms: 0,
        }
    }

    fn record<R>(&mut self, stage: &dyn Stage, run: impl FnOnce() -> R) -> R {
        let started = Instant::now();
        debug!(workflow = %self.workflow_name, agent = %stage.id(), "Executing workflow step");

        let output = run();

        self.agent_trace.push(stage.id().to_string());
        self.steps.push(StepResult {
            agent_id: stage.id().to_string(),
            agent_name: stage.name().to_string(),
            duration_ms: started.elapsed().as_millis() as u64,
        });
        output
    }

    /// Recommended service, if guidance ran and found one.
    pub fn recommended_service(&self) -> Option<&ServiceRecord> {
        self.guidance.as_ref().and_then(|g| g.recommended_service.as_ref())
    }

    pub fn appointment(&self) -> Option<&Appointment> {
        self.booking.as_ref().map(|b| &b.appointment_details)
    }
}

/// Fixed-order pipeline, generic over the stage implementations.
pub struct EmergencyWorkflow<T = TriageAgent, G = GuidanceAgent, B = BookingAgent, F = FollowupAgent> {
    name: String,
    triage: T,
    guidance: G,
    booking: B,
    followup: F,
}

impl EmergencyWorkflow {
    /// Rule-based stages over the given directory with default settings.
    pub fn new(directory: Arc<ServiceDirectory>) -> Self {
        Self::with_stages(
            TriageAgent::new(),
            GuidanceAgent::new(directory),
            BookingAgent::new(),
            FollowupAgent::new(),
        )
    }
}

impl<T, G, B, F> EmergencyWorkflow<T, G, B, F>
where
    T: TriageEvaluator,
    G: ServiceMatcher,
    B: BookingGenerator,
    F: FollowupScheduler,
{
    pub fn with_stages(triage: T, guidance: G, booking: B, followup: F) -> Self {
        Self {
            name: "emergency-pipeline".into(),
            triage,
            guidance,
            booking,
            followup,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn triage(&self) -> &T {
        &self.triage
    }

    pub fn guidance(&self) -> &G {
        &self.guidance
    }

    pub fn booking(&self) -> &B {
        &self.booking
    }

    pub fn followup(&self) -> &F {
        &self.followup
    }

    /// Ids of all stages in execution order.
    pub fn stage_ids(&self) -> Vec<&str> {
        vec![self.triage.id(), self.guidance.id(), self.booking.id(), self.followup.id()]
    }

    /// Run every stage, booking relative to the current time.
    pub fn run(&self, case: &Case) -> WorkflowResult {
        self.run_at(case, Utc::now())
    }

    /// Run every stage, booking relative to `now`.
    pub fn run_at(&self, case: &Case, now: DateTime<Utc>) -> WorkflowResult {
        let started = Instant::now();
        info!(
            workflow = %self.name,
            case_id = %case.case_id,
            emergency_type = %case.emergency_type,
            "Starting full workflow"
        );

        let mut result = WorkflowResult::new(&self.name, case.priority);

        let assessment = result.record(&self.triage, || self.triage.assess(case));
        let priority = assessment.priority;
        result.priority = priority;
        result.urgency = assessment.urgency;
        result.triage = Some(assessment);

        let guidance = result.record(&self.guidance, || self.guidance.guide(case, priority));
        let booking = result.record(&self.booking, || {
            self.booking.book(case, priority, guidance.recommended_service.as_ref(), now)
        });
        let followup = result.record(&self.followup, || {
            self.followup.schedule(case, priority, &booking.appointment_details)
        });

        result.guidance = Some(guidance);
        result.booking = Some(booking);
        result.followup = Some(followup);
        result.workflow_complete = true;
        result.duration_ms = started.elapsed().as_millis() as u64;

        info!(
            workflow = %self.name,
            case_id = %case.case_id,
            priority = %priority,
            steps = result.steps.len(),
            duration_ms = result.duration_ms,
            "Workflow completed"
        );
        result
    }

    pub fn run_triage(&self, case: &Case) -> WorkflowResult {
        let mut result = WorkflowResult::new(&self.name, case.priority);
        let assessment = result.record(&self.triage, || self.triage.assess(case));
        result.priority = assessment.priority;
        result.urgency = assessment.urgency;
        result.triage = Some(assessment);
        result
    }

    /// Guidance for a case whose priority is already set.
    pub fn run_guidance(&self, case: &Case) -> WorkflowResult {
        let mut result = WorkflowResult::new(&self.name, case.priority);
        let guidance = result.record(&self.guidance, || self.guidance.guide(case, case.priority));
        result.guidance = Some(guidance);
        result
    }

    pub fn run_booking(&self, case: &Case, service: Option<&ServiceRecord>, now: DateTime<Utc>) -> WorkflowResult {
        let mut result = WorkflowResult::new(&self.name, case.priority);
        let booking = result.record(&self.booking, || self.booking.book(case, case.priority, service, now));
        result.booking = Some(booking);
        result
    }

    pub fn run_followup(&self, case: &Case, appointment: &Appointment) -> WorkflowResult {
        let mut result = WorkflowResult::new(&self.name, case.priority);
        let followup = result.record(&self.followup, || self.followup.schedule(case, case.priority, appointment));
        result.followup = Some(followup);
        result
    }
}
