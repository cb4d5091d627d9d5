//! Core coordinator: owns the directory and workflow, dispatches actions.

use crate::config::CoordinatorConfig;
use crate::data_loader::load_directory;
use crate::mode::{ModeSelector, SystemStatus};
use crate::routing::{Action, CaseData, EmergencyRequest, EmergencyResponse, ParseResponse};
use chrono::{Duration, Utc};
use frontline_agents::intake::{summarize, suggested_actions};
use frontline_agents::{
    BookingAgent, EmergencyWorkflow, FollowupAgent, GuidanceAgent, IntakeParser, Normalizer, RawCase, TriageAgent,
    WorkflowResult,
};
use frontline_common::{Citizen, FrontlineError, Priority, Result, ServiceDirectory, Stage, TriageEvaluator};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of exercising one stage in the self-test.
#[derive(Debug, Clone, Serialize)]
pub struct AgentCheck {
    pub agent_id: String,
    pub agent_name: String,
    pub status: String,
    pub detail: String,
}

/// Report returned by `GET /api/test-agents`.
#[derive(Debug, Clone, Serialize)]
pub struct SelfTestReport {
    pub status: String,
    pub system_mode: SystemStatus,
    pub agents: Vec<AgentCheck>,
    pub sample_result: WorkflowResult,
}

/// The main coordinator that runs requests through the pipeline.
///
/// Built once at start-up and shared behind an `Arc`. Every method takes
/// `&self`; concurrent requests share only the read-only directory.
pub struct Coordinator {
    config: CoordinatorConfig,
    directory: Arc<ServiceDirectory>,
    normalizer: Normalizer,
    workflow: EmergencyWorkflow,
    status: SystemStatus,
}

impl Coordinator {
    /// Create a coordinator, loading reference data from the configured
    /// paths or the bundled copies.
    pub fn new(config: CoordinatorConfig) -> Result<Self> {
        let directory = load_directory(&config.data);
        Self::with_directory(config, directory)
    }

    /// Create a coordinator over an already-built directory.
    pub fn with_directory(config: CoordinatorConfig, directory: ServiceDirectory) -> Result<Self> {
        info!("Initializing Frontline coordinator");
        config.validate().map_err(|e| FrontlineError::Config(e.to_string()))?;

        let directory = Arc::new(directory);
        let status = ModeSelector::select(config.mode.setting, config.mode.api_key_configured());

        let parser = IntakeParser::new().with_cities(directory.locations().iter().map(|l| l.city.clone()));
        let normalizer = Normalizer::new(config.intake.clone(), parser);

        let workflow = EmergencyWorkflow::with_stages(
            TriageAgent::new(),
            GuidanceAgent::new(Arc::clone(&directory)).with_config(config.guidance.clone()),
            BookingAgent::new().with_config(config.booking.clone()),
            FollowupAgent::new(),
        );

        info!(
            services = directory.services().len(),
            locations = directory.locations().len(),
            mode = %status.mode,
            "Coordinator ready"
        );

        Ok(Self {
            config,
            directory,
            normalizer,
            workflow,
            status,
        })
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn directory(&self) -> &ServiceDirectory {
        &self.directory
    }

    pub fn status(&self) -> &SystemStatus {
        &self.status
    }

    pub fn workflow(&self) -> &EmergencyWorkflow {
        &self.workflow
    }

    /// Handle a raw request. Never fails: an unknown action runs the full
    /// workflow and is echoed back as given.
    pub fn handle(&self, request: EmergencyRequest) -> EmergencyResponse {
        let action = Action::resolve(request.action.as_deref());
        let mut response = self.dispatch(action, request.case_data);
        if let Some(requested) = request.action.map(|a| a.trim().to_string()).filter(|a| !a.is_empty()) {
            response.action = requested;
        }
        response
    }

    /// Run one action. Never fails.
    pub fn dispatch(&self, action: Action, data: CaseData) -> EmergencyResponse {
        let now = Utc::now();
        let case = self.normalizer.normalize(data.case.clone());

        info!(
            action = %action,
            case_id = %case.case_id,
            emergency_type = %case.emergency_type,
            "Dispatching emergency request"
        );

        let result = match action {
            Action::Triage => self.workflow.run_triage(&case),
            Action::Guidance => self.workflow.run_guidance(&case),
            Action::Booking => {
                let service = data.service_hint();
                self.workflow.run_booking(&case, service.as_ref(), now)
            }
            Action::Followup => {
                let appointment = data.appointment_hint(&case, now + Duration::hours(1));
                self.workflow.run_followup(&case, &appointment)
            }
            Action::FullWorkflow => self.workflow.run_at(&case, now),
        };

        debug!(
            case_id = %case.case_id,
            priority = %result.priority,
            trace = ?result.agent_trace,
            "Action completed"
        );

        EmergencyResponse {
            status: "success".into(),
            action: action.as_str().to_string(),
            system_mode: self.status.mode,
            timestamp: now,
            case_id: case.case_id,
            citizen_id: case.citizen_id,
            agent_trace: result.agent_trace.clone(),
            result,
        }
    }

    /// Parse a free-text message into a case and triage it.
    pub fn parse(&self, message: &str) -> Result<ParseResponse> {
        if message.trim().is_empty() {
            return Err(FrontlineError::InvalidRequest("message must not be empty".into()));
        }

        let parsed = self.normalizer.parser().parse(message);
        let case = self.normalizer.normalize_with(
            RawCase {
                message: Some(message.to_string()),
                ..Default::default()
            },
            Some(&parsed),
        );
        let assessment = self.workflow.triage().assess(&case);

        info!(
            case_id = %case.case_id,
            emergency_type = %parsed.emergency_type,
            priority = %assessment.priority,
            confidence = parsed.confidence,
            "Message parsed"
        );

        Ok(ParseResponse {
            status: "success".into(),
            summary: summarize(&parsed, assessment.priority),
            priority: assessment.priority,
            urgency: assessment.urgency,
            suggested_actions: suggested_actions(parsed.emergency_type, assessment.priority),
            parsed,
            case: case.with_priority(assessment.priority),
        })
    }

    /// Run a fixed sample case through every stage and report on each.
    pub fn self_test(&self) -> SelfTestReport {
        let citizen = Citizen {
            name: "Test Patient".into(),
            age: Some(45),
            phone: "+923001234567".into(),
            ..Default::default()
        };
        let sample = self.normalizer.normalize(RawCase {
            symptoms: Some("chest pain and difficulty breathing".into()),
            emergency_type: Some("medical".into()),
            location: Some("Lahore".into()),
            ..Default::default()
        });
        let sample = sample.with_citizen(citizen);

        let result = self.workflow.run(&sample);

        let check = |stage: &dyn Stage, ok: bool, detail: String| AgentCheck {
            agent_id: stage.id().to_string(),
            agent_name: stage.name().to_string(),
            status: if ok { "working" } else { "degraded" }.to_string(),
            detail,
        };

        let guidance_detail = result
            .recommended_service()
            .map(|s| format!("recommended {}", s.name))
            .unwrap_or_else(|| "no service available".into());
        let booking_detail = result
            .booking
            .as_ref()
            .map(|b| b.confirmation_details.confirmation_number.clone())
            .unwrap_or_default();
        let reminders = result.followup.as_ref().map(|f| f.reminder_schedule.len()).unwrap_or(0);

        let agents = vec![
            check(
                self.workflow.triage(),
                result.priority == Priority::High,
                format!("priority {}", result.priority),
            ),
            check(
                self.workflow.guidance(),
                result.recommended_service().is_some(),
                guidance_detail,
            ),
            check(
                self.workflow.booking(),
                booking_detail.starts_with("CNF-"),
                format!("confirmation {booking_detail}"),
            ),
            check(self.workflow.followup(), reminders > 0, format!("{reminders} reminders scheduled")),
        ];

        let status = if agents.iter().all(|a| a.status == "working") {
            "success"
        } else {
            "degraded"
        };

        SelfTestReport {
            status: status.into(),
            system_mode: self.status.clone(),
            agents,
            sample_result: result,
        }
    }
}
