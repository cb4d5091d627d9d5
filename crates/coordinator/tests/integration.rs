//! Integration tests for the coordinator's dispatch, parse and self-test paths.
//!
//! These run against the bundled reference datasets.

use chrono::{DateTime, Duration, Utc};
use frontline_common::{MatchMethod, Priority, ServiceDirectory};
use frontline_coordinator::{Action, CaseData, Coordinator, CoordinatorConfig, EmergencyRequest};
use serde_json::{json, Value};
use std::io::Write;

fn create_test_coordinator() -> Coordinator {
    Coordinator::new(CoordinatorConfig::default()).unwrap()
}

fn case_data(value: Value) -> CaseData {
    serde_json::from_value(value).unwrap()
}

fn request(value: Value) -> EmergencyRequest {
    serde_json::from_value(value).unwrap()
}

// ============================================================================
// Full workflow
// ============================================================================

#[test]
fn test_full_workflow_lahore_chest_pain() {
    let coordinator = create_test_coordinator();
    let before = Utc::now();

    let response = coordinator
        .handle(request(json!({
            "action": "full_workflow",
            "case_data": {
                "symptoms": "severe chest pain",
                "emergency_type": "medical",
                "location": "Lahore",
                "citizen_data": { "name": "Test Patient", "age": 45, "phone": "+923001234567" }
            }
        })));

    assert_eq!(
        response.agent_trace,
        vec!["triage_agent", "guidance_agent", "booking_agent", "followup_agent"]
    );

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["action"], "full_workflow");
    assert_eq!(json["system_mode"], "degraded");

    let result = &json["result"];
    assert_eq!(result["priority"], "high");
    assert_eq!(result["urgency"], "immediate");
    assert_eq!(result["recommended_service"]["id"], "H001");
    assert_eq!(result["workflow_complete"], true);

    let appointment_time: DateTime<Utc> = result["appointment_details"]["appointment_time"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(appointment_time > before);
    assert!(appointment_time <= Utc::now() + Duration::minutes(30));

    let reminders = result["reminder_schedule"].as_array().unwrap();
    assert_eq!(reminders.len(), 2);
    assert_eq!(result["confirmation_details"]["customer_name"], "Test Patient");
}

#[test]
fn test_full_workflow_unknown_town() {
    let coordinator = create_test_coordinator();
    let response = coordinator.dispatch(
        Action::FullWorkflow,
        case_data(json!({ "symptoms": "fever", "emergency_type": "medical", "location": "UnknownTown" })),
    );

    assert_eq!(response.result.priority, Priority::Medium);
    let guidance = response.result.guidance.as_ref().unwrap();
    assert_eq!(guidance.match_method, MatchMethod::DefaultFallback);
    assert_eq!(guidance.recommended_service.as_ref().unwrap().name, "General Hospital");
}

#[test]
fn test_full_workflow_from_chat_message() {
    let coordinator = create_test_coordinator();
    let response = coordinator.dispatch(
        Action::FullWorkflow,
        case_data(json!({ "message": "There is a fire in our building in Karachi, people are trapped" })),
    );

    assert_eq!(response.result.priority, Priority::High);
    let service = response.result.recommended_service().unwrap();
    assert_eq!(service.id, "F002");
}

#[test]
fn test_empty_directory_returns_sentinel() {
    let coordinator =
        Coordinator::with_directory(CoordinatorConfig::default(), ServiceDirectory::empty()).unwrap();
    let response = coordinator.dispatch(
        Action::FullWorkflow,
        case_data(json!({ "symptoms": "chest pain", "location": "Lahore" })),
    );

    let json = serde_json::to_value(&response).unwrap();
    assert!(json["result"]["recommended_service"].is_null());
    assert_eq!(json["result"]["match_method"], "no_service_available");
    assert!(json["result"]["appointment_details"].is_object());
}

// ============================================================================
// Standalone actions
// ============================================================================

#[test]
fn test_standalone_triage() {
    let coordinator = create_test_coordinator();
    let response = coordinator.dispatch(
        Action::Triage,
        case_data(json!({ "symptoms": "man with a weapon outside", "emergency_type": "police" })),
    );

    assert_eq!(response.agent_trace, vec!["triage_agent"]);
    assert_eq!(response.result.priority, Priority::High);
    assert!(response.result.booking.is_none());
}

#[test]
fn test_standalone_guidance_defaults_to_medium() {
    let coordinator = create_test_coordinator();
    let response = coordinator.dispatch(Action::Guidance, case_data(json!({ "location": "Islamabad" })));

    assert_eq!(response.agent_trace, vec!["guidance_agent"]);
    assert_eq!(response.result.priority, Priority::Medium);
    assert_eq!(response.result.recommended_service().unwrap().location, "Islamabad");
}

#[test]
fn test_standalone_booking_with_service_name() {
    let coordinator = create_test_coordinator();
    let now = Utc::now();
    let response = coordinator.dispatch(
        Action::Booking,
        case_data(json!({ "priority": "low", "recommended_service": "Mayo Hospital", "location": "Lahore" })),
    );

    let appointment = response.result.appointment().unwrap();
    assert_eq!(appointment.service_name, "Mayo Hospital");
    assert!(appointment.appointment_time >= now + Duration::days(1));
    assert_eq!(response.agent_trace, vec!["booking_agent"]);
}

#[test]
fn test_booking_output_feeds_followup() {
    let coordinator = create_test_coordinator();
    let booked = coordinator.dispatch(Action::Booking, case_data(json!({ "priority": "high" })));
    let appointment = serde_json::to_value(booked.result.appointment().unwrap()).unwrap();

    let followed = coordinator.dispatch(
        Action::Followup,
        case_data(json!({ "priority": "high", "appointment_details": appointment })),
    );
    let followup = followed.result.followup.as_ref().unwrap();
    let appointment_time = booked.result.appointment().unwrap().appointment_time;

    assert_eq!(followup.reminder_schedule.len(), 2);
    assert!(followup.reminder_schedule.iter().all(|r| r.scheduled_time < appointment_time));
    assert_eq!(followed.agent_trace, vec!["followup_agent"]);
}

#[test]
fn test_standalone_followup_without_appointment() {
    let coordinator = create_test_coordinator();
    let response = coordinator.dispatch(Action::Followup, case_data(json!({})));

    let followup = response.result.followup.as_ref().unwrap();
    assert_eq!(followup.reminder_schedule[0].offset_minutes, -60);
    assert!(followup.reminder_schedule[0].scheduled_time > Utc::now() - Duration::minutes(1));
}

#[test]
fn test_unknown_action_falls_back_to_full_workflow() {
    let coordinator = create_test_coordinator();
    let response = coordinator.handle(request(json!({
        "action": "evacuate_city",
        "case_data": { "symptoms": "fever", "location": "Lahore" }
    })));

    assert_eq!(response.action, "evacuate_city");
    assert_eq!(
        response.agent_trace,
        vec!["triage_agent", "guidance_agent", "booking_agent", "followup_agent"]
    );
}

#[test]
fn test_wrong_typed_location_uses_default() {
    let coordinator = create_test_coordinator();
    let response = coordinator.handle(request(json!({
        "case_data": { "symptoms": "fever", "location": 42 }
    })));

    let service = response.result.recommended_service().unwrap();
    assert_eq!(service.name, "General Hospital");
    assert_eq!(service.location, "Unknown");
}

// ============================================================================
// Parse and self-test
// ============================================================================

#[test]
fn test_parse_message() {
    let coordinator = create_test_coordinator();
    let parsed = coordinator
        .parse("My name is Omar Farooq, 70 years old, severe chest pain in Rawalpindi")
        .unwrap();

    assert_eq!(parsed.priority, Priority::High);
    assert_eq!(parsed.case.location, "Rawalpindi");
    assert_eq!(parsed.case.citizen.name, "Omar Farooq");
    assert_eq!(parsed.case.priority, Priority::High);
    assert!(parsed.summary.starts_with("high priority medical emergency"));
    assert_eq!(parsed.suggested_actions[0], "Immediately contact emergency services");
}

#[test]
fn test_self_test_report() {
    let report = create_test_coordinator().self_test();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["agents"].as_array().unwrap().len(), 4);
    assert_eq!(json["system_mode"]["mode"], "degraded");
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_file_overrides_data_and_offsets() {
    let mut services = tempfile::NamedTempFile::new().unwrap();
    services
        .write_all(
            br#"[{"id": "Q1", "name": "Quetta Trauma Centre", "location": "Quetta",
                  "specialties": ["Emergency", "Trauma"], "beds_available": 8}]"#,
        )
        .unwrap();

    let mut config_file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        config_file,
        "[data]\nservices_path = {:?}\n\n[booking]\nhigh_offset_minutes = 10\n",
        services.path().display().to_string()
    )
    .unwrap();

    let config = CoordinatorConfig::from_file_unchecked(config_file.path()).unwrap();
    let coordinator = Coordinator::new(config).unwrap();
    assert_eq!(coordinator.directory().services().len(), 1);

    let now = Utc::now();
    let response = coordinator.dispatch(
        Action::FullWorkflow,
        case_data(json!({ "symptoms": "accident, heavy bleeding", "location": "Quetta" })),
    );
    assert_eq!(response.result.recommended_service().unwrap().id, "Q1");
    let appointment_time = response.result.appointment().unwrap().appointment_time;
    assert!(appointment_time <= now + Duration::minutes(11));
}
