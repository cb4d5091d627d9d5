//! Follow-up agent - reminders, post-visit plan and tracking summary.

use chrono::Duration;
use frontline_common::{
    Appointment, Case, Citizen, ContactChannel, ContactMethod, EmergencyType, FollowupPlan, FollowupReport,
    FollowupScheduler, Priority, Reminder, ReminderChannel, Stage, TrackingInfo,
};
use tracing::{info, warn};

/// (kind, minutes before the appointment, channel) per priority.
fn reminder_offsets(priority: Priority) -> &'static [(&'static str, i64, ReminderChannel)] {
    match priority {
        Priority::High => &[
            ("pre_arrival", 20, ReminderChannel::Sms),
            ("arrival_check", 5, ReminderChannel::Sms),
        ],
        Priority::Medium => &[
            ("one_hour", 60, ReminderChannel::Sms),
            ("fifteen_minutes", 15, ReminderChannel::Sms),
        ],
        Priority::Low => &[
            ("one_day", 24 * 60, ReminderChannel::Email),
            ("one_hour", 60, ReminderChannel::Sms),
        ],
    }
}

fn reminder_message(priority: Priority, appointment: &Appointment, minutes_before: i64) -> String {
    let at = appointment.appointment_time.format("%H:%M UTC");
    let service = &appointment.service_name;
    match priority {
        Priority::High => format!(
            "URGENT: you are expected at {service} at {at} ({minutes_before} minutes). Proceed now."
        ),
        Priority::Medium => {
            format!("Reminder: your {service} appointment is at {at}. Please bring identification.")
        }
        Priority::Low if minutes_before >= 24 * 60 => {
            format!("Your appointment at {service} is tomorrow at {at}. Reply to reschedule.")
        }
        Priority::Low => format!("Reminder: your appointment at {service} starts in one hour, at {at}."),
    }
}

/// Reminders in the order they fire. All fall before the appointment.
pub fn reminder_schedule(priority: Priority, appointment: &Appointment) -> Vec<Reminder> {
    reminder_offsets(priority)
        .iter()
        .map(|&(kind, minutes_before, channel)| Reminder {
            kind: kind.to_string(),
            offset_minutes: -minutes_before,
            scheduled_time: appointment
                .appointment_time
                .checked_sub_signed(Duration::minutes(minutes_before))
                .unwrap_or_else(|| {
                    warn!(kind, "Reminder time out of range, using appointment time");
                    appointment.appointment_time
                }),
            channel,
            message: reminder_message(priority, appointment, minutes_before),
        })
        .collect()
}

fn plan_steps(emergency_type: EmergencyType, priority: Priority) -> (&'static [&'static str], &'static str) {
    match (emergency_type, priority) {
        (EmergencyType::Medical, Priority::High) => (
            &[
                "Check on the patient within 2 hours of treatment",
                "Confirm medication and discharge instructions",
                "Schedule a follow-up visit within 48 hours",
            ],
            "2-3 days",
        ),
        (EmergencyType::Medical, Priority::Medium) => (
            &[
                "Check on symptoms the next day",
                "Confirm prescribed treatment was started",
                "Offer a follow-up visit within a week",
            ],
            "1 week",
        ),
        (EmergencyType::Medical | EmergencyType::General, Priority::Low) => (
            &["Send a satisfaction survey", "Check symptoms within 3 days"],
            "3-5 days",
        ),
        (EmergencyType::Police, Priority::High) => (
            &[
                "Share the FIR number with the citizen",
                "Update the citizen on the investigation within 24 hours",
                "Arrange victim support if needed",
            ],
            "1-2 weeks",
        ),
        (EmergencyType::Police, _) => (
            &["Share the report reference number", "Update the citizen on case progress weekly"],
            "2-4 weeks",
        ),
        (EmergencyType::Fire, Priority::High) => (
            &[
                "Post-incident safety inspection",
                "Damage assessment follow-up",
                "Insurance documentation support",
            ],
            "1 week",
        ),
        (EmergencyType::Fire, _) => (
            &["Safety inspection visit", "Share fire prevention guidance"],
            "1-2 weeks",
        ),
        (EmergencyType::General, _) => (&["Standard follow-up call", "Close the case once resolved"], "1 week"),
    }
}

fn success_metrics(emergency_type: EmergencyType) -> &'static [&'static str] {
    match emergency_type {
        EmergencyType::Medical => &["Symptoms resolved", "Treatment completed", "Citizen satisfied"],
        EmergencyType::Police => &["Report filed", "Case resolved", "Citizen feels safe"],
        EmergencyType::Fire => &["Hazard removed", "Property secured", "No injuries reported"],
        EmergencyType::General => &["Request resolved", "Citizen satisfied"],
    }
}

fn followup_plan(emergency_type: EmergencyType, priority: Priority) -> FollowupPlan {
    let (steps, duration) = plan_steps(emergency_type, priority);
    FollowupPlan {
        service_type: emergency_type,
        priority_level: priority,
        followup_steps: steps.iter().map(|s| s.to_string()).collect(),
        expected_duration: duration.to_string(),
        success_metrics: success_metrics(emergency_type).iter().map(|s| s.to_string()).collect(),
    }
}

fn tracking_info(case: &Case, priority: Priority) -> TrackingInfo {
    let (completion, frequency) = match priority {
        Priority::High => ("24-48 hours", "Every 4 hours"),
        Priority::Medium => ("3-7 days", "Daily"),
        Priority::Low => ("1-2 weeks", "Every 3 days"),
    };

    TrackingInfo {
        tracking_id: case.case_id.clone(),
        status: "in_progress".into(),
        current_stage: "appointment_scheduled".into(),
        next_milestone: "service_completion".into(),
        estimated_completion: completion.into(),
        update_frequency: frequency.into(),
        support_contact: case.emergency_type.helpline().into(),
    }
}

/// Contact methods derived from what the citizen supplied.
///
/// Falls back to in-app notifications when nothing usable is present.
pub fn contact_methods(citizen: &Citizen) -> Vec<ContactMethod> {
    let present = |value: Option<&str>| value.map(str::trim).filter(|v| !v.is_empty()).map(String::from);

    let mut methods = Vec::new();
    if let Some(phone) = present(Some(citizen.phone.as_str())) {
        methods.push(ContactMethod {
            method: ContactChannel::Sms,
            priority: Priority::High,
            address: Some(phone),
        });
    }
    if let Some(whatsapp) = present(citizen.whatsapp.as_deref()) {
        methods.push(ContactMethod {
            method: ContactChannel::Whatsapp,
            priority: Priority::High,
            address: Some(whatsapp),
        });
    }
    if let Some(email) = present(citizen.email.as_deref()) {
        methods.push(ContactMethod {
            method: ContactChannel::Email,
            priority: Priority::Medium,
            address: Some(email),
        });
    }

    if methods.is_empty() {
        methods.push(ContactMethod {
            method: ContactChannel::InAppNotifications,
            priority: Priority::Medium,
            address: None,
        });
    }
    methods
}

/// Follow-up agent. Deterministic for a given priority and appointment.
#[derive(Debug, Clone, Default)]
pub struct FollowupAgent;

impl FollowupAgent {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for FollowupAgent {
    fn id(&self) -> &str {
        "followup_agent"
    }

    fn name(&self) -> &str {
        "Follow-up Agent"
    }
}

impl FollowupScheduler for FollowupAgent {
    fn schedule(&self, case: &Case, priority: Priority, appointment: &Appointment) -> FollowupReport {
        info!(
            agent = %self.id(),
            case_id = %case.case_id,
            appointment_id = %appointment.appointment_id,
            "Processing follow-up"
        );

        FollowupReport {
            reminder_schedule: reminder_schedule(priority, appointment),
            followup_plan: followup_plan(case.emergency_type, priority),
            tracking_system: tracking_info(case, priority),
            contact_methods: contact_methods(&case.citizen),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use frontline_common::SlotType;

    fn appointment(priority: Priority) -> Appointment {
        Appointment {
            appointment_id: "APT-00001".into(),
            service_name: "Jinnah Hospital".into(),
            appointment_time: Utc::now() + Duration::hours(3),
            slot_type: SlotType::Urgent,
            duration_minutes: 30,
            priority,
            location: "Lahore".into(),
            instructions: String::new(),
        }
    }

    #[test]
    fn test_reminders_before_appointment() {
        for priority in [Priority::High, Priority::Medium, Priority::Low] {
            let apt = appointment(priority);
            let reminders = reminder_schedule(priority, &apt);
            assert!(!reminders.is_empty());
            for r in &reminders {
                assert!(r.scheduled_time < apt.appointment_time, "{priority}: {}", r.kind);
                assert!(r.offset_minutes < 0);
                assert_eq!(apt.appointment_time - r.scheduled_time, Duration::minutes(-r.offset_minutes));
            }
        }
    }

    #[test]
    fn test_out_of_range_appointment_does_not_panic() {
        let mut apt = appointment(Priority::Low);
        apt.appointment_time = chrono::DateTime::<Utc>::MIN_UTC;
        let reminders = reminder_schedule(Priority::Low, &apt);
        assert_eq!(reminders.len(), 2);
        assert!(reminders.iter().all(|r| r.scheduled_time == apt.appointment_time));
    }

    #[test]
    fn test_reminder_offsets_per_priority() {
        let offsets = |p| {
            reminder_schedule(p, &appointment(p))
                .iter()
                .map(|r| r.offset_minutes)
                .collect::<Vec<_>>()
        };
        assert_eq!(offsets(Priority::High), vec![-20, -5]);
        assert_eq!(offsets(Priority::Medium), vec![-60, -15]);
        assert_eq!(offsets(Priority::Low), vec![-1440, -60]);
    }

    #[test]
    fn test_low_priority_day_reminder_is_email() {
        let reminders = reminder_schedule(Priority::Low, &appointment(Priority::Low));
        assert_eq!(reminders[0].channel, ReminderChannel::Email);
        assert_eq!(reminders[1].channel, ReminderChannel::Sms);
    }

    #[test]
    fn test_deterministic_for_priority() {
        let apt = appointment(Priority::Medium);
        let a = reminder_schedule(Priority::Medium, &apt);
        let b = reminder_schedule(Priority::Medium, &apt);
        assert_eq!(
            a.iter().map(|r| (r.scheduled_time, r.message.clone())).collect::<Vec<_>>(),
            b.iter().map(|r| (r.scheduled_time, r.message.clone())).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_contact_methods_fallback_to_in_app() {
        let methods = contact_methods(&Citizen::default());
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].method, ContactChannel::InAppNotifications);
    }

    #[test]
    fn test_contact_methods_from_citizen() {
        let citizen = Citizen {
            phone: "03001234567".into(),
            email: Some("a@example.com".into()),
            whatsapp: Some("  ".into()),
            ..Default::default()
        };
        let methods: Vec<_> = contact_methods(&citizen).into_iter().map(|m| m.method).collect();
        assert_eq!(methods, vec![ContactChannel::Sms, ContactChannel::Email]);
    }

    #[test]
    fn test_tracking_uses_case_id() {
        let case = Case::new(EmergencyType::Police, "theft", "Karachi");
        let report = FollowupAgent::new().schedule(&case, Priority::Medium, &appointment(Priority::Medium));
        assert_eq!(report.tracking_system.tracking_id, case.case_id);
        assert_eq!(report.tracking_system.support_contact, "15");
        assert_eq!(report.followup_plan.priority_level, Priority::Medium);
    }
}
