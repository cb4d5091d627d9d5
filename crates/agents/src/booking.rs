//! Booking agent - turns a recommended service into an appointment slot.

use chrono::{DateTime, Duration, Utc};
use frontline_common::{
    Appointment, BookingGenerator, BookingReport, Case, Confirmation, EmergencyType, FormData, FormField, Priority,
    ServiceRecord, SlotType, Stage,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Minutes from "now" to the appointment, per priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    pub high_offset_minutes: i64,
    pub medium_offset_minutes: i64,
    pub low_offset_minutes: i64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            high_offset_minutes: 30,
            medium_offset_minutes: 120,
            low_offset_minutes: 24 * 60,
        }
    }
}

/// Longest accepted offset: one year.
pub const MAX_OFFSET_MINUTES: i64 = 365 * 24 * 60;

impl BookingConfig {
    /// Offset for a priority, clamped to one minute..one year.
    pub fn offset(&self, priority: Priority) -> Duration {
        let minutes = match priority {
            Priority::High => self.high_offset_minutes,
            Priority::Medium => self.medium_offset_minutes,
            Priority::Low => self.low_offset_minutes,
        };
        Duration::try_minutes(minutes.clamp(1, MAX_OFFSET_MINUTES)).unwrap_or_else(|| Self::default().offset(priority))
    }

    /// `now` plus the priority's offset. Falls back to the default offset
    /// if the sum is out of range.
    pub fn appointment_time(&self, now: DateTime<Utc>, priority: Priority) -> DateTime<Utc> {
        now.checked_add_signed(self.offset(priority))
            .or_else(|| {
                warn!(priority = %priority, "Appointment time out of range, using default offset");
                now.checked_add_signed(Self::default().offset(priority))
            })
            .unwrap_or(now)
    }
}

/// `PREFIX-` followed by five random digits. Collisions are not checked.
pub fn random_code(prefix: &str) -> String {
    let n: u32 = rand::thread_rng().gen_range(0..100_000);
    format!("{prefix}-{n:05}")
}

/// Slot type and length in minutes for a priority.
pub fn slot_for(priority: Priority) -> (SlotType, u32) {
    match priority {
        Priority::High => (SlotType::Emergency, 45),
        Priority::Medium => (SlotType::Urgent, 30),
        Priority::Low => (SlotType::Standard, 20),
    }
}

fn appointment_instructions(emergency_type: EmergencyType, priority: Priority) -> &'static str {
    match (emergency_type, priority) {
        (EmergencyType::Medical, Priority::High) => {
            "Go directly to the emergency department. Bring identification and any current medications."
        }
        (EmergencyType::Medical, Priority::Medium) => {
            "Arrive 15 minutes early. Bring identification, insurance details and a list of symptoms."
        }
        (EmergencyType::Medical, Priority::Low) => "Arrive 10 minutes early and bring identification.",
        (EmergencyType::Police, Priority::High) => {
            "Officers have been notified. Stay in a safe place and keep your phone on."
        }
        (EmergencyType::Police, _) => "Bring identification and any evidence or documents related to the incident.",
        (EmergencyType::Fire, Priority::High) => "Keep everyone away from the building and wait for the fire brigade.",
        (EmergencyType::Fire, _) => "Keep the area clear so the inspection team can reach it.",
        (EmergencyType::General, _) => "Follow the service provider's instructions.",
    }
}

fn next_steps(priority: Priority) -> Vec<String> {
    let steps: &[&str] = match priority {
        Priority::High => &[
            "Proceed to the service location immediately",
            "Keep your phone available for updates",
            "Bring identification",
        ],
        Priority::Medium => &[
            "Arrive at the scheduled time",
            "Bring identification and relevant documents",
            "Call ahead if you are delayed",
        ],
        Priority::Low => &[
            "Attend at the scheduled time",
            "Reschedule at least two hours in advance if needed",
        ],
    };
    steps.iter().map(|s| s.to_string()).collect()
}

fn important_notes(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "If the situation worsens before the appointment, call the emergency helpline.",
        Priority::Medium => "Please arrive on time. Late arrivals may need to be rescheduled.",
        Priority::Low => "You will receive a reminder before the appointment.",
    }
}

fn required_documents(emergency_type: EmergencyType) -> Vec<String> {
    let docs: &[&str] = match emergency_type {
        EmergencyType::Medical => &["National ID card", "Previous medical records", "List of current medications"],
        EmergencyType::Police => &["National ID card", "Evidence related to the incident"],
        EmergencyType::Fire => &["National ID card", "Property documents"],
        EmergencyType::General => &["National ID card"],
    };
    docs.iter().map(|s| s.to_string()).collect()
}

fn form_fields(case: &Case) -> Vec<FormField> {
    let field = |name: &str, value: &str, required: bool| FormField {
        field: name.to_string(),
        value: value.to_string(),
        required,
    };

    let citizen = &case.citizen;
    let age = citizen.age.map(|a| a.to_string()).unwrap_or_default();
    let mut fields = vec![
        field("full_name", &citizen.name, true),
        field("age", &age, false),
        field("phone", &citizen.phone, true),
        field("location", &case.location, true),
    ];

    match case.emergency_type {
        EmergencyType::Medical | EmergencyType::General => {
            let conditions = citizen
                .medical_conditions
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            fields.push(field("symptoms", &case.symptoms, true));
            fields.push(field("existing_conditions", &conditions, false));
            fields.push(field("allergies", citizen.allergies.as_deref().unwrap_or(""), false));
        }
        EmergencyType::Police | EmergencyType::Fire => {
            fields.push(field("incident_description", &case.symptoms, true));
            fields.push(field("incident_location", &case.location, true));
        }
    }

    fields
}

/// Booking agent. Stateless apart from its offsets.
#[derive(Debug, Clone, Default)]
pub struct BookingAgent {
    config: BookingConfig,
}

impl BookingAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: BookingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &BookingConfig {
        &self.config
    }
}

impl Stage for BookingAgent {
    fn id(&self) -> &str {
        "booking_agent"
    }

    fn name(&self) -> &str {
        "Booking Agent"
    }
}

impl BookingGenerator for BookingAgent {
    fn book(
        &self,
        case: &Case,
        priority: Priority,
        service: Option<&ServiceRecord>,
        now: DateTime<Utc>,
    ) -> BookingReport {
        info!(
            agent = %self.id(),
            case_id = %case.case_id,
            priority = %priority,
            "Processing booking"
        );

        let (slot_type, duration_minutes) = slot_for(priority);
        let service_name = service.map(|s| s.name.clone()).unwrap_or_else(|| "Service Provider".into());
        let location = service
            .map(|s| s.location.clone())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| case.location.clone());
        let contact_information = service
            .map(|s| s.contact.clone())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| case.emergency_type.helpline().to_string());

        let appointment = Appointment {
            appointment_id: random_code("APT"),
            service_name: service_name.clone(),
            appointment_time: self.config.appointment_time(now, priority),
            slot_type,
            duration_minutes,
            priority,
            location,
            instructions: appointment_instructions(case.emergency_type, priority).to_string(),
        };

        let confirmation = Confirmation {
            confirmation_number: random_code("CNF"),
            confirmation_time: now,
            customer_name: case.citizen.display_name().to_string(),
            next_steps: next_steps(priority),
            contact_information,
            important_notes: important_notes(priority).to_string(),
        };

        debug!(
            appointment_id = %appointment.appointment_id,
            confirmation = %confirmation.confirmation_number,
            appointment_time = %appointment.appointment_time,
            "Appointment booked"
        );

        BookingReport {
            form_data: FormData {
                service_type: case.emergency_type,
                service_provider: service_name,
                status: "pre_filled".into(),
                required_documents: required_documents(case.emergency_type),
                form_fields: form_fields(case),
            },
            appointment_details: appointment,
            confirmation_details: confirmation,
            booking_status: "confirmed".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontline_common::Citizen;
    use regex::Regex;

    fn book(priority: Priority, service: Option<&ServiceRecord>) -> (DateTime<Utc>, BookingReport) {
        let now = Utc::now();
        let case = Case::new(EmergencyType::Medical, "fever", "Lahore");
        (now, BookingAgent::new().book(&case, priority, service, now))
    }

    #[test]
    fn test_offsets_by_priority() {
        for (priority, minutes) in [(Priority::High, 30), (Priority::Medium, 120), (Priority::Low, 1440)] {
            let (now, report) = book(priority, None);
            assert_eq!(report.appointment_details.appointment_time - now, Duration::minutes(minutes));
        }
    }

    #[test]
    fn test_appointment_strictly_after_now() {
        let config = BookingConfig {
            high_offset_minutes: 0,
            medium_offset_minutes: -5,
            low_offset_minutes: 10,
        };
        let agent = BookingAgent::new().with_config(config);
        let case = Case::new(EmergencyType::Police, "theft", "Karachi");
        let now = Utc::now();

        for priority in [Priority::High, Priority::Medium, Priority::Low] {
            let report = agent.book(&case, priority, None, now);
            assert!(report.appointment_details.appointment_time > now);
        }
    }

    #[test]
    fn test_huge_offset_is_clamped() {
        let config = BookingConfig {
            high_offset_minutes: i64::MAX / 2,
            medium_offset_minutes: i64::MAX,
            low_offset_minutes: 10,
        };
        let agent = BookingAgent::new().with_config(config.clone());
        let case = Case::new(EmergencyType::Medical, "fever", "Lahore");
        let now = Utc::now();

        let report = agent.book(&case, Priority::High, None, now);
        assert_eq!(
            report.appointment_details.appointment_time - now,
            Duration::minutes(MAX_OFFSET_MINUTES)
        );
        assert_eq!(config.offset(Priority::Medium), Duration::minutes(MAX_OFFSET_MINUTES));
    }

    #[test]
    fn test_appointment_time_near_max_date_falls_back() {
        let config = BookingConfig::default();
        let now = chrono::DateTime::<Utc>::MAX_UTC - Duration::minutes(60);

        assert_eq!(config.appointment_time(now, Priority::High), now + Duration::minutes(30));
        assert_eq!(config.appointment_time(now, Priority::Low), now);
    }

    #[test]
    fn test_codes_format() {
        let cnf = Regex::new(r"^CNF-\d{5}$").unwrap();
        let apt = Regex::new(r"^APT-\d{5}$").unwrap();
        for _ in 0..50 {
            let (_, report) = book(Priority::Medium, None);
            assert!(cnf.is_match(&report.confirmation_details.confirmation_number));
            assert!(apt.is_match(&report.appointment_details.appointment_id));
        }
    }

    #[test]
    fn test_slot_types() {
        let (_, report) = book(Priority::High, None);
        assert_eq!(report.appointment_details.slot_type, SlotType::Emergency);
        assert_eq!(report.appointment_details.duration_minutes, 45);

        let (_, report) = book(Priority::Low, None);
        assert_eq!(report.appointment_details.slot_type, SlotType::Standard);
        assert_eq!(report.appointment_details.duration_minutes, 20);
    }

    #[test]
    fn test_without_service_uses_placeholder() {
        let (_, report) = book(Priority::Medium, None);
        assert_eq!(report.appointment_details.service_name, "Service Provider");
        assert_eq!(report.appointment_details.location, "Lahore");
        assert_eq!(report.confirmation_details.contact_information, "1122");
        assert_eq!(report.confirmation_details.customer_name, "Citizen");
    }

    #[test]
    fn test_with_service() {
        let service = ServiceRecord::fallback(EmergencyType::Medical, "Multan");
        let (_, report) = book(Priority::High, Some(&service));
        assert_eq!(report.appointment_details.service_name, "General Hospital");
        assert_eq!(report.form_data.service_provider, "General Hospital");
        assert_eq!(report.booking_status, "confirmed");
    }

    #[test]
    fn test_form_fields_follow_type() {
        let citizen = Citizen {
            name: "Ayesha Khan".into(),
            age: Some(34),
            phone: "03001234567".into(),
            ..Default::default()
        };
        let case = Case::new(EmergencyType::Fire, "gas smell in kitchen", "Islamabad").with_citizen(citizen);
        let report = BookingAgent::new().book(&case, Priority::Medium, None, Utc::now());

        let names: Vec<_> = report.form_data.form_fields.iter().map(|f| f.field.as_str()).collect();
        assert!(names.contains(&"incident_description"));
        assert!(!names.contains(&"allergies"));
        assert_eq!(report.confirmation_details.customer_name, "Ayesha Khan");
    }
}
