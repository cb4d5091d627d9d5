//! Guidance agent - picks a service record from the reference directory.
//!
//! Candidates are filtered by the specialties that can handle the
//! emergency type and by location, then ranked by a small additive score:
//!
//! | Signal                                   | Points |
//! |------------------------------------------|--------|
//! | high priority and an emergency specialty | +10    |
//! | medium priority and urgent care offered  | +5     |
//! | each specialty implied by the symptoms   | +3     |
//! | more than five beds available            | +2     |
//!
//! Ties go to the smaller `proximity_km`, then to the name.

use frontline_common::{
    Case, EmergencyType, GuidanceReport, MatchMethod, Priority, ServiceDirectory, ServiceMatcher, ServiceRecord, Stage,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info, warn};

const MEDICAL_SPECIALTIES: &[&str] = &[
    "Emergency",
    "General Medicine",
    "Urgent Care",
    "Cardiology",
    "Pulmonology",
    "Trauma",
    "Orthopedics",
    "Neurology",
    "Pediatrics",
    "Surgery",
    "Infectious Disease",
];

const POLICE_SPECIALTIES: &[&str] = &["Police"];
const FIRE_SPECIALTIES: &[&str] = &["Fire Rescue"];

/// Symptom keyword to the specialties it suggests.
const SYMPTOM_SPECIALTIES: &[(&str, &[&str])] = &[
    ("chest", &["Cardiology", "Emergency"]),
    ("heart", &["Cardiology", "Emergency"]),
    ("breathing", &["Pulmonology", "Emergency"]),
    ("fever", &["Infectious Disease", "General Medicine"]),
    ("pain", &["Emergency", "General Medicine"]),
    ("accident", &["Trauma", "Emergency"]),
    ("broken", &["Orthopedics", "Emergency"]),
    ("head", &["Neurology", "Emergency"]),
    ("child", &["Pediatrics"]),
];

const MAX_ALTERNATIVES: usize = 2;

/// Guidance agent configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidanceConfig {
    /// Cities that get the faster urban response-time table.
    pub urban_areas: Vec<String>,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            urban_areas: ["Lahore", "Karachi", "Islamabad", "Rawalpindi"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Outcome of a directory lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceMatch {
    /// A record serving the location was found.
    Matched {
        best: ServiceRecord,
        alternatives: Vec<ServiceRecord>,
    },
    /// Nothing serves the location; the type's default record.
    Fallback(ServiceRecord),
    /// The directory is empty.
    Unavailable,
}

impl ServiceMatch {
    pub fn method(&self) -> MatchMethod {
        match self {
            Self::Matched { .. } => MatchMethod::LocationMatch,
            Self::Fallback(_) => MatchMethod::DefaultFallback,
            Self::Unavailable => MatchMethod::NoServiceAvailable,
        }
    }

    pub fn recommended(&self) -> Option<&ServiceRecord> {
        match self {
            Self::Matched { best, .. } => Some(best),
            Self::Fallback(record) => Some(record),
            Self::Unavailable => None,
        }
    }
}

/// Specialties of records that can take a case of this type.
pub fn accepted_specialties(emergency_type: EmergencyType) -> &'static [&'static str] {
    match emergency_type {
        EmergencyType::Medical | EmergencyType::General => MEDICAL_SPECIALTIES,
        EmergencyType::Police => POLICE_SPECIALTIES,
        EmergencyType::Fire => FIRE_SPECIALTIES,
    }
}

/// Score a record for a case. Higher is better.
pub fn score(record: &ServiceRecord, emergency_type: EmergencyType, priority: Priority, symptoms: &str) -> u32 {
    let mut score = 0;

    match (emergency_type, priority) {
        (EmergencyType::Police | EmergencyType::Fire, Priority::High) => {
            if record.offers("Emergency Response") {
                score += 10;
            }
        }
        (_, Priority::High) => {
            if record.has_specialty("Emergency") {
                score += 10;
            }
        }
        (_, Priority::Medium) => {
            if record.offers("Urgent Care") || record.has_specialty("Urgent Care") {
                score += 5;
            }
        }
        (_, Priority::Low) => {}
    }

    let lower = symptoms.to_lowercase();
    for (keyword, specialties) in SYMPTOM_SPECIALTIES {
        if lower.contains(keyword) {
            score += 3 * specialties.iter().filter(|s| record.has_specialty(s)).count() as u32;
        }
    }

    if record.beds_available > 5 {
        score += 2;
    }

    score
}

/// Guidance agent backed by a shared, read-only directory.
pub struct GuidanceAgent {
    directory: Arc<ServiceDirectory>,
    config: GuidanceConfig,
}

impl GuidanceAgent {
    pub fn new(directory: Arc<ServiceDirectory>) -> Self {
        Self {
            directory,
            config: GuidanceConfig::default(),
        }
    }

    pub fn with_config(mut self, config: GuidanceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn directory(&self) -> &ServiceDirectory {
        &self.directory
    }

    /// Look up the best record for a case. Pure and repeatable.
    pub fn match_service(
        &self,
        emergency_type: EmergencyType,
        priority: Priority,
        location: &str,
        symptoms: &str,
    ) -> ServiceMatch {
        if self.directory.is_empty() {
            return ServiceMatch::Unavailable;
        }

        let accepted = accepted_specialties(emergency_type);
        let mut candidates: Vec<(u32, &ServiceRecord)> = self
            .directory
            .services()
            .iter()
            .filter(|r| accepted.iter().any(|s| r.has_specialty(s)))
            .filter(|r| r.serves_location(location))
            .map(|r| (score(r, emergency_type, priority, symptoms), r))
            .collect();

        candidates.sort_by(|(sa, a), (sb, b)| {
            sb.cmp(sa)
                .then_with(|| a.proximity_km.partial_cmp(&b.proximity_km).unwrap_or(Ordering::Equal))
                .then_with(|| a.name.cmp(&b.name))
        });

        let mut ranked = candidates.into_iter().map(|(_, r)| r.clone());
        match ranked.next() {
            Some(best) => ServiceMatch::Matched {
                best,
                alternatives: ranked.take(MAX_ALTERNATIVES).collect(),
            },
            None => ServiceMatch::Fallback(ServiceRecord::fallback(emergency_type, location)),
        }
    }

    fn is_urban(&self, location: &str) -> bool {
        let lower = location.to_lowercase();
        self.config
            .urban_areas
            .iter()
            .any(|area| !area.is_empty() && lower.contains(&area.to_lowercase()))
    }

    fn response_time(&self, priority: Priority, location: &str) -> &'static str {
        match (self.is_urban(location), priority) {
            (true, Priority::High) => "5-10 minutes",
            (true, Priority::Medium) => "15-30 minutes",
            (true, Priority::Low) => "1-2 hours",
            (false, Priority::High) => "10-20 minutes",
            (false, Priority::Medium) => "30-45 minutes",
            (false, Priority::Low) => "2-3 hours",
        }
    }
}

fn instructions(emergency_type: EmergencyType, priority: Priority) -> String {
    let text = match (emergency_type, priority) {
        (EmergencyType::Medical, Priority::High) => {
            "Call the ambulance immediately. Keep the patient still and monitor breathing. \
             Do not give food or water."
        }
        (EmergencyType::Medical, Priority::Medium) => {
            "Visit the recommended facility within two hours. Bring identification and a list of current medications."
        }
        (EmergencyType::Medical, Priority::Low) => {
            "Book a routine visit at the recommended facility. Monitor symptoms and seek help if they worsen."
        }
        (EmergencyType::Police, Priority::High) => {
            "Move to a safe place and call the police now. Do not confront suspects or touch evidence."
        }
        (EmergencyType::Police, _) => {
            "File a report at the nearest police station. Keep any evidence and write down what happened."
        }
        (EmergencyType::Fire, Priority::High) => {
            "Evacuate immediately and call the fire brigade. Stay low under smoke and do not use elevators."
        }
        (EmergencyType::Fire, _) => {
            "Switch off gas and electricity if it is safe to do so, then contact the fire station."
        }
        (EmergencyType::General, _) => "Contact local emergency services and follow their directions.",
    };
    text.to_string()
}

fn selection_criteria(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "Emergency capability, closest available facility",
        Priority::Medium => "Urgent care availability, relevant specialties, reasonable distance",
        Priority::Low => "Relevant specialties, convenience",
    }
}

impl Stage for GuidanceAgent {
    fn id(&self) -> &str {
        "guidance_agent"
    }

    fn name(&self) -> &str {
        "Guidance Agent"
    }
}

impl ServiceMatcher for GuidanceAgent {
    fn guide(&self, case: &Case, priority: Priority) -> GuidanceReport {
        info!(
            agent = %self.id(),
            case_id = %case.case_id,
            location = %case.location,
            priority = %priority,
            "Processing guidance"
        );

        let found = self.match_service(case.emergency_type, priority, &case.location, &case.symptoms);

        let (recommended, alternatives) = match found {
            ServiceMatch::Matched { ref best, ref alternatives } => {
                debug!(service = %best.name, alternatives = alternatives.len(), "Service matched by location");
                (Some(best.clone()), alternatives.clone())
            }
            ServiceMatch::Fallback(ref record) => {
                debug!(service = %record.name, "No service for location, using default");
                (Some(record.clone()), Vec::new())
            }
            ServiceMatch::Unavailable => {
                warn!(case_id = %case.case_id, "Service directory is empty");
                (None, Vec::new())
            }
        };

        let contact_information = recommended
            .as_ref()
            .map(|r| r.contact.clone())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| case.emergency_type.helpline().to_string());

        GuidanceReport {
            service_type: case.emergency_type,
            recommended_service: recommended,
            alternative_services: alternatives,
            match_method: found.method(),
            instructions: instructions(case.emergency_type, priority),
            contact_information,
            estimated_response_time: self.response_time(priority, &case.location).to_string(),
            selection_criteria: selection_criteria(priority).to_string(),
        }
    }
}
