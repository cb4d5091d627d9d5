//! Static reference data: service records and known locations.

use crate::case::EmergencyType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A hospital, police station or fire station from the bundled dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
    #[serde(alias = "hospital_id")]
    pub id: String,
    pub name: String,

    /// Free-form facility type, e.g. "General Hospital".
    #[serde(default, alias = "type")]
    pub kind: String,

    pub location: String,

    #[serde(default)]
    pub specialties: BTreeSet<String>,

    #[serde(default)]
    pub services: BTreeSet<String>,

    #[serde(default, alias = "emergency_contact")]
    pub contact: String,

    #[serde(default)]
    pub beds_available: u32,

    /// Fixed placeholder distance from the city centre. Not computed.
    #[serde(default)]
    pub proximity_km: f32,
}

impl ServiceRecord {
    pub fn has_specialty(&self, specialty: &str) -> bool {
        self.specialties.iter().any(|s| s.eq_ignore_ascii_case(specialty))
    }

    pub fn offers(&self, service: &str) -> bool {
        self.services.iter().any(|s| s.eq_ignore_ascii_case(service))
    }

    /// Case-insensitive exact or substring match against a requested location.
    pub fn serves_location(&self, location: &str) -> bool {
        let wanted = location.trim().to_lowercase();
        if wanted.is_empty() {
            return false;
        }
        let own = self.location.trim().to_lowercase();
        if own.is_empty() {
            return false;
        }
        own == wanted || own.contains(&wanted) || wanted.contains(&own)
    }

    /// Default record used when nothing in the directory serves the location.
    pub fn fallback(emergency_type: EmergencyType, location: &str) -> Self {
        let (name, kind, specialty) = match emergency_type {
            EmergencyType::Medical | EmergencyType::General => (
                "General Hospital".to_string(),
                "General Hospital",
                "Emergency",
            ),
            EmergencyType::Police => (
                format!("{} Police Station", title_case(location)),
                "Police Station",
                "Police",
            ),
            EmergencyType::Fire => (
                format!("{} Fire Station", title_case(location)),
                "Fire Station",
                "Fire Rescue",
            ),
        };

        Self {
            id: "DEFAULT".into(),
            name,
            kind: kind.into(),
            location: location.to_string(),
            specialties: BTreeSet::from([specialty.to_string()]),
            services: BTreeSet::new(),
            contact: emergency_type.helpline().into(),
            beds_available: 0,
            proximity_km: 0.0,
        }
    }
}

/// A city from the locations CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub city: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub emergency_services: u32,
}

/// Read-only lookup table built once at start-up and injected into agents.
#[derive(Debug, Clone, Default)]
pub struct ServiceDirectory {
    services: Vec<ServiceRecord>,
    locations: Vec<LocationRecord>,
}

impl ServiceDirectory {
    pub fn new(services: Vec<ServiceRecord>, locations: Vec<LocationRecord>) -> Self {
        Self { services, locations }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn services(&self) -> &[ServiceRecord] {
        &self.services
    }

    pub fn locations(&self) -> &[LocationRecord] {
        &self.locations
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Number of non-empty datasets, reported by the health endpoint.
    pub fn datasets_loaded(&self) -> usize {
        usize::from(!self.services.is_empty()) + usize::from(!self.locations.is_empty())
    }

    /// Find a known city mentioned anywhere in `text`.
    pub fn find_city_in(&self, text: &str) -> Option<&LocationRecord> {
        let lower = text.to_lowercase();
        self.locations
            .iter()
            .find(|loc| !loc.city.is_empty() && lower.contains(&loc.city.to_lowercase()))
    }
}

/// Capitalise the first letter of every whitespace-separated word.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(location: &str) -> ServiceRecord {
        ServiceRecord {
            id: "H1".into(),
            name: "Test Hospital".into(),
            kind: "General Hospital".into(),
            location: location.into(),
            specialties: BTreeSet::from(["Emergency".to_string()]),
            services: BTreeSet::new(),
            contact: "1122".into(),
            beds_available: 10,
            proximity_km: 2.0,
        }
    }

    #[test]
    fn test_serves_location_is_case_insensitive() {
        let r = record("Lahore");
        assert!(r.serves_location("lahore"));
        assert!(r.serves_location("LAHORE "));
        assert!(r.serves_location("Model Town, Lahore"));
        assert!(!r.serves_location("Karachi"));
        assert!(!r.serves_location(""));
    }

    #[test]
    fn test_has_specialty_ignores_case() {
        assert!(record("Lahore").has_specialty("emergency"));
        assert!(!record("Lahore").has_specialty("Cardiology"));
    }

    #[test]
    fn test_medical_fallback_is_general_hospital() {
        let r = ServiceRecord::fallback(EmergencyType::Medical, "UnknownTown");
        assert_eq!(r.name, "General Hospital");
        assert_eq!(r.location, "UnknownTown");
        assert_eq!(r.contact, "1122");
    }

    #[test]
    fn test_police_fallback_uses_location() {
        let r = ServiceRecord::fallback(EmergencyType::Police, "multan");
        assert_eq!(r.name, "Multan Police Station");
        assert_eq!(r.contact, "15");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("model town lahore"), "Model Town Lahore");
        assert_eq!(title_case("KARACHI"), "Karachi");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_find_city_in_text() {
        let dir = ServiceDirectory::new(
            vec![],
            vec![LocationRecord {
                city: "Karachi".into(),
                province: "Sindh".into(),
                emergency_services: 20,
            }],
        );
        assert_eq!(dir.find_city_in("I am in karachi near the port").unwrap().city, "Karachi");
        assert!(dir.find_city_in("somewhere else").is_none());
        assert_eq!(dir.datasets_loaded(), 1);
        assert!(dir.is_empty());
    }
}
