//! Intake: raw request fields and free-text messages into a [`Case`].
//!
//! The [`Normalizer`] fills every missing field with a documented default,
//! so downstream stages never see an incomplete case. The [`IntakeParser`]
//! extracts what it can from a chat message: emergency type, location,
//! citizen details and the symptom sentences.

use crate::triage::type_keywords;
use frontline_common::{title_case, Case, Citizen, EmergencyType, Priority};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, warn};

static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i:my name is|this is|name:)\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)").expect("valid name pattern")
});

static AGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,3})\s*(?:years?|yrs?)[\s-]*old\b|\baged?\s*(?:is\s*)?:?\s*(\d{1,3})\b")
        .expect("valid age pattern")
});

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\d[\d\s-]{8,14}\d").expect("valid phone pattern"));

static EXPLICIT_LOCATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:location is|address is|located at)\s+([a-z0-9][a-z0-9 ]{1,40}?)\s*(?:[.,;!?]|$)")
        .expect("valid location pattern")
});

static PLACE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:in|at|near|from)\s+([A-Z][A-Za-z]+(?:\s+[A-Z][A-Za-z]+){0,2})").expect("valid place pattern")
});

const DEFAULT_CITIES: &[&str] = &[
    "Lahore",
    "Karachi",
    "Islamabad",
    "Rawalpindi",
    "Faisalabad",
    "Multan",
    "Peshawar",
    "Quetta",
    "Sialkot",
    "Gujranwala",
];

const CITY_COORDINATES: &[(&str, f64, f64)] = &[
    ("Lahore", 31.5204, 74.3587),
    ("Karachi", 24.8607, 67.0011),
    ("Islamabad", 33.6844, 73.0479),
    ("Rawalpindi", 33.5651, 73.0169),
    ("Faisalabad", 31.4504, 73.1350),
    ("Multan", 30.1575, 71.5249),
    ("Peshawar", 34.0151, 71.5249),
    ("Quetta", 30.1798, 66.9750),
    ("Sialkot", 32.4945, 74.5229),
    ("Gujranwala", 32.1877, 74.1945),
];

// Words that point at a type without being triage keywords.
const MEDICAL_HINTS: &[&str] = &[
    "chest pain",
    "heart attack",
    "stroke",
    "unconscious",
    "breathing",
    "bleeding",
    "fever",
    "cough",
    "pain",
    "vomiting",
    "dizziness",
    "dizzy",
    "hurt",
    "sick",
    "injured",
    "broken",
    "doctor",
    "hospital",
    "ambulance",
];

const POLICE_HINTS: &[&str] = &[
    "weapon", "gun", "shooting", "stabbing", "thief", "crime", "police", "violence", "threat", "illegal",
];

const FIRE_HINTS: &[&str] = &["fire", "smoke", "explosion", "burning", "gas", "flames", "chemical"];

const SYMPTOM_INDICATORS: &[&str] = &[
    "pain", "hurt", "ache", "feel", "symptom", "sick", "ill", "bleeding", "fever", "dizzy", "nausea", "vomit",
    "breath", "cough",
];

/// Case fields as they arrive on the wire. Every field is optional, and a
/// field of the wrong JSON type reads as absent instead of failing the
/// whole request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCase {
    #[serde(deserialize_with = "lenient_string")]
    pub case_id: Option<String>,

    #[serde(deserialize_with = "lenient_string")]
    pub citizen_id: Option<String>,

    #[serde(deserialize_with = "lenient_string")]
    pub emergency_type: Option<String>,

    #[serde(alias = "incident_details", alias = "description", deserialize_with = "lenient_string")]
    pub symptoms: Option<String>,

    #[serde(deserialize_with = "lenient_string")]
    pub location: Option<String>,

    #[serde(deserialize_with = "lenient_coordinates")]
    pub coordinates: Option<Coordinates>,

    /// Kept loose so a malformed citizen object degrades to defaults.
    #[serde(alias = "citizen")]
    pub citizen_data: Option<serde_json::Value>,

    #[serde(deserialize_with = "lenient_string")]
    pub priority: Option<String>,

    /// Free-text chat message, parsed when structured fields are missing.
    #[serde(deserialize_with = "lenient_string")]
    pub message: Option<String>,
}

/// Accept a string field; anything other than a string or null reads as
/// `None` with a warning.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => {
            warn!(value = %other, "Ignoring case field with unexpected type");
            None
        }
    })
}

/// Accept `{lat, lng}` (or `lon`) as numbers or numeric strings. Anything
/// incomplete or non-finite reads as `None` with a warning.
fn lenient_coordinates<'de, D>(deserializer: D) -> Result<Option<Coordinates>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };

    let number = |key: &str| match value.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match (number("lat"), number("lng").or_else(|| number("lon"))) {
        (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => Ok(Some(Coordinates { lat, lng })),
        _ => {
            warn!(value = %value, "Ignoring malformed coordinates");
            Ok(None)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Values used for any field the caller left out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeDefaults {
    pub emergency_type: EmergencyType,
    pub location: String,
    pub priority: Priority,
}

impl Default for IntakeDefaults {
    fn default() -> Self {
        Self {
            emergency_type: EmergencyType::Medical,
            location: "Unknown".into(),
            priority: Priority::Medium,
        }
    }
}

/// Fields extracted from a free-text message.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedIntake {
    pub emergency_type: EmergencyType,
    pub location: Option<String>,
    pub citizen: Citizen,
    pub symptoms: String,

    /// Matched keywords, most specific first.
    pub key_terms: Vec<String>,

    /// 0.5 to 1.0, higher when more was recognised.
    pub confidence: f32,
}

/// City closest to a GPS fix, from a fixed coordinate table.
pub fn nearest_city(coordinates: Coordinates) -> &'static str {
    let distance = |lat: f64, lng: f64| (coordinates.lat - lat).powi(2) + (coordinates.lng - lng).powi(2);

    CITY_COORDINATES
        .iter()
        .min_by(|a, b| distance(a.1, a.2).total_cmp(&distance(b.1, b.2)))
        .map(|(city, _, _)| *city)
        .unwrap_or("Lahore")
}

/// Free-text parser.
#[derive(Debug, Clone)]
pub struct IntakeParser {
    known_cities: Vec<String>,
}

impl Default for IntakeParser {
    fn default() -> Self {
        Self {
            known_cities: DEFAULT_CITIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl IntakeParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add cities from the loaded directory to the recognised set.
    pub fn with_cities<I, S>(mut self, cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for city in cities {
            let city = city.into();
            if !city.trim().is_empty() && !self.known_cities.iter().any(|c| c.eq_ignore_ascii_case(&city)) {
                self.known_cities.push(city);
            }
        }
        self
    }

    pub fn parse(&self, message: &str) -> ParsedIntake {
        let (emergency_type, key_terms) = classify(message);
        let location = self.extract_location(message);
        let citizen = extract_citizen(message);
        let symptoms = extract_symptoms(message, emergency_type);

        let personal = usize::from(!citizen.name.is_empty())
            + usize::from(citizen.age.is_some())
            + usize::from(!citizen.phone.is_empty());
        let confidence = (0.5
            + (0.1 * key_terms.len() as f32).min(0.4)
            + if location.is_some() { 0.1 } else { 0.0 }
            + 0.05 * personal as f32)
            .min(1.0);

        debug!(
            emergency_type = %emergency_type,
            location = ?location,
            key_terms = key_terms.len(),
            confidence,
            "Parsed free-text message"
        );

        ParsedIntake {
            emergency_type,
            location,
            citizen,
            symptoms,
            key_terms,
            confidence,
        }
    }

    fn extract_location(&self, message: &str) -> Option<String> {
        let lower = message.to_lowercase();
        if let Some(city) = self.known_cities.iter().find(|c| lower.contains(&c.to_lowercase())) {
            return Some(city.clone());
        }

        let captured = EXPLICIT_LOCATION_PATTERN
            .captures(message)
            .or_else(|| PLACE_PATTERN.captures(message))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())?;

        (captured.len() > 2).then(|| title_case(&captured))
    }
}

/// Pick the type with the most keyword hits. Ties go to medical, then
/// police, then fire; no hits at all means medical.
fn classify(message: &str) -> (EmergencyType, Vec<String>) {
    let lower = message.to_lowercase();

    let mut best = (EmergencyType::Medical, Vec::new());
    for (ty, hints) in [
        (EmergencyType::Medical, MEDICAL_HINTS),
        (EmergencyType::Police, POLICE_HINTS),
        (EmergencyType::Fire, FIRE_HINTS),
    ] {
        let (high, medium, low) = type_keywords(ty);
        let mut terms: Vec<String> = Vec::new();
        for keyword in high.iter().chain(medium).chain(low).chain(hints) {
            if lower.contains(keyword) && !terms.iter().any(|t| t.contains(keyword)) {
                terms.push(keyword.to_string());
            }
        }
        if terms.len() > best.1.len() {
            best = (ty, terms);
        }
    }
    best
}

fn extract_citizen(message: &str) -> Citizen {
    let mut citizen = Citizen::default();

    if let Some(name) = NAME_PATTERN.captures(message).and_then(|c| c.get(1)) {
        citizen.name = name.as_str().trim().to_string();
    }

    if let Some(caps) = AGE_PATTERN.captures(message) {
        citizen.age = caps
            .get(1)
            .or_else(|| caps.get(2))
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .filter(|age| *age <= 130);
    }

    if let Some(m) = PHONE_PATTERN.find(message) {
        let phone: String = m.as_str().chars().filter(|c| c.is_ascii_digit() || *c == '+').collect();
        if phone.len() >= 10 {
            citizen.phone = phone;
        }
    }

    citizen
}

/// Symptom sentences for medical messages, the whole text otherwise.
fn extract_symptoms(message: &str, emergency_type: EmergencyType) -> String {
    let text = message.trim();
    if emergency_type != EmergencyType::Medical {
        return text.to_string();
    }

    let sentences: Vec<&str> = text
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| {
            let lower = s.to_lowercase();
            SYMPTOM_INDICATORS.iter().any(|i| lower.contains(i))
        })
        .collect();

    if sentences.is_empty() {
        text.to_string()
    } else {
        sentences.join(". ")
    }
}

/// One-line description, e.g. "high priority medical emergency involving chest pain".
pub fn summarize(parsed: &ParsedIntake, priority: Priority) -> String {
    let mut summary = format!("{priority} priority {} emergency", parsed.emergency_type);
    if !parsed.key_terms.is_empty() {
        let terms: Vec<&str> = parsed.key_terms.iter().take(2).map(String::as_str).collect();
        summary.push_str(" involving ");
        summary.push_str(&terms.join(", "));
    }
    summary
}

/// What the caller should do while help is on the way.
pub fn suggested_actions(emergency_type: EmergencyType, priority: Priority) -> Vec<String> {
    let actions: &[&str] = match (priority, emergency_type) {
        (Priority::High, EmergencyType::Medical) => &[
            "Immediately contact emergency services",
            "Stay calm and keep the person conscious if possible",
            "Do not move the person unless in immediate danger",
            "Be ready to provide CPR if needed",
        ],
        (Priority::High, EmergencyType::Police) => &[
            "Immediately contact emergency services",
            "Ensure your safety first",
            "Move to a safe location if possible",
            "Do not confront the perpetrator",
        ],
        (Priority::High, EmergencyType::Fire) => &[
            "Immediately contact emergency services",
            "Evacuate immediately if safe to do so",
            "Stay low to avoid smoke",
            "Do not use elevators",
        ],
        (Priority::High, EmergencyType::General) => &["Immediately contact emergency services"],
        (Priority::Medium, _) => &[
            "Seek appropriate emergency attention within 2 hours",
            "Monitor the situation closely",
        ],
        (Priority::Low, _) => &[
            "Schedule appropriate care when convenient",
            "Monitor symptoms and seek help if they worsen",
        ],
    };
    actions.iter().map(|a| a.to_string()).collect()
}

/// Turns a [`RawCase`] into a complete [`Case`].
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    defaults: IntakeDefaults,
    parser: IntakeParser,
}

impl Normalizer {
    pub fn new(defaults: IntakeDefaults, parser: IntakeParser) -> Self {
        Self { defaults, parser }
    }

    pub fn defaults(&self) -> &IntakeDefaults {
        &self.defaults
    }

    pub fn parser(&self) -> &IntakeParser {
        &self.parser
    }

    /// Never fails. Missing or malformed fields take their defaults.
    pub fn normalize(&self, raw: RawCase) -> Case {
        self.normalize_with(raw, None)
    }

    /// Like [`normalize`](Self::normalize), reusing a parse of `raw.message`
    /// the caller already has.
    pub fn normalize_with(&self, raw: RawCase, parsed: Option<&ParsedIntake>) -> Case {
        let non_empty = |value: Option<String>| value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let message = non_empty(raw.message);
        let owned;
        let parsed = match (parsed, message.as_deref()) {
            (Some(parsed), _) => Some(parsed),
            (None, Some(m)) => {
                owned = self.parser.parse(m);
                Some(&owned)
            }
            (None, None) => None,
        };

        let emergency_type = non_empty(raw.emergency_type)
            .map(|t| EmergencyType::from_label(&t))
            .or_else(|| parsed.map(|p| p.emergency_type))
            .unwrap_or(self.defaults.emergency_type);

        let symptoms = non_empty(raw.symptoms)
            .or_else(|| parsed.map(|p| p.symptoms.clone()))
            .unwrap_or_default();

        let location = non_empty(raw.location)
            .or_else(|| raw.coordinates.map(|c| nearest_city(c).to_string()))
            .or_else(|| parsed.and_then(|p| p.location.clone()))
            .unwrap_or_else(|| self.defaults.location.clone());

        let priority = match non_empty(raw.priority) {
            Some(label) => Priority::from_label(&label).unwrap_or_else(|| {
                warn!(priority = %label, "Unrecognised priority, using default");
                self.defaults.priority
            }),
            None => self.defaults.priority,
        };

        let mut citizen = match raw.citizen_data {
            Some(value) => serde_json::from_value::<Citizen>(value).unwrap_or_else(|e| {
                warn!(error = %e, "Malformed citizen data, using defaults");
                Citizen::default()
            }),
            None => Citizen::default(),
        };
        if let Some(parsed) = parsed {
            if citizen.name.trim().is_empty() {
                citizen.name = parsed.citizen.name.clone();
            }
            if citizen.age.is_none() {
                citizen.age = parsed.citizen.age;
            }
            if citizen.phone.trim().is_empty() {
                citizen.phone = parsed.citizen.phone.clone();
            }
        }

        let mut case = Case::new(emergency_type, symptoms, location)
            .with_citizen(citizen)
            .with_priority(priority);
        if let Some(id) = non_empty(raw.case_id) {
            case.case_id = id;
        }
        if let Some(id) = non_empty(raw.citizen_id) {
            case.citizen_id = id;
        }
        case.original_message = message;

        debug!(
            case_id = %case.case_id,
            emergency_type = %case.emergency_type,
            location = %case.location,
            "Case normalized"
        );
        case
    }
}
