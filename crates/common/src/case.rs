//! Case and citizen types for a single emergency request.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Kind of emergency service a case needs.
///
/// `General` is the fall-through for any type string the pipeline does not
/// recognise; it uses the shared rule table only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmergencyType {
    #[default]
    Medical,
    Police,
    Fire,
    General,
}

impl EmergencyType {
    /// Lenient parse used by the normalizer. Never fails.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "medical" | "health" | "ambulance" => Self::Medical,
            "police" | "crime" | "security" => Self::Police,
            "fire" | "rescue" => Self::Fire,
            _ => Self::General,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medical => "medical",
            Self::Police => "police",
            Self::Fire => "fire",
            Self::General => "general",
        }
    }

    /// National helpline for the service type.
    pub fn helpline(&self) -> &'static str {
        match self {
            Self::Medical | Self::General => "1122",
            Self::Police => "15",
            Self::Fire => "16",
        }
    }
}

impl fmt::Display for EmergencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse urgency bucket assigned by keyword rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "high" | "critical" | "urgent" => Some(Self::High),
            "medium" | "normal" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn urgency(&self) -> Urgency {
        match self {
            Self::High => Urgency::Immediate,
            Self::Medium => Urgency::Within2Hours,
            Self::Low => Urgency::Within24Hours,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency label derived from priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Urgency {
    #[serde(rename = "immediate")]
    Immediate,
    #[serde(rename = "within_2_hours")]
    Within2Hours,
    #[serde(rename = "within_24_hours")]
    Within24Hours,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::Within2Hours => "within_2_hours",
            Self::Within24Hours => "within_24_hours",
        }
    }
}

/// Person the case is about. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Citizen {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,

    pub phone: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,

    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub medical_conditions: BTreeSet<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allergies: Option<String>,
}

impl Citizen {
    /// Display name with a neutral fallback.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "Citizen"
        } else {
            self.name.trim()
        }
    }
}

/// One emergency request after normalization.
///
/// Exists for a single pipeline run and is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    pub case_id: String,
    pub citizen_id: String,
    pub emergency_type: EmergencyType,
    pub symptoms: String,
    pub location: String,
    pub citizen: Citizen,

    /// Priority carried into standalone actions. Triage replaces it.
    pub priority: Priority,

    /// Original free-text message, when the case came from chat.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_message: Option<String>,
}

impl Case {
    pub fn new(emergency_type: EmergencyType, symptoms: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            case_id: format!("case_{}", uuid::Uuid::new_v4().simple()),
            citizen_id: format!("citizen_{}", uuid::Uuid::new_v4().simple()),
            emergency_type,
            symptoms: symptoms.into(),
            location: location.into(),
            citizen: Citizen::default(),
            priority: Priority::default(),
            original_message: None,
        }
    }

    pub fn with_citizen(mut self, citizen: Citizen) -> Self {
        self.citizen = citizen;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}
