//! Triage agent - keyword rule tables mapping symptoms to priority.

use frontline_common::{
    Case, Citizen, Confidence, EmergencyType, Priority, RiskLevel, Stage, TriageAssessment, TriageEvaluator,
};
use tracing::{debug, info};

// Shared rules apply to every emergency type, after the type's own rules of
// the same priority.
const SHARED_HIGH: &[&str] = &[
    "chest pain",
    "heart attack",
    "stroke",
    "unconscious",
    "not breathing",
    "difficulty breathing",
    "bleeding",
    "severe burn",
    "fire",
    "explosion",
    "weapon",
    "gun",
    "shooting",
    "stabbing",
];

const SHARED_MEDIUM: &[&str] = &[
    "fever",
    "cough",
    "pain",
    "accident",
    "broken",
    "cut",
    "vomiting",
    "dizziness",
    "high temperature",
    "injured",
    "injury",
];

const MEDICAL_HIGH: &[&str] = &[
    "cardiac arrest",
    "seizure",
    "choking",
    "can't breathe",
    "overdose",
    "poisoned",
    "anaphylaxis",
    "allergic reaction",
    "head injury",
    "loss of consciousness",
    "labor pains",
    "water broke",
];

const MEDICAL_MEDIUM: &[&str] = &[
    "fracture",
    "sprain",
    "infection",
    "severe headache",
    "migraine",
    "dehydration",
    "fainting",
    "nausea",
    "wound",
    "burn",
    "fall",
];

const MEDICAL_LOW: &[&str] = &[
    "cold",
    "runny nose",
    "sore throat",
    "minor headache",
    "fatigue",
    "rash",
    "bruise",
    "upset stomach",
];

const POLICE_HIGH: &[&str] = &[
    "robbery",
    "armed",
    "assault",
    "kidnapping",
    "abduction",
    "hostage",
    "murder",
    "domestic violence",
    "break in",
    "breaking in",
    "home invasion",
    "threat to kill",
    "bomb threat",
];

const POLICE_MEDIUM: &[&str] = &[
    "theft",
    "stolen",
    "harassment",
    "stalking",
    "vandalism",
    "fraud",
    "scam",
    "missing person",
    "suspicious",
    "trespassing",
    "disturbance",
];

const POLICE_LOW: &[&str] = &["parking", "lost property", "noise", "littering", "civil matter"];

const FIRE_HIGH: &[&str] = &[
    "flames",
    "heavy smoke",
    "smoke everywhere",
    "gas leak",
    "gas explosion",
    "chemical spill",
    "toxic fumes",
    "building collapse",
    "trapped",
];

const FIRE_MEDIUM: &[&str] = &[
    "sparks",
    "overheating",
    "burning smell",
    "gas smell",
    "smoke alarm",
    "carbon monoxide",
    "electrical problem",
    "water leak",
];

const FIRE_LOW: &[&str] = &[
    "smoke detector battery",
    "safety check",
    "extinguisher",
    "prevention advice",
    "inspection",
];

const HIGH_RISK_CONDITIONS: &[&str] = &["heart disease", "diabetes", "asthma", "pregnancy"];

/// One row of a rule table: any keyword in the set assigns the priority.
#[derive(Debug, Clone, Copy)]
pub struct TriageRule {
    pub keywords: &'static [&'static str],
    pub priority: Priority,
}

/// Ordered rule list for one emergency type. The first matching rule wins.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<TriageRule>,
}

impl RuleTable {
    /// Build the table for an emergency type.
    ///
    /// Order is type high, shared high, type medium, shared medium, type low.
    /// `General` gets the shared rules only.
    pub fn for_type(emergency_type: EmergencyType) -> Self {
        let (high, medium, low) = type_keywords(emergency_type);

        let rules = vec![
            TriageRule { keywords: high, priority: Priority::High },
            TriageRule { keywords: SHARED_HIGH, priority: Priority::High },
            TriageRule { keywords: medium, priority: Priority::Medium },
            TriageRule { keywords: SHARED_MEDIUM, priority: Priority::Medium },
            TriageRule { keywords: low, priority: Priority::Low },
        ];

        Self {
            rules: rules.into_iter().filter(|r| !r.keywords.is_empty()).collect(),
        }
    }

    pub fn rules(&self) -> &[TriageRule] {
        &self.rules
    }

    /// Scan the rules in order against `text` (case-insensitive substring).
    ///
    /// Returns the winning priority and keyword, or `(Low, None)`.
    pub fn evaluate(&self, text: &str) -> (Priority, Option<&'static str>) {
        let lower = text.to_lowercase();
        if lower.trim().is_empty() {
            return (Priority::Low, None);
        }

        for rule in &self.rules {
            if let Some(keyword) = rule.keywords.iter().find(|k| lower.contains(*k)) {
                return (rule.priority, Some(*keyword));
            }
        }

        (Priority::Low, None)
    }
}

/// Type-specific (high, medium, low) keyword lists.
pub fn type_keywords(
    emergency_type: EmergencyType,
) -> (&'static [&'static str], &'static [&'static str], &'static [&'static str]) {
    match emergency_type {
        EmergencyType::Medical => (MEDICAL_HIGH, MEDICAL_MEDIUM, MEDICAL_LOW),
        EmergencyType::Police => (POLICE_HIGH, POLICE_MEDIUM, POLICE_LOW),
        EmergencyType::Fire => (FIRE_HIGH, FIRE_MEDIUM, FIRE_LOW),
        EmergencyType::General => (&[], &[], &[]),
    }
}

/// Risk bucket from age and existing conditions. Reported, never used to
/// change the rule-table priority.
pub fn assess_risk(citizen: &Citizen) -> RiskLevel {
    let mut score = 0u32;

    if let Some(age) = citizen.age {
        if !(5..=65).contains(&age) {
            score += 2;
        } else if !(18..=50).contains(&age) {
            score += 1;
        }
    }

    score += 2 * citizen
        .medical_conditions
        .iter()
        .filter(|c| HIGH_RISK_CONDITIONS.contains(&c.trim().to_lowercase().as_str()))
        .count() as u32;

    match score {
        s if s >= 3 => RiskLevel::High,
        s if s >= 1 => RiskLevel::Medium,
        _ => RiskLevel::Low,
    }
}

/// Rule-based triage agent.
pub struct TriageAgent {
    medical: RuleTable,
    police: RuleTable,
    fire: RuleTable,
    general: RuleTable,
}

impl TriageAgent {
    pub fn new() -> Self {
        Self {
            medical: RuleTable::for_type(EmergencyType::Medical),
            police: RuleTable::for_type(EmergencyType::Police),
            fire: RuleTable::for_type(EmergencyType::Fire),
            general: RuleTable::for_type(EmergencyType::General),
        }
    }

    pub fn table(&self, emergency_type: EmergencyType) -> &RuleTable {
        match emergency_type {
            EmergencyType::Medical => &self.medical,
            EmergencyType::Police => &self.police,
            EmergencyType::Fire => &self.fire,
            EmergencyType::General => &self.general,
        }
    }

    /// Priority and urgency for raw text, without a full case.
    pub fn evaluate(&self, text: &str, emergency_type: EmergencyType) -> (Priority, Option<&'static str>) {
        self.table(emergency_type).evaluate(text)
    }
}

impl Default for TriageAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for TriageAgent {
    fn id(&self) -> &str {
        "triage_agent"
    }

    fn name(&self) -> &str {
        "Triage Agent"
    }
}

impl TriageEvaluator for TriageAgent {
    fn assess(&self, case: &Case) -> TriageAssessment {
        info!(
            agent = %self.id(),
            case_id = %case.case_id,
            emergency_type = %case.emergency_type,
            "Processing triage"
        );

        let (priority, matched) = self.evaluate(&case.symptoms, case.emergency_type);
        let risk = assess_risk(&case.citizen);

        debug!(
            priority = %priority,
            matched_keyword = ?matched,
            risk = ?risk,
            "Triage rule evaluated"
        );

        TriageAssessment {
            priority,
            urgency: priority.urgency(),
            matched_keyword: matched.map(String::from),
            assessment_method: "rule_based".into(),
            confidence: if priority == Priority::High {
                Confidence::High
            } else {
                Confidence::Medium
            },
            risk_factors: risk,
        }
    }
}
