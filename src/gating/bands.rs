//! Cognition and support band classifiers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::answers::{keys, AnswerRecord};

/// Behaviors (and flags) that count as evidence of cognitive risk.
pub const HIGH_RISK_BEHAVIORS: [&str; 6] = [
    "wandering",
    "elopement",
    "aggression",
    "severe_sundowning",
    "severe_cognitive_risk",
    "memory_support",
];

pub fn is_high_risk(behavior: &str) -> bool {
    let lowered = behavior.to_lowercase();
    HIGH_RISK_BEHAVIORS.contains(&lowered.as_str())
}

/// Ordinal cognition classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CognitionBand {
    None,
    Mild,
    Moderate,
    High,
}

impl CognitionBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }
}

impl fmt::Display for CognitionBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordinal support-need classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SupportBand {
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "moderate")]
    Moderate,
    #[serde(rename = "high")]
    High,
    #[serde(rename = "24h")]
    AroundTheClock,
}

impl SupportBand {
    /// Band used for tier-map routing; 24h collapses to high.
    pub fn for_routing(self) -> Self {
        match self {
            Self::AroundTheClock => Self::High,
            other => other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::AroundTheClock => "24h",
        }
    }
}

impl fmt::Display for SupportBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bands as recorded in the adjudication audit (support already collapsed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandSnapshot {
    pub cog: CognitionBand,
    pub sup: SupportBand,
}

/// Number of high-risk entries in the behavior answer. Duplicates count.
pub fn risky_behavior_count(answers: &AnswerRecord) -> usize {
    answers
        .list(keys::BEHAVIORS)
        .into_iter()
        .filter(|b| is_high_risk(b))
        .count()
}

/// Whether any high-risk behavior appears in the answers or the flag set.
pub fn has_risky_behavior(answers: &AnswerRecord, flags: &BTreeSet<String>) -> bool {
    risky_behavior_count(answers) > 0 || flags.iter().any(|flag| is_high_risk(flag))
}

pub fn cognition_band(answers: &AnswerRecord) -> CognitionBand {
    let memory = answers.text_lower(keys::MEMORY_CHANGES);
    let risky = risky_behavior_count(answers);

    if memory == "severe" || risky >= 2 {
        CognitionBand::High
    } else if memory == "moderate" || risky >= 1 {
        CognitionBand::Moderate
    } else if memory == "mild" {
        CognitionBand::Mild
    } else {
        CognitionBand::None
    }
}

pub fn support_band(answers: &AnswerRecord) -> SupportBand {
    let badls = answers.list_len(keys::BADLS);
    let iadls = answers.list_len(keys::IADLS);
    let mobility = match answers.text_lower(keys::MOBILITY) {
        m if m.is_empty() => answers.text_lower(keys::MOBILITY_STATUS),
        m => m,
    };
    let falls = answers.text_lower(keys::FALLS);
    let meds = answers.text_lower(keys::MEDS_COMPLEXITY);

    let limited_mobility = matches!(mobility.as_str(), "walker" | "cane");
    let has_fallen = matches!(falls.as_str(), "one" | "multiple");

    if matches!(mobility.as_str(), "wheelchair" | "bedbound") || (badls >= 3 && falls == "multiple")
    {
        SupportBand::AroundTheClock
    } else if badls >= 2 || (limited_mobility && has_fallen) {
        SupportBand::High
    } else if iadls >= 2 || badls >= 1 || matches!(meds.as_str(), "moderate" | "complex") {
        SupportBand::Moderate
    } else {
        SupportBand::Low
    }
}
