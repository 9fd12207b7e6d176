//! Eligibility gates that narrow the allowed-tier set.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::bands::{
    cognition_band, has_risky_behavior, is_high_risk, risky_behavior_count, support_band,
    BandSnapshot, CognitionBand, SupportBand,
};
use crate::answers::{keys, AnswerRecord};
use crate::tier::AllowedTiers;

/// Answer value confirming a cognitive diagnosis.
pub const DX_CONFIRMED: &str = "dx_yes";

/// Policy switches for the gating engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Strip memory care for moderate cognition × high support without risky behavior
    pub behavior_gate_enabled: bool,
}

impl GateConfig {
    pub fn with_behavior_gate(mut self, enabled: bool) -> Self {
        self.behavior_gate_enabled = enabled;
        self
    }
}

/// Everything the gating engine derived for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct GateOutcome {
    pub allowed: AllowedTiers,
    pub cognitive_gate_passed: bool,
    pub behavior_gate_applied: bool,
    pub cognition: CognitionBand,
    /// Uncollapsed support band (may be 24h)
    pub support: SupportBand,
    pub risky: bool,
}

impl GateOutcome {
    pub fn bands(&self) -> BandSnapshot {
        BandSnapshot {
            cog: self.cognition,
            sup: self.support.for_routing(),
        }
    }
}

/// Memory-care eligibility.
///
/// Passes only with a confirmed diagnosis plus at least one of: moderate or
/// severe memory changes, a high-risk behavior, or a high-risk flag. A
/// missing diagnosis answer fails the gate just like an explicit "no".
pub fn cognitive_gate(answers: &AnswerRecord, flags: &BTreeSet<String>) -> bool {
    if answers.text_lower(keys::COGNITIVE_DX_CONFIRM) != DX_CONFIRMED {
        return false;
    }

    let memory = answers.text_lower(keys::MEMORY_CHANGES);
    if memory == "moderate" || memory == "severe" {
        return true;
    }

    if risky_behavior_count(answers) > 0 {
        return true;
    }

    flags.iter().any(|flag| is_high_risk(flag))
}

/// Remove memory care when moderate cognition meets high support with no
/// behavioral evidence. No-op unless enabled. Returns whether it fired.
pub fn apply_behavior_gate(
    allowed: &mut AllowedTiers,
    bands: BandSnapshot,
    risky: bool,
    config: &GateConfig,
) -> bool {
    if config.behavior_gate_enabled
        && bands.cog == CognitionBand::Moderate
        && bands.sup == SupportBand::High
        && !risky
    {
        allowed.remove_memory_care();
        info!("Behavior gate active (moderate x high without risky behaviors)");
        return true;
    }
    false
}

/// Classify bands and run both gates over a fresh allowed-tier set.
pub fn evaluate_gates(
    answers: &AnswerRecord,
    flags: &BTreeSet<String>,
    config: &GateConfig,
) -> GateOutcome {
    let cognition = cognition_band(answers);
    let support = support_band(answers);
    let risky = has_risky_behavior(answers, flags);
    let mut allowed = AllowedTiers::all();

    let cognitive_gate_passed = cognitive_gate(answers, flags);
    if !cognitive_gate_passed {
        allowed.remove_memory_care();
        info!("Cognitive gate failed - removing memory care tiers");
    }

    let bands = BandSnapshot {
        cog: cognition,
        sup: support.for_routing(),
    };
    let behavior_gate_applied = apply_behavior_gate(&mut allowed, bands, risky, config);

    GateOutcome {
        allowed,
        cognitive_gate_passed,
        behavior_gate_applied,
        cognition,
        support,
        risky,
    }
}
