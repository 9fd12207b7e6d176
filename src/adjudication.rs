//! Reconciliation of the deterministic tier with model advice.
//!
//! The decision record is always produced, including when the model was
//! never asked, so every recommendation carries an audit trail.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use crate::advisory::AdvisoryOutcome;
use crate::gating::BandSnapshot;
use crate::tier::{AllowedTiers, CareTier};

/// Which engine the final tier came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjudicationSource {
    Llm,
    Fallback,
}

/// Reason code recorded with every decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjudicationReason {
    /// Model not consulted
    DeterministicOnly,
    LlmValid,
    /// Model consulted but produced no tier (timeout, rate limit, transport)
    LlmTimeout,
    /// Canonical tier removed by gating
    LlmGuardDisallow,
    /// Reply failed validation
    LlmInvalidUnknown,
    DoubleMissingDefault,
}

impl AdjudicationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeterministicOnly => "deterministic_only",
            Self::LlmValid => "llm_valid",
            Self::LlmTimeout => "llm_timeout",
            Self::LlmGuardDisallow => "llm_guard_disallow",
            Self::LlmInvalidUnknown => "llm_invalid_unknown",
            Self::DoubleMissingDefault => "double_missing_default",
        }
    }
}

impl fmt::Display for AdjudicationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the model contributed to one request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LlmOpinion {
    /// No tier at all
    Absent,
    /// A reply arrived but failed validation
    Rejected,
    Tier { tier: CareTier, confidence: f64 },
}

impl LlmOpinion {
    pub fn tier(&self) -> Option<CareTier> {
        match self {
            Self::Tier { tier, .. } => Some(*tier),
            _ => None,
        }
    }

    pub fn confidence(&self) -> Option<f64> {
        match self {
            Self::Tier { confidence, .. } => Some(*confidence),
            _ => None,
        }
    }
}

impl From<&AdvisoryOutcome> for LlmOpinion {
    fn from(outcome: &AdvisoryOutcome) -> Self {
        match outcome {
            AdvisoryOutcome::Accepted { advice, .. } => Self::Tier {
                tier: advice.tier,
                confidence: advice.confidence,
            },
            AdvisoryOutcome::Rejected { .. } => Self::Rejected,
            AdvisoryOutcome::Disabled
            | AdvisoryOutcome::TimedOut { .. }
            | AdvisoryOutcome::Unavailable { .. } => Self::Absent,
        }
    }
}

/// Audit record for one adjudication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjudicationDecision {
    pub det: Option<CareTier>,
    pub llm: Option<CareTier>,
    pub conf: Option<f64>,
    /// Allowed tiers, alphabetical
    pub allowed: Vec<CareTier>,
    pub bands: BandSnapshot,
    pub risky: bool,
    pub source: AdjudicationSource,
    pub adjudication_reason: AdjudicationReason,
}

impl AdjudicationDecision {
    fn new(
        det: Option<CareTier>,
        opinion: &LlmOpinion,
        allowed: &AllowedTiers,
        bands: BandSnapshot,
        risky: bool,
    ) -> Self {
        let mut allowed = allowed.to_vec();
        allowed.sort_by_key(CareTier::as_str);
        Self {
            det,
            llm: opinion.tier(),
            conf: opinion.confidence(),
            allowed,
            bands,
            risky,
            source: AdjudicationSource::Fallback,
            adjudication_reason: AdjudicationReason::DeterministicOnly,
        }
    }
}

/// Record for a request where the model was not consulted.
pub fn deterministic_only(
    det: CareTier,
    allowed: &AllowedTiers,
    bands: BandSnapshot,
    risky: bool,
) -> (CareTier, AdjudicationDecision) {
    let decision = AdjudicationDecision::new(Some(det), &LlmOpinion::Absent, allowed, bands, risky);
    (det, decision)
}

/// Choose the final tier.
///
/// A model tier wins only if it survived gating. Otherwise the deterministic
/// tier is used, or the hard default if there is none.
pub fn adjudicate(
    det: Option<CareTier>,
    allowed: &AllowedTiers,
    opinion: &LlmOpinion,
    bands: BandSnapshot,
    risky: bool,
) -> (CareTier, AdjudicationDecision) {
    let mut decision = AdjudicationDecision::new(det, opinion, allowed, bands, risky);

    let tier = match (det, opinion.tier()) {
        (None, None) => {
            decision.adjudication_reason = AdjudicationReason::DoubleMissingDefault;
            CareTier::HARD_DEFAULT
        }
        (_, Some(llm)) if allowed.contains(llm) => {
            decision.source = AdjudicationSource::Llm;
            decision.adjudication_reason = AdjudicationReason::LlmValid;
            llm
        }
        (det, llm) => {
            decision.adjudication_reason = match (llm, opinion) {
                (Some(_), _) => AdjudicationReason::LlmGuardDisallow,
                (None, LlmOpinion::Rejected) => AdjudicationReason::LlmInvalidUnknown,
                (None, _) => AdjudicationReason::LlmTimeout,
            };
            det.unwrap_or(CareTier::HARD_DEFAULT)
        }
    };

    if let (Some(det), Some(llm)) = (det, opinion.tier()) {
        if det != llm {
            warn!(
                det = %det,
                llm = %llm,
                reason = %decision.adjudication_reason,
                "Deterministic and LLM tiers disagree"
            );
        }
    }

    info!(
        chosen = %tier,
        llm = ?decision.llm,
        det = ?decision.det,
        source = ?decision.source,
        allowed = ?decision.allowed,
        reason = %decision.adjudication_reason,
        "Adjudication"
    );

    (tier, decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gating::{CognitionBand, SupportBand};
    use pretty_assertions::assert_eq;

    fn bands() -> BandSnapshot {
        BandSnapshot {
            cog: CognitionBand::Moderate,
            sup: SupportBand::High,
        }
    }

    fn gated() -> AllowedTiers {
        let mut allowed = AllowedTiers::all();
        allowed.remove_memory_care();
        allowed
    }

    fn llm(tier: CareTier) -> LlmOpinion {
        LlmOpinion::Tier {
            tier,
            confidence: 0.8,
        }
    }

    #[test]
    fn test_valid_llm_tier_wins() {
        let (tier, decision) = adjudicate(
            Some(CareTier::InHome),
            &gated(),
            &llm(CareTier::AssistedLiving),
            bands(),
            false,
        );
        assert_eq!(tier, CareTier::AssistedLiving);
        assert_eq!(decision.source, AdjudicationSource::Llm);
        assert_eq!(decision.adjudication_reason, AdjudicationReason::LlmValid);
        assert_eq!(decision.conf, Some(0.8));
    }

    #[test]
    fn test_gated_llm_tier_falls_back() {
        let (tier, decision) = adjudicate(
            Some(CareTier::AssistedLiving),
            &gated(),
            &llm(CareTier::MemoryCare),
            bands(),
            false,
        );
        assert_eq!(tier, CareTier::AssistedLiving);
        assert_eq!(decision.source, AdjudicationSource::Fallback);
        assert_eq!(decision.adjudication_reason, AdjudicationReason::LlmGuardDisallow);
        assert_eq!(decision.llm, Some(CareTier::MemoryCare));
    }

    #[test]
    fn test_missing_and_rejected_reasons() {
        let (_, decision) =
            adjudicate(Some(CareTier::None), &gated(), &LlmOpinion::Absent, bands(), false);
        assert_eq!(decision.adjudication_reason, AdjudicationReason::LlmTimeout);

        let (tier, decision) =
            adjudicate(Some(CareTier::None), &gated(), &LlmOpinion::Rejected, bands(), false);
        assert_eq!(tier, CareTier::None);
        assert_eq!(decision.adjudication_reason, AdjudicationReason::LlmInvalidUnknown);
        assert_eq!(decision.llm, None);
    }

    #[test]
    fn test_double_missing_uses_hard_default() {
        let (tier, decision) = adjudicate(None, &gated(), &LlmOpinion::Absent, bands(), true);
        assert_eq!(tier, CareTier::AssistedLiving);
        assert_eq!(decision.adjudication_reason, AdjudicationReason::DoubleMissingDefault);
        assert!(decision.risky);
    }

    #[test]
    fn test_deterministic_only_record() {
        let (tier, decision) = deterministic_only(CareTier::InHome, &gated(), bands(), false);
        assert_eq!(tier, CareTier::InHome);
        assert_eq!(decision.source, AdjudicationSource::Fallback);
        assert_eq!(decision.adjudication_reason, AdjudicationReason::DeterministicOnly);
        assert_eq!(
            decision.allowed,
            vec![CareTier::AssistedLiving, CareTier::InHome, CareTier::None]
        );
    }

    #[test]
    fn test_decision_json_shape() {
        let (_, decision) = deterministic_only(CareTier::None, &AllowedTiers::all(), bands(), false);
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["adjudication_reason"], "deterministic_only");
        assert_eq!(json["source"], "fallback");
        assert_eq!(json["bands"]["sup"], "high");
        assert_eq!(json["llm"], serde_json::Value::Null);
    }
}
