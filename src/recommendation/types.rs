//! The `CareRecommendation` contract and its building blocks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::confidence::round1;
use super::flags::FlagObject;
use crate::adjudication::AdjudicationDecision;
use crate::advisory::LlmAdvice;
use crate::answers::{keys, AnswerRecord, AnswerValue};
use crate::scoring::{CategoryScores, ScoreCategory};
use crate::tier::CareTier;

/// Identifier of the rule set that produced a recommendation.
pub const RULE_SET_ID: &str = "standard_2025_q4";
/// Version of the contract layout.
pub const SCHEMA_VERSION: u32 = 2;
/// Confidence required before suggesting cost planning.
pub const COST_PLANNER_MIN_CONFIDENCE: f64 = 0.7;
/// Move preference at or above which a move is considered flexible.
pub const FLEXIBLE_MOVE_THRESHOLD: f64 = 3.0;

/// One entry of the tier ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierRanking {
    pub tier: CareTier,
    pub score: f64,
}

/// All five tiers ranked. The winner carries the real score, the rest their
/// range midpoint. Sorted descending; equal scores keep acuity order.
pub fn tier_rankings(total_score: f64, winner: CareTier) -> Vec<TierRanking> {
    let mut rankings: Vec<TierRanking> = CareTier::ALL
        .into_iter()
        .map(|tier| TierRanking {
            tier,
            score: if tier == winner {
                round1(total_score)
            } else {
                round1(tier.midpoint())
            },
        })
        .collect();
    rankings.sort_by(|a, b| b.score.total_cmp(&a.score));
    rankings
}

/// Product the user is pointed to next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextProduct {
    /// The guided care plan itself
    Gcp,
    CostPlanner,
}

impl NextProduct {
    pub fn choose(tier: CareTier, confidence: f64) -> Self {
        if confidence < COST_PLANNER_MIN_CONFIDENCE || tier == CareTier::None {
            Self::Gcp
        } else {
            Self::CostPlanner
        }
    }

    pub fn next_step(self) -> NextStep {
        match self {
            Self::CostPlanner => NextStep {
                product: self,
                label: "Estimate Care Costs".to_string(),
                description: "Use Cost Planner to understand monthly costs and affordability."
                    .to_string(),
            },
            Self::Gcp => NextStep {
                product: self,
                label: "Review Guided Care Plan".to_string(),
                description: "Provide more detail so Navi can refine this recommendation."
                    .to_string(),
            },
        }
    }
}

/// Call-to-action card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextStep {
    pub product: NextProduct,
    pub label: String,
    pub description: String,
}

/// Preferences derived from the answers. Empty when nothing numeric was given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Derived {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_preference: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_move_flexible: Option<bool>,
}

impl Derived {
    /// The first present of `move_preference` / `move_timeline` decides; a
    /// present but non-numeric value yields nothing.
    pub fn from_answers(answers: &AnswerRecord) -> Self {
        let value = [keys::MOVE_PREFERENCE, keys::MOVE_TIMELINE]
            .iter()
            .find_map(|id| answers.get(id).filter(|v| !matches!(v, AnswerValue::Null)));

        match value.and_then(AnswerValue::coerce_f64) {
            Some(preference) => Self {
                move_preference: Some(preference),
                is_move_flexible: Some(preference >= FLEXIBLE_MOVE_THRESHOLD),
            },
            None => Self::default(),
        }
    }
}

/// Category totals under the legacy field names.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawScores {
    pub total_score: f64,
    pub cognitive_score: f64,
    pub adl_score: f64,
    pub safety_score: f64,
    pub mobility_score: f64,
}

impl RawScores {
    pub fn new(total_score: f64, by_category: &CategoryScores) -> Self {
        Self {
            total_score: round1(total_score),
            cognitive_score: round1(by_category.get(ScoreCategory::Cognition)),
            adl_score: round1(by_category.get(ScoreCategory::Adl)),
            safety_score: round1(by_category.get(ScoreCategory::Safety)),
            mobility_score: round1(by_category.get(ScoreCategory::Mobility)),
        }
    }
}

/// What the deterministic path alone would have produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeterministicResult {
    pub tier: CareTier,
    pub confidence: f64,
    pub score: f64,
}

/// Summary of accepted model advice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResult {
    pub tier: CareTier,
    pub confidence: f64,
    pub reasons: Vec<String>,
    pub navi_messages: Vec<String>,
}

impl From<&LlmAdvice> for LlmResult {
    fn from(advice: &LlmAdvice) -> Self {
        Self {
            tier: advice.tier,
            confidence: super::confidence::round2(advice.confidence.clamp(0.0, 1.0)),
            reasons: advice.reasons.clone(),
            navi_messages: advice.navi_messages.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    #[default]
    Complete,
}

/// Content-derived id of an answer record: first 16 hex chars of the SHA-256
/// of its key-sorted JSON.
pub fn snapshot_id(answers: &AnswerRecord) -> String {
    let canonical = serde_json::to_string(answers).unwrap_or_else(|_| "{}".to_string());
    let digest = Sha256::digest(canonical.as_bytes());
    let hex = format!("{:x}", digest);
    hex[..16].to_string()
}

/// The final recommendation returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareRecommendation {
    pub tier: CareTier,
    pub tier_score: f64,
    pub tier_rankings: Vec<TierRanking>,
    pub confidence: f64,
    pub flags: Vec<FlagObject>,
    pub rationale: Vec<String>,
    pub suggested_next_product: NextProduct,
    pub derived: Derived,
    /// Acuity order
    pub allowed_tiers: Vec<CareTier>,
    pub generated_at: DateTime<Utc>,
    pub version: String,
    pub input_snapshot_id: String,
    pub rule_set: String,
    pub next_step: NextStep,
    pub status: RecommendationStatus,
    pub last_updated: DateTime<Utc>,
    pub needs_refresh: bool,
    pub schema_version: u32,
    pub assessment_id: String,
    pub user_inputs: AnswerRecord,
    pub score_breakdown: CategoryScores,
    pub adjudication: AdjudicationDecision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_advice: Option<LlmAdvice>,
    pub timestamp: DateTime<Utc>,
    pub deterministic_result: DeterministicResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_result: Option<LlmResult>,
    /// Legacy alias of `tier`
    pub recommendation: CareTier,
    /// Legacy category summary
    pub raw_scores: RawScores,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rankings_winner_keeps_true_score() {
        let rankings = tier_rankings(0.0, CareTier::None);
        let tiers: Vec<CareTier> = rankings.iter().map(|r| r.tier).collect();
        assert_eq!(
            tiers,
            vec![
                CareTier::MemoryCareHighAcuity,
                CareTier::MemoryCare,
                CareTier::AssistedLiving,
                CareTier::InHome,
                CareTier::None,
            ]
        );
        assert_eq!(rankings[4].score, 0.0);
        assert_eq!(rankings[0].score, 70.0);
    }

    #[test]
    fn test_rankings_ties_keep_acuity_order() {
        // assisted living midpoint is 20.5; a 20.5 in-home winner ties it
        let rankings = tier_rankings(20.5, CareTier::InHome);
        assert_eq!(rankings[2].tier, CareTier::InHome);
        assert_eq!(rankings[3].tier, CareTier::AssistedLiving);
        assert_eq!(rankings.len(), 5);
    }

    #[test]
    fn test_next_product_rule() {
        assert_eq!(NextProduct::choose(CareTier::AssistedLiving, 0.7), NextProduct::CostPlanner);
        assert_eq!(NextProduct::choose(CareTier::AssistedLiving, 0.69), NextProduct::Gcp);
        assert_eq!(NextProduct::choose(CareTier::None, 0.99), NextProduct::Gcp);
        assert_eq!(NextProduct::Gcp.next_step().label, "Review Guided Care Plan");
        assert_eq!(NextProduct::CostPlanner.next_step().label, "Estimate Care Costs");
    }

    #[test]
    fn test_derived_preferences() {
        let derived = Derived::from_answers(&AnswerRecord::new().with("move_timeline", "4"));
        assert_eq!(derived.move_preference, Some(4.0));
        assert_eq!(derived.is_move_flexible, Some(true));

        let derived = Derived::from_answers(
            &AnswerRecord::new().with("move_preference", 2i64).with("move_timeline", "9"),
        );
        assert_eq!(derived.is_move_flexible, Some(false));

        let derived = Derived::from_answers(&AnswerRecord::new().with("move_preference", "asap"));
        assert_eq!(derived, Derived::default());
        assert_eq!(serde_json::to_string(&derived).unwrap(), "{}");
    }

    #[test]
    fn test_snapshot_id_is_order_independent() {
        let a = AnswerRecord::new().with("falls", "one").with("badls", vec!["bathing"]);
        let b = AnswerRecord::new().with("badls", vec!["bathing"]).with("falls", "one");
        let id = snapshot_id(&a);
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(id, snapshot_id(&b));
        assert_ne!(id, snapshot_id(&AnswerRecord::new()));
    }

    #[test]
    fn test_raw_scores_rounding() {
        let mut categories = CategoryScores::default();
        categories.add(ScoreCategory::Cognition, 7.25);
        categories.add(ScoreCategory::General, 1.0);
        let raw = RawScores::new(8.25, &categories);
        assert_eq!(raw.cognitive_score, 7.3);
        assert_eq!(raw.adl_score, 0.0);
        assert_eq!(raw.total_score, 8.3);
    }
}
