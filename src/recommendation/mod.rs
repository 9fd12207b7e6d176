//! Recommendation contract and the builders that fill it.
//!
//! - **Confidence**: completeness and boundary distance, or model confidence
//! - **Rationale**: headline plus top scoring sections, at most six lines
//! - **Flags**: catalog-resolved flag objects ordered by priority
//! - **Contract**: [`CareRecommendation`] with rankings, next step, snapshot
//!   id and the legacy aliases older consumers read

mod confidence;
mod flags;
mod rationale;
mod types;

pub use confidence::{
    deterministic_confidence, final_confidence, round1, round2, MAX_DETERMINISTIC_CONFIDENCE,
    MIN_DETERMINISTIC_CONFIDENCE,
};
pub use flags::{
    FlagCatalog, FlagMetadata, FlagObject, DEFAULT_FLAG_DESCRIPTION, DEFAULT_FLAG_PRIORITY,
    DEFAULT_FLAG_TONE,
};
pub use rationale::{build_rationale, titleize, MAX_RATIONALE_LINES};
pub use types::{
    snapshot_id, tier_rankings, CareRecommendation, DeterministicResult, Derived, LlmResult,
    NextProduct, NextStep, RawScores, RecommendationStatus, TierRanking,
    COST_PLANNER_MIN_CONFIDENCE, FLEXIBLE_MOVE_THRESHOLD, RULE_SET_ID, SCHEMA_VERSION,
};
