//! Deterministic questionnaire scoring.
//!
//! - **Extraction**: per-question, per-section and per-category scores plus
//!   completion counters ([`score_module`])
//! - **Flags**: deduplicated risk flags from selected options ([`collect_flags`])
//! - **Categories**: keyword-inferred score buckets ([`ScoreCategory`])

mod category;
mod extract;
mod flags;

pub use category::{CategoryScores, ScoreCategory};
pub use extract::{
    score_module, ScoreEntry, ScoreSheet, ScoringDetails, SectionDetail, SectionScore,
};
pub use flags::collect_flags;
