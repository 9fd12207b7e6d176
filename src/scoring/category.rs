//! Score categories inferred from question ids.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::answers::finite_or_zero;

/// Bucket a question's score is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCategory {
    Cognition,
    Adl,
    Safety,
    Mobility,
    General,
}

impl ScoreCategory {
    pub const ALL: [ScoreCategory; 5] = [
        ScoreCategory::Cognition,
        ScoreCategory::Adl,
        ScoreCategory::Safety,
        ScoreCategory::Mobility,
        ScoreCategory::General,
    ];

    /// Keyword heuristic over the question id. First match wins, in the
    /// order cognition, adl, safety, mobility; ids matching nothing are
    /// `General`. This is not validated against the schema, so a question
    /// named without one of the keywords is silently categorised as general.
    pub fn infer(question_id: &str) -> Self {
        let id = question_id.to_lowercase();
        if id.contains("memory") || id.contains("cogn") {
            Self::Cognition
        } else if id.contains("adl") || id.contains("daily") {
            Self::Adl
        } else if id.contains("fall") || id.contains("safety") {
            Self::Safety
        } else if id.contains("mobil") {
            Self::Mobility
        } else {
            Self::General
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cognition => "cognition",
            Self::Adl => "adl",
            Self::Safety => "safety",
            Self::Mobility => "mobility",
            Self::General => "general",
        }
    }
}

/// Running totals per category. Every category is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryScores(BTreeMap<ScoreCategory, f64>);

impl Default for CategoryScores {
    fn default() -> Self {
        Self(ScoreCategory::ALL.into_iter().map(|c| (c, 0.0)).collect())
    }
}

impl CategoryScores {
    pub fn add(&mut self, category: ScoreCategory, score: f64) {
        let total = self.0.entry(category).or_insert(0.0);
        *total = finite_or_zero(*total + score);
    }

    pub fn get(&self, category: ScoreCategory) -> f64 {
        self.0.get(&category).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScoreCategory, f64)> + '_ {
        self.0.iter().map(|(c, s)| (*c, *s))
    }
}
