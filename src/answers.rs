//! Raw questionnaire answers.
//!
//! Answers arrive as arbitrary JSON keyed by question id. [`AnswerValue`]
//! gives each shape its own variant so the score extractor can check it
//! against the question's declared kind instead of inspecting it ad hoc.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// Question ids the gates, bands and advisory context read directly.
pub mod keys {
    pub const COGNITIVE_DX_CONFIRM: &str = "cognitive_dx_confirm";
    pub const MEMORY_CHANGES: &str = "memory_changes";
    pub const BEHAVIORS: &str = "behaviors";
    pub const BADLS: &str = "badls";
    pub const IADLS: &str = "iadls";
    pub const MOBILITY: &str = "mobility";
    pub const MOBILITY_STATUS: &str = "mobility_status";
    pub const FALLS: &str = "falls";
    pub const MEDS_COMPLEXITY: &str = "meds_complexity";
    pub const MOVE_PREFERENCE: &str = "move_preference";
    pub const MOVE_TIMELINE: &str = "move_timeline";

    // Questionnaire-facing names used by the advisory context
    pub const AGE_RANGE: &str = "age_range";
    pub const LIVING_SITUATION: &str = "living_situation";
    pub const HAS_PARTNER: &str = "has_partner";
    pub const MEDICATION_MANAGEMENT: &str = "medication_management";
    pub const FALL_RISK: &str = "fall_risk";
    pub const ADL_CHALLENGES: &str = "adl_challenges";
    pub const IADL_CHALLENGES: &str = "iadl_challenges";
    pub const MEMORY_CONCERNS: &str = "memory_concerns";
    pub const BEHAVIOR_CONCERNS: &str = "behavior_concerns";
    pub const SOCIAL_ISOLATION: &str = "social_isolation";
}

/// A single answer in one of the shapes the questionnaire produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    List(Vec<AnswerValue>),
    /// Objects and anything else the form may post; never scored.
    Other(Value),
}

impl AnswerValue {
    /// Build a numeric answer. Non-finite input coerces to zero.
    pub fn number(value: f64) -> Self {
        Self::Number(Number::from_f64(value).unwrap_or_else(|| Number::from(0)))
    }

    /// An answer counts when it is present and not blank.
    pub fn is_answered(&self) -> bool {
        match self {
            Self::Null | Self::Other(_) => false,
            Self::Bool(_) | Self::Number(_) => true,
            Self::Text(text) => !text.trim().is_empty(),
            Self::List(items) => items.iter().any(AnswerValue::is_answered),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Numeric value of a number answer, coerced to zero if non-finite.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(finite_or_zero(number.as_f64().unwrap_or(0.0))),
            _ => None,
        }
    }

    /// Number answers as-is, numeric strings parsed. Anything else is `None`.
    pub fn coerce_f64(&self) -> Option<f64> {
        match self {
            Self::Number(_) => self.as_f64(),
            Self::Text(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AnswerValue]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Text items of a list answer; non-text items are skipped.
    pub fn text_items(&self) -> Vec<&str> {
        self.as_list()
            .map(|items| items.iter().filter_map(AnswerValue::as_text).collect())
            .unwrap_or_default()
    }
}

/// Non-finite numbers (overflow, NaN) count as zero.
pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for AnswerValue {
    fn from(value: f64) -> Self {
        Self::number(value)
    }
}

impl From<i64> for AnswerValue {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<&str>> for AnswerValue {
    fn from(values: Vec<&str>) -> Self {
        Self::List(values.into_iter().map(AnswerValue::from).collect())
    }
}

/// Answers for one submission, keyed by question id.
///
/// Keys are kept sorted so serialization (and therefore the snapshot id)
/// is independent of submission order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerRecord(BTreeMap<String, AnswerValue>);

impl AnswerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interpret a JSON value as an answer record. Non-objects yield an empty record.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(
                map.into_iter()
                    .map(|(key, value)| {
                        let answer =
                            serde_json::from_value(value.clone()).unwrap_or(AnswerValue::Other(value));
                        (key, answer)
                    })
                    .collect(),
            ),
            _ => Self::default(),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, question_id: impl Into<String>, value: impl Into<AnswerValue>) -> Self {
        self.insert(question_id, value);
        self
    }

    pub fn insert(&mut self, question_id: impl Into<String>, value: impl Into<AnswerValue>) {
        self.0.insert(question_id.into(), value.into());
    }

    pub fn get(&self, question_id: &str) -> Option<&AnswerValue> {
        self.0.get(question_id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_answered(&self, question_id: &str) -> bool {
        self.get(question_id).is_some_and(AnswerValue::is_answered)
    }

    /// Lower-cased text answer, empty when absent or not text.
    pub fn text_lower(&self, question_id: &str) -> String {
        self.get(question_id)
            .and_then(AnswerValue::as_text)
            .map(str::to_lowercase)
            .unwrap_or_default()
    }

    /// First non-empty text answer among `question_ids`, as given.
    pub fn first_text(&self, question_ids: &[&str]) -> Option<&str> {
        question_ids.iter().find_map(|id| {
            self.get(id)
                .and_then(AnswerValue::as_text)
                .filter(|text| !text.is_empty())
        })
    }

    /// Text items of a list answer, empty when absent or not a list.
    pub fn list(&self, question_id: &str) -> Vec<&str> {
        self.get(question_id)
            .map(AnswerValue::text_items)
            .unwrap_or_default()
    }

    /// Number of entries in a list answer, including non-text items.
    pub fn list_len(&self, question_id: &str) -> usize {
        self.get(question_id)
            .and_then(AnswerValue::as_list)
            .map(<[AnswerValue]>::len)
            .unwrap_or(0)
    }

    /// Canonical JSON form used for echoing and hashing.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Object(Default::default()))
    }
}

impl FromIterator<(String, AnswerValue)> for AnswerRecord {
    fn from_iter<I: IntoIterator<Item = (String, AnswerValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
