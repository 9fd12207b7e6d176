//! Context record sent to the model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::answers::{keys, AnswerRecord, AnswerValue};

/// Structured summary of the answers, serialized as the user prompt payload.
///
/// Field order is the order the model sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryContext {
    pub age_range: String,
    pub living_situation: String,
    pub has_partner: bool,
    pub meds_complexity: String,
    pub mobility: String,
    pub falls: String,
    pub badls: Vec<String>,
    pub iadls: Vec<String>,
    pub memory_changes: String,
    pub behaviors: Vec<String>,
    pub isolation: String,
    pub move_preference: Option<i64>,
    pub flags: Vec<String>,
}

impl AdvisoryContext {
    /// Questionnaire keys win; scoring keys are the fallback.
    pub fn from_answers(answers: &AnswerRecord, flags: &BTreeSet<String>) -> Self {
        let text = |ids: &[&str], default: &str| {
            answers.first_text(ids).unwrap_or(default).to_string()
        };

        Self {
            age_range: text(&[keys::AGE_RANGE], "unknown"),
            living_situation: text(&[keys::LIVING_SITUATION], "unknown"),
            has_partner: matches!(
                answers.get(keys::HAS_PARTNER),
                Some(AnswerValue::Bool(true))
            ) || answers.text_lower(keys::HAS_PARTNER) == "yes",
            meds_complexity: text(&[keys::MEDICATION_MANAGEMENT, keys::MEDS_COMPLEXITY], "simple"),
            mobility: text(&[keys::MOBILITY_STATUS, keys::MOBILITY], "independent"),
            falls: text(&[keys::FALL_RISK, keys::FALLS], "no_falls"),
            badls: list_with_fallback(answers, keys::ADL_CHALLENGES, keys::BADLS),
            iadls: list_with_fallback(answers, keys::IADL_CHALLENGES, keys::IADLS),
            memory_changes: text(&[keys::MEMORY_CONCERNS, keys::MEMORY_CHANGES], "no_changes"),
            behaviors: list_with_fallback(answers, keys::BEHAVIOR_CONCERNS, keys::BEHAVIORS),
            isolation: text(&[keys::SOCIAL_ISOLATION], "minimal"),
            move_preference: [keys::MOVE_TIMELINE, keys::MOVE_PREFERENCE]
                .iter()
                .find_map(|id| answers.get(id).and_then(leading_integer)),
            flags: flags.iter().cloned().collect(),
        }
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// List items for `primary`, else `fallback`. A scalar text answer becomes a
/// one-element list.
fn list_with_fallback(answers: &AnswerRecord, primary: &str, fallback: &str) -> Vec<String> {
    [primary, fallback]
        .iter()
        .map(|id| match answers.get(id) {
            Some(AnswerValue::Text(text)) if !text.is_empty() => vec![text.clone()],
            Some(value) => value.text_items().into_iter().map(str::to_string).collect(),
            None => Vec::new(),
        })
        .find(|items| !items.is_empty())
        .unwrap_or_default()
}

/// Integer prefix of a numeric or text answer ("3 months" → 3).
fn leading_integer(value: &AnswerValue) -> Option<i64> {
    if let Some(number) = value.as_f64() {
        return Some(number.trunc() as i64);
    }

    let text = value.as_text()?.trim_start();
    let sign_len = usize::from(text.starts_with(['-', '+']));
    let digits = text[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    text[..sign_len + digits].parse().ok()
}
