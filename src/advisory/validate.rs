//! Advice parsing, schema validation and forbidden-term filtering.

use regex::Regex;
use serde_json::{Map, Value};
use tracing::warn;

use super::types::{AdviceRejection, LlmAdvice};
use crate::error::{Error, Result};
use crate::tier::CareTier;

/// Pull a JSON object out of a model reply.
///
/// Bare JSON is tried first; otherwise the span from the first `{` to the
/// last `}` is parsed.
pub fn extract_json(raw: &str) -> std::result::Result<Value, AdviceRejection> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AdviceRejection::EmptyResponse);
    }

    match serde_json::from_str(trimmed) {
        Ok(value) => Ok(value),
        Err(first_err) => {
            let span = trimmed
                .find('{')
                .zip(trimmed.rfind('}'))
                .filter(|(start, end)| end > start)
                .map(|(start, end)| &trimmed[start..=end]);
            span.and_then(|s| serde_json::from_str(s).ok())
                .ok_or_else(|| AdviceRejection::Unparsable(first_err.to_string()))
        }
    }
}

/// Validate a parsed reply against the advice schema.
pub fn validate_advice(value: &Value) -> std::result::Result<LlmAdvice, AdviceRejection> {
    let obj = value.as_object().ok_or(AdviceRejection::NotAnObject)?;

    let tier = match obj.get("tier") {
        None | Some(Value::Null) => return Err(AdviceRejection::MissingTier),
        Some(Value::String(s)) if s.is_empty() => return Err(AdviceRejection::MissingTier),
        Some(Value::String(s)) => {
            CareTier::parse(s).ok_or_else(|| AdviceRejection::NonCanonicalTier(s.clone()))?
        }
        Some(other) => return Err(AdviceRejection::NonCanonicalTier(other.to_string())),
    };

    let confidence = obj
        .get("confidence")
        .and_then(Value::as_f64)
        .filter(|c| c.is_finite() && (0.0..=1.0).contains(c))
        .ok_or(AdviceRejection::InvalidConfidence)?;

    Ok(LlmAdvice {
        tier,
        reasons: string_list(obj, "reasons")?,
        risks: string_list(obj, "risks")?,
        navi_messages: string_list(obj, "navi_messages")?,
        questions_next: string_list(obj, "questions_next")?,
        confidence,
    })
}

/// Missing or null lists default to empty; anything else must be strings.
fn string_list(
    obj: &Map<String, Value>,
    field: &'static str,
) -> std::result::Result<Vec<String>, AdviceRejection> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or(AdviceRejection::InvalidList(field))
            })
            .collect(),
        Some(_) => Err(AdviceRejection::InvalidList(field)),
    }
}

/// Extract and validate in one step.
pub fn parse_advice(raw: &str) -> std::result::Result<LlmAdvice, AdviceRejection> {
    validate_advice(&extract_json(raw)?)
}

/// Case-insensitive filter that drops list entries mentioning a forbidden term.
#[derive(Debug, Clone)]
pub struct ForbiddenTermFilter {
    pattern: Option<Regex>,
}

impl ForbiddenTermFilter {
    /// Build a filter for `terms`. Whitespace inside a term matches any run
    /// of whitespace.
    pub fn new<S: AsRef<str>>(terms: &[S]) -> Result<Self> {
        let alternatives: Vec<String> = terms
            .iter()
            .map(|term| {
                term.as_ref()
                    .split_whitespace()
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(r"\s+")
            })
            .filter(|alt| !alt.is_empty())
            .collect();

        if alternatives.is_empty() {
            return Ok(Self { pattern: None });
        }

        let pattern = Regex::new(&format!("(?i)(?:{})", alternatives.join("|")))
            .map_err(|e| Error::config(format!("invalid forbidden term pattern: {}", e)))?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    pub fn is_forbidden(&self, text: &str) -> bool {
        self.pattern.as_ref().is_some_and(|re| re.is_match(text))
    }

    /// Remove offending entries from every text list. Returns how many were dropped.
    pub fn apply(&self, advice: &mut LlmAdvice) -> usize {
        let mut dropped = 0;
        for (field, list) in [
            ("reasons", &mut advice.reasons),
            ("risks", &mut advice.risks),
            ("navi_messages", &mut advice.navi_messages),
            ("questions_next", &mut advice.questions_next),
        ] {
            let before = list.len();
            list.retain(|entry| !self.is_forbidden(entry));
            let removed = before - list.len();
            if removed > 0 {
                warn!(field, removed, "Dropped advice entries containing forbidden terms");
            }
            dropped += removed;
        }
        dropped
    }
}
