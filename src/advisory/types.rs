//! Advisory mode, configuration, advice and outcome types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::warn;

use crate::tier::CareTier;

/// Terms that must never reach a user through model output.
pub const FORBIDDEN_TERMS: [&str; 2] = ["skilled nursing", "independent living"];

/// How the model participates in a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmMode {
    #[default]
    Off,
    /// Advice requested and adjudicated, identical to assist
    Shadow,
    Assist,
}

impl LlmMode {
    /// Parse a mode selector. Unknown values fall back to [`LlmMode::Off`].
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "off" | "" => Self::Off,
            "shadow" => Self::Shadow,
            "assist" => Self::Assist,
            other => {
                warn!(mode = other, "Invalid LLM mode, using 'off'");
                Self::Off
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Off)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Shadow => "shadow",
            Self::Assist => "assist",
        }
    }
}

impl fmt::Display for LlmMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the advisory call.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisoryConfig {
    pub model: String,
    /// Hard deadline for the whole round trip
    pub timeout_ms: u64,
    pub temperature: f64,
    pub max_tokens: Option<u32>,
    pub forbidden_terms: Vec<String>,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            timeout_ms: 10_000,
            temperature: 0.2,
            max_tokens: None,
            forbidden_terms: FORBIDDEN_TERMS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl AdvisoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature.clamp(0.0, 1.0);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_forbidden_term(mut self, term: impl Into<String>) -> Self {
        self.forbidden_terms.push(term.into());
        self
    }
}

/// Validated, filtered model advice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmAdvice {
    pub tier: CareTier,
    pub reasons: Vec<String>,
    pub risks: Vec<String>,
    pub navi_messages: Vec<String>,
    pub questions_next: Vec<String>,
    /// Always within [0, 1]
    pub confidence: f64,
}

/// Why a model reply was discarded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdviceRejection {
    #[error("empty response")]
    EmptyResponse,

    #[error("response is not valid JSON: {0}")]
    Unparsable(String),

    #[error("response is not a JSON object")]
    NotAnObject,

    #[error("missing tier field")]
    MissingTier,

    #[error("non-canonical tier: {0}")]
    NonCanonicalTier(String),

    #[error("invalid confidence value")]
    InvalidConfidence,

    #[error("field '{0}' must be a list of strings")]
    InvalidList(&'static str),
}

/// Result of one advisory attempt. Never an error: every failure degrades
/// to a variant the adjudicator understands.
#[derive(Debug, Clone, PartialEq)]
pub enum AdvisoryOutcome {
    /// Mode was off; no call made
    Disabled,
    Accepted {
        advice: LlmAdvice,
        /// Entries removed by the forbidden-term filter
        dropped_entries: usize,
    },
    /// Reply arrived but failed validation
    Rejected { reason: AdviceRejection },
    /// Deadline passed; any late reply is discarded
    TimedOut { after_ms: u64 },
    /// No client, transport failure or rate limiting
    Unavailable { reason: String },
}

impl AdvisoryOutcome {
    pub fn advice(&self) -> Option<&LlmAdvice> {
        match self {
            Self::Accepted { advice, .. } => Some(advice),
            _ => None,
        }
    }

    pub fn into_advice(self) -> Option<LlmAdvice> {
        match self {
            Self::Accepted { advice, .. } => Some(advice),
            _ => None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!(LlmMode::parse("assist"), LlmMode::Assist);
        assert_eq!(LlmMode::parse(" Shadow "), LlmMode::Shadow);
        assert_eq!(LlmMode::parse("off"), LlmMode::Off);
        assert_eq!(LlmMode::parse("always"), LlmMode::Off);
        assert_eq!(LlmMode::parse(""), LlmMode::Off);
        assert!(!LlmMode::Off.is_enabled());
        assert!(LlmMode::Shadow.is_enabled());
    }

    #[test]
    fn test_config_builder() {
        let config = AdvisoryConfig::new()
            .with_model("gpt-4o")
            .with_timeout_ms(500)
            .with_temperature(3.0)
            .with_forbidden_term("nursing home");

        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.timeout_ms, 500);
        assert_eq!(config.temperature, 1.0);
        assert_eq!(config.forbidden_terms.len(), 3);
    }

    #[test]
    fn test_defaults_match_service_settings() {
        let config = AdvisoryConfig::default();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.timeout_ms, 10_000);
        assert!((config.temperature - 0.2).abs() < f64::EPSILON);
    }
}
