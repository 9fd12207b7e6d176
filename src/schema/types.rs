//! Questionnaire schema types.
//!
//! The module configuration is owned by an external collaborator (the same
//! JSON the form renderer consumes). Only the fields scoring depends on are
//! modelled; everything else is ignored on deserialization.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Version reported when the configuration does not carry one.
pub const DEFAULT_MODULE_VERSION: &str = "v2025.10";

/// Complete questionnaire definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleConfig {
    #[serde(default)]
    pub module: ModuleInfo,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl ModuleConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| crate::Error::config(format!("invalid module configuration: {}", e)))
    }

    pub fn version(&self) -> &str {
        self.module
            .version
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(DEFAULT_MODULE_VERSION)
    }

    /// Sections that hold scorable questions, in declaration order.
    pub fn scored_sections(&self) -> impl Iterator<Item = (&Section, &[Question])> {
        self.sections
            .iter()
            .filter_map(|section| section.scored_questions().map(|qs| (section, qs)))
    }

    /// Look up a question by id across all sections.
    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.scored_sections()
            .flat_map(|(_, questions)| questions.iter())
            .find(|q| q.id == question_id)
    }
}

/// Module-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// A group of questions. Informational sections carry no questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub section_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<Question>>,
}

impl Section {
    pub fn is_informational(&self) -> bool {
        self.section_type.as_deref() == Some("info") || self.questions.is_none()
    }

    /// Questions to score, or `None` for informational sections.
    pub fn scored_questions(&self) -> Option<&[Question]> {
        if self.section_type.as_deref() == Some("info") {
            return None;
        }
        self.questions.as_deref()
    }
}

/// How a choice question accepts selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectMode {
    Single,
    #[serde(alias = "multi")]
    Multiple,
}

/// Answer shape a question declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    SingleChoice,
    MultiChoice,
    Number,
    FreeText,
}

/// A single question with its scoring options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(rename = "type", default)]
    pub question_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<SelectMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<AnswerOption>,
    /// Score per unit for numeric questions
    #[serde(
        default,
        deserialize_with = "lenient_optional_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub score_multiplier: Option<f64>,
    /// Flags attached to numeric answers
    #[serde(default)]
    pub flags: Vec<String>,
}

impl Question {
    pub fn kind(&self) -> QuestionKind {
        if self.select == Some(SelectMode::Multiple) {
            QuestionKind::MultiChoice
        } else if self.question_type == "number" {
            QuestionKind::Number
        } else if !self.options.is_empty() {
            QuestionKind::SingleChoice
        } else {
            QuestionKind::FreeText
        }
    }

    pub fn option(&self, value: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|opt| opt.value == value)
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// A selectable answer with its score contribution and risk flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub score: f64,
    #[serde(default)]
    pub flags: Vec<String>,
}

impl AnswerOption {
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.value)
    }
}

/// Numbers, numeric strings and null all accepted; anything unusable is zero.
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_optional_number(deserializer)?.unwrap_or(0.0))
}

fn lenient_optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.filter(|n| n.is_finite()))
}
