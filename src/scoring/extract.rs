//! Deterministic score extraction.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, trace};

use super::category::{CategoryScores, ScoreCategory};
use crate::answers::{finite_or_zero, AnswerRecord, AnswerValue};
use crate::schema::{AnswerOption, ModuleConfig, Question, QuestionKind};

/// One matched option (or scored numeric answer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub question_id: String,
    /// The matched option value, or the numeric answer
    pub answer: Value,
    pub score: f64,
    pub category: ScoreCategory,
    pub flags: Vec<String>,
}

/// Human-readable line item used by the rationale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionDetail {
    pub question: String,
    pub answer: String,
    pub score: f64,
}

/// Score and matched details for one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionScore {
    pub section_id: String,
    pub score: f64,
    pub details: Vec<SectionDetail>,
}

impl SectionScore {
    /// Highest-scoring detail; the earliest wins ties.
    pub fn top_detail(&self) -> Option<&SectionDetail> {
        self.details.iter().fold(None, |best, current| match best {
            Some(b) if current.score <= b.score => Some(b),
            _ => Some(current),
        })
    }
}

/// Aggregated scoring results and completion counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringDetails {
    /// Sections in declaration order
    pub by_section: Vec<SectionScore>,
    pub by_question: BTreeMap<String, f64>,
    pub required_answered: usize,
    pub required_total: usize,
    pub optional_answered: usize,
}

impl ScoringDetails {
    /// Required-answered ratio; a module with no required questions counts as one.
    pub fn completeness(&self) -> f64 {
        self.required_answered as f64 / self.required_total.max(1) as f64
    }
}

/// Full output of the score extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreSheet {
    pub total_score: f64,
    pub details: ScoringDetails,
    pub by_category: CategoryScores,
    pub entries: Vec<ScoreEntry>,
}

/// An answer checked against the question that asked it.
enum ShapedAnswer<'a> {
    /// Multi-select: every option whose value appears in the list
    Selections(Vec<&'a str>),
    /// Single-select: the option with this value
    Choice(&'a str),
    /// Numeric answer scored through the question's multiplier
    Quantity(f64),
    Unscored,
}

fn shape<'a>(question: &Question, answer: &'a AnswerValue) -> ShapedAnswer<'a> {
    let kind = question.kind();
    match answer {
        AnswerValue::List(_) => {
            if kind != QuestionKind::MultiChoice {
                trace!(question = %question.id, ?kind, "list answer for non multi-select question");
            }
            ShapedAnswer::Selections(answer.text_items())
        }
        AnswerValue::Text(text) if question.option(text).is_some() => ShapedAnswer::Choice(text),
        AnswerValue::Number(_) if kind == QuestionKind::Number => match question.score_multiplier {
            Some(multiplier) if multiplier != 0.0 => {
                ShapedAnswer::Quantity(finite_or_zero(answer.as_f64().unwrap_or(0.0) * multiplier))
            }
            _ => ShapedAnswer::Unscored,
        },
        _ => {
            trace!(question = %question.id, ?kind, "answer does not match any scored shape");
            ShapedAnswer::Unscored
        }
    }
}

/// Score every answered question of every non-informational section.
pub fn score_module(config: &ModuleConfig, answers: &AnswerRecord) -> ScoreSheet {
    let mut sheet = ScoreSheet::default();

    for (section, questions) in config.scored_sections() {
        let mut section_score = SectionScore {
            section_id: section.id.clone(),
            score: 0.0,
            details: Vec::new(),
        };

        for question in questions {
            let answer = answers.get(&question.id).filter(|a| a.is_answered());

            match (question.required, answer.is_some()) {
                (true, answered) => {
                    sheet.details.required_total += 1;
                    if answered {
                        sheet.details.required_answered += 1;
                    }
                }
                (false, true) => sheet.details.optional_answered += 1,
                (false, false) => {}
            }

            let Some(answer) = answer else {
                sheet.details.by_question.insert(question.id.clone(), 0.0);
                continue;
            };

            let category = ScoreCategory::infer(&question.id);
            let mut question_score = 0.0;

            match shape(question, answer) {
                ShapedAnswer::Selections(selected) => {
                    for option in question
                        .options
                        .iter()
                        .filter(|opt| selected.contains(&opt.value.as_str()))
                    {
                        question_score += record_option(
                            &mut sheet,
                            &mut section_score,
                            question,
                            option,
                            category,
                        );
                    }
                }
                ShapedAnswer::Choice(value) => {
                    if let Some(option) = question.option(value) {
                        question_score += record_option(
                            &mut sheet,
                            &mut section_score,
                            question,
                            option,
                            category,
                        );
                    }
                }
                ShapedAnswer::Quantity(score) => {
                    sheet.entries.push(ScoreEntry {
                        question_id: question.id.clone(),
                        answer: serde_json::to_value(answer).unwrap_or(Value::Null),
                        score,
                        category,
                        flags: question.flags.clone(),
                    });
                    sheet.by_category.add(category, score);
                    question_score += score;
                }
                ShapedAnswer::Unscored => {}
            }

            sheet
                .details
                .by_question
                .insert(question.id.clone(), finite_or_zero(question_score));
            section_score.score = finite_or_zero(section_score.score + question_score);
        }

        sheet.total_score = finite_or_zero(sheet.total_score + section_score.score);
        sheet.details.by_section.push(section_score);
    }

    debug!(
        total_score = sheet.total_score,
        required_answered = sheet.details.required_answered,
        required_total = sheet.details.required_total,
        "Scored module"
    );

    sheet
}

fn record_option(
    sheet: &mut ScoreSheet,
    section: &mut SectionScore,
    question: &Question,
    option: &AnswerOption,
    category: ScoreCategory,
) -> f64 {
    let score = option.score;
    section.details.push(SectionDetail {
        question: question.display_label().to_string(),
        answer: option.display_label().to_string(),
        score,
    });
    sheet.entries.push(ScoreEntry {
        question_id: question.id.clone(),
        answer: Value::String(option.value.clone()),
        score,
        category,
        flags: option.flags.clone(),
    });
    sheet.by_category.add(category, score);
    score
}
