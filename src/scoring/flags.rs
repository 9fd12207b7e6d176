//! Risk flag collection from selected options.

use std::collections::BTreeSet;

use crate::answers::{AnswerRecord, AnswerValue};
use crate::schema::ModuleConfig;

/// Union of the flags configured on every selected option.
///
/// List answers select every option whose value they contain; text answers
/// select the single option with a matching value. Numeric answers carry no
/// option and contribute no flags.
pub fn collect_flags(config: &ModuleConfig, answers: &AnswerRecord) -> BTreeSet<String> {
    let mut flags = BTreeSet::new();

    for (_, questions) in config.scored_sections() {
        for question in questions {
            let Some(answer) = answers.get(&question.id).filter(|a| a.is_answered()) else {
                continue;
            };

            match answer {
                AnswerValue::List(_) => {
                    let selected = answer.text_items();
                    for option in question
                        .options
                        .iter()
                        .filter(|opt| selected.contains(&opt.value.as_str()))
                    {
                        flags.extend(option.flags.iter().cloned());
                    }
                }
                AnswerValue::Text(value) => {
                    if let Some(option) = question.option(value) {
                        flags.extend(option.flags.iter().cloned());
                    }
                }
                _ => {}
            }
        }
    }

    flags
}
