//! Questionnaire schema and its providers.

mod provider;
mod types;

pub use provider::{load_json_file, FileConfigProvider, ModuleConfigProvider, StaticConfigProvider};
pub use types::{
    AnswerOption, ModuleConfig, ModuleInfo, Question, QuestionKind, Section, SelectMode,
    DEFAULT_MODULE_VERSION,
};
