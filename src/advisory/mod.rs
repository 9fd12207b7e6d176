//! Guarded LLM advice.
//!
//! The advisory layer turns answers into a prompt, makes one bounded-time
//! call through an [`LLMClient`](crate::llm::LLMClient), and validates the
//! reply before anything downstream sees it:
//!
//! - tier must be one of the five canonical tiers
//! - confidence must be a number in [0, 1]
//! - missing lists default to empty; lists of anything but strings are rejected
//! - entries mentioning a forbidden term are dropped individually
//!
//! Failures never surface as errors. They come back as an
//! [`AdvisoryOutcome`] that the adjudicator maps to a reason code.

mod client;
mod context;
mod prompts;
mod types;
mod validate;

pub use client::AdvisoryClient;
pub use context::AdvisoryContext;
pub use prompts::{
    build_system_prompt, build_user_prompt, tier_constraint, DEVELOPER_PROMPT, SYSTEM_PROMPT,
};
pub use types::{
    AdviceRejection, AdvisoryConfig, AdvisoryOutcome, LlmAdvice, LlmMode, FORBIDDEN_TERMS,
};
pub use validate::{extract_json, parse_advice, validate_advice, ForbiddenTermFilter};
