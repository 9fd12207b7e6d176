//! # gcp-core
//!
//! Care-tier recommendation engine for the Guided Care Plan questionnaire.
//!
//! ## Core Components
//!
//! - **Scoring**: per-question, per-section and per-category scores plus risk flags
//! - **Gating**: cognition/support bands and the gates that narrow the allowed tiers
//! - **Resolution**: band-matrix lookup with score and fallback-order fallbacks
//! - **Advisory**: one bounded, validated LLM call per request (optional)
//! - **Adjudication**: reconciles the deterministic and model tiers with an audit record
//! - **Recommendation**: confidence, rationale, rankings and the output contract
//!
//! ## Example
//!
//! ```rust,ignore
//! use gcp_core::{AnswerRecord, EngineConfig, LlmMode, RecommendationEngine};
//!
//! let config = EngineConfig::from_env();
//! let engine = RecommendationEngine::from_config(&config)?;
//!
//! let answers = AnswerRecord::new()
//!     .with("memory_changes", "mild")
//!     .with("badls", vec!["bathing"]);
//!
//! let rec = engine.recommend(&module_config, &answers, LlmMode::Off).await;
//! println!("{} ({:.2})", rec.tier, rec.confidence);
//! ```

pub mod adjudication;
pub mod advisory;
pub mod answers;
pub mod config;
pub mod engine;
pub mod error;
pub mod gating;
pub mod llm;
pub mod recommendation;
pub mod resolve;
pub mod schema;
pub mod scoring;
pub mod tier;

#[cfg(test)]
mod proptest;

// Re-exports for convenience
pub use adjudication::{
    adjudicate, deterministic_only, AdjudicationDecision, AdjudicationReason,
    AdjudicationSource, LlmOpinion,
};
pub use advisory::{AdvisoryClient, AdvisoryConfig, AdvisoryOutcome, LlmAdvice, LlmMode};
pub use answers::{AnswerRecord, AnswerValue};
pub use config::EngineConfig;
pub use engine::{RecommendationEngine, RecommendationRequest};
pub use error::{Error, Result};
pub use gating::{evaluate_gates, BandSnapshot, CognitionBand, GateConfig, GateOutcome, SupportBand};
pub use llm::{ClientConfig, CompletionRequest, CompletionResponse, LLMClient, OpenAIClient, Provider};
pub use recommendation::{CareRecommendation, FlagCatalog, FlagMetadata, FlagObject, NextProduct};
pub use resolve::{resolve_tier, ResolvedTier, TierMap, TierSource};
pub use schema::{
    FileConfigProvider, ModuleConfig, ModuleConfigProvider, StaticConfigProvider,
};
pub use scoring::{collect_flags, score_module, CategoryScores, ScoreCategory, ScoreSheet};
pub use tier::{tier_catalog, AllowedTiers, CareTier, TierInfo};
