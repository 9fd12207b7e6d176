//! Recommendation pipeline.
//!
//! ```text
//! answers ─► score + flags ─► gates ─► deterministic tier ─┐
//!                                  └─► advisory call ──────┴─► adjudicate ─► CareRecommendation
//! ```
//!
//! Everything except the advisory call is synchronous and pure over the
//! request. The engine holds only immutable, shared configuration, so one
//! instance can serve any number of concurrent requests.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::adjudication::{adjudicate, deterministic_only, AdjudicationSource, LlmOpinion};
use crate::advisory::{AdvisoryClient, AdvisoryOutcome, LlmMode};
use crate::answers::AnswerRecord;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::gating::{evaluate_gates, GateConfig};
use crate::recommendation::{
    build_rationale, deterministic_confidence, final_confidence, round1, round2, snapshot_id,
    tier_rankings, CareRecommendation, DeterministicResult, Derived, FlagCatalog, LlmResult,
    NextProduct, RawScores, RecommendationStatus, RULE_SET_ID, SCHEMA_VERSION,
};
use crate::resolve::{resolve_tier, TierMap};
use crate::schema::{ModuleConfig, ModuleConfigProvider};
use crate::scoring::{collect_flags, score_module};

/// Inbound request: raw answers plus an optional mode selector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub answers: AnswerRecord,
    /// `None` uses the engine's configured mode
    #[serde(
        default,
        deserialize_with = "lenient_mode",
        skip_serializing_if = "Option::is_none"
    )]
    pub llm_mode: Option<LlmMode>,
}

impl RecommendationRequest {
    pub fn new(answers: AnswerRecord) -> Self {
        Self {
            answers,
            llm_mode: None,
        }
    }

    pub fn with_llm_mode(mut self, mode: LlmMode) -> Self {
        self.llm_mode = Some(mode);
        self
    }
}

/// Null means unset; unknown or non-string selectors are treated as off.
fn lenient_mode<'de, D>(deserializer: D) -> std::result::Result<Option<LlmMode>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => None,
        other => Some(other.as_str().map(LlmMode::parse).unwrap_or_default()),
    })
}

/// Care-tier recommendation engine.
#[derive(Clone)]
pub struct RecommendationEngine {
    default_mode: LlmMode,
    gates: GateConfig,
    tier_map: Arc<TierMap>,
    flag_catalog: Arc<FlagCatalog>,
    advisor: Option<Arc<AdvisoryClient>>,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RecommendationEngine {
    /// Engine with the standard tier map, no flag metadata and no advisor.
    pub fn new() -> Self {
        Self {
            default_mode: LlmMode::Off,
            gates: GateConfig::default(),
            tier_map: Arc::new(TierMap::standard()),
            flag_catalog: Arc::new(FlagCatalog::new()),
            advisor: None,
        }
    }

    /// Build from process configuration, loading the tier map and flag
    /// catalog and connecting the advisory client when a key is configured.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let mut engine = Self::new()
            .with_default_mode(config.llm_mode)
            .with_gate_config(config.gates)
            .with_tier_map(config.load_tier_map()?)
            .with_flag_catalog(config.load_flag_catalog()?);

        if let Some(client) = config.llm_client()? {
            let advisor = AdvisoryClient::new(client, config.advisory.clone())?;
            engine = engine.with_advisor(Arc::new(advisor));
        }

        info!(
            llm_mode = %engine.default_mode,
            behavior_gate = config.gates.behavior_gate_enabled,
            advisor = engine.advisor.is_some(),
            "Recommendation engine ready"
        );
        Ok(engine)
    }

    /// Mode for requests that do not choose one.
    pub fn with_default_mode(mut self, mode: LlmMode) -> Self {
        self.default_mode = mode;
        self
    }

    pub fn default_mode(&self) -> LlmMode {
        self.default_mode
    }

    pub fn with_gate_config(mut self, gates: GateConfig) -> Self {
        self.gates = gates;
        self
    }

    pub fn with_tier_map(mut self, tier_map: TierMap) -> Self {
        self.tier_map = Arc::new(tier_map);
        self
    }

    pub fn with_flag_catalog(mut self, catalog: FlagCatalog) -> Self {
        self.flag_catalog = Arc::new(catalog);
        self
    }

    pub fn with_advisor(mut self, advisor: Arc<AdvisoryClient>) -> Self {
        self.advisor = Some(advisor);
        self
    }

    pub fn has_advisor(&self) -> bool {
        self.advisor.is_some()
    }

    /// Load the module configuration and run the pipeline.
    ///
    /// Only a configuration failure is an error; every other problem
    /// degrades inside the pipeline.
    pub async fn recommend_request(
        &self,
        provider: &dyn ModuleConfigProvider,
        request: RecommendationRequest,
    ) -> Result<CareRecommendation> {
        let config = provider.load()?;
        let mode = request.llm_mode.unwrap_or(self.default_mode);
        Ok(self.recommend(&config, &request.answers, mode).await)
    }

    /// Run the full pipeline for one answer record.
    #[instrument(skip(self, config, answers), fields(mode = %mode, answers = answers.len()))]
    pub async fn recommend(
        &self,
        config: &ModuleConfig,
        answers: &AnswerRecord,
        mode: LlmMode,
    ) -> CareRecommendation {
        let sheet = score_module(config, answers);
        let flags = collect_flags(config, answers);
        debug!(
            total_score = sheet.total_score,
            flags = flags.len(),
            "Scored answers"
        );

        let gates = evaluate_gates(answers, &flags, &self.gates);
        let bands = gates.bands();
        let resolved = resolve_tier(&self.tier_map, bands, sheet.total_score, &gates.allowed);

        let (tier, decision, advice) = if mode.is_enabled() {
            let outcome = match &self.advisor {
                Some(advisor) => advisor.advise(mode, answers, &flags, &gates.allowed).await,
                None => AdvisoryOutcome::Unavailable {
                    reason: "no LLM client configured".to_string(),
                },
            };
            let opinion = LlmOpinion::from(&outcome);
            let (tier, decision) = adjudicate(
                Some(resolved.tier),
                &gates.allowed,
                &opinion,
                bands,
                gates.risky,
            );
            // advice only travels with the result when it decided the tier
            let advice = match decision.source {
                AdjudicationSource::Llm => outcome.into_advice(),
                AdjudicationSource::Fallback => None,
            };
            (tier, decision, advice)
        } else {
            let (tier, decision) =
                deterministic_only(resolved.tier, &gates.allowed, bands, gates.risky);
            (tier, decision, None)
        };

        let det_confidence =
            deterministic_confidence(&sheet.details, sheet.total_score, resolved.tier);
        let confidence = round2(match &advice {
            Some(advice) => final_confidence(det_confidence, Some(advice.confidence)),
            None => deterministic_confidence(&sheet.details, sheet.total_score, tier),
        });

        let suggested_next_product = NextProduct::choose(tier, confidence);
        let now = Utc::now();

        info!(
            tier = %tier,
            confidence,
            total_score = sheet.total_score,
            source = ?decision.source,
            "Recommendation complete"
        );

        CareRecommendation {
            tier,
            tier_score: round1(sheet.total_score),
            tier_rankings: tier_rankings(sheet.total_score, tier),
            confidence,
            flags: self.flag_catalog.build_flag_objects(&flags),
            rationale: build_rationale(&sheet.details, tier, sheet.total_score),
            suggested_next_product,
            derived: Derived::from_answers(answers),
            allowed_tiers: gates.allowed.to_vec(),
            generated_at: now,
            version: config.version().to_string(),
            input_snapshot_id: snapshot_id(answers),
            rule_set: RULE_SET_ID.to_string(),
            next_step: suggested_next_product.next_step(),
            status: RecommendationStatus::Complete,
            last_updated: now,
            needs_refresh: false,
            schema_version: SCHEMA_VERSION,
            assessment_id: format!("assess_{}", Uuid::new_v4().simple()),
            user_inputs: answers.clone(),
            score_breakdown: sheet.by_category.clone(),
            adjudication: decision,
            llm_result: advice.as_ref().map(LlmResult::from),
            llm_advice: advice,
            timestamp: now,
            deterministic_result: DeterministicResult {
                tier: resolved.tier,
                confidence: round2(det_confidence),
                score: round1(sheet.total_score),
            },
            recommendation: tier,
            raw_scores: RawScores::new(sheet.total_score, &sheet.by_category),
        }
    }
}
