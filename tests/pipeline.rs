//! End-to-end pipeline tests through the public API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use gcp_core::llm::{CompletionRequest, CompletionResponse, LLMClient, Provider};
use gcp_core::{
    AdjudicationReason, AdjudicationSource, AdvisoryClient, AnswerRecord, CareTier,
    FlagCatalog, LlmMode, ModuleConfig, RecommendationEngine, RecommendationRequest,
    StaticConfigProvider,
};

const MODULE: &str = include_str!("fixtures/gcp_module.json");

/// Replies with a fixed body and counts calls.
struct ScriptedClient {
    reply: String,
    calls: AtomicUsize,
}

impl ScriptedClient {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl LLMClient for ScriptedClient {
    async fn complete(&self, _request: CompletionRequest) -> gcp_core::Result<CompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(CompletionResponse::from_content("scripted", self.reply.as_str()))
    }

    fn provider(&self) -> Provider {
        Provider::OpenAICompatible
    }
}

fn module() -> ModuleConfig {
    ModuleConfig::from_json_str(MODULE).unwrap()
}

fn engine_with(client: Arc<ScriptedClient>) -> RecommendationEngine {
    let advisor = AdvisoryClient::with_defaults(client).unwrap();
    RecommendationEngine::new().with_advisor(Arc::new(advisor))
}

fn severe_answers() -> AnswerRecord {
    AnswerRecord::new()
        .with("cognitive_dx_confirm", "dx_yes")
        .with("memory_changes", "severe")
        .with("badls", vec!["bathing", "dressing", "toileting"])
        .with("falls", "multiple")
}

#[tokio::test]
async fn empty_record_falls_back_to_no_care() {
    let rec = RecommendationEngine::new()
        .recommend(&module(), &AnswerRecord::new(), LlmMode::Off)
        .await;

    assert_eq!(rec.tier, CareTier::None);
    assert_eq!(rec.tier_score, 0.0);
    assert_eq!(
        rec.allowed_tiers,
        vec![CareTier::None, CareTier::InHome, CareTier::AssistedLiving]
    );
    assert_eq!(rec.adjudication.source, AdjudicationSource::Fallback);
    assert_eq!(
        rec.adjudication.adjudication_reason,
        AdjudicationReason::DeterministicOnly
    );
    assert!(rec.confidence >= 0.5);
    assert_eq!(rec.rationale.len(), 2);
}

#[tokio::test]
async fn severe_diagnosed_case_reaches_high_acuity() {
    let rec = RecommendationEngine::new()
        .recommend(&module(), &severe_answers(), LlmMode::Off)
        .await;

    assert_eq!(rec.tier, CareTier::MemoryCareHighAcuity);
    assert_eq!(rec.allowed_tiers.len(), 5);
    assert_eq!(rec.adjudication.bands.cog.as_str(), "high");
    assert_eq!(rec.adjudication.bands.sup.as_str(), "high");
    // 12 + 9 + 4
    assert_eq!(rec.tier_score, 25.0);
    // memory care's 32.0 midpoint outranks the winner's true score
    assert_eq!(rec.tier_rankings[0].tier, CareTier::MemoryCare);
    assert_eq!(rec.tier_rankings[1].tier, CareTier::MemoryCareHighAcuity);
    assert_eq!(rec.tier_rankings[1].score, 25.0);
}

#[tokio::test]
async fn non_canonical_model_tier_is_rejected() {
    let client = ScriptedClient::new(r#"{"tier": "skilled_nursing", "confidence": 0.9}"#);
    let rec = engine_with(client.clone())
        .recommend(&module(), &severe_answers(), LlmMode::Assist)
        .await;

    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    assert_eq!(rec.tier, CareTier::MemoryCareHighAcuity);
    assert_eq!(
        rec.adjudication.adjudication_reason,
        AdjudicationReason::LlmInvalidUnknown
    );
    assert!(rec.llm_advice.is_none());
}

#[tokio::test]
async fn forbidden_reason_is_dropped_but_advice_kept() {
    let client = ScriptedClient::new(
        r#"Here you go: {"tier": "memory_care", "confidence": 0.8,
            "reasons": ["Consider skilled nursing evaluation", "Needs supervision at night"],
            "navi_messages": ["Memory care communities can help."]}"#,
    );
    let rec = engine_with(client)
        .recommend(&module(), &severe_answers(), LlmMode::Assist)
        .await;

    assert_eq!(rec.tier, CareTier::MemoryCare);
    assert_eq!(rec.adjudication.source, AdjudicationSource::Llm);
    assert_eq!(rec.confidence, 0.8);
    let advice = rec.llm_advice.expect("advice kept");
    assert_eq!(advice.reasons, vec!["Needs supervision at night".to_string()]);
    assert_eq!(rec.llm_result.map(|r| r.reasons.len()), Some(1));
}

#[tokio::test]
async fn off_mode_omits_advice_from_contract() {
    let client = ScriptedClient::new(r#"{"tier": "in_home", "confidence": 0.9}"#);
    let rec = engine_with(client.clone())
        .recommend(&module(), &severe_answers(), LlmMode::Off)
        .await;

    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    let json = serde_json::to_value(&rec).unwrap();
    assert!(json.get("llm_advice").is_none());
    assert!(json.get("llm_result").is_none());
    assert_eq!(json["adjudication"]["source"], "fallback");
    assert_eq!(json["recommendation"], json["tier"]);
    assert_eq!(json["schema_version"], 2);
    assert_eq!(json["rule_set"], "standard_2025_q4");
}

#[tokio::test]
async fn repeated_runs_are_identical() {
    let engine = RecommendationEngine::new();
    let answers = AnswerRecord::new()
        .with("memory_changes", "mild")
        .with("iadls", vec!["cooking", "finances"])
        .with("mobility", "cane")
        .with("falls", "one");

    let a = engine.recommend(&module(), &answers, LlmMode::Off).await;
    let b = engine.recommend(&module(), &answers, LlmMode::Off).await;

    assert_eq!(a.tier, b.tier);
    assert_eq!(a.rationale, b.rationale);
    assert_eq!(a.tier_rankings, b.tier_rankings);
    assert_eq!(a.input_snapshot_id, b.input_snapshot_id);
    assert_ne!(a.assessment_id, b.assessment_id);
}

#[tokio::test]
async fn request_entry_point_resolves_flags_from_catalog() {
    let catalog = FlagCatalog::from_json_str(
        r#"{"fall_risk": {"label": "Fall risk", "tone": "warning", "priority": 2}}"#,
    )
    .unwrap();
    let engine = RecommendationEngine::new().with_flag_catalog(catalog);
    let provider = StaticConfigProvider::new(module());
    let request = RecommendationRequest::new(
        AnswerRecord::new()
            .with("falls", "multiple")
            .with("living_situation", "alone"),
    )
    .with_llm_mode(LlmMode::Off);

    let rec = engine.recommend_request(&provider, request).await.unwrap();

    let ids: Vec<&str> = rec.flags.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["fall_risk", "lives_alone"]);
    assert_eq!(rec.flags[0].tone, "warning");
    assert_eq!(rec.flags[1].label, "Lives Alone");
}
