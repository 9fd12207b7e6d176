//! Bounded-time advisory call.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::context::AdvisoryContext;
use super::prompts::{build_system_prompt, build_user_prompt};
use super::types::{AdvisoryConfig, AdvisoryOutcome, LlmMode};
use super::validate::{parse_advice, ForbiddenTermFilter};
use crate::answers::AnswerRecord;
use crate::error::{Error, Result};
use crate::llm::{ChatMessage, CompletionRequest, LLMClient};
use crate::tier::AllowedTiers;

/// Requests care-tier advice from a model and validates the reply.
///
/// Makes exactly one attempt per call. The pending request is dropped when
/// the deadline passes, so a late reply can never reach the caller.
pub struct AdvisoryClient {
    client: Arc<dyn LLMClient>,
    config: AdvisoryConfig,
    filter: ForbiddenTermFilter,
}

impl AdvisoryClient {
    pub fn new(client: Arc<dyn LLMClient>, config: AdvisoryConfig) -> Result<Self> {
        let filter = ForbiddenTermFilter::new(&config.forbidden_terms)?;
        Ok(Self {
            client,
            config,
            filter,
        })
    }

    pub fn with_defaults(client: Arc<dyn LLMClient>) -> Result<Self> {
        Self::new(client, AdvisoryConfig::default())
    }

    pub fn config(&self) -> &AdvisoryConfig {
        &self.config
    }

    fn build_request(
        &self,
        answers: &AnswerRecord,
        flags: &BTreeSet<String>,
        allowed: &AllowedTiers,
    ) -> CompletionRequest {
        let context = AdvisoryContext::from_answers(answers, flags);
        let mut request = CompletionRequest::new()
            .with_model(&self.config.model)
            .with_system(build_system_prompt(allowed))
            .with_message(ChatMessage::user(build_user_prompt(&context)))
            .with_temperature(self.config.temperature)
            .with_json_output();
        if let Some(max_tokens) = self.config.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        request
    }

    /// Ask for advice. Never fails; every problem becomes an outcome variant.
    #[instrument(skip(self, answers, flags, allowed), fields(mode = %mode, model = %self.config.model))]
    pub async fn advise(
        &self,
        mode: LlmMode,
        answers: &AnswerRecord,
        flags: &BTreeSet<String>,
        allowed: &AllowedTiers,
    ) -> AdvisoryOutcome {
        if !mode.is_enabled() {
            return AdvisoryOutcome::Disabled;
        }

        let request = self.build_request(answers, flags, allowed);
        let deadline = Duration::from_millis(self.config.timeout_ms);
        debug!(timeout_ms = self.config.timeout_ms, "Requesting advice");

        let response = match tokio::time::timeout(deadline, self.client.complete(request)).await {
            Err(_) => {
                warn!(after_ms = self.config.timeout_ms, "Advice request timed out");
                return AdvisoryOutcome::TimedOut {
                    after_ms: self.config.timeout_ms,
                };
            }
            Ok(Err(Error::Timeout { duration_ms })) => {
                warn!(after_ms = duration_ms, "Advice request timed out in transport");
                return AdvisoryOutcome::TimedOut {
                    after_ms: duration_ms,
                };
            }
            Ok(Err(err)) => {
                if matches!(err, Error::RateLimited { .. }) {
                    warn!("Advice request rate limited");
                } else {
                    warn!(error = %err, "Advice request failed");
                }
                return AdvisoryOutcome::Unavailable {
                    reason: err.to_string(),
                };
            }
            Ok(Ok(response)) => response,
        };

        let mut advice = match parse_advice(&response.content) {
            Ok(advice) => advice,
            Err(reason) => {
                info!(%reason, "Advice validation failed");
                return AdvisoryOutcome::Rejected { reason };
            }
        };

        let dropped_entries = self.filter.apply(&mut advice);
        info!(
            tier = %advice.tier,
            confidence = advice.confidence,
            dropped_entries,
            "Advice accepted"
        );

        AdvisoryOutcome::Accepted {
            advice,
            dropped_entries,
        }
    }
}
