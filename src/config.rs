//! Process-level configuration.
//!
//! Read once at startup and injected into the engine; nothing below this
//! module touches the environment.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::advisory::{AdvisoryConfig, LlmMode};
use crate::error::Result;
use crate::gating::GateConfig;
use crate::llm::{ClientConfig, LLMClient, OpenAIClient};
use crate::recommendation::FlagCatalog;
use crate::resolve::TierMap;
use crate::schema::FileConfigProvider;

pub const ENV_LLM_MODE: &str = "FEATURE_GCP_LLM_TIER";
pub const ENV_BEHAVIOR_GATE: &str = "FEATURE_GCP_MC_BEHAVIOR_GATE";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_MODEL: &str = "OPENAI_MODEL";
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_LLM_TIMEOUT_MS: &str = "GCP_LLM_TIMEOUT_MS";
pub const ENV_MODULE_CONFIG: &str = "GCP_MODULE_CONFIG";
pub const ENV_TIER_MAP: &str = "GCP_TIER_MAP";
pub const ENV_FLAG_METADATA: &str = "GCP_FLAG_METADATA";

/// Engine configuration.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Default mode for requests that do not choose one
    pub llm_mode: LlmMode,
    pub gates: GateConfig,
    pub advisory: AdvisoryConfig,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub module_config_path: Option<PathBuf>,
    pub tier_map_path: Option<PathBuf>,
    pub flag_catalog_path: Option<PathBuf>,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut advisory = AdvisoryConfig::default();
        if let Some(model) = get(ENV_OPENAI_MODEL) {
            advisory = advisory.with_model(model);
        }
        if let Some(timeout_ms) = get(ENV_LLM_TIMEOUT_MS).and_then(|s| s.parse().ok()) {
            advisory = advisory.with_timeout_ms(timeout_ms);
        }

        Self {
            llm_mode: get(ENV_LLM_MODE)
                .map(|s| LlmMode::parse(&s))
                .unwrap_or_default(),
            gates: GateConfig::default().with_behavior_gate(
                get(ENV_BEHAVIOR_GATE)
                    .map(|s| s.eq_ignore_ascii_case("on"))
                    .unwrap_or(false),
            ),
            advisory,
            openai_api_key: get(ENV_OPENAI_API_KEY),
            openai_base_url: get(ENV_OPENAI_BASE_URL),
            module_config_path: get(ENV_MODULE_CONFIG).map(PathBuf::from),
            tier_map_path: get(ENV_TIER_MAP).map(PathBuf::from),
            flag_catalog_path: get(ENV_FLAG_METADATA).map(PathBuf::from),
        }
    }

    pub fn with_llm_mode(mut self, mode: LlmMode) -> Self {
        self.llm_mode = mode;
        self
    }

    pub fn with_behavior_gate(mut self, enabled: bool) -> Self {
        self.gates = self.gates.with_behavior_gate(enabled);
        self
    }

    pub fn with_advisory(mut self, advisory: AdvisoryConfig) -> Self {
        self.advisory = advisory;
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(key.into());
        self
    }

    /// OpenAI-compatible client, or `None` without an API key.
    pub fn llm_client(&self) -> Result<Option<Arc<dyn LLMClient>>> {
        let Some(api_key) = &self.openai_api_key else {
            info!("No OpenAI API key configured - LLM advice disabled");
            return Ok(None);
        };

        let mut config = ClientConfig::new(api_key.clone())
            .with_default_model(&self.advisory.model)
            .with_timeout_ms(self.advisory.timeout_ms);
        if let Some(url) = &self.openai_base_url {
            config = config.with_base_url(url.clone());
        }
        Ok(Some(Arc::new(OpenAIClient::new(config)?)))
    }

    /// Configured tier map, or the standard one.
    pub fn load_tier_map(&self) -> Result<TierMap> {
        match &self.tier_map_path {
            Some(path) => TierMap::from_file(path),
            None => Ok(TierMap::standard()),
        }
    }

    /// Configured flag metadata, or an empty catalog.
    pub fn load_flag_catalog(&self) -> Result<FlagCatalog> {
        match &self.flag_catalog_path {
            Some(path) => FlagCatalog::from_file(path),
            None => Ok(FlagCatalog::new()),
        }
    }

    /// File-backed module config provider, when a path is configured.
    pub fn module_provider(&self) -> Option<FileConfigProvider> {
        self.module_config_path.as_ref().map(FileConfigProvider::new)
    }
}
