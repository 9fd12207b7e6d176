//! Module configuration providers.
//!
//! Configuration is loaded once and shared read-only across requests. The
//! file-backed provider caches the first successful load; concurrent first
//! access may parse twice, which is harmless because loading is idempotent.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::types::ModuleConfig;
use crate::error::{Error, Result};

/// Source of the questionnaire schema.
pub trait ModuleConfigProvider: Send + Sync {
    /// Return the module configuration. Failure is fatal for the request.
    fn load(&self) -> Result<Arc<ModuleConfig>>;
}

/// Provider wrapping an already-loaded configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigProvider {
    config: Arc<ModuleConfig>,
}

impl StaticConfigProvider {
    pub fn new(config: ModuleConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl ModuleConfigProvider for StaticConfigProvider {
    fn load(&self) -> Result<Arc<ModuleConfig>> {
        Ok(Arc::clone(&self.config))
    }
}

/// Provider reading a JSON file on first use and caching the result.
#[derive(Debug)]
pub struct FileConfigProvider {
    path: PathBuf,
    cache: OnceLock<Arc<ModuleConfig>>,
}

impl FileConfigProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a configuration has been cached yet.
    pub fn is_loaded(&self) -> bool {
        self.cache.get().is_some()
    }
}

impl ModuleConfigProvider for FileConfigProvider {
    fn load(&self) -> Result<Arc<ModuleConfig>> {
        if let Some(config) = self.cache.get() {
            return Ok(Arc::clone(config));
        }

        let config: ModuleConfig = load_json_file(&self.path).inspect_err(|e| {
            warn!(path = %self.path.display(), error = %e, "Failed to load module configuration");
        })?;
        debug!(
            path = %self.path.display(),
            sections = config.sections.len(),
            "Loaded module configuration"
        );

        // A concurrent loader may have won the race; either value is identical.
        let _ = self.cache.set(Arc::new(config));
        self.cache
            .get()
            .map(Arc::clone)
            .ok_or_else(|| Error::Internal("module configuration cache empty after set".into()))
    }
}

/// Read and deserialize a JSON file, mapping every failure to a config error.
pub fn load_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path.display().to_string(), e))?;
    serde_json::from_str(&text)
        .map_err(|e| Error::config(format!("invalid JSON in {}: {}", path.display(), e)))
}
