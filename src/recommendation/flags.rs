//! Flag metadata catalog and flag objects.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use super::rationale::titleize;
use crate::error::Result;
use crate::schema::load_json_file;

pub const DEFAULT_FLAG_DESCRIPTION: &str = "Important consideration from your answers.";
pub const DEFAULT_FLAG_TONE: &str = "info";
pub const DEFAULT_FLAG_PRIORITY: u32 = 99;

fn default_tone() -> String {
    DEFAULT_FLAG_TONE.to_string()
}

fn default_priority() -> u32 {
    DEFAULT_FLAG_PRIORITY
}

/// Display metadata for one flag id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagMetadata {
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_tone")]
    pub tone: String,
    #[serde(default = "default_priority")]
    pub priority: u32,
}

impl FlagMetadata {
    /// Metadata for an id with no catalog entry.
    pub fn fallback(id: &str) -> Self {
        Self {
            label: titleize(id),
            description: DEFAULT_FLAG_DESCRIPTION.to_string(),
            tone: default_tone(),
            priority: DEFAULT_FLAG_PRIORITY,
        }
    }
}

/// Flag id → metadata. Loaded once and shared read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagCatalog(BTreeMap<String, FlagMetadata>);

impl FlagCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| crate::Error::config(format!("invalid flag metadata: {}", e)))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        load_json_file(path)
    }

    pub fn with_entry(mut self, id: impl Into<String>, metadata: FlagMetadata) -> Self {
        self.0.insert(id.into(), metadata);
        self
    }

    pub fn get(&self, id: &str) -> Option<&FlagMetadata> {
        self.0.get(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn resolve(&self, id: &str) -> FlagObject {
        let metadata = self
            .get(id)
            .cloned()
            .unwrap_or_else(|| FlagMetadata::fallback(id));
        FlagObject {
            id: id.to_string(),
            label: metadata.label,
            description: metadata.description,
            tone: metadata.tone,
            priority: metadata.priority,
        }
    }

    /// Resolve every flag and sort ascending by priority (ties by id).
    pub fn build_flag_objects(&self, flags: &BTreeSet<String>) -> Vec<FlagObject> {
        let mut objects: Vec<FlagObject> = flags.iter().map(|id| self.resolve(id)).collect();
        objects.sort_by_key(|flag| flag.priority);
        objects
    }
}

/// Flag as presented in the recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagObject {
    pub id: String,
    pub label: String,
    pub description: String,
    pub tone: String,
    pub priority: u32,
}
