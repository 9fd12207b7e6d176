//! Error types for gcp-core.

use thiserror::Error;

/// Result type alias using gcp-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while producing a recommendation.
///
/// Only [`Error::Config`] and [`Error::Io`] ever reach the caller of the
/// engine. LLM-related variants are produced by the client layer and folded
/// into an advisory outcome before they can escape.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration could not be loaded or is malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem error while reading a configuration source
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Timeout during operation
    #[error("Operation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Provider rejected the request for rate limiting (HTTP 429)
    #[error("Rate limit exceeded: {provider}")]
    RateLimited { provider: String },

    /// LLM API error
    #[error("LLM API error: {provider} - {message}")]
    LlmApi { provider: String, message: String },

    /// LLM error (simple variant)
    #[error("LLM error: {0}")]
    LLM(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an I/O error carrying the offending path.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an LLM API error.
    pub fn llm_api(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::LlmApi {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a rate limit error.
    pub fn rate_limited(provider: impl Into<String>) -> Self {
        Self::RateLimited {
            provider: provider.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Whether this error means the request is unrecoverable for the caller.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Io { .. } | Self::Internal(_))
    }
}
