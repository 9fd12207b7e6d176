//! LLM client abstraction.
//!
//! A minimal chat-completions interface used by the advisory layer. The
//! engine depends only on the [`LLMClient`] trait, so tests and hosts can
//! inject their own implementation.
//!
//! ## Example
//!
//! ```rust,ignore
//! use gcp_core::llm::{ChatMessage, ClientConfig, CompletionRequest, LLMClient, OpenAIClient};
//!
//! let client = OpenAIClient::new(ClientConfig::new("your-api-key"))?;
//!
//! let request = CompletionRequest::new()
//!     .with_system("Return JSON only.")
//!     .with_message(ChatMessage::user("{\"memory_concerns\":\"mild\"}"))
//!     .with_json_output();
//!
//! let response = client.complete(request).await?;
//! ```

mod client;
#[cfg(test)]
pub(crate) mod mock;
mod types;

pub use client::{ClientConfig, LLMClient, OpenAIClient};
pub use types::{
    ChatMessage, ChatRole, CompletionRequest, CompletionResponse, Provider, ResponseFormat,
    StopReason, TokenUsage,
};
