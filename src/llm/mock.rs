//! Scripted LLM client for unit tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::{CompletionRequest, CompletionResponse, LLMClient, Provider};
use crate::error::{Error, Result};

enum Script {
    Reply(String),
    Delayed(Duration, String),
    RateLimited,
    Transport(String),
}

/// Mock LLM client for testing.
pub(crate) struct MockLLMClient {
    script: Script,
    calls: AtomicUsize,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl MockLLMClient {
    fn with_script(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub(crate) fn new(response: impl Into<String>) -> Self {
        Self::with_script(Script::Reply(response.into()))
    }

    pub(crate) fn delayed(delay: Duration, response: impl Into<String>) -> Self {
        Self::with_script(Script::Delayed(delay, response.into()))
    }

    pub(crate) fn rate_limited() -> Self {
        Self::with_script(Script::RateLimited)
    }

    pub(crate) fn failing(message: impl Into<String>) -> Self {
        Self::with_script(Script::Transport(message.into()))
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request);

        match &self.script {
            Script::Reply(content) => Ok(CompletionResponse::from_content("test-model", content)),
            Script::Delayed(delay, content) => {
                tokio::time::sleep(*delay).await;
                Ok(CompletionResponse::from_content("test-model", content))
            }
            Script::RateLimited => Err(Error::rate_limited("mock")),
            Script::Transport(message) => Err(Error::LLM(message.clone())),
        }
    }

    fn provider(&self) -> Provider {
        Provider::OpenAICompatible
    }
}
