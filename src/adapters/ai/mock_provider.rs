//! Scripted AI backend for tests.
//!
//! Replies are queued up front and handed out in order. Once the script runs
//! dry the mock answers `{}`, which the classifier reads as a search with
//! nothing identified.

use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, ProviderInfo,
    TokenUsage,
};

/// Clones share the script and the request log.
#[derive(Debug, Clone, Default)]
pub struct MockAIProvider {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    delay: Duration,
}

#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Fail(MockError),
}

/// Failures the mock can be told to raise.
#[derive(Debug, Clone)]
pub enum MockError {
    RateLimited { retry_after_secs: u32 },
    Unavailable { message: String },
    AuthenticationFailed,
    Network { message: String },
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockAIProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a raw reply body, fenced or malformed text included.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        lock(&self.script).push_back(Scripted::Reply(content.into()));
        self
    }

    pub fn with_json_response(self, value: serde_json::Value) -> Self {
        self.with_response(value.to_string())
    }

    /// Queues a well-formed classifier reply.
    pub fn with_classification(self, intent: &str, message: &str, slugs: &[&str]) -> Self {
        self.with_json_response(json!({
            "intent": intent,
            "message": message,
            "slugs": slugs,
        }))
    }

    pub fn with_error(self, error: MockError) -> Self {
        lock(&self.script).push_back(Scripted::Fail(error));
        self
    }

    /// Every call sleeps this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        lock(&self.requests).clone()
    }

    pub fn remaining_responses(&self) -> usize {
        lock(&self.script).len()
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        lock(&self.requests).push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let next = lock(&self.script).pop_front();
        match next.unwrap_or_else(|| Scripted::Reply("{}".to_string())) {
            Scripted::Reply(content) => Ok(CompletionResponse {
                content,
                usage: TokenUsage::new(10, 20),
                model: "mock-classifier".to_string(),
                finish_reason: FinishReason::Stop,
            }),
            Scripted::Fail(err) => Err(err.into()),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("mock", "mock-classifier")
    }
}
