//! Mock LLM provider for testing
//!
//! Responses are scripted: each call pops the next queued outcome, and once
//! the queue is empty the fallback response (or error) is returned forever.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::providers::{LlmMessage, LlmProvider, LlmResponse, ProviderError};

/// Mock provider for testing
pub struct MockLlmProvider {
    /// Outcomes returned in order before falling back to `response`/`error`
    script: Arc<Mutex<VecDeque<Result<LlmResponse, ProviderError>>>>,
    /// The response to return once the script is exhausted
    response: Arc<Mutex<LlmResponse>>,
    /// Optional error to return instead of the response
    error: Arc<Mutex<Option<ProviderError>>>,
    /// Provider name
    name: String,
    /// Call counter for tracking
    call_count: Arc<Mutex<usize>>,
    /// Last messages received (for verification)
    last_messages: Arc<Mutex<Option<Vec<LlmMessage>>>>,
    /// Last model requested
    last_model: Arc<Mutex<Option<String>>>,
}

impl MockLlmProvider {
    /// Creates a new mock provider with default settings
    pub fn new() -> Self {
        Self::with_name("mock")
    }

    /// Creates a new mock provider with a specific name
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            response: Arc::new(Mutex::new(LlmResponse::new("Mock response"))),
            error: Arc::new(Mutex::new(None)),
            name: name.into(),
            call_count: Arc::new(Mutex::new(0)),
            last_messages: Arc::new(Mutex::new(None)),
            last_model: Arc::new(Mutex::new(None)),
        }
    }

    /// Sets the response content to return
    pub fn set_response(&self, content: impl Into<String>) {
        *self.response.lock().unwrap() = LlmResponse::new(content);
    }

    /// Sets the error to return (instead of the response)
    pub fn set_error(&self, error: ProviderError) {
        *self.error.lock().unwrap() = Some(error);
    }

    /// Queues a one-off outcome ahead of the default response
    pub fn push_outcome(&self, outcome: Result<LlmResponse, ProviderError>) {
        self.script.lock().unwrap().push_back(outcome);
    }

    /// Returns the number of times chat() was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Returns the last messages passed to chat()
    pub fn last_messages(&self) -> Option<Vec<LlmMessage>> {
        self.last_messages.lock().unwrap().clone()
    }

    /// Returns the last model passed to chat()
    pub fn last_model(&self) -> Option<String> {
        self.last_model.lock().unwrap().clone()
    }
}

impl Default for MockLlmProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LlmProvider for MockLlmProvider {
    async fn chat(
        &self,
        messages: Vec<LlmMessage>,
        model: &str,
    ) -> Result<LlmResponse, ProviderError> {
        *self.call_count.lock().unwrap() += 1;
        *self.last_messages.lock().unwrap() = Some(messages);
        *self.last_model.lock().unwrap() = Some(model.to_string());

        if let Some(outcome) = self.script.lock().unwrap().pop_front() {
            return outcome;
        }

        if let Some(err) = self.error.lock().unwrap().clone() {
            return Err(err);
        }

        Ok(self.response.lock().unwrap().clone())
    }

    fn provider_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_script_then_default() {
        let mock = MockLlmProvider::new();
        mock.push_outcome(Err(ProviderError::network("down")));
        mock.set_response("steady");

        let first = mock.chat(vec![LlmMessage::user("hi")], "m").await;
        assert!(first.is_err());

        let second = mock.chat(vec![LlmMessage::user("hi")], "m").await.unwrap();
        assert_eq!(second.content, "steady");
        assert_eq!(mock.call_count(), 2);
        assert_eq!(mock.last_model().as_deref(), Some("m"));
    }

    #[tokio::test]
    async fn test_mock_error_overrides_response() {
        let mock = MockLlmProvider::with_name("broken");
        mock.set_error(ProviderError::auth("bad key"));

        let result = mock.chat(vec![], "m").await;
        assert!(matches!(result, Err(ProviderError::Auth { .. })));
        assert_eq!(mock.provider_name(), "broken");
    }
}
