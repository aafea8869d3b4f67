//! Generic OpenAI-compatible provider implementation
//!
//! This module provides an implementation of the `LlmProvider` trait for any
//! OpenAI-compatible chat-completions endpoint (OpenAI, OpenRouter, DeepSeek,
//! self-hosted gateways).
//!
//! The provider performs a single HTTP request per call. Retries and failover
//! are handled one level up, by the step executor and the `ModelCaller`.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::providers::{LlmMessage, LlmProvider, LlmResponse, ProviderError};

/// OpenAI API request body format
#[derive(Debug, Serialize)]
struct OpenAiRequest {
    /// Model to use for completion
    model: String,
    /// Messages in the conversation
    messages: Vec<OpenAiMessage>,
}

/// OpenAI message format
#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    /// Role of the message sender
    #[serde(default)]
    role: String,
    /// Content of the message
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI API response format
///
/// Every field is optional: error payloads from OpenAI-compatible gateways
/// frequently come back with a 200 status and no `choices` at all.
#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    /// Response choices (usually only 1)
    #[serde(default)]
    choices: Option<Vec<OpenAiChoice>>,
    /// Token usage information
    #[serde(default)]
    usage: Option<OpenAiUsage>,
    /// Error information if request failed (object or plain string)
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// OpenAI choice format
#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    /// Message from the assistant
    message: OpenAiMessage,
}

/// OpenAI token usage format
#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// Generic OpenAI-compatible provider implementation
#[derive(Debug, Clone)]
pub struct GenericOpenAiProvider {
    /// API key for authentication
    api_key: String,
    /// Base URL for the API
    base_url: String,
    /// Provider name for identification
    provider_name: String,
    /// HTTP timeout in seconds, reported in timeout errors
    timeout_seconds: u64,
    /// HTTP client for making requests
    client: Client,
}

impl GenericOpenAiProvider {
    /// Creates a new provider, returning an error if the HTTP client fails to build
    ///
    /// # Arguments
    ///
    /// * `api_key` - API key for authentication
    /// * `base_url` - Base URL for the API (e.g., "https://api.openai.com/v1")
    /// * `provider_name` - Provider name for identification in logs
    /// * `timeout_seconds` - HTTP timeout in seconds
    pub fn try_new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        provider_name: impl Into<String>,
        timeout_seconds: u64,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ProviderError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            provider_name: provider_name.into(),
            timeout_seconds,
            client,
        })
    }

    /// Returns the completions endpoint URL
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Builds the OpenAI API request body from messages
    fn build_request(&self, messages: Vec<LlmMessage>, model: &str) -> OpenAiRequest {
        let messages = messages
            .into_iter()
            .map(|msg| OpenAiMessage {
                role: msg.role.as_str().to_string(),
                content: Some(msg.content),
            })
            .collect();

        OpenAiRequest {
            model: model.to_string(),
            messages,
        }
    }

    /// Validates the response shape and converts it into an `LlmResponse`
    fn parse_response(&self, response: OpenAiResponse) -> Result<LlmResponse, ProviderError> {
        let choice = match response.choices {
            Some(choices) if !choices.is_empty() => choices.into_iter().next(),
            _ => None,
        };

        let Some(choice) = choice else {
            let detail = response
                .error
                .as_ref()
                .map(describe_error)
                .unwrap_or_else(|| "response contained no choices".to_string());
            return Err(ProviderError::empty_choices(detail));
        };

        let content = choice.message.content.unwrap_or_default();
        if content.is_empty() {
            return Err(ProviderError::EmptyContent);
        }

        let mut llm_response = LlmResponse::new(content);
        if let Some(usage) = response.usage {
            llm_response = llm_response.with_tokens(usage.prompt_tokens, usage.completion_tokens);
        }

        Ok(llm_response)
    }

    /// Sends the request and maps HTTP failures onto `ProviderError`
    async fn send_request(&self, request: &OpenAiRequest) -> Result<OpenAiResponse, ProviderError> {
        let url = self.completions_url();
        debug!(url = %url, provider = %self.provider_name, "Making OpenAI-compatible API request");

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, provider = %self.provider_name, "Request failed");
                if e.is_timeout() {
                    ProviderError::timeout(self.timeout_seconds)
                } else if e.is_connect() {
                    ProviderError::network(format!("Connection failed: {}", e))
                } else {
                    ProviderError::network(format!("Request failed: {}", e))
                }
            })?;

        let status = resp.status();
        debug!(status = %status, "Received response");

        match status {
            status if status.is_success() => {
                let body = resp.text().await.map_err(|e| {
                    ProviderError::network(format!("Failed to read response body: {}", e))
                })?;
                serde_json::from_str::<OpenAiResponse>(&body).map_err(|e| {
                    ProviderError::serialization(format!(
                        "Failed to parse response: {}. Body: {}",
                        e, body
                    ))
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let error_text = resp.text().await.unwrap_or_default();
                Err(ProviderError::auth(format!(
                    "Authentication failed ({}): {}",
                    status, error_text
                )))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let error_text = resp.text().await.unwrap_or_default();
                Err(ProviderError::rate_limit(format!(
                    "Rate limit exceeded ({}): {}",
                    status, error_text
                )))
            }
            status if status.is_client_error() => {
                let error_text = resp.text().await.unwrap_or_default();
                Err(ProviderError::invalid_request(format!(
                    "Client error ({}): {}",
                    status, error_text
                )))
            }
            _ => {
                let error_text = resp.text().await.unwrap_or_default();
                Err(ProviderError::provider(
                    format!("Server error ({}): {}", status, error_text),
                    Some(status.as_u16().to_string()),
                ))
            }
        }
    }
}

/// Renders an embedded provider error payload for diagnostics
fn describe_error(error: &serde_json::Value) -> String {
    match error {
        serde_json::Value::String(message) => message.clone(),
        serde_json::Value::Object(fields) => fields
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    }
}

#[async_trait::async_trait]
impl LlmProvider for GenericOpenAiProvider {
    async fn chat(
        &self,
        messages: Vec<LlmMessage>,
        model: &str,
    ) -> Result<LlmResponse, ProviderError> {
        info!(
            model = model,
            provider = %self.provider_name,
            message_count = messages.len(),
            "Sending chat request to {}",
            self.provider_name
        );

        let request = self.build_request(messages, model);
        let response = self.send_request(&request).await?;
        let llm_response = self.parse_response(response)?;

        info!(
            content_length = llm_response.content.len(),
            prompt_tokens = ?llm_response.prompt_tokens,
            completion_tokens = ?llm_response.completion_tokens,
            total_tokens = ?llm_response.total_tokens(),
            "Received response from {}",
            self.provider_name
        );

        Ok(llm_response)
    }

    fn provider_name(&self) -> &str {
        &self.provider_name
    }
}
