//! LLM Provider module for scoutclaw
//!
//! This module defines the trait and types for talking to OpenAI-compatible
//! chat-completion endpoints, plus the model caller that fails over from a
//! primary provider to an optional fallback.
//!
//! # Architecture
//!
//! - `LlmProvider` trait defines the interface all providers must implement
//! - `GenericOpenAiProvider` speaks the OpenAI chat-completions wire format
//! - `ProviderFactory` builds providers from `ProviderSettings`
//! - `ModelCaller` resolves the model and applies primary/fallback failover
//!
//! # Example
//!
//! ```rust,no_run
//! use scoutclaw::providers::{LlmMessage, LlmProvider, LlmRole};
//!
//! async fn example(provider: &dyn LlmProvider) {
//!     let messages = vec![
//!         LlmMessage::new(LlmRole::System, "You are a research assistant"),
//!         LlmMessage::new(LlmRole::User, "Hello!"),
//!     ];
//!
//!     let response = provider.chat(messages, "model-name").await.unwrap();
//!     println!("Response: {}", response.content);
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod error;
pub mod factory;
pub mod failover;
#[cfg(test)]
pub mod mock;
pub mod openai;

pub use error::ProviderError;
pub use factory::{
    Credentials, DEFAULT_BASE_URL, DEFAULT_FALLBACK_MODEL, DEFAULT_MODEL, ProviderFactory,
    ProviderSettings,
};
pub use failover::{FailoverTarget, ModelCaller};
pub use openai::GenericOpenAiProvider;

/// Represents a message in the conversation for LLM context
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmMessage {
    /// Role of the message sender
    pub role: LlmRole,
    /// Content of the message
    pub content: String,
}

impl LlmMessage {
    /// Creates a new message with the specified role and content
    pub fn new(role: LlmRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(LlmRole::System, content)
    }

    /// Creates a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(LlmRole::User, content)
    }

    /// Creates an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(LlmRole::Assistant, content)
    }

    /// Returns true if this message is from the system
    pub fn is_system(&self) -> bool {
        matches!(self.role, LlmRole::System)
    }

    /// Returns true if this message is from the user
    pub fn is_user(&self) -> bool {
        matches!(self.role, LlmRole::User)
    }

    /// Returns true if this message is from the assistant
    pub fn is_assistant(&self) -> bool {
        matches!(self.role, LlmRole::Assistant)
    }
}

/// Role of a message sender in the conversation
///
/// Tool observations are fed back as `User` messages, so there is no
/// dedicated tool role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmRole {
    /// System prompt/instructions
    System,
    /// User input and tool observations
    User,
    /// Assistant response
    Assistant,
}

impl LlmRole {
    /// Returns the string representation of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmRole::System => "system",
            LlmRole::User => "user",
            LlmRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for LlmRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Response from the LLM provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmResponse {
    /// Content of the assistant's response
    pub content: String,
    /// Number of tokens in the prompt (if provided by provider)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u32>,
    /// Number of tokens in the completion (if provided by provider)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u32>,
}

impl LlmResponse {
    /// Creates a new response with just content
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            prompt_tokens: None,
            completion_tokens: None,
        }
    }

    /// Adds token usage information
    pub fn with_tokens(mut self, prompt: u32, completion: u32) -> Self {
        self.prompt_tokens = Some(prompt);
        self.completion_tokens = Some(completion);
        self
    }

    /// Returns the total token count if available
    pub fn total_tokens(&self) -> Option<u32> {
        match (self.prompt_tokens, self.completion_tokens) {
            (Some(p), Some(c)) => Some(p + c),
            _ => None,
        }
    }

    /// Converts the response into an assistant-authored conversation message
    pub fn into_message(self) -> LlmMessage {
        LlmMessage::assistant(self.content)
    }
}

/// Trait for LLM providers
///
/// All implementations must be Send + Sync so a provider can be shared
/// between the primary and fallback slots of a `ModelCaller`.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a chat request to the LLM with the full conversation history
    ///
    /// Implementations must reject responses without choices
    /// (`ProviderError::EmptyChoices`) or with empty content
    /// (`ProviderError::EmptyContent`).
    async fn chat(&self, messages: Vec<LlmMessage>, model: &str)
    -> Result<LlmResponse, ProviderError>;

    /// Returns the provider name
    ///
    /// Used for logging and identification
    fn provider_name(&self) -> &str;
}

/// Type alias for a boxed LlmProvider trait object
pub type BoxedProvider = Box<dyn LlmProvider>;
