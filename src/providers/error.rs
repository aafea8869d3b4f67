//! Error types for LLM provider operations
//!
//! Errors are split between transport/provider failures and response-shape
//! failures (`EmptyChoices`, `EmptyContent`). `Combined` is only produced by
//! the model caller when both the primary and the fallback provider failed.

use thiserror::Error;

/// Errors that can occur when interacting with LLM providers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Network-related errors (connection issues, DNS failures)
    #[error("Network error: {message}")]
    Network {
        /// Error message
        message: String,
    },

    /// Authentication errors (invalid API key, unauthorized access)
    #[error("Authentication error: {message}")]
    Auth {
        /// Error message
        message: String,
    },

    /// Rate limit errors (too many requests, quota exceeded)
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        /// Error message
        message: String,
    },

    /// Invalid request errors (bad parameters, malformed input)
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Error message
        message: String,
    },

    /// Timeout errors (request took too long)
    #[error("Request timeout after {seconds} seconds")]
    Timeout {
        /// Timeout duration in seconds
        seconds: u64,
    },

    /// Provider-specific errors (errors from the LLM service)
    #[error("Provider error: {message}")]
    Provider {
        /// Error message from provider
        message: String,
        /// Optional error code from provider
        code: Option<String>,
    },

    /// The response carried no choice list
    #[error("Provider returned no choices: {detail}")]
    EmptyChoices {
        /// Provider error detail embedded in the response, if any
        detail: String,
    },

    /// The top choice carried no message content
    #[error("Provider returned an empty message")]
    EmptyContent,

    /// Both the primary and the fallback provider failed
    #[error("Primary provider failed: {primary}; fallback provider failed: {fallback}")]
    Combined {
        /// Failure message of the primary provider
        primary: String,
        /// Failure message of the fallback provider
        fallback: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message
        message: String,
    },

    /// Configuration errors (missing required config, invalid settings)
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },
}

impl ProviderError {
    /// Creates a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates an authentication error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Creates a rate limit error
    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::RateLimit {
            message: message.into(),
        }
    }

    /// Creates an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a timeout error
    pub fn timeout(seconds: u64) -> Self {
        Self::Timeout { seconds }
    }

    /// Creates a provider error
    pub fn provider(message: impl Into<String>, code: Option<impl Into<String>>) -> Self {
        Self::Provider {
            message: message.into(),
            code: code.map(|c| c.into()),
        }
    }

    /// Creates an empty-choices error
    pub fn empty_choices(detail: impl Into<String>) -> Self {
        Self::EmptyChoices {
            detail: detail.into(),
        }
    }

    /// Creates a combined primary/fallback error
    pub fn combined(primary: &ProviderError, fallback: &ProviderError) -> Self {
        Self::Combined {
            primary: primary.to_string(),
            fallback: fallback.to_string(),
        }
    }

    /// Creates a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Creates a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

/// Result type for provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;
