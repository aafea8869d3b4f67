//! Provider factory for creating LLM provider instances
//!
//! This module holds the serializable provider settings and builds
//! `GenericOpenAiProvider` instances from them, applying per-run credential
//! overrides on top of the configured defaults.

use serde::{Deserialize, Serialize};

use crate::providers::{BoxedProvider, GenericOpenAiProvider, ProviderError};

/// Base URL used when neither configuration nor overrides provide one
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Model used when neither the run nor the configuration names one
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Model used for the fallback provider when its settings name none
pub const DEFAULT_FALLBACK_MODEL: &str = "gpt-4o-mini";

/// Settings for one OpenAI-compatible endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderSettings {
    /// API key for the endpoint
    #[serde(default)]
    pub api_key: String,
    /// Base URL of the API (without the `/chat/completions` suffix)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Default model for this endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// HTTP timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    120
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self::new("")
    }
}

impl ProviderSettings {
    /// Creates settings with the given API key and default endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            model: None,
            timeout_seconds: default_timeout(),
        }
    }

    /// Sets a custom base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the default model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Returns true when an API key is present
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Applies per-run credential overrides, keeping configured values for
    /// anything the overrides leave unset
    pub fn with_overrides(mut self, credentials: Option<&Credentials>) -> Self {
        if let Some(credentials) = credentials {
            if let Some(key) = credentials.api_key.as_ref().filter(|k| !k.is_empty()) {
                self.api_key = key.clone();
            }
            if let Some(url) = credentials.base_url.as_ref().filter(|u| !u.is_empty()) {
                self.base_url = url.clone();
            }
        }
        self
    }

    /// Validates the settings
    pub fn validate(&self) -> Result<(), ProviderError> {
        if !self.is_configured() {
            return Err(ProviderError::config("API key is required"));
        }

        if self.base_url.trim().is_empty() {
            return Err(ProviderError::config("Base URL cannot be empty"));
        }

        Ok(())
    }
}

/// Per-run credential overrides for the primary provider
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    /// API key replacing the configured one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL replacing the configured one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Credentials {
    /// Returns true when no override is set
    pub fn is_empty(&self) -> bool {
        self.api_key.is_none() && self.base_url.is_none()
    }
}

/// Factory for creating LLM providers from settings
pub struct ProviderFactory;

impl ProviderFactory {
    /// Creates a provider from validated settings
    pub fn create(settings: &ProviderSettings, name: &str) -> Result<BoxedProvider, ProviderError> {
        settings.validate()?;

        tracing::debug!(
            provider = name,
            base_url = %settings.base_url,
            timeout_seconds = settings.timeout_seconds,
            "Creating OpenAI-compatible provider"
        );

        let provider = GenericOpenAiProvider::try_new(
            settings.api_key.clone(),
            settings.base_url.clone(),
            name.to_string(),
            settings.timeout_seconds,
        )?;

        Ok(Box::new(provider))
    }
}
