//! Primary/fallback model calling
//!
//! `ModelCaller` owns the primary provider and an optional `FailoverTarget`.
//! Every completion goes to the primary first; on any failure the same
//! history is sent to the fallback exactly once.

use std::sync::Arc;

use tracing::{info, warn};

use crate::providers::{
    Credentials, DEFAULT_FALLBACK_MODEL, DEFAULT_MODEL, LlmMessage, LlmProvider, ProviderError,
    ProviderFactory, ProviderSettings,
};

/// Secondary provider used only when the primary fails
#[derive(Clone)]
pub struct FailoverTarget {
    provider: Arc<dyn LlmProvider>,
    model: String,
}

impl FailoverTarget {
    /// Creates a failover target for the given provider and model
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Returns the fallback model
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Issues chat completions with primary/fallback failover
#[derive(Clone)]
pub struct ModelCaller {
    primary: Arc<dyn LlmProvider>,
    model: String,
    fallback: Option<FailoverTarget>,
}

impl ModelCaller {
    /// Creates a caller without a fallback
    pub fn new(primary: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            primary,
            model: model.into(),
            fallback: None,
        }
    }

    /// Adds a fallback target
    pub fn with_fallback(mut self, fallback: FailoverTarget) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Builds a caller from settings
    ///
    /// The primary model is `model_hint`, else the configured model, else
    /// `DEFAULT_MODEL`. Credential overrides only apply to the primary. The
    /// fallback is enabled when its settings carry an API key.
    pub fn from_settings(
        primary: &ProviderSettings,
        fallback: Option<&ProviderSettings>,
        model_hint: Option<&str>,
        credentials: Option<&Credentials>,
    ) -> Result<Self, ProviderError> {
        let primary_settings = primary.clone().with_overrides(credentials);
        let model = resolve_model(model_hint, primary_settings.model.as_deref(), DEFAULT_MODEL);
        let provider: Arc<dyn LlmProvider> =
            Arc::from(ProviderFactory::create(&primary_settings, "primary")?);

        let mut caller = Self::new(provider, model);

        if let Some(settings) = fallback.filter(|s| s.is_configured()) {
            let fallback_model = resolve_model(None, settings.model.as_deref(), DEFAULT_FALLBACK_MODEL);
            let fallback_provider: Arc<dyn LlmProvider> =
                Arc::from(ProviderFactory::create(settings, "fallback")?);
            caller = caller.with_fallback(FailoverTarget::new(fallback_provider, fallback_model));
        }

        info!(
            model = %caller.model,
            fallback_model = ?caller.fallback.as_ref().map(|f| f.model.as_str()),
            "Model caller ready"
        );

        Ok(caller)
    }

    /// Returns the primary model
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns true when a fallback is configured
    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Requests a completion for `history`, returning an assistant message
    pub async fn complete(&self, history: &[LlmMessage]) -> Result<LlmMessage, ProviderError> {
        let primary_error = match self.primary.chat(history.to_vec(), &self.model).await {
            Ok(response) => return Ok(response.into_message()),
            Err(e) => e,
        };

        let Some(fallback) = &self.fallback else {
            return Err(primary_error);
        };

        warn!(
            provider = %self.primary.provider_name(),
            fallback = %fallback.provider.provider_name(),
            fallback_model = %fallback.model,
            error = %primary_error,
            "Primary provider failed, trying fallback"
        );

        match fallback.provider.chat(history.to_vec(), &fallback.model).await {
            Ok(response) => Ok(response.into_message()),
            Err(fallback_error) => {
                warn!(error = %fallback_error, "Fallback provider failed");
                Err(ProviderError::combined(&primary_error, &fallback_error))
            }
        }
    }
}

/// Picks the first non-empty model name
fn resolve_model(hint: Option<&str>, configured: Option<&str>, default: &str) -> String {
    hint.filter(|m| !m.trim().is_empty())
        .or(configured.filter(|m| !m.trim().is_empty()))
        .unwrap_or(default)
        .to_string()
}
