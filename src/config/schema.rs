use serde::{Deserialize, Serialize};

use crate::providers::ProviderSettings;

/// Default highest iteration index of a run
pub const DEFAULT_MAX_ITERATIONS: u32 = 1024;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Primary chat-completion endpoint
    #[serde(default)]
    pub provider: ProviderSettings,

    /// Secondary endpoint, used only when the primary fails
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<ProviderSettings>,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

fn default_max_iterations() -> u32 {
    DEFAULT_MAX_ITERATIONS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderSettings::default(),
            fallback: None,
            search: SearchConfig::default(),
            fetch: FetchConfig::default(),
            retry: RetryConfig::default(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub engine_id: String,
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,
}

fn default_search_endpoint() -> String {
    "https://www.googleapis.com/customsearch/v1".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            engine_id: String::new(),
            endpoint: default_search_endpoint(),
        }
    }
}

impl SearchConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.engine_id.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetchConfig {
    #[serde(default = "default_proxy_url")]
    pub proxy_url: String,
}

fn default_proxy_url() -> String {
    "https://r.jina.ai".to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            proxy_url: default_proxy_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryConfig {
    /// Total attempts per step, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Fixed delay between attempts
    #[serde(default = "default_delay_seconds")]
    pub delay_seconds: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_delay_seconds() -> u64 {
    60
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_seconds: default_delay_seconds(),
        }
    }
}

/// Loggable view of the configuration with secrets reduced to flags
#[derive(Debug, Clone, PartialEq)]
pub struct SafeSummary {
    pub api_key_configured: bool,
    pub base_url: String,
    pub model: Option<String>,
    pub fallback_configured: bool,
    pub search_configured: bool,
    pub max_iterations: u32,
}

impl Config {
    pub fn get_safe_summary(&self) -> SafeSummary {
        SafeSummary {
            api_key_configured: self.provider.is_configured(),
            base_url: self.provider.base_url.clone(),
            model: self.provider.model.clone(),
            fallback_configured: self.fallback.as_ref().is_some_and(|f| f.is_configured()),
            search_configured: self.search.is_configured(),
            max_iterations: self.max_iterations,
        }
    }
}
