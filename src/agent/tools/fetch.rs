//! Fetch tool for the agent
//!
//! Pulls page content through a content-extraction proxy (r.jina.ai style:
//! `GET <proxy>/<url>`) and hands the extracted text back unchanged.

use std::time::Duration;

use crate::agent::tools::types::{Tool, ToolError, ToolKind, ToolResult};

/// Default timeout for fetch requests in seconds
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;
/// Maximum number of redirects to follow
const MAX_REDIRECTS: usize = 5;
/// Maximum error body size to include in error messages
const MAX_ERROR_BODY_SIZE: usize = 500;

/// Tool for fetching URL content through an extraction proxy
#[derive(Debug, Clone)]
pub struct FetchTool {
    proxy_url: String,
    client: reqwest::Client,
}

impl FetchTool {
    /// Creates a new FetchTool using the given proxy base URL
    pub fn try_new(proxy_url: impl Into<String>) -> ToolResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(concat!("scoutclaw/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ToolError::ExecutionFailed {
                tool: ToolKind::Fetch.as_str().to_string(),
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            proxy_url: proxy_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Builds the proxied URL for a target
    pub fn proxied_url(&self, target: &str) -> String {
        format!("{}/{}", self.proxy_url, target.trim())
    }
}

#[async_trait::async_trait]
impl Tool for FetchTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Fetch
    }

    fn description(&self) -> &str {
        "Fetches a URL and returns its readable text content."
    }

    async fn execute(&self, input: &str) -> ToolResult<String> {
        let url = self.proxied_url(input);
        tracing::debug!(url = %url, "Fetching content through proxy");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ToolError::from_request(self.name(), e, DEFAULT_FETCH_TIMEOUT_SECS))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ToolError::ExecutionFailed {
            tool: self.name().to_string(),
            message: format!("Failed to read response body: {}", e),
        })?;

        if status.is_client_error() || status.is_server_error() {
            let error_body: String = body.chars().take(MAX_ERROR_BODY_SIZE).collect();
            return Err(ToolError::ExecutionFailed {
                tool: self.name().to_string(),
                message: format!("HTTP error {}. Response body: {}", status, error_body),
            });
        }

        Ok(body)
    }
}
