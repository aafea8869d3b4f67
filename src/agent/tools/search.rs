//! Web search tool for the agent
//!
//! Queries a Google Custom Search compatible endpoint and renders the
//! result list as numbered plain-text lines for the model.

use std::time::Duration;

use serde::Deserialize;

use crate::agent::tools::types::{Tool, ToolError, ToolKind, ToolResult};

/// Default timeout for search requests in seconds
const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 30;

/// One entry of the search response `items` list
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SearchItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Option<Vec<SearchItem>>,
}

/// Renders items as `"<index>. <title>\n<link>\n<snippet>"`, 0-indexed,
/// joined with newlines
pub fn format_items(items: &[SearchItem]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| format!("{}. {}\n{}\n{}", index, item.title, item.link, item.snippet))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parses a raw search response body and formats its items
///
/// A body that is not JSON or lacks an `items` list is treated as an error
/// payload and returned verbatim inside the error.
pub fn format_search_response(body: &str) -> ToolResult<String> {
    let malformed = || ToolError::MalformedResponse {
        tool: ToolKind::Search.as_str().to_string(),
        body: body.to_string(),
    };

    let response: SearchResponse = serde_json::from_str(body).map_err(|_| malformed())?;
    let items = response.items.ok_or_else(malformed)?;

    Ok(format_items(&items))
}

/// Tool for searching the web
#[derive(Debug, Clone)]
pub struct SearchTool {
    endpoint: String,
    api_key: String,
    engine_id: String,
    client: reqwest::Client,
}

impl SearchTool {
    /// Creates a new SearchTool
    ///
    /// # Arguments
    /// * `endpoint` - Search endpoint (e.g. `https://www.googleapis.com/customsearch/v1`)
    /// * `api_key` - Search API key
    /// * `engine_id` - Programmable search engine id
    pub fn try_new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        engine_id: impl Into<String>,
    ) -> ToolResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_SEARCH_TIMEOUT_SECS))
            .user_agent(concat!("scoutclaw/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ToolError::ExecutionFailed {
                tool: ToolKind::Search.as_str().to_string(),
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            engine_id: engine_id.into(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl Tool for SearchTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Search
    }

    fn description(&self) -> &str {
        "Searches the web. Input is a search query; output lists title, link and snippet per result."
    }

    async fn execute(&self, query: &str) -> ToolResult<String> {
        tracing::debug!(query = %query, "Running web search");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
            ])
            .send()
            .await
            .map_err(|e| ToolError::from_request(self.name(), e, DEFAULT_SEARCH_TIMEOUT_SECS))?;

        let body = response.text().await.map_err(|e| ToolError::ExecutionFailed {
            tool: self.name().to_string(),
            message: format!("Failed to read response body: {}", e),
        })?;

        format_search_response(&body)
    }
}
