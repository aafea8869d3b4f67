//! Tools the research agent can call
//!
//! The model asks for a tool by emitting a `tool-<name>` block (see
//! [`parser`]); the [`ToolRegistry`] then dispatches the first such block to
//! the matching [`Tool`] and wraps the observation in a user message.

pub mod fetch;
pub mod parser;
pub mod search;
pub mod types;

use std::collections::HashMap;

pub use fetch::FetchTool;
pub use parser::{ToolInvocation, first_tool_call, parse_tool_invocation};
pub use search::SearchTool;
pub use types::{Tool, ToolCall, ToolError, ToolKind, ToolResult};

use crate::config::Config;
use crate::providers::LlmMessage;

/// Registry for managing available tools
pub struct ToolRegistry {
    tools: HashMap<ToolKind, Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Creates a new empty tool registry
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Creates a registry with the search and fetch tools from configuration
    ///
    /// Search is only registered when an API key and engine id are present.
    pub fn with_default_tools(config: &Config) -> ToolResult<Self> {
        let mut registry = Self::new();

        if config.search.is_configured() {
            registry.register(Box::new(SearchTool::try_new(
                config.search.endpoint.clone(),
                config.search.api_key.clone(),
                config.search.engine_id.clone(),
            )?))?;
        } else {
            tracing::warn!("Search API key or engine id missing, search tool disabled");
        }

        registry.register(Box::new(FetchTool::try_new(config.fetch.proxy_url.clone())?))?;

        tracing::debug!(tools = ?registry.list_tools(), "Tool registry ready");
        Ok(registry)
    }

    /// Registers a tool in the registry
    ///
    /// # Errors
    /// Returns an error if a tool of the same kind is already registered
    pub fn register(&mut self, tool: Box<dyn Tool>) -> ToolResult<()> {
        let kind = tool.kind();

        if self.tools.contains_key(&kind) {
            return Err(ToolError::ExecutionFailed {
                tool: kind.to_string(),
                message: format!("Tool '{}' is already registered", kind),
            });
        }

        self.tools.insert(kind, tool);
        Ok(())
    }

    /// Retrieves a tool by kind
    pub fn get(&self, kind: ToolKind) -> Option<&dyn Tool> {
        self.tools.get(&kind).map(|t| t.as_ref())
    }

    /// Lists registered tool names in prompt order
    pub fn list_tools(&self) -> Vec<&'static str> {
        ToolKind::ALL
            .iter()
            .filter(|kind| self.tools.contains_key(kind))
            .map(|kind| kind.as_str())
            .collect()
    }

    /// Lists each registered tool as a `tool-<name>` line with its description, in prompt order
    pub fn describe(&self) -> String {
        ToolKind::ALL
            .iter()
            .filter_map(|kind| self.get(*kind))
            .map(|tool| format!("- `tool-{}`: {}", tool.kind(), tool.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Runs `call` and returns its observation as a single user message
    pub async fn dispatch(&self, call: &ToolCall) -> ToolResult<LlmMessage> {
        let tool = self
            .get(call.kind)
            .ok_or_else(|| ToolError::NotFound(call.kind.to_string()))?;

        tracing::info!(tool = %call.kind, input = %call.input, "Dispatching tool call");
        let started = std::time::Instant::now();

        let observation = tool.execute(&call.input).await.inspect_err(|e| {
            tracing::warn!(tool = %call.kind, error = %e, "Tool execution failed");
        })?;

        tracing::debug!(
            tool = %call.kind,
            output_len = observation.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "Tool executed successfully"
        );

        Ok(LlmMessage::user(observation))
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
