//! Types for the tool system
//!
//! This module defines the core types for the tool system including:
//! - Tool trait for implementing tools
//! - ToolKind / ToolCall for the tool requests a model can make
//! - ToolError for error handling
//! - ToolResult type alias

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error types for tool execution
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    /// Tool not found in registry
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Tool execution failed (transport or HTTP status failure)
    #[error("Tool '{tool}' execution failed: {message}")]
    ExecutionFailed { tool: String, message: String },

    /// The collaborator answered but the payload lacked the expected shape
    #[error("Tool '{tool}' received a malformed response: {body}")]
    MalformedResponse { tool: String, body: String },

    /// Tool execution timed out
    #[error("Tool '{tool}' timed out after {duration}s")]
    Timeout { tool: String, duration: u64 },
}

impl ToolError {
    /// Maps a reqwest error onto the matching tool error
    pub(crate) fn from_request(tool: &str, err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            ToolError::Timeout {
                tool: tool.to_string(),
                duration: timeout_secs,
            }
        } else if err.is_connect() {
            ToolError::ExecutionFailed {
                tool: tool.to_string(),
                message: format!("Connection failed: {}. Check URL and network connectivity.", err),
            }
        } else {
            ToolError::ExecutionFailed {
                tool: tool.to_string(),
                message: format!("Request failed: {}", err),
            }
        }
    }
}

/// Result type for tool operations
pub type ToolResult<T> = std::result::Result<T, ToolError>;

/// The tools a model may request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// Web search
    Search,
    /// URL content extraction
    Fetch,
}

impl ToolKind {
    /// All known tools, in prompt order
    pub const ALL: [ToolKind; 2] = [ToolKind::Search, ToolKind::Fetch];

    /// Returns the wire name used in `tool-<name>` blocks
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::Search => "search",
            ToolKind::Fetch => "fetch",
        }
    }

    /// Looks up a tool by its wire name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "search" => Some(ToolKind::Search),
            "fetch" => Some(ToolKind::Fetch),
            _ => None,
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A tool request extracted from assistant output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    /// Which tool to run
    pub kind: ToolKind,
    /// Free-text input (query or URL)
    pub input: String,
}

impl ToolCall {
    /// Creates a new tool call
    pub fn new(kind: ToolKind, input: impl Into<String>) -> Self {
        Self {
            kind,
            input: input.into(),
        }
    }
}

/// Trait for implementing tools that the agent can use
///
/// Any type implementing this trait can be registered with the ToolRegistry
/// and dispatched when the model emits a matching `tool-<name>` block.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Which tool request this implementation serves
    fn kind(&self) -> ToolKind;

    /// Returns a description of what the tool does
    fn description(&self) -> &str;

    /// Executes the tool with the raw block input
    ///
    /// # Returns
    /// * `Ok(String)` - The observation text handed back to the model
    /// * `Err(ToolError)` - If execution fails
    async fn execute(&self, input: &str) -> ToolResult<String>;

    /// Returns the wire name of the tool
    fn name(&self) -> &'static str {
        self.kind().as_str()
    }
}
