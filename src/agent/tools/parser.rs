//! Tool-call block parser
//!
//! Models request tools by embedding fenced blocks in their reply:
//!
//! ````text
//! ```tool-search
//! rust async runtimes comparison
//! ```
//! ````
//!
//! Parsing happens in two explicit steps. `parse_blocks` classifies every
//! block in the text, then `select` applies the first-match-wins rule: the
//! first recognized block is the one acted upon, any later block is ignored.

use std::sync::LazyLock;

use regex::Regex;

use crate::agent::tools::types::{ToolCall, ToolKind};

/// ```` ```tool-<name>\n<input>\n``` ````, input may span several lines
static TOOL_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```tool-([A-Za-z0-9_-]*)\r?\n(.*?)\r?\n```").expect("tool block pattern is valid")
});

/// Result of looking for a tool request in a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolInvocation {
    /// No tool block present
    None,
    /// A `tool-search` block with its query
    Search(String),
    /// A `tool-fetch` block with its URL
    Fetch(String),
    /// A `tool-<name>` block naming an unknown tool, kept verbatim
    Unrecognized(String),
}

impl ToolInvocation {
    /// Returns the dispatchable call, if this invocation names a known tool
    pub fn as_call(&self) -> Option<ToolCall> {
        match self {
            ToolInvocation::Search(input) => Some(ToolCall::new(ToolKind::Search, input.clone())),
            ToolInvocation::Fetch(input) => Some(ToolCall::new(ToolKind::Fetch, input.clone())),
            ToolInvocation::None | ToolInvocation::Unrecognized(_) => None,
        }
    }

    /// Returns true when this invocation can be dispatched
    pub fn is_actionable(&self) -> bool {
        matches!(self, ToolInvocation::Search(_) | ToolInvocation::Fetch(_))
    }
}

/// Classifies every tool block in `content`, in order of appearance
pub fn parse_blocks(content: &str) -> Vec<ToolInvocation> {
    TOOL_BLOCK
        .captures_iter(content)
        .map(|caps| {
            let name = caps.get(1).map_or("", |m| m.as_str());
            let input = caps.get(2).map_or("", |m| m.as_str()).to_string();
            match ToolKind::from_name(name) {
                Some(ToolKind::Search) => ToolInvocation::Search(input),
                Some(ToolKind::Fetch) => ToolInvocation::Fetch(input),
                None => ToolInvocation::Unrecognized(
                    caps.get(0).map_or("", |m| m.as_str()).to_string(),
                ),
            }
        })
        .collect()
}

/// Picks the invocation to act on: the first recognized block, else the
/// first unrecognized one, else `None`
pub fn select(blocks: Vec<ToolInvocation>) -> ToolInvocation {
    let mut unrecognized = None;

    for block in blocks {
        if block.is_actionable() {
            return block;
        }
        if unrecognized.is_none() && matches!(block, ToolInvocation::Unrecognized(_)) {
            unrecognized = Some(block);
        }
    }

    unrecognized.unwrap_or(ToolInvocation::None)
}

/// Parses `content` and selects the invocation to act on
pub fn parse_tool_invocation(content: &str) -> ToolInvocation {
    select(parse_blocks(content))
}

/// Returns the call to dispatch for `content`, if any
pub fn first_tool_call(content: &str) -> Option<ToolCall> {
    parse_tool_invocation(content).as_call()
}
