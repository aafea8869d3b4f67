//! Conversation history for one run
//!
//! A run's history is seeded with the system prompt (current date
//! substituted) and the user's instructions, then only ever grows by one
//! message per completed iteration.

use chrono::{DateTime, Utc};

use crate::agent::tools::ToolRegistry;
use crate::providers::LlmMessage;

const SYSTEM_PROMPT_TEMPLATE: &str = "You are a research agent. Today's date is {date}.

Work on the user's instructions step by step. When you need information, call a tool by \
replying with a single fenced block named after the tool, its input on the next line, and \
nothing after it:

```tool-<name>
<input>
```

Available tools:
{tools}

Only the first tool block in a reply is executed; its output arrives in the next user message.

When you have everything you need, reply with the final answer and no tool block.";

/// Builds the system prompt for a run started at `now`
///
/// `tools` is the tool listing from [`ToolRegistry::describe`].
pub fn system_prompt(now: DateTime<Utc>, tools: &str) -> String {
    SYSTEM_PROMPT_TEMPLATE
        .replace("{date}", &now.format("%Y-%m-%d").to_string())
        .replace("{tools}", tools)
}

/// Ordered, append-only message history owned by a single run
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    messages: Vec<LlmMessage>,
}

impl Conversation {
    /// Seeds a conversation with the system prompt and the task instructions
    pub fn seeded(now: DateTime<Utc>, tools: &ToolRegistry, instructions: impl Into<String>) -> Self {
        Self {
            messages: vec![
                LlmMessage::system(system_prompt(now, &tools.describe())),
                LlmMessage::user(instructions),
            ],
        }
    }

    pub fn push(&mut self, message: LlmMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[LlmMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
