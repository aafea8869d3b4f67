//! Step execution with a bounded, fixed-delay retry policy
//!
//! One step produces exactly one new message: a tool observation when the
//! last message is an assistant tool request, otherwise a model completion.
//! A failed attempt re-enters the whole step.

use std::sync::Arc;
use std::time::Duration;

use crate::agent::agent_loop::{AgentError, Result};
use crate::agent::tools::{ToolError, ToolRegistry, first_tool_call};
use crate::config::RetryConfig;
use crate::providers::{LlmMessage, ModelCaller, ProviderError};

/// Attempts and delay applied to every step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first; never below 1
    pub max_attempts: u32,
    /// Fixed pause between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Single attempt, no delay
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_secs(config.delay_seconds))
    }
}

/// Failure of a single step attempt
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum StepError {
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Model error: {0}")]
    Model(#[from] ProviderError),
}

/// Runs one iteration of the agent loop under a [`RetryPolicy`]
pub struct StepExecutor {
    model_caller: ModelCaller,
    tools: Arc<ToolRegistry>,
    policy: RetryPolicy,
}

impl StepExecutor {
    pub fn new(model_caller: ModelCaller, tools: Arc<ToolRegistry>, policy: RetryPolicy) -> Self {
        Self {
            model_caller,
            tools,
            policy,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn model_caller(&self) -> &ModelCaller {
        &self.model_caller
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Executes one step, retrying the whole step on failure
    ///
    /// Once the policy is exhausted the last attempt's error is returned as
    /// [`AgentError::StepFailed`].
    pub async fn execute_step(&self, history: &[LlmMessage]) -> Result<LlmMessage> {
        let mut attempt: u32 = 1;

        loop {
            match self.attempt(history).await {
                Ok(message) => return Ok(message),
                Err(e) if attempt >= self.policy.max_attempts => {
                    tracing::error!(attempt, error = %e, "Step failed after all attempts");
                    return Err(AgentError::StepFailed {
                        attempts: attempt,
                        source: e,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        delay_secs = self.policy.delay.as_secs_f64(),
                        error = %e,
                        "Step failed, retrying"
                    );
                    if !self.policy.delay.is_zero() {
                        tokio::time::sleep(self.policy.delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }

    async fn attempt(&self, history: &[LlmMessage]) -> std::result::Result<LlmMessage, StepError> {
        let pending_call = history
            .last()
            .filter(|m| m.is_assistant())
            .and_then(|m| first_tool_call(&m.content));

        match pending_call {
            Some(call) => Ok(self.tools.dispatch(&call).await?),
            None => Ok(self.model_caller.complete(history).await?),
        }
    }
}
