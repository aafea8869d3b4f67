//! Wiring a run from configuration
//!
//! Turns a loaded [`Config`] plus per-run [`RunParameters`] into a ready
//! [`AgentLoop`] and executes it.

use std::sync::Arc;

use crate::agent::agent_loop::{AgentError, AgentLoop, Result, RunParameters, RunResult};
use crate::agent::clock::{Clock, SystemClock};
use crate::agent::step::{RetryPolicy, StepExecutor};
use crate::agent::tools::ToolRegistry;
use crate::config::Config;
use crate::providers::ModelCaller;

/// Builds the agent for `params` on top of `config`
///
/// The model hint and credential overrides from `params` only affect the
/// primary provider.
pub fn build_agent(config: &Config, params: &RunParameters, clock: Arc<dyn Clock>) -> Result<AgentLoop> {
    let model_caller = ModelCaller::from_settings(
        &config.provider,
        config.fallback.as_ref(),
        params.model.as_deref(),
        params.credentials.as_ref(),
    )
    .map_err(|e| AgentError::Setup(format!("Failed to create LLM provider: {}", e)))?;

    let tools = ToolRegistry::with_default_tools(config)
        .map_err(|e| AgentError::Setup(format!("Failed to create tools: {}", e)))?;

    let executor = StepExecutor::new(
        model_caller,
        Arc::new(tools),
        RetryPolicy::from(&config.retry),
    );

    Ok(AgentLoop::new(executor, clock).with_max_iterations(config.max_iterations))
}

/// Executes one run against the system clock
pub async fn execute_run(config: &Config, params: &RunParameters) -> Result<Option<RunResult>> {
    let agent = build_agent(config, params, Arc::new(SystemClock))?;
    agent.run(params).await
}
