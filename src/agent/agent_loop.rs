use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::agent::clock::Clock;
use crate::agent::context::Conversation;
use crate::agent::step::{StepError, StepExecutor};
use crate::agent::tools::{ToolInvocation, parse_tool_invocation};
use crate::config::schema::DEFAULT_MAX_ITERATIONS;
use crate::providers::{Credentials, LlmMessage};

/// Errors that can occur during agent loop execution
#[derive(thiserror::Error, Debug)]
pub enum AgentError {
    #[error("Step failed after {attempts} attempt(s): {source}")]
    StepFailed {
        attempts: u32,
        #[source]
        source: StepError,
    },

    #[error("Scheduled time for iteration {0} is out of range")]
    ScheduleOverflow(u32),

    #[error("Failed to set up run: {0}")]
    Setup(String),
}

/// Result type for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Waiting for the next scheduled wall-clock time
    Scheduling,
    /// Executing one iteration
    Stepping,
    /// Final answer produced or budget exhausted
    Terminated,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Scheduling => "scheduling",
            RunState::Stepping => "stepping",
            RunState::Terminated => "terminated",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inputs of a single run, fixed for its whole lifetime
#[derive(Debug, Clone, PartialEq)]
pub struct RunParameters {
    pub instructions: String,
    /// Time of iteration 0; only used together with `interval`
    pub first_run_at: Option<DateTime<Utc>>,
    pub interval: Option<Duration>,
    pub model: Option<String>,
    pub credentials: Option<Credentials>,
    pub created_at: DateTime<Utc>,
}

impl RunParameters {
    pub fn new(instructions: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            instructions: instructions.into(),
            first_run_at: None,
            interval: None,
            model: None,
            credentials: None,
            created_at,
        }
    }

    pub fn with_schedule(mut self, first_run_at: DateTime<Utc>, interval: Duration) -> Self {
        self.first_run_at = Some(first_run_at);
        self.interval = Some(interval);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Returns the schedule when both parts are present
    pub fn schedule(&self) -> Option<(DateTime<Utc>, Duration)> {
        self.first_run_at.zip(self.interval)
    }
}

/// Terminal artifact of a successful run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Target time of iteration `iteration`: `first_run_at + iteration * interval`
pub fn scheduled_target(
    first_run_at: DateTime<Utc>,
    interval: Duration,
    iteration: u32,
) -> Option<DateTime<Utc>> {
    if iteration == 0 {
        return Some(first_run_at);
    }

    let interval = TimeDelta::from_std(interval).ok()?;
    let offset = interval.checked_mul(i32::try_from(iteration).ok()?)?;
    first_run_at.checked_add_signed(offset)
}

/// Returns the time to wait for, or `None` when the target has already passed
///
/// Missed slots are not slept for, but still run their step.
pub fn wait_target(target: DateTime<Utc>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    (target > now).then_some(target)
}

/// Returns true when `message` ends the run
///
/// Only an assistant reply without any tool block is final. A reply whose
/// blocks are all unrecognized is kept, and the next step goes back to the
/// model.
pub fn is_final_answer(message: &LlmMessage) -> bool {
    message.is_assistant() && parse_tool_invocation(&message.content) == ToolInvocation::None
}

/// Drives one run: schedule, step, append, repeat
pub struct AgentLoop {
    executor: StepExecutor,
    clock: Arc<dyn Clock>,
    max_iterations: u32,
}

impl AgentLoop {
    pub fn new(executor: StepExecutor, clock: Arc<dyn Clock>) -> Self {
        Self {
            executor,
            clock,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Sets the highest iteration index; a run makes at most `max + 1` steps
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn executor(&self) -> &StepExecutor {
        &self.executor
    }

    /// Runs to a final answer
    ///
    /// Returns `Ok(None)` when every iteration was used without one. Step
    /// failures that outlast the retry policy abort the run.
    pub async fn run(&self, params: &RunParameters) -> Result<Option<RunResult>> {
        let mut conversation = Conversation::seeded(
            self.clock.now(),
            self.executor.tools(),
            params.instructions.clone(),
        );
        let schedule = params.schedule();
        let started = std::time::Instant::now();

        tracing::info!(
            model = %self.executor.model_caller().model(),
            fallback = self.executor.model_caller().has_fallback(),
            tools = ?self.executor.tools().list_tools(),
            retry_attempts = self.executor.policy().max_attempts,
            scheduled = schedule.is_some(),
            max_iterations = self.max_iterations,
            "Run started"
        );

        for iteration in 0..=self.max_iterations {
            if let Some((first_run_at, interval)) = schedule {
                let target = scheduled_target(first_run_at, interval, iteration)
                    .ok_or(AgentError::ScheduleOverflow(iteration))?;

                match wait_target(target, self.clock.now()) {
                    Some(target) => {
                        tracing::debug!(
                            iteration,
                            state = %RunState::Scheduling,
                            scheduled_for = %target,
                            "Waiting for scheduled time"
                        );
                        self.clock.sleep_until(target).await;
                    }
                    None => {
                        tracing::debug!(iteration, scheduled_for = %target, "Scheduled time passed, not waiting");
                    }
                }
            }

            tracing::debug!(
                iteration,
                state = %RunState::Stepping,
                history_len = conversation.len(),
                "Executing step"
            );

            let message = self.executor.execute_step(conversation.messages()).await?;

            if is_final_answer(&message) {
                tracing::info!(
                    iteration,
                    state = %RunState::Terminated,
                    total_ms = started.elapsed().as_millis(),
                    "Run complete with final answer"
                );

                return Ok(Some(RunResult {
                    content: message.content,
                    created_at: params.created_at,
                    finished_at: self.clock.now(),
                }));
            }

            conversation.push(message);
        }

        tracing::warn!(
            iterations = u64::from(self.max_iterations) + 1,
            state = %RunState::Terminated,
            "Iteration budget exhausted without a final answer"
        );

        Ok(None)
    }
}
