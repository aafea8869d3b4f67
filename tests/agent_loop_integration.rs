//! Integration tests for full agent runs
//!
//! These drive `AgentLoop::run` through the public API with scripted
//! providers, tools and clocks.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use scoutclaw::agent::tools::{Tool, ToolKind, ToolRegistry, ToolResult};
use scoutclaw::agent::{
    AgentError, AgentLoop, Clock, RetryPolicy, RunParameters, StepExecutor, SystemClock,
};
use scoutclaw::providers::{
    FailoverTarget, LlmMessage, LlmProvider, LlmResponse, ModelCaller, ProviderError,
};

/// Provider answering from a script, then repeating a default outcome
struct ScriptedProvider {
    name: String,
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    default: Result<String, ProviderError>,
    calls: Mutex<Vec<Vec<LlmMessage>>>,
}

impl ScriptedProvider {
    fn answering(default: &str) -> Arc<Self> {
        Self::build("scripted", Ok(default.to_string()), Vec::new())
    }

    fn failing(name: &str, error: ProviderError) -> Arc<Self> {
        Self::build(name, Err(error), Vec::new())
    }

    fn build(
        name: &str,
        default: Result<String, ProviderError>,
        script: Vec<Result<String, ProviderError>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            script: Mutex::new(script.into()),
            default,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl LlmProvider for ScriptedProvider {
    async fn chat(&self, messages: Vec<LlmMessage>, _model: &str) -> Result<LlmResponse, ProviderError> {
        self.calls.lock().unwrap().push(messages);
        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default.clone());
        outcome.map(LlmResponse::new)
    }

    fn provider_name(&self) -> &str {
        &self.name
    }
}

/// Tool recording every input it receives
struct RecordingTool {
    kind: ToolKind,
    inputs: Arc<Mutex<Vec<String>>>,
}

#[async_trait::async_trait]
impl Tool for RecordingTool {
    fn kind(&self) -> ToolKind {
        self.kind
    }

    fn description(&self) -> &str {
        "Records inputs"
    }

    async fn execute(&self, input: &str) -> ToolResult<String> {
        self.inputs.lock().unwrap().push(input.to_string());
        Ok(format!("{} observation: {}", self.kind, input))
    }
}

/// Clock that only moves forward when asked to sleep
struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    sleeps: Mutex<Vec<DateTime<Utc>>>,
}

impl ManualClock {
    fn at(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(now),
            sleeps: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait::async_trait]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    async fn sleep_until(&self, target: DateTime<Utc>) {
        self.sleeps.lock().unwrap().push(target);
        let mut now = self.now.lock().unwrap();
        if target > *now {
            *now = target;
        }
    }
}

struct Harness {
    search_inputs: Arc<Mutex<Vec<String>>>,
    fetch_inputs: Arc<Mutex<Vec<String>>>,
    registry: Arc<ToolRegistry>,
}

fn harness() -> Harness {
    let search_inputs = Arc::new(Mutex::new(Vec::new()));
    let fetch_inputs = Arc::new(Mutex::new(Vec::new()));

    let mut registry = ToolRegistry::new();
    registry
        .register(Box::new(RecordingTool {
            kind: ToolKind::Search,
            inputs: Arc::clone(&search_inputs),
        }))
        .unwrap();
    registry
        .register(Box::new(RecordingTool {
            kind: ToolKind::Fetch,
            inputs: Arc::clone(&fetch_inputs),
        }))
        .unwrap();

    Harness {
        search_inputs,
        fetch_inputs,
        registry: Arc::new(registry),
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap()
}

fn agent_with(caller: ModelCaller, h: &Harness, clock: Arc<dyn Clock>) -> AgentLoop {
    let executor = StepExecutor::new(caller, Arc::clone(&h.registry), RetryPolicy::no_retry());
    AgentLoop::new(executor, clock)
}

#[tokio::test]
async fn test_search_then_final_answer() {
    let h = harness();
    let provider = ScriptedProvider::build(
        "scripted",
        Ok("Tokio is the most used runtime.".to_string()),
        vec![Ok("Let me check.\n```tool-search\nrust async runtime\n```".to_string())],
    );
    let agent = agent_with(
        ModelCaller::new(provider.clone(), "test-model"),
        &h,
        ManualClock::at(t0()),
    );

    let created_at = t0() - TimeDelta::hours(1);
    let result = agent
        .run(&RunParameters::new("Which async runtime?", created_at))
        .await
        .unwrap()
        .expect("run should produce a result");

    assert_eq!(result.content, "Tokio is the most used runtime.");
    assert_eq!(result.created_at, created_at);
    assert_eq!(*h.search_inputs.lock().unwrap(), vec!["rust async runtime"]);

    let calls = provider.calls.lock().unwrap();
    assert_eq!(calls.len(), 2);

    // system, user, assistant tool request, user observation
    let last = &calls[1];
    assert_eq!(last.len(), 4);
    assert!(last[0].is_system());
    assert_eq!(last[1].content, "Which async runtime?");
    assert!(last[2].is_assistant());
    assert_eq!(last[3].content, "search observation: rust async runtime");
}

#[tokio::test]
async fn test_only_first_tool_block_is_dispatched() {
    let h = harness();
    let provider = ScriptedProvider::build(
        "scripted",
        Ok("done".to_string()),
        vec![Ok(
            "```tool-fetch\nhttps://a.example\n```\n```tool-search\nignored\n```".to_string(),
        )],
    );
    let agent = agent_with(
        ModelCaller::new(provider, "test-model"),
        &h,
        ManualClock::at(t0()),
    );

    agent.run(&RunParameters::new("task", t0())).await.unwrap();

    assert_eq!(*h.fetch_inputs.lock().unwrap(), vec!["https://a.example"]);
    assert!(h.search_inputs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unrecognized_tool_block_falls_through_to_model() {
    let h = harness();
    let provider = ScriptedProvider::build(
        "scripted",
        Ok("Final answer.".to_string()),
        vec![Ok("```tool-calculator\n2+2\n```".to_string())],
    );
    let agent = agent_with(
        ModelCaller::new(provider.clone(), "test-model"),
        &h,
        ManualClock::at(t0()),
    );

    let result = agent.run(&RunParameters::new("task", t0())).await.unwrap().unwrap();

    assert_eq!(result.content, "Final answer.");
    assert_eq!(provider.call_count(), 2);
    assert!(h.search_inputs.lock().unwrap().is_empty());
    assert!(h.fetch_inputs.lock().unwrap().is_empty());

    let calls = provider.calls.lock().unwrap();
    let second = &calls[1];
    assert_eq!(second.len(), 3);
    assert!(second[2].is_assistant());
    assert_eq!(second[2].content, "```tool-calculator\n2+2\n```");
}

#[tokio::test]
async fn test_fallback_answers_when_primary_fails() {
    let h = harness();
    let primary = ScriptedProvider::failing("primary", ProviderError::network("primary down"));
    let fallback = ScriptedProvider::answering("answer from fallback");

    let caller = ModelCaller::new(primary.clone(), "main-model")
        .with_fallback(FailoverTarget::new(fallback.clone(), "backup-model"));
    let agent = agent_with(caller, &h, ManualClock::at(t0()));

    let result = agent.run(&RunParameters::new("task", t0())).await.unwrap().unwrap();

    assert_eq!(result.content, "answer from fallback");
    assert_eq!(primary.call_count(), 1);
    assert_eq!(fallback.call_count(), 1);
}

#[tokio::test]
async fn test_both_providers_failing_is_fatal_with_both_messages() {
    let h = harness();
    let primary = ScriptedProvider::failing("primary", ProviderError::network("primary down"));
    let fallback = ScriptedProvider::failing("fallback", ProviderError::auth("fallback key revoked"));

    let caller = ModelCaller::new(primary, "main-model")
        .with_fallback(FailoverTarget::new(fallback, "backup-model"));
    let agent = agent_with(caller, &h, ManualClock::at(t0()));

    let err = agent
        .run(&RunParameters::new("task", t0()))
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::StepFailed { .. }));
    let message = err.to_string();
    assert!(message.contains("primary down"), "got: {}", message);
    assert!(message.contains("fallback key revoked"), "got: {}", message);
}

#[tokio::test]
async fn test_step_is_retried_before_failing_the_run() {
    let h = harness();
    let provider = ScriptedProvider::build(
        "scripted",
        Ok("recovered".to_string()),
        vec![
            Err(ProviderError::timeout(120)),
            Err(ProviderError::rate_limit("slow down")),
        ],
    );
    let executor = StepExecutor::new(
        ModelCaller::new(provider.clone(), "test-model"),
        Arc::clone(&h.registry),
        RetryPolicy::new(3, Duration::ZERO),
    );
    let agent = AgentLoop::new(executor, ManualClock::at(t0()));

    let result = agent.run(&RunParameters::new("task", t0())).await.unwrap().unwrap();
    assert_eq!(result.content, "recovered");
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn test_budget_exhaustion_after_1025_iterations() {
    let h = harness();
    let provider = ScriptedProvider::answering("```tool-search\nmore\n```");
    let agent = agent_with(
        ModelCaller::new(provider.clone(), "test-model"),
        &h,
        ManualClock::at(t0()),
    );
    assert_eq!(agent.max_iterations(), 1024);

    let result = agent.run(&RunParameters::new("never ends", t0())).await.unwrap();

    assert!(result.is_none());
    // 1025 steps alternate model and tool, starting and ending with the model
    assert_eq!(provider.call_count(), 513);
    assert_eq!(h.search_inputs.lock().unwrap().len(), 512);
}

#[tokio::test]
async fn test_schedule_catch_up_then_waits() {
    let h = harness();
    let provider = ScriptedProvider::answering("```tool-search\nmore\n```");
    let clock = ManualClock::at(t0() + TimeDelta::milliseconds(5500));
    let agent = agent_with(ModelCaller::new(provider, "test-model"), &h, clock.clone())
        .with_max_iterations(9);

    let params = RunParameters::new("task", t0()).with_schedule(t0(), Duration::from_millis(1000));
    assert!(agent.run(&params).await.unwrap().is_none());

    // Slots 0..=5 are already in the past; 6 onward are waited for
    let sleeps = clock.sleeps.lock().unwrap().clone();
    let expected: Vec<_> = (6..=9).map(|s| t0() + TimeDelta::seconds(s)).collect();
    assert_eq!(sleeps, expected);
}

#[tokio::test]
async fn test_first_run_in_future_waits_before_first_step() {
    let h = harness();
    let provider = ScriptedProvider::answering("done");
    let clock = ManualClock::at(t0());
    let agent = agent_with(ModelCaller::new(provider, "test-model"), &h, clock.clone());

    let start = t0() + TimeDelta::minutes(30);
    let params = RunParameters::new("task", t0()).with_schedule(start, Duration::from_secs(60));
    let result = agent.run(&params).await.unwrap().unwrap();

    assert_eq!(*clock.sleeps.lock().unwrap(), vec![start]);
    assert_eq!(result.finished_at, start);
}

#[tokio::test]
async fn test_cancelling_during_wait_abandons_run() {
    let h = harness();
    let provider = ScriptedProvider::answering("done");
    let agent = agent_with(
        ModelCaller::new(provider.clone(), "test-model"),
        &h,
        Arc::new(SystemClock),
    );

    let start = Utc::now() + TimeDelta::hours(1);
    let params = RunParameters::new("task", Utc::now()).with_schedule(start, Duration::from_secs(60));

    let outcome = tokio::time::timeout(Duration::from_millis(50), agent.run(&params)).await;

    assert!(outcome.is_err(), "run should still be waiting");
    assert_eq!(provider.call_count(), 0);
}
