pub mod agent_loop;
pub mod clock;
pub mod context;
pub mod runner;
pub mod step;
pub mod tools;

pub use agent_loop::{AgentError, AgentLoop, RunParameters, RunResult, RunState};
pub use clock::{Clock, SystemClock};
pub use context::Conversation;
pub use runner::{build_agent, execute_run};
pub use step::{RetryPolicy, StepError, StepExecutor};
