//! Wall-clock access for scheduling

use chrono::{DateTime, Utc};

/// Source of the current time and of cancellable waits
#[async_trait::async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Suspends until `target`; returns immediately if it has already passed
    async fn sleep_until(&self, target: DateTime<Utc>);
}

/// Clock backed by the system time and the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait::async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep_until(&self, target: DateTime<Utc>) {
        // A negative delta means the target is already behind us
        if let Ok(remaining) = (target - Utc::now()).to_std() {
            tokio::time::sleep(remaining).await;
        }
    }
}
