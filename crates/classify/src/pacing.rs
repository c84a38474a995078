use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

pub const DEFAULT_PACING_MS: u64 = 1000;

/// Spacing policy between consecutive model calls in a batch.
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Called after each model call; returns once the next call may start.
    async fn pace(&self);
}

/// Waits the same fixed interval after every call.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::from_millis(DEFAULT_PACING_MS)
    }
}

#[async_trait]
impl Pacer for FixedDelay {
    async fn pace(&self) {
        if self.delay.is_zero() {
            return;
        }
        debug!(delay_ms = self.delay.as_millis() as u64, "Pacing before next model call");
        sleep(self.delay).await;
    }
}
