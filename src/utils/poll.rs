use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::errors::AuthError;

/// Bounds for a polling loop waiting on provider-side state.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub interval: Duration,
    pub ceiling: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            ceiling: Duration::from_secs(30),
        }
    }
}

impl PollConfig {
    pub fn new(interval_ms: u64, timeout_secs: u64) -> Self {
        Self {
            interval: Duration::from_millis(interval_ms),
            ceiling: Duration::from_secs(timeout_secs),
        }
    }

    fn max_attempts(&self) -> u64 {
        let interval = self.interval.as_millis().max(1);
        (self.ceiling.as_millis() / interval).max(1) as u64
    }
}

/// Polls `probe` at a fixed interval until it yields a value or the ceiling
/// elapses. Every loop is bounded; there is no unbounded wait path.
pub async fn poll_until<T, F, Fut>(
    config: PollConfig,
    what: &str,
    mut probe: F,
) -> Result<T, AuthError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let max_attempts = config.max_attempts();

    for attempt in 1..=max_attempts {
        if let Some(value) = probe().await {
            debug!(what, attempt, "poll resolved");
            return Ok(value);
        }

        if attempt < max_attempts {
            tokio::time::sleep(config.interval).await;
        }
    }

    Err(AuthError::Network(format!(
        "timed out after {}s waiting for {}",
        config.ceiling.as_secs(),
        what
    )))
}
