//! Bounded readiness wait for the vendor object.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

use pixel_core::config::ReadinessConfig;
use pixel_core::{PixelError, PixelResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 50,
            interval: Duration::from_millis(100),
        }
    }
}

impl From<&ReadinessConfig> for ReadinessPolicy {
    fn from(config: &ReadinessConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            interval: Duration::from_millis(config.poll_interval_ms),
        }
    }
}

impl ReadinessPolicy {
    /// Upper bound on how long [`wait_for`] can take.
    pub fn deadline(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

/// Poll `check` until it yields a value, sleeping `interval` between attempts.
/// Fails with [`PixelError::ReadinessTimeout`] once `max_attempts` checks
/// have come back empty. At least one check is always made.
pub async fn wait_for<T, F>(policy: &ReadinessPolicy, mut check: F) -> PixelResult<T>
where
    F: FnMut() -> Option<T>,
{
    let attempts = policy.max_attempts.max(1);
    let started = Instant::now();

    for attempt in 1..=attempts {
        if let Some(value) = check() {
            debug!(attempt, "vendor object ready");
            return Ok(value);
        }
        if attempt < attempts {
            sleep(policy.interval).await;
        }
    }

    Err(PixelError::ReadinessTimeout {
        attempts,
        waited_ms: started.elapsed().as_millis() as u64,
    })
}
