//! Bounded retry with linear back-off
//!
//! Wraps any fallible async operation. Attempts run strictly one after another; after
//! failed attempt `k` the policy sleeps `initial_delay * k` before trying again. Only the
//! last error is returned once the budget is spent.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::RetryConfig;

/// Default number of attempts, including the first
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default base delay between attempts
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 800;

/// Retry budget for a single logical operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy; `max_attempts` is clamped to at least 1
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        debug!(max_attempts, ?initial_delay, "RetryPolicy::new: called");
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_millis(config.initial_delay_ms))
    }

    /// A policy that never retries
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Delay inserted after failed attempt number `attempt` (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.initial_delay.saturating_mul(attempt)
    }

    /// Run `operation` until it succeeds or the attempt budget is spent
    pub async fn execute<T, E, F, Fut>(&self, operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.execute_when(operation, |_| true).await
    }

    /// Like [`execute`](Self::execute), but gives up early on errors `is_transient`
    /// rejects
    pub async fn execute_when<T, E, F, Fut, P>(&self, mut operation: F, mut is_transient: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        P: FnMut(&E) -> bool,
    {
        let mut attempt = 1;
        loop {
            debug!(attempt, max_attempts = self.max_attempts, "execute_when: attempting");
            match operation().await {
                Ok(value) => {
                    debug!(attempt, "execute_when: success");
                    return Ok(value);
                }
                Err(e) if attempt >= self.max_attempts => {
                    warn!(attempt, error = %e, "execute_when: attempts exhausted");
                    return Err(e);
                }
                Err(e) if !is_transient(&e) => {
                    debug!(attempt, error = %e, "execute_when: permanent error, not retrying");
                    return Err(e);
                }
                Err(e) => {
                    let delay = self.delay_after(attempt);
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "execute_when: retrying after failure"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, Duration::from_millis(DEFAULT_INITIAL_DELAY_MS))
    }
}
