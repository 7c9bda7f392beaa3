//! Bounded retry with linear backoff.
//!
//! The n-th failed attempt is followed by a wait of `n * step` before the next one.
//! After `max_attempts` failures the last error is returned to the caller.

use std::{fmt::Display, future::Future};
use tokio::time::{self, Duration};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub step: Duration,
}

impl Default for RetryPolicy {
    /// 3 attempts, waiting 1s and then 2s between them.
    fn default() -> Self {
        Self::linear(3, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    pub fn linear(max_attempts: u32, step: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            step,
        }
    }

    /// Wait inserted after the `attempt`-th failure (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.step * attempt
    }
}

pub async fn with_linear_backoff<F, Fut, T, E>(
    operation_name: &str,
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!("{} succeeded at attempt {}", operation_name, attempt);
                }
                return Ok(value);
            }
            Err(e) if attempt >= policy.max_attempts => {
                tracing::error!(
                    "{} failed (attempt {}/{}): {}. Max retries reached.",
                    operation_name,
                    attempt,
                    policy.max_attempts,
                    e
                );
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    "{} failed (attempt {}/{}): {}. Retrying in {:?}.",
                    operation_name,
                    attempt,
                    policy.max_attempts,
                    e,
                    delay
                );
                time::sleep(delay).await;
            }
        }
    }
}
