//! Retry with exponential backoff
//!
//! Every failure is retried the same way: there is no distinction between
//! transient and fatal errors. Delays double after each attempt, with no
//! jitter and no upper bound.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retry budget for a single operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Delay before the first retry
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
        }
    }

    /// Delay schedule: `initial, 2*initial, 4*initial, ...`, one entry per retry
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        let initial = self.initial_delay;
        (0..self.max_retries).map(move |n| {
            let factor = 1u32.checked_shl(n).unwrap_or(u32::MAX);
            initial.saturating_mul(factor)
        })
    }

    /// Sum of all delays if every attempt fails
    pub fn total_delay(&self) -> Duration {
        self.delays().fold(Duration::ZERO, |acc, d| acc.saturating_add(d))
    }
}

/// Run `operation` until it succeeds or the policy is exhausted.
///
/// The last error is returned unchanged once no retries remain.
pub async fn with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut remaining = policy.max_retries;
    let mut delays = policy.delays();

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let Some(delay) = delays.next() else {
                    return Err(err);
                };

                warn!(
                    "{} failed, retrying in {}ms... ({} retries left): {}",
                    label,
                    delay.as_millis(),
                    remaining,
                    err
                );
                remaining -= 1;
                tokio::time::sleep(delay).await;
            }
        }
    }
}
