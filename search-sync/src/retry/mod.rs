//! Shared retry policy and backoff helper.
//!
//! Transient infrastructure failures (database connections, bulk requests)
//! are retried with jittered exponential backoff up to a fixed attempt
//! ceiling. Past the ceiling the caller gives up for the current poll cycle;
//! the unadvanced watermark means the same work is picked up next cycle.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tracing::{error, info, warn};

/// Default attempt ceiling, first try included.
pub const DEFAULT_MAX_TRIES: usize = 8;

/// Default base delay fed into the exponential strategy, in milliseconds.
pub const DEFAULT_BASE_DELAY_MS: u64 = 10;

/// Default multiplier applied to every delay.
pub const DEFAULT_FACTOR: u64 = 2;

/// Default cap on a single backoff delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(10);

/// Backoff parameters shared by every retried operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts before giving up, first try included.
    pub max_tries: usize,
    /// Base delay in milliseconds for the exponential strategy.
    pub base_delay_ms: u64,
    /// Multiplier applied to every delay.
    pub factor: u64,
    /// Cap on any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_tries: DEFAULT_MAX_TRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            factor: DEFAULT_FACTOR,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    /// The delay sequence between attempts: one delay fewer than `max_tries`.
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(self.base_delay_ms)
            .factor(self.factor)
            .max_delay(self.max_delay)
            .map(jitter)
            .take(self.max_tries.saturating_sub(1))
    }
}

/// Run `action` until it succeeds, the error is not retryable, or the policy
/// is exhausted.
///
/// `retryable` decides which errors are worth another attempt; a
/// non-retryable error is returned immediately. Every backoff is logged with
/// the attempt number, and the final give-up is logged as an error.
pub async fn retry_with_backoff<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    operation: &str,
    mut action: F,
    mut retryable: P,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: FnMut(&E) -> bool,
{
    let mut delays = policy.delays();
    let mut attempt = 1usize;

    loop {
        match action().await {
            Ok(value) => {
                if attempt > 1 {
                    info!(
                        operation = operation,
                        attempt = attempt,
                        "Operation succeeded after retries"
                    );
                }
                return Ok(value);
            }
            Err(e) if retryable(&e) => match delays.next() {
                Some(delay) => {
                    warn!(
                        operation = operation,
                        attempt = attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Operation failed, backing off before retry"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => {
                    error!(
                        operation = operation,
                        attempts = attempt,
                        error = %e,
                        "Operation failed after exhausting retries"
                    );
                    return Err(e);
                }
            },
            Err(e) => return Err(e),
        }
    }
}
