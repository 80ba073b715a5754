//! Bounded retry with backoff
//!
//! Runs an async operation up to `max_retries + 1` times. The first attempt is
//! never delayed; the delay before retry `n` (0-based) is derived from the
//! backoff type and capped at `max_delay`.

use crate::error::{Error, Result};
use crate::types::BackoffType;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// How the delay grows between retries
    pub backoff_type: BackoffType,
    /// Upper bound for a single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            backoff_type: BackoffType::Exponential,
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Create an exponential policy
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            ..Default::default()
        }
    }

    /// Policy that makes a single attempt
    pub fn no_retry() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Set the backoff type
    #[must_use]
    pub fn with_backoff(mut self, backoff_type: BackoffType) -> Self {
        self.backoff_type = backoff_type;
        self
    }

    /// Set the delay cap
    #[must_use]
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Total number of attempts this policy allows
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Calculate backoff delay for a given retry index
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let delay = match self.backoff_type {
            BackoffType::Constant => self.base_delay,
            BackoffType::Linear => self.base_delay.saturating_mul(attempt.saturating_add(1)),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.base_delay.saturating_mul(factor)
            }
        };

        std::cmp::min(delay, self.max_delay)
    }

    /// Run `op` until it succeeds or the retry budget is spent
    ///
    /// Any error type convertible into [`Error`] is accepted; the last one is
    /// returned once all attempts failed.
    pub async fn execute<T, E, F, Fut>(&self, op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Into<Error>,
    {
        self.execute_while(op, || true).await
    }

    /// Like [`execute`](Self::execute), but gives up with [`Error::Cancelled`]
    /// as soon as `keep_going` returns false between attempts.
    pub async fn execute_while<T, E, F, Fut, K>(&self, mut op: F, keep_going: K) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Into<Error>,
        K: Fn() -> bool,
    {
        let mut attempt = 0;

        loop {
            let err = match op().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!("Succeeded after {} retries", attempt);
                    }
                    return Ok(value);
                }
                Err(e) => e.into(),
            };

            if !err.is_retryable() {
                return Err(err);
            }

            if attempt >= self.max_retries {
                warn!(
                    "Giving up after {} attempts: {}",
                    self.max_attempts(),
                    err
                );
                return Err(err);
            }

            if !keep_going() {
                debug!("Retry abandoned, operation superseded");
                return Err(Error::Cancelled);
            }

            let delay = self.calculate_backoff(attempt);
            warn!(
                "Attempt {}/{} failed: {}, retrying in {:?}",
                attempt + 1,
                self.max_attempts(),
                err,
                delay
            );
            tokio::time::sleep(delay).await;

            if !keep_going() {
                debug!("Retry abandoned after backoff, operation superseded");
                return Err(Error::Cancelled);
            }

            attempt += 1;
        }
    }
}
