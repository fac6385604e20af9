//! Bounded retry with exponential backoff.

use crate::core::{ScoreError, ScoreOutcome};

use std::future::Future;
use std::time::Duration;

/// Retry budget and backoff for provider calls.
///
/// Delay before attempt `k` (k ≥ 1, counting from the first retry) is
/// `min(base_delay * 2^(k-1), max_delay)`. A rate-limited provider's
/// `Retry-After` hint can lengthen a delay, never past `max_delay`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts are `max_retries + 1`.
    pub max_retries: u32,

    /// Delay before the first retry.
    pub base_delay: Duration,

    /// Upper bound for any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}

/// One attempt within a single `RetryPolicy::run` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryAttempt {
    /// Zero for the first attempt, `k` for the k-th retry.
    pub attempt_number: u32,
    /// How long the policy waited before this attempt.
    pub delay_before_attempt: Duration,
}

impl RetryPolicy {
    /// Creates a new retry policy with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Disables retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Sets the number of retries.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Sets the base delay.
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Sets the maximum delay.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Total attempts this policy allows.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Calculates the delay before a given attempt (0 is the first attempt).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        2u32.checked_pow(attempt - 1)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    /// Delay before `attempt` after `error` failed the previous one.
    pub fn delay_after(&self, attempt: u32, error: &ScoreError) -> Duration {
        let backoff = self.delay_for_attempt(attempt);
        match error.retry_after() {
            Some(hint) => backoff.max(hint.min(self.max_delay)),
            None => backoff,
        }
    }

    /// Runs `operation` until it succeeds, fails permanently, or the budget
    /// is spent.
    ///
    /// Only errors for which `ScoreError::is_transient` holds are retried.
    /// Delays are async timers, so a backing-off call never blocks the
    /// executor thread.
    ///
    /// # Errors
    ///
    /// Returns the first non-transient error, or the last transient error
    /// once all `max_retries + 1` attempts have failed.
    pub async fn run<F, Fut, T>(&self, mut operation: F) -> ScoreOutcome<T>
    where
        F: FnMut(RetryAttempt) -> Fut,
        Fut: Future<Output = ScoreOutcome<T>>,
    {
        let mut attempt_number = 0;
        let mut delay = Duration::ZERO;
        loop {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let attempt = RetryAttempt {
                attempt_number,
                delay_before_attempt: delay,
            };

            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_transient() => {
                    tracing::debug!(
                        attempt = attempt_number,
                        error = %e,
                        "Permanent failure, not retrying"
                    );
                    return Err(e);
                }
                Err(e) => {
                    if attempt_number >= self.max_retries {
                        tracing::debug!(
                            attempts = attempt_number + 1,
                            error = %e,
                            "Retry budget exhausted"
                        );
                        return Err(e);
                    }
                    attempt_number += 1;
                    delay = self.delay_after(attempt_number, &e);
                    tracing::debug!(
                        attempt = attempt_number,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying provider call"
                    );
                }
            }
        }
    }
}
