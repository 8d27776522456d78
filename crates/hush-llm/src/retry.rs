//! Bounded retry with exponential backoff
//!
//! The policy is a plain value: attempt budget, first delay, growth factor and
//! a ceiling. `retry_with_backoff` applies it to any fallible closure and
//! `RetryingProvider` applies it to a whole `Rewriter`.
//!
//! With the default policy a call is attempted up to 6 times, sleeping
//! 1s, 2s, 4s, 8s and 16s between attempts (never more than 60s).

use crate::LlmError;
use hush_domain::Rewriter;
use std::fmt::Display;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Default number of attempts, including the first
pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;

/// Default delay after the first failed attempt
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);

/// Default delay growth factor
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

/// Default ceiling for a single delay
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Backoff schedule for a retried call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts allowed (values below 1 are treated as 1)
    pub max_attempts: u32,
    /// Delay after the first failed attempt
    pub initial_delay: Duration,
    /// Factor applied to the delay after each further failure
    pub multiplier: f64,
    /// Upper bound on any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: DEFAULT_INITIAL_DELAY,
            multiplier: DEFAULT_MULTIPLIER,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Retry up to `max_attempts` times without sleeping
    pub fn no_delay(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::ZERO,
            multiplier: 1.0,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let capped = secs.min(self.max_delay.as_secs_f64()).max(0.0);
        Duration::try_from_secs_f64(capped).unwrap_or(self.max_delay)
    }
}

/// All attempts failed
#[derive(Debug, Error)]
#[error("gave up after {attempts} attempts: {last_error}")]
pub struct RetryError<E: Display> {
    /// Attempts made
    pub attempts: u32,
    /// Error returned by the final attempt
    pub last_error: E,
}

/// Run `operation` until it succeeds or the policy's attempt budget is spent.
///
/// The closure receives the 1-based attempt number. The calling thread sleeps
/// between attempts; there is no sleep after the last one.
pub fn retry_with_backoff<T, E, F>(policy: &RetryPolicy, mut operation: F) -> Result<T, RetryError<E>>
where
    E: Display,
    F: FnMut(u32) -> Result<T, E>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt) {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "call succeeded after retry");
                }
                return Ok(value);
            }
            Err(last_error) if attempt >= max_attempts => {
                return Err(RetryError {
                    attempts: attempt,
                    last_error,
                });
            }
            Err(e) => {
                let delay = policy.delay_for(attempt);
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "attempt failed, backing off"
                );
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
                attempt += 1;
            }
        }
    }
}

/// A `Rewriter` that retries its inner provider according to a policy
#[derive(Debug, Clone)]
pub struct RetryingProvider<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P> RetryingProvider<P> {
    /// Wrap `inner` with `policy`
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// Wrap `inner` with the default policy (6 attempts, 1s..60s backoff)
    pub fn with_default_policy(inner: P) -> Self {
        Self::new(inner, RetryPolicy::default())
    }

    /// The wrapped provider
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// The retry policy in effect
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl<P> Rewriter for RetryingProvider<P>
where
    P: Rewriter,
    P::Error: Display,
{
    type Error = LlmError;

    fn rewrite(&self, prompt: &str) -> Result<String, Self::Error> {
        retry_with_backoff(&self.policy, |_| self.inner.rewrite(prompt)).map_err(|e| {
            LlmError::RetriesExhausted {
                attempts: e.attempts,
                last_error: e.last_error.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockProvider;

    #[test]
    fn test_default_schedule() {
        let policy = RetryPolicy::default();
        let delays: Vec<u64> = (1..=5).map(|n| policy.delay_for(n).as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 16]);
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(7), Duration::from_secs(60));
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_secs(60));
    }

    #[test]
    fn test_succeeds_after_transient_failures() {
        let provider = MockProvider::new("done").fail_first(3);
        let retrying = RetryingProvider::new(provider.clone(), RetryPolicy::no_delay(6));

        assert_eq!(retrying.rewrite("p").unwrap(), "done");
        assert_eq!(provider.call_count(), 4);
    }

    #[test]
    fn test_exhaustion_after_max_attempts() {
        let provider = MockProvider::failing();
        let retrying = RetryingProvider::new(provider.clone(), RetryPolicy::no_delay(6));

        match retrying.rewrite("p") {
            Err(LlmError::RetriesExhausted { attempts, .. }) => assert_eq!(attempts, 6),
            other => panic!("Expected RetriesExhausted, got {:?}", other),
        }
        assert_eq!(provider.call_count(), 6);
    }

    #[test]
    fn test_zero_attempts_still_tries_once() {
        let mut calls = 0;
        let result: Result<(), RetryError<&str>> =
            retry_with_backoff(&RetryPolicy::no_delay(0), |_| {
                calls += 1;
                Err("nope")
            });
        assert_eq!(result.unwrap_err().attempts, 1);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_attempt_numbers_passed_to_operation() {
        let mut seen = Vec::new();
        let result = retry_with_backoff(&RetryPolicy::no_delay(4), |attempt| {
            seen.push(attempt);
            if attempt < 3 {
                Err("again")
            } else {
                Ok(attempt)
            }
        });
        assert_eq!(result.unwrap(), 3);
        assert_eq!(seen, vec![1, 2, 3]);
    }
}
