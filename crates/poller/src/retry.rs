//! What a poller does after a failed fetch

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::policy::duration_millis;

/// Reaction to a failed fetch cycle
///
/// The failure is always reported to the consumer first; the policy only
/// decides what the scheduler does next.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Wait without a timer until the consumer asks for a refetch
    #[default]
    Pause,
    /// Stop the poller
    Stop,
    /// Keep polling with exponential backoff
    Retry(RetryPolicy),
}

/// Exponential backoff for consecutive failed fetches
///
/// # Example
///
/// ```
/// use leadgen_poller::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::exponential()
///     .with_max_attempts(4)
///     .with_initial_interval(Duration::from_secs(2))
///     .with_jitter(0.0);
///
/// assert_eq!(policy.delay_for_failure(1), Duration::from_secs(2));
/// assert_eq!(policy.delay_for_failure(2), Duration::from_secs(4));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryPolicy {
    /// Consecutive failures tolerated before the poller stops
    pub max_attempts: u32,

    /// Delay after the first failure
    #[serde(with = "duration_millis")]
    pub initial_interval: Duration,

    /// Upper bound on the delay
    #[serde(with = "duration_millis")]
    pub max_interval: Duration,

    pub backoff_coefficient: f64,

    /// Jitter factor (0.0-1.0); 0.1 means +/-10%
    pub jitter: f64,

    /// Error kinds (see [`FetchError::kind`]) that stop the poller at once
    #[serde(default)]
    pub non_retryable_errors: Vec<String>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::exponential()
    }
}

impl RetryPolicy {
    /// 5 attempts, 5s initial, 2 minute cap, 2x backoff, 10% jitter
    pub fn exponential() -> Self {
        Self {
            max_attempts: 5,
            initial_interval: Duration::from_secs(5),
            max_interval: Duration::from_secs(120),
            backoff_coefficient: 2.0,
            jitter: 0.1,
            non_retryable_errors: vec!["not_found".to_string()],
        }
    }

    /// Same delay after every failure
    pub fn fixed(interval: Duration, max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_interval: interval,
            max_interval: interval,
            backoff_coefficient: 1.0,
            jitter: 0.0,
            non_retryable_errors: vec![],
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_initial_interval(mut self, interval: Duration) -> Self {
        self.initial_interval = interval;
        self
    }

    pub fn with_max_interval(mut self, interval: Duration) -> Self {
        self.max_interval = interval;
        self
    }

    pub fn with_backoff_coefficient(mut self, coefficient: f64) -> Self {
        self.backoff_coefficient = coefficient.max(1.0);
        self
    }

    /// Set the jitter factor (0.0-1.0)
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    pub fn with_non_retryable_error(mut self, kind: impl Into<String>) -> Self {
        self.non_retryable_errors.push(kind.into());
        self
    }

    /// Delay before the next fetch after `failures` consecutive failures (1-based)
    pub fn delay_for_failure(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1) as i32;
        let base = self.initial_interval.as_secs_f64() * self.backoff_coefficient.powi(exponent);
        let capped = base.min(self.max_interval.as_secs_f64());

        let jittered = if self.jitter > 0.0 && capped > 0.0 {
            let mut rng = rand::thread_rng();
            let jitter_range = capped * self.jitter;
            let jitter_offset = rng.gen_range(-jitter_range..jitter_range);
            (capped + jitter_offset).max(0.0)
        } else {
            capped
        };

        Duration::from_secs_f64(jittered)
    }

    /// Whether another attempt is allowed after `failures` consecutive failures
    pub fn should_retry(&self, error: &FetchError, failures: u32) -> bool {
        failures < self.max_attempts
            && !self
                .non_retryable_errors
                .iter()
                .any(|kind| kind == error.kind())
    }
}
