//! Retry policy for transport-level provider failures.
//!
//! Only failures below the application layer (connect errors, broken
//! connections, per-request timeouts) are retried. A non-2xx answer is a
//! definitive response from the provider and is returned as-is.

use std::time::Duration;

/// Bounded exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Wait before the first retry.
    pub wait_min: Duration,
    /// Upper bound for any single wait.
    pub wait_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            wait_min: Duration::from_secs(1),
            wait_max: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Total attempts including the first one.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Wait before retry number `retry` (0-based): `wait_min * 2^retry`,
    /// capped at `wait_max`.
    pub fn backoff(&self, retry: u32) -> Duration {
        self.wait_min
            .saturating_mul(2u32.saturating_pow(retry))
            .min(self.wait_max)
    }
}
