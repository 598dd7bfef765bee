//! Resilience parameters for the shared endpoint.
//!
//! All durations are plain [`Duration`]s here; the infrastructure config
//! layer converts from millisecond fields in the config file.

use std::time::Duration;

/// Dispatcher pacing and backoff
#[derive(Debug, Clone, PartialEq)]
pub struct DispatcherConfig {
    /// Minimum gap between two dispatches to the endpoint
    pub min_interval: Duration,
    /// Upper bound for the rate-limit backoff
    pub max_backoff: Duration,
    /// How many times one item may be put back after a rate-limit error
    /// before the error is handed to the caller.
    pub max_requeues: u32,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(1000),
            max_backoff: Duration::from_secs(60),
            max_requeues: 5,
        }
    }
}

impl DispatcherConfig {
    /// Backoff after `consecutive_errors` rate-limit failures:
    /// `min(min_interval * 2^errors, max_backoff)`
    pub fn backoff_for(&self, consecutive_errors: u32) -> Duration {
        let factor = 2u32.saturating_pow(consecutive_errors.min(31));
        self.min_interval
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

/// Circuit breaker thresholds
#[derive(Debug, Clone, PartialEq)]
pub struct BreakerConfig {
    /// Consecutive failures that open the circuit
    pub failure_threshold: u32,
    /// How long the circuit stays open before a trial call is let through
    pub recovery_timeout: Duration,
    /// Consecutive trial successes that close a half-open circuit
    pub success_threshold: u32,
    /// Window for the success-rate health metric
    pub monitoring_window: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(30),
            success_threshold: 3,
            monitoring_window: Duration::from_secs(60),
        }
    }
}

/// Retry policy of the resilient call
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, the first one included
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after each further attempt
    pub base_delay: Duration,
    /// Deadline for one raw endpoint call
    pub attempt_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            attempt_timeout: Duration::from_secs(45),
        }
    }
}

impl RetryConfig {
    /// Delay after the given failed attempt (1-indexed): `base * 2^(attempt-1)`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1).min(31));
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(Duration::MAX)
    }
}
