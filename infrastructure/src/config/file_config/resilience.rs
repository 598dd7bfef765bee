//! Resilience configuration from TOML (`[dispatcher]`, `[breaker]`, `[retry]`)
//!
//! Durations are written in milliseconds in the file.

use arena_application::{BreakerConfig, DispatcherConfig, RetryConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDispatcherConfig {
    pub min_interval_ms: u64,
    pub max_backoff_ms: u64,
    pub max_requeues: u32,
}

impl Default for FileDispatcherConfig {
    fn default() -> Self {
        let config = DispatcherConfig::default();
        Self {
            min_interval_ms: config.min_interval.as_millis() as u64,
            max_backoff_ms: config.max_backoff.as_millis() as u64,
            max_requeues: config.max_requeues,
        }
    }
}

impl FileDispatcherConfig {
    pub fn to_dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            min_interval: Duration::from_millis(self.min_interval_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            max_requeues: self.max_requeues,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBreakerConfig {
    pub failure_threshold: u32,
    pub recovery_timeout_ms: u64,
    pub success_threshold: u32,
    pub monitoring_window_ms: u64,
}

impl Default for FileBreakerConfig {
    fn default() -> Self {
        let config = BreakerConfig::default();
        Self {
            failure_threshold: config.failure_threshold,
            recovery_timeout_ms: config.recovery_timeout.as_millis() as u64,
            success_threshold: config.success_threshold,
            monitoring_window_ms: config.monitoring_window.as_millis() as u64,
        }
    }
}

impl FileBreakerConfig {
    pub fn to_breaker_config(&self) -> BreakerConfig {
        BreakerConfig {
            failure_threshold: self.failure_threshold,
            recovery_timeout: Duration::from_millis(self.recovery_timeout_ms),
            success_threshold: self.success_threshold,
            monitoring_window: Duration::from_millis(self.monitoring_window_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub attempt_timeout_ms: u64,
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        let config = RetryConfig::default();
        Self {
            max_attempts: config.max_attempts,
            base_delay_ms: config.base_delay.as_millis() as u64,
            attempt_timeout_ms: config.attempt_timeout.as_millis() as u64,
        }
    }
}

impl FileRetryConfig {
    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            attempt_timeout: Duration::from_millis(self.attempt_timeout_ms),
        }
    }
}
