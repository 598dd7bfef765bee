//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases and
//! the resilient call stack behave:
//!
//! - [`BattleParams`] — battle loop parameters (policy, token limits, temperatures)
//! - [`DispatcherConfig`] — request pacing and rate-limit backoff
//! - [`BreakerConfig`] — circuit breaker thresholds and windows
//! - [`RetryConfig`] — attempt limit, backoff base and per-attempt timeout

pub mod battle_params;
pub mod resilience;

pub use battle_params::BattleParams;
pub use resilience::{BreakerConfig, DispatcherConfig, RetryConfig};
