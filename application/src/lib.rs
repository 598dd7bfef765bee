//! Application layer for prompt-arena
//!
//! This crate contains use cases, port definitions, the resilient call stack
//! and application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod resilience;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use config::{BattleParams, BreakerConfig, DispatcherConfig, RetryConfig};
pub use ports::{
    battle_logger::{BattleEvent, BattleLogger, NoBattleLogger},
    llm_gateway::{Completion, CompletionGateway, CompletionRequest, GatewayError},
    progress::{BattleProgressNotifier, ChannelProgress, NoProgress, ProgressUpdate},
};
pub use resilience::{
    BreakerHealth, CallError, CallOutcome, CircuitBreaker, CircuitState, Dispatcher, PacingState,
    Priority, ResilientClient,
};
pub use use_cases::check_health::{CheckHealthUseCase, HealthReport, HealthStatus};
pub use use_cases::run_battle::{RunBattleError, RunBattleInput, RunBattleUseCase};
