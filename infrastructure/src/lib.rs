//! Infrastructure layer for prompt-arena
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the HTTP completion endpoint, the JSONL
//! battle log and configuration file loading.

pub mod config;
pub mod endpoint;
pub mod logging;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileBattleConfig, FileBreakerConfig, FileConfig,
    FileDispatcherConfig, FileEndpointConfig, FileLoggingConfig, FileOutputConfig,
    FileOutputFormat, FileRetryConfig,
};
pub use endpoint::{EndpointError, HttpCompletionGateway};
pub use logging::JsonlBattleLogger;
