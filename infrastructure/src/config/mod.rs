//! Configuration file loading for prompt-arena
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `ARENA_*` environment variables (`ARENA_BATTLE__MAX_ROUNDS=3`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./arena.toml` or `./.arena.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/prompt-arena/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileBattleConfig, FileBreakerConfig, FileConfig, FileDispatcherConfig,
    FileEndpointConfig, FileLoggingConfig, FileOutputConfig, FileOutputFormat, FileRetryConfig,
};
pub use loader::ConfigLoader;
