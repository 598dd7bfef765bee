//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL file receiving one line per battle event
    pub battle_log: Option<String>,
    /// File receiving the diagnostic log in addition to stderr
    pub file: Option<String>,
}
