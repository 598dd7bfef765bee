//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application-layer
//! config types by the `to_*` methods.

mod battle;
mod endpoint;
mod logging;
mod output;
mod resilience;

pub use battle::FileBattleConfig;
pub use endpoint::FileEndpointConfig;
pub use logging::FileLoggingConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use resilience::{FileBreakerConfig, FileDispatcherConfig, FileRetryConfig};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigValidationError {
    #[error("endpoint.url cannot be empty")]
    EmptyEndpointUrl,

    #[error("endpoint.url must start with http:// or https://, got '{0}'")]
    InvalidEndpointUrl(String),

    #[error("{field} must be at least {min}, got {value}")]
    TooSmall {
        field: &'static str,
        min: u64,
        value: u64,
    },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("retry.attempt_timeout_ms ({attempt}) should be below endpoint.request_timeout_ms ({request})")]
    TimeoutOrder { attempt: u64, request: u64 },
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Completion endpoint
    pub endpoint: FileEndpointConfig,
    /// Battle loop thresholds and request sizes
    pub battle: FileBattleConfig,
    /// Request pacing
    pub dispatcher: FileDispatcherConfig,
    /// Circuit breaker
    pub breaker: FileBreakerConfig,
    /// Retry policy
    pub retry: FileRetryConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Log files
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();

        // 1. Endpoint
        let url = self.endpoint.url.trim();
        if url.is_empty() {
            issues.push(ConfigValidationError::EmptyEndpointUrl);
        } else if !(url.starts_with("http://") || url.starts_with("https://")) {
            issues.push(ConfigValidationError::InvalidEndpointUrl(url.to_string()));
        }

        // 2. Counts that must be positive
        let minimums: [(&'static str, u64); 8] = [
            ("battle.max_rounds", self.battle.max_rounds as u64),
            ("battle.max_plateau", self.battle.max_plateau as u64),
            ("battle.improve_max_tokens", self.battle.improve_max_tokens as u64),
            ("battle.review_max_tokens", self.battle.review_max_tokens as u64),
            ("breaker.failure_threshold", self.breaker.failure_threshold as u64),
            ("breaker.success_threshold", self.breaker.success_threshold as u64),
            ("retry.max_attempts", self.retry.max_attempts as u64),
            ("retry.attempt_timeout_ms", self.retry.attempt_timeout_ms),
        ];
        for (field, value) in minimums {
            if value < 1 {
                issues.push(ConfigValidationError::TooSmall {
                    field,
                    min: 1,
                    value,
                });
            }
        }

        // 3. Score and sampling ranges
        let ranges: [(&'static str, f64, f64, f64); 4] = [
            ("battle.consensus_threshold", 1.0, 10.0, self.battle.consensus_threshold),
            ("battle.improvement_margin", 0.0, 9.0, self.battle.improvement_margin),
            ("battle.improve_temperature", 0.0, 2.0, self.battle.improve_temperature as f64),
            ("battle.review_temperature", 0.0, 2.0, self.battle.review_temperature as f64),
        ];
        for (field, min, max, value) in ranges {
            if !(min..=max).contains(&value) {
                issues.push(ConfigValidationError::OutOfRange {
                    field,
                    min,
                    max,
                    value,
                });
            }
        }

        // 4. The HTTP timeout must not cut an attempt short
        if self.retry.attempt_timeout_ms >= self.endpoint.request_timeout_ms {
            issues.push(ConfigValidationError::TimeoutOrder {
                attempt: self.retry.attempt_timeout_ms,
                request: self.endpoint.request_timeout_ms,
            });
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_domain::OutputFormat;
    use std::time::Duration;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[endpoint]
url = "https://example.supabase.co/functions/v1/battle"
api_key_env = "MY_KEY"

[battle]
max_rounds = 3
consensus_threshold = 9.0

[dispatcher]
min_interval_ms = 250

[breaker]
failure_threshold = 4
recovery_timeout_ms = 5000

[retry]
base_delay_ms = 500

[output]
format = "json"
color = false

[logging]
battle_log = "battles.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.endpoint.url,
            "https://example.supabase.co/functions/v1/battle"
        );
        assert_eq!(config.endpoint.api_key_env.as_deref(), Some("MY_KEY"));
        assert_eq!(config.battle.max_rounds, 3);
        assert_eq!(config.output.format, Some(OutputFormat::Json));
        assert!(!config.output.color);
        assert_eq!(config.logging.battle_log.as_deref(), Some("battles.jsonl"));

        let params = config.battle.to_params();
        assert_eq!(params.policy.max_rounds, 3);
        assert_eq!(params.policy.consensus_threshold, 9.0);
        // Untouched fields keep their defaults
        assert_eq!(params.policy.max_plateau, 2);

        assert_eq!(
            config.dispatcher.to_dispatcher_config().min_interval,
            Duration::from_millis(250)
        );
        let breaker = config.breaker.to_breaker_config();
        assert_eq!(breaker.failure_threshold, 4);
        assert_eq!(breaker.recovery_timeout, Duration::from_secs(5));
        assert_eq!(breaker.success_threshold, 3);
        assert_eq!(
            config.retry.to_retry_config().base_delay,
            Duration::from_millis(500)
        );
    }

    #[test]
    fn test_default_config_matches_application_defaults() {
        let config = FileConfig::default();
        assert_eq!(config.battle.to_params(), arena_application::BattleParams::default());
        assert_eq!(
            config.dispatcher.to_dispatcher_config(),
            arena_application::DispatcherConfig::default()
        );
        assert_eq!(
            config.breaker.to_breaker_config(),
            arena_application::BreakerConfig::default()
        );
        assert_eq!(
            config.retry.to_retry_config(),
            arena_application::RetryConfig::default()
        );
    }

    #[test]
    fn test_validate_valid_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_reports_every_issue() {
        let toml_str = r#"
[endpoint]
url = "ftp://nowhere"
request_timeout_ms = 1000

[battle]
max_rounds = 0
consensus_threshold = 12.0

[retry]
max_attempts = 0
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();

        assert!(issues.contains(&ConfigValidationError::InvalidEndpointUrl(
            "ftp://nowhere".into()
        )));
        assert!(issues.contains(&ConfigValidationError::TooSmall {
            field: "battle.max_rounds",
            min: 1,
            value: 0
        }));
        assert!(issues.contains(&ConfigValidationError::TooSmall {
            field: "retry.max_attempts",
            min: 1,
            value: 0
        }));
        assert!(issues.iter().any(|i| matches!(
            i,
            ConfigValidationError::OutOfRange {
                field: "battle.consensus_threshold",
                ..
            }
        )));
        assert!(issues.iter().any(|i| matches!(
            i,
            ConfigValidationError::TimeoutOrder { .. }
        )));
    }

    #[test]
    fn test_api_key_from_env() {
        let config = FileEndpointConfig {
            api_key_env: Some("PROMPT_ARENA_TEST_KEY_UNSET".into()),
            ..FileEndpointConfig::default()
        };
        assert_eq!(config.api_key(), None);

        let config = FileEndpointConfig {
            api_key_env: None,
            ..FileEndpointConfig::default()
        };
        assert_eq!(config.api_key(), None);
    }
}
