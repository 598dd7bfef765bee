//! Endpoint configuration from TOML (`[endpoint]` section)

use serde::{Deserialize, Serialize};

/// Where the completion edge function lives and how to authenticate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEndpointConfig {
    /// Edge function URL accepting `{model, prompt, maxTokens, temperature}`
    pub url: String,
    /// Name of the environment variable holding the bearer token
    pub api_key_env: Option<String>,
    /// HTTP client timeout. Kept above the per-attempt timeout so the
    /// resilience layer decides first.
    pub request_timeout_ms: u64,
}

impl Default for FileEndpointConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321/functions/v1/complete".to_string(),
            api_key_env: Some("ARENA_API_KEY".to_string()),
            request_timeout_ms: 60_000,
        }
    }
}

impl FileEndpointConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        self.api_key_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|key| !key.trim().is_empty())
    }
}
