//! Completion gateway port
//!
//! Defines the single operation the core needs from the LLM endpoint:
//! send one prompt to one model and get text back.

use arena_domain::Model;
use async_trait::async_trait;
use thiserror::Error;

/// Errors the endpoint can report, already classified for the resilience layer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Timeout")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request rejected: {0}")]
    Rejected(String),
}

impl GatewayError {
    /// Throttling errors are handled by the dispatcher, not returned to callers
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, GatewayError::RateLimited(_))
    }
}

/// One completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: Model,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(model: Model, prompt: impl Into<String>) -> Self {
        Self {
            model,
            prompt: prompt.into(),
            max_tokens: 1024,
            temperature: 0.7,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// What the endpoint returned. `cost` is opaque and only summed.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub token_count: u64,
    pub cost: f64,
}

impl Completion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            token_count: 0,
            cost: 0.0,
        }
    }

    pub fn with_usage(mut self, token_count: u64, cost: f64) -> Self {
        self.token_count = token_count;
        self.cost = cost;
        self
    }
}

/// Gateway for LLM completions
///
/// This port defines how the application layer reaches the LLM endpoint.
/// Implementations (adapters) live in the infrastructure layer; tests use
/// in-memory fakes.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Run one raw completion. No retry, pacing or timeout happens here.
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, GatewayError>;
}
