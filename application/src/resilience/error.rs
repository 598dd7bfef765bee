//! Error taxonomy of the resilient call stack

use crate::ports::llm_gateway::GatewayError;
use std::time::Duration;
use thiserror::Error;

/// Why a resilient call gave up
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CallError {
    #[error("Circuit breaker is open, next trial in {retry_in:?}")]
    BreakerOpen { retry_in: Duration },

    #[error("Timed out waiting for the endpoint")]
    Timeout,

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request rejected: {0}")]
    Rejected(String),
}

impl CallError {
    /// Errors worth another attempt after a backoff delay.
    ///
    /// `InvalidResponse` is retried once by the caller and is not included.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CallError::RateLimited(_) | CallError::Timeout | CallError::Transport(_)
        )
    }

    /// Errors that say something about endpoint health and feed the breaker
    pub fn is_endpoint_failure(&self) -> bool {
        !matches!(self, CallError::BreakerOpen { .. } | CallError::Rejected(_))
    }

    /// Short machine-friendly name, used in logs and battle events
    pub fn kind(&self) -> &'static str {
        match self {
            CallError::BreakerOpen { .. } => "breaker_open",
            CallError::Timeout => "timeout",
            CallError::RateLimited(_) => "rate_limited",
            CallError::Transport(_) => "transport",
            CallError::InvalidResponse(_) => "invalid_response",
            CallError::Rejected(_) => "rejected",
        }
    }
}

impl From<GatewayError> for CallError {
    fn from(error: GatewayError) -> Self {
        match error {
            GatewayError::RateLimited(msg) => CallError::RateLimited(msg),
            GatewayError::Timeout => CallError::Timeout,
            GatewayError::Transport(msg) => CallError::Transport(msg),
            GatewayError::InvalidResponse(msg) => CallError::InvalidResponse(msg),
            GatewayError::Rejected(msg) => CallError::Rejected(msg),
        }
    }
}
