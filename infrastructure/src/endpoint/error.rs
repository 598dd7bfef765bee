//! Error types for the HTTP endpoint adapter

use arena_application::GatewayError;
use thiserror::Error;

/// Result type alias for endpoint operations
pub type Result<T> = std::result::Result<T, EndpointError>;

/// Errors that can occur when calling the completion edge function
#[derive(Error, Debug)]
pub enum EndpointError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Endpoint returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode response: {error}\nRaw response: {raw}")]
    Decode { error: String, raw: String },

    #[error("Endpoint error: {0}")]
    Reported(String),

    #[error("Endpoint returned an empty completion")]
    EmptyCompletion,

    #[error("Invalid endpoint configuration: {0}")]
    Config(String),
}

impl EndpointError {
    fn mentions_rate_limit(message: &str) -> bool {
        let lower = message.to_lowercase();
        lower.contains("rate limit") || lower.contains("too many requests") || lower.contains("429")
    }
}

impl From<EndpointError> for GatewayError {
    fn from(error: EndpointError) -> Self {
        match error {
            EndpointError::Http(e) if e.is_timeout() => GatewayError::Timeout,
            EndpointError::Http(e) => GatewayError::Transport(e.to_string()),
            EndpointError::Status { status, message } => match status {
                429 => GatewayError::RateLimited(message),
                408 | 504 => GatewayError::Timeout,
                500..=599 if EndpointError::mentions_rate_limit(&message) => {
                    GatewayError::RateLimited(message)
                }
                500..=599 => GatewayError::Transport(format!("HTTP {}: {}", status, message)),
                _ => GatewayError::Rejected(format!("HTTP {}: {}", status, message)),
            },
            EndpointError::Reported(message) if EndpointError::mentions_rate_limit(&message) => {
                GatewayError::RateLimited(message)
            }
            EndpointError::Reported(message) => GatewayError::Transport(message),
            e @ (EndpointError::Decode { .. } | EndpointError::EmptyCompletion) => {
                GatewayError::InvalidResponse(e.to_string())
            }
            EndpointError::Config(message) => GatewayError::Rejected(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16, message: &str) -> GatewayError {
        EndpointError::Status {
            status,
            message: message.to_string(),
        }
        .into()
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(status(429, "slow down"), GatewayError::RateLimited(_)));
        assert_eq!(status(504, "gateway timeout"), GatewayError::Timeout);
        assert!(matches!(status(502, "bad gateway"), GatewayError::Transport(_)));
        assert!(matches!(
            status(500, "Upstream rate limit exceeded"),
            GatewayError::RateLimited(_)
        ));
        assert!(matches!(status(400, "unknown model"), GatewayError::Rejected(_)));
        assert!(matches!(status(401, "bad key"), GatewayError::Rejected(_)));
    }

    #[test]
    fn test_body_errors_are_invalid_responses() {
        let error: GatewayError = EndpointError::EmptyCompletion.into();
        assert!(matches!(error, GatewayError::InvalidResponse(_)));

        let error: GatewayError = EndpointError::Decode {
            error: "expected value".into(),
            raw: "<html>".into(),
        }
        .into();
        assert!(matches!(error, GatewayError::InvalidResponse(_)));
    }

    #[test]
    fn test_reported_errors() {
        let error: GatewayError = EndpointError::Reported("Too Many Requests".into()).into();
        assert!(error.is_rate_limited());
        let error: GatewayError = EndpointError::Reported("provider exploded".into()).into();
        assert!(matches!(error, GatewayError::Transport(_)));
    }
}
