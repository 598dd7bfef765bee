//! HTTP adapter for the completion edge function
//!
//! Implements the [`CompletionGateway`](arena_application::CompletionGateway)
//! port by POSTing `{model, prompt, maxTokens, temperature}` and reading
//! `{response, tokens, cost}` back. HTTP failures are mapped onto the
//! gateway error classes the resilience layer understands.

mod error;
mod gateway;
mod wire;

pub use error::{EndpointError, Result};
pub use gateway::HttpCompletionGateway;
