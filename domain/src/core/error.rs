//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Prompt cannot be empty")]
    EmptyPrompt,

    #[error("A battle needs two distinct models, got {0} twice")]
    IdenticalModels(String),

    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    #[error("Invalid battle policy: {0}")]
    InvalidPolicy(String),
}
