//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`] — LLM models that can take part in a battle
//! - [`category::PromptCategory`] — what kind of prompt is being refined
//! - [`prompt_text::PromptText`] — a validated, non-empty prompt
//! - [`error::DomainError`] — domain-level errors

pub mod category;
pub mod error;
pub mod model;
pub mod prompt_text;
pub mod string;
