//! Prompt domain
//!
//! Templates for the requests sent at each step of a battle round.

mod template;

pub use template::PromptTemplate;
