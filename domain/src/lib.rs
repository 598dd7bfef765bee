//! Domain layer for prompt-arena
//!
//! This crate contains the battle rules, reply parsing and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Battle
//!
//! Two models alternately refine a prompt. One improves, the other scores
//! the result, then they swap. The loop ends on consensus (a near-perfect
//! score), on a plateau of non-improving rounds, or at the round limit.
//!
//! ## Reply parsing
//!
//! Model replies are free text. [`ReplyParser`] reads them through an
//! ordered chain of strategies and always returns a usable [`ParsedReply`].

pub mod battle;
pub mod config;
pub mod core;
pub mod prompt;
pub mod reply;

// Re-export commonly used types
pub use battle::{
    BattleOutcome, BattlePhase, BattlePolicy, BattleRecord, BattleResult, ConvergenceTracker, Decision,
    RolePair, Round, RoundUsage, RoundVerdict, select_pair,
};
pub use config::OutputFormat;
pub use core::{
    category::PromptCategory, error::DomainError, model::Model, prompt_text::PromptText,
};
pub use prompt::PromptTemplate;
pub use reply::{
    DEFAULT_SCORE, ParseContext, ParsedReply, ReplyKind, ReplyParser, StrategyKind, parse_score,
    parse_section_score,
};
