//! Structured battle logging.
//!
//! Provides [`JsonlBattleLogger`], the JSONL implementation of the
//! [`BattleLogger`](arena_application::BattleLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlBattleLogger;
