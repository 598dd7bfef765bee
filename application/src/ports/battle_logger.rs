//! Port for structured battle logging.
//!
//! Defines the [`BattleLogger`] trait for recording battle events (start,
//! each recorded or failed round, finish) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port captures the battle history
//! in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured battle event for logging.
///
/// Each event has a type string and a JSON payload with event-specific
/// fields. The adapter adds the timestamp.
pub struct BattleEvent {
    /// Event type identifier (e.g., "battle_started", "round_recorded").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl BattleEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging battle events to a structured log.
///
/// `log` is synchronous and infallible; adapters drop write errors.
pub trait BattleLogger: Send + Sync {
    /// Record a battle event.
    fn log(&self, event: BattleEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoBattleLogger;

impl BattleLogger for NoBattleLogger {
    fn log(&self, _event: BattleEvent) {}
}
