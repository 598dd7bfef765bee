//! Iterative prompt battle domain
//!
//! Two models take turns: one rewrites the prompt (the *improver*), the other
//! scores the rewrite (the *reviewer*). After every round the roles swap.
//!
//! ```text
//! SelectPair ──► Improve ──► Review ──► Evaluate ──┬──► Finalize
//!                   ▲                              │
//!                   └────────── swap roles ◄───────┘
//! ```
//!
//! This module holds the pure rules: which models meet, what a round records,
//! when the loop stops, and how the final result is assembled. The
//! application layer drives the loop and talks to the endpoint.

pub mod pairing;
pub mod phase;
pub mod policy;
pub mod result;
pub mod round;

pub use pairing::{RolePair, select_pair};
pub use phase::BattlePhase;
pub use policy::{BattlePolicy, ConvergenceTracker, Decision, RoundVerdict};
pub use result::{BattleOutcome, BattleRecord, BattleResult};
pub use round::{Round, RoundUsage};
