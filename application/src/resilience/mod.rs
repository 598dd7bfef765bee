//! Resilient access to the shared LLM endpoint
//!
//! - [`Dispatcher`] — one paced, priority-ordered queue for every call
//! - [`CircuitBreaker`] — stops calling an endpoint that keeps failing
//! - [`ResilientClient`] — retry and timeout around the two above

pub mod circuit_breaker;
pub mod dispatcher;
pub mod error;
pub mod resilient_call;

pub use circuit_breaker::{BreakerHealth, CircuitBreaker, CircuitState};
pub use dispatcher::{Dispatcher, PacingState, Priority};
pub use error::CallError;
pub use resilient_call::{CallOutcome, ResilientClient};
