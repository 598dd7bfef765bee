//! Circuit breaker for the shared endpoint
//!
//! Stops sending requests to an endpoint that keeps failing and lets a few
//! trial requests through once a recovery timeout has passed.
//!
//! ```text
//!          failures >= threshold
//! Closed ─────────────────────────► Open
//!    ▲                               │ recovery timeout elapsed
//!    │ successes >= threshold        ▼ (on next call)
//!    └───────────────────────── HalfOpen
//!                 any failure ──► Open
//! ```
//!
//! All state lives behind one mutex, so every transition is atomic. The
//! lock is never held across an `.await`.

use super::error::CallError;
use crate::config::BreakerConfig;
use crate::ports::llm_gateway::GatewayError;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// State of the circuit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half-open",
        }
    }
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
struct RequestSample {
    at: Instant,
    success: bool,
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    consecutive_failures: u32,
    half_open_successes: u32,
    last_failure: Option<Instant>,
    samples: VecDeque<RequestSample>,
}

/// Read-only snapshot for observability. Never used for control decisions.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakerHealth {
    pub state: CircuitState,
    pub consecutive_failures: u32,
    /// Successes over requests within the monitoring window; 1.0 when idle
    pub success_rate: f64,
    pub requests_in_window: usize,
    /// Time until an open circuit lets the next trial call through
    pub next_trial_in: Option<Duration>,
}

pub struct CircuitBreaker {
    config: BreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                half_open_successes: 0,
                last_failure: None,
                samples: VecDeque::new(),
            }),
        }
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    /// Run `op` through the breaker.
    ///
    /// Fails fast with [`CallError::BreakerOpen`] while the circuit is open.
    /// `Rejected` errors pass through without counting as failures.
    pub async fn execute<T, F, Fut>(&self, op: F) -> Result<T, CallError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        self.try_acquire()?;

        match op().await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(error) => {
                let error = CallError::from(error);
                if error.is_endpoint_failure() {
                    self.record_failure();
                }
                Err(error)
            }
        }
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    pub fn health_metrics(&self) -> BreakerHealth {
        let now = Instant::now();
        let mut inner = self.lock();
        prune(&mut inner.samples, now, self.config.monitoring_window);

        let total = inner.samples.len();
        let successes = inner.samples.iter().filter(|s| s.success).count();
        let success_rate = if total == 0 {
            1.0
        } else {
            successes as f64 / total as f64
        };
        let next_trial_in = match (inner.state, inner.last_failure) {
            (CircuitState::Open, Some(at)) => Some(
                self.config
                    .recovery_timeout
                    .saturating_sub(now.duration_since(at)),
            ),
            _ => None,
        };

        BreakerHealth {
            state: inner.state,
            consecutive_failures: inner.consecutive_failures,
            success_rate,
            requests_in_window: total,
            next_trial_in,
        }
    }

    fn try_acquire(&self) -> Result<(), CallError> {
        let now = Instant::now();
        let mut inner = self.lock();
        if inner.state != CircuitState::Open {
            return Ok(());
        }

        let elapsed = inner
            .last_failure
            .map(|at| now.duration_since(at))
            .unwrap_or(Duration::MAX);
        if elapsed > self.config.recovery_timeout {
            info!("Circuit breaker half-open, letting a trial request through");
            inner.state = CircuitState::HalfOpen;
            inner.half_open_successes = 0;
            Ok(())
        } else {
            Err(CallError::BreakerOpen {
                retry_in: self.config.recovery_timeout.saturating_sub(elapsed),
            })
        }
    }

    fn record_success(&self) {
        let now = Instant::now();
        let mut inner = self.lock();
        push_sample(&mut inner.samples, now, true, self.config.monitoring_window);
        inner.consecutive_failures = 0;

        if inner.state == CircuitState::HalfOpen {
            inner.half_open_successes += 1;
            if inner.half_open_successes >= self.config.success_threshold {
                info!(
                    "Circuit breaker closed after {} successful trials",
                    inner.half_open_successes
                );
                inner.state = CircuitState::Closed;
                inner.half_open_successes = 0;
            }
        }
    }

    fn record_failure(&self) {
        let now = Instant::now();
        let mut inner = self.lock();
        push_sample(&mut inner.samples, now, false, self.config.monitoring_window);
        inner.consecutive_failures += 1;
        inner.last_failure = Some(now);

        match inner.state {
            CircuitState::HalfOpen => {
                warn!("Trial request failed, circuit breaker open again");
                inner.state = CircuitState::Open;
                inner.half_open_successes = 0;
            }
            CircuitState::Closed
                if inner.consecutive_failures >= self.config.failure_threshold =>
            {
                warn!(
                    "Circuit breaker open after {} consecutive failures",
                    inner.consecutive_failures
                );
                inner.state = CircuitState::Open;
            }
            CircuitState::Closed => {
                debug!(
                    "Endpoint failure {}/{}",
                    inner.consecutive_failures, self.config.failure_threshold
                );
            }
            CircuitState::Open => {}
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerInner> {
        // The state stays consistent even if a holder panicked mid-update
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn push_sample(samples: &mut VecDeque<RequestSample>, at: Instant, success: bool, window: Duration) {
    samples.push_back(RequestSample { at, success });
    prune(samples, at, window);
}

fn prune(samples: &mut VecDeque<RequestSample>, now: Instant, window: Duration) {
    while let Some(oldest) = samples.front() {
        if now.duration_since(oldest.at) > window {
            samples.pop_front();
        } else {
            break;
        }
    }
}
