//! Resilient completion call
//!
//! Composes, from the outside in:
//!
//! ```text
//! retry policy ─► circuit breaker ─► dispatcher ─► timeout ─► gateway
//! ```
//!
//! Every attempt passes the breaker and waits its turn in the dispatcher;
//! the per-attempt deadline only covers the raw endpoint call, not the time
//! spent queued.

use super::circuit_breaker::CircuitBreaker;
use super::dispatcher::{Dispatcher, Priority};
use super::error::CallError;
use crate::config::RetryConfig;
use crate::ports::llm_gateway::{Completion, CompletionGateway, CompletionRequest, GatewayError};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, warn};

/// Successful result of a resilient call
#[derive(Debug, Clone, PartialEq)]
pub struct CallOutcome {
    pub text: String,
    pub tokens: u64,
    pub cost: f64,
    /// Wall time from the first attempt to the answer, queueing included
    pub latency: Duration,
    /// Time the endpoint took on the successful attempt, queueing excluded
    pub response_time: Duration,
    pub attempts: u32,
}

pub struct ResilientClient<G: CompletionGateway + ?Sized + 'static> {
    gateway: Arc<G>,
    dispatcher: Arc<Dispatcher>,
    breaker: Arc<CircuitBreaker>,
    retry: RetryConfig,
}

impl<G: CompletionGateway + ?Sized + 'static> ResilientClient<G> {
    pub fn new(
        gateway: Arc<G>,
        dispatcher: Arc<Dispatcher>,
        breaker: Arc<CircuitBreaker>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            gateway,
            dispatcher,
            breaker,
            retry,
        }
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Complete `request`, retrying transient failures.
    ///
    /// `RateLimited`, `Timeout` and `Transport` are retried up to the attempt
    /// limit, `InvalidResponse` once. `BreakerOpen` and `Rejected` return
    /// immediately.
    pub async fn complete(
        &self,
        request: CompletionRequest,
        priority: Priority,
    ) -> Result<CallOutcome, CallError> {
        let started = Instant::now();
        let max_attempts = self.retry.max_attempts.max(1);
        let mut invalid_retried = false;
        let mut attempt = 1;

        loop {
            match self.attempt(&request, priority).await {
                Ok((completion, response_time)) => {
                    debug!(
                        "{} answered in {:?} ({:?} at the endpoint) after {} attempt(s)",
                        request.model,
                        started.elapsed(),
                        response_time,
                        attempt
                    );
                    return Ok(CallOutcome {
                        text: completion.text,
                        tokens: completion.token_count,
                        cost: completion.cost,
                        latency: started.elapsed(),
                        response_time,
                        attempts: attempt,
                    });
                }
                Err(error) => {
                    let retry = match &error {
                        CallError::InvalidResponse(_) => !invalid_retried,
                        other => other.is_retryable(),
                    };
                    if !retry || attempt >= max_attempts {
                        warn!(
                            "{} failed after {} attempt(s): {}",
                            request.model, attempt, error
                        );
                        return Err(error);
                    }
                    if matches!(error, CallError::InvalidResponse(_)) {
                        invalid_retried = true;
                    }

                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        "{} attempt {}/{} failed ({}), retrying in {:?}",
                        request.model, attempt, max_attempts, error, delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn attempt(
        &self,
        request: &CompletionRequest,
        priority: Priority,
    ) -> Result<(Completion, Duration), CallError> {
        let gateway = Arc::clone(&self.gateway);
        let request = request.clone();
        let deadline = self.retry.attempt_timeout;

        self.breaker
            .execute(|| {
                self.dispatcher.enqueue(priority, move || {
                    let gateway = Arc::clone(&gateway);
                    let request = request.clone();
                    async move {
                        let sent = Instant::now();
                        let completion = timeout(deadline, gateway.complete(&request))
                            .await
                            .map_err(|_| GatewayError::Timeout)??;
                        if completion.text.trim().is_empty() {
                            return Err(GatewayError::InvalidResponse(
                                "endpoint returned no text".into(),
                            ));
                        }
                        Ok((completion, sent.elapsed()))
                    }
                })
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BreakerConfig;
    use crate::resilience::CircuitState;
    use crate::test_support::{FakeGateway, Reply, client, client_with};
    use arena_domain::Model;

    fn request() -> CompletionRequest {
        CompletionRequest::new(Model::Gpt4oMini, "Write about AI")
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_passes_usage_through() {
        let gateway = Arc::new(FakeGateway::new(|_, _| Reply::text("Sure")));
        let client = client(Arc::clone(&gateway));

        let outcome = client.complete(request(), Priority::BATTLE).await.unwrap();
        assert_eq!(outcome.text, "Sure");
        assert_eq!(outcome.tokens, 100);
        assert_eq!(outcome.attempts, 1);
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_retried_until_limit() {
        let gateway = Arc::new(FakeGateway::new(|_, _| Reply::Hang));
        let client = client(Arc::clone(&gateway));

        let started = Instant::now();
        let result = client.complete(request(), Priority::BATTLE).await;
        assert_eq!(result, Err(CallError::Timeout));
        assert_eq!(gateway.call_count(), 3);
        // Three 45 s deadlines plus 1 s and 2 s backoff
        assert!(started.elapsed() >= Duration::from_secs(138));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_recovers_on_retry() {
        let gateway = Arc::new(FakeGateway::new(|_, call| {
            if call == 1 {
                Reply::Fail(GatewayError::Transport("connection reset".into()))
            } else {
                Reply::text("Recovered")
            }
        }));
        let client = client(Arc::clone(&gateway));

        let outcome = client.complete(request(), Priority::BATTLE).await.unwrap();
        assert_eq!(outcome.text, "Recovered");
        assert_eq!(outcome.attempts, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_response_time_excludes_retry_delay() {
        let gateway = Arc::new(FakeGateway::new(|_, call| {
            if call == 1 {
                Reply::Fail(GatewayError::Timeout)
            } else {
                Reply::Slow(Duration::from_millis(300), "Done".into())
            }
        }));
        let client = client(Arc::clone(&gateway));

        let outcome = client.complete(request(), Priority::BATTLE).await.unwrap();
        assert!(outcome.response_time >= Duration::from_millis(300));
        assert!(outcome.response_time < Duration::from_millis(400));
        // The 1 s retry delay counts toward latency only
        assert!(outcome.latency >= Duration::from_millis(1300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_text_is_retried_once() {
        let gateway = Arc::new(FakeGateway::new(|_, _| Reply::text("   ")));
        let client = client(Arc::clone(&gateway));

        let result = client.complete(request(), Priority::BATTLE).await;
        assert!(matches!(result, Err(CallError::InvalidResponse(_))));
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejection_is_not_retried() {
        let gateway = Arc::new(FakeGateway::new(|_, _| {
            Reply::Fail(GatewayError::Rejected("unknown model".into()))
        }));
        let client = client(Arc::clone(&gateway));

        let result = client.complete(request(), Priority::BATTLE).await;
        assert_eq!(result, Err(CallError::Rejected("unknown model".into())));
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_breaker_fails_fast_without_calling() {
        let gateway = Arc::new(FakeGateway::new(|_, _| {
            Reply::Fail(GatewayError::Transport("down".into()))
        }));
        let client = client_with(
            Arc::clone(&gateway),
            BreakerConfig {
                failure_threshold: 2,
                ..BreakerConfig::default()
            },
            RetryConfig::default(),
        );

        // Attempt 1 and 2 fail and open the circuit; attempt 3 is refused
        let result = client.complete(request(), Priority::BATTLE).await;
        assert!(matches!(result, Err(CallError::BreakerOpen { .. })));
        assert_eq!(gateway.call_count(), 2);
        assert_eq!(client.breaker().state(), CircuitState::Open);

        let result = client.complete(request(), Priority::BATTLE).await;
        assert!(matches!(result, Err(CallError::BreakerOpen { .. })));
        assert_eq!(gateway.call_count(), 2);
    }
}
