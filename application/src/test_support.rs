//! In-memory gateway fakes shared by the application tests

use crate::config::{BreakerConfig, DispatcherConfig, RetryConfig};
use crate::ports::llm_gateway::{Completion, CompletionGateway, CompletionRequest, GatewayError};
use crate::resilience::{CircuitBreaker, Dispatcher, ResilientClient};
use arena_domain::Model;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the fake does for one call
pub(crate) enum Reply {
    Text(String),
    Fail(GatewayError),
    /// Answers with the text after the given delay
    Slow(Duration, String),
    /// Never answers; only a timeout ends the call
    Hang,
}

impl Reply {
    pub(crate) fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }
}

type Handler = dyn Fn(&CompletionRequest, usize) -> Reply + Send + Sync;

/// Gateway whose answers come from a closure of `(request, call number)`.
/// Call numbers start at 1 and count every call.
pub(crate) struct FakeGateway {
    handler: Box<Handler>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl FakeGateway {
    pub(crate) fn new(
        handler: impl Fn(&CompletionRequest, usize) -> Reply + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn calls_for(&self, model: &Model) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| &c.model == model)
            .count()
    }
}

#[async_trait]
impl CompletionGateway for FakeGateway {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, GatewayError> {
        let call_no = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(request.clone());
            calls.len()
        };
        match (self.handler)(request, call_no) {
            Reply::Text(text) => Ok(Completion::new(text).with_usage(100, 0.001)),
            Reply::Fail(error) => Err(error),
            Reply::Slow(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(Completion::new(text).with_usage(100, 0.001))
            }
            Reply::Hang => {
                futures::future::pending::<()>().await;
                Err(GatewayError::Timeout)
            }
        }
    }
}

/// Whether the request is an improve call (as opposed to a review or health check)
pub(crate) fn is_improve(request: &CompletionRequest) -> bool {
    request.prompt.contains("IMPROVED PROMPT:")
}

/// Whether the request is a review call
pub(crate) fn is_review(request: &CompletionRequest) -> bool {
    request.prompt.contains("SCORE:")
}

pub(crate) fn improve_reply(prompt: &str) -> String {
    format!("THINKING: Add audience and format.\nIMPROVED PROMPT: {prompt}")
}

pub(crate) fn review_reply(score: f64) -> String {
    format!("THINKING: Solid.\nSCORE: {score}\nFEEDBACK: Mention the audience.")
}

/// Fast-pacing stack over the given gateway, with default breaker and retry
pub(crate) fn client(gateway: Arc<FakeGateway>) -> Arc<ResilientClient<FakeGateway>> {
    client_with(gateway, BreakerConfig::default(), RetryConfig::default())
}

pub(crate) fn client_with(
    gateway: Arc<FakeGateway>,
    breaker: BreakerConfig,
    retry: RetryConfig,
) -> Arc<ResilientClient<FakeGateway>> {
    let dispatcher = Arc::new(Dispatcher::new(DispatcherConfig {
        min_interval: Duration::from_millis(10),
        ..DispatcherConfig::default()
    }));
    Arc::new(ResilientClient::new(
        gateway,
        dispatcher,
        Arc::new(CircuitBreaker::new(breaker)),
        retry,
    ))
}
