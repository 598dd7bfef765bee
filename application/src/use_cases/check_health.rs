//! Check Health use case
//!
//! Sends a minimal check request to a model through the resilient call stack at low
//! priority and classifies the answer.

use crate::ports::llm_gateway::{CompletionGateway, CompletionRequest};
use crate::resilience::{CircuitState, Priority, ResilientClient};
use arena_domain::{Model, PromptTemplate};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unavailable,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unavailable => "unavailable",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub model: Model,
    pub status: HealthStatus,
    pub response_time_ms: u64,
    pub recommendation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Breaker state right after the check
    pub breaker_state: String,
    pub breaker_success_rate: f64,
}

pub struct CheckHealthUseCase<G: CompletionGateway + ?Sized + 'static> {
    client: Arc<ResilientClient<G>>,
    /// Checks slower than this count as degraded
    slow_after: Duration,
}

impl<G: CompletionGateway + ?Sized + 'static> CheckHealthUseCase<G> {
    pub fn new(client: Arc<ResilientClient<G>>) -> Self {
        Self {
            client,
            slow_after: Duration::from_secs(5),
        }
    }

    pub fn with_slow_after(mut self, slow_after: Duration) -> Self {
        self.slow_after = slow_after;
        self
    }

    pub async fn execute(&self, model: &Model) -> HealthReport {
        let request = CompletionRequest::new(model.clone(), PromptTemplate::health_check())
            .with_max_tokens(5)
            .with_temperature(0.0);

        let result = self.client.complete(request, Priority::HEALTH_CHECK).await;
        let breaker = self.client.breaker().health_metrics();

        let (status, response_time, recommendation, error) = match result {
            Ok(outcome) if outcome.response_time <= self.slow_after => (
                HealthStatus::Healthy,
                outcome.response_time,
                format!("{} is responding normally.", model),
                None,
            ),
            Ok(outcome) => (
                HealthStatus::Degraded,
                outcome.response_time,
                format!(
                    "{} is slow ({} ms); expect longer battles or pick another model.",
                    model,
                    outcome.response_time.as_millis()
                ),
                None,
            ),
            Err(error) => {
                let recommendation = if breaker.state == CircuitState::Open {
                    let wait = breaker.next_trial_in.unwrap_or_default();
                    format!(
                        "The endpoint is failing; wait about {} s before retrying.",
                        wait.as_secs().max(1)
                    )
                } else {
                    format!("{} is not answering; choose a different model.", model)
                };
                (
                    HealthStatus::Unavailable,
                    Duration::ZERO,
                    recommendation,
                    Some(error.to_string()),
                )
            }
        };

        info!("Health of {}: {}", model, status);
        HealthReport {
            model: model.clone(),
            status,
            response_time_ms: response_time.as_millis() as u64,
            recommendation,
            error,
            breaker_state: breaker.state.as_str().to_string(),
            breaker_success_rate: breaker.success_rate,
        }
    }

    /// Check several models. Checks still go through the dispatcher one by one.
    pub async fn check_all(&self, models: &[Model]) -> Vec<HealthReport> {
        join_all(models.iter().map(|model| self.execute(model))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::GatewayError;
    use crate::config::{BreakerConfig, DispatcherConfig, RetryConfig};
    use crate::resilience::{CircuitBreaker, Dispatcher};
    use crate::test_support::{FakeGateway, Reply, client};

    #[tokio::test(start_paused = true)]
    async fn test_healthy_model() {
        let gateway = Arc::new(FakeGateway::new(|_, _| Reply::text("OK")));
        let report = CheckHealthUseCase::new(client(gateway))
            .execute(&Model::Gpt4oMini)
            .await;
        assert_eq!(report.status, HealthStatus::Healthy);
        assert!(report.error.is_none());
        assert_eq!(report.breaker_state, "closed");
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_model_is_degraded() {
        let gateway = Arc::new(FakeGateway::new(|_, _| {
            Reply::Slow(Duration::from_secs(1), "OK".into())
        }));
        let report = CheckHealthUseCase::new(client(gateway))
            .with_slow_after(Duration::from_millis(500))
            .execute(&Model::Gpt4oMini)
            .await;
        assert_eq!(report.status, HealthStatus::Degraded);
        assert!(report.response_time_ms >= 1000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_queue_wait_does_not_degrade_fast_model() {
        let gateway = Arc::new(FakeGateway::new(|_, _| Reply::text("OK")));
        // Two seconds between dispatches: the fourth check waits about 6 s in the queue
        let dispatcher = Arc::new(Dispatcher::new(DispatcherConfig {
            min_interval: Duration::from_secs(2),
            ..DispatcherConfig::default()
        }));
        let client = Arc::new(ResilientClient::new(
            gateway,
            dispatcher,
            Arc::new(CircuitBreaker::new(BreakerConfig::default())),
            RetryConfig::default(),
        ));

        let reports = CheckHealthUseCase::new(client)
            .with_slow_after(Duration::from_secs(1))
            .check_all(&[
                Model::Llama33,
                Model::Gpt4oMini,
                Model::Gemini20Flash,
                Model::MistralLarge,
            ])
            .await;
        assert!(reports.iter().all(|r| r.status == HealthStatus::Healthy));
        assert!(reports.iter().all(|r| r.response_time_ms < 1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_model_is_unavailable() {
        let gateway = Arc::new(FakeGateway::new(|_, _| {
            Reply::Fail(GatewayError::Rejected("unknown model".into()))
        }));
        let report = CheckHealthUseCase::new(client(gateway))
            .execute(&Model::Custom("nope".into()))
            .await;
        assert_eq!(report.status, HealthStatus::Unavailable);
        assert!(report.error.unwrap().contains("unknown model"));
        assert!(report.recommendation.contains("nope"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_all_keeps_order() {
        let gateway = Arc::new(FakeGateway::new(|req, _| {
            if req.model == Model::DeepSeekR1 {
                Reply::Fail(GatewayError::Rejected("offline".into()))
            } else {
                Reply::text("OK")
            }
        }));
        let reports = CheckHealthUseCase::new(client(Arc::clone(&gateway)))
            .check_all(&[Model::Llama33, Model::DeepSeekR1])
            .await;
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].model, Model::Llama33);
        assert_eq!(reports[0].status, HealthStatus::Healthy);
        assert_eq!(reports[1].status, HealthStatus::Unavailable);
        assert!(gateway.calls().iter().all(|c| c.max_tokens == 5));
    }
}
