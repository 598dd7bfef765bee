//! HTTP implementation of the completion gateway

use super::error::{EndpointError, Result};
use super::wire::{CompletionBody, CompletionReply, error_message};
use crate::config::FileEndpointConfig;
use arena_application::{Completion, CompletionGateway, CompletionRequest, GatewayError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, trace};

/// Calls the completion edge function over HTTP.
///
/// One POST per completion. No retry or pacing happens here; the
/// application's resilience layer owns both.
pub struct HttpCompletionGateway {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpCompletionGateway {
    pub fn new(url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let url = url.into();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(EndpointError::Config(format!("not an http(s) URL: {}", url)));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("prompt-arena/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url,
            api_key,
        })
    }

    /// Build the gateway from the `[endpoint]` config section
    pub fn from_config(config: &FileEndpointConfig) -> Result<Self> {
        Self::new(
            config.url.trim(),
            config.api_key(),
            Duration::from_millis(config.request_timeout_ms),
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(&self, request: &CompletionRequest) -> Result<Completion> {
        let body = CompletionBody {
            model: request.model.as_str(),
            prompt: &request.prompt,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let mut builder = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        debug!(
            "POST {} ({}, {} chars)",
            self.url,
            request.model,
            request.prompt.len()
        );
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        trace!("Endpoint answered HTTP {}: {}", status.as_u16(), text);

        if !status.is_success() {
            return Err(EndpointError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let reply: CompletionReply =
            serde_json::from_str(&text).map_err(|e| EndpointError::Decode {
                error: e.to_string(),
                raw: text.chars().take(500).collect(),
            })?;

        if let Some(error) = reply.error.filter(|e| !e.trim().is_empty()) {
            return Err(EndpointError::Reported(error));
        }

        let response = reply.response.unwrap_or_default();
        if response.trim().is_empty() {
            return Err(EndpointError::EmptyCompletion);
        }

        Ok(Completion::new(response)
            .with_usage(reply.tokens.unwrap_or(0), reply.cost.unwrap_or(0.0)))
    }
}

#[async_trait]
impl CompletionGateway for HttpCompletionGateway {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> std::result::Result<Completion, GatewayError> {
        self.post(request).await.map_err(GatewayError::from)
    }
}
