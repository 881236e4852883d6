//! Completion Invoker: one request in, one network round trip, one result out.
//!
//! No retries happen here. Cancellation abandons the in-flight call.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::llm_client::request::CompletionRequest;
use crate::llm_client::response::{ChatCompletionResponse, CompletionResult, ErrorEnvelope};
use crate::llm_client::tokens::{estimate_cost_usd, estimate_tokens_for_chars};
use crate::llm_client::LlmError;

/// A text-generation backend. `AppState` carries one as `Arc<dyn CompletionBackend>`.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(
        &self,
        request: &CompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<CompletionResult, LlmError>;
}

/// OpenAI-compatible chat completions backend.
#[derive(Clone)]
pub struct OpenAiBackend {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl OpenAiBackend {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
        })
    }

    async fn send(&self, request: &CompletionRequest) -> Result<CompletionResult, LlmError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Completion backend returned {}: {}", status, body);
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::RequestFailed {
                status: Some(status.as_u16()),
                message,
            });
        }

        let body: ChatCompletionResponse = response.json().await?;
        if let Some(usage) = body.usage {
            debug!(
                "Completion succeeded: prompt_tokens={}, completion_tokens={}, total_tokens={}, est_cost_usd={:?}",
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens,
                estimate_cost_usd(request.model(), usage.prompt_tokens, usage.completion_tokens)
            );
        }
        if let Some(reason) = body.choices.first().and_then(|c| c.finish_reason.as_deref()) {
            debug!("finish_reason={reason}");
        }
        Ok(body.into_result())
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(
        &self,
        request: &CompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<CompletionResult, LlmError> {
        if cancel.is_cancelled() {
            return Err(LlmError::Cancelled);
        }
        debug!(
            "Sending completion: model={}, messages={}, functions={}, est_prompt_tokens={}",
            request.model(),
            request.messages().len(),
            request.functions().len(),
            estimate_tokens_for_chars(request.prompt_chars())
        );
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LlmError::Cancelled),
            result = self.send(request) => result,
        }
    }
}
