/// LLM Client: the single point of entry for every completion call in the service.
///
/// ARCHITECTURAL RULE: assistant modules never talk to a backend directly.
/// They build a `PromptSpec` (and optionally a `FunctionSchema`) and go through
/// `LlmClient`, which owns request construction, invocation, and parsing.
use std::sync::Arc;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub mod backend;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod prompts;
pub mod request;
pub mod response;
pub mod schema;
#[cfg(test)]
pub mod stub;
pub mod tokens;

use backend::CompletionBackend;
use parser::{parse_result, Parsed};
use pipeline::{Pipeline, StageOutput};
use prompt::PromptSpec;
use request::{CompletionRequest, FunctionCall};
use response::CompletionResult;
use schema::{FunctionSchema, SchemaError};

#[derive(Debug, Error)]
pub enum LlmError {
    /// Transport error, timeout, or non-success status. Not retried.
    #[error("completion request failed (status {status:?}): {message}")]
    RequestFailed { status: Option<u16>, message: String },

    /// Function-call arguments were not valid JSON (or did not fit the target shape).
    #[error("could not parse structured reply: {reason}")]
    ParseFailed { raw: String, reason: String },

    #[error("completion cancelled")]
    Cancelled,

    #[error("invalid completion request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(error: reqwest::Error) -> Self {
        LlmError::RequestFailed {
            status: error.status().map(|s| s.as_u16()),
            message: error.to_string(),
        }
    }
}

impl From<SchemaError> for LlmError {
    fn from(error: SchemaError) -> Self {
        LlmError::InvalidRequest(error.to_string())
    }
}

/// Model parameters applied to every request built by `LlmClient`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

/// The completion client shared by every assistant module.
#[derive(Clone)]
pub struct LlmClient {
    backend: Arc<dyn CompletionBackend>,
    settings: ModelSettings,
}

impl LlmClient {
    pub fn new(backend: Arc<dyn CompletionBackend>, settings: ModelSettings) -> Self {
        Self { backend, settings }
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Builds the request for `spec`, forcing a call to `schema` when one is given.
    pub fn request_for(
        &self,
        spec: &PromptSpec,
        schema: Option<&FunctionSchema>,
    ) -> Result<CompletionRequest, LlmError> {
        let mut request = CompletionRequest::new(
            self.settings.model.clone(),
            spec.to_messages(),
            self.settings.temperature,
        )?;
        if let Some(max_tokens) = self.settings.max_tokens {
            request = request.with_max_tokens(max_tokens)?;
        }
        if let Some(schema) = schema {
            request = request
                .with_functions(vec![schema.clone()])
                .with_function_call(FunctionCall::Named(schema.name().to_string()));
        }
        Ok(request)
    }

    /// One free-text completion.
    pub async fn complete_text(
        &self,
        spec: &PromptSpec,
        cancel: &CancellationToken,
    ) -> Result<String, LlmError> {
        let request = self.request_for(spec, None)?;
        let result = self.backend.complete(&request, cancel).await?;
        Ok(result.as_context().to_string())
    }

    /// One structured completion, parsed against `schema` into `T`.
    pub async fn complete_structured<T: DeserializeOwned>(
        &self,
        spec: &PromptSpec,
        schema: &FunctionSchema,
        cancel: &CancellationToken,
    ) -> Result<Parsed<T>, LlmError> {
        let request = self.request_for(spec, Some(schema))?;
        let result = self.backend.complete(&request, cancel).await?;
        parse_result(&result, schema)
    }

    /// Runs every stage in order. The first failure stops the run.
    pub async fn run_pipeline(
        &self,
        pipeline: &Pipeline,
        cancel: &CancellationToken,
    ) -> Result<Vec<StageOutput>, LlmError> {
        let mut outputs: Vec<StageOutput> = Vec::with_capacity(pipeline.len());
        for (index, stage) in pipeline.stages().iter().enumerate() {
            let previous: Option<&CompletionResult> = outputs.last().map(|o| &o.result);
            let prompt = stage.prompt_with(previous);
            let request = self.request_for(&prompt, stage.schema.as_ref())?;

            info!(
                "Pipeline stage {}/{} '{}'",
                index + 1,
                pipeline.len(),
                stage.label
            );
            let result = self.backend.complete(&request, cancel).await?;
            outputs.push(StageOutput {
                label: stage.label.clone(),
                result,
            });
        }
        Ok(outputs)
    }
}

#[cfg(test)]
pub(crate) fn test_client(backend: Arc<stub::StubBackend>) -> LlmClient {
    LlmClient::new(
        backend,
        ModelSettings {
            model: "gpt-4-turbo-preview".into(),
            temperature: 0.7,
            max_tokens: Some(500),
        },
    )
}
