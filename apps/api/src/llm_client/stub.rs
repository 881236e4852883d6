//! Test backend: replays scripted results in order and records every request.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::llm_client::backend::CompletionBackend;
use crate::llm_client::request::CompletionRequest;
use crate::llm_client::response::CompletionResult;
use crate::llm_client::LlmError;

#[derive(Default)]
pub struct StubBackend {
    replies: Mutex<VecDeque<Result<CompletionResult, LlmError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(self, reply: Result<CompletionResult, LlmError>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn reply_text(self, text: &str) -> Self {
        self.push(Ok(CompletionResult::Text(text.to_string())))
    }

    pub fn reply_call(self, name: &str, arguments: &str) -> Self {
        self.push(Ok(CompletionResult::FunctionCall {
            name: name.to_string(),
            arguments: arguments.to_string(),
        }))
    }

    pub fn fail(self, status: u16, message: &str) -> Self {
        self.push(Err(LlmError::RequestFailed {
            status: Some(status),
            message: message.to_string(),
        }))
    }

    pub fn cancelled(self) -> Self {
        self.push(Err(LlmError::Cancelled))
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for StubBackend {
    async fn complete(
        &self,
        request: &CompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<CompletionResult, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        if cancel.is_cancelled() {
            return Err(LlmError::Cancelled);
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(CompletionResult::Text(String::new())))
    }
}
