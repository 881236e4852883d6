//! Completion result and the backend's response wire shape.

use serde::Deserialize;

/// One model reply: either free text or a structured function call, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionResult {
    Text(String),
    FunctionCall {
        name: String,
        /// Raw JSON-encoded arguments; needs a second parse step.
        arguments: String,
    },
}

impl CompletionResult {
    pub fn text_content(&self) -> Option<&str> {
        match self {
            CompletionResult::Text(text) => Some(text),
            CompletionResult::FunctionCall { .. } => None,
        }
    }

    pub fn function_call_name(&self) -> Option<&str> {
        match self {
            CompletionResult::FunctionCall { name, .. } => Some(name),
            CompletionResult::Text(_) => None,
        }
    }

    pub fn function_call_arguments(&self) -> Option<&str> {
        match self {
            CompletionResult::FunctionCall { arguments, .. } => Some(arguments),
            CompletionResult::Text(_) => None,
        }
    }

    /// The text a follow-up stage receives as context: the reply text, or the raw arguments.
    pub fn as_context(&self) -> &str {
        match self {
            CompletionResult::Text(text) => text,
            CompletionResult::FunctionCall { arguments, .. } => arguments,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
    pub function_call: Option<WireFunctionCall>,
}

#[derive(Debug, Deserialize)]
pub struct WireFunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl ChatCompletionResponse {
    /// Reads `choices[0].message`. A function call wins over content; a reply with
    /// neither is an empty text result.
    pub fn into_result(self) -> CompletionResult {
        let Some(choice) = self.choices.into_iter().next() else {
            return CompletionResult::Text(String::new());
        };
        match choice.message.function_call {
            Some(call) => CompletionResult::FunctionCall {
                name: call.name,
                arguments: call.arguments,
            },
            None => CompletionResult::Text(choice.message.content.unwrap_or_default()),
        }
    }
}

/// Error body returned by the backend on non-success statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> CompletionResult {
        serde_json::from_str::<ChatCompletionResponse>(json)
            .unwrap()
            .into_result()
    }

    #[test]
    fn test_text_reply() {
        let result = parse(
            r#"{"choices":[{"message":{"role":"assistant","content":"Hello"},"finish_reason":"stop"}],
                "usage":{"prompt_tokens":5,"completion_tokens":1,"total_tokens":6}}"#,
        );
        assert_eq!(result, CompletionResult::Text("Hello".into()));
        assert_eq!(result.text_content(), Some("Hello"));
        assert!(result.function_call_arguments().is_none());
    }

    #[test]
    fn test_function_call_reply() {
        let result = parse(
            r#"{"choices":[{"message":{"role":"assistant","content":null,
                "function_call":{"name":"analyze","arguments":"{\"summary\":\"ok\"}"}},
                "finish_reason":"function_call"}]}"#,
        );
        assert_eq!(result.function_call_name(), Some("analyze"));
        assert_eq!(result.function_call_arguments(), Some(r#"{"summary":"ok"}"#));
        assert!(result.text_content().is_none());
        assert_eq!(result.as_context(), r#"{"summary":"ok"}"#);
    }

    #[test]
    fn test_empty_reply_is_empty_text() {
        assert_eq!(
            parse(r#"{"choices":[{"message":{"role":"assistant"}}]}"#),
            CompletionResult::Text(String::new())
        );
        assert_eq!(parse(r#"{"choices":[]}"#), CompletionResult::Text(String::new()));
    }

    #[test]
    fn test_error_envelope_parses() {
        let envelope: ErrorEnvelope =
            serde_json::from_str(r#"{"error":{"message":"Invalid API key","type":"auth"}}"#)
                .unwrap();
        assert_eq!(envelope.error.message, "Invalid API key");
    }
}
