//! Completion request: the validated, serializable body of one chat completion call.

use serde::{Serialize, Serializer};

use crate::llm_client::schema::FunctionSchema;
use crate::llm_client::LlmError;

pub const MIN_TEMPERATURE: f32 = 0.0;
pub const MAX_TEMPERATURE: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// How the model may use the declared functions.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionCall {
    /// The model decides between free text and a call.
    Auto,
    None,
    /// Force a call to the named function.
    Named(String),
}

impl Serialize for FunctionCall {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FunctionCall::Auto => serializer.serialize_str("auto"),
            FunctionCall::None => serializer.serialize_str("none"),
            FunctionCall::Named(name) => {
                use serde::ser::SerializeMap;
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("name", name)?;
                map.end()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: Option<u32>,
    functions: Vec<FunctionSchema>,
    function_call: Option<FunctionCall>,
}

impl CompletionRequest {
    /// Fails fast on an empty model, no messages, or a temperature outside [0, 2].
    /// The temperature is never clamped here.
    pub fn new(
        model: impl Into<String>,
        messages: Vec<ChatMessage>,
        temperature: f32,
    ) -> Result<Self, LlmError> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(LlmError::InvalidRequest("model cannot be empty".into()));
        }
        if messages.is_empty() {
            return Err(LlmError::InvalidRequest(
                "a completion needs at least one message".into(),
            ));
        }
        if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&temperature) {
            return Err(LlmError::InvalidRequest(format!(
                "temperature {temperature} is outside [{MIN_TEMPERATURE}, {MAX_TEMPERATURE}]"
            )));
        }
        Ok(Self {
            model,
            messages,
            temperature,
            max_tokens: None,
            functions: Vec::new(),
            function_call: None,
        })
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Result<Self, LlmError> {
        if max_tokens == 0 {
            return Err(LlmError::InvalidRequest(
                "max_tokens must be positive".into(),
            ));
        }
        self.max_tokens = Some(max_tokens);
        Ok(self)
    }

    pub fn with_functions(mut self, functions: Vec<FunctionSchema>) -> Self {
        self.functions = functions;
        self
    }

    pub fn with_function_call(mut self, function_call: FunctionCall) -> Self {
        self.function_call = Some(function_call);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_tokens(&self) -> Option<u32> {
        self.max_tokens
    }

    pub fn functions(&self) -> &[FunctionSchema] {
        &self.functions
    }

    pub fn function_call(&self) -> Option<&FunctionCall> {
        self.function_call.as_ref()
    }

    /// Total characters across all messages; feeds the token estimate in logs.
    pub fn prompt_chars(&self) -> usize {
        self.messages.iter().map(|m| m.content.chars().count()).sum()
    }
}

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    functions: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<&'a FunctionCall>,
}

impl Serialize for CompletionRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireRequest {
            model: &self.model,
            messages: &self.messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            functions: self.functions.iter().map(FunctionSchema::to_json).collect(),
            // function_call is meaningless without functions
            function_call: if self.functions.is_empty() {
                None
            } else {
                self.function_call.as_ref()
            },
        }
        .serialize(serializer)
    }
}
