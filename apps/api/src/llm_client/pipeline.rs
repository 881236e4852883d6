//! Staged workflows: an ordered list of prompt stages run strictly in sequence,
//! each stage's output appended as the next stage's last context block.

use crate::llm_client::prompt::PromptSpec;
use crate::llm_client::response::CompletionResult;
use crate::llm_client::schema::FunctionSchema;

#[derive(Debug, Clone)]
pub struct Stage {
    pub label: String,
    pub prompt: PromptSpec,
    /// When set, the stage asks for a structured call against this schema.
    pub schema: Option<FunctionSchema>,
}

impl Stage {
    pub fn text(label: impl Into<String>, prompt: PromptSpec) -> Self {
        Self {
            label: label.into(),
            prompt,
            schema: None,
        }
    }

    pub fn structured(label: impl Into<String>, prompt: PromptSpec, schema: FunctionSchema) -> Self {
        Self {
            label: label.into(),
            prompt,
            schema: Some(schema),
        }
    }

    /// The prompt actually sent, given the previous stage's output.
    pub fn prompt_with(&self, previous: Option<&CompletionResult>) -> PromptSpec {
        match previous {
            Some(result) => self.prompt.clone().context(result.as_context()),
            None => self.prompt.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageOutput {
    pub label: String,
    pub result: CompletionResult,
}
