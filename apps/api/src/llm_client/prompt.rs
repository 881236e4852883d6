//! Prompt Builder: renders a `PromptSpec` into the text (or role-tagged messages)
//! sent to the completion backend.
//!
//! Block order is fixed: system → context → examples → instruction → input.
//! Omitted fields contribute no text and no separators.

use crate::llm_client::request::{ChatMessage, Role};

const SYSTEM_HEADER: &str = "System:";
const EXAMPLES_HEADER: &str = "Examples:";
const BLOCK_SEPARATOR: &str = "\n\n";

/// Everything a prompt can carry. No field is required.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptSpec {
    pub system_message: Option<String>,
    pub context_blocks: Vec<String>,
    /// Few-shot (input, output) pairs, rendered in supply order.
    pub examples: Vec<(String, String)>,
    pub instruction: Option<String>,
    pub user_input: Option<String>,
}

impl PromptSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn system(mut self, message: impl Into<String>) -> Self {
        self.system_message = Some(message.into());
        self
    }

    pub fn context(mut self, block: impl Into<String>) -> Self {
        self.context_blocks.push(block.into());
        self
    }

    pub fn example(mut self, input: impl Into<String>, output: impl Into<String>) -> Self {
        self.examples.push((input.into(), output.into()));
        self
    }

    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(instruction.into());
        self
    }

    pub fn input(mut self, input: impl Into<String>) -> Self {
        self.user_input = Some(input.into());
        self
    }

    /// Renders the whole spec as one string, system header included.
    pub fn render(&self) -> String {
        let mut blocks = Vec::new();
        if let Some(system) = non_blank(&self.system_message) {
            blocks.push(format!("{SYSTEM_HEADER}\n{system}"));
        }
        blocks.extend(self.body_blocks());
        blocks.join(BLOCK_SEPARATOR)
    }

    /// Role-tagged form: the system message becomes a `system` message and the rest
    /// of the spec is rendered into a single `user` message. Empty parts are dropped.
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = non_blank(&self.system_message) {
            messages.push(ChatMessage::new(Role::System, system));
        }
        let body = self.body_blocks().join(BLOCK_SEPARATOR);
        if !body.is_empty() {
            messages.push(ChatMessage::new(Role::User, body));
        }
        messages
    }

    /// Everything after the system message, one entry per rendered block.
    fn body_blocks(&self) -> Vec<String> {
        let mut blocks: Vec<String> = self
            .context_blocks
            .iter()
            .map(|b| b.trim())
            .filter(|b| !b.is_empty())
            .map(String::from)
            .collect();

        if !self.examples.is_empty() {
            let rendered = self
                .examples
                .iter()
                .map(|(input, output)| format!("Input: {}\nOutput: {}", input.trim(), output.trim()))
                .collect::<Vec<_>>()
                .join(BLOCK_SEPARATOR);
            blocks.push(format!("{EXAMPLES_HEADER}\n{rendered}"));
        }

        if let Some(instruction) = non_blank(&self.instruction) {
            blocks.push(instruction.to_string());
        }
        // Input goes out verbatim: leading indentation matters for code.
        if let Some(input) = self.user_input.as_deref().filter(|s| !s.trim().is_empty()) {
            blocks.push(input.to_string());
        }
        blocks
    }
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review_spec() -> PromptSpec {
        PromptSpec::new()
            .system("You are an expert reviewer.")
            .instruction("Review this code.")
            .input("int x=1;")
    }

    #[test]
    fn test_empty_spec_renders_empty_string() {
        assert_eq!(PromptSpec::new().render(), "");
        assert!(PromptSpec::new().to_messages().is_empty());
    }

    #[test]
    fn test_render_orders_system_instruction_input() {
        let rendered = review_spec().render();
        let system = rendered.find("You are an expert reviewer.").unwrap();
        let instruction = rendered.find("Review this code.").unwrap();
        let input = rendered.find("int x=1;").unwrap();
        assert!(system < instruction && instruction < input);
        assert_eq!(
            rendered,
            "System:\nYou are an expert reviewer.\n\nReview this code.\n\nint x=1;"
        );
    }

    #[test]
    fn test_render_is_idempotent() {
        let spec = review_spec()
            .context("Repository: billing")
            .example("a", "b");
        assert_eq!(spec.render(), spec.render());
    }

    #[test]
    fn test_no_examples_header_without_examples() {
        let rendered = review_spec().context("some context").render();
        assert!(!rendered.contains("Example"));
    }

    #[test]
    fn test_context_blocks_joined_by_blank_line() {
        let rendered = PromptSpec::new().context("first").context("second").render();
        assert_eq!(rendered, "first\n\nsecond");
    }

    #[test]
    fn test_blank_fields_leave_no_stray_separators() {
        let spec = PromptSpec::new()
            .system("  ")
            .context("")
            .instruction("Only this");
        assert_eq!(spec.render(), "Only this");
    }

    #[test]
    fn test_input_keeps_its_indentation() {
        let code = "    fn main() {\n        run();\n    }\n";
        let rendered = PromptSpec::new().instruction("Review this code.").input(code).render();
        assert_eq!(rendered, format!("Review this code.\n\n{code}"));
        assert_eq!(PromptSpec::new().input(" \n ").render(), "");
    }

    #[test]
    fn test_examples_render_in_supply_order() {
        let rendered = PromptSpec::new()
            .example("2+2", "4")
            .example("3+3", "6")
            .instruction("Continue the pattern.")
            .render();
        assert_eq!(
            rendered,
            "Examples:\nInput: 2+2\nOutput: 4\n\nInput: 3+3\nOutput: 6\n\nContinue the pattern."
        );
    }

    #[test]
    fn test_to_messages_splits_system_from_body() {
        let messages = review_spec().to_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, "You are an expert reviewer.");
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "Review this code.\n\nint x=1;");
    }

    #[test]
    fn test_to_messages_system_only() {
        let messages = PromptSpec::new().system("Be brief.").to_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::System);
    }
}
