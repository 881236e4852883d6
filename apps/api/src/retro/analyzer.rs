//! Retrospective analysis over a list of free-text comments.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::parser::recover;
use crate::llm_client::prompt::PromptSpec;
use crate::llm_client::prompts::{STRUCTURED_OUTPUT_INSTRUCTION, UNAVAILABLE_PREFIX};
use crate::llm_client::schema::{FunctionSchema, ObjectSchema, SchemaError, SchemaNode};
use crate::llm_client::LlmClient;
use crate::retro::prompts::{RETRO_INSTRUCTION, RETRO_SYSTEM};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionItem {
    pub description: String,
    pub owner: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetroAnalysis {
    pub summary: String,
    pub themes: Vec<String>,
    pub positives: Vec<String>,
    pub improvements: Vec<String>,
    pub action_items: Vec<ActionItem>,
}

impl RetroAnalysis {
    pub fn unavailable() -> Self {
        Self {
            summary: format!("{UNAVAILABLE_PREFIX} a retrospective analysis."),
            ..Default::default()
        }
    }
}

pub fn retro_schema() -> Result<FunctionSchema, SchemaError> {
    let action_item = ObjectSchema::new()
        .required("description", SchemaNode::string())
        .property("owner", SchemaNode::string())
        .build()?;
    let strings = || SchemaNode::array_of(SchemaNode::string());
    let params = ObjectSchema::new()
        .required("summary", SchemaNode::string())
        .required("themes", strings())
        .property("positives", strings())
        .property("improvements", strings())
        .required("actionItems", SchemaNode::array_of(action_item))
        .build()?;
    FunctionSchema::new(
        "record_retrospective",
        "Record the analysis of a sprint retrospective",
        params,
    )
}

/// Renders comments as a numbered list so the model can refer back to them.
fn format_comments(comments: &[String]) -> String {
    comments
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .enumerate()
        .map(|(i, c)| format!("{}. {c}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn analyze_retrospective(
    comments: &[String],
    llm: &LlmClient,
    cancel: &CancellationToken,
) -> Result<RetroAnalysis, AppError> {
    let formatted = format_comments(comments);
    if formatted.is_empty() {
        return Err(AppError::Validation(
            "comments must contain at least one non-empty comment".to_string(),
        ));
    }

    let schema = retro_schema()?;
    let spec = PromptSpec::new()
        .system(RETRO_SYSTEM)
        .context(format!("Retrospective comments:\n{formatted}"))
        .instruction(format!("{RETRO_INSTRUCTION}\n{STRUCTURED_OUTPUT_INSTRUCTION}"));

    let outcome = llm.complete_structured(&spec, &schema, cancel).await;
    let analysis = recover(
        outcome,
        |text| RetroAnalysis {
            summary: text,
            ..Default::default()
        },
        RetroAnalysis::unavailable,
    )?;
    info!(
        "Retro analyzed: {} themes, {} action items",
        analysis.themes.len(),
        analysis.action_items.len()
    );
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::stub::StubBackend;
    use crate::llm_client::test_client;
    use std::sync::Arc;

    fn comments() -> Vec<String> {
        vec![
            "We need better documentation".to_string(),
            "  ".to_string(),
            "Deployments are taking too long".to_string(),
        ]
    }

    #[test]
    fn test_format_comments_skips_blank_and_numbers() {
        assert_eq!(
            format_comments(&comments()),
            "1. We need better documentation\n2. Deployments are taking too long"
        );
    }

    #[tokio::test]
    async fn test_action_item_owner_defaults_to_empty() {
        let stub = Arc::new(StubBackend::new().reply_call(
            "record_retrospective",
            r#"{"actionItems":[{"description":"Fix bug"}]}"#,
        ));
        let llm = test_client(stub);
        let analysis = analyze_retrospective(&comments(), &llm, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            analysis.action_items,
            vec![ActionItem {
                description: "Fix bug".into(),
                owner: String::new(),
            }]
        );
        assert!(analysis.themes.is_empty());
        assert_eq!(analysis.summary, "");
    }

    #[tokio::test]
    async fn test_malformed_reply_returns_placeholder() {
        let stub = Arc::new(StubBackend::new().reply_call("record_retrospective", "{not valid json"));
        let llm = test_client(stub);
        let analysis = analyze_retrospective(&comments(), &llm, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(analysis, RetroAnalysis::unavailable());
    }

    #[tokio::test]
    async fn test_blank_comments_are_rejected_without_a_call() {
        let stub = Arc::new(StubBackend::new());
        let llm = test_client(stub.clone());
        let err = analyze_retrospective(&["".to_string()], &llm, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(stub.requests().is_empty());
    }
}
