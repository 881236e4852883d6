//! Code analysis: one structured completion over a code snippet.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::code_review::prompts::{CODE_REVIEW_INSTRUCTION, CODE_REVIEW_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::parser::recover;
use crate::llm_client::prompt::PromptSpec;
use crate::llm_client::prompts::{STRUCTURED_OUTPUT_INSTRUCTION, UNAVAILABLE_PREFIX};
use crate::llm_client::schema::{FunctionSchema, ObjectSchema, SchemaError, SchemaNode};
use crate::llm_client::LlmClient;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeIssue {
    pub severity: String,
    /// 1-based; 0 when the model could not pin it to a line.
    /// Signed so a `-1` "unknown" reply still deserializes; negatives become 0.
    pub line: i64,
    pub description: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeAnalysis {
    pub summary: String,
    pub issues: Vec<CodeIssue>,
    /// 0–10.
    pub quality_score: f64,
}

impl CodeAnalysis {
    pub fn unavailable() -> Self {
        Self {
            summary: format!("{UNAVAILABLE_PREFIX} a code analysis for this snippet."),
            ..Default::default()
        }
    }
}

pub fn code_analysis_schema() -> Result<FunctionSchema, SchemaError> {
    let issue = ObjectSchema::new()
        .required(
            "severity",
            SchemaNode::string_enum(&["critical", "high", "medium", "low"]),
        )
        .property("line", SchemaNode::integer())
        .required("description", SchemaNode::string())
        .property("suggestion", SchemaNode::string())
        .build()?;
    let params = ObjectSchema::new()
        .required("summary", SchemaNode::string())
        .required("issues", SchemaNode::array_of(issue))
        .property(
            "qualityScore",
            SchemaNode::number().describe("Overall quality from 0 to 10"),
        )
        .build()?;
    FunctionSchema::new("report_code_analysis", "Report the findings of a code review", params)
}

pub async fn analyze_code(
    code: &str,
    context: Option<&str>,
    llm: &LlmClient,
    cancel: &CancellationToken,
) -> Result<CodeAnalysis, AppError> {
    let schema = code_analysis_schema()?;
    let mut spec = PromptSpec::new().system(CODE_REVIEW_SYSTEM);
    if let Some(context) = context {
        spec = spec.context(format!("Context: {context}"));
    }
    let spec = spec
        .instruction(format!("{CODE_REVIEW_INSTRUCTION}\n{STRUCTURED_OUTPUT_INSTRUCTION}"))
        .input(code);

    let outcome = llm.complete_structured(&spec, &schema, cancel).await;
    let mut analysis = recover(
        outcome,
        |text| CodeAnalysis {
            summary: text,
            ..Default::default()
        },
        CodeAnalysis::unavailable,
    )?;
    analysis.quality_score = analysis.quality_score.clamp(0.0, 10.0);
    for issue in &mut analysis.issues {
        issue.line = issue.line.max(0);
    }

    info!(
        "Code analysis complete: {} issues, score {:.1}",
        analysis.issues.len(),
        analysis.quality_score
    );
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::stub::StubBackend;
    use crate::llm_client::test_client;
    use std::sync::Arc;

    const SNIPPET: &str = "public User GetUser(int id) { return _users.First(u => u.Id == id); }";

    #[tokio::test]
    async fn test_analyze_code_exact_dto() {
        let stub = Arc::new(StubBackend::new().reply_call(
            "report_code_analysis",
            r#"{"summary":"Throws on missing user","qualityScore":6,
                "issues":[{"severity":"high","line":1,
                "description":"First() throws when no match",
                "suggestion":"Use FirstOrDefault and handle null"}]}"#,
        ));
        let llm = test_client(stub);
        let analysis = analyze_code(SNIPPET, None, &llm, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            analysis,
            CodeAnalysis {
                summary: "Throws on missing user".into(),
                issues: vec![CodeIssue {
                    severity: "high".into(),
                    line: 1,
                    description: "First() throws when no match".into(),
                    suggestion: "Use FirstOrDefault and handle null".into(),
                }],
                quality_score: 6.0,
            }
        );
    }

    #[tokio::test]
    async fn test_negative_line_keeps_the_rest_of_the_analysis() {
        let stub = Arc::new(StubBackend::new().reply_call(
            "report_code_analysis",
            r#"{"summary":"Throws on missing user","qualityScore":6,
                "issues":[{"severity":"high","line":-1,
                "description":"First() throws when no match"}]}"#,
        ));
        let llm = test_client(stub);
        let analysis = analyze_code(SNIPPET, None, &llm, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(analysis.summary, "Throws on missing user");
        assert_eq!(analysis.quality_score, 6.0);
        assert_eq!(
            analysis.issues,
            vec![CodeIssue {
                severity: "high".into(),
                line: 0,
                description: "First() throws when no match".into(),
                suggestion: String::new(),
            }]
        );
    }

    #[tokio::test]
    async fn test_out_of_range_score_is_clamped() {
        let stub = Arc::new(
            StubBackend::new().reply_call("report_code_analysis", r#"{"qualityScore":42}"#),
        );
        let llm = test_client(stub);
        let analysis = analyze_code(SNIPPET, None, &llm, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(analysis.quality_score, 10.0);
        assert!(analysis.issues.is_empty());
    }

    #[tokio::test]
    async fn test_context_is_rendered_before_code() {
        let stub = Arc::new(StubBackend::new());
        let llm = test_client(stub.clone());
        analyze_code(SNIPPET, Some("User service"), &llm, &CancellationToken::new())
            .await
            .unwrap();
        let requests = stub.requests();
        let body = &requests[0].messages()[1].content;
        assert!(body.starts_with("Context: User service"));
        assert!(body.ends_with(SNIPPET));
    }

    #[tokio::test]
    async fn test_cancelled_analysis_propagates() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let llm = test_client(Arc::new(StubBackend::new()));
        let err = analyze_code(SNIPPET, None, &llm, &cancel).await.unwrap_err();
        assert!(matches!(err, AppError::Cancelled));
    }
}
