//! Log summarization as a two-stage pipeline: a free-text summary of the raw
//! logs, then structured findings derived from that summary alone.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::devops::prompts::{LOG_SUMMARY_INSTRUCTION, RECOMMENDATIONS_INSTRUCTION, SRE_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::parser::{parse_result, recover, Parsed};
use crate::llm_client::pipeline::{Pipeline, Stage};
use crate::llm_client::prompt::PromptSpec;
use crate::llm_client::prompts::{STRUCTURED_OUTPUT_INSTRUCTION, UNAVAILABLE_PREFIX};
use crate::llm_client::schema::{FunctionSchema, ObjectSchema, SchemaError, SchemaNode};
use crate::llm_client::tokens::{estimate_tokens, tail_within};
use crate::llm_client::LlmClient;

/// Logs above this many estimated tokens are cut to their most recent lines.
const MAX_LOG_TOKENS: usize = 6000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recommendation {
    pub action: String,
    pub priority: String,
}

/// Shape of the second stage's structured reply.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LogFindings {
    severity: String,
    errors: Vec<String>,
    root_causes: Vec<String>,
    recommendations: Vec<Recommendation>,
    /// Free text the model sent instead of calling the function.
    #[serde(skip)]
    notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogSummary {
    pub service: Option<String>,
    pub summary: String,
    pub severity: String,
    pub errors: Vec<String>,
    pub root_causes: Vec<String>,
    pub recommendations: Vec<Recommendation>,
    /// Findings-stage reply when it came back as prose rather than structured data.
    pub notes: String,
    /// True when only the tail of the submitted logs was analyzed.
    pub truncated: bool,
}

pub fn findings_schema() -> Result<FunctionSchema, SchemaError> {
    let recommendation = ObjectSchema::new()
        .required("action", SchemaNode::string())
        .required("priority", SchemaNode::string_enum(&["high", "medium", "low"]))
        .build()?;
    let params = ObjectSchema::new()
        .required(
            "severity",
            SchemaNode::string_enum(&["critical", "high", "medium", "low"]),
        )
        .required("errors", SchemaNode::array_of(SchemaNode::string()))
        .property("rootCauses", SchemaNode::array_of(SchemaNode::string()))
        .required("recommendations", SchemaNode::array_of(recommendation))
        .build()?;
    FunctionSchema::new(
        "record_log_findings",
        "Record errors, root causes and remediation steps found in a log summary",
        params,
    )
}

/// Keeps the most recent whole lines that fit in `max_tokens`. When even the
/// newest line is too long, its tail is kept instead.
fn tail_lines(logs: &str, max_tokens: usize) -> (String, bool) {
    if estimate_tokens(logs) <= max_tokens {
        return (logs.to_string(), false);
    }
    let mut kept: Vec<&str> = Vec::new();
    let mut tokens = 0;
    for line in logs.lines().rev() {
        let cost = estimate_tokens(line) + 1;
        if tokens + cost > max_tokens {
            break;
        }
        tokens += cost;
        kept.push(line);
    }
    if kept.is_empty() {
        let newest = logs.lines().next_back().unwrap_or(logs);
        return (tail_within(newest, max_tokens).to_string(), true);
    }
    kept.reverse();
    (kept.join("\n"), true)
}

pub fn log_pipeline(logs: &str, service: Option<&str>, schema: FunctionSchema) -> Pipeline {
    let mut summarize = PromptSpec::new().system(SRE_SYSTEM);
    if let Some(service) = service {
        summarize = summarize.context(format!("Service: {service}"));
    }
    let summarize = summarize
        .instruction(LOG_SUMMARY_INSTRUCTION)
        .input(logs);

    let findings = PromptSpec::new().system(SRE_SYSTEM).instruction(format!(
        "{RECOMMENDATIONS_INSTRUCTION}\n{STRUCTURED_OUTPUT_INSTRUCTION}"
    ));

    Pipeline::new()
        .then(Stage::text("summarize", summarize))
        .then(Stage::structured("findings", findings, schema))
}

pub async fn summarize_logs(
    logs: &str,
    service: Option<&str>,
    llm: &LlmClient,
    cancel: &CancellationToken,
) -> Result<LogSummary, AppError> {
    let (logs, truncated) = tail_lines(logs, MAX_LOG_TOKENS);
    if truncated {
        warn!("Logs exceed {MAX_LOG_TOKENS} estimated tokens; analyzing the most recent lines");
    }

    let schema = findings_schema()?;
    let pipeline = log_pipeline(&logs, service, schema.clone());
    let outputs = llm.run_pipeline(&pipeline, cancel).await?;

    let summary = outputs
        .first()
        .map(|o| o.result.as_context().trim().to_string())
        .unwrap_or_default();
    let outcome = match outputs.get(1) {
        Some(stage) => parse_result::<LogFindings>(&stage.result, &schema),
        None => Ok(Parsed::Structured(LogFindings::default())),
    };
    let findings = recover(
        outcome,
        |text| {
            warn!("Findings stage answered in free text; returning it as notes");
            LogFindings {
                notes: text.trim().to_string(),
                ..Default::default()
            }
        },
        LogFindings::default,
    )?;

    let summary = if summary.is_empty() {
        format!("{UNAVAILABLE_PREFIX} a log summary.")
    } else {
        summary
    };
    info!(
        "Log summary: severity '{}', {} recommendations",
        findings.severity,
        findings.recommendations.len()
    );
    Ok(LogSummary {
        service: service.map(String::from),
        summary,
        severity: findings.severity,
        errors: findings.errors,
        root_causes: findings.root_causes,
        recommendations: findings.recommendations,
        notes: findings.notes,
        truncated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::request::Role;
    use crate::llm_client::stub::StubBackend;
    use crate::llm_client::test_client;
    use crate::llm_client::LlmError;
    use std::sync::Arc;

    const LOGS: &str = "2024-03-01T02:00:01Z ERROR db pool exhausted\n\
                        2024-03-01T02:00:02Z ERROR request timeout /api/orders";

    #[test]
    fn test_tail_lines_keeps_most_recent() {
        let (kept, truncated) = tail_lines("aaaaaaaa\nbbbb\ncccc", 4);
        assert!(truncated);
        assert_eq!(kept, "bbbb\ncccc");
        assert_eq!(tail_lines("short", 10), ("short".to_string(), false));
    }

    #[tokio::test]
    async fn test_findings_stage_sees_summary_not_raw_logs() {
        let stub = Arc::new(
            StubBackend::new()
                .reply_text("DB pool exhausted at 02:00, causing order timeouts.")
                .reply_call(
                    "record_log_findings",
                    r#"{"severity":"high","errors":["db pool exhausted"],
                        "recommendations":[{"action":"Raise pool size","priority":"high"}]}"#,
                ),
        );
        let llm = test_client(stub.clone());
        let summary = summarize_logs(LOGS, Some("orders"), &llm, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.service.as_deref(), Some("orders"));
        assert_eq!(summary.summary, "DB pool exhausted at 02:00, causing order timeouts.");
        assert_eq!(summary.severity, "high");
        assert!(summary.root_causes.is_empty());
        assert_eq!(
            summary.recommendations,
            vec![Recommendation {
                action: "Raise pool size".into(),
                priority: "high".into(),
            }]
        );

        let requests = stub.requests();
        assert_eq!(requests.len(), 2);
        let user = |i: usize| {
            requests[i]
                .messages()
                .iter()
                .find(|m| m.role == Role::User)
                .map(|m| m.content.clone())
                .unwrap()
        };
        assert!(user(0).starts_with("Service: orders"));
        assert!(user(0).contains("request timeout"));
        assert!(user(1).starts_with("DB pool exhausted at 02:00"));
        assert!(!user(1).contains("request timeout /api/orders"));
    }

    #[test]
    fn test_single_oversized_line_keeps_its_tail() {
        let line = format!("ERROR {}", "x".repeat(60));
        let (kept, truncated) = tail_lines(&line, 10);
        assert!(truncated);
        assert_eq!(kept, "x".repeat(40));
    }

    #[tokio::test]
    async fn test_unbroken_log_blob_still_reaches_the_model() {
        let blob = format!("ERROR {}", "x".repeat(30_000));
        let stub = Arc::new(StubBackend::new().reply_text("One long error payload."));
        let llm = test_client(stub.clone());
        let summary = summarize_logs(&blob, None, &llm, &CancellationToken::new())
            .await
            .unwrap();
        assert!(summary.truncated);

        let requests = stub.requests();
        let body = &requests[0]
            .messages()
            .iter()
            .find(|m| m.role == Role::User)
            .unwrap()
            .content;
        assert!(body.ends_with(&"x".repeat(MAX_LOG_TOKENS * 4)));
    }

    #[tokio::test]
    async fn test_prose_findings_are_kept_as_notes() {
        let stub = Arc::new(
            StubBackend::new()
                .reply_text("Pool exhaustion at 02:00.")
                .reply_text(" Raise the pool size and add a timeout alert. "),
        );
        let llm = test_client(stub);
        let summary = summarize_logs(LOGS, None, &llm, &CancellationToken::new())
            .await
            .unwrap();
        assert!(summary.recommendations.is_empty());
        assert_eq!(summary.notes, "Raise the pool size and add a timeout alert.");
    }

    #[tokio::test]
    async fn test_failed_summary_stage_skips_findings() {
        let stub = Arc::new(StubBackend::new().fail(500, "upstream down"));
        let llm = test_client(stub.clone());
        let err = summarize_logs(LOGS, None, &llm, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
        assert_eq!(stub.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_run_maps_to_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let llm = test_client(Arc::new(StubBackend::new()));
        let err = summarize_logs(LOGS, None, &llm, &cancel).await.unwrap_err();
        assert!(matches!(err, AppError::Cancelled));
        assert!(matches!(AppError::from(LlmError::Cancelled), AppError::Cancelled));
    }
}
