//! PDF manuscript review.
//!
//! Flow: extract text → chunk → running summary, one stage per chunk →
//! senior agent structured review over the final summary.
//! Stages run strictly in sequence; each summary feeds the next stage.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::parser::{parse_result, recover, Parsed};
use crate::llm_client::pipeline::{Pipeline, Stage, StageOutput};
use crate::llm_client::prompt::PromptSpec;
use crate::llm_client::prompts::{STRUCTURED_OUTPUT_INSTRUCTION, UNAVAILABLE_PREFIX};
use crate::llm_client::schema::{FunctionSchema, ObjectSchema, SchemaError, SchemaNode};
use crate::llm_client::tokens::{chunk_text, estimate_tokens};
use crate::llm_client::LlmClient;
use crate::publishing::book_review::clamp_rating;
use crate::publishing::prompts::{
    CHUNK_SUMMARY_INSTRUCTION, CHUNK_SUMMARY_SYSTEM, EDITOR_SYSTEM, MANUSCRIPT_REVIEW_INSTRUCTION,
};

/// Estimated tokens per manuscript chunk.
const CHUNK_TOKENS: usize = 3000;
/// Chunks beyond this are not summarized.
const MAX_CHUNKS: usize = 12;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentReview {
    pub overall_assessment: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub market_potential: String,
    pub rating: f64,
    /// "request" | "revise" | "pass"
    pub recommendation: String,
}

impl AgentReview {
    pub fn unavailable() -> Self {
        Self {
            overall_assessment: format!("{UNAVAILABLE_PREFIX} a manuscript review."),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManuscriptReview {
    pub document_id: Uuid,
    pub genre: Option<String>,
    pub chunk_count: usize,
    /// True when the manuscript had more chunks than were summarized.
    pub truncated: bool,
    pub estimated_tokens_used: usize,
    pub review: AgentReview,
}

pub fn agent_review_schema() -> Result<FunctionSchema, SchemaError> {
    let strings = || SchemaNode::array_of(SchemaNode::string());
    let params = ObjectSchema::new()
        .required("overallAssessment", SchemaNode::string())
        .required("strengths", strings())
        .required("weaknesses", strings())
        .property("marketPotential", SchemaNode::string())
        .required("rating", SchemaNode::number().describe("1 (poor) to 5 (outstanding)"))
        .required(
            "recommendation",
            SchemaNode::string_enum(&["request", "revise", "pass"]),
        )
        .build()?;
    FunctionSchema::new(
        "record_manuscript_review",
        "Record a literary agent's review of a manuscript",
        params,
    )
}

/// One summary stage per chunk, then the structured review stage.
pub fn review_pipeline(chunks: &[String], genre: Option<&str>, schema: FunctionSchema) -> Pipeline {
    let mut pipeline = Pipeline::new();
    for (i, chunk) in chunks.iter().enumerate() {
        let prompt = PromptSpec::new()
            .system(CHUNK_SUMMARY_SYSTEM)
            .instruction(CHUNK_SUMMARY_INSTRUCTION)
            .input(format!("Section {} of {}:\n{chunk}", i + 1, chunks.len()));
        pipeline = pipeline.then(Stage::text(format!("summarize-{}", i + 1), prompt));
    }

    let mut review = PromptSpec::new().system(EDITOR_SYSTEM);
    if let Some(genre) = genre {
        review = review.context(format!("Genre: {genre}"));
    }
    let review = review.instruction(format!(
        "{MANUSCRIPT_REVIEW_INSTRUCTION}\n{STRUCTURED_OUTPUT_INSTRUCTION}"
    ));
    pipeline.then(Stage::structured("review", review, schema))
}

/// Estimated tokens across every prompt sent and every reply received.
fn estimate_pipeline_tokens(pipeline: &Pipeline, outputs: &[StageOutput]) -> usize {
    pipeline
        .stages()
        .iter()
        .zip(outputs)
        .enumerate()
        .map(|(i, (stage, output))| {
            let previous = i.checked_sub(1).map(|p| &outputs[p].result);
            estimate_tokens(&stage.prompt_with(previous).render())
                + estimate_tokens(output.result.as_context())
        })
        .sum()
}

pub async fn review_manuscript(
    pdf: Bytes,
    genre: Option<&str>,
    llm: &LlmClient,
    cancel: &CancellationToken,
) -> Result<ManuscriptReview, AppError> {
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf))
        .await
        // pdf-extract panics on some malformed files
        .map_err(|e| AppError::UnprocessableEntity(format!("Could not read PDF: {e}")))?
        .map_err(|e| AppError::UnprocessableEntity(format!("Could not read PDF: {e}")))?;
    review_manuscript_text(&text, genre, llm, cancel).await
}

pub async fn review_manuscript_text(
    text: &str,
    genre: Option<&str>,
    llm: &LlmClient,
    cancel: &CancellationToken,
) -> Result<ManuscriptReview, AppError> {
    let mut chunks = chunk_text(text, CHUNK_TOKENS);
    if chunks.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "The manuscript contains no extractable text".to_string(),
        ));
    }
    let chunk_count = chunks.len();
    let truncated = chunk_count > MAX_CHUNKS;
    if truncated {
        warn!("Manuscript has {chunk_count} chunks; summarizing the first {MAX_CHUNKS}");
        chunks.truncate(MAX_CHUNKS);
    }

    let document_id = Uuid::new_v4();
    info!("Reviewing manuscript {document_id}: {chunk_count} chunks");

    let schema = agent_review_schema()?;
    let pipeline = review_pipeline(&chunks, genre, schema.clone());
    let outputs = llm.run_pipeline(&pipeline, cancel).await?;
    let estimated_tokens_used = estimate_pipeline_tokens(&pipeline, &outputs);

    let outcome = match outputs.last() {
        Some(last) => parse_result::<AgentReview>(&last.result, &schema),
        None => Ok(Parsed::Structured(AgentReview::unavailable())),
    };
    let mut review = recover(
        outcome,
        |text| AgentReview {
            overall_assessment: text,
            ..Default::default()
        },
        AgentReview::unavailable,
    )?;
    review.rating = clamp_rating(review.rating);

    Ok(ManuscriptReview {
        document_id,
        genre: genre.map(String::from),
        chunk_count,
        truncated,
        estimated_tokens_used,
        review,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::request::Role;
    use crate::llm_client::stub::StubBackend;
    use crate::llm_client::test_client;
    use std::sync::Arc;

    const REVIEW_JSON: &str = r#"{"overallAssessment":"Promising debut","strengths":["Voice"],
        "weaknesses":["Slow middle"],"rating":4,"recommendation":"request"}"#;

    #[test]
    fn test_review_pipeline_shape() {
        let chunks = vec!["one".to_string(), "two".to_string()];
        let pipeline = review_pipeline(&chunks, Some("Science Fiction"), agent_review_schema().unwrap());
        let labels: Vec<&str> = pipeline.stages().iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["summarize-1", "summarize-2", "review"]);
        assert!(pipeline.stages()[2].schema.is_some());
        assert_eq!(
            pipeline.stages()[2].prompt.context_blocks,
            vec!["Genre: Science Fiction".to_string()]
        );
    }

    #[tokio::test]
    async fn test_summaries_chain_into_review() {
        let stub = Arc::new(
            StubBackend::new()
                .reply_text("Summary of part one")
                .reply_call("record_manuscript_review", REVIEW_JSON),
        );
        let llm = test_client(stub.clone());
        let review = review_manuscript_text(
            "Chapter one text.",
            Some("Literary"),
            &llm,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(review.chunk_count, 1);
        assert!(!review.truncated);
        assert_eq!(review.review.recommendation, "request");
        assert_eq!(review.review.rating, 4.0);
        assert!(review.estimated_tokens_used > 0);

        let requests = stub.requests();
        assert_eq!(requests.len(), 2);
        let review_body = &requests[1]
            .messages()
            .iter()
            .find(|m| m.role == Role::User)
            .unwrap()
            .content;
        let genre_at = review_body.find("Genre: Literary").unwrap();
        let summary_at = review_body.find("Summary of part one").unwrap();
        assert!(genre_at < summary_at);
    }

    #[tokio::test]
    async fn test_empty_text_is_unprocessable() {
        let llm = test_client(Arc::new(StubBackend::new()));
        let err = review_manuscript_text("  \n\n ", None, &llm, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }

    #[tokio::test]
    async fn test_long_manuscript_is_truncated() {
        let paragraph = "x".repeat(CHUNK_TOKENS * 4);
        let text = vec![paragraph; MAX_CHUNKS + 2].join("\n\n");
        let stub = Arc::new(StubBackend::new());
        let llm = test_client(stub.clone());
        let review = review_manuscript_text(&text, None, &llm, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(review.chunk_count, MAX_CHUNKS + 2);
        assert!(review.truncated);
        assert_eq!(stub.requests().len(), MAX_CHUNKS + 1);
    }

    #[tokio::test]
    async fn test_malformed_review_degrades_to_placeholder() {
        let stub = Arc::new(
            StubBackend::new()
                .reply_text("summary")
                .reply_call("record_manuscript_review", "{\"rating\": 4,"),
        );
        let llm = test_client(stub);
        let review = review_manuscript_text("text", None, &llm, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(review.review, AgentReview::unavailable());
    }

    #[tokio::test]
    async fn test_invalid_pdf_is_unprocessable() {
        let llm = test_client(Arc::new(StubBackend::new()));
        let err = review_manuscript(
            Bytes::from_static(b"not a pdf"),
            None,
            &llm,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }
}
