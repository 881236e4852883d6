//! Single-call book review from a title and an excerpt.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::parser::recover;
use crate::llm_client::prompt::PromptSpec;
use crate::llm_client::prompts::{STRUCTURED_OUTPUT_INSTRUCTION, UNAVAILABLE_PREFIX};
use crate::llm_client::schema::{FunctionSchema, ObjectSchema, SchemaError, SchemaNode};
use crate::llm_client::LlmClient;
use crate::publishing::prompts::{BOOK_REVIEW_INSTRUCTION, EDITOR_SYSTEM};

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookReview {
    pub book_title: String,
    pub summary: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    /// 1–5; 0 means the model gave no rating.
    pub rating: f64,
    pub recommendation: String,
}

impl BookReview {
    pub fn unavailable(title: &str) -> Self {
        Self {
            book_title: title.to_string(),
            summary: format!("{UNAVAILABLE_PREFIX} a review for \"{title}\"."),
            ..Default::default()
        }
    }
}

pub fn book_review_schema() -> Result<FunctionSchema, SchemaError> {
    let strings = || SchemaNode::array_of(SchemaNode::string());
    let params = ObjectSchema::new()
        .required("summary", SchemaNode::string())
        .required("strengths", strings())
        .required("weaknesses", strings())
        .required("rating", SchemaNode::number().describe("1 (poor) to 5 (outstanding)"))
        .property("recommendation", SchemaNode::string())
        .build()?;
    FunctionSchema::new("record_book_review", "Record an editorial book review", params)
}

/// Keeps a given rating inside 1–5; an absent rating (0) stays 0.
pub fn clamp_rating(rating: f64) -> f64 {
    if rating <= 0.0 {
        0.0
    } else {
        rating.clamp(MIN_RATING, MAX_RATING)
    }
}

pub async fn generate_book_review(
    title: &str,
    content: &str,
    llm: &LlmClient,
    cancel: &CancellationToken,
) -> Result<BookReview, AppError> {
    let schema = book_review_schema()?;
    let spec = PromptSpec::new()
        .system(EDITOR_SYSTEM)
        .context(format!("Title: {title}"))
        .context(content)
        .instruction(format!("{BOOK_REVIEW_INSTRUCTION}\n{STRUCTURED_OUTPUT_INSTRUCTION}"));

    let outcome = llm.complete_structured(&spec, &schema, cancel).await;
    let mut review = recover(
        outcome,
        |text| BookReview {
            summary: text,
            ..Default::default()
        },
        || BookReview::unavailable(title),
    )?;
    review.book_title = title.to_string();
    review.rating = clamp_rating(review.rating);

    info!("Book review for '{}' rated {:.1}", title, review.rating);
    Ok(review)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::stub::StubBackend;
    use crate::llm_client::test_client;
    use std::sync::Arc;

    #[test]
    fn test_clamp_rating() {
        assert_eq!(clamp_rating(0.0), 0.0);
        assert_eq!(clamp_rating(0.5), 1.0);
        assert_eq!(clamp_rating(3.5), 3.5);
        assert_eq!(clamp_rating(9.0), 5.0);
    }

    #[tokio::test]
    async fn test_review_parsed_with_title_attached() {
        let stub = Arc::new(StubBackend::new().reply_call(
            "record_book_review",
            r#"{"summary":"A tour of AI","strengths":["Clear"],"weaknesses":[],"rating":"4"}"#,
        ));
        let llm = test_client(stub);
        let review = generate_book_review(
            "The Future of AI",
            "This book explores the potential of artificial intelligence...",
            &llm,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(
            review,
            BookReview {
                book_title: "The Future of AI".into(),
                summary: "A tour of AI".into(),
                strengths: vec!["Clear".into()],
                weaknesses: vec![],
                rating: 4.0,
                recommendation: String::new(),
            }
        );
    }
}
