//! Axum route handlers for the Publishing assistant.

use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::info;

use crate::errors::{require_text, AppError};
use crate::publishing::book_review::{generate_book_review, BookReview};
use crate::publishing::manuscript::{review_manuscript, ManuscriptReview};
use crate::state::AppState;

const PDF_FIELD: &str = "pdfFile";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookReviewRequest {
    pub book_title: String,
    pub book_content: String,
}

#[derive(Debug, Deserialize)]
pub struct ManuscriptQuery {
    pub genre: Option<String>,
}

/// POST /api/publishing/review
pub async fn handle_book_review(
    State(state): State<AppState>,
    Json(request): Json<BookReviewRequest>,
) -> Result<Json<BookReview>, AppError> {
    require_text("bookTitle", &request.book_title)?;
    require_text("bookContent", &request.book_content)?;
    let review = generate_book_review(
        request.book_title.trim(),
        &request.book_content,
        &state.llm,
        &state.request_token(),
    )
    .await?;
    Ok(Json(review))
}

/// POST /api/publishing/review-pdf?genre=...
///
/// Multipart upload; the manuscript is the `pdfFile` field.
pub async fn handle_manuscript_review(
    State(state): State<AppState>,
    Query(query): Query<ManuscriptQuery>,
    mut multipart: Multipart,
) -> Result<Json<ManuscriptReview>, AppError> {
    let mut pdf: Option<Bytes> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some(PDF_FIELD) {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Could not read {PDF_FIELD}: {e}")))?;
            pdf = Some(data);
        }
    }

    let pdf = pdf
        .filter(|data| !data.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{PDF_FIELD} is required")))?;
    let genre = query
        .genre
        .as_deref()
        .map(str::trim)
        .filter(|g| !g.is_empty());

    info!("Manuscript upload: {} bytes", pdf.len());
    let review = review_manuscript(pdf, genre, &state.llm, &state.request_token()).await?;
    Ok(Json(review))
}
