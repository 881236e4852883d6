//! Axum route handlers for the Requirements assistant.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::{require_text, AppError};
use crate::requirements::assistant::{
    answer_question, generate_user_stories, summarize, Answer, RequirementSummary, UserStories,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    pub question: String,
    pub context: String,
}

/// POST /api/requirements/summarize
pub async fn handle_summarize(
    State(state): State<AppState>,
    Json(request): Json<ContentRequest>,
) -> Result<Json<RequirementSummary>, AppError> {
    require_text("content", &request.content)?;
    let summary = summarize(&request.content, &state.llm, &state.request_token()).await?;
    Ok(Json(summary))
}

/// POST /api/requirements/generate-user-stories
pub async fn handle_generate_user_stories(
    State(state): State<AppState>,
    Json(request): Json<ContentRequest>,
) -> Result<Json<UserStories>, AppError> {
    require_text("content", &request.content)?;
    let stories =
        generate_user_stories(&request.content, &state.llm, &state.request_token()).await?;
    Ok(Json(stories))
}

/// POST /api/requirements/answer-question
///
/// Answers strictly from the supplied context.
pub async fn handle_answer_question(
    State(state): State<AppState>,
    Json(request): Json<QuestionRequest>,
) -> Result<Json<Answer>, AppError> {
    require_text("question", &request.question)?;
    require_text("context", &request.context)?;
    let answer = answer_question(
        &request.question,
        &request.context,
        &state.llm,
        &state.request_token(),
    )
    .await?;
    Ok(Json(answer))
}
