//! Axum route handlers for the DevOps assistant.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::devops::log_summarizer::{summarize_logs, LogSummary};
use crate::errors::{require_text, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SummarizeLogsRequest {
    pub logs: String,
    pub service: Option<String>,
}

/// POST /api/devops/summarize-logs
pub async fn handle_summarize_logs(
    State(state): State<AppState>,
    Json(request): Json<SummarizeLogsRequest>,
) -> Result<Json<LogSummary>, AppError> {
    require_text("logs", &request.logs)?;
    let service = request.service.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let summary = summarize_logs(&request.logs, service, &state.llm, &state.request_token()).await?;
    Ok(Json(summary))
}
