//! Axum route handlers for the Retrospective analyzer.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::retro::analyzer::{analyze_retrospective, RetroAnalysis};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RetroRequest {
    pub comments: Vec<String>,
}

/// POST /api/retro/analyze
pub async fn handle_analyze_retrospective(
    State(state): State<AppState>,
    Json(request): Json<RetroRequest>,
) -> Result<Json<RetroAnalysis>, AppError> {
    let analysis =
        analyze_retrospective(&request.comments, &state.llm, &state.request_token()).await?;
    Ok(Json(analysis))
}
