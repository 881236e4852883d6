//! Axum route handlers for the Code review assistant.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::code_review::analyzer::{analyze_code, CodeAnalysis};
use crate::code_review::workflow::{run_code_workflow, CodeOrigin, CodeWorkflowResult};
use crate::errors::{require_text, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeCodeRequest {
    pub code: String,
    pub context: Option<String>,
}

/// POST /api/autonomousagent/analyze
pub async fn handle_analyze_code(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeCodeRequest>,
) -> Result<Json<CodeAnalysis>, AppError> {
    require_text("code", &request.code)?;
    let context = request.context.as_deref().filter(|c| !c.trim().is_empty());
    let analysis = analyze_code(&request.code, context, &state.llm, &state.request_token()).await?;
    Ok(Json(analysis))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeWorkflowRequest {
    pub code: String,
    pub context: Option<String>,
    pub repository: Option<String>,
    pub file_path: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// POST /api/autonomousagent/workflow
///
/// Analysis followed by a proposed fix. The change is returned, never applied.
pub async fn handle_code_workflow(
    State(state): State<AppState>,
    Json(request): Json<CodeWorkflowRequest>,
) -> Result<Json<CodeWorkflowResult>, AppError> {
    require_text("code", &request.code)?;
    let origin = CodeOrigin {
        context: non_blank(&request.context),
        repository: non_blank(&request.repository),
        file_path: non_blank(&request.file_path),
    };
    let result = run_code_workflow(&request.code, origin, &state.llm, &state.request_token()).await?;
    Ok(Json(result))
}
