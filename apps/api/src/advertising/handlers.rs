//! Axum route handlers for the Advertising assistant.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::advertising::copywriter::{generate_ad_copy, AdCopy};
use crate::errors::{require_text, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdCopyRequest {
    pub product: String,
    pub target_audience: String,
    pub tone: Option<String>,
}

/// POST /api/advertising/ad-copy
pub async fn handle_ad_copy(
    State(state): State<AppState>,
    Json(request): Json<AdCopyRequest>,
) -> Result<Json<AdCopy>, AppError> {
    require_text("product", &request.product)?;
    require_text("targetAudience", &request.target_audience)?;
    let tone = request.tone.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let copy = generate_ad_copy(
        request.product.trim(),
        request.target_audience.trim(),
        tone,
        &state.llm,
        &state.request_token(),
    )
    .await?;
    Ok(Json(copy))
}
