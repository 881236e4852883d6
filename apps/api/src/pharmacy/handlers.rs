//! Axum route handlers for the Pharmacy assistant.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::{require_text, AppError};
use crate::pharmacy::education::{generate_patient_education, PatientEducation};
use crate::pharmacy::interactions::{analyze_drug_interactions, DrugInteractionAnalysis};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientEducationRequest {
    pub medication: String,
    pub dosage: String,
    pub patient_age: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct DrugInteractionRequest {
    pub medications: Vec<String>,
}

/// POST /api/pharmacy/patient-education
pub async fn handle_patient_education(
    State(state): State<AppState>,
    Json(request): Json<PatientEducationRequest>,
) -> Result<Json<PatientEducation>, AppError> {
    require_text("medication", &request.medication)?;
    require_text("dosage", &request.dosage)?;
    let education = generate_patient_education(
        request.medication.trim(),
        request.dosage.trim(),
        request.patient_age,
        &state.llm,
        &state.request_token(),
    )
    .await?;
    Ok(Json(education))
}

/// POST /api/pharmacy/drug-interactions
pub async fn handle_drug_interactions(
    State(state): State<AppState>,
    Json(request): Json<DrugInteractionRequest>,
) -> Result<Json<DrugInteractionAnalysis>, AppError> {
    let analysis =
        analyze_drug_interactions(&request.medications, &state.llm, &state.request_token())
            .await?;
    Ok(Json(analysis))
}
