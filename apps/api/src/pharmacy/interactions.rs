//! Drug interaction screening across a medication list.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::parser::recover;
use crate::llm_client::prompt::PromptSpec;
use crate::llm_client::prompts::{STRUCTURED_OUTPUT_INSTRUCTION, UNAVAILABLE_PREFIX};
use crate::llm_client::schema::{FunctionSchema, ObjectSchema, SchemaError, SchemaNode};
use crate::llm_client::LlmClient;
use crate::pharmacy::prompts::{DISCLAIMER, INTERACTIONS_INSTRUCTION, PHARMACIST_SYSTEM};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DrugInteraction {
    pub drugs: Vec<String>,
    pub severity: String,
    pub description: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DrugInteractionAnalysis {
    pub medications: Vec<String>,
    pub interactions: Vec<DrugInteraction>,
    pub summary: String,
    pub disclaimer: String,
}

impl DrugInteractionAnalysis {
    pub fn unavailable(medications: &[String]) -> Self {
        Self {
            medications: medications.to_vec(),
            summary: format!("{UNAVAILABLE_PREFIX} a drug interaction analysis."),
            ..Default::default()
        }
    }
}

pub fn interactions_schema() -> Result<FunctionSchema, SchemaError> {
    let interaction = ObjectSchema::new()
        .required("drugs", SchemaNode::array_of(SchemaNode::string()))
        .required(
            "severity",
            SchemaNode::string_enum(&["major", "moderate", "minor"]),
        )
        .required("description", SchemaNode::string())
        .property("recommendation", SchemaNode::string())
        .build()?;
    let params = ObjectSchema::new()
        .required("interactions", SchemaNode::array_of(interaction))
        .required("summary", SchemaNode::string())
        .build()?;
    FunctionSchema::new(
        "record_drug_interactions",
        "Record drug-drug interactions found in a medication list",
        params,
    )
}

/// Trims, drops blanks, and removes case-insensitive duplicates, keeping first spelling.
fn normalize_medications(medications: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for name in medications.iter().map(|m| m.trim()).filter(|m| !m.is_empty()) {
        let key = name.to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            out.push(name.to_string());
        }
    }
    out
}

pub async fn analyze_drug_interactions(
    medications: &[String],
    llm: &LlmClient,
    cancel: &CancellationToken,
) -> Result<DrugInteractionAnalysis, AppError> {
    let medications = normalize_medications(medications);
    if medications.len() < 2 {
        return Err(AppError::Validation(
            "at least two distinct medications are required".to_string(),
        ));
    }

    let schema = interactions_schema()?;
    let list = medications
        .iter()
        .map(|m| format!("- {m}"))
        .collect::<Vec<_>>()
        .join("\n");
    let spec = PromptSpec::new()
        .system(PHARMACIST_SYSTEM)
        .context(format!("Medication list:\n{list}"))
        .instruction(format!("{INTERACTIONS_INSTRUCTION}\n{STRUCTURED_OUTPUT_INSTRUCTION}"));

    let outcome = llm.complete_structured(&spec, &schema, cancel).await;
    let mut analysis = recover(
        outcome,
        |text| DrugInteractionAnalysis {
            summary: text,
            ..Default::default()
        },
        || DrugInteractionAnalysis::unavailable(&medications),
    )?;
    analysis.medications = medications;
    analysis.disclaimer = DISCLAIMER.to_string();

    let major = analysis
        .interactions
        .iter()
        .filter(|i| i.severity.eq_ignore_ascii_case("major"))
        .count();
    if major > 0 {
        warn!("{major} major drug interaction(s) reported");
    }
    info!(
        "Interaction screen complete: {} medications, {} interactions",
        analysis.medications.len(),
        analysis.interactions.len()
    );
    Ok(analysis)
}
