//! Patient education material for one medication.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::parser::recover;
use crate::llm_client::prompt::PromptSpec;
use crate::llm_client::prompts::{STRUCTURED_OUTPUT_INSTRUCTION, UNAVAILABLE_PREFIX};
use crate::llm_client::schema::{FunctionSchema, ObjectSchema, SchemaError, SchemaNode};
use crate::llm_client::LlmClient;
use crate::pharmacy::prompts::{DISCLAIMER, PATIENT_EDUCATION_INSTRUCTION, PHARMACIST_SYSTEM};

/// Age at which the prompt asks for older-adult considerations.
const OLDER_ADULT_AGE: u32 = 65;
const PEDIATRIC_AGE: u32 = 18;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientEducation {
    pub medication: String,
    pub overview: String,
    pub how_to_take: String,
    pub side_effects: Vec<String>,
    pub serious_side_effects: Vec<String>,
    pub warnings: Vec<String>,
    pub storage: String,
    pub disclaimer: String,
}

impl PatientEducation {
    pub fn unavailable(medication: &str) -> Self {
        Self {
            medication: medication.to_string(),
            overview: format!("{UNAVAILABLE_PREFIX} patient education for {medication}."),
            ..Default::default()
        }
    }
}

pub fn patient_education_schema() -> Result<FunctionSchema, SchemaError> {
    let strings = || SchemaNode::array_of(SchemaNode::string());
    let params = ObjectSchema::new()
        .required("medication", SchemaNode::string())
        .required("overview", SchemaNode::string().describe("What the medication treats"))
        .required("howToTake", SchemaNode::string())
        .required("sideEffects", strings().describe("Common side effects"))
        .property(
            "seriousSideEffects",
            strings().describe("Side effects that need urgent medical attention"),
        )
        .property("warnings", strings())
        .property("storage", SchemaNode::string())
        .build()?;
    FunctionSchema::new(
        "record_patient_education",
        "Record patient education material for a medication",
        params,
    )
}

fn patient_context(medication: &str, dosage: &str, patient_age: Option<u32>) -> String {
    let mut lines = vec![format!("Medication: {medication}"), format!("Dosage: {dosage}")];
    if let Some(age) = patient_age {
        lines.push(format!("Patient age: {age}"));
        if age >= OLDER_ADULT_AGE {
            lines.push("Include considerations for older adults (falls, kidney function).".into());
        } else if age < PEDIATRIC_AGE {
            lines.push("The patient is a minor; address the caregiver.".into());
        }
    }
    lines.join("\n")
}

pub async fn generate_patient_education(
    medication: &str,
    dosage: &str,
    patient_age: Option<u32>,
    llm: &LlmClient,
    cancel: &CancellationToken,
) -> Result<PatientEducation, AppError> {
    let schema = patient_education_schema()?;
    let spec = PromptSpec::new()
        .system(PHARMACIST_SYSTEM)
        .context(patient_context(medication, dosage, patient_age))
        .instruction(format!(
            "{PATIENT_EDUCATION_INSTRUCTION}\n{STRUCTURED_OUTPUT_INSTRUCTION}"
        ));

    let outcome = llm.complete_structured(&spec, &schema, cancel).await;
    let mut education = recover(
        outcome,
        |text| PatientEducation {
            medication: medication.to_string(),
            overview: text,
            ..Default::default()
        },
        || PatientEducation::unavailable(medication),
    )?;
    if education.medication.trim().is_empty() {
        education.medication = medication.to_string();
    }
    education.disclaimer = DISCLAIMER.to_string();

    info!("Generated patient education for {}", education.medication);
    Ok(education)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::stub::StubBackend;
    use crate::llm_client::test_client;
    use std::sync::Arc;

    #[test]
    fn test_patient_context_age_notes() {
        assert!(patient_context("Metformin", "500mg", Some(70)).contains("older adults"));
        assert!(patient_context("Amoxicillin", "250mg", Some(8)).contains("caregiver"));
        let adult = patient_context("Metformin", "500mg twice daily", Some(45));
        assert_eq!(
            adult,
            "Medication: Metformin\nDosage: 500mg twice daily\nPatient age: 45"
        );
        assert!(!patient_context("Metformin", "500mg", None).contains("Patient age"));
    }

    #[tokio::test]
    async fn test_structured_reply_gets_disclaimer_and_defaults() {
        let stub = Arc::new(StubBackend::new().reply_call(
            "record_patient_education",
            r#"{"overview":"Lowers blood sugar","howToTake":"With meals",
                "sideEffects":["Nausea","Diarrhea"]}"#,
        ));
        let llm = test_client(stub);
        let education = generate_patient_education(
            "Metformin",
            "500mg twice daily",
            Some(45),
            &llm,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(education.medication, "Metformin");
        assert_eq!(education.side_effects, vec!["Nausea", "Diarrhea"]);
        assert!(education.serious_side_effects.is_empty());
        assert_eq!(education.storage, "");
        assert_eq!(education.disclaimer, DISCLAIMER);
    }

    #[tokio::test]
    async fn test_parse_failure_placeholder_keeps_disclaimer() {
        let stub = Arc::new(StubBackend::new().reply_call("record_patient_education", "oops"));
        let llm = test_client(stub);
        let education =
            generate_patient_education("Metformin", "500mg", None, &llm, &CancellationToken::new())
                .await
                .unwrap();
        assert!(education.overview.starts_with(UNAVAILABLE_PREFIX));
        assert_eq!(education.disclaimer, DISCLAIMER);
    }
}
