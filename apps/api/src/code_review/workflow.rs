//! Analyze-then-fix workflow over one source file.
//!
//! Stage one writes a free-text analysis; stage two sees the original code plus
//! that analysis and returns a structured proposed change. Nothing is pushed
//! anywhere: the change is returned to the caller for review.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use crate::code_review::prompts::{
    CODE_REVIEW_SYSTEM, PROPOSE_FIX_INSTRUCTION, WORKFLOW_ANALYSIS_INSTRUCTION,
};
use crate::errors::AppError;
use crate::llm_client::parser::{parse_result, recover, Parsed};
use crate::llm_client::pipeline::{Pipeline, Stage};
use crate::llm_client::prompt::PromptSpec;
use crate::llm_client::prompts::{STRUCTURED_OUTPUT_INSTRUCTION, UNAVAILABLE_PREFIX};
use crate::llm_client::schema::{FunctionSchema, ObjectSchema, SchemaError, SchemaNode};
use crate::llm_client::LlmClient;

/// Where the code came from. Every field is optional context for the prompts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeOrigin<'a> {
    pub context: Option<&'a str>,
    pub repository: Option<&'a str>,
    pub file_path: Option<&'a str>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProposedChange {
    pub title: String,
    pub explanation: String,
    pub changes: Vec<String>,
    pub fixed_code: String,
    /// "low" | "medium" | "high"
    pub risk_level: String,
}

impl ProposedChange {
    pub fn unavailable() -> Self {
        Self {
            explanation: format!("{UNAVAILABLE_PREFIX} a proposed change for this code."),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkflowStatus {
    /// `proposedChange.fixedCode` holds replacement code.
    Proposed,
    NoChange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeWorkflowResult {
    pub workflow_id: Uuid,
    pub repository: Option<String>,
    pub file_path: Option<String>,
    pub analysis: String,
    pub proposed_change: ProposedChange,
    pub status: WorkflowStatus,
}

pub fn proposed_change_schema() -> Result<FunctionSchema, SchemaError> {
    let params = ObjectSchema::new()
        .required("title", SchemaNode::string().describe("Pull-request style title"))
        .required("explanation", SchemaNode::string())
        .property("changes", SchemaNode::array_of(SchemaNode::string()))
        .required(
            "fixedCode",
            SchemaNode::string().describe("The complete corrected code, or empty"),
        )
        .property("riskLevel", SchemaNode::string_enum(&["low", "medium", "high"]))
        .build()?;
    FunctionSchema::new(
        "propose_code_change",
        "Propose a change to the reviewed code",
        params,
    )
}

fn origin_blocks(origin: &CodeOrigin<'_>) -> Vec<String> {
    let mut blocks = Vec::new();
    if let Some(context) = origin.context {
        blocks.push(format!("Context: {context}"));
    }
    if let Some(repository) = origin.repository {
        blocks.push(format!("Repository: {repository}"));
    }
    if let Some(file_path) = origin.file_path {
        blocks.push(format!("File: {file_path}"));
    }
    blocks
}

pub fn workflow_pipeline(code: &str, origin: &CodeOrigin<'_>, schema: FunctionSchema) -> Pipeline {
    let blocks = origin_blocks(origin);

    let mut analyze = PromptSpec::new().system(CODE_REVIEW_SYSTEM);
    for block in &blocks {
        analyze = analyze.context(block.as_str());
    }
    let analyze = analyze.instruction(WORKFLOW_ANALYSIS_INSTRUCTION).input(code);

    let mut propose = PromptSpec::new().system(CODE_REVIEW_SYSTEM);
    for block in blocks {
        propose = propose.context(block);
    }
    let propose = propose
        .context(format!("Original code:\n{code}"))
        .instruction(format!("{PROPOSE_FIX_INSTRUCTION}\n{STRUCTURED_OUTPUT_INSTRUCTION}"));

    Pipeline::new()
        .then(Stage::text("analyze", analyze))
        .then(Stage::structured("propose-fix", propose, schema))
}

pub async fn run_code_workflow(
    code: &str,
    origin: CodeOrigin<'_>,
    llm: &LlmClient,
    cancel: &CancellationToken,
) -> Result<CodeWorkflowResult, AppError> {
    let workflow_id = Uuid::new_v4();
    info!(
        "Code workflow {workflow_id} started for {}",
        origin.file_path.unwrap_or("<snippet>")
    );

    let schema = proposed_change_schema()?;
    let pipeline = workflow_pipeline(code, &origin, schema.clone());
    let outputs = llm.run_pipeline(&pipeline, cancel).await?;

    let analysis = outputs
        .first()
        .map(|o| o.result.as_context().trim().to_string())
        .unwrap_or_default();
    let outcome = match outputs.get(1) {
        Some(stage) => parse_result::<ProposedChange>(&stage.result, &schema),
        None => Ok(Parsed::Structured(ProposedChange::unavailable())),
    };
    let proposed_change = recover(
        outcome,
        |text| ProposedChange {
            explanation: text,
            ..Default::default()
        },
        ProposedChange::unavailable,
    )?;

    let status = if proposed_change.fixed_code.trim().is_empty() {
        WorkflowStatus::NoChange
    } else {
        WorkflowStatus::Proposed
    };
    info!("Code workflow {workflow_id} finished: {status:?}");

    Ok(CodeWorkflowResult {
        workflow_id,
        repository: origin.repository.map(String::from),
        file_path: origin.file_path.map(String::from),
        analysis,
        proposed_change,
        status,
    })
}
