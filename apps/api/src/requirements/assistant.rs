//! Requirements assistant: summarize a requirements document, derive user
//! stories from it, and answer questions grounded in supplied context.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::parser::recover;
use crate::llm_client::prompt::PromptSpec;
use crate::llm_client::prompts::{
    GROUNDED_ANSWER_INSTRUCTION, STRUCTURED_OUTPUT_INSTRUCTION, UNAVAILABLE_PREFIX,
};
use crate::llm_client::schema::{FunctionSchema, ObjectSchema, SchemaError, SchemaNode};
use crate::llm_client::LlmClient;
use crate::requirements::prompts::{
    ANSWER_SYSTEM, REQUIREMENTS_SYSTEM, STORY_EXAMPLE_INPUT, STORY_EXAMPLE_OUTPUT,
    SUMMARIZE_INSTRUCTION, USER_STORIES_INSTRUCTION,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequirementSummary {
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStory {
    pub title: String,
    pub as_a: String,
    pub i_want: String,
    pub so_that: String,
    pub acceptance_criteria: Vec<String>,
    /// "high" | "medium" | "low"; empty when the model gave none.
    pub priority: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStories {
    pub stories: Vec<UserStory>,
    pub notes: String,
}

impl UserStories {
    pub fn unavailable() -> Self {
        Self {
            stories: Vec::new(),
            notes: format!("{UNAVAILABLE_PREFIX} user stories from the supplied requirements."),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Answer {
    pub question: String,
    pub answer: String,
}

pub fn user_stories_schema() -> Result<FunctionSchema, SchemaError> {
    let story = ObjectSchema::new()
        .required("title", SchemaNode::string())
        .required("asA", SchemaNode::string().describe("The user role"))
        .required("iWant", SchemaNode::string().describe("The capability"))
        .required("soThat", SchemaNode::string().describe("The benefit"))
        .required(
            "acceptanceCriteria",
            SchemaNode::array_of(SchemaNode::string()),
        )
        .property("priority", SchemaNode::string_enum(&["high", "medium", "low"]))
        .build()?;
    let params = ObjectSchema::new()
        .required("stories", SchemaNode::array_of(story))
        .property("notes", SchemaNode::string())
        .build()?;
    FunctionSchema::new(
        "record_user_stories",
        "Record user stories derived from a requirements document",
        params,
    )
}

pub async fn summarize(
    content: &str,
    llm: &LlmClient,
    cancel: &CancellationToken,
) -> Result<RequirementSummary, AppError> {
    let spec = PromptSpec::new()
        .system(REQUIREMENTS_SYSTEM)
        .instruction(SUMMARIZE_INSTRUCTION)
        .input(content);
    let summary = llm.complete_text(&spec, cancel).await?;
    Ok(RequirementSummary {
        summary: summary.trim().to_string(),
    })
}

pub async fn generate_user_stories(
    content: &str,
    llm: &LlmClient,
    cancel: &CancellationToken,
) -> Result<UserStories, AppError> {
    let schema = user_stories_schema()?;
    let spec = PromptSpec::new()
        .system(REQUIREMENTS_SYSTEM)
        .example(STORY_EXAMPLE_INPUT, STORY_EXAMPLE_OUTPUT)
        .instruction(format!(
            "{USER_STORIES_INSTRUCTION}\n{STRUCTURED_OUTPUT_INSTRUCTION}"
        ))
        .input(content);

    let outcome = llm.complete_structured(&spec, &schema, cancel).await;
    let stories = recover(
        outcome,
        |text| UserStories {
            stories: Vec::new(),
            notes: text,
        },
        UserStories::unavailable,
    )?;
    info!("Generated {} user stories", stories.stories.len());
    Ok(stories)
}

pub async fn answer_question(
    question: &str,
    context: &str,
    llm: &LlmClient,
    cancel: &CancellationToken,
) -> Result<Answer, AppError> {
    let spec = PromptSpec::new()
        .system(ANSWER_SYSTEM)
        .context(context)
        .instruction(GROUNDED_ANSWER_INSTRUCTION)
        .input(question);
    let answer = llm.complete_text(&spec, cancel).await?;
    Ok(Answer {
        question: question.to_string(),
        answer: answer.trim().to_string(),
    })
}
