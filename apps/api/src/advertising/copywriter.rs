use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::advertising::prompts::{AD_COPY_INSTRUCTION, COPYWRITER_SYSTEM, DEFAULT_TONE};
use crate::errors::AppError;
use crate::llm_client::parser::recover;
use crate::llm_client::prompt::PromptSpec;
use crate::llm_client::prompts::{STRUCTURED_OUTPUT_INSTRUCTION, UNAVAILABLE_PREFIX};
use crate::llm_client::schema::{FunctionSchema, ObjectSchema, SchemaError, SchemaNode};
use crate::llm_client::LlmClient;

const MAX_VARIATIONS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdCopy {
    pub headline: String,
    pub body: String,
    pub call_to_action: String,
    pub variations: Vec<String>,
}

impl AdCopy {
    pub fn unavailable(product: &str) -> Self {
        Self {
            body: format!("{UNAVAILABLE_PREFIX} ad copy for {product}."),
            ..Default::default()
        }
    }
}

pub fn ad_copy_schema() -> Result<FunctionSchema, SchemaError> {
    let params = ObjectSchema::new()
        .required("headline", SchemaNode::string())
        .required("body", SchemaNode::string())
        .required("callToAction", SchemaNode::string())
        .property(
            "variations",
            SchemaNode::array_of(SchemaNode::string()).describe("Alternative headlines"),
        )
        .build()?;
    FunctionSchema::new("record_ad_copy", "Record ad copy for a product", params)
}

fn brief(product: &str, audience: &str, tone: Option<&str>) -> String {
    format!(
        "Product: {product}\nTarget audience: {audience}\nTone: {}",
        tone.unwrap_or(DEFAULT_TONE)
    )
}

pub async fn generate_ad_copy(
    product: &str,
    audience: &str,
    tone: Option<&str>,
    llm: &LlmClient,
    cancel: &CancellationToken,
) -> Result<AdCopy, AppError> {
    let schema = ad_copy_schema()?;
    let spec = PromptSpec::new()
        .system(COPYWRITER_SYSTEM)
        .context(brief(product, audience, tone))
        .instruction(format!("{AD_COPY_INSTRUCTION}\n{STRUCTURED_OUTPUT_INSTRUCTION}"));

    let outcome = llm.complete_structured(&spec, &schema, cancel).await;
    let mut copy = recover(
        outcome,
        |text| AdCopy {
            body: text,
            ..Default::default()
        },
        || AdCopy::unavailable(product),
    )?;
    copy.variations.retain(|v| !v.trim().is_empty());
    copy.variations.truncate(MAX_VARIATIONS);

    info!("Ad copy for '{}': {} variations", product, copy.variations.len());
    Ok(copy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::stub::StubBackend;
    use crate::llm_client::test_client;
    use std::sync::Arc;

    #[test]
    fn test_brief_defaults_tone() {
        assert_eq!(
            brief("Smart Watch", "Tech enthusiasts aged 25-40", None),
            "Product: Smart Watch\nTarget audience: Tech enthusiasts aged 25-40\nTone: professional"
        );
        assert!(brief("Smart Watch", "Runners", Some("Modern and exciting"))
            .ends_with("Tone: Modern and exciting"));
    }

    #[tokio::test]
    async fn test_variations_are_capped() {
        let stub = Arc::new(StubBackend::new().reply_call(
            "record_ad_copy",
            r#"{"headline":"Time, upgraded","body":"Meet the watch that keeps up.",
                "callToAction":"Pre-order now","variations":["A","","B","C","D"]}"#,
        ));
        let llm = test_client(stub);
        let copy = generate_ad_copy(
            "Smart Watch",
            "Tech enthusiasts aged 25-40",
            Some("Modern and exciting"),
            &llm,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(copy.call_to_action, "Pre-order now");
        assert_eq!(copy.variations, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_plain_text_reply_lands_in_body() {
        let stub = Arc::new(StubBackend::new().reply_text("Buy the watch."));
        let llm = test_client(stub);
        let copy = generate_ad_copy("Smart Watch", "Runners", None, &llm, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            copy,
            AdCopy {
                body: "Buy the watch.".into(),
                ..Default::default()
            }
        );
    }

    #[tokio::test]
    async fn test_upstream_failure_propagates() {
        let stub = Arc::new(StubBackend::new().fail(429, "Rate limit reached"));
        let llm = test_client(stub);
        let err = generate_ad_copy("Smart Watch", "Runners", None, &llm, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(ref m) if m.contains("Rate limit")));
    }
}
