//! Response Parser: turns a completion result into a typed DTO by walking the
//! function schema.
//!
//! The walk keeps declared keys, drops unknown ones, converts each value by its
//! declared type and fills the node default for anything absent or unusable.
//! Absent `required` keys are defaulted too: a partial result beats a failed
//! request. Malformed JSON is the only hard failure (`LlmError::ParseFailed`).

use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use tracing::warn;

use crate::llm_client::response::CompletionResult;
use crate::llm_client::schema::{FunctionSchema, ScalarKind, SchemaNode};
use crate::llm_client::LlmError;

/// Outcome of parsing one reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    Structured(T),
    /// The model answered in free text instead of calling the function.
    Unstructured(String),
}

/// Parses raw function-call arguments against the schema's parameter tree.
pub fn parse_arguments(raw: &str, schema: &FunctionSchema) -> Result<Value, LlmError> {
    let value: Value = serde_json::from_str(raw).map_err(|e| LlmError::ParseFailed {
        raw: raw.to_string(),
        reason: e.to_string(),
    })?;
    Ok(normalize(&value, schema.parameters()))
}

/// Parses a completion result into `T`, or hands back free text verbatim.
pub fn parse_result<T: DeserializeOwned>(
    result: &CompletionResult,
    schema: &FunctionSchema,
) -> Result<Parsed<T>, LlmError> {
    match result {
        CompletionResult::Text(text) => Ok(Parsed::Unstructured(text.clone())),
        CompletionResult::FunctionCall { arguments, .. } => {
            let normalized = parse_arguments(arguments, schema)?;
            serde_json::from_value(normalized)
                .map(Parsed::Structured)
                .map_err(|e| LlmError::ParseFailed {
                    raw: arguments.clone(),
                    reason: e.to_string(),
                })
        }
    }
}

/// Degrades a parse outcome into a DTO. `ParseFailed` becomes the placeholder,
/// free text goes through `from_text`, every other error propagates unchanged.
pub fn recover<T>(
    outcome: Result<Parsed<T>, LlmError>,
    from_text: impl FnOnce(String) -> T,
    placeholder: impl FnOnce() -> T,
) -> Result<T, LlmError> {
    match outcome {
        Ok(Parsed::Structured(value)) => Ok(value),
        Ok(Parsed::Unstructured(text)) => Ok(from_text(text)),
        Err(LlmError::ParseFailed { raw, reason }) => {
            warn!(
                "Structured reply could not be parsed ({reason}); returning placeholder. Raw: {:?}",
                raw.chars().take(200).collect::<String>()
            );
            Ok(placeholder())
        }
        Err(other) => Err(other),
    }
}

fn normalize(value: &Value, node: &SchemaNode) -> Value {
    match node {
        SchemaNode::Object { properties, .. } => {
            let Some(object) = value.as_object() else {
                return node.default_value();
            };
            let normalized: Map<String, Value> = properties
                .iter()
                .map(|(name, child)| {
                    let field = match object.get(name) {
                        Some(v) => normalize(v, child),
                        None => child.default_value(),
                    };
                    (name.clone(), field)
                })
                .collect();
            Value::Object(normalized)
        }
        SchemaNode::Array { items, .. } => match value {
            Value::Array(elements) => Value::Array(
                elements
                    .iter()
                    .filter(|e| !e.is_null())
                    .map(|e| normalize(e, items))
                    .collect(),
            ),
            _ => node.default_value(),
        },
        SchemaNode::Scalar { kind, .. } => {
            convert_scalar(value, *kind).unwrap_or_else(|| node.default_value())
        }
    }
}

fn convert_scalar(value: &Value, kind: ScalarKind) -> Option<Value> {
    match (kind, value) {
        (ScalarKind::String, Value::String(_)) => Some(value.clone()),
        (ScalarKind::String, Value::Number(n)) => Some(Value::String(n.to_string())),
        (ScalarKind::String, Value::Bool(b)) => Some(Value::String(b.to_string())),

        (ScalarKind::Number, Value::Number(_)) => Some(value.clone()),
        (ScalarKind::Number, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),

        (ScalarKind::Integer, Value::Number(n)) => integer_from(n.as_i64(), n.as_f64()),
        (ScalarKind::Integer, Value::String(s)) => {
            let s = s.trim();
            integer_from(s.parse::<i64>().ok(), s.parse::<f64>().ok())
        }

        (ScalarKind::Boolean, Value::Bool(_)) => Some(value.clone()),
        (ScalarKind::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },

        _ => None,
    }
}

/// Exact integers pass through; finite floats are truncated toward zero.
fn integer_from(exact: Option<i64>, float: Option<f64>) -> Option<Value> {
    if let Some(i) = exact {
        return Some(Value::from(i));
    }
    float
        .filter(|f| f.is_finite())
        .map(|f| Value::from(f.trunc() as i64))
}
