//! Function-call schema: a typed JSON-schema tree describing the structured
//! object the model is asked to emit.
//!
//! Object levels are validated when built, and `FunctionSchema::new` re-checks the
//! whole tree: every `required` name must be a declared property, and property
//! names are unique per level.

use serde_json::{json, Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("required property '{0}' is not declared")]
    UndeclaredRequired(String),

    #[error("property '{0}' is declared more than once")]
    DuplicateProperty(String),

    #[error("function parameters must be an object schema")]
    NonObjectParameters,

    #[error("function name cannot be empty")]
    EmptyName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Number,
    Integer,
    Boolean,
}

impl ScalarKind {
    fn type_name(self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Number => "number",
            ScalarKind::Integer => "integer",
            ScalarKind::Boolean => "boolean",
        }
    }
}

/// One node of the schema tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Object {
        description: Option<String>,
        properties: Vec<(String, SchemaNode)>,
        required: Vec<String>,
    },
    Array {
        description: Option<String>,
        items: Box<SchemaNode>,
    },
    Scalar {
        description: Option<String>,
        kind: ScalarKind,
        /// Allowed values for string scalars. Advisory only; the parser does not enforce it.
        allowed: Vec<String>,
    },
}

impl SchemaNode {
    pub fn string() -> Self {
        Self::scalar(ScalarKind::String)
    }

    pub fn number() -> Self {
        Self::scalar(ScalarKind::Number)
    }

    pub fn integer() -> Self {
        Self::scalar(ScalarKind::Integer)
    }

    pub fn boolean() -> Self {
        Self::scalar(ScalarKind::Boolean)
    }

    pub fn string_enum(values: &[&str]) -> Self {
        SchemaNode::Scalar {
            description: None,
            kind: ScalarKind::String,
            allowed: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn array_of(items: SchemaNode) -> Self {
        SchemaNode::Array {
            description: None,
            items: Box::new(items),
        }
    }

    fn scalar(kind: ScalarKind) -> Self {
        SchemaNode::Scalar {
            description: None,
            kind,
            allowed: Vec::new(),
        }
    }

    /// Attaches a human-readable description (sent to the model).
    pub fn describe(mut self, text: impl Into<String>) -> Self {
        let text = Some(text.into());
        match &mut self {
            SchemaNode::Object { description, .. }
            | SchemaNode::Array { description, .. }
            | SchemaNode::Scalar { description, .. } => *description = text,
        }
        self
    }

    /// Checks every object level in the tree: unique property names and
    /// required ⊆ properties. Nodes written as literals are held to the same rule.
    pub fn validate(&self) -> Result<(), SchemaError> {
        match self {
            SchemaNode::Object {
                properties,
                required,
                ..
            } => {
                for (i, (name, _)) in properties.iter().enumerate() {
                    if properties[..i].iter().any(|(n, _)| n == name) {
                        return Err(SchemaError::DuplicateProperty(name.clone()));
                    }
                }
                if let Some(missing) = required
                    .iter()
                    .find(|r| !properties.iter().any(|(n, _)| n == *r))
                {
                    return Err(SchemaError::UndeclaredRequired(missing.clone()));
                }
                properties.iter().try_for_each(|(_, child)| child.validate())
            }
            SchemaNode::Array { items, .. } => items.validate(),
            SchemaNode::Scalar { .. } => Ok(()),
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, SchemaNode::Object { .. })
    }

    /// The explicit default for this node: `""`, `0`, `false`, `[]`, or an object
    /// whose every declared property is itself at its default.
    pub fn default_value(&self) -> Value {
        match self {
            SchemaNode::Object { properties, .. } => Value::Object(
                properties
                    .iter()
                    .map(|(name, node)| (name.clone(), node.default_value()))
                    .collect(),
            ),
            SchemaNode::Array { .. } => Value::Array(Vec::new()),
            SchemaNode::Scalar { kind, .. } => match kind {
                ScalarKind::String => Value::String(String::new()),
                ScalarKind::Number | ScalarKind::Integer => json!(0),
                ScalarKind::Boolean => Value::Bool(false),
            },
        }
    }

    /// Renders the node as a JSON-schema value for the wire request.
    pub fn to_json_schema(&self) -> Value {
        let mut out = Map::new();
        let description = match self {
            SchemaNode::Object {
                description,
                properties,
                required,
            } => {
                out.insert("type".into(), json!("object"));
                let props: Map<String, Value> = properties
                    .iter()
                    .map(|(name, node)| (name.clone(), node.to_json_schema()))
                    .collect();
                out.insert("properties".into(), Value::Object(props));
                if !required.is_empty() {
                    out.insert("required".into(), json!(required));
                }
                description
            }
            SchemaNode::Array { description, items } => {
                out.insert("type".into(), json!("array"));
                out.insert("items".into(), items.to_json_schema());
                description
            }
            SchemaNode::Scalar {
                description,
                kind,
                allowed,
            } => {
                out.insert("type".into(), json!(kind.type_name()));
                if !allowed.is_empty() {
                    out.insert("enum".into(), json!(allowed));
                }
                description
            }
        };
        if let Some(text) = description {
            out.insert("description".into(), json!(text));
        }
        Value::Object(out)
    }
}

/// Builder for one object level. `build()` enforces the required ⊆ properties rule.
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    description: Option<String>,
    properties: Vec<(String, SchemaNode)>,
    required: Vec<String>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Declares an optional property.
    pub fn property(mut self, name: impl Into<String>, node: SchemaNode) -> Self {
        self.properties.push((name.into(), node));
        self
    }

    /// Declares a property and marks it required.
    pub fn required(self, name: impl Into<String>, node: SchemaNode) -> Self {
        let name = name.into();
        self.property(name.clone(), node).require(name)
    }

    /// Marks an already (or later) declared property as required.
    pub fn require(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.required.contains(&name) {
            self.required.push(name);
        }
        self
    }

    pub fn build(self) -> Result<SchemaNode, SchemaError> {
        let node = SchemaNode::Object {
            description: self.description,
            properties: self.properties,
            required: self.required,
        };
        node.validate()?;
        Ok(node)
    }
}

/// A callable function the model may invoke; `parameters` is always an object node.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSchema {
    name: String,
    description: String,
    parameters: SchemaNode,
}

impl FunctionSchema {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: SchemaNode,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SchemaError::EmptyName);
        }
        if !parameters.is_object() {
            return Err(SchemaError::NonObjectParameters);
        }
        parameters.validate()?;
        Ok(Self {
            name,
            description: description.into(),
            parameters,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parameters(&self) -> &SchemaNode {
        &self.parameters
    }

    /// Wire form: `{"name", "description", "parameters"}`.
    pub fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "parameters": self.parameters.to_json_schema(),
        })
    }
}
