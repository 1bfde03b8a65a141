//! Declarative input schemas for MCP tools.
//!
//! A [`SchemaNode`] describes the JSON shape a tool accepts. The same tree is
//! used twice: exported as JSON Schema for `tools/list`, and walked by
//! [`SchemaNode::validate`] against the caller's arguments before any backend
//! call is made.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

// ---------------------------------------------------------------------------
// SchemaNode
// ---------------------------------------------------------------------------

/// One node of a JSON-like type tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub description: Option<String>,
    pub kind: SchemaKind,
}

/// The shape a [`SchemaNode`] accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    String,
    Number,
    Integer,
    Boolean,
    Array(Box<SchemaNode>),
    Object {
        properties: BTreeMap<String, SchemaNode>,
        required: Vec<String>,
    },
    /// Value must match at least one of the variants.
    AnyOf(Vec<SchemaNode>),
}

impl SchemaNode {
    fn of(kind: SchemaKind) -> Self {
        Self {
            description: None,
            kind,
        }
    }

    pub fn string() -> Self {
        Self::of(SchemaKind::String)
    }

    pub fn number() -> Self {
        Self::of(SchemaKind::Number)
    }

    pub fn integer() -> Self {
        Self::of(SchemaKind::Integer)
    }

    pub fn boolean() -> Self {
        Self::of(SchemaKind::Boolean)
    }

    pub fn array(items: SchemaNode) -> Self {
        Self::of(SchemaKind::Array(Box::new(items)))
    }

    pub fn object() -> Self {
        Self::of(SchemaKind::Object {
            properties: BTreeMap::new(),
            required: Vec::new(),
        })
    }

    pub fn any_of(variants: Vec<SchemaNode>) -> Self {
        Self::of(SchemaKind::AnyOf(variants))
    }

    /// Attach a human-readable description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add an optional property. No-op on non-object nodes.
    pub fn property(mut self, name: impl Into<String>, node: SchemaNode) -> Self {
        if let SchemaKind::Object { properties, .. } = &mut self.kind {
            properties.insert(name.into(), node);
        }
        self
    }

    /// Add a property and mark it required.
    pub fn required_property(mut self, name: impl Into<String>, node: SchemaNode) -> Self {
        let name = name.into();
        if let SchemaKind::Object {
            properties,
            required,
        } = &mut self.kind
        {
            properties.insert(name.clone(), node);
            if !required.contains(&name) {
                required.push(name);
            }
        }
        self
    }

    /// Names listed as required on this node (empty for non-objects).
    pub fn required_names(&self) -> &[String] {
        match &self.kind {
            SchemaKind::Object { required, .. } => required,
            _ => &[],
        }
    }

    fn type_name(&self) -> &'static str {
        match self.kind {
            SchemaKind::String => "string",
            SchemaKind::Number => "number",
            SchemaKind::Integer => "integer",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Array(_) => "array",
            SchemaKind::Object { .. } => "object",
            SchemaKind::AnyOf(_) => "anyOf",
        }
    }

    // -----------------------------------------------------------------------
    // JSON Schema export
    // -----------------------------------------------------------------------

    /// Render this node as a JSON Schema value.
    pub fn to_json_schema(&self) -> Value {
        let mut out = Map::new();
        match &self.kind {
            SchemaKind::AnyOf(variants) => {
                out.insert(
                    "anyOf".into(),
                    Value::Array(variants.iter().map(|v| v.to_json_schema()).collect()),
                );
            }
            SchemaKind::Array(items) => {
                out.insert("type".into(), json!("array"));
                out.insert("items".into(), items.to_json_schema());
            }
            SchemaKind::Object {
                properties,
                required,
            } => {
                out.insert("type".into(), json!("object"));
                let props: Map<String, Value> = properties
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json_schema()))
                    .collect();
                out.insert("properties".into(), Value::Object(props));
                if !required.is_empty() {
                    out.insert("required".into(), json!(required));
                }
            }
            _ => {
                out.insert("type".into(), json!(self.type_name()));
            }
        }
        if let Some(desc) = &self.description {
            out.insert("description".into(), json!(desc));
        }
        Value::Object(out)
    }

    /// JSON Schema as an object map, the form MCP tool listings carry.
    pub fn to_json_object(&self) -> Map<String, Value> {
        match self.to_json_schema() {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Check `value` against this schema.
    ///
    /// Extra object properties are allowed. The first mismatch found wins.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        self.validate_at(value, "")
    }

    /// Check a tool call's argument map against this (object) schema.
    pub fn validate_arguments(&self, arguments: &Map<String, Value>) -> Result<(), ValidationError> {
        match &self.kind {
            SchemaKind::Object {
                properties,
                required,
            } => validate_object(properties, required, arguments, ""),
            _ => self.validate(&Value::Object(arguments.clone())),
        }
    }

    fn validate_at(&self, value: &Value, path: &str) -> Result<(), ValidationError> {
        match &self.kind {
            SchemaKind::String if value.is_string() => Ok(()),
            SchemaKind::Number if value.is_number() => Ok(()),
            SchemaKind::Integer if is_integer(value) => Ok(()),
            SchemaKind::Boolean if value.is_boolean() => Ok(()),
            SchemaKind::Array(items) => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| ValidationError::type_mismatch(path, "array", value))?;
                for (i, item) in arr.iter().enumerate() {
                    items.validate_at(item, &format!("{path}[{i}]"))?;
                }
                Ok(())
            }
            SchemaKind::Object {
                properties,
                required,
            } => {
                let obj = value
                    .as_object()
                    .ok_or_else(|| ValidationError::type_mismatch(path, "object", value))?;
                validate_object(properties, required, obj, path)
            }
            SchemaKind::AnyOf(variants) => {
                if variants.iter().any(|v| v.validate_at(value, path).is_ok()) {
                    Ok(())
                } else {
                    let expected = variants
                        .iter()
                        .map(SchemaNode::describe_shape)
                        .collect::<Vec<_>>()
                        .join(" or ");
                    Err(ValidationError::type_mismatch(path, &expected, value))
                }
            }
            _ => Err(ValidationError::type_mismatch(path, self.type_name(), value)),
        }
    }

    fn describe_shape(&self) -> String {
        match &self.kind {
            SchemaKind::Array(items) => format!("{}[]", items.describe_shape()),
            _ => self.type_name().to_string(),
        }
    }

    /// Walk the tree and report every `required` name missing from its
    /// parent's `properties`.
    pub fn dangling_required(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_dangling("", &mut out);
        out
    }

    fn collect_dangling(&self, path: &str, out: &mut Vec<String>) {
        match &self.kind {
            SchemaKind::Object {
                properties,
                required,
            } => {
                for name in required {
                    if !properties.contains_key(name) {
                        out.push(join_path(path, name));
                    }
                }
                for (name, node) in properties {
                    node.collect_dangling(&join_path(path, name), out);
                }
            }
            SchemaKind::Array(items) => items.collect_dangling(&format!("{path}[]"), out),
            SchemaKind::AnyOf(variants) => {
                for v in variants {
                    v.collect_dangling(path, out);
                }
            }
            _ => {}
        }
    }
}

fn validate_object(
    properties: &BTreeMap<String, SchemaNode>,
    required: &[String],
    obj: &Map<String, Value>,
    path: &str,
) -> Result<(), ValidationError> {
    for name in required {
        if obj.get(name).map_or(true, Value::is_null) {
            return Err(ValidationError {
                path: join_path(path, name),
                message: "missing required argument".into(),
            });
        }
    }
    for (name, node) in properties {
        match obj.get(name) {
            // Optional fields may be sent as explicit nulls.
            None | Some(Value::Null) => {}
            Some(v) => node.validate_at(v, &join_path(path, name))?,
        }
    }
    Ok(())
}

fn is_integer(value: &Value) -> bool {
    value.is_i64() || value.is_u64() || value.as_f64().is_some_and(|f| f.fract() == 0.0)
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

fn json_type_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

/// Argument mismatch found by [`SchemaNode::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{path}`: {message}")]
pub struct ValidationError {
    /// Dotted path to the offending value (`countries[1]`), empty for the root.
    pub path: String,
    pub message: String,
}

impl ValidationError {
    fn type_mismatch(path: &str, expected: &str, got: &Value) -> Self {
        Self {
            path: if path.is_empty() { "arguments".into() } else { path.into() },
            message: format!("expected {expected}, got {}", json_type_of(got)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
