//! Stream catalog model for ontotap.
//!
//! A catalog is a list of *streams*; each stream names a record type, its key
//! fields and a JSON-Schema-shaped field tree. The compiler never looks at raw
//! JSON: this crate turns every field declaration into an explicit
//! [`SchemaNode`] tree up front.
//!
//! Classification of a declaration (`"type"` may be a string or a list):
//! - `"null"` entries are dropped; the first remaining token decides;
//! - nothing left (or no `"type"` at all) means `string`;
//! - `"array"` keeps its `"items"` schema, unless it is absent or empty;
//! - `"object"` keeps its `"properties"` in declaration order.

use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Terminal field types, as named by JSON Schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarType {
    String,
    Integer,
    Boolean,
    Number,
    /// Any other token (`"date-time"`, `"any"`, ...); treated as a string downstream.
    Other(String),
}

impl ScalarType {
    pub fn from_token(token: &str) -> Self {
        match token {
            "string" => ScalarType::String,
            "integer" => ScalarType::Integer,
            "boolean" => ScalarType::Boolean,
            "number" => ScalarType::Number,
            other => ScalarType::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Scalar(ScalarType),
    /// Declared sub-fields, in declaration order (possibly empty).
    Object(Vec<Field>),
    /// Item schema; `None` when the declaration has no usable `"items"`.
    Array(Option<Box<SchemaNode>>),
}

impl SchemaNode {
    /// Build a node from a raw JSON Schema declaration.
    pub fn from_value(value: &Value) -> Self {
        match primary_type(value).as_deref() {
            None => SchemaNode::Scalar(ScalarType::String),
            Some("array") => {
                let items = value
                    .get("items")
                    .filter(|items| items.as_object().is_some_and(|m| !m.is_empty()))
                    .map(|items| Box::new(SchemaNode::from_value(items)));
                SchemaNode::Array(items)
            }
            Some("object") => SchemaNode::Object(fields_of(value)),
            Some(token) => SchemaNode::Scalar(ScalarType::from_token(token)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub node: SchemaNode,
}

impl Field {
    pub fn new(name: impl Into<String>, node: SchemaNode) -> Self {
        Self {
            name: name.into(),
            node,
        }
    }
}

/// First non-`null` token of a declaration's `"type"`.
pub fn primary_type(value: &Value) -> Option<String> {
    match value.get("type")? {
        Value::String(token) => (token != "null").then(|| token.clone()),
        Value::Array(tokens) => tokens
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null")
            .map(str::to_string),
        _ => None,
    }
}

fn fields_of(value: &Value) -> Vec<Field> {
    value
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .iter()
                .map(|(name, decl)| Field::new(name.clone(), SchemaNode::from_value(decl)))
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    /// `None` when the catalog entry has no `"stream"` name.
    pub name: Option<String>,
    pub key_properties: Vec<String>,
    pub fields: Vec<Field>,
}

impl Stream {
    pub fn is_key(&self, field_name: &str) -> bool {
        self.key_properties.iter().any(|k| k == field_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub streams: Vec<Stream>,
}

#[derive(Deserialize)]
struct RawCatalog {
    #[serde(default)]
    streams: Vec<RawStream>,
}

#[derive(Deserialize)]
struct RawStream {
    #[serde(default)]
    stream: Option<String>,
    #[serde(default)]
    key_properties: Vec<String>,
    #[serde(default)]
    schema: Value,
}

impl Catalog {
    pub fn from_json_str(text: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = serde_json::from_str(text)?;
        let streams: Vec<Stream> = raw
            .streams
            .into_iter()
            .map(|s| Stream {
                name: s.stream.filter(|n| !n.trim().is_empty()),
                key_properties: s.key_properties,
                fields: fields_of(&s.schema),
            })
            .collect();
        tracing::debug!(streams = streams.len(), "parsed catalog");
        Ok(Catalog { streams })
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
