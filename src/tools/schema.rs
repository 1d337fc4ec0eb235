//! JSON-schema synthesis for declarative tool argument tables.

use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no schema mapping for declared type '{declared}' (tool '{tool}', argument '{argument}')")]
    UnmappedType {
        tool: String,
        argument: String,
        declared: String,
    },
}

/// JSON-schema primitive type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    Null,
}

impl SchemaType {
    pub fn as_str(self) -> &'static str {
        match self {
            SchemaType::String => "string",
            SchemaType::Integer => "integer",
            SchemaType::Number => "number",
            SchemaType::Boolean => "boolean",
            SchemaType::Array => "array",
            SchemaType::Object => "object",
            SchemaType::Null => "null",
        }
    }

    /// Map a declared argument type tag to its schema type. The table is
    /// fixed; an empty declaration defaults to string, and an unknown tag is
    /// a developer error surfaced at registration time rather than a runtime
    /// condition to recover from.
    pub fn from_declared(declared: &str) -> Option<SchemaType> {
        match declared {
            "" | "str" | "string" | "text" => Some(SchemaType::String),
            "int" | "integer" => Some(SchemaType::Integer),
            "float" | "number" => Some(SchemaType::Number),
            "bool" | "boolean" => Some(SchemaType::Boolean),
            "list" | "array" => Some(SchemaType::Array),
            "dict" | "object" | "map" => Some(SchemaType::Object),
            "none" | "null" => Some(SchemaType::Null),
            _ => None,
        }
    }
}

/// Declarative argument table entry: name, declared type tag, description.
#[derive(Debug, Clone)]
pub struct ArgSpec {
    pub name: String,
    pub declared: String,
    pub description: String,
}

impl ArgSpec {
    pub fn new(
        name: impl Into<String>,
        declared: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            declared: declared.into(),
            description: description.into(),
        }
    }
}

/// Everything the catalog needs to describe one action to the model.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub args: Vec<ArgSpec>,
}

/// Build the wire-format schema entry for one tool spec. All arguments are
/// optional by convention, so `required` is always empty.
pub fn build_schema(spec: &ToolSpec) -> Result<Value, CatalogError> {
    let mut properties = serde_json::Map::new();
    for arg in &spec.args {
        let schema_type =
            SchemaType::from_declared(&arg.declared).ok_or_else(|| CatalogError::UnmappedType {
                tool: spec.name.clone(),
                argument: arg.name.clone(),
                declared: arg.declared.clone(),
            })?;
        properties.insert(
            arg.name.clone(),
            json!({ "type": schema_type.as_str(), "description": arg.description }),
        );
    }

    Ok(json!({
        "type": "function",
        "function": {
            "name": spec.name,
            "description": spec.description,
            "parameters": {
                "type": "object",
                "properties": Value::Object(properties),
            },
            "required": [],
        }
    }))
}
