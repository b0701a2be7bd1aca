//! Schema type definitions
//!
//! Supported types:
//! - string: UTF-8 string
//! - int: 64-bit signed integer
//! - bool: Boolean
//! - float: 64-bit floating point
//! - object: Nested object with field schema
//! - array: Homogeneous array with element type

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Name of the identifier field every record carries
pub const ID_FIELD: &str = "id";

/// Supported field types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldType {
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Int,
    /// Boolean
    Bool,
    /// 64-bit floating point
    Float,
    /// Nested object with its own field schema
    Object {
        /// Nested field definitions
        fields: HashMap<String, FieldDef>,
    },
    /// Homogeneous array with single element type
    Array {
        /// Element type (boxed to allow recursive types)
        #[serde(rename = "element_type")]
        element_type: Box<FieldType>,
    },
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Bool => "bool",
            FieldType::Float => "float",
            FieldType::Object { .. } => "object",
            FieldType::Array { .. } => "array",
        }
    }

    /// Column type used when the field is exposed as a query-engine table column
    pub fn column_type(&self) -> &'static str {
        match self {
            FieldType::String => "STRING",
            FieldType::Int => "BIGINT",
            FieldType::Bool => "BOOLEAN",
            FieldType::Float => "DOUBLE",
            // Nested values are surfaced as their JSON text
            FieldType::Object { .. } | FieldType::Array { .. } => "STRING",
        }
    }
}

/// Field definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field data type
    #[serde(flatten)]
    pub field_type: FieldType,
    /// Whether field must be present
    pub required: bool,
}

impl FieldDef {
    /// Create a required string field
    pub fn required_string() -> Self {
        Self {
            field_type: FieldType::String,
            required: true,
        }
    }

    /// Create an optional string field
    pub fn optional_string() -> Self {
        Self {
            field_type: FieldType::String,
            required: false,
        }
    }

    /// Create a required int field
    pub fn required_int() -> Self {
        Self {
            field_type: FieldType::Int,
            required: true,
        }
    }

    /// Create an optional int field
    pub fn optional_int() -> Self {
        Self {
            field_type: FieldType::Int,
            required: false,
        }
    }

    /// Create a required bool field
    pub fn required_bool() -> Self {
        Self {
            field_type: FieldType::Bool,
            required: true,
        }
    }

    /// Create a required float field
    pub fn required_float() -> Self {
        Self {
            field_type: FieldType::Float,
            required: true,
        }
    }

    /// Create a required object field
    pub fn required_object(fields: HashMap<String, FieldDef>) -> Self {
        Self {
            field_type: FieldType::Object { fields },
            required: true,
        }
    }

    /// Create a required array field
    pub fn required_array(element_type: FieldType) -> Self {
        Self {
            field_type: FieldType::Array {
                element_type: Box::new(element_type),
            },
            required: true,
        }
    }
}

/// Schema of one kind of record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Schema name, used in error messages
    pub name: String,
    /// Field definitions
    pub fields: HashMap<String, FieldDef>,
    /// Whether fields not declared in `fields` are accepted
    #[serde(default)]
    pub open: bool,
}

impl Schema {
    /// Create a strict schema: undeclared fields are rejected
    pub fn new(name: impl Into<String>, fields: HashMap<String, FieldDef>) -> Self {
        Self {
            name: name.into(),
            fields,
            open: false,
        }
    }

    /// Create an open schema that only requires a string `id`
    pub fn open(name: impl Into<String>) -> Self {
        let mut fields = HashMap::new();
        fields.insert(ID_FIELD.to_string(), FieldDef::required_string());
        Self {
            name: name.into(),
            fields,
            open: true,
        }
    }

    /// Field names in column order: `id` first, the rest sorted by name
    pub fn column_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .fields
            .keys()
            .map(String::as_str)
            .filter(|name| *name != ID_FIELD)
            .collect();
        names.sort_unstable();
        if self.fields.contains_key(ID_FIELD) {
            names.insert(0, ID_FIELD);
        }
        names
    }

    /// Validates the schema structure itself (not a record)
    pub fn validate_structure(&self) -> Result<(), String> {
        let id_field = self
            .fields
            .get(ID_FIELD)
            .ok_or_else(|| format!("Schema must define an '{}' field", ID_FIELD))?;

        if !id_field.required {
            return Err(format!("'{}' field must be required", ID_FIELD));
        }

        if id_field.field_type != FieldType::String {
            return Err(format!("'{}' field must be a string", ID_FIELD));
        }

        Ok(())
    }
}
