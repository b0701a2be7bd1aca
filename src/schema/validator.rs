//! Record validator
//!
//! Validation semantics:
//! - The record is a JSON object
//! - `id` is present and a string
//! - All required fields are present
//! - Strict schemas: no undeclared fields exist
//! - Field types exactly match schema types
//!
//! Forbidden: implicit type coercion, default values, null values.

use serde_json::{Map, Value};
use std::collections::HashMap;

use super::errors::{SchemaError, SchemaResult, ValidationDetails};
use super::types::{FieldDef, FieldType, Schema, ID_FIELD};

/// Validator enforcing one schema on records.
///
/// The validator never mutates records and is deterministic.
pub struct SchemaValidator<'a> {
    schema: &'a Schema,
}

impl<'a> SchemaValidator<'a> {
    /// Creates a validator for the given schema.
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Validates a record against the schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` (SCHEMA_VALIDATION_FAILED) naming the first
    /// offending field.
    pub fn validate(&self, record: &Value) -> SchemaResult<()> {
        let obj = record.as_object().ok_or_else(|| {
            self.failure(ValidationDetails::type_mismatch("$root", "object", json_type_name(record)))
        })?;

        match obj.get(ID_FIELD) {
            None => return Err(self.failure(ValidationDetails::missing_field(ID_FIELD))),
            Some(id) if !id.is_string() => {
                return Err(self.failure(ValidationDetails::type_mismatch(
                    ID_FIELD,
                    "string",
                    json_type_name(id),
                )))
            }
            Some(_) => {}
        }

        self.validate_object(obj, &self.schema.fields, "", self.schema.open)
    }

    fn failure(&self, details: ValidationDetails) -> SchemaError {
        SchemaError::validation_failed(&self.schema.name, details)
    }

    /// Validates an object against field definitions.
    ///
    /// Openness only applies at the top level; nested objects are strict.
    fn validate_object(
        &self,
        obj: &Map<String, Value>,
        fields: &HashMap<String, FieldDef>,
        path_prefix: &str,
        open: bool,
    ) -> SchemaResult<()> {
        if !open {
            // Sorted so the reported field is deterministic
            let mut keys: Vec<&String> = obj.keys().collect();
            keys.sort();
            if let Some(extra) = keys.into_iter().find(|key| !fields.contains_key(*key)) {
                return Err(self.failure(ValidationDetails::extra_field(make_path(path_prefix, extra))));
            }
        }

        let mut names: Vec<&String> = fields.keys().collect();
        names.sort();

        for field_name in names {
            let field_def = &fields[field_name];
            let field_path = make_path(path_prefix, field_name);

            match obj.get(field_name) {
                Some(Value::Null) => {
                    return Err(self.failure(ValidationDetails::null_value(&field_path)));
                }
                Some(value) => {
                    self.validate_value(value, &field_def.field_type, &field_path)?;
                }
                None if field_def.required => {
                    return Err(self.failure(ValidationDetails::missing_field(field_path)));
                }
                None => {}
            }
        }

        Ok(())
    }

    /// Validates a value against a field type.
    fn validate_value(&self, value: &Value, expected_type: &FieldType, field_path: &str) -> SchemaResult<()> {
        let matches = match expected_type {
            FieldType::String => value.is_string(),
            // Must be an integer (not a float)
            FieldType::Int => value.is_i64() || value.is_u64(),
            FieldType::Bool => value.is_boolean(),
            // Accept both integers and floats as float
            FieldType::Float => value.is_number(),
            FieldType::Object { fields } => {
                let obj = value.as_object().ok_or_else(|| self.type_error(field_path, "object", value))?;
                return self.validate_object(obj, fields, field_path, false);
            }
            FieldType::Array { element_type } => {
                let arr = value.as_array().ok_or_else(|| self.type_error(field_path, "array", value))?;

                for (i, elem) in arr.iter().enumerate() {
                    let elem_path = format!("{}[{}]", field_path, i);

                    if elem.is_null() {
                        return Err(self.failure(ValidationDetails::null_value(&elem_path)));
                    }

                    self.validate_value(elem, element_type, &elem_path)?;
                }
                return Ok(());
            }
        };

        if matches {
            Ok(())
        } else {
            Err(self.type_error(field_path, expected_type.type_name(), value))
        }
    }

    fn type_error(&self, field_path: &str, expected: &str, actual: &Value) -> SchemaError {
        self.failure(ValidationDetails::type_mismatch(field_path, expected, json_type_name(actual)))
    }
}

/// Returns the JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Creates a field path from prefix and field name.
fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}
