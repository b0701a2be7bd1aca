//! Schema error types
//!
//! Error codes:
//! - SCHEMA_VALIDATION_FAILED: a record does not match its schema
//! - SCHEMA_INVALID_DEFINITION: the schema itself is malformed

use std::fmt;

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Record violates schema
    ValidationFailed,
    /// Schema definition is unusable
    InvalidDefinition,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::ValidationFailed => "SCHEMA_VALIDATION_FAILED",
            SchemaErrorCode::InvalidDefinition => "SCHEMA_INVALID_DEFINITION",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Validation failure details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDetails {
    /// Field path (e.g., "address.city")
    pub field: String,
    /// Expected type or condition
    pub expected: String,
    /// Actual value or type found
    pub actual: String,
}

impl ValidationDetails {
    pub fn new(field: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::new(field, "field to be present", "missing")
    }

    pub fn extra_field(field: impl Into<String>) -> Self {
        Self::new(field, "no undeclared fields", "extra field present")
    }

    pub fn type_mismatch(field: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::new(field, expected, actual)
    }

    pub fn null_value(field: impl Into<String>) -> Self {
        Self::new(field, "non-null value", "null")
    }
}

impl fmt::Display for ValidationDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field '{}': expected {}, got {}", self.field, self.expected, self.actual)
    }
}

/// Schema error type with full context
#[derive(Debug, Clone)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    schema_name: String,
    details: Option<ValidationDetails>,
}

impl SchemaError {
    /// Create a validation failed error
    pub fn validation_failed(schema_name: impl Into<String>, details: ValidationDetails) -> Self {
        let name = schema_name.into();
        Self {
            code: SchemaErrorCode::ValidationFailed,
            message: format!("Record does not match schema '{}': {}", name, details),
            schema_name: name,
            details: Some(details),
        }
    }

    /// Create an invalid definition error
    pub fn invalid_definition(schema_name: impl Into<String>, reason: impl Into<String>) -> Self {
        let name = schema_name.into();
        Self {
            code: SchemaErrorCode::InvalidDefinition,
            message: format!("Schema '{}' is invalid: {}", name, reason.into()),
            schema_name: name,
            details: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the name of the schema that rejected the record
    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    /// Returns validation details if applicable
    pub fn details(&self) -> Option<&ValidationDetails> {
        self.details.as_ref()
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
