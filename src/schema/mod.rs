//! Record schemas
//!
//! A schema declares the fields a stored record may carry. Validation runs
//! before every write and after every read, so both bad input and
//! corrupted objects are rejected.
//!
//! # Rules
//!
//! - Every record is a JSON object with a string `id`
//! - All required fields are present
//! - Strict schemas reject undeclared fields; open schemas accept them
//! - Field types match exactly, no coercion
//! - Null values are rejected

mod errors;
mod types;
mod validator;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, ValidationDetails};
pub use types::{FieldDef, FieldType, Schema, ID_FIELD};
pub use validator::SchemaValidator;
