//! Record store errors

use thiserror::Error;

use crate::object_store::StorageError;
use crate::schema::SchemaError;

/// Result type for record operations
pub type RecordResult<T> = Result<T, RecordError>;

/// Record store errors
#[derive(Debug, Clone, Error)]
pub enum RecordError {
    #[error("{0}")]
    Validation(#[from] SchemaError),

    #[error("Record {id} not found in {collection}")]
    NotFound { collection: String, id: String },

    #[error("{0}")]
    ConflictingInput(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid record id '{0}'")]
    InvalidId(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RecordError {
    pub fn not_found(collection: &str, id: &str) -> Self {
        RecordError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}
