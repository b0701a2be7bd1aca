//! API error types
//!
//! Every subsystem error is classified into an [`ApiErrorKind`]; the
//! message is passed through unchanged.

use std::fmt;

use crate::config::ConfigError;
use crate::query::QueryError;
use crate::records::RecordError;

/// Classification of request failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Record does not match its schema
    SchemaValidation,
    /// Record absent
    NotFound,
    /// Query engine reported failure
    QueryExecutionFailed,
    /// Input contradicts the operation
    ConflictingInput,
    /// Query cancelled
    QueryCancelled,
    /// Query poll budget exhausted
    QueryTimedOut,
    /// Missing path id, missing or unparseable body
    InvalidRequest,
    /// Object store failure
    Storage,
    /// Query engine transport failure
    Engine,
    /// Service misconfigured
    Config,
}

impl ApiErrorKind {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ApiErrorKind::SchemaValidation => "SCHEMA_VALIDATION_ERROR",
            ApiErrorKind::NotFound => "NOT_FOUND",
            ApiErrorKind::QueryExecutionFailed => "QUERY_EXECUTION_FAILED",
            ApiErrorKind::ConflictingInput => "CONFLICTING_INPUT",
            ApiErrorKind::QueryCancelled => "QUERY_CANCELLED",
            ApiErrorKind::QueryTimedOut => "QUERY_TIMED_OUT",
            ApiErrorKind::InvalidRequest => "INVALID_REQUEST",
            ApiErrorKind::Storage => "STORAGE_ERROR",
            ApiErrorKind::Engine => "ENGINE_ERROR",
            ApiErrorKind::Config => "CONFIG_ERROR",
        }
    }

    /// HTTP status reported for this kind
    pub fn status_code(&self) -> u16 {
        match self {
            ApiErrorKind::SchemaValidation => 500,
            ApiErrorKind::NotFound => 500,
            ApiErrorKind::QueryExecutionFailed => 500,
            ApiErrorKind::ConflictingInput => 500,
            ApiErrorKind::QueryCancelled => 500,
            ApiErrorKind::QueryTimedOut => 500,
            ApiErrorKind::InvalidRequest => 500,
            ApiErrorKind::Storage => 500,
            ApiErrorKind::Engine => 500,
            ApiErrorKind::Config => 500,
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A classified request failure
#[derive(Debug, Clone)]
pub struct ApiError {
    kind: ApiErrorKind,
    message: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::InvalidRequest, reason)
    }

    pub fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        let kind = match &err {
            RecordError::Validation(_) => ApiErrorKind::SchemaValidation,
            RecordError::NotFound { .. } => ApiErrorKind::NotFound,
            RecordError::ConflictingInput(_) => ApiErrorKind::ConflictingInput,
            RecordError::InvalidInput(_) | RecordError::InvalidId(_) => ApiErrorKind::InvalidRequest,
            RecordError::Storage(_) | RecordError::Serialization(_) => ApiErrorKind::Storage,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        let kind = match &err {
            QueryError::ExecutionFailed { .. } => ApiErrorKind::QueryExecutionFailed,
            QueryError::Cancelled(_) => ApiErrorKind::QueryCancelled,
            QueryError::TimedOut { .. } => ApiErrorKind::QueryTimedOut,
            QueryError::Engine(_) => ApiErrorKind::Engine,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        Self::new(ApiErrorKind::Config, err.to_string())
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
