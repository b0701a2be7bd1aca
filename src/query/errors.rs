//! Query execution errors

use thiserror::Error;

use super::types::QueryHandle;

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Query execution errors
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    /// The engine reported FAILED
    #[error("Query execution {handle} failed: {reason}")]
    ExecutionFailed { handle: QueryHandle, reason: String },

    /// The execution was cancelled, by the engine or by the caller
    #[error("Query execution {0} was cancelled")]
    Cancelled(QueryHandle),

    /// The poll budget ran out before a terminal state was seen
    #[error("Query execution {handle} did not finish after {attempts} status checks")]
    TimedOut { handle: QueryHandle, attempts: u32 },

    /// Transport or request error raised by the engine itself
    #[error("Query engine error: {0}")]
    Engine(String),
}

impl QueryError {
    /// Handle of the execution the error refers to, if any
    pub fn handle(&self) -> Option<&QueryHandle> {
        match self {
            QueryError::ExecutionFailed { handle, .. } => Some(handle),
            QueryError::Cancelled(handle) => Some(handle),
            QueryError::TimedOut { handle, .. } => Some(handle),
            QueryError::Engine(_) => None,
        }
    }
}
