//! Query engine boundary

use super::errors::QueryResult;
use super::types::{ExecutionStatus, QueryHandle, QueryRequest, ResultSet};

/// A managed SQL-over-object-storage query engine.
///
/// Submission does not block; the returned handle is the only key for
/// later status and result calls.
pub trait QueryEngine: Send + Sync + std::fmt::Debug {
    /// Start an execution
    fn submit(&self, request: &QueryRequest) -> QueryResult<QueryHandle>;

    /// Current status of an execution
    fn status(&self, handle: &QueryHandle) -> QueryResult<ExecutionStatus>;

    /// Full result set of a succeeded execution
    fn results(&self, handle: &QueryHandle) -> QueryResult<ResultSet>;

    /// Ask the engine to stop a running execution. Stopping a finished
    /// execution is a no-op.
    fn stop(&self, handle: &QueryHandle) -> QueryResult<()>;
}
