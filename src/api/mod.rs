//! Request boundary
//!
//! Turns gateway-style events into record and query operations and wraps
//! every outcome in a `{statusCode, body}` envelope.
//!
//! # Operations
//!
//! - get: read one record by path id
//! - post: create a record from the body
//! - put: patch the record at the path id
//! - delete: remove the record at the path id
//! - list: every record, read from the object store
//! - all: every record, through the query engine
//!
//! Success answers 200 with the JSON result. Any failure answers 500 with
//! the error message.

mod errors;
mod handler;
mod request;
mod response;

pub use errors::{ApiError, ApiErrorKind, ApiResult};
pub use handler::RecordApi;
pub use request::{ApiRequest, Operation};
pub use response::{respond, ApiResponse};
