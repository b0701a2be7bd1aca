//! Query execution against a SQL-over-object-storage engine
//!
//! A query is submitted, its execution is polled until it reaches a
//! terminal state, and on success the tabular result is flattened into
//! records keyed by column label.
//!
//! # Protocol
//!
//! ```text
//! submit ──► handle ──► status ─┬─ QUEUED/RUNNING ─► sleep(interval) ─► status ...
//!                               ├─ SUCCEEDED ─► results ─► skip header ─► records
//!                               ├─ FAILED ─► QueryExecutionFailed (no fetch)
//!                               └─ CANCELLED ─► QueryCancelled (no fetch)
//! ```
//!
//! The poll loop is bounded by an optional attempt budget and deadline and
//! honours a cancellation token; time is read through an injectable clock.

mod engine;
mod errors;
mod executor;
mod mirror;
mod poller;
mod types;

pub use engine::QueryEngine;
pub use errors::{QueryError, QueryResult};
pub use executor::{output_token, QueryExecutor};
pub use mirror::{parse_location, MirrorQueryEngine, Statement, DEFAULT_DATABASE};
pub use poller::{await_terminal, CancellationToken, Clock, ManualClock, PollPolicy, SystemClock};
pub use types::{ExecutionState, ExecutionStatus, QueryHandle, QueryRequest, Record, ResultSet};
