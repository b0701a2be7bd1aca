//! Query data model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One materialized result row: column label → scalar value
pub type Record = Map<String, Value>;

/// Opaque identifier of a submitted execution
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryHandle(String);

impl QueryHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A query as handed to the engine. Immutable once submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// SQL text
    pub query_text: String,
    /// Logical database the query runs against
    pub database: String,
    /// Where the engine writes its output
    pub output_location: String,
}

/// Execution state reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl ExecutionState {
    /// Returns the engine's name for this state
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionState::Queued => "QUEUED",
            ExecutionState::Running => "RUNNING",
            ExecutionState::Succeeded => "SUCCEEDED",
            ExecutionState::Failed => "FAILED",
            ExecutionState::Cancelled => "CANCELLED",
        }
    }

    /// SUCCEEDED, FAILED and CANCELLED never change again
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionState::Succeeded | ExecutionState::Failed | ExecutionState::Cancelled
        )
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "QUEUED" => Ok(ExecutionState::Queued),
            "RUNNING" => Ok(ExecutionState::Running),
            "SUCCEEDED" => Ok(ExecutionState::Succeeded),
            "FAILED" => Ok(ExecutionState::Failed),
            "CANCELLED" => Ok(ExecutionState::Cancelled),
            other => Err(format!("unknown execution state '{}'", other)),
        }
    }
}

/// Status of one execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStatus {
    pub state: ExecutionState,
    /// Engine-provided reason, set on failure or cancellation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_change_reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ExecutionStatus {
    /// Status with only a state, stamped now
    pub fn new(state: ExecutionState) -> Self {
        let now = Utc::now();
        Self {
            state,
            state_change_reason: None,
            submitted_at: now,
            completed_at: state.is_terminal().then_some(now),
        }
    }

    /// Attach a state change reason
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.state_change_reason = Some(reason.into());
        self
    }
}

/// Raw tabular output of an execution.
///
/// As the engine returns it, the first row repeats the column labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Column labels, in output order
    pub columns: Vec<String>,
    /// Rows including the leading header row; `None` cells are NULL
    pub rows: Vec<Vec<Option<String>>>,
}

impl ResultSet {
    /// Build a result set from labels and data rows, prepending the header row
    pub fn with_header(columns: Vec<String>, data: Vec<Vec<Option<String>>>) -> Self {
        let header = columns.iter().cloned().map(Some).collect();
        let mut rows = Vec::with_capacity(data.len() + 1);
        rows.push(header);
        rows.extend(data);
        Self { columns, rows }
    }

    /// Number of data rows (header excluded)
    pub fn data_row_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// Flatten into records: skip the header row, then zip each row's cells
    /// against the column labels. Row order is preserved; NULL cells become
    /// JSON null and surplus cells on either side are dropped.
    pub fn into_records(self) -> Vec<Record> {
        let columns = self.columns;
        self.rows
            .into_iter()
            .skip(1)
            .map(|row| {
                columns
                    .iter()
                    .zip(row)
                    .map(|(label, cell)| (label.clone(), cell.map(Value::String).unwrap_or(Value::Null)))
                    .collect::<Record>()
            })
            .collect()
    }
}
