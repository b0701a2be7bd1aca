//! Catalog mirror engine
//!
//! A local [`QueryEngine`] answering the statements this service issues by
//! reading the object store directly:
//!
//! - `CREATE DATABASE [IF NOT EXISTS] db [LOCATION '...']`
//! - `CREATE EXTERNAL TABLE [IF NOT EXISTS] [db.]table (col TYPE, ...) ... LOCATION 's3://bucket/prefix/'`
//! - `SELECT * FROM [db.]table`
//!
//! Catalog entries are persisted as JSON objects under `_catalog/` in the
//! catalog bucket, so they outlive the process. Executions live in memory.
//!
//! The first status check of an execution reports QUEUED and later ones
//! RUNNING until `latency_polls` checks have passed. Only then is the
//! statement applied and its final state reported, so a `stop` before that
//! point leaves the catalog untouched. With the default of one, an execution
//! goes from QUEUED straight to its final state.
//!
//! An execution is dropped once its results are fetched or its FAILED or
//! CANCELLED state has been reported. Executions stopped by the caller are
//! dropped at the next submit.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::object_store::{ObjectStore, StorageError};

use super::engine::QueryEngine;
use super::errors::{QueryError, QueryResult};
use super::types::{ExecutionState, ExecutionStatus, QueryHandle, QueryRequest, ResultSet};

/// Database that always exists
pub const DEFAULT_DATABASE: &str = "default";

const CATALOG_PREFIX: &str = "_catalog";

const CREATE_DATABASE_PATTERN: &str = r"(?is)^\s*CREATE\s+(?:DATABASE|SCHEMA)\s+(IF\s+NOT\s+EXISTS\s+)?`?(\w+)`?(?:\s+LOCATION\s+'([^']*)')?\s*;?\s*$";
const CREATE_TABLE_PATTERN: &str = r"(?is)^\s*CREATE\s+EXTERNAL\s+TABLE\s+(IF\s+NOT\s+EXISTS\s+)?(?:`?(\w+)`?\.)?`?(\w+)`?\s*\((.*?)\).*?\bLOCATION\s+'([^']*)'\s*;?\s*$";
const SELECT_ALL_PATTERN: &str = r"(?is)^\s*SELECT\s+\*\s+FROM\s+(?:`?(\w+)`?\.)?`?(\w+)`?\s*;?\s*$";

static CREATE_DATABASE: OnceLock<Result<Regex, String>> = OnceLock::new();
static CREATE_TABLE: OnceLock<Result<Regex, String>> = OnceLock::new();
static SELECT_ALL: OnceLock<Result<Regex, String>> = OnceLock::new();

fn pattern(cell: &'static OnceLock<Result<Regex, String>>, source: &str) -> Result<&'static Regex, String> {
    cell.get_or_init(|| Regex::new(source).map_err(|e| e.to_string()))
        .as_ref()
        .map_err(Clone::clone)
}

/// A statement the mirror understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    CreateDatabase {
        name: String,
        if_not_exists: bool,
        location: Option<String>,
    },
    CreateTable {
        database: Option<String>,
        name: String,
        if_not_exists: bool,
        columns: Vec<String>,
        location: String,
    },
    SelectAll {
        database: Option<String>,
        table: String,
    },
}

impl Statement {
    /// Parse SQL text. Identifiers are lowercased. Returns `Ok(None)` for
    /// anything outside the supported shapes.
    pub fn parse(sql: &str) -> Result<Option<Statement>, String> {
        if let Some(caps) = pattern(&CREATE_DATABASE, CREATE_DATABASE_PATTERN)?.captures(sql) {
            return Ok(Some(Statement::CreateDatabase {
                name: caps[2].to_lowercase(),
                if_not_exists: caps.get(1).is_some(),
                location: caps.get(3).map(|m| m.as_str().to_string()),
            }));
        }

        if let Some(caps) = pattern(&CREATE_TABLE, CREATE_TABLE_PATTERN)?.captures(sql) {
            let columns: Vec<String> = caps[4]
                .split(',')
                .filter_map(|def| def.split_whitespace().next())
                .map(|name| name.trim_matches('`').to_lowercase())
                .collect();
            if columns.is_empty() {
                return Ok(None);
            }

            return Ok(Some(Statement::CreateTable {
                database: caps.get(2).map(|m| m.as_str().to_lowercase()),
                name: caps[3].to_lowercase(),
                if_not_exists: caps.get(1).is_some(),
                columns,
                location: caps[5].to_string(),
            }));
        }

        if let Some(caps) = pattern(&SELECT_ALL, SELECT_ALL_PATTERN)?.captures(sql) {
            return Ok(Some(Statement::SelectAll {
                database: caps.get(1).map(|m| m.as_str().to_lowercase()),
                table: caps[2].to_lowercase(),
            }));
        }

        Ok(None)
    }
}

/// Split `s3://bucket/prefix` into bucket and prefix
pub fn parse_location(location: &str) -> Option<(String, String)> {
    let rest = location.strip_prefix("s3://")?;
    let (bucket, prefix) = match rest.split_once('/') {
        Some((bucket, prefix)) => (bucket, prefix),
        None => (rest, ""),
    };
    if bucket.is_empty() {
        return None;
    }
    Some((bucket.to_string(), prefix.to_string()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DatabaseEntry {
    name: String,
    #[serde(default)]
    location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TableEntry {
    database: String,
    name: String,
    columns: Vec<String>,
    location: String,
}

#[derive(Debug, Clone)]
enum Outcome {
    Pending(QueryRequest),
    Succeeded(ResultSet),
    Failed(String),
    Cancelled,
}

#[derive(Debug)]
struct Execution {
    status_calls: u32,
    outcome: Outcome,
    submitted_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl Execution {
    fn visible_state(&self) -> ExecutionState {
        match &self.outcome {
            Outcome::Pending(_) if self.status_calls <= 1 => ExecutionState::Queued,
            Outcome::Pending(_) => ExecutionState::Running,
            Outcome::Succeeded(_) => ExecutionState::Succeeded,
            Outcome::Failed(_) => ExecutionState::Failed,
            Outcome::Cancelled => ExecutionState::Cancelled,
        }
    }
}

/// Query engine mirroring object-store contents as tables
#[derive(Debug)]
pub struct MirrorQueryEngine {
    store: Arc<dyn ObjectStore>,
    catalog_bucket: String,
    latency_polls: u32,
    executions: Mutex<HashMap<String, Execution>>,
}

impl MirrorQueryEngine {
    /// Engine reading tables from `store`, keeping its catalog in `catalog_bucket`
    pub fn new(store: Arc<dyn ObjectStore>, catalog_bucket: impl Into<String>) -> Self {
        Self {
            store,
            catalog_bucket: catalog_bucket.into(),
            latency_polls: 1,
            executions: Mutex::new(HashMap::new()),
        }
    }

    /// Number of status checks answered QUEUED/RUNNING before the final state
    pub fn with_latency_polls(mut self, latency_polls: u32) -> Self {
        self.latency_polls = latency_polls;
        self
    }

    fn lock(&self) -> QueryResult<std::sync::MutexGuard<'_, HashMap<String, Execution>>> {
        self.executions
            .lock()
            .map_err(|_| QueryError::Engine("execution table lock poisoned".into()))
    }

    fn database_key(name: &str) -> String {
        format!("{}/databases/{}", CATALOG_PREFIX, name)
    }

    fn table_key(database: &str, name: &str) -> String {
        format!("{}/tables/{}/{}", CATALOG_PREFIX, database, name)
    }

    fn load_entry<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<Option<T>, String> {
        match self.store.get(&self.catalog_bucket, key) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| format!("HIVE_METASTORE_ERROR: corrupt catalog entry {}: {}", key, e)),
            Err(StorageError::ObjectNotFound { .. }) => Ok(None),
            Err(e) => Err(format!("HIVE_METASTORE_ERROR: {}", e)),
        }
    }

    fn store_entry<T: Serialize>(&self, key: &str, entry: &T) -> Result<(), String> {
        let bytes = serde_json::to_vec(entry).map_err(|e| format!("HIVE_METASTORE_ERROR: {}", e))?;
        self.store
            .put(&self.catalog_bucket, key, &bytes)
            .map_err(|e| format!("HIVE_METASTORE_ERROR: {}", e))
    }

    fn database_exists(&self, name: &str) -> Result<bool, String> {
        if name == DEFAULT_DATABASE {
            return Ok(true);
        }
        Ok(self.load_entry::<DatabaseEntry>(&Self::database_key(name))?.is_some())
    }

    fn evaluate(&self, request: &QueryRequest) -> Outcome {
        let statement = match Statement::parse(&request.query_text) {
            Ok(Some(statement)) => statement,
            Ok(None) => return Outcome::Failed("SYNTAX_ERROR: unsupported statement".into()),
            Err(e) => return Outcome::Failed(format!("INTERNAL_ERROR: {}", e)),
        };
        let current_database = request.database.to_lowercase();

        let result = match statement {
            Statement::CreateDatabase {
                name,
                if_not_exists,
                location,
            } => self.create_database(name, if_not_exists, location),
            Statement::CreateTable {
                database,
                name,
                if_not_exists,
                columns,
                location,
            } => self.create_table(
                database.unwrap_or(current_database),
                name,
                if_not_exists,
                columns,
                location,
            ),
            Statement::SelectAll { database, table } => {
                self.select_all(&database.unwrap_or(current_database), &table)
            }
        };

        match result {
            Ok(result_set) => Outcome::Succeeded(result_set),
            Err(reason) => Outcome::Failed(reason),
        }
    }

    fn create_database(
        &self,
        name: String,
        if_not_exists: bool,
        location: Option<String>,
    ) -> Result<ResultSet, String> {
        if self.database_exists(&name)? {
            if if_not_exists {
                return Ok(ResultSet::default());
            }
            return Err(format!("ALREADY_EXISTS: Database {} already exists", name));
        }

        self.store_entry(&Self::database_key(&name), &DatabaseEntry { name, location })?;
        Ok(ResultSet::default())
    }

    fn create_table(
        &self,
        database: String,
        name: String,
        if_not_exists: bool,
        columns: Vec<String>,
        location: String,
    ) -> Result<ResultSet, String> {
        if !self.database_exists(&database)? {
            return Err(format!("SCHEMA_NOT_FOUND: Database {} does not exist", database));
        }
        if parse_location(&location).is_none() {
            return Err(format!("INVALID_TABLE_PROPERTY: bad location '{}'", location));
        }

        let key = Self::table_key(&database, &name);
        if self.load_entry::<TableEntry>(&key)?.is_some() {
            if if_not_exists {
                return Ok(ResultSet::default());
            }
            return Err(format!("ALREADY_EXISTS: Table {}.{} already exists", database, name));
        }

        self.store_entry(
            &key,
            &TableEntry {
                database,
                name,
                columns,
                location,
            },
        )?;
        Ok(ResultSet::default())
    }

    fn select_all(&self, database: &str, table: &str) -> Result<ResultSet, String> {
        let entry: TableEntry = self
            .load_entry(&Self::table_key(database, table))?
            .ok_or_else(|| format!("TABLE_NOT_FOUND: Table {}.{} does not exist", database, table))?;

        let (bucket, prefix) = parse_location(&entry.location)
            .ok_or_else(|| format!("INVALID_TABLE_PROPERTY: bad location '{}'", entry.location))?;

        let objects = self
            .store
            .list(&bucket, &prefix)
            .map_err(|e| format!("HIVE_CANNOT_OPEN_SPLIT: {}", e))?;

        let mut rows = Vec::new();
        for summary in objects.into_iter().filter(|s| s.size > 0) {
            let bytes = self
                .store
                .get(&bucket, &summary.key)
                .map_err(|e| format!("HIVE_CANNOT_OPEN_SPLIT: {}", e))?;

            let value: Value = serde_json::from_slice(&bytes)
                .map_err(|e| format!("HIVE_BAD_DATA: {}: {}", summary.key, e))?;
            let object = value
                .as_object()
                .ok_or_else(|| format!("HIVE_BAD_DATA: {}: not a JSON object", summary.key))?;

            rows.push(entry.columns.iter().map(|column| cell(object.get(column))).collect());
        }

        Ok(ResultSet::with_header(entry.columns, rows))
    }
}

/// Render one JSON value as a result cell
fn cell(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

fn unknown_handle(handle: &QueryHandle) -> QueryError {
    QueryError::Engine(format!("unknown query execution {}", handle))
}

impl QueryEngine for MirrorQueryEngine {
    fn submit(&self, request: &QueryRequest) -> QueryResult<QueryHandle> {
        let handle = QueryHandle::new(Uuid::new_v4().to_string());

        let mut executions = self.lock()?;
        executions.retain(|_, execution| !matches!(execution.outcome, Outcome::Cancelled));
        executions.insert(
            handle.as_str().to_string(),
            Execution {
                status_calls: 0,
                outcome: Outcome::Pending(request.clone()),
                submitted_at: Utc::now(),
                completed_at: None,
            },
        );
        Ok(handle)
    }

    fn status(&self, handle: &QueryHandle) -> QueryResult<ExecutionStatus> {
        let mut executions = self.lock()?;
        let execution = executions
            .get_mut(handle.as_str())
            .ok_or_else(|| unknown_handle(handle))?;

        execution.status_calls += 1;
        if execution.status_calls > self.latency_polls {
            if let Outcome::Pending(request) = &execution.outcome {
                let request = request.clone();
                execution.outcome = self.evaluate(&request);
            }
        }

        let state = execution.visible_state();
        if state.is_terminal() && execution.completed_at.is_none() {
            execution.completed_at = Some(Utc::now());
        }

        let state_change_reason = match &execution.outcome {
            Outcome::Failed(reason) => Some(reason.clone()),
            Outcome::Cancelled => Some("Query cancelled by user".to_string()),
            _ => None,
        };

        let status = ExecutionStatus {
            state,
            state_change_reason,
            submitted_at: execution.submitted_at,
            completed_at: execution.completed_at,
        };

        if matches!(state, ExecutionState::Failed | ExecutionState::Cancelled) {
            executions.remove(handle.as_str());
        }
        Ok(status)
    }

    fn results(&self, handle: &QueryHandle) -> QueryResult<ResultSet> {
        let mut executions = self.lock()?;
        let state = executions
            .get(handle.as_str())
            .ok_or_else(|| unknown_handle(handle))?
            .visible_state();

        if state != ExecutionState::Succeeded {
            return Err(QueryError::Engine(format!(
                "Query has not succeeded. Current state: {}",
                state
            )));
        }

        match executions.remove(handle.as_str()) {
            Some(Execution {
                outcome: Outcome::Succeeded(result_set),
                ..
            }) => Ok(result_set),
            _ => Err(unknown_handle(handle)),
        }
    }

    fn stop(&self, handle: &QueryHandle) -> QueryResult<()> {
        let mut executions = self.lock()?;
        let execution = executions
            .get_mut(handle.as_str())
            .ok_or_else(|| unknown_handle(handle))?;

        if matches!(execution.outcome, Outcome::Pending(_)) {
            execution.outcome = Outcome::Cancelled;
            execution.completed_at = Some(Utc::now());
        }
        Ok(())
    }
}
