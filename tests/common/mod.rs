//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use recordlake::config::ServiceConfig;
use recordlake::object_store::{MemoryBackend, ObjectStore};
use recordlake::query::{
    ExecutionState, ExecutionStatus, ManualClock, MirrorQueryEngine, PollPolicy, QueryEngine,
    QueryExecutor, QueryHandle, QueryRequest, QueryResult, ResultSet,
};
use serde_json::{json, Value};

/// Engine replaying a fixed status sequence; the last status repeats.
#[derive(Debug)]
pub struct ScriptedEngine {
    statuses: Mutex<VecDeque<ExecutionStatus>>,
    result: ResultSet,
    pub submitted: Mutex<Vec<QueryRequest>>,
    pub status_calls: Mutex<u32>,
    pub fetches: Mutex<u32>,
    pub stops: Mutex<u32>,
}

impl ScriptedEngine {
    pub fn new(states: &[ExecutionState], result: ResultSet) -> Self {
        Self::with_statuses(states.iter().map(|s| ExecutionStatus::new(*s)).collect(), result)
    }

    pub fn with_statuses(statuses: Vec<ExecutionStatus>, result: ResultSet) -> Self {
        Self {
            statuses: Mutex::new(statuses.into_iter().collect()),
            result,
            submitted: Mutex::new(Vec::new()),
            status_calls: Mutex::new(0),
            fetches: Mutex::new(0),
            stops: Mutex::new(0),
        }
    }

    pub fn status_calls(&self) -> u32 {
        *self.status_calls.lock().unwrap()
    }

    pub fn fetches(&self) -> u32 {
        *self.fetches.lock().unwrap()
    }

    pub fn stops(&self) -> u32 {
        *self.stops.lock().unwrap()
    }
}

impl QueryEngine for ScriptedEngine {
    fn submit(&self, request: &QueryRequest) -> QueryResult<QueryHandle> {
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push(request.clone());
        Ok(QueryHandle::new(format!("exec-{}", submitted.len())))
    }

    fn status(&self, _handle: &QueryHandle) -> QueryResult<ExecutionStatus> {
        *self.status_calls.lock().unwrap() += 1;
        let mut statuses = self.statuses.lock().unwrap();
        if statuses.len() > 1 {
            Ok(statuses.pop_front().unwrap())
        } else {
            Ok(statuses.front().cloned().unwrap())
        }
    }

    fn results(&self, _handle: &QueryHandle) -> QueryResult<ResultSet> {
        *self.fetches.lock().unwrap() += 1;
        Ok(self.result.clone())
    }

    fn stop(&self, _handle: &QueryHandle) -> QueryResult<()> {
        *self.stops.lock().unwrap() += 1;
        Ok(())
    }
}

/// Result set with a header row followed by `rows`
pub fn result_set(columns: &[&str], rows: &[&[&str]]) -> ResultSet {
    ResultSet::with_header(
        columns.iter().map(|c| c.to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|cell| Some(cell.to_string())).collect())
            .collect(),
    )
}

pub fn test_config() -> ServiceConfig {
    ServiceConfig {
        bucket: "user-records".into(),
        results_bucket: "query-results".into(),
        ..Default::default()
    }
}

/// In-memory store plus a mirror-backed executor on a virtual clock
pub fn mirror_stack() -> (Arc<MemoryBackend>, QueryExecutor, Arc<ManualClock>) {
    let store = Arc::new(MemoryBackend::new());
    let engine = Arc::new(MirrorQueryEngine::new(
        store.clone() as Arc<dyn ObjectStore>,
        "query-results",
    ));
    let clock = Arc::new(ManualClock::new());
    let executor = QueryExecutor::new(engine, "query-results")
        .with_policy(PollPolicy::every(Duration::from_secs(1)))
        .with_clock(clock.clone());
    (store, executor, clock)
}

pub fn ada() -> Value {
    json!({
        "first_name": "Ada",
        "last_name": "Lovelace",
        "birthday": "1815-12-10"
    })
}

pub fn grace() -> Value {
    json!({
        "first_name": "Grace",
        "last_name": "Hopper",
        "birthday": "1906-12-09"
    })
}
