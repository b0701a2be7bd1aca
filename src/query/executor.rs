//! Query executor: submit, poll, fetch, flatten

use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::info;

use crate::observability::Event;

use super::engine::QueryEngine;
use super::errors::QueryResult;
use super::poller::{await_terminal, CancellationToken, Clock, PollPolicy, SystemClock};
use super::types::{QueryHandle, QueryRequest, Record};

/// Number of hash bytes used in the output location token
const OUTPUT_TOKEN_BYTES: usize = 16;

/// Output location token for a query: hex of the leading bytes of the
/// SHA-256 of its text.
///
/// The token is deterministic. Re-running a query, or running two identical
/// queries concurrently, targets the same output location; nothing reads
/// that location back, so results are always fetched fresh from the engine.
pub fn output_token(query_text: &str) -> String {
    let digest = Sha256::digest(query_text.as_bytes());
    digest[..OUTPUT_TOKEN_BYTES]
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Runs queries on an engine and materializes their results.
///
/// Every call blocks until the execution is terminal, its budget runs out,
/// or the caller's token is cancelled.
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    engine: Arc<dyn QueryEngine>,
    results_bucket: String,
    policy: PollPolicy,
    clock: Arc<dyn Clock>,
}

impl QueryExecutor {
    /// Executor with the default policy (1s interval, unbounded) and wall clock
    pub fn new(engine: Arc<dyn QueryEngine>, results_bucket: impl Into<String>) -> Self {
        Self {
            engine,
            results_bucket: results_bucket.into(),
            policy: PollPolicy::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    pub fn engine(&self) -> &Arc<dyn QueryEngine> {
        &self.engine
    }

    /// Where the engine is told to write the output of `query_text`
    pub fn output_location(&self, query_text: &str) -> String {
        format!("s3://{}/{}", self.results_bucket, output_token(query_text))
    }

    /// Run `query_text` against `database` and return its rows as records
    pub fn execute(&self, query_text: &str, database: &str) -> QueryResult<Vec<Record>> {
        self.execute_with_cancel(query_text, database, &CancellationToken::new())
    }

    /// Like [`execute`](Self::execute), abandoning the wait once `cancel` is set
    pub fn execute_with_cancel(
        &self,
        query_text: &str,
        database: &str,
        cancel: &CancellationToken,
    ) -> QueryResult<Vec<Record>> {
        let handle = self.submit(query_text, database)?;
        self.await_and_fetch_with_cancel(&handle, cancel)
    }

    /// Submit without waiting
    pub fn submit(&self, query_text: &str, database: &str) -> QueryResult<QueryHandle> {
        let request = QueryRequest {
            query_text: query_text.to_string(),
            database: database.to_string(),
            output_location: self.output_location(query_text),
        };

        let handle = self.engine.submit(&request)?;
        info!(
            event = %Event::QuerySubmitted,
            handle = %handle,
            database = %request.database,
            output_location = %request.output_location,
        );
        Ok(handle)
    }

    /// Wait for `handle` to finish and return its rows as records
    pub fn await_and_fetch(&self, handle: &QueryHandle) -> QueryResult<Vec<Record>> {
        self.await_and_fetch_with_cancel(handle, &CancellationToken::new())
    }

    pub fn await_and_fetch_with_cancel(
        &self,
        handle: &QueryHandle,
        cancel: &CancellationToken,
    ) -> QueryResult<Vec<Record>> {
        await_terminal(
            self.engine.as_ref(),
            handle,
            &self.policy,
            self.clock.as_ref(),
            cancel,
        )?;

        let result_set = self.engine.results(handle)?;
        let records = result_set.into_records();
        info!(event = %Event::ResultsFetched, handle = %handle, rows = records.len());
        Ok(records)
    }
}
