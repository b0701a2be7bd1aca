//! Record API handler
//!
//! One method per operation. Every method returns the JSON result;
//! [`RecordApi::handle`] wraps it in the response envelope.

use serde_json::Value;

use crate::catalog::select_all_sql;
use crate::query::QueryExecutor;
use crate::records::RecordStore;

use super::errors::ApiResult;
use super::request::{ApiRequest, Operation};
use super::response::{respond, ApiResponse};

/// Request handler for one model
#[derive(Debug, Clone)]
pub struct RecordApi {
    records: RecordStore,
    executor: QueryExecutor,
    database: String,
}

impl RecordApi {
    pub fn new(records: RecordStore, executor: QueryExecutor, database: impl Into<String>) -> Self {
        Self {
            records,
            executor,
            database: database.into(),
        }
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    /// Run `op` and wrap the outcome in the response envelope
    pub fn handle(&self, op: Operation, request: &ApiRequest) -> ApiResponse {
        respond(self.dispatch(op, request))
    }

    /// Run `op`, returning the raw result
    pub fn dispatch(&self, op: Operation, request: &ApiRequest) -> ApiResult<Value> {
        match op {
            Operation::Get => self.get(request),
            Operation::Post => self.post(request),
            Operation::Put => self.put(request),
            Operation::Delete => self.delete(request),
            Operation::List => self.list(request),
            Operation::All => self.all(request),
        }
    }

    pub fn get(&self, request: &ApiRequest) -> ApiResult<Value> {
        Ok(self.records.read(request.require_id()?)?)
    }

    pub fn post(&self, request: &ApiRequest) -> ApiResult<Value> {
        Ok(self.records.create(request.json_body()?)?)
    }

    pub fn put(&self, request: &ApiRequest) -> ApiResult<Value> {
        let id = request.require_id()?;
        Ok(self.records.update(id, request.json_body()?)?)
    }

    pub fn delete(&self, request: &ApiRequest) -> ApiResult<Value> {
        Ok(self.records.delete(request.require_id()?)?)
    }

    /// Every record, loaded and validated from the object store
    pub fn list(&self, _request: &ApiRequest) -> ApiResult<Value> {
        Ok(Value::Array(self.records.list()?))
    }

    /// Every record as the query engine sees it; cells come back as strings
    pub fn all(&self, _request: &ApiRequest) -> ApiResult<Value> {
        let sql = select_all_sql(&self.database, self.records.model().table());
        let rows = self.executor.execute(&sql, &self.database)?;
        Ok(Value::Array(rows.into_iter().map(Value::Object).collect()))
    }
}
