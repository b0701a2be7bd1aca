//! Catalog Mirror Tests
//!
//! Catalog bootstrap against the mirror engine:
//! - init_schema is idempotent
//! - afterwards SELECT * returns exactly the stored records
//! - the catalog survives a fresh engine over the same store

mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use common::{ada, grace, mirror_stack, test_config};
use recordlake::catalog::{create_table_sql, init_schema, select_all_sql};
use recordlake::object_store::{LocalBackend, ObjectStore};
use recordlake::query::{
    ManualClock, MirrorQueryEngine, PollPolicy, QueryError, QueryExecutor,
};
use recordlake::records::{Model, RecordStore};
use serde_json::Value;
use tempfile::TempDir;

fn ids(records: &[Value]) -> HashSet<String> {
    records
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_init_schema_is_idempotent() {
    let (_store, executor, clock) = mirror_stack();
    let config = test_config();

    let (db_rows, table_rows) = init_schema(&executor, &config, &Model::user()).unwrap();
    assert!(db_rows.is_empty());
    assert!(table_rows.is_empty());

    init_schema(&executor, &config, &Model::user()).unwrap();

    // one QUEUED status per statement with the default latency
    assert_eq!(clock.sleep_count(), 4);
}

#[test]
fn test_select_returns_exactly_stored_records() {
    let (store, executor, _clock) = mirror_stack();
    let config = test_config();
    init_schema(&executor, &config, &Model::user()).unwrap();

    let records = RecordStore::new(store.clone(), config.bucket.clone(), Model::user());
    let created = vec![records.create(ada()).unwrap(), records.create(grace()).unwrap()];
    store.put(&config.bucket, "user/empty-marker", b"").unwrap();

    let sql = select_all_sql(&config.database_name(), "users");
    let rows: Vec<Value> = executor
        .execute(&sql, &config.database_name())
        .unwrap()
        .into_iter()
        .map(Value::Object)
        .collect();

    assert_eq!(rows.len(), 2);
    assert_eq!(ids(&rows), ids(&created));
    for row in &rows {
        let original = created.iter().find(|c| c["id"] == row["id"]).unwrap();
        assert_eq!(row, original);
    }
}

#[test]
fn test_select_before_init_fails() {
    let (_store, executor, _clock) = mirror_stack();
    let err = executor.execute("SELECT * FROM user_records.users", "user_records").unwrap_err();

    match err {
        QueryError::ExecutionFailed { reason, .. } => assert!(reason.starts_with("TABLE_NOT_FOUND")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_table_without_database_fails() {
    let (_store, executor, _clock) = mirror_stack();
    let config = test_config();

    let err = executor
        .execute(&create_table_sql(&Model::user(), &config.bucket), "nowhere")
        .unwrap_err();
    assert!(matches!(err, QueryError::ExecutionFailed { .. }));
}

#[test]
fn test_catalog_persists_on_disk() {
    let temp = TempDir::new().unwrap();
    let config = test_config();

    let build = || {
        let store: Arc<dyn ObjectStore> = Arc::new(LocalBackend::new(temp.path().to_path_buf()));
        let engine = Arc::new(MirrorQueryEngine::new(Arc::clone(&store), "query-results"));
        let executor = QueryExecutor::new(engine, "query-results")
            .with_policy(PollPolicy::every(Duration::from_millis(10)))
            .with_clock(Arc::new(ManualClock::new()));
        (store, executor)
    };

    let (store, executor) = build();
    init_schema(&executor, &config, &Model::raw()).unwrap();
    RecordStore::new(store, config.bucket.clone(), Model::raw())
        .create(serde_json::json!({"n": 1}))
        .unwrap();

    // a second process sees the same tables
    let (_store, executor) = build();
    let rows = executor
        .execute(&select_all_sql(&config.database_name(), "raw"), &config.database_name())
        .unwrap();
    assert_eq!(rows.len(), 1);
}
