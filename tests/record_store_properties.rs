//! Record Store Property Tests
//!
//! - read(create(R).id) returns R plus its id
//! - created ids are present and unique
//! - update preserves unpatched fields and re-validates
//! - delete then read is NotFound
//! - list covers exactly the non-empty keys under the collection prefix
//! - schema violations are caught on write and on read

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::{ada, grace};
use recordlake::object_store::{LocalBackend, MemoryBackend, ObjectStore};
use recordlake::records::{Model, RecordError, RecordStore};
use serde_json::{json, Value};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn memory_store() -> (Arc<MemoryBackend>, RecordStore) {
    let backend = Arc::new(MemoryBackend::new());
    let store = RecordStore::new(backend.clone(), "user-records", Model::user());
    (backend, store)
}

fn id_of(record: &Value) -> String {
    record["id"].as_str().unwrap().to_string()
}

// =============================================================================
// Create / Read
// =============================================================================

#[test]
fn test_read_after_create_returns_record_with_id() {
    let (_backend, store) = memory_store();
    let created = store.create(ada()).unwrap();

    let mut expected = ada();
    expected["id"] = json!(id_of(&created));
    assert_eq!(store.read(&id_of(&created)).unwrap(), expected);
}

#[test]
fn test_created_ids_are_unique() {
    let (_backend, store) = memory_store();
    let ids: HashSet<String> = (0..50).map(|_| id_of(&store.create(ada()).unwrap())).collect();
    assert_eq!(ids.len(), 50);
}

#[test]
fn test_schema_checked_on_create_and_read() {
    let (backend, store) = memory_store();

    let missing = store.create(json!({"first_name": "Ada", "last_name": "L"}));
    assert!(matches!(missing, Err(RecordError::Validation(_))));

    let wrong_type = store.create(json!({"first_name": "Ada", "last_name": "L", "birthday": 1815}));
    assert!(matches!(wrong_type, Err(RecordError::Validation(_))));

    backend
        .put("user-records", "user/planted", br#"{"id": "planted", "first_name": "X"}"#)
        .unwrap();
    assert!(matches!(store.read("planted"), Err(RecordError::Validation(_))));
}

#[test]
fn test_open_model_accepts_any_fields() {
    let backend = Arc::new(MemoryBackend::new());
    let store = RecordStore::new(backend, "b", Model::raw());

    let created = store.create(json!({"anything": [1, 2, {"deep": true}]})).unwrap();
    assert_eq!(store.read(&id_of(&created)).unwrap(), created);

    assert!(matches!(
        store.save(json!({"id": 42})),
        Err(RecordError::Validation(_))
    ));
}

// =============================================================================
// Update / Delete
// =============================================================================

#[test]
fn test_update_preserves_unpatched_fields() {
    let (_backend, store) = memory_store();
    let id = id_of(&store.create(ada()).unwrap());

    store.update(&id, json!({"birthday": "1815-12-11"})).unwrap();
    let record = store.read(&id).unwrap();

    assert_eq!(record["birthday"], "1815-12-11");
    assert_eq!(record["first_name"], "Ada");
    assert_eq!(record["last_name"], "Lovelace");
}

#[test]
fn test_update_cannot_introduce_undeclared_field() {
    let (_backend, store) = memory_store();
    let id = id_of(&store.create(ada()).unwrap());

    assert!(matches!(
        store.update(&id, json!({"nickname": "Countess"})),
        Err(RecordError::Validation(_))
    ));
}

#[test]
fn test_delete_then_read_is_not_found() {
    let (_backend, store) = memory_store();
    let id = id_of(&store.create(ada()).unwrap());

    assert_eq!(store.delete(&id).unwrap(), json!({"deleted_id": id}));
    assert!(matches!(store.read(&id), Err(RecordError::NotFound { .. })));
}

// =============================================================================
// Listing
// =============================================================================

#[test]
fn test_list_covers_exactly_non_empty_keys() {
    let (backend, store) = memory_store();
    let a = store.create(ada()).unwrap();
    let b = store.create(grace()).unwrap();
    backend.put("user-records", "user/folder-marker", b"").unwrap();
    backend.put("user-records", "other/x", b"{}").unwrap();

    let listed: HashSet<String> = store.list().unwrap().iter().map(id_of).collect();
    let expected: HashSet<String> = [id_of(&a), id_of(&b)].into_iter().collect();
    assert_eq!(listed, expected);
}

#[test]
fn test_list_empty_collection() {
    let (_backend, store) = memory_store();
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn test_filesystem_backend_round_trip() {
    let temp = TempDir::new().unwrap();
    let backend: Arc<dyn ObjectStore> = Arc::new(LocalBackend::new(temp.path().to_path_buf()));
    let store = RecordStore::new(backend, "user-records", Model::user());

    let id = id_of(&store.create(grace()).unwrap());
    assert!(temp.path().join("user-records").join("user").join(&id).is_file());
    assert_eq!(store.list_ids().unwrap(), vec![id.clone()]);

    store.delete(&id).unwrap();
    assert!(store.list().unwrap().is_empty());
}
