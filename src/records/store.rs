//! Record store facade
//!
//! Every record is validated against the model schema before it is written
//! and again after it is loaded. Writes are full overwrites; `update` is a
//! read-merge-write and is not atomic.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::object_store::{ObjectStore, StorageError};
use crate::observability::Event;
use crate::schema::{SchemaError, SchemaValidator, ValidationDetails, ID_FIELD};

use super::errors::{RecordError, RecordResult};
use super::model::Model;

/// Validated record persistence for one model
#[derive(Debug, Clone)]
pub struct RecordStore {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    model: Model,
}

impl RecordStore {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>, model: Model) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            model,
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Create a new record under a freshly generated id.
    ///
    /// The caller must not supply an id.
    pub fn create(&self, record: Value) -> RecordResult<Value> {
        let record = into_object(record)?;
        if record.contains_key(ID_FIELD) {
            return Err(RecordError::ConflictingInput(
                "Do not specify id in resource creation".into(),
            ));
        }
        self.save(Value::Object(record))
    }

    /// Validate and write a record, assigning an id if it has none
    pub fn save(&self, record: Value) -> RecordResult<Value> {
        let mut record = into_object(record)?;
        if !record.contains_key(ID_FIELD) {
            record.insert(ID_FIELD.to_string(), Value::String(Uuid::new_v4().to_string()));
        }

        let record = Value::Object(record);
        self.validate(&record)?;

        // validation guarantees a string id
        let id = record_id(&record)
            .ok_or_else(|| RecordError::InvalidId(String::new()))?
            .to_string();
        check_id(&id)?;

        let bytes =
            serde_json::to_vec(&record).map_err(|e| RecordError::Serialization(e.to_string()))?;
        self.store.put(&self.bucket, &self.model.key_for(&id), &bytes)?;

        info!(
            event = %Event::RecordSaved,
            collection = self.model.collection(),
            id = %id,
            bytes = bytes.len(),
        );
        Ok(record)
    }

    /// Load and validate the record with `id`
    pub fn read(&self, id: &str) -> RecordResult<Value> {
        check_id(id)?;
        let collection = self.model.collection();

        let bytes = match self.store.get(&self.bucket, &self.model.key_for(id)) {
            Ok(bytes) => bytes,
            Err(StorageError::ObjectNotFound { .. }) => {
                return Err(RecordError::not_found(collection, id));
            }
            Err(e) => return Err(e.into()),
        };

        let record: Value = serde_json::from_slice(&bytes).map_err(|e| {
            warn!(event = %Event::RecordRejected, collection, id, reason = %e);
            SchemaError::validation_failed(
                &self.model.schema().name,
                ValidationDetails::new("<record>", "a JSON document", e.to_string()),
            )
        })?;
        self.validate(&record)?;

        let stored_id = record_id(&record).unwrap_or_default();
        if stored_id != id {
            warn!(event = %Event::RecordRejected, collection, id, stored_id);
            return Err(SchemaError::validation_failed(
                &self.model.schema().name,
                ValidationDetails::new(ID_FIELD, format!("'{}'", id), format!("'{}'", stored_id)),
            )
            .into());
        }

        debug!(event = %Event::RecordLoaded, collection, id);
        Ok(record)
    }

    /// Shallow-merge `patch` over the stored record and write it back
    pub fn update(&self, id: &str, patch: Value) -> RecordResult<Value> {
        let patch = into_object(patch)?;
        if let Some(patched_id) = patch.get(ID_FIELD) {
            if patched_id.as_str() != Some(id) {
                return Err(RecordError::ConflictingInput(format!(
                    "Record id cannot be changed from '{}'",
                    id
                )));
            }
        }

        let mut record = into_object(self.read(id)?)?;
        for (field, value) in patch {
            record.insert(field, value);
        }
        self.save(Value::Object(record))
    }

    /// Remove the record with `id`; removing an absent record succeeds
    pub fn delete(&self, id: &str) -> RecordResult<Value> {
        check_id(id)?;
        self.store.delete(&self.bucket, &self.model.key_for(id))?;

        info!(event = %Event::RecordDeleted, collection = self.model.collection(), id);
        Ok(json!({ "deleted_id": id }))
    }

    /// Ids of every non-empty record object in the collection, in key order
    pub fn list_ids(&self) -> RecordResult<Vec<String>> {
        let prefix = self.model.prefix();
        let objects = self.store.list(&self.bucket, &prefix)?;

        Ok(objects
            .into_iter()
            .filter(|summary| summary.size > 0)
            .filter_map(|summary| {
                summary
                    .key
                    .strip_prefix(&prefix)
                    .filter(|id| !id.is_empty() && !id.contains('/'))
                    .map(str::to_string)
            })
            .collect())
    }

    /// Load every record of the collection. The first failure aborts the listing.
    pub fn list(&self) -> RecordResult<Vec<Value>> {
        self.list_ids()?.iter().map(|id| self.read(id)).collect()
    }

    fn validate(&self, record: &Value) -> RecordResult<()> {
        SchemaValidator::new(self.model.schema())
            .validate(record)
            .map_err(|e| {
                warn!(
                    event = %Event::RecordRejected,
                    collection = self.model.collection(),
                    reason = %e,
                );
                RecordError::from(e)
            })
    }
}

fn into_object(value: Value) -> RecordResult<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(RecordError::InvalidInput(format!(
            "expected a JSON object, got {}",
            json_type(&other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn record_id(record: &Value) -> Option<&str> {
    record.get(ID_FIELD).and_then(Value::as_str)
}

/// Ids become a single key segment
fn check_id(id: &str) -> RecordResult<()> {
    if id.is_empty() || id.contains('/') || id == "." || id == ".." {
        return Err(RecordError::InvalidId(id.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_store::MemoryBackend;

    fn user_store() -> (Arc<MemoryBackend>, RecordStore) {
        let backend = Arc::new(MemoryBackend::new());
        let store = RecordStore::new(backend.clone(), "records", Model::user());
        (backend, store)
    }

    fn ada() -> Value {
        json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "birthday": "1815-12-10"
        })
    }

    #[test]
    fn test_create_assigns_id_and_persists() {
        let (backend, store) = user_store();
        let created = store.create(ada()).unwrap();

        let id = created["id"].as_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());

        let raw = backend.get("records", &format!("user/{}", id)).unwrap();
        let stored: Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(stored, created);
    }

    #[test]
    fn test_create_rejects_supplied_id() {
        let (_backend, store) = user_store();
        let mut record = ada();
        record["id"] = json!("chosen");

        let err = store.create(record).unwrap_err();
        assert!(matches!(err, RecordError::ConflictingInput(_)));
        assert_eq!(err.to_string(), "Do not specify id in resource creation");
    }

    #[test]
    fn test_create_rejects_off_schema_record() {
        let (backend, store) = user_store();
        let err = store.create(json!({"first_name": "Ada"})).unwrap_err();
        assert!(matches!(err, RecordError::Validation(_)));
        assert!(backend.is_empty());
    }

    #[test]
    fn test_save_keeps_given_id() {
        let (_backend, store) = user_store();
        let mut record = ada();
        record["id"] = json!("ada");

        store.save(record.clone()).unwrap();
        assert_eq!(store.read("ada").unwrap(), record);
    }

    #[test]
    fn test_save_rejects_path_like_id() {
        let store = RecordStore::new(Arc::new(MemoryBackend::new()), "b", Model::raw());
        let err = store.save(json!({"id": "a/b"})).unwrap_err();
        assert!(matches!(err, RecordError::InvalidId(_)));
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let (_backend, store) = user_store();
        assert!(matches!(
            store.read("nobody"),
            Err(RecordError::NotFound { .. })
        ));
    }

    #[test]
    fn test_read_rejects_corrupt_bytes() {
        let (backend, store) = user_store();
        backend.put("records", "user/x", b"{not json").unwrap();
        assert!(matches!(store.read("x"), Err(RecordError::Validation(_))));
    }

    #[test]
    fn test_read_rejects_off_schema_object() {
        let (backend, store) = user_store();
        backend
            .put("records", "user/x", br#"{"id": "x", "first_name": 3}"#)
            .unwrap();
        assert!(matches!(store.read("x"), Err(RecordError::Validation(_))));
    }

    #[test]
    fn test_read_rejects_id_mismatch() {
        let (backend, store) = user_store();
        let mut record = ada();
        record["id"] = json!("other");
        backend
            .put("records", "user/x", &serde_json::to_vec(&record).unwrap())
            .unwrap();
        assert!(matches!(store.read("x"), Err(RecordError::Validation(_))));
    }

    #[test]
    fn test_update_merges_shallowly() {
        let (_backend, store) = user_store();
        let created = store.create(ada()).unwrap();
        let id = created["id"].as_str().unwrap();

        let updated = store.update(id, json!({"last_name": "King"})).unwrap();
        assert_eq!(updated["last_name"], "King");
        assert_eq!(updated["first_name"], "Ada");
        assert_eq!(store.read(id).unwrap(), updated);
    }

    #[test]
    fn test_update_revalidates() {
        let (_backend, store) = user_store();
        let created = store.create(ada()).unwrap();
        let id = created["id"].as_str().unwrap();

        let err = store.update(id, json!({"birthday": 1815})).unwrap_err();
        assert!(matches!(err, RecordError::Validation(_)));
        assert_eq!(store.read(id).unwrap(), created);
    }

    #[test]
    fn test_update_rejects_id_change() {
        let (_backend, store) = user_store();
        let created = store.create(ada()).unwrap();
        let id = created["id"].as_str().unwrap();

        let err = store.update(id, json!({"id": "new"})).unwrap_err();
        assert!(matches!(err, RecordError::ConflictingInput(_)));

        // repeating the same id is allowed
        assert!(store.update(id, json!({"id": id})).is_ok());
    }

    #[test]
    fn test_update_missing_record() {
        let (_backend, store) = user_store();
        assert!(matches!(
            store.update("ghost", json!({"last_name": "x"})),
            Err(RecordError::NotFound { .. })
        ));
    }

    #[test]
    fn test_update_requires_object_patch() {
        let (_backend, store) = user_store();
        assert!(matches!(
            store.update("any", json!([1, 2])),
            Err(RecordError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_delete_then_read() {
        let (_backend, store) = user_store();
        let created = store.create(ada()).unwrap();
        let id = created["id"].as_str().unwrap();

        assert_eq!(store.delete(id).unwrap(), json!({"deleted_id": id}));
        assert!(matches!(store.read(id), Err(RecordError::NotFound { .. })));

        // absent records delete cleanly
        assert!(store.delete(id).is_ok());
    }

    #[test]
    fn test_list_skips_empty_and_nested_objects() {
        let (backend, store) = user_store();
        let a = store.create(ada()).unwrap();
        let b = store.create(ada()).unwrap();
        backend.put("records", "user/placeholder", b"").unwrap();
        backend.put("records", "user/nested/deep", b"{}").unwrap();
        backend.put("records", "users/elsewhere", b"{}").unwrap();

        let mut expected = vec![
            a["id"].as_str().unwrap().to_string(),
            b["id"].as_str().unwrap().to_string(),
        ];
        expected.sort();
        assert_eq!(store.list_ids().unwrap(), expected);
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn test_list_aborts_on_bad_record() {
        let (backend, store) = user_store();
        store.create(ada()).unwrap();
        backend.put("records", "user/bad", b"[]").unwrap();
        assert!(store.list().is_err());
    }
}
