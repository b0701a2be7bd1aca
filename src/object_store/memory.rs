//! # In-Memory Backend

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::backend::{validate_bucket, validate_key, ObjectStore, ObjectSummary};
use super::errors::{StorageError, StorageResult};

/// Object store kept entirely in memory, keyed by (bucket, key).
#[derive(Debug, Default)]
pub struct MemoryBackend {
    objects: RwLock<BTreeMap<(String, String), Vec<u8>>>,
}

impl MemoryBackend {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects across all buckets
    pub fn len(&self) -> usize {
        self.objects.read().map(|objects| objects.len()).unwrap_or(0)
    }

    /// Whether no objects are stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StorageError {
    StorageError::Internal("memory backend lock poisoned".into())
}

impl ObjectStore for MemoryBackend {
    fn put(&self, bucket: &str, key: &str, data: &[u8]) -> StorageResult<()> {
        validate_bucket(bucket)?;
        validate_key(key)?;

        let mut objects = self.objects.write().map_err(|_| poisoned())?;
        objects.insert((bucket.to_string(), key.to_string()), data.to_vec());
        Ok(())
    }

    fn get(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        validate_bucket(bucket)?;
        validate_key(key)?;

        let objects = self.objects.read().map_err(|_| poisoned())?;
        objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| StorageError::not_found(bucket, key))
    }

    fn delete(&self, bucket: &str, key: &str) -> StorageResult<()> {
        validate_bucket(bucket)?;
        validate_key(key)?;

        let mut objects = self.objects.write().map_err(|_| poisoned())?;
        objects.remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }

    fn list(&self, bucket: &str, prefix: &str) -> StorageResult<Vec<ObjectSummary>> {
        validate_bucket(bucket)?;

        let objects = self.objects.read().map_err(|_| poisoned())?;
        Ok(objects
            .iter()
            .filter(|((b, k), _)| b == bucket && k.starts_with(prefix))
            .map(|((_, k), data)| ObjectSummary {
                key: k.clone(),
                size: data.len() as u64,
            })
            .collect())
    }
}
