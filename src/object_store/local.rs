//! # Local Filesystem Backend
//!
//! Buckets are directories under a root; keys map to nested files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::backend::{validate_bucket, validate_key, ObjectStore, ObjectSummary};
use super::errors::{StorageError, StorageResult};

/// Local filesystem object store
#[derive(Debug)]
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    /// Create a new local backend rooted at `root`
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Root directory of this backend
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_path(&self, bucket: &str) -> StorageResult<PathBuf> {
        validate_bucket(bucket)?;
        Ok(self.root.join(bucket))
    }

    fn object_path(&self, bucket: &str, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        let mut path = self.bucket_path(bucket)?;
        for segment in key.split('/') {
            path.push(segment);
        }
        Ok(path)
    }

    /// Walk `dir` collecting every file as a `/`-joined key relative to the bucket
    fn collect_keys(
        dir: &Path,
        key_prefix: &str,
        out: &mut Vec<ObjectSummary>,
    ) -> StorageResult<()> {
        let entries = fs::read_dir(dir).map_err(|e| StorageError::IoError(e.to_string()))?;

        for entry in entries {
            let entry = entry.map_err(|e| StorageError::IoError(e.to_string()))?;
            let name = match entry.file_name().to_str() {
                Some(name) => name.to_string(),
                None => continue,
            };
            let key = if key_prefix.is_empty() {
                name
            } else {
                format!("{}/{}", key_prefix, name)
            };

            let metadata = entry
                .metadata()
                .map_err(|e| StorageError::IoError(e.to_string()))?;
            if metadata.is_dir() {
                Self::collect_keys(&entry.path(), &key, out)?;
            } else {
                out.push(ObjectSummary {
                    key,
                    size: metadata.len(),
                });
            }
        }

        Ok(())
    }
}

fn map_io(bucket: &str, key: &str, e: io::Error) -> StorageError {
    if e.kind() == io::ErrorKind::NotFound {
        StorageError::not_found(bucket, key)
    } else {
        StorageError::IoError(e.to_string())
    }
}

impl ObjectStore for LocalBackend {
    fn put(&self, bucket: &str, key: &str, data: &[u8]) -> StorageResult<()> {
        let full_path = self.object_path(bucket, key)?;

        // Create parent directories
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::IoError(e.to_string()))?;
        }

        fs::write(&full_path, data).map_err(|e| StorageError::IoError(e.to_string()))
    }

    fn get(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        let full_path = self.object_path(bucket, key)?;

        if full_path.is_dir() {
            return Err(StorageError::not_found(bucket, key));
        }

        fs::read(&full_path).map_err(|e| map_io(bucket, key, e))
    }

    fn delete(&self, bucket: &str, key: &str) -> StorageResult<()> {
        let full_path = self.object_path(bucket, key)?;

        match fs::remove_file(&full_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::IoError(e.to_string())),
        }
    }

    fn list(&self, bucket: &str, prefix: &str) -> StorageResult<Vec<ObjectSummary>> {
        let bucket_path = self.bucket_path(bucket)?;
        let mut results = Vec::new();

        if bucket_path.is_dir() {
            Self::collect_keys(&bucket_path, "", &mut results)?;
        }

        results.retain(|summary| summary.key.starts_with(prefix));
        results.sort_by(|a, b| a.key.cmp(&b.key));

        Ok(results)
    }
}
