//! # Object Store Trait

use serde::{Deserialize, Serialize};

use super::errors::{StorageError, StorageResult};

/// One entry of a bucket listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSummary {
    /// Full key inside the bucket
    pub key: String,
    /// Object size in bytes
    pub size: u64,
}

/// Blob store holding records, addressed by bucket and key.
///
/// Writes are last-write-wins full overwrites. `delete` of an absent key
/// succeeds.
pub trait ObjectStore: Send + Sync + std::fmt::Debug {
    /// Store `data` at `bucket/key`, replacing any previous object
    fn put(&self, bucket: &str, key: &str, data: &[u8]) -> StorageResult<()>;

    /// Read the object at `bucket/key`
    fn get(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>>;

    /// Remove the object at `bucket/key`
    fn delete(&self, bucket: &str, key: &str) -> StorageResult<()>;

    /// List objects whose key starts with `prefix`, ordered by key
    fn list(&self, bucket: &str, prefix: &str) -> StorageResult<Vec<ObjectSummary>>;
}

/// Reject keys that cannot name an object: empty, absolute, trailing
/// separator, or containing `.`/`..`/empty segments.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.starts_with('/') || key.ends_with('/') {
        return Err(StorageError::InvalidKey(key.to_string()));
    }

    if key
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(StorageError::InvalidKey(key.to_string()));
    }

    Ok(())
}

pub(crate) fn validate_bucket(bucket: &str) -> StorageResult<()> {
    if bucket.is_empty() || bucket.contains('/') || bucket == "." || bucket == ".." {
        return Err(StorageError::InvalidBucket(bucket.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_keys() {
        assert!(validate_key("user/123").is_ok());
        assert!(validate_key("a/b/c.json").is_ok());
        assert!(validate_key("flat").is_ok());
    }

    #[test]
    fn test_invalid_keys() {
        for key in ["", "/abs", "trailing/", "a//b", "a/../b", "./a"] {
            assert!(
                matches!(validate_key(key), Err(StorageError::InvalidKey(_))),
                "key {:?} should be rejected",
                key
            );
        }
    }

    #[test]
    fn test_invalid_buckets() {
        assert!(validate_bucket("my-bucket").is_ok());
        assert!(validate_bucket("").is_err());
        assert!(validate_bucket("a/b").is_err());
        assert!(validate_bucket("..").is_err());
    }
}
