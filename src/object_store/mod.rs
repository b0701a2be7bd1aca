//! # Object Store
//!
//! Blob storage for records. Keys are `/`-separated paths inside a bucket;
//! objects are opaque bytes and every write is a full overwrite.

pub mod errors;
pub mod backend;
pub mod local;
pub mod memory;

pub use errors::{StorageError, StorageResult};
pub use backend::{validate_key, ObjectStore, ObjectSummary};
pub use local::LocalBackend;
pub use memory::MemoryBackend;
