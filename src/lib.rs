//! recordlake - schema-validated records in an object store
//!
//! Records are JSON objects stored one per key under `{collection}/{id}`.
//! Reads and writes go straight to the object store; bulk reads go through
//! a SQL-over-object-storage engine that sees each collection as a table.

pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod object_store;
pub mod observability;
pub mod query;
pub mod records;
pub mod schema;
