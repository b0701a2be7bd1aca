//! Record storage
//!
//! Schema-validated JSON records kept one object per record at
//! `{collection}/{id}` in the record bucket.

mod errors;
mod model;
mod store;

pub use errors::{RecordError, RecordResult};
pub use model::Model;
pub use store::RecordStore;
