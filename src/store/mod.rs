//! Persistence collaborator for recval
//!
//! Persistence is the only mutation in the system and happens strictly
//! after a successful validation, outside the pipeline. A store fault
//! is a distinct failure category from a validation report: by the
//! time the store rejects a write (for example a uniqueness race),
//! validation has already reported success.

mod errors;
mod memory;

pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;

use serde::Serialize;
use serde_json::Value;

use crate::record::{RefKey, ValidatedRecord};

/// A persisted record: assigned key plus its field object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredRecord {
    /// Storage-assigned key
    pub key: RefKey,
    /// Field values as a JSON object
    pub fields: Value,
}

/// Consumes validated records and persists them.
pub trait RecordStore {
    /// Persists a new record, returning its stored representation.
    fn insert(&mut self, collection: &str, record: &ValidatedRecord) -> StoreResult<StoredRecord>;

    /// Merges a validated record onto an existing one.
    fn update(
        &mut self,
        collection: &str,
        key: &RefKey,
        record: &ValidatedRecord,
    ) -> StoreResult<StoredRecord>;
}
