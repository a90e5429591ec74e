//! Persistence fault types
//!
//! A store fault arrives strictly after validation already reported
//! success, so it is a distinct failure category from a validation
//! report. A duplicate-value race on a unique field is not retryable
//! without re-validating.

use thiserror::Error;

use crate::record::RefKey;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Faults raised by a persistence collaborator
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The named collection was never created
    #[error("collection '{0}' does not exist")]
    UnknownCollection(String),

    /// No record with the given key exists (updates only)
    #[error("record with key {0} not found")]
    NotFound(RefKey),

    /// A storage-layer uniqueness constraint rejected the write
    #[error("duplicate value for unique field '{field}' in collection '{collection}'")]
    DuplicateValue { collection: String, field: String },
}
