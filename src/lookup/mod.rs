//! Referential lookup collaborator
//!
//! The pipeline consults this capability during reference-kind and
//! unique-field validation. Implementations must be read-only with
//! respect to the validation run; a backend fault is reported through
//! [`LookupError`] and the pipeline turns it into an ordinary field
//! error, never a crash.

use serde_json::Value;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::record::RefKey;

/// Fault raised by a lookup backend
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    /// The backing collection store could not be reached
    #[error("lookup backend unavailable: {0}")]
    Unavailable(String),
}

/// Read-only existence and uniqueness queries against collections.
pub trait Lookup: Send + Sync {
    /// Returns whether a record with the given key exists in the
    /// collection.
    fn exists(&self, collection: &str, key: &RefKey) -> Result<bool, LookupError>;

    /// Returns whether some record in the collection already holds
    /// `value` in `field`.
    ///
    /// `exclude` names the record an update targets, so its own
    /// current values never count as taken.
    fn value_taken(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
        exclude: Option<&RefKey>,
    ) -> Result<bool, LookupError>;
}

/// In-memory [`Lookup`] for tests and small fixtures.
#[derive(Debug, Default)]
pub struct MemoryLookup {
    keys: HashMap<String, HashSet<RefKey>>,
    values: HashMap<String, Vec<(RefKey, String, Value)>>,
}

impl MemoryLookup {
    /// Creates an empty lookup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a key as existing in a collection.
    pub fn add_key(&mut self, collection: &str, key: RefKey) {
        self.keys.entry(collection.to_string()).or_default().insert(key);
    }

    /// Marks a field value as taken in a collection by the record with
    /// the given key.
    pub fn add_value(&mut self, collection: &str, key: RefKey, field: &str, value: Value) {
        self.values
            .entry(collection.to_string())
            .or_default()
            .push((key, field.to_string(), value));
    }
}

impl Lookup for MemoryLookup {
    fn exists(&self, collection: &str, key: &RefKey) -> Result<bool, LookupError> {
        Ok(self
            .keys
            .get(collection)
            .is_some_and(|keys| keys.contains(key)))
    }

    fn value_taken(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
        exclude: Option<&RefKey>,
    ) -> Result<bool, LookupError> {
        Ok(self.values.get(collection).is_some_and(|entries| {
            entries.iter().any(|(owner, name, taken)| {
                exclude != Some(owner) && name == field && taken == value
            })
        }))
    }
}
