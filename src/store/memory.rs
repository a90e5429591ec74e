//! In-memory record store
//!
//! Reference implementation of the persistence collaborator. Assigns
//! integer keys, enforces per-collection unique fields at write time,
//! and doubles as the [`Lookup`] backend so referential and uniqueness
//! checks run against the same collections that writes target.

use serde_json::Value;
use std::collections::HashMap;

use super::errors::{StoreError, StoreResult};
use super::{RecordStore, StoredRecord};
use crate::lookup::{Lookup, LookupError};
use crate::record::{RefKey, ValidatedRecord};

struct Collection {
    unique_fields: Vec<String>,
    records: Vec<StoredRecord>,
}

/// An in-memory [`RecordStore`] with per-collection unique fields.
#[derive(Default)]
pub struct MemoryStore {
    collections: HashMap<String, Collection>,
    next_key: i64,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection, declaring which fields the storage layer
    /// enforces as unique.
    pub fn create_collection(&mut self, name: &str, unique_fields: &[&str]) {
        self.collections.insert(
            name.to_string(),
            Collection {
                unique_fields: unique_fields.iter().map(|f| f.to_string()).collect(),
                records: Vec::new(),
            },
        );
    }

    /// Returns a stored record by key.
    pub fn get(&self, collection: &str, key: &RefKey) -> Option<&StoredRecord> {
        self.collections
            .get(collection)?
            .records
            .iter()
            .find(|record| record.key == *key)
    }

    /// Number of records in a collection (zero if it does not exist).
    pub fn record_count(&self, collection: &str) -> usize {
        self.collections
            .get(collection)
            .map_or(0, |c| c.records.len())
    }

    fn collection(&self, name: &str) -> StoreResult<&Collection> {
        self.collections
            .get(name)
            .ok_or_else(|| StoreError::UnknownCollection(name.to_string()))
    }

    /// Rejects a write whose unique-field values collide with an
    /// existing record (other than `skip`, for updates).
    fn check_unique(
        name: &str,
        collection: &Collection,
        fields: &Value,
        skip: Option<&RefKey>,
    ) -> StoreResult<()> {
        for unique_field in &collection.unique_fields {
            let Some(candidate) = fields.get(unique_field) else {
                continue;
            };
            let taken = collection.records.iter().any(|record| {
                skip != Some(&record.key) && record.fields.get(unique_field) == Some(candidate)
            });
            if taken {
                return Err(StoreError::DuplicateValue {
                    collection: name.to_string(),
                    field: unique_field.clone(),
                });
            }
        }
        Ok(())
    }
}

impl RecordStore for MemoryStore {
    fn insert(&mut self, collection: &str, record: &ValidatedRecord) -> StoreResult<StoredRecord> {
        let fields = record.to_value();
        let entry = self.collection(collection)?;
        Self::check_unique(collection, entry, &fields, None)?;

        self.next_key += 1;
        let stored = StoredRecord {
            key: RefKey::Int(self.next_key),
            fields,
        };

        // collection() verified existence above
        let entry = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;
        entry.records.push(stored.clone());
        Ok(stored)
    }

    fn update(
        &mut self,
        collection: &str,
        key: &RefKey,
        record: &ValidatedRecord,
    ) -> StoreResult<StoredRecord> {
        let fields = record.to_value();
        let entry = self.collection(collection)?;
        if !entry.records.iter().any(|r| r.key == *key) {
            return Err(StoreError::NotFound(key.clone()));
        }
        Self::check_unique(collection, entry, &fields, Some(key))?;

        let entry = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;
        let stored = entry
            .records
            .iter_mut()
            .find(|r| r.key == *key)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;

        // Partial updates merge onto the existing record
        if let (Value::Object(existing), Value::Object(new_fields)) = (&mut stored.fields, fields) {
            for (name, value) in new_fields {
                existing.insert(name, value);
            }
        }
        Ok(stored.clone())
    }
}

impl Lookup for MemoryStore {
    fn exists(&self, collection: &str, key: &RefKey) -> Result<bool, LookupError> {
        Ok(self.get(collection, key).is_some())
    }

    fn value_taken(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
        exclude: Option<&RefKey>,
    ) -> Result<bool, LookupError> {
        Ok(self.collections.get(collection).is_some_and(|entry| {
            entry.records.iter().any(|record| {
                exclude != Some(&record.key) && record.fields.get(field) == Some(value)
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldValue;

    fn title_record(title: &str) -> ValidatedRecord {
        let mut record = ValidatedRecord::new();
        record.insert("title", FieldValue::Text(title.into()));
        record.insert("views", FieldValue::Integer(0));
        record
    }

    #[test]
    fn test_insert_assigns_sequential_keys() {
        let mut store = MemoryStore::new();
        store.create_collection("blog", &[]);

        let first = store.insert("blog", &title_record("A")).unwrap();
        let second = store.insert("blog", &title_record("B")).unwrap();

        assert_eq!(first.key, RefKey::Int(1));
        assert_eq!(second.key, RefKey::Int(2));
        assert_eq!(store.record_count("blog"), 2);
    }

    #[test]
    fn test_insert_into_unknown_collection() {
        let mut store = MemoryStore::new();
        let result = store.insert("missing", &title_record("A"));
        assert!(matches!(result, Err(StoreError::UnknownCollection(_))));
    }

    #[test]
    fn test_duplicate_unique_value_rejected() {
        let mut store = MemoryStore::new();
        store.create_collection("blog", &["title"]);
        store.insert("blog", &title_record("A")).unwrap();

        let result = store.insert("blog", &title_record("A"));
        assert!(matches!(
            result,
            Err(StoreError::DuplicateValue { ref field, .. }) if field == "title"
        ));
    }

    #[test]
    fn test_update_merges_fields() {
        let mut store = MemoryStore::new();
        store.create_collection("blog", &[]);
        let stored = store.insert("blog", &title_record("A")).unwrap();

        let mut patch = ValidatedRecord::new();
        patch.insert("title", FieldValue::Text("B".into()));
        let updated = store.update("blog", &stored.key, &patch).unwrap();

        assert_eq!(updated.fields["title"], "B");
        // Untouched fields survive the merge
        assert_eq!(updated.fields["views"], 0);
    }

    #[test]
    fn test_update_missing_record() {
        let mut store = MemoryStore::new();
        store.create_collection("blog", &[]);

        let result = store.update("blog", &RefKey::Int(42), &title_record("A"));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_update_keeps_own_unique_value() {
        let mut store = MemoryStore::new();
        store.create_collection("blog", &["title"]);
        let stored = store.insert("blog", &title_record("A")).unwrap();

        // Re-writing the same title onto the same record is not a duplicate
        assert!(store.update("blog", &stored.key, &title_record("A")).is_ok());
    }

    #[test]
    fn test_lookup_backed_by_collections() {
        let mut store = MemoryStore::new();
        store.create_collection("blog", &[]);
        let stored = store.insert("blog", &title_record("A")).unwrap();

        assert!(store.exists("blog", &stored.key).unwrap());
        assert!(!store.exists("blog", &RefKey::Int(99)).unwrap());
        assert!(store
            .value_taken("blog", "title", &Value::from("A"), None)
            .unwrap());
        assert!(!store
            .value_taken("blog", "title", &Value::from("Z"), None)
            .unwrap());
        // The owning record never counts against itself
        assert!(!store
            .value_taken("blog", "title", &Value::from("A"), Some(&stored.key))
            .unwrap());
    }
}
