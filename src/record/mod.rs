//! Value domain for validated records
//!
//! A record is an ordered mapping from field names to coerced values.
//! Field order follows the schema's declaration order, which also fixes
//! the shape of any projected output.
//!
//! # Design Principles
//!
//! - Values are produced by coercion, never by implicit conversion later
//! - Insertion order is preserved (declaration order of the schema)
//! - Records are plain data with no behavior beyond projection

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::Value;
use std::fmt;

/// Key of a referenced record.
///
/// Reference fields accept either an integer or a string identifier,
/// matching what the backing collection uses as its primary key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RefKey {
    /// Integer key
    Int(i64),
    /// String key
    Str(String),
}

impl RefKey {
    /// Projects the key into a JSON value.
    pub fn to_value(&self) -> Value {
        match self {
            RefKey::Int(n) => Value::from(*n),
            RefKey::Str(s) => Value::from(s.clone()),
        }
    }
}

impl fmt::Display for RefKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefKey::Int(n) => write!(f, "{}", n),
            RefKey::Str(s) => write!(f, "{}", s),
        }
    }
}

impl Serialize for RefKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RefKey::Int(n) => serializer.serialize_i64(*n),
            RefKey::Str(s) => serializer.serialize_str(s),
        }
    }
}

/// A coerced field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// UTF-8 text
    Text(String),
    /// 64-bit signed integer
    Integer(i64),
    /// Well-formed email address
    Email(String),
    /// RFC 3339 timestamp, normalized to UTC
    DateTime(DateTime<Utc>),
    /// Key of a record in another collection
    Reference(RefKey),
    /// Keys of records in another collection
    ReferenceList(Vec<RefKey>),
}

impl FieldValue {
    /// Returns the text content for text-like values.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Email(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer content, if any.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Projects the value into JSON.
    pub fn to_value(&self) -> Value {
        match self {
            FieldValue::Text(s) | FieldValue::Email(s) => Value::from(s.clone()),
            FieldValue::Integer(n) => Value::from(*n),
            FieldValue::DateTime(dt) => Value::from(dt.to_rfc3339()),
            FieldValue::Reference(key) => key.to_value(),
            FieldValue::ReferenceList(keys) => {
                Value::Array(keys.iter().map(RefKey::to_value).collect())
            }
        }
    }
}

/// Serializes as the same JSON projection [`FieldValue::to_value`]
/// produces.
impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(s) | FieldValue::Email(s) => serializer.serialize_str(s),
            FieldValue::Integer(n) => serializer.serialize_i64(*n),
            FieldValue::DateTime(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            FieldValue::Reference(key) => key.serialize(serializer),
            FieldValue::ReferenceList(keys) => {
                let mut seq = serializer.serialize_seq(Some(keys.len()))?;
                for key in keys {
                    seq.serialize_element(key)?;
                }
                seq.end()
            }
        }
    }
}

/// An ordered field-name → value mapping produced by a successful
/// validation run.
///
/// Entries appear in schema declaration order. Read-only fields and
/// fields absent from the input never appear.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedRecord {
    entries: Vec<(String, FieldValue)>,
}

impl ValidatedRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, replacing any existing entry for the same field
    /// in place (position is preserved).
    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) {
        let field = field.into();
        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((field, value)),
        }
    }

    /// Removes a field, returning its value if present.
    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        let idx = self.entries.iter().position(|(name, _)| name == field)?;
        Some(self.entries.remove(idx).1)
    }

    /// Returns the value of a field, if present.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Returns whether the record holds a value for the field.
    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Number of fields in the record.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the record is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Projects the record into a JSON object.
    pub fn to_value(&self) -> Value {
        let map: serde_json::Map<String, Value> = self
            .entries
            .iter()
            .map(|(name, value)| (name.clone(), value.to_value()))
            .collect();
        Value::Object(map)
    }
}

/// Serializes as a JSON object whose keys appear in insertion order.
impl Serialize for ValidatedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
