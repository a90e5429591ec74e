//! Structured validation error report
//!
//! Validation failures are data, not exceptions: the report maps field
//! names to ordered lists of human-readable messages, with a reserved
//! key for whole-record failures. Field order follows the order errors
//! were recorded in (schema declaration order).

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::fmt;

/// Reserved key for whole-record (non-field) error messages.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Aggregated field and whole-record error messages.
///
/// Presence of any entry makes the overall validation a failure. The
/// default pipeline entry point returns this as a value; only the
/// strict wrapper converts it into a thrown error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    entries: Vec<(String, Vec<String>)>,
}

impl ValidationError {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message for a field, accumulating onto any existing
    /// messages for the same field.
    pub(crate) fn push(&mut self, field: &str, message: String) {
        match self.entries.iter_mut().find(|(name, _)| name == field) {
            Some((_, messages)) => messages.push(message),
            None => self.entries.push((field.to_string(), vec![message])),
        }
    }

    /// Returns whether the report holds no errors.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of fields (including the non-field key) with errors.
    pub fn field_count(&self) -> usize {
        self.entries.len()
    }

    /// Messages recorded for a field, in recording order.
    pub fn messages(&self, field: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
    }

    /// Messages attached to the reserved whole-record key.
    pub fn non_field_messages(&self) -> Option<&[String]> {
        self.messages(NON_FIELD_ERRORS)
    }

    /// Names of fields with errors, in recording order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Projects the report into a JSON object of message arrays.
    pub fn to_value(&self) -> Value {
        let map: serde_json::Map<String, Value> = self
            .entries
            .iter()
            .map(|(name, messages)| {
                (
                    name.clone(),
                    Value::Array(messages.iter().map(|m| Value::from(m.clone())).collect()),
                )
            })
            .collect();
        Value::Object(map)
    }
}

/// Serializes as a JSON object of message arrays, fields in recording
/// order.
impl Serialize for ValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, messages) in &self.entries {
            map.serialize_entry(name, messages)?;
        }
        map.end()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, messages) in &self.entries {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", name, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}
