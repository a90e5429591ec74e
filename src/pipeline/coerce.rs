//! Raw-value coercion
//!
//! First step of the per-field chain: turn a raw JSON value into a
//! typed [`FieldValue`] for the declared kind. A wrong type or a
//! malformed value is a coercion failure, which ends the chain for
//! that field before any constraint or custom validator runs.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::record::{FieldValue, RefKey};
use crate::schema::FieldKind;

// Intentionally permissive; full address grammar is out of scope.
const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

/// Returns the JSON type name for error messages.
pub(crate) fn json_kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "integer"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Coerces a raw value to the given kind, or explains why it cannot be.
pub(crate) fn coerce(kind: &FieldKind, raw: &Value) -> Result<FieldValue, String> {
    match kind {
        FieldKind::Text => match raw {
            Value::String(s) => Ok(FieldValue::Text(s.clone())),
            _ => Err("Not a valid string.".to_string()),
        },
        FieldKind::Integer => coerce_integer(raw).map(FieldValue::Integer),
        FieldKind::Email => match raw {
            Value::String(s) if email_re().is_match(s) => Ok(FieldValue::Email(s.clone())),
            _ => Err("Enter a valid email address.".to_string()),
        },
        FieldKind::DateTime => match raw {
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| FieldValue::DateTime(dt.with_timezone(&Utc)))
                .map_err(|_| {
                    "Datetime has wrong format. Expected an RFC 3339 timestamp.".to_string()
                }),
            _ => Err("Datetime has wrong format. Expected an RFC 3339 timestamp.".to_string()),
        },
        FieldKind::Reference { .. } => coerce_ref_key(raw).map(FieldValue::Reference),
        FieldKind::ReferenceList { .. } => match raw {
            Value::Array(items) => {
                let mut keys = Vec::with_capacity(items.len());
                for item in items {
                    keys.push(coerce_ref_key(item)?);
                }
                Ok(FieldValue::ReferenceList(keys))
            }
            _ => Err(format!(
                "Expected a list of reference keys, received {}.",
                json_kind_name(raw)
            )),
        },
    }
}

/// Integers accept JSON integers and decimal strings.
fn coerce_integer(raw: &Value) -> Result<i64, String> {
    if let Some(n) = raw.as_i64() {
        return Ok(n);
    }
    if let Value::String(s) = raw {
        if let Ok(n) = s.trim().parse::<i64>() {
            return Ok(n);
        }
    }
    Err("A valid integer is required.".to_string())
}

fn coerce_ref_key(raw: &Value) -> Result<RefKey, String> {
    match raw {
        Value::Number(_) => raw
            .as_i64()
            .map(RefKey::Int)
            .ok_or_else(|| reference_type_error(raw)),
        Value::String(s) => Ok(RefKey::Str(s.clone())),
        _ => Err(reference_type_error(raw)),
    }
}

fn reference_type_error(raw: &Value) -> String {
    format!(
        "Incorrect type. Expected a reference key, received {}.",
        json_kind_name(raw)
    )
}
