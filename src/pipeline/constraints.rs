//! Built-in constraint checks
//!
//! Second step of the per-field chain, applied to the coerced value:
//! length bounds and pattern for text-like kinds, numeric bounds for
//! integers. Referential existence and uniqueness run afterwards in
//! the pipeline itself, since they need the lookup collaborator.

use crate::record::FieldValue;
use crate::schema::FieldSpec;

/// Checks the declared built-in constraints against a coerced value.
///
/// Returns the first violated constraint's message; later constraints
/// for the same field are not evaluated.
pub(crate) fn check(spec: &FieldSpec, value: &FieldValue) -> Result<(), String> {
    if let Some(text) = value.as_text() {
        let length = text.chars().count();
        if let Some(min) = spec.constraints().min_length {
            if length < min {
                return Err(format!(
                    "Ensure this field has at least {} characters.",
                    min
                ));
            }
        }
        if let Some(max) = spec.constraints().max_length {
            if length > max {
                return Err(format!(
                    "Ensure this field has no more than {} characters.",
                    max
                ));
            }
        }
        if let Some(re) = spec.pattern_re() {
            if !re.is_match(text) {
                return Err("This value does not match the required pattern.".to_string());
            }
        }
    }

    if let Some(n) = value.as_integer() {
        if let Some(min) = spec.constraints().min_value {
            if n < min {
                return Err(format!(
                    "Ensure this value is greater than or equal to {}.",
                    min
                ));
            }
        }
        if let Some(max) = spec.constraints().max_value {
            if n > max {
                return Err(format!(
                    "Ensure this value is less than or equal to {}.",
                    max
                ));
            }
        }
    }

    Ok(())
}
