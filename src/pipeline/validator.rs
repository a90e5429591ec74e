//! The validation pipeline
//!
//! A single `validate` call is a pure function of (schema, input,
//! mode). Two phases:
//!
//! 1. Field-level pass, in schema declaration order. Fields are
//!    independent: the per-field chain (coerce → built-in constraints →
//!    referential existence → uniqueness → custom validators) stops at
//!    its first failure, but other fields continue.
//! 2. Whole-record pass, only when the field-level pass produced zero
//!    errors. Validators run in declaration order and stop at the
//!    first failure.
//!
//! The pipeline performs no persistence and mutates neither schema nor
//! input; the lookup collaborator is accessed read-only.

use serde_json::Value;
use thiserror::Error;

use super::coerce::{coerce, json_kind_name};
use super::constraints;
use super::report::{ValidationError, NON_FIELD_ERRORS};
use crate::lookup::Lookup;
use crate::observability::Logger;
use crate::record::{FieldValue, RefKey, ValidatedRecord};
use crate::schema::{FieldKind, FieldSpec, RecordSchema};

/// Message recorded for a required field absent from non-partial input.
pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// Validation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Every required field must be present in the input
    Full,
    /// Absent fields are skipped, even if required (partial update)
    Partial,
}

/// A [`ValidationError`] promoted to a thrown error by the strict
/// entry point, for callers preferring control flow by error.
#[derive(Debug, Error)]
#[error("validation failed for schema '{schema}': {report}")]
pub struct StrictError {
    /// Schema the input was validated against
    pub schema: String,
    /// The underlying structured report
    pub report: ValidationError,
}

/// Validates candidate input mappings against a [`RecordSchema`].
///
/// Holds only a borrow of the lookup collaborator; a pipeline is cheap
/// to construct per call and safe to use from multiple threads.
pub struct Pipeline<'a> {
    lookup: &'a dyn Lookup,
}

impl<'a> Pipeline<'a> {
    /// Creates a pipeline backed by the given lookup collaborator.
    pub fn new(lookup: &'a dyn Lookup) -> Self {
        Self { lookup }
    }

    /// Validates `input` against `schema`.
    ///
    /// Returns the coerced record on success, or the aggregated error
    /// report on failure. Ordinary validation failures are values, not
    /// panics or I/O faults.
    pub fn validate(
        &self,
        schema: &RecordSchema,
        input: &Value,
        mode: Mode,
    ) -> Result<ValidatedRecord, ValidationError> {
        self.validate_with(schema, input, mode, None)
    }

    /// Validates `input` as an update to the record identified by
    /// `key`.
    ///
    /// Identical to [`Pipeline::validate`] except that uniqueness
    /// checks exclude the target record, so re-submitting its own
    /// unique values is not a collision.
    pub fn validate_update(
        &self,
        schema: &RecordSchema,
        input: &Value,
        mode: Mode,
        key: &RefKey,
    ) -> Result<ValidatedRecord, ValidationError> {
        self.validate_with(schema, input, mode, Some(key))
    }

    fn validate_with(
        &self,
        schema: &RecordSchema,
        input: &Value,
        mode: Mode,
        exclude: Option<&RefKey>,
    ) -> Result<ValidatedRecord, ValidationError> {
        let mut report = ValidationError::new();

        let Some(object) = input.as_object() else {
            report.push(
                NON_FIELD_ERRORS,
                format!("Invalid data. Expected an object, got {}.", json_kind_name(input)),
            );
            return Err(self.reject(schema, report));
        };

        // Field-level pass: declaration order, fields independent.
        let mut validated = ValidatedRecord::new();
        for spec in schema.fields() {
            // Read-only fields are never consumed from input; their
            // presence is silently ignored.
            if spec.is_read_only() {
                continue;
            }

            let raw = match object.get(spec.name()) {
                Some(raw) => raw,
                None => {
                    if mode == Mode::Full && spec.is_required() {
                        report.push(spec.name(), REQUIRED_MESSAGE.to_string());
                    }
                    continue;
                }
            };

            match self.run_field_chain(schema, spec, raw, exclude) {
                Ok(value) => validated.insert(spec.name(), value),
                Err(message) => report.push(spec.name(), message),
            }
        }

        if !report.is_empty() {
            return Err(self.reject(schema, report));
        }

        // Whole-record pass: only on fully valid field data.
        let mut record = validated;
        for validator in schema.record_validators() {
            match validator(record) {
                Ok(next) => record = next,
                Err(message) => {
                    report.push(NON_FIELD_ERRORS, message);
                    return Err(self.reject(schema, report));
                }
            }
        }

        Ok(record)
    }

    /// Strict variant of [`Pipeline::validate`] that converts the
    /// report into a [`StrictError`].
    pub fn validate_strict(
        &self,
        schema: &RecordSchema,
        input: &Value,
        mode: Mode,
    ) -> Result<ValidatedRecord, StrictError> {
        self.validate(schema, input, mode)
            .map_err(|report| StrictError {
                schema: schema.name().to_string(),
                report,
            })
    }

    /// Runs the per-field chain. The first failing step produces the
    /// field's single error message; later steps do not run.
    fn run_field_chain(
        &self,
        schema: &RecordSchema,
        spec: &FieldSpec,
        raw: &Value,
        exclude: Option<&RefKey>,
    ) -> Result<FieldValue, String> {
        let mut value = coerce(spec.kind(), raw)?;

        constraints::check(spec, &value)?;
        self.check_references(spec, &value)?;

        if spec.constraints().unique {
            match self
                .lookup
                .value_taken(schema.name(), spec.name(), &value.to_value(), exclude)
            {
                Ok(false) => {}
                Ok(true) => return Err("This field must be unique.".to_string()),
                Err(fault) => return Err(format!("Uniqueness check failed: {}.", fault)),
            }
        }

        for validator in spec.validators() {
            value = validator(value)?;
        }

        Ok(value)
    }

    /// Resolves reference keys against the lookup collaborator. A
    /// missing target and a collaborator fault are both ordinary field
    /// errors, never a crash of the run.
    fn check_references(&self, spec: &FieldSpec, value: &FieldValue) -> Result<(), String> {
        match (spec.kind(), value) {
            (FieldKind::Reference { collection }, FieldValue::Reference(key)) => {
                self.check_reference_key(collection, key)
            }
            (FieldKind::ReferenceList { collection }, FieldValue::ReferenceList(keys)) => {
                for key in keys {
                    self.check_reference_key(collection, key)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn check_reference_key(&self, collection: &str, key: &RefKey) -> Result<(), String> {
        match self.lookup.exists(collection, key) {
            Ok(true) => Ok(()),
            Ok(false) => Err(format!("Object with id={} does not exist.", key)),
            Err(fault) => Err(format!("Reference lookup failed: {}.", fault)),
        }
    }

    /// Logs a failed run and hands the report back to the caller.
    fn reject(&self, schema: &RecordSchema, report: ValidationError) -> ValidationError {
        Logger::warn(
            "VALIDATION_FAILED",
            &[
                ("error_fields", &report.field_count().to_string()),
                ("schema", schema.name()),
            ],
        );
        report
    }
}
