//! Schema type definitions
//!
//! Supported field kinds:
//! - text: UTF-8 string
//! - integer: 64-bit signed integer
//! - email: well-formed email address
//! - datetime: RFC 3339 timestamp
//! - reference: key of a record in another collection
//! - reference_list: keys of records in another collection
//!
//! A schema is constructed once through [`SchemaBuilder`] and is
//! immutable thereafter. All structural problems (duplicate names,
//! invalid patterns, inapplicable constraints) are rejected at build
//! time with a [`SchemaError`].

use regex::Regex;
use std::fmt;

use super::errors::{SchemaError, SchemaResult};
use crate::pipeline::NON_FIELD_ERRORS;
use crate::record::{FieldValue, ValidatedRecord};

/// A per-field validator callable.
///
/// Receives the coerced value and either returns it (possibly
/// transformed) or signals failure with a human-readable message.
pub type FieldValidator = Box<dyn Fn(FieldValue) -> Result<FieldValue, String> + Send + Sync>;

/// A whole-record validator callable.
///
/// Receives the complete validated mapping and either returns it
/// (possibly transformed) or signals failure with a human-readable
/// message attached to the reserved non-field key.
pub type RecordValidator =
    Box<dyn Fn(ValidatedRecord) -> Result<ValidatedRecord, String> + Send + Sync>;

/// Supported field kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// UTF-8 text
    Text,
    /// 64-bit signed integer
    Integer,
    /// Well-formed email address
    Email,
    /// RFC 3339 timestamp
    DateTime,
    /// Key of a record in the named collection
    Reference { collection: String },
    /// Keys of records in the named collection
    ReferenceList { collection: String },
}

impl FieldKind {
    /// Returns the kind name for error messages
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Email => "email",
            FieldKind::DateTime => "datetime",
            FieldKind::Reference { .. } => "reference",
            FieldKind::ReferenceList { .. } => "reference_list",
        }
    }

    /// Returns whether text-shaped constraints (length, pattern) apply.
    fn is_textual(&self) -> bool {
        matches!(self, FieldKind::Text | FieldKind::Email)
    }

    /// Returns whether the kind references another collection.
    fn is_reference(&self) -> bool {
        matches!(
            self,
            FieldKind::Reference { .. } | FieldKind::ReferenceList { .. }
        )
    }
}

/// Built-in constraints attached to a field.
///
/// Which constraints apply depends on the field kind; inapplicable
/// combinations are rejected at schema build time.
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    /// Minimum character count (text, email)
    pub min_length: Option<usize>,
    /// Maximum character count (text, email)
    pub max_length: Option<usize>,
    /// Lower bound, inclusive (integer)
    pub min_value: Option<i64>,
    /// Upper bound, inclusive (integer)
    pub max_value: Option<i64>,
    /// Regex the value must match (text, email)
    pub pattern: Option<String>,
    /// Value must not already be taken in the schema's collection
    pub unique: bool,
}

/// A single field declaration: name, kind, flags, constraints, and an
/// ordered list of custom validators.
pub struct FieldSpec {
    name: String,
    kind: FieldKind,
    required: bool,
    read_only: bool,
    constraints: Constraints,
    pattern_re: Option<Regex>,
    validators: Vec<FieldValidator>,
}

impl FieldSpec {
    fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: true,
            read_only: false,
            constraints: Constraints::default(),
            pattern_re: None,
            validators: Vec::new(),
        }
    }

    /// A required text field
    pub fn text(name: &str) -> Self {
        Self::new(name, FieldKind::Text)
    }

    /// A required integer field
    pub fn integer(name: &str) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    /// A required email field
    pub fn email(name: &str) -> Self {
        Self::new(name, FieldKind::Email)
    }

    /// A required datetime field
    pub fn datetime(name: &str) -> Self {
        Self::new(name, FieldKind::DateTime)
    }

    /// A required reference to a record in `collection`
    pub fn reference(name: &str, collection: &str) -> Self {
        Self::new(
            name,
            FieldKind::Reference {
                collection: collection.to_string(),
            },
        )
    }

    /// A required list of references to records in `collection`
    pub fn reference_list(name: &str, collection: &str) -> Self {
        Self::new(
            name,
            FieldKind::ReferenceList {
                collection: collection.to_string(),
            },
        )
    }

    /// Marks the field optional (absent input is not an error)
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Marks the field read-only: never consumed from input, even if
    /// present, and never an error
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Requires the value to be unused in the schema's collection
    pub fn unique(mut self) -> Self {
        self.constraints.unique = true;
        self
    }

    /// Minimum character count
    pub fn min_length(mut self, n: usize) -> Self {
        self.constraints.min_length = Some(n);
        self
    }

    /// Maximum character count
    pub fn max_length(mut self, n: usize) -> Self {
        self.constraints.max_length = Some(n);
        self
    }

    /// Inclusive lower bound
    pub fn min_value(mut self, n: i64) -> Self {
        self.constraints.min_value = Some(n);
        self
    }

    /// Inclusive upper bound
    pub fn max_value(mut self, n: i64) -> Self {
        self.constraints.max_value = Some(n);
        self
    }

    /// Regex the value must match; compiled (and rejected if invalid)
    /// at schema build time
    pub fn pattern(mut self, pattern: &str) -> Self {
        self.constraints.pattern = Some(pattern.to_string());
        self
    }

    /// Attaches a custom validator. Validators run after built-in
    /// constraints, in attachment order, and stop at the first failure.
    pub fn validator(
        mut self,
        f: impl Fn(FieldValue) -> Result<FieldValue, String> + Send + Sync + 'static,
    ) -> Self {
        self.validators.push(Box::new(f));
        self
    }

    /// Field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field kind
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Whether the field must be present in non-partial input
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether the field is excluded from input acceptance
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Declared constraints
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Custom validators in attachment order
    pub fn validators(&self) -> &[FieldValidator] {
        &self.validators
    }

    /// Compiled pattern, if a pattern constraint was declared
    pub(crate) fn pattern_re(&self) -> Option<&Regex> {
        self.pattern_re.as_ref()
    }

    /// Validates constraint/kind compatibility and compiles the pattern.
    fn finalize(mut self) -> SchemaResult<Self> {
        let check = |applies: bool, constraint: &'static str| -> SchemaResult<()> {
            if applies {
                Ok(())
            } else {
                Err(SchemaError::ConstraintMismatch {
                    field: self.name.clone(),
                    constraint,
                    kind: self.kind.label(),
                })
            }
        };

        if self.constraints.min_length.is_some() {
            check(self.kind.is_textual(), "min_length")?;
        }
        if self.constraints.max_length.is_some() {
            check(self.kind.is_textual(), "max_length")?;
        }
        if self.constraints.pattern.is_some() {
            check(self.kind.is_textual(), "pattern")?;
        }
        if self.constraints.min_value.is_some() {
            check(self.kind == FieldKind::Integer, "min_value")?;
        }
        if self.constraints.max_value.is_some() {
            check(self.kind == FieldKind::Integer, "max_value")?;
        }
        if self.constraints.unique {
            check(!self.kind.is_reference(), "unique")?;
        }

        if let Some(pattern) = &self.constraints.pattern {
            self.pattern_re =
                Some(
                    Regex::new(pattern).map_err(|source| SchemaError::InvalidPattern {
                        field: self.name.clone(),
                        source,
                    })?,
                );
        }

        Ok(self)
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("read_only", &self.read_only)
            .field("constraints", &self.constraints)
            .field("validators", &self.validators.len())
            .finish()
    }
}

/// An ordered, immutable record schema.
///
/// Field declaration order is significant: it drives the field-level
/// validation pass and the shape of the output mapping.
pub struct RecordSchema {
    name: String,
    fields: Vec<FieldSpec>,
    record_validators: Vec<RecordValidator>,
}

impl RecordSchema {
    /// Starts building a schema for the named collection.
    pub fn builder(name: &str) -> SchemaBuilder {
        SchemaBuilder {
            name: name.to_string(),
            fields: Vec::new(),
            record_validators: Vec::new(),
        }
    }

    /// Schema (collection) name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name() == name)
    }

    /// Whole-record validators in declaration order
    pub fn record_validators(&self) -> &[RecordValidator] {
        &self.record_validators
    }
}

impl fmt::Debug for RecordSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordSchema")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("record_validators", &self.record_validators.len())
            .finish()
    }
}

/// Builder for [`RecordSchema`]. All structural checks happen in
/// [`SchemaBuilder::build`].
pub struct SchemaBuilder {
    name: String,
    fields: Vec<FieldSpec>,
    record_validators: Vec<RecordValidator>,
}

impl SchemaBuilder {
    /// Appends a field. Declaration order is preserved.
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Appends a whole-record validator. Validators run in declaration
    /// order, only after every field-level check passed, and stop at
    /// the first failure.
    pub fn record_validator(
        mut self,
        f: impl Fn(ValidatedRecord) -> Result<ValidatedRecord, String> + Send + Sync + 'static,
    ) -> Self {
        self.record_validators.push(Box::new(f));
        self
    }

    /// Finalizes the schema, rejecting structural problems.
    pub fn build(self) -> SchemaResult<RecordSchema> {
        let mut fields = Vec::with_capacity(self.fields.len());
        for spec in self.fields {
            if spec.name() == NON_FIELD_ERRORS {
                return Err(SchemaError::ReservedFieldName(spec.name().to_string()));
            }
            if fields.iter().any(|f: &FieldSpec| f.name() == spec.name()) {
                return Err(SchemaError::DuplicateField {
                    schema: self.name,
                    field: spec.name().to_string(),
                });
            }
            fields.push(spec.finalize()?);
        }

        Ok(RecordSchema {
            name: self.name,
            fields,
            record_validators: self.record_validators,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> RecordSchema {
        RecordSchema::builder("blog")
            .field(FieldSpec::text("title").unique().max_length(100))
            .field(FieldSpec::text("content"))
            .field(FieldSpec::reference("author", "author"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_field_order_preserved() {
        let schema = sample_schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["title", "content", "author"]);
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let result = RecordSchema::builder("blog")
            .field(FieldSpec::text("title"))
            .field(FieldSpec::integer("title"))
            .build();
        assert!(matches!(
            result,
            Err(SchemaError::DuplicateField { ref field, .. }) if field == "title"
        ));
    }

    #[test]
    fn test_reserved_field_name_rejected() {
        let result = RecordSchema::builder("blog")
            .field(FieldSpec::text(NON_FIELD_ERRORS))
            .build();
        assert!(matches!(result, Err(SchemaError::ReservedFieldName(_))));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let result = RecordSchema::builder("blog")
            .field(FieldSpec::text("title").pattern("("))
            .build();
        assert!(matches!(
            result,
            Err(SchemaError::InvalidPattern { ref field, .. }) if field == "title"
        ));
    }

    #[test]
    fn test_length_constraint_on_integer_rejected() {
        let result = RecordSchema::builder("blog")
            .field(FieldSpec::integer("views").max_length(10))
            .build();
        assert!(matches!(
            result,
            Err(SchemaError::ConstraintMismatch { constraint, .. }) if constraint == "max_length"
        ));
    }

    #[test]
    fn test_numeric_bound_on_text_rejected() {
        let result = RecordSchema::builder("blog")
            .field(FieldSpec::text("title").min_value(1))
            .build();
        assert!(matches!(
            result,
            Err(SchemaError::ConstraintMismatch { constraint, .. }) if constraint == "min_value"
        ));
    }

    #[test]
    fn test_unique_on_reference_rejected() {
        let result = RecordSchema::builder("blog")
            .field(FieldSpec::reference("author", "author").unique())
            .build();
        assert!(matches!(
            result,
            Err(SchemaError::ConstraintMismatch { constraint, .. }) if constraint == "unique"
        ));
    }

    #[test]
    fn test_field_lookup() {
        let schema = sample_schema();
        assert!(schema.field("title").is_some());
        assert!(schema.field("missing").is_none());
        assert_eq!(schema.field("author").unwrap().kind().label(), "reference");
    }

    #[test]
    fn test_defaults() {
        let spec = FieldSpec::text("title");
        assert!(spec.is_required());
        assert!(!spec.is_read_only());
        assert!(!spec.constraints().unique);
    }
}
