//! Schema error types
//!
//! A malformed schema is a programming error, not an input error: every
//! variant here fails fast at schema-construction or load time, never
//! per validation call.

use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while constructing or loading a schema
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A field name appears more than once in the same schema
    #[error("duplicate field '{field}' in schema '{schema}'")]
    DuplicateField { schema: String, field: String },

    /// A field uses the name reserved for whole-record errors
    #[error("field name '{0}' is reserved for whole-record errors")]
    ReservedFieldName(String),

    /// A pattern constraint failed to compile
    #[error("invalid pattern on field '{field}'")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    /// A constraint was declared on a field kind it cannot apply to
    #[error("constraint '{constraint}' does not apply to {kind} field '{field}'")]
    ConstraintMismatch {
        field: String,
        constraint: &'static str,
        kind: &'static str,
    },

    /// A schema file declares an unrecognized field kind
    #[error("unknown field kind '{kind}' on field '{field}'")]
    UnknownKind { field: String, kind: String },

    /// A reference field does not name its target collection
    #[error("reference field '{0}' is missing its target collection")]
    MissingCollection(String),

    /// A schema with the same name is already registered
    #[error("schema '{0}' is already registered")]
    DuplicateSchema(String),

    /// A schema file could not be read or parsed
    #[error("malformed schema file '{path}': {reason}")]
    MalformedFile { path: String, reason: String },
}
