//! Schema subsystem for recval
//!
//! A schema is an ordered sequence of field declarations plus an
//! ordered list of whole-record validators.
//!
//! # Design Principles
//!
//! - Schemas are built once and immutable thereafter
//! - Structural problems fail fast at build or load time
//! - Field declaration order is significant
//! - Validator callables are recognized by capability, not by class

mod errors;
mod loader;
mod types;

pub use errors::{SchemaError, SchemaResult};
pub use loader::SchemaLoader;
pub use types::{
    Constraints, FieldKind, FieldSpec, FieldValidator, RecordSchema, RecordValidator,
    SchemaBuilder,
};
