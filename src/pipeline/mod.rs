//! Validation pipeline subsystem for recval
//!
//! Deterministically validates a candidate input mapping against a
//! schema and produces either a coerced record or an itemized error
//! report, without performing persistence.
//!
//! # Design Principles
//!
//! - Field-level pass in declaration order, fields independent
//! - Per-field chain stops at its first failure
//! - Whole-record validators run only on fully valid field data
//! - Failures are returned as structured data, never thrown (the
//!   strict wrapper exists for callers that want a thrown error)
//! - Stateless: every call is a pure function of (schema, input, mode)

mod coerce;
mod constraints;
mod report;
mod validator;

pub use report::{ValidationError, NON_FIELD_ERRORS};
pub use validator::{Mode, Pipeline, StrictError, REQUIRED_MESSAGE};
