//! recval - a strict, deterministic record validation core
//!
//! Validates candidate input mappings against ordered record schemas,
//! producing either a coerced record or a structured multi-field error
//! report. Persistence is a separate collaborator, invoked only after
//! validation succeeds.

pub mod lookup;
pub mod observability;
pub mod pipeline;
pub mod record;
pub mod schema;
pub mod store;
