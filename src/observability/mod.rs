//! Observability subsystem for recval
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on validation outcomes
//! 3. No async or background threads
//! 4. Deterministic output
//! 5. Field values are never logged, only counts and names

mod logger;

pub use logger::{Logger, Severity};
