//! The validator library.
//!
//! Field validators are pure functions over raw string values; group rules
//! are declared over a snapshot of related values and re-evaluated on every
//! pass, so conditional requiredness (the score/date pairing) stays
//! idempotent and independent of edit order.

pub mod field;
pub mod group;
pub mod rules;

pub use rules::{Failure, Rule, ValidationReport, Violation};
