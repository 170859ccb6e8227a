//! Expression types for constraint construction.
//!
//! - `core`       — LinearExpr: sparse symbolic sum with pivot algebra
//! - `constraint` — Constraint: expression + relation + strength handle
//! - `ops`        — std-ops overloads and comparison builders

pub mod constraint;
pub mod core;
pub mod ops;

pub use constraint::{Constraint, ConstraintKind, Relation};
pub use core::{LinearExpr, EPSILON, near_zero};
