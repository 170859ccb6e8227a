//! Symbolic layer for the truss constraint solver.
//!
//! This crate holds everything the solver manipulates symbolically:
//! variable handles, constraint strengths, linear expressions, and
//! constraint objects with their operator-overload construction API.

pub mod expr;
pub mod strength;
pub mod variable;

pub use expr::{Constraint, ConstraintKind, LinearExpr, Relation, EPSILON, near_zero};
pub use strength::Strength;
pub use variable::{Variable, VariableKind};
