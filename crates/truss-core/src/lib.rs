//! Incremental constraint solving for prioritized linear systems.
//!
//! truss maintains a solution to a system of linear equality and
//! inequality constraints under a four-level strength model: required
//! constraints hold exactly, and the weighted error of the soft ones is
//! minimized. Edits re-solve incrementally through the dual simplex
//! rather than from scratch, which is what makes the solver suitable for
//! interactive layout and direct manipulation.
//!
//! # Overview
//!
//! - [`Solver`]: the solver engine and its public protocol
//! - [`SolverConfig`]: auto-solve and pivot-limit configuration
//! - [`SolverError`]: error kinds reported at the call boundary
//! - [`Tableau`]: the sparse row/column structure the engine pivots on
//! - [`PrettyPrintOptions`]: human-readable solver dumps

pub mod config;
pub mod error;
pub mod pretty;
pub mod solver;
pub mod tableau;

pub use config::SolverConfig;
pub use error::SolverError;
pub use pretty::{format_ascii_number, PrettyPrintOptions};
pub use solver::Solver;
pub use tableau::Tableau;
