//! Solver error types.

/// Errors reported at the solver's call boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    /// The required constraints are inconsistent; the offending
    /// constraint was not added and the tableau is unchanged.
    RequiredFailure,
    /// `remove_constraint` was called with a constraint that was never
    /// added (or was already removed).
    ConstraintNotFound,
    /// The constraint (or edit variable) is already in the solver.
    DuplicateConstraint,
    /// An internal invariant did not hold; indicates a solver bug or
    /// protocol misuse (e.g. suggesting a value for a non-edit variable).
    Internal(String),
}

impl SolverError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            SolverError::RequiredFailure => "CONSTRAINT_REQUIRED_UNSATISFIABLE",
            SolverError::ConstraintNotFound => "CONSTRAINT_NOT_FOUND",
            SolverError::DuplicateConstraint => "CONSTRAINT_DUPLICATE",
            SolverError::Internal(_) => "SOLVER_INTERNAL",
        }
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        SolverError::Internal(message.into())
    }
}

impl std::fmt::Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverError::RequiredFailure => write!(
                f,
                "[{}] Required constraints are unsatisfiable together",
                self.code()
            ),
            SolverError::ConstraintNotFound => {
                write!(f, "[{}] Constraint is not in the solver", self.code())
            }
            SolverError::DuplicateConstraint => {
                write!(f, "[{}] Constraint was already added", self.code())
            }
            SolverError::Internal(msg) => {
                write!(f, "[{}] Solver internal error: {}", self.code(), msg)
            }
        }
    }
}

impl std::error::Error for SolverError {}

#[cfg(test)]
mod tests {
    use super::SolverError;

    #[test]
    fn error_code_is_stable() {
        assert_eq!(
            SolverError::RequiredFailure.code(),
            "CONSTRAINT_REQUIRED_UNSATISFIABLE"
        );
        assert_eq!(SolverError::ConstraintNotFound.code(), "CONSTRAINT_NOT_FOUND");
        assert_eq!(SolverError::DuplicateConstraint.code(), "CONSTRAINT_DUPLICATE");
        assert_eq!(
            SolverError::Internal(String::new()).code(),
            "SOLVER_INTERNAL"
        );
    }

    #[test]
    fn display_prefixes_error_code() {
        let rendered = SolverError::RequiredFailure.to_string();
        assert!(rendered.starts_with("[CONSTRAINT_REQUIRED_UNSATISFIABLE]"));

        let internal = SolverError::internal("objective function is unbounded");
        let rendered = internal.to_string();
        assert!(rendered.contains("SOLVER_INTERNAL"));
        assert!(rendered.contains("unbounded"));
    }
}
