//! Solver configuration types.

/// Configuration options for solver behavior.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Re-optimize and write back external values after every structural
    /// mutation. Disable for batch loading, then call
    /// [`crate::Solver::solve`] once.
    pub auto_solve: bool,
    /// Upper bound on pivots per optimization pass. `None` means no
    /// limit; when exceeded the pass aborts with an internal error.
    pub pivot_limit: Option<u64>,
}

impl SolverConfig {
    /// Create a new configuration with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable automatic re-solving.
    pub fn with_auto_solve(mut self, enabled: bool) -> Self {
        self.auto_solve = enabled;
        self
    }

    /// Set the pivot limit per optimization pass.
    pub fn with_pivot_limit(mut self, limit: u64) -> Self {
        self.pivot_limit = Some(limit);
        self
    }

    /// Check if this configuration is all defaults.
    pub fn is_default(&self) -> bool {
        self.auto_solve && self.pivot_limit.is_none()
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            auto_solve: true,
            pivot_limit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SolverConfig;

    #[test]
    fn test_config_new_is_default() {
        let config = SolverConfig::new();
        assert!(config.is_default());
        assert!(config.auto_solve);
        assert_eq!(config.pivot_limit, None);
    }

    #[test]
    fn test_config_builder_pattern() {
        let config = SolverConfig::new()
            .with_auto_solve(false)
            .with_pivot_limit(10_000);
        assert!(!config.is_default());
        assert!(!config.auto_solve);
        assert_eq!(config.pivot_limit, Some(10_000));
    }

    #[test]
    fn test_config_partial_is_not_default() {
        let config = SolverConfig::new().with_pivot_limit(5);
        assert!(!config.is_default());
        assert!(config.auto_solve);
    }
}
