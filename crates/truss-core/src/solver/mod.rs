//! The solver engine and its public protocol.
//!
//! # Module Organization
//!
//! - `add`: canonical row construction and the two addition paths
//! - `optimize`: primal simplex, dual simplex, and the pivot primitive
//! - `remove`: constraint removal and its objective cleanup
//! - `edit`: stay constraints and the edit-session protocol

mod add;
mod edit;
mod optimize;
mod remove;

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use truss_expr::{near_zero, Constraint, LinearExpr, Relation, Strength, Variable, EPSILON};

use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::tableau::Tableau;

pub(crate) use edit::EditInfo;

/// An incremental solver for prioritized linear constraint systems.
///
/// Constraints are added and removed by handle; external variables are
/// read through their own handles after each solve. With `auto_solve`
/// enabled (the default) every structural mutation re-optimizes and
/// writes back values; otherwise call [`Solver::solve`] after a batch of
/// mutations.
#[derive(Debug)]
pub struct Solver {
    tableau: Tableau,
    objective: Variable,
    marker_vars: BTreeMap<Constraint, Variable>,
    error_vars: BTreeMap<Constraint, BTreeSet<Variable>>,
    edit_info: BTreeMap<Variable, EditInfo>,
    /// Edit-variable counts at each `begin_edit`, with a bottom sentinel
    /// of zero so the outermost `end_edit` unwinds everything.
    edit_depth: Vec<usize>,
    stay_plus_error_vars: Vec<Variable>,
    stay_minus_error_vars: Vec<Variable>,
    slack_counter: u64,
    dummy_counter: u64,
    artificial_counter: u64,
    needs_solving: bool,
    config: SolverConfig,
}

impl Solver {
    /// Create an empty solver with the default configuration.
    pub fn new() -> Self {
        Self::with_config(SolverConfig::new())
    }

    /// Create an empty solver with an explicit configuration.
    pub fn with_config(config: SolverConfig) -> Self {
        let objective = Variable::objective("z");
        let mut tableau = Tableau::new();
        tableau.add_row(objective.clone(), LinearExpr::default());
        tracing::debug!(
            component = "solver",
            operation = "init",
            status = "success",
            auto_solve = config.auto_solve,
            "Created solver"
        );
        Solver {
            tableau,
            objective,
            marker_vars: BTreeMap::new(),
            error_vars: BTreeMap::new(),
            edit_info: BTreeMap::new(),
            edit_depth: vec![0],
            stay_plus_error_vars: Vec::new(),
            stay_minus_error_vars: Vec::new(),
            slack_counter: 0,
            dummy_counter: 0,
            artificial_counter: 0,
            needs_solving: false,
            config,
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Toggle automatic re-solving after structural mutations.
    pub fn set_auto_solve(&mut self, enabled: bool) {
        self.config.auto_solve = enabled;
    }

    /// Read access to the tableau, for inspection and tests.
    pub fn tableau(&self) -> &Tableau {
        &self.tableau
    }

    pub(crate) fn objective(&self) -> Variable {
        self.objective.clone()
    }

    // ── Constraint addition ─────────────────────────────────

    /// Incorporate a constraint into the tableau.
    ///
    /// # Errors
    ///
    /// `DuplicateConstraint` when the handle is already in the solver;
    /// `RequiredFailure` when a required constraint is inconsistent with
    /// the ones already added (the tableau is left unchanged).
    pub fn add_constraint(&mut self, cn: &Constraint) -> Result<(), SolverError> {
        if self.marker_vars.contains_key(cn) {
            return Err(SolverError::DuplicateConstraint);
        }
        if cn.is_edit() {
            if let Some(v) = cn.variable() {
                if self.edit_info.contains_key(v) {
                    return Err(SolverError::DuplicateConstraint);
                }
            }
        }
        let started = Instant::now();

        let built = self.new_expression(cn);
        let mut expr = built.expr;
        let directly = self.try_adding_directly(&mut expr)?;
        if !directly {
            self.add_with_artificial_variable(expr)?;
        }

        if cn.is_edit() {
            let variable = cn
                .variable()
                .cloned()
                .ok_or_else(|| SolverError::internal("edit constraint has no variable"))?;
            let (plus, minus) = match (built.plus.clone(), built.minus.clone()) {
                (Some(plus), Some(minus)) => (plus, minus),
                _ => {
                    return Err(SolverError::internal(
                        "edit constraint is missing its error variables",
                    ))
                }
            };
            let index = self.edit_info.len();
            self.edit_info.insert(
                variable,
                EditInfo::new(cn.clone(), plus, minus, built.prev_constant, index),
            );
        }

        self.marker_vars.insert(cn.clone(), built.marker.clone());
        self.needs_solving = true;
        if self.config.auto_solve {
            let z = self.objective();
            self.optimize(&z)?;
            self.set_external_variables();
        }
        tracing::debug!(
            component = "solver",
            operation = "add_constraint",
            status = "success",
            constraint = %cn,
            kind = cn.kind().as_str(),
            marker = built.marker.name(),
            directly,
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Added constraint"
        );
        Ok(())
    }

    // ── Solving and write-back ──────────────────────────────

    /// Primal-optimize and write back external values, if anything
    /// changed since the last solve.
    pub fn solve(&mut self) -> Result<(), SolverError> {
        if self.needs_solving {
            let z = self.objective();
            self.optimize(&z)?;
            self.set_external_variables();
        }
        Ok(())
    }

    /// Push the tableau solution out to the external variable handles:
    /// parametric externals become 0, basic externals take their row
    /// constant.
    pub(crate) fn set_external_variables(&mut self) {
        for v in self.tableau.external_parametric_vars().clone() {
            if self.tableau.is_basic(&v) {
                tracing::warn!(
                    component = "solver",
                    operation = "write_back",
                    variable = v.name(),
                    "External variable is indexed as parametric but owns a row; skipping"
                );
                continue;
            }
            v.set_value(0.0);
        }
        for v in self.tableau.external_rows().clone() {
            if let Some(row) = self.tableau.row(&v) {
                v.set_value(row.constant());
            }
        }
        self.needs_solving = false;
    }

    // ── Variables and sugar ─────────────────────────────────

    /// True when the variable occurs anywhere in the tableau.
    pub fn contains_variable(&self, v: &Variable) -> bool {
        self.tableau.contains(v)
    }

    /// Ensure `v` is known to the solver, adding a weak stay if it is
    /// not.
    pub fn add_var(&mut self, v: &Variable) -> Result<(), SolverError> {
        if !self.contains_variable(v) {
            self.add_stay(v)?;
        }
        Ok(())
    }

    /// Required constraint `v >= lower`.
    pub fn add_lower_bound(&mut self, v: &Variable, lower: f64) -> Result<Constraint, SolverError> {
        let cn = Constraint::new(
            LinearExpr::from_variable(v).plus_constant(-lower),
            Relation::GreaterOrEqual,
            Strength::Required,
        );
        self.add_constraint(&cn)?;
        Ok(cn)
    }

    /// Required constraint `v <= upper`.
    pub fn add_upper_bound(&mut self, v: &Variable, upper: f64) -> Result<Constraint, SolverError> {
        let cn = Constraint::new(
            LinearExpr::from_variable(v).plus_constant(-upper),
            Relation::LessOrEqual,
            Strength::Required,
        );
        self.add_constraint(&cn)?;
        Ok(cn)
    }

    /// Required constraints `lower <= v <= upper`.
    pub fn add_bounds(
        &mut self,
        v: &Variable,
        lower: f64,
        upper: f64,
    ) -> Result<(Constraint, Constraint), SolverError> {
        let low = self.add_lower_bound(v, lower)?;
        let high = self.add_upper_bound(v, upper)?;
        Ok((low, high))
    }

    // ── Probes ──────────────────────────────────────────────

    pub fn num_constraints(&self) -> usize {
        self.marker_vars.len()
    }

    /// Evaluate a constraint against the current external values.
    pub fn is_constraint_satisfied(&self, cn: &Constraint) -> bool {
        let expr = cn.expr();
        let mut value = expr.constant();
        for (v, c) in expr.terms() {
            if v.is_external() {
                value += c * v.value();
            }
        }
        match cn.relation() {
            Relation::Equal => near_zero(value),
            Relation::GreaterOrEqual => value >= -EPSILON,
            // Never stored; constructors normalize it away.
            Relation::LessOrEqual => value <= EPSILON,
        }
    }

    // ── Internal accessors shared by the solver submodules ──

    pub(crate) fn insert_error_var(&mut self, cn: &Constraint, v: &Variable) {
        self.error_vars
            .entry(cn.clone())
            .or_default()
            .insert(v.clone());
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}
