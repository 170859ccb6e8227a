//! Stay constraints and the edit-session protocol.

use truss_expr::{near_zero, Constraint, Strength, Variable};

use crate::error::SolverError;
use crate::solver::Solver;

/// Per-edit-variable bookkeeping.
#[derive(Debug)]
pub(crate) struct EditInfo {
    constraint: Constraint,
    plus: Variable,
    minus: Variable,
    prev_constant: f64,
    /// Ordinal used to unwind nested edit sessions.
    index: usize,
}

impl EditInfo {
    pub(crate) fn new(
        constraint: Constraint,
        plus: Variable,
        minus: Variable,
        prev_constant: f64,
        index: usize,
    ) -> Self {
        EditInfo {
            constraint,
            plus,
            minus,
            prev_constant,
            index,
        }
    }
}

impl Solver {
    // ── Stays ───────────────────────────────────────────────

    /// Weak stay with weight 1: keep `v` near its current value.
    pub fn add_stay(&mut self, v: &Variable) -> Result<Constraint, SolverError> {
        self.add_stay_with(v, Strength::Weak, 1.0)
    }

    /// Stay with explicit strength and weight.
    pub fn add_stay_with(
        &mut self,
        v: &Variable,
        strength: Strength,
        weight: f64,
    ) -> Result<Constraint, SolverError> {
        let cn = Constraint::stay(v, strength, weight);
        self.add_constraint(&cn)?;
        Ok(cn)
    }

    /// Zero the constant of whichever of each stay pair's error variables
    /// is basic; the parametric one is already zero-valued.
    pub(crate) fn reset_stay_constants(&mut self) {
        for i in 0..self.stay_plus_error_vars.len() {
            let plus = self.stay_plus_error_vars[i].clone();
            if !self.tableau.zero_row_constant(&plus) {
                let minus = self.stay_minus_error_vars[i].clone();
                self.tableau.zero_row_constant(&minus);
            }
        }
    }

    // ── Edit variables ──────────────────────────────────────

    /// Register `v` as editable at the default strong strength.
    pub fn add_edit_var(&mut self, v: &Variable) -> Result<(), SolverError> {
        self.add_edit_var_with(v, Strength::Strong)
    }

    /// Register `v` as editable at an explicit (non-required) strength.
    pub fn add_edit_var_with(
        &mut self,
        v: &Variable,
        strength: Strength,
    ) -> Result<(), SolverError> {
        if strength.is_required() {
            return Err(SolverError::internal(
                "edit constraints may not be required",
            ));
        }
        if self.edit_info.contains_key(v) {
            return Err(SolverError::DuplicateConstraint);
        }
        let cn = Constraint::edit(v, strength);
        self.add_constraint(&cn)
    }

    pub fn has_edit_var(&self, v: &Variable) -> bool {
        self.edit_info.contains_key(v)
    }

    pub fn num_edit_vars(&self) -> usize {
        self.edit_info.len()
    }

    // ── Edit sessions ───────────────────────────────────────

    /// Open an edit session over the currently registered edit variables.
    pub fn begin_edit(&mut self) -> Result<(), SolverError> {
        if self.edit_info.is_empty() {
            return Err(SolverError::internal("begin_edit with no edit variables"));
        }
        self.tableau.clear_infeasible();
        self.reset_stay_constants();
        self.edit_depth.push(self.edit_info.len());
        tracing::debug!(
            component = "solver",
            operation = "begin_edit",
            status = "success",
            edit_vars = self.edit_info.len(),
            depth = self.edit_depth.len() - 1,
            "Opened edit session"
        );
        Ok(())
    }

    /// Record a new target value for an edit variable. Takes effect at
    /// the next [`Solver::resolve`].
    pub fn suggest_value(&mut self, v: &Variable, value: f64) -> Result<(), SolverError> {
        let info = self.edit_info.get_mut(v).ok_or_else(|| {
            SolverError::internal(format!("suggest_value on non-edit variable {}", v.name()))
        })?;
        let delta = value - info.prev_constant;
        info.prev_constant = value;
        let plus = info.plus.clone();
        let minus = info.minus.clone();
        self.delta_edit_constant(delta, &plus, &minus);
        tracing::trace!(
            component = "solver",
            operation = "suggest_value",
            variable = v.name(),
            value,
            delta,
            "Recorded suggested value"
        );
        Ok(())
    }

    /// Shift row constants by `delta` through an edit constraint's error
    /// pair.
    fn delta_edit_constant(&mut self, delta: f64, plus: &Variable, minus: &Variable) {
        if self.tableau.shift_row_constant(plus, delta).is_some() {
            return;
        }
        if self.tableau.shift_row_constant(minus, -delta).is_some() {
            return;
        }
        // Both parametric: push the delta through every row mentioning
        // the minus variable.
        let Some(column) = self.tableau.column(minus).cloned() else {
            return;
        };
        for basic in column {
            let coeff = self
                .tableau
                .row(&basic)
                .map(|row| row.coefficient_for(minus))
                .unwrap_or(0.0);
            self.tableau.shift_row_constant(&basic, coeff * delta);
        }
    }

    /// Dual-optimize to absorb suggested values, then write back external
    /// values and settle stays.
    pub fn resolve(&mut self) -> Result<(), SolverError> {
        self.dual_optimize()?;
        self.set_external_variables();
        self.tableau.clear_infeasible();
        self.reset_stay_constants();
        Ok(())
    }

    /// Close the innermost edit session, removing the edit variables it
    /// introduced.
    pub fn end_edit(&mut self) -> Result<(), SolverError> {
        if self.edit_info.is_empty() {
            return Err(SolverError::internal("end_edit with no edit variables"));
        }
        if self.edit_depth.len() <= 1 {
            return Err(SolverError::internal("end_edit without begin_edit"));
        }
        self.resolve()?;
        self.edit_depth.pop();
        let keep = self.edit_depth.last().copied().unwrap_or(0);
        self.remove_edit_vars_to(keep)?;
        tracing::debug!(
            component = "solver",
            operation = "end_edit",
            status = "success",
            remaining_edit_vars = self.edit_info.len(),
            "Closed edit session"
        );
        Ok(())
    }

    /// Remove every edit variable whose ordinal is `keep` or later.
    fn remove_edit_vars_to(&mut self, keep: usize) -> Result<(), SolverError> {
        let doomed: Vec<Constraint> = self
            .edit_info
            .values()
            .filter(|info| info.index >= keep)
            .map(|info| info.constraint.clone())
            .collect();
        for cn in doomed {
            self.remove_constraint(&cn)?;
        }
        Ok(())
    }

    /// One-shot convenience: edit `v` to `value` and immediately resolve.
    pub fn set_edited_value(&mut self, v: &Variable, value: f64) -> Result<(), SolverError> {
        if !self.contains_variable(v) {
            v.set_value(value);
            return Ok(());
        }
        if near_zero(value - v.value()) {
            return Ok(());
        }
        self.add_edit_var(v)?;
        self.begin_edit()?;
        self.suggest_value(v, value)?;
        self.end_edit()
    }
}
