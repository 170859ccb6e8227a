//! Constraint removal: objective cleanup, marker pivoting, and
//! bookkeeping teardown.

use std::collections::BTreeSet;
use std::time::Instant;

use truss_expr::{Constraint, Variable};

use crate::error::SolverError;
use crate::solver::Solver;

impl Solver {
    /// Remove a previously added constraint and every internal variable
    /// it introduced.
    ///
    /// # Errors
    ///
    /// `ConstraintNotFound` when the handle has no recorded marker.
    pub fn remove_constraint(&mut self, cn: &Constraint) -> Result<(), SolverError> {
        if !self.marker_vars.contains_key(cn) {
            return Err(SolverError::ConstraintNotFound);
        }
        let started = Instant::now();

        // Settle stays so error-variable rows carry no drift into the
        // objective arithmetic below.
        self.reset_stay_constants();

        // Subtract the constraint's penalty from the objective row.
        let z = self.objective();
        let error_vars = self.error_vars.remove(cn).unwrap_or_default();
        if !error_vars.is_empty() {
            let penalty = cn.strength().weight() * cn.weight();
            for v in &error_vars {
                match self.tableau.row(v).cloned() {
                    Some(row) => self.tableau.add_expr_to_row(&z, &row, -penalty),
                    None => self.tableau.add_term_to_row(&z, v, -penalty),
                }
            }
        }

        let Some(marker) = self.marker_vars.remove(cn) else {
            return Err(SolverError::ConstraintNotFound);
        };

        // A parametric marker must be pivoted into the basis so its row
        // can be dropped.
        if !self.tableau.is_basic(&marker) {
            match self.tableau.column(&marker).cloned() {
                None => self.tableau.remove_column(&marker),
                Some(column) => match self.find_marker_leaving_row(&marker, &column)? {
                    Some(exit) => self.pivot(&marker, &exit)?,
                    // The marker survives only in the objective row; drop
                    // the column outright.
                    None => self.tableau.remove_column(&marker),
                },
            }
        }
        if self.tableau.is_basic(&marker) {
            self.tableau.remove_row(&marker);
        }

        // Columns for the error variables the marker did not account for.
        for v in &error_vars {
            if v != &marker {
                self.tableau.remove_column(v);
            }
        }

        if cn.is_stay() {
            self.stay_plus_error_vars.retain(|v| !error_vars.contains(v));
            self.stay_minus_error_vars
                .retain(|v| !error_vars.contains(v));
        } else if cn.is_edit() {
            let variable = cn
                .variable()
                .cloned()
                .ok_or_else(|| SolverError::internal("edit constraint has no variable"))?;
            // Both error-variable columns are already gone via the loop
            // above; only the edit record is left to drop.
            self.edit_info
                .remove(&variable)
                .ok_or_else(|| SolverError::internal("edit constraint has no edit record"))?;
        }

        self.needs_solving = true;
        if self.config.auto_solve {
            self.optimize(&z)?;
            self.set_external_variables();
        }
        tracing::debug!(
            component = "solver",
            operation = "remove_constraint",
            status = "success",
            constraint = %cn,
            kind = cn.kind().as_str(),
            marker = marker.name(),
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Removed constraint"
        );
        Ok(())
    }

    /// Choose the row a parametric marker will displace.
    ///
    /// First pass: restricted basics with a negative marker coefficient,
    /// minimizing `-constant / coefficient`. Second pass: restricted
    /// basics with a positive coefficient, minimizing
    /// `constant / coefficient`. Failing both, any row in the marker's
    /// column other than the objective (which must remain a row) will do.
    fn find_marker_leaving_row(
        &self,
        marker: &Variable,
        column: &BTreeSet<Variable>,
    ) -> Result<Option<Variable>, SolverError> {
        let mut min_ratio = f64::INFINITY;
        let mut exit: Option<Variable> = None;
        for basic in column {
            if !basic.is_restricted() {
                continue;
            }
            let row = self
                .tableau
                .row(basic)
                .ok_or_else(|| SolverError::internal("column refers to a missing row"))?;
            let coeff = row.coefficient_for(marker);
            if coeff < 0.0 {
                let ratio = -row.constant() / coeff;
                if ratio < min_ratio {
                    min_ratio = ratio;
                    exit = Some(basic.clone());
                }
            }
        }

        if exit.is_none() {
            let mut min_ratio = f64::INFINITY;
            for basic in column {
                if !basic.is_restricted() {
                    continue;
                }
                let row = self
                    .tableau
                    .row(basic)
                    .ok_or_else(|| SolverError::internal("column refers to a missing row"))?;
                let coeff = row.coefficient_for(marker);
                if coeff > 0.0 {
                    let ratio = row.constant() / coeff;
                    if ratio < min_ratio {
                        min_ratio = ratio;
                        exit = Some(basic.clone());
                    }
                }
            }
        }

        Ok(exit.or_else(|| {
            column
                .iter()
                .find(|basic| **basic != self.objective)
                .cloned()
        }))
    }
}
