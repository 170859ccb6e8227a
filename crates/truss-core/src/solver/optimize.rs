//! Primal simplex, dual simplex, and the pivot primitive.

use std::time::Instant;

use truss_expr::{Variable, EPSILON};

use crate::error::SolverError;
use crate::solver::Solver;

impl Solver {
    /// Phase-2 primal simplex: drive the objective row for `z` to its
    /// minimum.
    ///
    /// Each round enters the pivotable variable with the most negative
    /// objective coefficient and exits the pivotable basic giving the
    /// minimum ratio `-constant / coefficient`. An empty ratio test means
    /// the objective is unbounded, which cannot happen in a well-formed
    /// tableau.
    pub(crate) fn optimize(&mut self, z: &Variable) -> Result<(), SolverError> {
        let started = Instant::now();
        let mut pivots: u64 = 0;

        loop {
            let z_row = self
                .tableau
                .row(z)
                .ok_or_else(|| SolverError::internal("objective row is missing"))?;

            let mut objective_coeff = 0.0;
            let mut entry: Option<Variable> = None;
            for (v, &c) in z_row.terms() {
                if v.is_pivotable() && c < objective_coeff {
                    objective_coeff = c;
                    entry = Some(v.clone());
                }
            }
            if objective_coeff >= -EPSILON {
                break;
            }
            let Some(entry) = entry else {
                break;
            };

            let mut min_ratio = f64::INFINITY;
            let mut exit: Option<Variable> = None;
            if let Some(column) = self.tableau.column(&entry) {
                for basic in column {
                    if !basic.is_pivotable() {
                        continue;
                    }
                    let row = self
                        .tableau
                        .row(basic)
                        .ok_or_else(|| SolverError::internal("column refers to a missing row"))?;
                    let coeff = row.coefficient_for(&entry);
                    if coeff < 0.0 {
                        let ratio = -row.constant() / coeff;
                        if ratio < min_ratio {
                            min_ratio = ratio;
                            exit = Some(basic.clone());
                        }
                    }
                }
            }
            let exit = exit
                .ok_or_else(|| SolverError::internal("objective function is unbounded"))?;

            self.pivot(&entry, &exit)?;
            pivots += 1;
            if let Some(limit) = self.config.pivot_limit {
                if pivots > limit {
                    return Err(SolverError::internal(format!(
                        "pivot limit of {limit} exceeded during optimize"
                    )));
                }
            }
        }

        tracing::debug!(
            component = "solver",
            operation = "optimize",
            status = "success",
            objective = z.name(),
            pivots,
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Optimized objective"
        );
        Ok(())
    }

    /// Dual simplex: re-establish feasibility after row constants were
    /// perturbed, starting from an optimal but infeasible tableau.
    pub(crate) fn dual_optimize(&mut self) -> Result<(), SolverError> {
        let started = Instant::now();
        let mut pivots: u64 = 0;
        let z = self.objective();

        while let Some(exit) = self.tableau.pop_infeasible() {
            let Some(row) = self.tableau.row(&exit) else {
                continue;
            };
            if row.constant() >= 0.0 {
                continue;
            }

            let z_row = self
                .tableau
                .row(&z)
                .ok_or_else(|| SolverError::internal("objective row is missing"))?;
            let mut min_ratio = f64::INFINITY;
            let mut entry: Option<Variable> = None;
            for (v, &c) in row.terms() {
                if c > 0.0 && v.is_pivotable() {
                    let ratio = z_row.coefficient_for(v) / c;
                    if ratio < min_ratio {
                        min_ratio = ratio;
                        entry = Some(v.clone());
                    }
                }
            }
            let entry = entry.ok_or_else(|| {
                SolverError::internal("dual optimize found no entering variable")
            })?;

            self.pivot(&entry, &exit)?;
            pivots += 1;
            if let Some(limit) = self.config.pivot_limit {
                if pivots > limit {
                    return Err(SolverError::internal(format!(
                        "pivot limit of {limit} exceeded during dual optimize"
                    )));
                }
            }
        }

        tracing::debug!(
            component = "solver",
            operation = "dual_optimize",
            status = "success",
            pivots,
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Restored feasibility"
        );
        Ok(())
    }

    /// Swap `entry` into the basis, displacing `exit`.
    pub(crate) fn pivot(&mut self, entry: &Variable, exit: &Variable) -> Result<(), SolverError> {
        let expr = self
            .tableau
            .remove_row(exit)
            .ok_or_else(|| SolverError::internal("pivot exit variable has no row"))?;
        let expr = expr.change_subject(exit, entry);
        self.tableau.substitute_out(entry, &expr);
        self.tableau.add_row(entry.clone(), expr);
        tracing::trace!(
            component = "solver",
            operation = "pivot",
            entry = entry.name(),
            exit = exit.name(),
            "Pivoted"
        );
        Ok(())
    }
}
