//! Sparse tableau: the bidirectional row/column structure the solver
//! pivots on.
//!
//! `rows` maps each basic variable to its defining expression; `columns`
//! is the exact reverse index, mapping each parametric variable to the
//! set of basic variables whose row mentions it. Every mutation keeps the
//! two in lockstep, together with the external-variable indices used for
//! value write-back and the set of rows whose constant has gone negative.

use std::collections::{BTreeMap, BTreeSet};

use truss_expr::{near_zero, LinearExpr, Variable};

#[derive(Debug, Default)]
pub struct Tableau {
    rows: BTreeMap<Variable, LinearExpr>,
    columns: BTreeMap<Variable, BTreeSet<Variable>>,
    external_rows: BTreeSet<Variable>,
    external_parametric_vars: BTreeSet<Variable>,
    infeasible_rows: BTreeSet<Variable>,
}

impl Tableau {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Read access ─────────────────────────────────────────

    pub fn row(&self, v: &Variable) -> Option<&LinearExpr> {
        self.rows.get(v)
    }

    pub fn is_basic(&self, v: &Variable) -> bool {
        self.rows.contains_key(v)
    }

    pub fn column(&self, v: &Variable) -> Option<&BTreeSet<Variable>> {
        self.columns.get(v)
    }

    pub fn has_column(&self, v: &Variable) -> bool {
        self.columns.contains_key(v)
    }

    /// True when the variable occurs anywhere in the tableau.
    pub fn contains(&self, v: &Variable) -> bool {
        self.is_basic(v) || self.has_column(v)
    }

    pub fn rows(&self) -> impl Iterator<Item = (&Variable, &LinearExpr)> {
        self.rows.iter()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn external_rows(&self) -> &BTreeSet<Variable> {
        &self.external_rows
    }

    pub fn external_parametric_vars(&self) -> &BTreeSet<Variable> {
        &self.external_parametric_vars
    }

    pub fn infeasible_rows(&self) -> &BTreeSet<Variable> {
        &self.infeasible_rows
    }

    // ── Structural mutation ─────────────────────────────────

    /// Record `basic = expr` and index every term of `expr`.
    pub fn add_row(&mut self, basic: Variable, expr: LinearExpr) {
        for v in expr.terms().keys() {
            self.attach(v, &basic);
        }
        if basic.is_external() {
            self.external_rows.insert(basic.clone());
        }
        tracing::trace!(
            component = "tableau",
            operation = "add_row",
            basic = basic.name(),
            terms = expr.num_terms(),
            constant = expr.constant(),
            "Added row"
        );
        self.rows.insert(basic, expr);
    }

    /// Drop the row for `basic`, detaching it from every column it
    /// referenced. Returns the removed expression.
    pub fn remove_row(&mut self, basic: &Variable) -> Option<LinearExpr> {
        let expr = self.rows.remove(basic)?;
        for v in expr.terms().keys() {
            self.detach(v, basic);
        }
        self.infeasible_rows.remove(basic);
        if basic.is_external() {
            self.external_rows.remove(basic);
        }
        tracing::trace!(
            component = "tableau",
            operation = "remove_row",
            basic = basic.name(),
            "Removed row"
        );
        Some(expr)
    }

    /// Drop every occurrence of `v` as a column, removing its term from
    /// each row that mentions it.
    pub fn remove_column(&mut self, v: &Variable) {
        if let Some(basics) = self.columns.remove(v) {
            for basic in basics {
                if let Some(row) = self.rows.get(&basic) {
                    let updated = row.with_term_set(v, 0.0);
                    self.rows.insert(basic, updated);
                }
            }
        }
        if v.is_external() {
            self.external_rows.remove(v);
            self.external_parametric_vars.remove(v);
        }
    }

    /// Replace `v` with `expr` in every row that mentions it, keeping the
    /// column index, external indices, and infeasible set current.
    pub fn substitute_out(&mut self, v: &Variable, expr: &LinearExpr) {
        let Some(basics) = self.columns.remove(v) else {
            if v.is_external() {
                self.external_parametric_vars.remove(v);
            }
            return;
        };
        tracing::trace!(
            component = "tableau",
            operation = "substitute_out",
            variable = v.name(),
            affected_rows = basics.len(),
            "Substituting out column"
        );
        for basic in basics {
            let Some(old) = self.rows.remove(&basic) else {
                continue;
            };
            for u in old.terms().keys() {
                if u != v {
                    self.detach(u, &basic);
                }
            }
            let new = old.substitute_out(v, expr);
            for u in new.terms().keys() {
                self.attach(u, &basic);
            }
            if basic.is_restricted() && new.constant() < 0.0 {
                self.infeasible_rows.insert(basic.clone());
            }
            self.rows.insert(basic, new);
        }
        if v.is_external() {
            self.external_parametric_vars.remove(v);
        }
    }

    // ── Targeted row mutation ───────────────────────────────

    /// Merge `coeff · v` into an existing row.
    pub fn add_term_to_row(&mut self, basic: &Variable, v: &Variable, coeff: f64) {
        let Some(row) = self.rows.get(basic) else {
            return;
        };
        let old = row.coefficient_for(v);
        let new = old + coeff;
        let updated = row.with_term_set(v, new);
        self.rows.insert(basic.clone(), updated);
        let had = !near_zero(old);
        let has = !near_zero(new);
        if had && !has {
            self.detach(v, basic);
        } else if !had && has {
            self.attach(v, basic);
        }
    }

    /// Merge `mult · expr` into an existing row.
    pub fn add_expr_to_row(&mut self, basic: &Variable, expr: &LinearExpr, mult: f64) {
        for (v, c) in expr.terms() {
            self.add_term_to_row(basic, v, c * mult);
        }
        self.shift_row_constant(basic, mult * expr.constant());
    }

    /// Add `delta` to a row constant, marking the row infeasible when its
    /// basic variable is restricted and the constant goes negative.
    /// Returns the new constant, or `None` when `basic` has no row.
    pub fn shift_row_constant(&mut self, basic: &Variable, delta: f64) -> Option<f64> {
        let row = self.rows.get(basic)?;
        let updated = row.plus_constant(delta);
        let constant = updated.constant();
        self.rows.insert(basic.clone(), updated);
        if basic.is_restricted() && constant < 0.0 {
            self.infeasible_rows.insert(basic.clone());
        }
        Some(constant)
    }

    /// Reset a row constant to zero. Returns false when `basic` has no
    /// row.
    pub fn zero_row_constant(&mut self, basic: &Variable) -> bool {
        let Some(row) = self.rows.get(basic) else {
            return false;
        };
        let updated = row.with_constant(0.0);
        self.rows.insert(basic.clone(), updated);
        true
    }

    // ── Infeasible-row tracking ─────────────────────────────

    pub fn pop_infeasible(&mut self) -> Option<Variable> {
        self.infeasible_rows.pop_first()
    }

    pub fn clear_infeasible(&mut self) {
        self.infeasible_rows.clear();
    }

    // ── Index maintenance ───────────────────────────────────

    fn attach(&mut self, param: &Variable, basic: &Variable) {
        self.columns
            .entry(param.clone())
            .or_default()
            .insert(basic.clone());
        if param.is_external() {
            self.external_parametric_vars.insert(param.clone());
        }
    }

    fn detach(&mut self, param: &Variable, basic: &Variable) {
        if let Some(set) = self.columns.get_mut(param) {
            set.remove(basic);
            if set.is_empty() {
                self.columns.remove(param);
            }
        }
    }
}
