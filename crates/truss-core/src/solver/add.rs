//! Canonical row construction and the two constraint-addition paths.

use truss_expr::{near_zero, Constraint, LinearExpr, Variable};

use crate::error::SolverError;
use crate::solver::Solver;

/// Result of lowering a client constraint to a canonical row `expr = 0`.
pub(crate) struct BuiltRow {
    pub expr: LinearExpr,
    /// The constraint's handle for removal.
    pub marker: Variable,
    /// Error pair for non-required equalities (edit capture).
    pub plus: Option<Variable>,
    pub minus: Option<Variable>,
    /// Constant of the client expression, recorded for edit constraints.
    pub prev_constant: f64,
}

impl Solver {
    /// Lower `cn` to the row expression that will be asserted `= 0`,
    /// substituting current basic definitions and introducing the
    /// slack, error, and dummy variables the constraint needs. Error
    /// variable penalties are accumulated into the objective row here.
    pub(crate) fn new_expression(&mut self, cn: &Constraint) -> BuiltRow {
        let client = cn.expr();
        let mut expr = LinearExpr::from_constant(client.constant());
        for (v, &c) in client.terms() {
            match self.tableau.row(v) {
                // v is basic: replace it with its definition.
                Some(row) => expr = expr.add_expr(row, c),
                None => expr = expr.plus_term(v, c),
            }
        }

        let z = self.objective();
        let mut plus = None;
        let mut minus = None;
        let marker;

        if cn.is_inequality() {
            // expr >= 0 becomes expr - s = 0 with restricted slack s.
            self.slack_counter += 1;
            let slack = Variable::slack(format!("s{}", self.slack_counter));
            expr = expr.with_term_set(&slack, -1.0);
            marker = slack;
            if !cn.is_required() {
                self.slack_counter += 1;
                let eminus = Variable::slack(format!("em{}", self.slack_counter));
                expr = expr.with_term_set(&eminus, 1.0);
                let penalty = cn.strength().weight() * cn.weight();
                self.tableau.add_term_to_row(&z, &eminus, penalty);
                self.insert_error_var(cn, &eminus);
                minus = Some(eminus);
            }
        } else if cn.is_required() {
            // Required equality: a dummy marker, never pivoted.
            self.dummy_counter += 1;
            let dummy = Variable::dummy(format!("d{}", self.dummy_counter));
            expr = expr.with_term_set(&dummy, 1.0);
            marker = dummy;
        } else {
            // Soft equality: an error pair straddling the target.
            self.slack_counter += 1;
            let eplus = Variable::slack(format!("ep{}", self.slack_counter));
            self.slack_counter += 1;
            let eminus = Variable::slack(format!("em{}", self.slack_counter));
            expr = expr
                .with_term_set(&eplus, -1.0)
                .with_term_set(&eminus, 1.0);
            let penalty = cn.strength().weight() * cn.weight();
            self.tableau.add_term_to_row(&z, &eplus, penalty);
            self.insert_error_var(cn, &eplus);
            self.tableau.add_term_to_row(&z, &eminus, penalty);
            self.insert_error_var(cn, &eminus);
            if cn.is_stay() {
                self.stay_plus_error_vars.push(eplus.clone());
                self.stay_minus_error_vars.push(eminus.clone());
            }
            marker = eplus.clone();
            plus = Some(eplus);
            minus = Some(eminus);
        }

        // Restricted basics require a non-negative row constant.
        if expr.constant() < 0.0 {
            expr = expr.negate();
        }

        BuiltRow {
            expr,
            marker,
            plus,
            minus,
            prev_constant: client.constant(),
        }
    }

    /// Pick a basis subject for a new row, if a pivot-free insertion is
    /// possible.
    ///
    /// Preference order: an unrestricted variable that is not yet a
    /// column; a fresh restricted non-dummy variable with a negative
    /// coefficient; failing both, an all-dummy row may use a fresh dummy
    /// as subject when its constant is zero, and signals
    /// `RequiredFailure` when it is not. `Ok(None)` means the artificial
    /// fallback is needed.
    pub(crate) fn choose_subject(
        &self,
        expr: &mut LinearExpr,
    ) -> Result<Option<Variable>, SolverError> {
        let mut found_unrestricted = false;
        let mut found_new_restricted = false;
        let mut subject: Option<Variable> = None;

        for (v, &c) in expr.terms() {
            if found_unrestricted {
                // An unrestricted subject exists; an unrestricted variable
                // that is also new to the tableau is strictly better.
                if !v.is_restricted() && !self.tableau.has_column(v) {
                    return Ok(Some(v.clone()));
                }
            } else if v.is_restricted() {
                if !found_new_restricted && !v.is_dummy() && c < 0.0 {
                    let fresh = match self.tableau.column(v) {
                        None => true,
                        Some(col) => col.len() == 1 && col.contains(&self.objective),
                    };
                    if fresh {
                        subject = Some(v.clone());
                        found_new_restricted = true;
                    }
                }
            } else {
                subject = Some(v.clone());
                found_unrestricted = true;
            }
        }
        if subject.is_some() {
            return Ok(subject);
        }

        // Only dummy variables left: usable as subject only if the row
        // reduces to a redundant (zero-constant) required equality.
        let mut coeff = 0.0;
        let mut dummy_subject: Option<Variable> = None;
        for (v, &c) in expr.terms() {
            if !v.is_dummy() {
                return Ok(None);
            }
            if !self.tableau.has_column(v) {
                dummy_subject = Some(v.clone());
                coeff = c;
            }
        }
        if !near_zero(expr.constant()) {
            return Err(SolverError::RequiredFailure);
        }
        if coeff > 0.0 {
            *expr = expr.negate();
        }
        Ok(dummy_subject)
    }

    /// Try to insert the row without pivoting. Returns false when no
    /// subject could be chosen and the artificial path must run.
    pub(crate) fn try_adding_directly(
        &mut self,
        expr: &mut LinearExpr,
    ) -> Result<bool, SolverError> {
        let Some(subject) = self.choose_subject(expr)? else {
            return Ok(false);
        };
        let row = expr.new_subject(&subject);
        if self.tableau.has_column(&subject) {
            self.tableau.substitute_out(&subject, &row);
        }
        self.tableau.add_row(subject.clone(), row);
        tracing::trace!(
            component = "solver",
            operation = "add_directly",
            subject = subject.name(),
            "Added row without pivoting"
        );
        Ok(true)
    }

    /// Insert the row through an artificial variable and a throwaway
    /// objective. Fails with `RequiredFailure` when the artificial
    /// objective cannot be driven to zero, removing every trace of the
    /// attempt first.
    pub(crate) fn add_with_artificial_variable(
        &mut self,
        expr: LinearExpr,
    ) -> Result<(), SolverError> {
        self.artificial_counter += 1;
        let av = Variable::slack(format!("a{}", self.artificial_counter));
        let az = Variable::objective("az");
        tracing::debug!(
            component = "solver",
            operation = "add_artificial",
            artificial = av.name(),
            "Adding row via artificial variable"
        );

        self.tableau.add_row(az.clone(), expr.clone());
        self.tableau.add_row(av.clone(), expr);
        self.optimize(&az)?;

        let residue = self
            .tableau
            .row(&az)
            .map(|row| row.constant())
            .ok_or_else(|| SolverError::internal("artificial objective row disappeared"))?;
        if !near_zero(residue) {
            self.tableau.remove_row(&az);
            if self.tableau.is_basic(&av) {
                self.tableau.remove_row(&av);
            } else {
                self.tableau.remove_column(&av);
            }
            return Err(SolverError::RequiredFailure);
        }

        if let Some(row) = self.tableau.row(&av).cloned() {
            if row.is_constant() {
                self.tableau.remove_row(&av);
                self.tableau.remove_row(&az);
                return Ok(());
            }
            let entry = row.any_pivotable().ok_or_else(|| {
                SolverError::internal("artificial row has no pivotable variable")
            })?;
            self.pivot(&entry, &av)?;
        }
        debug_assert!(!self.tableau.is_basic(&av));
        self.tableau.remove_column(&av);
        self.tableau.remove_row(&az);
        Ok(())
    }
}
