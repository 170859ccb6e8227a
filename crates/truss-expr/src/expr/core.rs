//! Core expression type: sparse term map + constant.
//!
//! A `LinearExpr` is the symbolic sum `c + Σ aᵢ·vᵢ`. Expressions are
//! values: every operation produces a fresh expression, and no stored
//! coefficient is ever within [`EPSILON`] of zero. The pivot algebra
//! (`substitute_out`, `change_subject`, `new_subject`) is what the solver
//! runs its tableau on.

use crate::variable::Variable;
use std::collections::BTreeMap;
use std::fmt;

/// Tolerance shared by coefficient cleanup, the artificial-objective zero
/// check, and value comparisons.
pub const EPSILON: f64 = 1e-8;

/// True when `value` is within [`EPSILON`] of zero.
pub fn near_zero(value: f64) -> bool {
    value.abs() < EPSILON
}

#[derive(Debug, Clone, Default)]
pub struct LinearExpr {
    constant: f64,
    terms: BTreeMap<Variable, f64>,
}

impl LinearExpr {
    // ── Constructors ────────────────────────────────────────

    /// Expression from terms and a constant, merging duplicates and
    /// dropping near-zero coefficients.
    pub fn new(terms: Vec<(Variable, f64)>, constant: f64) -> Self {
        let mut merged: BTreeMap<Variable, f64> = BTreeMap::new();
        for (v, c) in terms {
            *merged.entry(v).or_insert(0.0) += c;
        }
        merged.retain(|_, c| !near_zero(*c));
        Self {
            constant,
            terms: merged,
        }
    }

    /// Just a constant, no variable terms.
    pub fn from_constant(constant: f64) -> Self {
        Self {
            constant,
            ..Default::default()
        }
    }

    /// Single variable with coefficient 1.
    pub fn from_variable(v: &Variable) -> Self {
        Self::term(v.clone(), 1.0)
    }

    /// Single term: `coeff · v`.
    pub fn term(v: Variable, coeff: f64) -> Self {
        if near_zero(coeff) {
            return Self::default();
        }
        let mut terms = BTreeMap::new();
        terms.insert(v, coeff);
        Self {
            constant: 0.0,
            terms,
        }
    }

    // ── Accessors ───────────────────────────────────────────

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn terms(&self) -> &BTreeMap<Variable, f64> {
        &self.terms
    }

    /// Coefficient of `v`, or 0 when absent.
    pub fn coefficient_for(&self, v: &Variable) -> f64 {
        self.terms.get(v).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, v: &Variable) -> bool {
        self.terms.contains_key(v)
    }

    /// True when the expression has no variable terms.
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    // ── Algebra ─────────────────────────────────────────────

    /// Scale all terms and the constant by a factor.
    pub fn scale(&self, by: f64) -> Self {
        let mut terms = BTreeMap::new();
        for (v, c) in &self.terms {
            let scaled = c * by;
            if !near_zero(scaled) {
                terms.insert(v.clone(), scaled);
            }
        }
        Self {
            constant: self.constant * by,
            terms,
        }
    }

    /// Divide all terms and the constant by a scalar.
    pub fn div(&self, by: f64) -> Self {
        self.scale(1.0 / by)
    }

    pub fn negate(&self) -> Self {
        self.scale(-1.0)
    }

    /// `self + other`.
    pub fn plus(&self, other: &LinearExpr) -> Self {
        self.add_expr(other, 1.0)
    }

    /// `self - other`.
    pub fn minus(&self, other: &LinearExpr) -> Self {
        self.add_expr(other, -1.0)
    }

    /// Add a constant offset.
    pub fn plus_constant(&self, value: f64) -> Self {
        Self {
            constant: self.constant + value,
            terms: self.terms.clone(),
        }
    }

    /// Copy with the constant replaced.
    pub fn with_constant(&self, constant: f64) -> Self {
        Self {
            constant,
            terms: self.terms.clone(),
        }
    }

    /// Merge `coeff · v` into the expression.
    pub fn plus_term(&self, v: &Variable, coeff: f64) -> Self {
        self.with_term_set(v, self.coefficient_for(v) + coeff)
    }

    /// Copy with the coefficient of `v` set to exactly `coeff`
    /// (removing the term when `coeff` is near zero).
    pub fn with_term_set(&self, v: &Variable, coeff: f64) -> Self {
        let mut out = self.clone();
        if near_zero(coeff) {
            out.terms.remove(v);
        } else {
            out.terms.insert(v.clone(), coeff);
        }
        out
    }

    /// `self + mult · other`, merging terms and cleaning near-zero results.
    pub fn add_expr(&self, other: &LinearExpr, mult: f64) -> Self {
        let mut out = self.clone();
        out.constant += mult * other.constant;
        for (v, c) in &other.terms {
            let merged = out.coefficient_for(v) + mult * c;
            if near_zero(merged) {
                out.terms.remove(v);
            } else {
                out.terms.insert(v.clone(), merged);
            }
        }
        out
    }

    // ── Pivot algebra ───────────────────────────────────────

    /// Replace every occurrence of `v` with the expression `e`.
    ///
    /// `v` must not occur in `e`.
    pub fn substitute_out(&self, v: &Variable, e: &LinearExpr) -> Self {
        let mut out = self.clone();
        let Some(coeff) = out.terms.remove(v) else {
            return out;
        };
        out.add_expr(e, coeff)
    }

    /// Solve `0 = self` for `subject`, yielding the expression `subject`
    /// equals. `subject` must occur in the expression with a coefficient
    /// that is not near zero.
    pub fn new_subject(&self, subject: &Variable) -> Self {
        let (expr, _) = self.solve_for(subject);
        expr
    }

    /// Given that this expression defines `old_subject` (i.e. the row
    /// `old_subject = self`), produce the expression defining
    /// `new_subject` instead. `new_subject` must occur in the expression.
    pub fn change_subject(&self, old_subject: &Variable, new_subject: &Variable) -> Self {
        let (expr, reciprocal) = self.solve_for(new_subject);
        expr.with_term_set(old_subject, reciprocal)
    }

    fn solve_for(&self, subject: &Variable) -> (Self, f64) {
        let coeff = self.coefficient_for(subject);
        debug_assert!(!near_zero(coeff), "solving for a variable not present");
        let reciprocal = 1.0 / coeff;
        let mut terms = BTreeMap::new();
        for (v, c) in &self.terms {
            if v == subject {
                continue;
            }
            let scaled = -c * reciprocal;
            if !near_zero(scaled) {
                terms.insert(v.clone(), scaled);
            }
        }
        (
            Self {
                constant: -self.constant * reciprocal,
                terms,
            },
            reciprocal,
        )
    }

    /// Some pivotable variable in the expression, if any.
    pub fn any_pivotable(&self) -> Option<Variable> {
        self.terms.keys().find(|v| v.is_pivotable()).cloned()
    }
}

impl fmt::Display for LinearExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wrote = false;
        if !near_zero(self.constant) || self.terms.is_empty() {
            write!(f, "{}", self.constant)?;
            wrote = true;
        }
        for (v, c) in &self.terms {
            if wrote {
                write!(f, " {} ", if *c < 0.0 { "-" } else { "+" })?;
            } else if *c < 0.0 {
                write!(f, "-")?;
            }
            let magnitude = c.abs();
            if near_zero(magnitude - 1.0) {
                write!(f, "{v}")?;
            } else {
                write!(f, "{magnitude}*{v}")?;
            }
            wrote = true;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::{near_zero, LinearExpr, EPSILON};
    use crate::variable::Variable;

    #[test]
    fn new_merges_and_cleans() {
        let x = Variable::new("x");
        let y = Variable::new("y");
        let e = LinearExpr::new(vec![(x.clone(), 2.0), (x.clone(), -2.0), (y.clone(), 3.0)], 1.0);
        assert_eq!(e.constant(), 1.0);
        assert!(!e.contains(&x));
        assert_eq!(e.coefficient_for(&y), 3.0);
    }

    #[test]
    fn scale_drops_vanishing_terms() {
        let x = Variable::new("x");
        let e = LinearExpr::term(x.clone(), EPSILON / 2.0);
        assert!(e.is_constant());
        let f = LinearExpr::term(x.clone(), 1.0).scale(EPSILON / 2.0);
        assert!(!f.contains(&x));
    }

    #[test]
    fn add_expr_cancels() {
        let x = Variable::new("x");
        let y = Variable::new("y");
        let a = LinearExpr::new(vec![(x.clone(), 1.0), (y.clone(), 2.0)], 3.0);
        let b = LinearExpr::new(vec![(x.clone(), 1.0)], 1.0);
        let c = a.add_expr(&b, -1.0);
        assert_eq!(c.constant(), 2.0);
        assert!(!c.contains(&x));
        assert_eq!(c.coefficient_for(&y), 2.0);
    }

    #[test]
    fn substitute_out_replaces_everywhere() {
        // e = 4 + 2x + y, x := 1 + 3y  =>  6 + 7y
        let x = Variable::new("x");
        let y = Variable::new("y");
        let e = LinearExpr::new(vec![(x.clone(), 2.0), (y.clone(), 1.0)], 4.0);
        let def = LinearExpr::new(vec![(y.clone(), 3.0)], 1.0);
        let out = e.substitute_out(&x, &def);
        assert_eq!(out.constant(), 6.0);
        assert!(!out.contains(&x));
        assert_eq!(out.coefficient_for(&y), 7.0);
    }

    #[test]
    fn substitute_out_absent_variable_is_identity() {
        let x = Variable::new("x");
        let y = Variable::new("y");
        let e = LinearExpr::new(vec![(y.clone(), 1.0)], 4.0);
        let out = e.substitute_out(&x, &LinearExpr::from_constant(9.0));
        assert_eq!(out.constant(), 4.0);
        assert_eq!(out.coefficient_for(&y), 1.0);
    }

    #[test]
    fn new_subject_solves_for_variable() {
        // 0 = 6 + 2x - 3y solved for x: x = -3 + 1.5y
        let x = Variable::new("x");
        let y = Variable::new("y");
        let e = LinearExpr::new(vec![(x.clone(), 2.0), (y.clone(), -3.0)], 6.0);
        let solved = e.new_subject(&x);
        assert_eq!(solved.constant(), -3.0);
        assert_eq!(solved.coefficient_for(&y), 1.5);
        assert!(!solved.contains(&x));
    }

    #[test]
    fn change_subject_swaps_row_definition() {
        // Row x = 2 + 4y; re-solve for y: y = -0.5 + 0.25x
        let x = Variable::new("x");
        let y = Variable::new("y");
        let row = LinearExpr::new(vec![(y.clone(), 4.0)], 2.0);
        let swapped = row.change_subject(&x, &y);
        assert_eq!(swapped.constant(), -0.5);
        assert_eq!(swapped.coefficient_for(&x), 0.25);
        assert!(!swapped.contains(&y));
    }

    #[test]
    fn any_pivotable_skips_external_and_dummy() {
        let x = Variable::new("x");
        let d = Variable::dummy("d");
        let s = Variable::slack("s");
        let e = LinearExpr::new(
            vec![(x.clone(), 1.0), (d.clone(), 1.0), (s.clone(), 1.0)],
            0.0,
        );
        assert_eq!(e.any_pivotable(), Some(s));
        let none = LinearExpr::new(vec![(x, 1.0), (d, 1.0)], 0.0);
        assert_eq!(none.any_pivotable(), None);
    }

    #[test]
    fn near_zero_threshold() {
        assert!(near_zero(0.0));
        assert!(near_zero(EPSILON / 10.0));
        assert!(!near_zero(EPSILON * 10.0));
    }

    #[test]
    fn display_renders_signs_and_units() {
        let x = Variable::new("x");
        let y = Variable::new("y");
        let e = LinearExpr::new(vec![(x, 1.0), (y, -2.0)], 5.0);
        assert_eq!(e.to_string(), "5 + x - 2*y");
        assert_eq!(LinearExpr::from_constant(0.0).to_string(), "0");
    }
}
