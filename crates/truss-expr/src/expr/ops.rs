//! Operator overloads and comparison builders.
//!
//! Arithmetic over variables, expressions, and scalars produces
//! expressions; the `eq`/`ge`/`le` builders produce constraints with
//! required strength (soften with [`Constraint::with_strength`]).

use crate::expr::constraint::{Constraint, Relation};
use crate::expr::core::LinearExpr;
use crate::strength::Strength;
use crate::variable::Variable;

impl From<&Variable> for LinearExpr {
    fn from(v: &Variable) -> Self {
        LinearExpr::from_variable(v)
    }
}

impl From<f64> for LinearExpr {
    fn from(constant: f64) -> Self {
        LinearExpr::from_constant(constant)
    }
}

// ── Comparison builders ─────────────────────────────────────

impl LinearExpr {
    pub fn eq_scalar(&self, rhs: f64) -> Constraint {
        Constraint::new(self.plus_constant(-rhs), Relation::Equal, Strength::Required)
    }

    pub fn ge_scalar(&self, rhs: f64) -> Constraint {
        Constraint::new(
            self.plus_constant(-rhs),
            Relation::GreaterOrEqual,
            Strength::Required,
        )
    }

    pub fn le_scalar(&self, rhs: f64) -> Constraint {
        Constraint::new(
            self.plus_constant(-rhs),
            Relation::LessOrEqual,
            Strength::Required,
        )
    }

    pub fn eq_expr(&self, rhs: &LinearExpr) -> Constraint {
        Constraint::new(self.minus(rhs), Relation::Equal, Strength::Required)
    }

    pub fn ge_expr(&self, rhs: &LinearExpr) -> Constraint {
        Constraint::new(self.minus(rhs), Relation::GreaterOrEqual, Strength::Required)
    }

    pub fn le_expr(&self, rhs: &LinearExpr) -> Constraint {
        Constraint::new(self.minus(rhs), Relation::LessOrEqual, Strength::Required)
    }
}

impl Variable {
    pub fn eq_scalar(&self, rhs: f64) -> Constraint {
        LinearExpr::from_variable(self).eq_scalar(rhs)
    }

    pub fn ge_scalar(&self, rhs: f64) -> Constraint {
        LinearExpr::from_variable(self).ge_scalar(rhs)
    }

    pub fn le_scalar(&self, rhs: f64) -> Constraint {
        LinearExpr::from_variable(self).le_scalar(rhs)
    }

    pub fn eq_expr(&self, rhs: &LinearExpr) -> Constraint {
        LinearExpr::from_variable(self).eq_expr(rhs)
    }

    pub fn ge_expr(&self, rhs: &LinearExpr) -> Constraint {
        LinearExpr::from_variable(self).ge_expr(rhs)
    }

    pub fn le_expr(&self, rhs: &LinearExpr) -> Constraint {
        LinearExpr::from_variable(self).le_expr(rhs)
    }
}

// ── Expression arithmetic ───────────────────────────────────

impl std::ops::Add for LinearExpr {
    type Output = LinearExpr;

    fn add(self, rhs: LinearExpr) -> Self::Output {
        self.plus(&rhs)
    }
}

impl std::ops::Add<Variable> for LinearExpr {
    type Output = LinearExpr;

    fn add(self, rhs: Variable) -> Self::Output {
        self.plus_term(&rhs, 1.0)
    }
}

impl std::ops::Add<f64> for LinearExpr {
    type Output = LinearExpr;

    fn add(self, rhs: f64) -> Self::Output {
        self.plus_constant(rhs)
    }
}

impl std::ops::Sub for LinearExpr {
    type Output = LinearExpr;

    fn sub(self, rhs: LinearExpr) -> Self::Output {
        self.minus(&rhs)
    }
}

impl std::ops::Sub<Variable> for LinearExpr {
    type Output = LinearExpr;

    fn sub(self, rhs: Variable) -> Self::Output {
        self.plus_term(&rhs, -1.0)
    }
}

impl std::ops::Sub<f64> for LinearExpr {
    type Output = LinearExpr;

    fn sub(self, rhs: f64) -> Self::Output {
        self.plus_constant(-rhs)
    }
}

impl std::ops::Mul<f64> for LinearExpr {
    type Output = LinearExpr;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scale(rhs)
    }
}

impl std::ops::Div<f64> for LinearExpr {
    type Output = LinearExpr;

    fn div(self, rhs: f64) -> Self::Output {
        LinearExpr::div(&self, rhs)
    }
}

impl std::ops::Neg for LinearExpr {
    type Output = LinearExpr;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

// ── Variable arithmetic ─────────────────────────────────────

impl std::ops::Add for Variable {
    type Output = LinearExpr;

    fn add(self, rhs: Variable) -> Self::Output {
        LinearExpr::from_variable(&self).plus_term(&rhs, 1.0)
    }
}

impl std::ops::Add<LinearExpr> for Variable {
    type Output = LinearExpr;

    fn add(self, rhs: LinearExpr) -> Self::Output {
        rhs.plus_term(&self, 1.0)
    }
}

impl std::ops::Add<f64> for Variable {
    type Output = LinearExpr;

    fn add(self, rhs: f64) -> Self::Output {
        LinearExpr::from_variable(&self).plus_constant(rhs)
    }
}

impl std::ops::Sub for Variable {
    type Output = LinearExpr;

    fn sub(self, rhs: Variable) -> Self::Output {
        LinearExpr::from_variable(&self).plus_term(&rhs, -1.0)
    }
}

impl std::ops::Sub<LinearExpr> for Variable {
    type Output = LinearExpr;

    fn sub(self, rhs: LinearExpr) -> Self::Output {
        LinearExpr::from_variable(&self).minus(&rhs)
    }
}

impl std::ops::Sub<f64> for Variable {
    type Output = LinearExpr;

    fn sub(self, rhs: f64) -> Self::Output {
        LinearExpr::from_variable(&self).plus_constant(-rhs)
    }
}

impl std::ops::Mul<f64> for Variable {
    type Output = LinearExpr;

    fn mul(self, rhs: f64) -> Self::Output {
        LinearExpr::term(self, rhs)
    }
}

impl std::ops::Div<f64> for Variable {
    type Output = LinearExpr;

    fn div(self, rhs: f64) -> Self::Output {
        LinearExpr::term(self, 1.0 / rhs)
    }
}

impl std::ops::Neg for Variable {
    type Output = LinearExpr;

    fn neg(self) -> Self::Output {
        LinearExpr::term(self, -1.0)
    }
}

impl std::ops::Mul<Variable> for f64 {
    type Output = LinearExpr;

    fn mul(self, rhs: Variable) -> Self::Output {
        LinearExpr::term(rhs, self)
    }
}

impl std::ops::Mul<LinearExpr> for f64 {
    type Output = LinearExpr;

    fn mul(self, rhs: LinearExpr) -> Self::Output {
        rhs.scale(self)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use crate::expr::constraint::Relation;
    use crate::expr::core::LinearExpr;
    use crate::strength::Strength;
    use crate::variable::Variable;

    #[test]
    fn arithmetic_builds_expressions() {
        let x = Variable::new("x");
        let y = Variable::new("y");
        let e = x.clone() * 2.0 + y.clone() - 3.0;
        assert_eq!(e.coefficient_for(&x), 2.0);
        assert_eq!(e.coefficient_for(&y), 1.0);
        assert_eq!(e.constant(), -3.0);
    }

    #[test]
    fn scalar_on_the_left() {
        let x = Variable::new("x");
        let e = 4.0 * x.clone();
        assert_eq!(e.coefficient_for(&x), 4.0);
    }

    #[test]
    fn neg_and_div() {
        let x = Variable::new("x");
        let e = -(x.clone()) + 1.0;
        assert_eq!(e.coefficient_for(&x), -1.0);
        let half = x.clone() / 2.0;
        assert_eq!(half.coefficient_for(&x), 0.5);
    }

    #[test]
    fn ge_scalar_moves_rhs_into_constant() {
        let x = Variable::new("x");
        let c = x.ge_scalar(2.0);
        assert_eq!(c.relation(), Relation::GreaterOrEqual);
        assert_eq!(c.expr().constant(), -2.0);
        assert_eq!(c.strength(), Strength::Required);
    }

    #[test]
    fn eq_expr_collects_both_sides() {
        // y = x + 2  =>  y - x - 2 = 0
        let x = Variable::new("x");
        let y = Variable::new("y");
        let c = y.eq_expr(&(x.clone() + 2.0));
        assert_eq!(c.relation(), Relation::Equal);
        assert_eq!(c.expr().coefficient_for(&y), 1.0);
        assert_eq!(c.expr().coefficient_for(&x), -1.0);
        assert_eq!(c.expr().constant(), -2.0);
    }

    #[test]
    fn le_expr_normalizes() {
        // x <= y  =>  y - x >= 0
        let x = Variable::new("x");
        let y = Variable::new("y");
        let c = x.le_expr(&LinearExpr::from_variable(&y));
        assert_eq!(c.relation(), Relation::GreaterOrEqual);
        assert_eq!(c.expr().coefficient_for(&x), -1.0);
        assert_eq!(c.expr().coefficient_for(&y), 1.0);
    }
}
