//! Constraint objects: an expression asserted against zero, with a
//! strength, a weight, and a role.

use crate::expr::core::LinearExpr;
use crate::strength::Strength;
use crate::variable::Variable;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

static NEXT_CONSTRAINT_ID: AtomicU64 = AtomicU64::new(1);

/// How a constraint expression relates to zero.
///
/// `LessOrEqual` is accepted at construction and normalized away: the
/// expression is negated and the stored relation becomes
/// `GreaterOrEqual`, so the solver only ever sees `e = 0` or `e ≥ 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Equal,
    GreaterOrEqual,
    LessOrEqual,
}

impl Relation {
    pub fn as_str(self) -> &'static str {
        match self {
            Relation::Equal => "=",
            Relation::GreaterOrEqual => ">=",
            Relation::LessOrEqual => "<=",
        }
    }
}

/// Role of a constraint in the edit/stay protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Regular,
    Stay,
    Edit,
}

impl ConstraintKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ConstraintKind::Regular => "regular",
            ConstraintKind::Stay => "stay",
            ConstraintKind::Edit => "edit",
        }
    }
}

#[derive(Debug)]
struct ConstraintData {
    id: u64,
    expr: LinearExpr,
    relation: Relation,
    strength: Strength,
    weight: f64,
    kind: ConstraintKind,
    /// The constrained variable, for stay and edit constraints.
    variable: Option<Variable>,
}

/// A constraint handle, compared by identity.
///
/// The solver keys its bookkeeping on the handle, so the handle used to
/// add a constraint is the one that removes it. `with_strength` and
/// `with_weight` mint a fresh handle and must be applied before adding.
#[derive(Debug, Clone)]
pub struct Constraint(Rc<ConstraintData>);

impl Constraint {
    /// Constraint `expr relation 0` with the given strength and weight 1.
    pub fn new(expr: LinearExpr, relation: Relation, strength: Strength) -> Self {
        let (expr, relation) = match relation {
            Relation::LessOrEqual => (expr.negate(), Relation::GreaterOrEqual),
            other => (expr, other),
        };
        Self::make(expr, relation, strength, 1.0, ConstraintKind::Regular, None)
    }

    /// Stay constraint: `v = v.value()` at construction time.
    pub fn stay(v: &Variable, strength: Strength, weight: f64) -> Self {
        let expr = LinearExpr::term(v.clone(), -1.0).plus_constant(v.value());
        Self::make(
            expr,
            Relation::Equal,
            strength,
            weight,
            ConstraintKind::Stay,
            Some(v.clone()),
        )
    }

    /// Edit constraint: `v = v.value()` at construction time, perturbable
    /// through `suggest_value`.
    pub fn edit(v: &Variable, strength: Strength) -> Self {
        let expr = LinearExpr::term(v.clone(), -1.0).plus_constant(v.value());
        Self::make(
            expr,
            Relation::Equal,
            strength,
            1.0,
            ConstraintKind::Edit,
            Some(v.clone()),
        )
    }

    fn make(
        expr: LinearExpr,
        relation: Relation,
        strength: Strength,
        weight: f64,
        kind: ConstraintKind,
        variable: Option<Variable>,
    ) -> Self {
        Constraint(Rc::new(ConstraintData {
            id: NEXT_CONSTRAINT_ID.fetch_add(1, AtomicOrdering::Relaxed),
            expr,
            relation,
            strength,
            weight,
            kind,
            variable,
        }))
    }

    /// Fresh handle with the strength replaced.
    pub fn with_strength(self, strength: Strength) -> Self {
        Self::make(
            self.0.expr.clone(),
            self.0.relation,
            strength,
            self.0.weight,
            self.0.kind,
            self.0.variable.clone(),
        )
    }

    /// Fresh handle with the weight multiplier replaced.
    pub fn with_weight(self, weight: f64) -> Self {
        Self::make(
            self.0.expr.clone(),
            self.0.relation,
            self.0.strength,
            weight,
            self.0.kind,
            self.0.variable.clone(),
        )
    }

    pub fn id(&self) -> u64 {
        self.0.id
    }

    pub fn expr(&self) -> &LinearExpr {
        &self.0.expr
    }

    /// The stored relation; always `Equal` or `GreaterOrEqual`.
    pub fn relation(&self) -> Relation {
        self.0.relation
    }

    pub fn strength(&self) -> Strength {
        self.0.strength
    }

    pub fn weight(&self) -> f64 {
        self.0.weight
    }

    pub fn kind(&self) -> ConstraintKind {
        self.0.kind
    }

    /// The constrained variable of a stay or edit constraint.
    pub fn variable(&self) -> Option<&Variable> {
        self.0.variable.as_ref()
    }

    pub fn is_inequality(&self) -> bool {
        self.0.relation == Relation::GreaterOrEqual
    }

    pub fn is_required(&self) -> bool {
        self.0.strength.is_required()
    }

    pub fn is_stay(&self) -> bool {
        self.0.kind == ConstraintKind::Stay
    }

    pub fn is_edit(&self) -> bool {
        self.0.kind == ConstraintKind::Edit
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} 0 [{}]",
            self.0.expr,
            self.0.relation.as_str(),
            self.0.strength
        )
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Constraint {}

impl PartialOrd for Constraint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Constraint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.id.cmp(&other.0.id)
    }
}

impl Hash for Constraint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::{Constraint, ConstraintKind, Relation};
    use crate::expr::core::LinearExpr;
    use crate::strength::Strength;
    use crate::variable::Variable;

    #[test]
    fn less_equal_normalizes_to_greater_equal() {
        // x - 5 <= 0 becomes 5 - x >= 0
        let x = Variable::new("x");
        let expr = LinearExpr::from_variable(&x).plus_constant(-5.0);
        let c = Constraint::new(expr, Relation::LessOrEqual, Strength::Required);
        assert_eq!(c.relation(), Relation::GreaterOrEqual);
        assert_eq!(c.expr().constant(), 5.0);
        assert_eq!(c.expr().coefficient_for(&x), -1.0);
        assert!(c.is_inequality());
    }

    #[test]
    fn stay_freezes_current_value() {
        let x = Variable::with_value("x", 4.0);
        let c = Constraint::stay(&x, Strength::Weak, 1.0);
        assert_eq!(c.expr().constant(), 4.0);
        assert_eq!(c.expr().coefficient_for(&x), -1.0);
        assert_eq!(c.kind(), ConstraintKind::Stay);
        assert_eq!(c.variable(), Some(&x));
        assert!(!c.is_inequality());
    }

    #[test]
    fn rebuilt_handles_are_distinct() {
        let x = Variable::new("x");
        let c = Constraint::new(
            LinearExpr::from_variable(&x),
            Relation::Equal,
            Strength::Required,
        );
        let softened = c.clone().with_strength(Strength::Medium);
        assert_ne!(c, softened);
        assert_eq!(softened.strength(), Strength::Medium);
        let weighted = softened.clone().with_weight(2.0);
        assert_eq!(weighted.weight(), 2.0);
        assert_eq!(weighted.strength(), Strength::Medium);
    }

    #[test]
    fn identity_survives_clone() {
        let x = Variable::new("x");
        let c = Constraint::edit(&x, Strength::Strong);
        assert_eq!(c, c.clone());
        assert!(c.is_edit());
    }
}
