//! Variable handles and their solver-facing capabilities.

use std::cell::Cell;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

static NEXT_VARIABLE_ID: AtomicU64 = AtomicU64::new(1);

fn next_variable_id() -> u64 {
    NEXT_VARIABLE_ID.fetch_add(1, AtomicOrdering::Relaxed)
}

/// Role of a variable inside the tableau.
///
/// The kind fixes the capability flags the solver consults: external
/// variables are the client-visible decision variables, slack variables
/// absorb inequality and error terms, dummy variables are inert removal
/// markers for required equalities, and objective variables head cost rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    External,
    Slack,
    Dummy,
    Objective,
}

impl VariableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VariableKind::External => "external",
            VariableKind::Slack => "slack",
            VariableKind::Dummy => "dummy",
            VariableKind::Objective => "objective",
        }
    }
}

#[derive(Debug)]
struct VarData {
    id: u64,
    name: String,
    kind: VariableKind,
    value: Cell<f64>,
}

/// A named variable handle, compared by identity.
///
/// Cloning a `Variable` clones the handle, not the variable: all clones
/// refer to the same underlying entity, and two variables created with the
/// same name remain distinct. External variables carry the current solution
/// value; the solver writes it back after each solve or resolve.
#[derive(Debug, Clone)]
pub struct Variable(Rc<VarData>);

impl Variable {
    /// Create an external (decision) variable with value 0.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_value(name, 0.0)
    }

    /// Create an external (decision) variable with an initial value.
    pub fn with_value(name: impl Into<String>, value: f64) -> Self {
        Self::make(name, VariableKind::External, value)
    }

    /// Create a slack variable (restricted, pivotable).
    pub fn slack(name: impl Into<String>) -> Self {
        Self::make(name, VariableKind::Slack, 0.0)
    }

    /// Create a dummy variable (restricted, never pivoted).
    pub fn dummy(name: impl Into<String>) -> Self {
        Self::make(name, VariableKind::Dummy, 0.0)
    }

    /// Create an objective variable.
    pub fn objective(name: impl Into<String>) -> Self {
        Self::make(name, VariableKind::Objective, 0.0)
    }

    fn make(name: impl Into<String>, kind: VariableKind, value: f64) -> Self {
        Variable(Rc::new(VarData {
            id: next_variable_id(),
            name: name.into(),
            kind,
            value: Cell::new(value),
        }))
    }

    /// Process-unique identity of this variable.
    pub fn id(&self) -> u64 {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn kind(&self) -> VariableKind {
        self.0.kind
    }

    /// Current value. Meaningful for external variables only; internal
    /// variables always report 0.
    pub fn value(&self) -> f64 {
        self.0.value.get()
    }

    /// Overwrite the stored value. The solver uses this during write-back;
    /// clients may use it to seed a value before the variable enters the
    /// solver.
    pub fn set_value(&self, value: f64) {
        self.0.value.set(value);
    }

    /// Client-visible decision variable.
    pub fn is_external(&self) -> bool {
        self.0.kind == VariableKind::External
    }

    /// Implicitly constrained to be non-negative.
    pub fn is_restricted(&self) -> bool {
        matches!(self.0.kind, VariableKind::Slack | VariableKind::Dummy)
    }

    /// Eligible to enter the basis during optimization.
    pub fn is_pivotable(&self) -> bool {
        self.0.kind == VariableKind::Slack
    }

    /// Inert removal marker; never pivoted.
    pub fn is_dummy(&self) -> bool {
        self.0.kind == VariableKind::Dummy
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.name)
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Variable {}

impl PartialOrd for Variable {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Variable {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.id.cmp(&other.0.id)
    }
}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::{Variable, VariableKind};

    #[test]
    fn capability_table() {
        let x = Variable::new("x");
        assert!(x.is_external());
        assert!(!x.is_restricted());
        assert!(!x.is_pivotable());
        assert!(!x.is_dummy());

        let s = Variable::slack("s1");
        assert!(!s.is_external());
        assert!(s.is_restricted());
        assert!(s.is_pivotable());
        assert!(!s.is_dummy());

        let d = Variable::dummy("d1");
        assert!(!d.is_external());
        assert!(d.is_restricted());
        assert!(!d.is_pivotable());
        assert!(d.is_dummy());

        let z = Variable::objective("z");
        assert!(!z.is_external());
        assert!(!z.is_restricted());
        assert!(!z.is_pivotable());
        assert!(!z.is_dummy());
    }

    #[test]
    fn identity_not_name_equality() {
        let a = Variable::new("x");
        let b = Variable::new("x");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn creation_order_is_total_order() {
        let a = Variable::new("a");
        let b = Variable::new("b");
        assert!(a < b);
        assert!(a.id() < b.id());
    }

    #[test]
    fn value_roundtrip_through_clone() {
        let x = Variable::with_value("x", 2.5);
        let alias = x.clone();
        assert_eq!(alias.value(), 2.5);
        x.set_value(-7.0);
        assert_eq!(alias.value(), -7.0);
    }

    #[test]
    fn kind_as_str() {
        assert_eq!(VariableKind::External.as_str(), "external");
        assert_eq!(VariableKind::Slack.as_str(), "slack");
        assert_eq!(VariableKind::Dummy.as_str(), "dummy");
        assert_eq!(VariableKind::Objective.as_str(), "objective");
    }
}
