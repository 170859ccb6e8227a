#![allow(clippy::float_cmp)]

//! The edit protocol: edit variables, suggest/resolve loops, nested
//! sessions, and stay interaction.

use truss_core::{Solver, SolverError};
use truss_expr::{Strength, Variable};

fn assert_near(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

/// Suggested values land after resolve, and the last one survives
/// `end_edit` with the edit constraint gone.
#[test]
fn suggest_resolve_end_edit() {
    let mut solver = Solver::new();
    let x = Variable::new("x");
    solver.add_stay(&x).expect("stay x");

    solver.add_edit_var(&x).expect("edit x");
    assert!(solver.has_edit_var(&x));
    solver.begin_edit().expect("begin");

    solver.suggest_value(&x, 30.0).expect("suggest 30");
    solver.resolve().expect("resolve");
    assert_near(x.value(), 30.0);

    solver.suggest_value(&x, -5.0).expect("suggest -5");
    solver.resolve().expect("resolve");
    assert_near(x.value(), -5.0);

    solver.end_edit().expect("end");
    assert_near(x.value(), -5.0);
    assert!(!solver.has_edit_var(&x));
    assert_eq!(solver.num_edit_vars(), 0);
}

/// An edit drags dependent variables through required constraints.
#[test]
fn edit_propagates_through_required_chain() {
    let mut solver = Solver::new();
    let x = Variable::new("x");
    let y = Variable::new("y");
    solver.add_stay(&x).expect("stay x");
    solver.add_stay(&y).expect("stay y");
    solver
        .add_constraint(&y.eq_expr(&(x.clone() + 2.0)))
        .expect("y = x + 2");

    solver.add_edit_var(&x).expect("edit x");
    solver.begin_edit().expect("begin");
    solver.suggest_value(&x, 5.0).expect("suggest");
    solver.resolve().expect("resolve");
    assert_near(x.value(), 5.0);
    assert_near(y.value(), 7.0);
    solver.end_edit().expect("end");

    assert_near(x.value(), 5.0);
    assert_near(y.value(), 7.0);
}

/// Several edit variables can move within one session.
#[test]
fn multi_variable_edit() {
    let mut solver = Solver::new();
    let x = Variable::new("x");
    let y = Variable::new("y");
    solver.add_stay(&x).expect("stay x");
    solver.add_stay(&y).expect("stay y");

    solver.add_edit_var(&x).expect("edit x");
    solver.add_edit_var(&y).expect("edit y");
    solver.begin_edit().expect("begin");
    solver.suggest_value(&x, 3.0).expect("suggest x");
    solver.suggest_value(&y, -4.0).expect("suggest y");
    solver.resolve().expect("resolve");
    assert_near(x.value(), 3.0);
    assert_near(y.value(), -4.0);
    solver.end_edit().expect("end");
    assert_eq!(solver.num_edit_vars(), 0);
}

/// Inner sessions unwind only the edit variables they introduced.
#[test]
fn nested_edit_sessions() {
    let mut solver = Solver::new();
    let x = Variable::new("x");
    let y = Variable::new("y");
    solver.add_stay(&x).expect("stay x");
    solver.add_stay(&y).expect("stay y");

    solver.add_edit_var(&x).expect("edit x");
    solver.begin_edit().expect("outer begin");
    solver.suggest_value(&x, 10.0).expect("suggest x");
    solver.resolve().expect("resolve");
    assert_near(x.value(), 10.0);

    solver.add_edit_var(&y).expect("edit y");
    solver.begin_edit().expect("inner begin");
    solver.suggest_value(&y, 20.0).expect("suggest y");
    solver.resolve().expect("resolve");
    assert_near(y.value(), 20.0);
    solver.end_edit().expect("inner end");

    // The inner session took its edit variable with it; the outer one
    // still responds.
    assert!(!solver.has_edit_var(&y));
    assert!(solver.has_edit_var(&x));
    solver.suggest_value(&x, 15.0).expect("suggest x again");
    solver.resolve().expect("resolve");
    assert_near(x.value(), 15.0);
    assert_near(y.value(), 20.0);

    solver.end_edit().expect("outer end");
    assert_eq!(solver.num_edit_vars(), 0);
    assert_near(x.value(), 15.0);
    assert_near(y.value(), 20.0);
}

/// A resolve with no pending suggestions is a no-op.
#[test]
fn resolve_without_suggestions() {
    let mut solver = Solver::new();
    let x = Variable::new("x");
    solver.add_stay(&x).expect("stay x");
    solver.add_edit_var(&x).expect("edit x");
    solver.begin_edit().expect("begin");
    solver.resolve().expect("resolve");
    assert_near(x.value(), 0.0);
    solver.end_edit().expect("end");
}

/// One-shot convenience drives the full add/begin/suggest/end cycle.
#[test]
fn set_edited_value_round_trip() {
    let mut solver = Solver::new();
    let x = Variable::new("x");
    solver.add_stay(&x).expect("stay x");

    solver.set_edited_value(&x, 42.0).expect("set 42");
    assert_near(x.value(), 42.0);
    assert_eq!(solver.num_edit_vars(), 0);

    // Suggesting the current value is a no-op without an edit session.
    solver.set_edited_value(&x, 42.0).expect("set 42 again");
    assert_near(x.value(), 42.0);
}

/// Unknown variables are assigned directly instead of edited.
#[test]
fn set_edited_value_on_unknown_variable() {
    let mut solver = Solver::new();
    let x = Variable::new("x");
    solver.set_edited_value(&x, 9.0).expect("set");
    assert_near(x.value(), 9.0);
    assert!(!solver.contains_variable(&x));
}

/// Protocol misuse surfaces as errors rather than corrupting state.
#[test]
fn protocol_misuse_is_reported() {
    let mut solver = Solver::new();
    let x = Variable::new("x");
    let y = Variable::new("y");
    solver.add_stay(&x).expect("stay x");

    // No edit variables registered yet.
    assert!(matches!(
        solver.begin_edit(),
        Err(SolverError::Internal(_))
    ));
    assert!(matches!(
        solver.end_edit(),
        Err(SolverError::Internal(_))
    ));
    assert!(matches!(
        solver.suggest_value(&y, 1.0),
        Err(SolverError::Internal(_))
    ));

    // Edits may not be required-strength, and not duplicated.
    assert!(matches!(
        solver.add_edit_var_with(&x, Strength::Required),
        Err(SolverError::Internal(_))
    ));
    solver.add_edit_var(&x).expect("edit x");
    assert_eq!(
        solver.add_edit_var(&x),
        Err(SolverError::DuplicateConstraint)
    );

    // A session must be opened before it can be closed.
    assert!(matches!(
        solver.end_edit(),
        Err(SolverError::Internal(_))
    ));
}

/// Edits at weaker strengths lose against stronger constraints.
#[test]
fn weak_edit_defers_to_strong_constraint() {
    let mut solver = Solver::new();
    let x = Variable::new("x");
    solver.add_stay(&x).expect("stay x");
    solver
        .add_constraint(&x.eq_scalar(100.0).with_strength(Strength::Strong))
        .expect("x = 100 strong");
    assert_near(x.value(), 100.0);

    solver
        .add_edit_var_with(&x, Strength::Medium)
        .expect("medium edit");
    solver.begin_edit().expect("begin");
    solver.suggest_value(&x, 0.0).expect("suggest 0");
    solver.resolve().expect("resolve");
    // The strong equality outweighs the medium edit.
    assert_near(x.value(), 100.0);
    solver.end_edit().expect("end");
}

/// Stays re-anchor at the edited value, so the variable does not snap
/// back when the edit ends.
#[test]
fn stays_reanchor_after_edit() {
    let mut solver = Solver::new();
    let x = Variable::new("x");
    let y = Variable::new("y");
    solver.add_stay(&x).expect("stay x");
    solver.add_stay(&y).expect("stay y");

    solver.set_edited_value(&x, 25.0).expect("edit x");
    assert_near(x.value(), 25.0);
    assert_near(y.value(), 0.0);

    // A later solve leaves the edited value in place.
    solver.solve().expect("solve");
    assert_near(x.value(), 25.0);
}
