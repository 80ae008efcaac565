//! Infix evaluation order and break/continue level unwinding, observed
//! through whole running programs rather than the natives' own unit tests.

use pretty_assertions::assert_eq;
use viro::{Category, ErrorId, HostIo, NoLimits, Runner, Value};

fn runner() -> Runner {
    Runner::new(HostIo::null(), Box::new(NoLimits)).unwrap()
}

/// Infix operators chain strictly left to right; there is no precedence
/// climbing, so `1 + 2 * 3` is `(1 + 2) * 3`, not `1 + (2 * 3)`.
#[test]
fn infix_arithmetic_has_no_precedence() {
    let mut runner = runner();
    let result = runner.run("1 + 2 * 3").unwrap();
    assert_eq!(result, Value::Integer(9));
}

/// Same left-to-right rule across a comparison and a boolean infix op.
#[test]
fn infix_comparison_and_boolean_chain_left_to_right() {
    let mut runner = runner();
    let result = runner.run("3 = 3 and true").unwrap();
    assert_eq!(result, Value::Logic(true));

    let result = runner.run("3 = 4 and true").unwrap();
    assert_eq!(result, Value::Logic(false));
}

/// `break --levels 2` from inside a doubly-nested `loop` unwinds both
/// loops, skipping the rest of the inner loop's body and every statement
/// still queued in the outer loop's body for that iteration.
#[test]
fn break_with_levels_unwinds_through_nested_loops() {
    let mut runner = runner();
    let result = runner
        .run("total: 0 loop 3 [loop 3 [total: total + 1 break --levels 2] total: total + 100] total")
        .unwrap();
    assert_eq!(result, Value::Integer(1));
}

/// `continue` with no `--levels` only skips the rest of the innermost
/// loop's current iteration.
#[test]
fn continue_skips_rest_of_current_iteration_only() {
    let mut runner = runner();
    let result = runner
        .run("total: 0 loop 3 [total: total + 1 continue total: total + 100] total")
        .unwrap();
    assert_eq!(result, Value::Integer(3));
}

/// Requesting more levels than are actually nested leaves the control
/// signal unconsumed: it propagates all the way out of the program as an
/// unhandled `Control`/`break` error rather than silently clamping.
#[test]
fn break_levels_deeper_than_nesting_is_an_error() {
    let mut runner = runner();
    let err = runner.run("loop 3 [break --levels 5]").unwrap_err();
    assert_eq!(err.inner().category, Category::Control);
    assert_eq!(err.inner().id, ErrorId::Break);
}

/// Whatever frames a function call or loop body pushed while running are
/// always retired by the time control returns to the caller, success or
/// failure alike.
#[test]
fn frame_stack_depth_is_restored_after_nested_calls() {
    let mut runner = runner();
    let before = runner.evaluator().current_frame();
    runner.run("double: fn [x] [x * 2] loop 3 [double 5]").unwrap();
    assert_eq!(runner.evaluator().current_frame(), before);

    let _ = runner.run("double: fn [x] [x * 2] double oops-unbound");
    assert_eq!(runner.evaluator().current_frame(), before);
}
