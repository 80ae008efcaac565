//! Closure capture: a `fn` literal closes over the frame it was created
//! in, and each call to the function that produced it captures an
//! independent copy of that frame's bindings.

use pretty_assertions::assert_eq;
use viro::{HostIo, NoLimits, Runner, Value};

fn runner() -> Runner {
    Runner::new(HostIo::null(), Box::new(NoLimits)).unwrap()
}

#[test]
fn adder_closure_captures_n_at_creation() {
    let mut runner = runner();
    let result = runner
        .run("make-adder: fn [n] [fn [x] [x + n]]  add3: make-adder 3  add3 10")
        .unwrap();
    assert_eq!(result, Value::Integer(13));
}

/// A second call to the generator must not retroactively change values
/// already captured by an earlier closure.
#[test]
fn later_calls_do_not_disturb_earlier_closures() {
    let mut runner = runner();
    runner.run("make-adder: fn [n] [fn [x] [x + n]]  add3: make-adder 3").unwrap();
    runner.run("add5: make-adder 5").unwrap();
    let still_add3 = runner.run("add3 10").unwrap();
    let now_add5 = runner.run("add5 10").unwrap();
    assert_eq!(still_add3, Value::Integer(13));
    assert_eq!(now_add5, Value::Integer(15));
}

/// Nested closures: each level closes over its own parent's frame, so a
/// three-deep chain accumulates all three captured values.
#[test]
fn nested_closures_chain_captured_scopes() {
    let mut runner = runner();
    let result = runner
        .run("curry3: fn [a] [fn [b] [fn [c] [a + b + c]]]  step: curry3 1  step2: step 10  step2 100")
        .unwrap();
    assert_eq!(result, Value::Integer(111));
}

/// Each invocation of a recursive user function gets its own frame, so
/// recursive calls don't clobber each other's locals.
#[test]
fn recursive_calls_do_not_share_locals() {
    let mut runner = runner();
    let result = runner
        .run("fib: fn [n] [either n < 2 [n] [(fib n - 1) + (fib n - 2)]]  fib 10")
        .unwrap();
    assert_eq!(result, Value::Integer(55));
}
