//! Whole-program scenarios a script author would actually write, each
//! checked against the one result (or error) the program is supposed to
//! produce.

use pretty_assertions::assert_eq;
use viro::{ErrorId, HostIo, NoLimits, Runner, Value};

fn runner() -> Runner {
    Runner::new(HostIo::null(), Box::new(NoLimits)).unwrap()
}

/// A set-word binding read back in the same expression.
#[test]
fn set_word_then_arithmetic() {
    let mut runner = runner();
    let result = runner.run("x: 5  x + 2").unwrap();
    assert_eq!(result, Value::Integer(7));
}

/// Recursive Fibonacci via the two-branch form of `if`: the condition's
/// body runs when truthy, the optional trailing block runs otherwise.
#[test]
fn recursive_fibonacci() {
    let mut runner = runner();
    let result = runner
        .run("fib: fn [n] [if n < 2 [n] [(fib n - 1) + (fib n - 2)]]  fib 10")
        .unwrap();
    assert_eq!(result, Value::Integer(55));
}

/// Mutating a string in place through `append` and reading the result
/// back as a plain string.
#[test]
fn string_append_mutates_in_place() {
    let mut runner = runner();
    let result = runner.run(r#"s: "abc"  append s "de"  s"#).unwrap();
    assert_eq!(result.form(), "abcde");
}

/// `copy --part` past the remaining length of the series is a hard
/// error, not a clamp — `take` is the clamping counterpart.
#[test]
fn copy_part_past_the_end_errors() {
    let mut runner = runner();
    let err = runner.run("b: [1 2 3]  copy --part 5 b").unwrap_err();
    assert_eq!(err.inner().id, ErrorId::OutOfBounds);
}

/// `first` on an empty block has nothing to return, so it yields `none`
/// instead of erroring.
#[test]
fn first_of_empty_block_is_none() {
    let mut runner = runner();
    let result = runner.run("first []").unwrap();
    assert_eq!(result, Value::None);
}

/// `find` reports the 1-based position of a matching element.
#[test]
fn find_reports_one_based_position() {
    let mut runner = runner();
    let result = runner.run("find [10 20 30] 20").unwrap();
    assert_eq!(result, Value::Integer(2));
}
