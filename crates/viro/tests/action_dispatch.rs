//! Polymorphic action dispatch: the same action name resolves per the
//! type of its first argument, an unimplemented combination reports
//! `action-no-impl` with both names, and an unrecognised `--name`
//! refinement is rejected before any native body runs.

use pretty_assertions::assert_eq;
use viro::{Category, ErrorId, HostIo, NoLimits, Runner, Value};

fn runner() -> Runner {
    Runner::new(HostIo::null(), Box::new(NoLimits)).unwrap()
}

/// `first`/`length?` resolve to a different per-type implementation for
/// each series kind, but produce the answer that kind's own elements give.
#[test]
fn same_action_dispatches_per_series_kind() {
    let mut runner = runner();
    assert_eq!(runner.run("first [10 20 30]").unwrap(), Value::Integer(10));
    assert_eq!(runner.run(r#"first "abc""#).unwrap(), Value::string("a"));
    assert_eq!(runner.run("length? [1 2 3 4]").unwrap(), Value::Integer(4));
    assert_eq!(runner.run(r#"length? "abcd""#).unwrap(), Value::Integer(4));
}

/// Calling a series action on a type that never registered an
/// implementation reports `action-no-impl`, naming the action and the
/// offending type.
#[test]
fn action_missing_for_type_reports_action_and_type() {
    let mut runner = runner();
    let err = runner.run("append 5 6").unwrap_err();
    assert_eq!(err.inner().category, Category::Script);
    assert_eq!(err.inner().id, ErrorId::ActionNoImpl);
    assert_eq!(err.inner().args[0], "append");
    assert_eq!(err.inner().args[1], "integer");
}

/// `find` returns the 1-based position of the first match, or `none`
/// when the element isn't present — the dispatcher forwards to whichever
/// search each series kind implements.
#[test]
fn find_dispatches_and_reports_one_based_position() {
    let mut runner = runner();
    assert_eq!(runner.run("find [10 20 30] 20").unwrap(), Value::Integer(2));
    assert_eq!(runner.run("find [10 20 30] 99").unwrap(), Value::None);
}

/// A refinement token the callee never declared is rejected outright,
/// regardless of where in the call it appears.
#[test]
fn unrecognised_refinement_is_rejected() {
    let mut runner = runner();
    let err = runner.run("copy [1 2 3] --bogus 1").unwrap_err();
    assert_eq!(err.inner().category, Category::Script);
    assert_eq!(err.inner().id, ErrorId::InvalidOperation);
}

/// The `--part` refinement for `copy`/`take` may precede the subject it
/// modifies; the argument collector scans for refinement tokens ahead of
/// every positional slot, not only after the last one.
#[test]
fn part_refinement_may_precede_its_subject() {
    let mut runner = runner();
    let leading = runner.run("copy --part 2 [1 2 3]").unwrap();
    let trailing = runner.run("copy [1 2 3] --part 2").unwrap();
    assert_eq!(leading.mold(), "[1 2]");
    assert_eq!(trailing.mold(), "[1 2]");
}
