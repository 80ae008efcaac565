//! Series handle semantics: shared buffers, independent cursors, and the
//! `--part`/`take` boundary rules.
//!
//! The low-level `SeriesCore<T>` behavior is unit-tested inside
//! `src/series.rs`; these tests exercise the same properties through a
//! running Viro program, the way a script author actually observes them.

use pretty_assertions::assert_eq;
use viro::{BoundedLimits, HostIo, NoLimits, Runner, SeriesCore};

fn runner() -> Runner {
    Runner::new(HostIo::null(), Box::new(NoLimits)).unwrap()
}

/// `b: [1 2 3]  a: b  append a 4` — assigning a series shares its buffer,
/// so mutating through `a` is visible through `b`; `copy` then breaks that
/// sharing.
#[test]
fn assignment_shares_the_buffer_but_copy_does_not() {
    let mut runner = runner();
    runner.run("b: [1 2 3]  a: b  append a 4").unwrap();
    let b_after_append = runner.run("b").unwrap();
    assert_eq!(b_after_append.mold(), "[1 2 3 4]", "appending through a must be visible through b");

    let c = runner.run("c: copy a  append c 99  c").unwrap();
    assert_eq!(c.mold(), "[1 2 3 4 99]");

    let b_after_copy = runner.run("b").unwrap();
    assert_eq!(b_after_copy.mold(), "[1 2 3 4]", "copy must not have aliased back into b");
}

/// `clone_handle` preserves length and content but gives back an
/// independent cursor: advancing one handle never moves the other.
#[test]
fn clone_handle_shares_content_but_not_cursor() {
    let mut original: SeriesCore<i32> = SeriesCore::from_vec(vec![1, 2, 3]);
    let clone = original.clone_handle();
    original.next();
    original.next();
    assert_eq!(original.index(), 2);
    assert_eq!(clone.index(), 0);
    assert_eq!(original.snapshot(), clone.snapshot());

    original.append(4);
    assert_eq!(clone.snapshot(), vec![1, 2, 3, 4], "buffer is still shared after the cursor diverged");
}

/// `copy --part k s` errors iff `k` exceeds the remaining length; `take k s`
/// clamps instead and never errors for non-negative `k`.
#[test]
fn copy_part_errors_past_remaining_take_clamps() {
    let s: SeriesCore<i32> = SeriesCore::from_vec(vec![1, 2, 3]);
    assert!(s.copy_part(3).is_ok());
    assert!(s.copy_part(4).is_err());

    let mut t: SeriesCore<i32> = SeriesCore::from_vec(vec![1, 2, 3]);
    let taken = t.take_count(100);
    assert_eq!(taken, vec![1, 2, 3]);
}

/// Same boundary, observed at the language level via the `copy`/`take`
/// natives rather than the Rust `SeriesCore` API directly.
#[test]
fn copy_part_script_level_errors_on_oversized_part() {
    let mut runner = runner();
    let err = runner.run("b: [1 2 3] copy --part 5 b").unwrap_err();
    assert_eq!(err.inner().id, viro::ErrorId::OutOfBounds);

    let taken = runner.run("b: [1 2 3] take --part 5 b").unwrap();
    assert_eq!(taken.mold(), "[1 2 3]");
}

/// Resource limits are a separate axis from series semantics, but a
/// `BoundedLimits` run should behave identically to an unbounded one for a
/// script well within its ceilings.
#[test]
fn bounded_limits_do_not_change_ordinary_results() {
    let mut runner = Runner::new(HostIo::null(), Box::new(BoundedLimits::default())).unwrap();
    let result = runner.run("b: [1 2 3] append b 4 b").unwrap();
    assert_eq!(result.mold(), "[1 2 3 4]");
}
