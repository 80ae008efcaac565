//! Parser/evaluator round-trip: every literal value's `mold` text should
//! re-parse to a single-element block holding an equal value.
//!
//! This is the inverse of the usual "run a script, check the result" shape
//! the other integration tests use — here the parser itself is the thing
//! under test, exercised through the same public `parse`/`Value` surface a
//! host embedding the crate would use.

use pretty_assertions::assert_eq;
use viro::{Value, parser::parse};

fn round_trips(v: Value) {
    let text = v.mold();
    let reparsed = parse(&text).unwrap_or_else(|e| panic!("mold text {text:?} failed to reparse: {e}"));
    let items = reparsed.root.as_block().expect("parser always produces a block root").snapshot();
    assert_eq!(items.len(), 1, "mold text {text:?} did not parse back to one element");
    assert!(items[0].equals(&v), "{text:?} round-tripped to {:?}, expected {v:?}", items[0]);
}

#[test]
fn none_and_logic_round_trip() {
    round_trips(Value::None);
    round_trips(Value::Logic(true));
    round_trips(Value::Logic(false));
}

#[test]
fn integers_round_trip_including_negatives() {
    round_trips(Value::Integer(0));
    round_trips(Value::Integer(42));
    round_trips(Value::Integer(-17));
}

#[test]
fn decimals_round_trip() {
    let parsed = parse("3.25").unwrap();
    let items = parsed.root.as_block().unwrap().snapshot();
    round_trips(items[0].clone());
}

#[test]
fn strings_with_escapes_round_trip() {
    round_trips(Value::string("plain"));
    round_trips(Value::string("has \"quotes\" and\nnewline"));
}

#[test]
fn binaries_round_trip() {
    round_trips(Value::binary(vec![0x00, 0xFF, 0xAB]));
}

#[test]
fn nested_blocks_round_trip() {
    let inner = Value::block(vec![Value::Integer(1), Value::Integer(2)]);
    round_trips(Value::block(vec![inner, Value::string("x")]));
}

/// Word-family values (`Word`/`SetWord`/`GetWord`/`LitWord`) mold back to
/// the exact sigil-prefixed/suffixed syntax the lexer reads for them.
#[test]
fn word_family_round_trips() {
    let parsed = parse("foo foo: :foo 'foo").unwrap();
    for item in parsed.root.as_block().unwrap().snapshot() {
        round_trips(item);
    }
}
