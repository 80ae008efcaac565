//! Series actions: the per-type implementations behind
//! `first`, `append`, `length?`, `find`, `copy`, `remove`, `skip`, `next`,
//! `head`, `tail`, `empty?`, `at`, `pick`, `poke`, `select`, `change`,
//! `clear`, `trim`, `sort`, `reverse` for `Block`/`Paren`, `String`, and
//! `Binary`.
//!
//! One generic routine (`register_kind`) implements the surface once per
//! element type `T`, parameterised by how a `T` converts to/from `Value`
//! — the three calls in [`register`] are the per-kind specialisation that
//! would otherwise need three separate modules; the uniform
//! `SeriesCore<T>` (`series.rs`) lets one generic body cover `Block`,
//! `String`, and `Binary` instead.

use std::rc::Rc;
use std::cmp::Ordering;

use crate::{error::Error, frame::FrameRegistry, native::NativeFn, series::SeriesCore, typeframe::TypeFrames, value::{Tag, Value}};

/// Per-element-type glue the generic action bodies below need: how to wrap/
/// unwrap a `SeriesCore<T>` inside a `Value`, and how a `Value` argument
/// maps onto one or more `T` elements.
/// Plain `fn` pointers throughout, so `Kind<T>` stays `Copy` regardless of
/// `T` and can be captured by every registered closure without an `Rc`.
struct Kind<T> {
    tag: Tag,
    wrap: fn(SeriesCore<T>) -> Value,
    unwrap: fn(&Value) -> Option<&SeriesCore<T>>,
    /// A single-scalar element from an argument.
    one: fn(&Value) -> Option<T>,
    /// One-or-more elements from an argument.
    many: fn(&Value) -> Option<Vec<T>>,
    to_value: fn(T) -> Value,
    cmp: fn(&T, &T) -> Ordering,
    /// "Blank" predicate `trim` strips from both ends.
    is_blank: fn(&T) -> bool,
}

impl<T> Clone for Kind<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Kind<T> {}

fn block_kind() -> Kind<Value> {
    Kind {
        tag: Tag::Block,
        wrap: Value::Block,
        unwrap: Value::as_block,
        one: |v| Some(v.clone()),
        many: |v| Some(vec![v.clone()]),
        to_value: |v| v,
        cmp: value_cmp,
        is_blank: Value::is_none,
    }
}

fn paren_kind() -> Kind<Value> {
    Kind { tag: Tag::Paren, wrap: Value::Paren, ..block_kind() }
}

fn string_kind() -> Kind<char> {
    Kind {
        tag: Tag::String,
        wrap: Value::String,
        unwrap: Value::as_string,
        one: one_char,
        many: many_chars,
        to_value: char_to_value,
        cmp: Ord::cmp,
        is_blank: char_is_blank,
    }
}

fn char_is_blank(c: &char) -> bool {
    c.is_whitespace()
}

fn one_char(v: &Value) -> Option<char> {
    only(v.as_string()?.snapshot())
}

fn many_chars(v: &Value) -> Option<Vec<char>> {
    Some(v.as_string()?.snapshot())
}

fn char_to_value(c: char) -> Value {
    Value::string(&c.to_string())
}

fn binary_kind() -> Kind<u8> {
    Kind {
        tag: Tag::Binary,
        wrap: Value::Binary,
        unwrap: Value::as_binary,
        one: byte_from,
        many: many_bytes,
        to_value: byte_to_value,
        cmp: Ord::cmp,
        is_blank: byte_is_blank,
    }
}

fn byte_is_blank(b: &u8) -> bool {
    *b == 0
}

fn byte_to_value(b: u8) -> Value {
    Value::Integer(i64::from(b))
}

fn many_bytes(v: &Value) -> Option<Vec<u8>> {
    match v {
        Value::Binary(b) => Some(b.snapshot()),
        other => byte_from(other).map(|b| vec![b]),
    }
}

/// `Some(x)` if `items` holds exactly one element, else `None` — the
/// "single-scalar" element rule `String`/`Binary` elements follow when
/// passed into single-element natives like `change`/`poke`.
fn only<T: Copy>(items: Vec<T>) -> Option<T> {
    match items.as_slice() {
        [single] => Some(*single),
        _ => None,
    }
}

fn byte_from(v: &Value) -> Option<u8> {
    match v {
        Value::Integer(i) => u8::try_from(*i).ok(),
        Value::Binary(b) => only(b.snapshot()),
        _ => None,
    }
}

/// Total ordering used by `sort` on `Block`/`Paren` series: numeric values
/// compare numerically, everything else falls back to comparing molded text.
fn value_cmp(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => x.cmp(y),
        (Value::Decimal(x), Value::Decimal(y)) => x.cmp(y),
        (Value::Integer(x), Value::Decimal(y)) => bigdecimal::BigDecimal::from(*x).cmp(y),
        (Value::Decimal(x), Value::Integer(y)) => x.cmp(&bigdecimal::BigDecimal::from(*y)),
        _ => a.mold().cmp(&b.mold()),
    }
}

/// Registers the full `Series` action surface for
/// `Block`/`Paren`/`String`/`Binary`.
pub fn register(registry: &mut FrameRegistry, types: TypeFrames) -> Result<(), Error> {
    register_kind(registry, types, block_kind())?;
    register_kind(registry, types, paren_kind())?;
    register_kind(registry, types, string_kind())?;
    register_kind(registry, types, binary_kind())?;
    Ok(())
}

fn register_kind<T: Clone + PartialEq + 'static>(
    registry: &mut FrameRegistry,
    types: TypeFrames,
    kind: Kind<T>,
) -> Result<(), Error> {
    let reg = |registry: &mut FrameRegistry, name: &str, native: NativeFn| {
        types.register_action(registry, kind.tag, name, native)
    };

    reg(registry, "first", native_nav(kind, |s| s.first()))?;
    reg(registry, "last", native_nav(kind, |s| s.last()))?;
    reg(registry, "length?", native_query(kind, |s| Value::Integer(remaining(s) as i64)))?;
    reg(registry, "empty?", native_query(kind, |s| Value::Logic(s.is_tail())))?;
    reg(registry, "head?", native_query(kind, |s| Value::Logic(s.is_head())))?;
    reg(registry, "tail?", native_query(kind, |s| Value::Logic(s.is_tail())))?;
    reg(registry, "index?", native_query(kind, |s| Value::Integer(s.index() as i64 + 1)))?;

    reg(registry, "head", native_reposition(kind, |s| s.to_head()))?;
    reg(registry, "tail", native_reposition(kind, |s| s.to_tail()))?;
    reg(registry, "next", native_reposition(kind, |s| s.next()))?;
    reg(registry, "back", native_fallible_reposition(kind, |s| s.back()))?;
    reg(registry, "skip", native_skip(kind))?;

    reg(registry, "at", native_at(kind))?;
    reg(registry, "pick", native_pick(kind))?;
    reg(registry, "poke", native_poke(kind))?;
    reg(registry, "find", native_find(kind))?;
    reg(registry, "select", native_select(kind))?;

    reg(registry, "append", native_append(kind))?;
    reg(registry, "insert", native_insert(kind))?;
    reg(registry, "change", native_change(kind))?;
    reg(registry, "remove", native_remove(kind))?;
    reg(registry, "clear", native_clear(kind))?;
    reg(registry, "copy", native_copy(kind))?;
    reg(registry, "take", native_take(kind))?;
    reg(registry, "reverse", native_reverse(kind))?;
    reg(registry, "sort", native_sort(kind))?;
    reg(registry, "trim", native_trim(kind))?;
    Ok(())
}

fn remaining<T: Clone>(s: &SeriesCore<T>) -> usize {
    s.length().saturating_sub(s.index())
}

fn subject<T: Clone>(kind: Kind<T>, args: &[Value], op: &str) -> Result<SeriesCore<T>, Error> {
    (kind.unwrap)(&args[0])
        .cloned()
        .ok_or_else(|| Error::type_mismatch(op, &kind.tag.to_string(), &args[0].tag().to_string()))
}

fn native_nav<T: Clone + PartialEq + 'static>(kind: Kind<T>, f: fn(&SeriesCore<T>) -> Option<T>) -> NativeFn {
    Rc::new(move |args, _refs, _eval| {
        let s = subject(kind, args, "series")?;
        Ok(f(&s).map_or(Value::None, kind.to_value))
    })
}

fn native_query<T: Clone + PartialEq + 'static>(kind: Kind<T>, f: fn(&SeriesCore<T>) -> Value) -> NativeFn {
    Rc::new(move |args, _refs, _eval| {
        let s = subject(kind, args, "series")?;
        Ok(f(&s))
    })
}

fn native_reposition<T: Clone + PartialEq + 'static>(kind: Kind<T>, f: fn(&mut SeriesCore<T>)) -> NativeFn {
    Rc::new(move |args, _refs, _eval| {
        let mut s = subject(kind, args, "series")?;
        f(&mut s);
        Ok((kind.wrap)(s))
    })
}

fn native_fallible_reposition<T: Clone + PartialEq + 'static>(
    kind: Kind<T>,
    f: fn(&mut SeriesCore<T>) -> Result<(), Error>,
) -> NativeFn {
    Rc::new(move |args, _refs, _eval| {
        let mut s = subject(kind, args, "series")?;
        f(&mut s)?;
        Ok((kind.wrap)(s))
    })
}

fn native_skip<T: Clone + PartialEq + 'static>(kind: Kind<T>) -> NativeFn {
    Rc::new(move |args, _refs, _eval| {
        let mut s = subject(kind, args, "skip")?;
        let n = args.get(1).and_then(Value::as_integer).ok_or_else(|| Error::type_mismatch("skip", "integer", "none"))?;
        s.skip_by(n as isize);
        Ok((kind.wrap)(s))
    })
}

fn native_at<T: Clone + PartialEq + 'static>(kind: Kind<T>) -> NativeFn {
    Rc::new(move |args, _refs, _eval| {
        let s = subject(kind, args, "at")?;
        let n = args.get(1).and_then(Value::as_integer).ok_or_else(|| Error::type_mismatch("at", "integer", "none"))?;
        Ok(s.at_offset(n as isize - 1).map_or(Value::None, kind.to_value))
    })
}

fn native_pick<T: Clone + PartialEq + 'static>(kind: Kind<T>) -> NativeFn {
    Rc::new(move |args, _refs, _eval| {
        let s = subject(kind, args, "pick")?;
        let n = args.get(1).and_then(Value::as_integer).ok_or_else(|| Error::type_mismatch("pick", "integer", "none"))?;
        if n < 1 {
            return Ok(Value::None);
        }
        Ok(s.element_at((n - 1) as usize).map_or(Value::None, kind.to_value))
    })
}

fn native_poke<T: Clone + PartialEq + 'static>(kind: Kind<T>) -> NativeFn {
    Rc::new(move |args, _refs, _eval| {
        let mut s = subject(kind, args, "poke")?;
        let n = args.get(1).and_then(Value::as_integer).ok_or_else(|| Error::type_mismatch("poke", "integer", "none"))?;
        let value = (kind.one)(&args[2]).ok_or_else(|| Error::type_mismatch("poke", "matching element", &args[2].tag().to_string()))?;
        if n < 1 {
            return Err(Error::out_of_bounds("poke", "index below 1"));
        }
        s.set_at((n - 1) as usize, value)?;
        Ok((kind.wrap)(s))
    })
}

fn native_find<T: Clone + PartialEq + 'static>(kind: Kind<T>) -> NativeFn {
    Rc::new(move |args, _refs, _eval| {
        let s = subject(kind, args, "find")?;
        let needle = (kind.one)(&args[1]).ok_or_else(|| Error::type_mismatch("find", "matching element", &args[1].tag().to_string()))?;
        Ok(s.find(&needle).map_or(Value::None, |p| Value::Integer(p as i64 + 1)))
    })
}

/// `select subject value`: locates `value` and returns the element *after*
/// it, the classic Rebol "association list" reading of a block.
fn native_select<T: Clone + PartialEq + 'static>(kind: Kind<T>) -> NativeFn {
    Rc::new(move |args, _refs, _eval| {
        let s = subject(kind, args, "select")?;
        let needle = (kind.one)(&args[1]).ok_or_else(|| Error::type_mismatch("select", "matching element", &args[1].tag().to_string()))?;
        let Some(pos) = s.find(&needle) else { return Ok(Value::None) };
        Ok(s.element_at(pos + 1).map_or(Value::None, kind.to_value))
    })
}

fn native_append<T: Clone + PartialEq + 'static>(kind: Kind<T>) -> NativeFn {
    Rc::new(move |args, _refs, _eval| {
        let mut s = subject(kind, args, "append")?;
        let values = (kind.many)(&args[1]).ok_or_else(|| Error::type_mismatch("append", "matching element(s)", &args[1].tag().to_string()))?;
        s.append_many(values);
        Ok((kind.wrap)(s))
    })
}

fn native_insert<T: Clone + PartialEq + 'static>(kind: Kind<T>) -> NativeFn {
    Rc::new(move |args, _refs, _eval| {
        let mut s = subject(kind, args, "insert")?;
        let values = (kind.many)(&args[1]).ok_or_else(|| Error::type_mismatch("insert", "matching element(s)", &args[1].tag().to_string()))?;
        s.insert_many(values);
        Ok((kind.wrap)(s))
    })
}

fn native_change<T: Clone + PartialEq + 'static>(kind: Kind<T>) -> NativeFn {
    Rc::new(move |args, _refs, _eval| {
        let mut s = subject(kind, args, "change")?;
        let value = (kind.one)(&args[1]).ok_or_else(|| Error::type_mismatch("change", "single matching element", &args[1].tag().to_string()))?;
        s.change(value)?;
        Ok((kind.wrap)(s))
    })
}

fn native_remove<T: Clone + PartialEq + 'static>(kind: Kind<T>) -> NativeFn {
    Rc::new(move |args, refs, _eval| {
        let mut s = subject(kind, args, "remove")?;
        let k = part_count(refs, 1)?;
        s.remove(k)?;
        Ok((kind.wrap)(s))
    })
}

fn native_clear<T: Clone + PartialEq + 'static>(kind: Kind<T>) -> NativeFn {
    Rc::new(move |args, _refs, _eval| {
        let mut s = subject(kind, args, "clear")?;
        s.clear_to_tail();
        Ok((kind.wrap)(s))
    })
}

fn native_copy<T: Clone + PartialEq + 'static>(kind: Kind<T>) -> NativeFn {
    Rc::new(move |args, refs, _eval| {
        let s = subject(kind, args, "copy")?;
        let copied = match refs.get("part") {
            Some(v) => {
                let k = v.as_integer().ok_or_else(|| Error::type_mismatch("copy", "integer", &v.tag().to_string()))?;
                s.copy_part(k.max(0) as usize)?
            }
            None => s.copy_rest(),
        };
        Ok((kind.wrap)(copied))
    })
}

fn native_take<T: Clone + PartialEq + 'static>(kind: Kind<T>) -> NativeFn {
    Rc::new(move |args, refs, _eval| {
        let mut s = subject(kind, args, "take")?;
        match refs.get("part") {
            Some(v) => {
                let k = v.as_integer().ok_or_else(|| Error::type_mismatch("take", "integer", &v.tag().to_string()))?;
                let taken = s.take_count(k.max(0) as usize);
                Ok((kind.wrap)(SeriesCore::from_vec(taken)))
            }
            None => {
                let mut taken = s.take_count(1);
                Ok(taken.pop().map_or(Value::None, kind.to_value))
            }
        }
    })
}

fn native_reverse<T: Clone + PartialEq + 'static>(kind: Kind<T>) -> NativeFn {
    Rc::new(move |args, _refs, _eval| {
        let mut s = subject(kind, args, "reverse")?;
        s.reverse_in_place();
        Ok((kind.wrap)(s))
    })
}

fn native_sort<T: Clone + PartialEq + 'static>(kind: Kind<T>) -> NativeFn {
    Rc::new(move |args, _refs, _eval| {
        let mut s = subject(kind, args, "sort")?;
        s.sort_in_place_by(kind.cmp);
        Ok((kind.wrap)(s))
    })
}

/// `trim`: drops leading and trailing "blank" elements (`kind.is_blank`) —
/// whitespace for `String`, `None` for `Block`/`Paren`, zero bytes for
/// `Binary`.
fn native_trim<T: Clone + PartialEq + 'static>(kind: Kind<T>) -> NativeFn {
    Rc::new(move |args, _refs, _eval| {
        let s = subject(kind, args, "trim")?;
        let mut items = s.snapshot();
        while items.first().is_some_and(kind.is_blank) {
            items.remove(0);
        }
        while items.last().is_some_and(kind.is_blank) {
            items.pop();
        }
        Ok((kind.wrap)(SeriesCore::from_vec(items)))
    })
}

fn part_count(refs: &crate::native::RefMap, default: usize) -> Result<usize, Error> {
    match refs.get("part") {
        Some(v) => {
            let k = v.as_integer().ok_or_else(|| Error::type_mismatch("remove", "integer", &v.tag().to_string()))?;
            Ok(k.max(0) as usize)
        }
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{frame::FrameRegistry, native::RefMap};

    fn setup() -> (FrameRegistry, TypeFrames) {
        let mut registry = FrameRegistry::new();
        let types = TypeFrames::install(&mut registry);
        register(&mut registry, types).unwrap();
        (registry, types)
    }

    fn call(registry: &FrameRegistry, types: &TypeFrames, tag: Tag, action: &str, args: &[Value]) -> Result<Value, Error> {
        let f = types.lookup(registry, tag, action)?;
        let Value::Function(f) = f else { unreachable!() };
        let crate::function::FunctionKind::Native(native) = &f.body else { unreachable!() };
        let mut eval = crate::eval::Evaluator::new(crate::io::HostIo::null(), Box::new(crate::limits::NoLimits));
        native(args, &RefMap::new(), &mut eval)
    }

    #[test]
    fn first_on_empty_block_is_none_not_error() {
        let (registry, types) = setup();
        let result = call(&registry, &types, Tag::Block, "first", &[Value::block(vec![])]).unwrap();
        assert_eq!(result, Value::None);
    }

    #[test]
    fn find_returns_one_based_position() {
        let (registry, types) = setup();
        let block = Value::block(vec![Value::Integer(10), Value::Integer(20), Value::Integer(30)]);
        let result = call(&registry, &types, Tag::Block, "find", &[block, Value::Integer(20)]).unwrap();
        assert_eq!(result, Value::Integer(2));
    }

    #[test]
    fn append_mutates_shared_buffer() {
        let (registry, types) = setup();
        let block = Value::block(vec![Value::Integer(1)]);
        let Value::Block(handle) = &block else { unreachable!() };
        let alias = handle.clone();
        call(&registry, &types, Tag::Block, "append", &[block, Value::Integer(2)]).unwrap();
        assert_eq!(alias.snapshot(), vec![Value::Integer(1), Value::Integer(2)]);
    }

    #[test]
    fn copy_part_errors_past_remaining_take_clamps() {
        let (registry, types) = setup();
        let block = Value::block(vec![Value::Integer(1), Value::Integer(2)]);
        let mut refs = RefMap::new();
        refs.insert("part".to_owned(), Value::Integer(5));
        let f = types.lookup(&registry, Tag::Block, "copy").unwrap();
        let Value::Function(f) = f else { unreachable!() };
        let crate::function::FunctionKind::Native(native) = &f.body else { unreachable!() };
        let mut eval = crate::eval::Evaluator::new(crate::io::HostIo::null(), Box::new(crate::limits::NoLimits));
        assert!(native(&[block.clone()], &refs, &mut eval).is_err());

        let f = types.lookup(&registry, Tag::Block, "take").unwrap();
        let Value::Function(f) = f else { unreachable!() };
        let crate::function::FunctionKind::Native(native) = &f.body else { unreachable!() };
        assert!(native(&[block], &refs, &mut eval).is_ok());
    }

    #[test]
    fn string_append_concatenates_multi_scalar() {
        let (registry, types) = setup();
        let s = Value::string("abc");
        let result = call(&registry, &types, Tag::String, "append", &[s, Value::string("de")]).unwrap();
        assert_eq!(result.form(), "abcde");
    }
}
