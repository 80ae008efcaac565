//! Bit operations.
//!
//! `and~`/`or~`/`xor~`/`not~`/`shift` are registered both as root-frame
//! natives (so `and~ 6 3` works directly) and into the `Integer`/`Binary`
//! type frames as the `Series`-style per-type actions the dispatcher
//! (`dispatch.rs`) expects — binaries apply the operation byte-by-byte,
//! zero-extending the shorter operand, matching the series-of-bytes view
//! `value.rs` already takes of `Binary`.
//!
//! Reuses the same binary-numeric builder pattern `math.rs` uses for
//! arithmetic operators, applied to a bitwise operator set instead.

use std::rc::Rc;

use crate::{
    error::Error,
    frame::{FrameId, FrameRegistry},
    function::ParamSpec,
    native::{NativeFn, register_native},
    typeframe::TypeFrames,
    value::{Tag, Value},
};

/// Registers the root-frame callable forms and the per-type `Series`
/// actions the dispatcher forwards to for `Integer`/`Binary`.
pub fn register(registry: &mut FrameRegistry, root: FrameId, types: TypeFrames) -> Result<(), Error> {
    register_native(registry, root, "and~", vec![ParamSpec::positional("a"), ParamSpec::positional("b")], native_and())?;
    register_native(registry, root, "or~", vec![ParamSpec::positional("a"), ParamSpec::positional("b")], native_or())?;
    register_native(registry, root, "xor~", vec![ParamSpec::positional("a"), ParamSpec::positional("b")], native_xor())?;
    register_native(registry, root, "not~", vec![ParamSpec::positional("a")], native_not())?;
    register_native(
        registry,
        root,
        "shift",
        vec![ParamSpec::positional("a"), ParamSpec::positional("bits")],
        native_shift(),
    )?;

    types.register_action(registry, Tag::Integer, "and~", native_and())?;
    types.register_action(registry, Tag::Integer, "or~", native_or())?;
    types.register_action(registry, Tag::Integer, "xor~", native_xor())?;
    types.register_action(registry, Tag::Integer, "not~", native_not())?;
    types.register_action(registry, Tag::Integer, "shift", native_shift())?;

    types.register_action(registry, Tag::Binary, "and~", native_binary_and())?;
    types.register_action(registry, Tag::Binary, "or~", native_binary_or())?;
    types.register_action(registry, Tag::Binary, "xor~", native_binary_xor())?;
    types.register_action(registry, Tag::Binary, "not~", native_binary_not())?;
    Ok(())
}

fn tag_name(args: &[Value], index: usize) -> String {
    args.get(index).map_or_else(|| "none".to_owned(), |v| v.tag().to_string())
}

fn want_ints(op: &str, args: &[Value]) -> Result<(i64, i64), Error> {
    let a = args[0].as_integer().ok_or_else(|| Error::type_mismatch(op, "integer", &tag_name(args, 0)))?;
    let b = args.get(1).and_then(Value::as_integer).ok_or_else(|| Error::type_mismatch(op, "integer", &tag_name(args, 1)))?;
    Ok((a, b))
}

fn native_and() -> NativeFn {
    Rc::new(|args, _refs, _eval| {
        let (a, b) = want_ints("and~", args)?;
        Ok(Value::Integer(a & b))
    })
}

fn native_or() -> NativeFn {
    Rc::new(|args, _refs, _eval| {
        let (a, b) = want_ints("or~", args)?;
        Ok(Value::Integer(a | b))
    })
}

fn native_xor() -> NativeFn {
    Rc::new(|args, _refs, _eval| {
        let (a, b) = want_ints("xor~", args)?;
        Ok(Value::Integer(a ^ b))
    })
}

fn native_not() -> NativeFn {
    Rc::new(|args, _refs, _eval| {
        let a = args[0].as_integer().ok_or_else(|| Error::type_mismatch("not~", "integer", &tag_name(args, 0)))?;
        Ok(Value::Integer(!a))
    })
}

/// Positive `bits` shifts left, negative shifts right (arithmetic, sign
/// preserving) — one native spells both directions instead of needing a
/// separate `shift-right`.
fn native_shift() -> NativeFn {
    Rc::new(|args, _refs, _eval| {
        let (a, bits) = want_ints("shift", args)?;
        let shifted = if bits >= 0 {
            a.checked_shl(bits as u32).unwrap_or(0)
        } else {
            a.checked_shr((-bits) as u32).unwrap_or(if a < 0 { -1 } else { 0 })
        };
        Ok(Value::Integer(shifted))
    })
}

fn binary_pair(op: &str, args: &[Value]) -> Result<(Vec<u8>, Vec<u8>), Error> {
    let a = args[0].as_binary().ok_or_else(|| Error::type_mismatch(op, "binary", &tag_name(args, 0)))?.snapshot();
    let b = args.get(1).and_then(Value::as_binary).ok_or_else(|| Error::type_mismatch(op, "binary", &tag_name(args, 1)))?.snapshot();
    Ok((a, b))
}

fn zip_bytes(a: Vec<u8>, b: Vec<u8>, op: impl Fn(u8, u8) -> u8) -> Vec<u8> {
    let len = a.len().max(b.len());
    (0..len).map(|i| op(a.get(i).copied().unwrap_or(0), b.get(i).copied().unwrap_or(0))).collect()
}

fn native_binary_and() -> NativeFn {
    Rc::new(|args, _refs, _eval| {
        let (a, b) = binary_pair("and~", args)?;
        Ok(Value::binary(zip_bytes(a, b, |x, y| x & y)))
    })
}

fn native_binary_or() -> NativeFn {
    Rc::new(|args, _refs, _eval| {
        let (a, b) = binary_pair("or~", args)?;
        Ok(Value::binary(zip_bytes(a, b, |x, y| x | y)))
    })
}

fn native_binary_xor() -> NativeFn {
    Rc::new(|args, _refs, _eval| {
        let (a, b) = binary_pair("xor~", args)?;
        Ok(Value::binary(zip_bytes(a, b, |x, y| x ^ y)))
    })
}

fn native_binary_not() -> NativeFn {
    Rc::new(|args, _refs, _eval| {
        let a = args[0].as_binary().ok_or_else(|| Error::type_mismatch("not~", "binary", &tag_name(args, 0)))?.snapshot();
        Ok(Value::binary(a.into_iter().map(|b| !b).collect()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::RefMap;

    #[test]
    fn and_or_xor_match_integer_semantics() {
        let refs = RefMap::new();
        let mut eval = crate::eval::Evaluator::new(crate::io::HostIo::null(), Box::new(crate::limits::NoLimits));
        assert_eq!(native_and()(&[Value::Integer(6), Value::Integer(3)], &refs, &mut eval).unwrap(), Value::Integer(2));
        assert_eq!(native_or()(&[Value::Integer(6), Value::Integer(3)], &refs, &mut eval).unwrap(), Value::Integer(7));
        assert_eq!(native_xor()(&[Value::Integer(6), Value::Integer(3)], &refs, &mut eval).unwrap(), Value::Integer(5));
        assert_eq!(native_not()(&[Value::Integer(0)], &refs, &mut eval).unwrap(), Value::Integer(-1));
    }

    #[test]
    fn shift_left_and_right() {
        let refs = RefMap::new();
        let mut eval = crate::eval::Evaluator::new(crate::io::HostIo::null(), Box::new(crate::limits::NoLimits));
        assert_eq!(native_shift()(&[Value::Integer(1), Value::Integer(4)], &refs, &mut eval).unwrap(), Value::Integer(16));
        assert_eq!(native_shift()(&[Value::Integer(16), Value::Integer(-4)], &refs, &mut eval).unwrap(), Value::Integer(1));
    }

    #[test]
    fn binary_and_zero_extends_shorter_operand() {
        let refs = RefMap::new();
        let mut eval = crate::eval::Evaluator::new(crate::io::HostIo::null(), Box::new(crate::limits::NoLimits));
        let a = Value::binary(vec![0xFF, 0xFF]);
        let b = Value::binary(vec![0x0F]);
        let result = native_binary_and()(&[a, b], &refs, &mut eval).unwrap();
        assert_eq!(result.as_binary().unwrap().snapshot(), vec![0x0F, 0x00]);
    }
}
