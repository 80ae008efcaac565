//! Arithmetic, comparison, and logic natives.
//!
//! Unlike the action set in `series_ops`/`bitwise`/`object_ops`, these are
//! ordinary root-frame natives, not per-type dispatch targets: `+`/`-`/`=`/
//! `and` are infix operators, not polymorphic actions.
//!
//! Integer/Decimal promotion follows the usual numeric-tower rule: mixing
//! an Integer with a Decimal promotes the Integer operand before the
//! operation runs.

use std::rc::Rc;

use bigdecimal::BigDecimal;

use crate::{
    error::Error,
    frame::{FrameId, FrameRegistry},
    function::ParamSpec,
    native::{NativeFn, RefMap, register_native},
    value::Value,
};

/// Promotes `(Integer, Integer)` pairs to stay `Integer`, and any pair
/// involving a `Decimal` to `(Decimal, Decimal)`.
enum Numeric {
    Int(i64),
    Dec(BigDecimal),
}

fn to_numeric(v: &Value, op: &str) -> Result<Numeric, Error> {
    match v {
        Value::Integer(i) => Ok(Numeric::Int(*i)),
        Value::Decimal(d) => Ok(Numeric::Dec(d.clone())),
        other => Err(Error::type_mismatch(op, "number", &other.tag().to_string())),
    }
}

fn binary_numeric(
    op: &'static str,
    int_op: fn(i64, i64) -> Option<i64>,
    dec_op: fn(BigDecimal, BigDecimal) -> Option<BigDecimal>,
) -> NativeFn {
    Rc::new(move |args, _refs, _eval| {
        let a = to_numeric(&args[0], op)?;
        let b = to_numeric(&args[1], op)?;
        match (a, b) {
            (Numeric::Int(x), Numeric::Int(y)) => {
                int_op(x, y).map(Value::Integer).ok_or_else(|| Error::division_by_zero(op))
            }
            (a, b) => {
                let x = match a {
                    Numeric::Int(x) => BigDecimal::from(x),
                    Numeric::Dec(x) => x,
                };
                let y = match b {
                    Numeric::Int(y) => BigDecimal::from(y),
                    Numeric::Dec(y) => y,
                };
                dec_op(x, y).map(Value::Decimal).ok_or_else(|| Error::division_by_zero(op))
            }
        }
    })
}

fn comparison(op: &'static str, cmp: fn(std::cmp::Ordering) -> bool) -> NativeFn {
    Rc::new(move |args, _refs, _eval| {
        let ordering = match (&args[0], &args[1]) {
            (Value::String(a), Value::String(b)) => a.snapshot().cmp(&b.snapshot()),
            _ => {
                let a = to_numeric(&args[0], op)?;
                let b = to_numeric(&args[1], op)?;
                let (a, b) = match (a, b) {
                    (Numeric::Int(x), Numeric::Int(y)) => return Ok(Value::Logic(cmp(x.cmp(&y)))),
                    (a, b) => {
                        let x = match a {
                            Numeric::Int(x) => BigDecimal::from(x),
                            Numeric::Dec(x) => x,
                        };
                        let y = match b {
                            Numeric::Int(y) => BigDecimal::from(y),
                            Numeric::Dec(y) => y,
                        };
                        (x, y)
                    }
                };
                a.cmp(&b)
            }
        };
        Ok(Value::Logic(cmp(ordering)))
    })
}

fn two(name: &str) -> Vec<ParamSpec> {
    vec![ParamSpec::positional("a"), ParamSpec::positional("b")].into_iter().map(|mut p| {
        p.name = format!("{}-{}", name, p.name);
        p
    }).collect()
}

pub fn register(registry: &mut FrameRegistry, root: FrameId) -> Result<(), Error> {
    register_infix(registry, root, "+", binary_numeric("+", |a, b| a.checked_add(b), |a, b| Some(a + b)))?;
    register_infix(registry, root, "-", binary_numeric("-", |a, b| a.checked_sub(b), |a, b| Some(a - b)))?;
    register_infix(registry, root, "*", binary_numeric("*", |a, b| a.checked_mul(b), |a, b| Some(a * b)))?;
    register_infix(
        registry,
        root,
        "/",
        binary_numeric("/", |a, b| if b == 0 { None } else { a.checked_div(b) }, |a, b| {
            if b == BigDecimal::from(0) { None } else { Some(a / b) }
        }),
    )?;
    register_infix(registry, root, "=", Rc::new(|args, _, _| Ok(Value::Logic(args[0].equals(&args[1])))))?;
    register_infix(registry, root, "<>", Rc::new(|args, _, _| Ok(Value::Logic(!args[0].equals(&args[1])))))?;
    register_infix(registry, root, "<", comparison("<", |o| o == std::cmp::Ordering::Less))?;
    register_infix(registry, root, ">", comparison(">", |o| o == std::cmp::Ordering::Greater))?;
    register_infix(registry, root, "<=", comparison("<=", |o| o != std::cmp::Ordering::Greater))?;
    register_infix(registry, root, ">=", comparison(">=", |o| o != std::cmp::Ordering::Less))?;
    register_infix(
        registry,
        root,
        "and",
        Rc::new(|args, _, _| Ok(Value::Logic(args[0].is_truthy() && args[1].is_truthy()))),
    )?;
    register_infix(
        registry,
        root,
        "or",
        Rc::new(|args, _, _| Ok(Value::Logic(args[0].is_truthy() || args[1].is_truthy()))),
    )?;

    register_native(registry, root, "not", vec![ParamSpec::positional("value")], Rc::new(|args, _, _| {
        Ok(Value::Logic(!args[0].is_truthy()))
    }))?;
    register_native(registry, root, "abs", vec![ParamSpec::positional("value")], Rc::new(|args, _, _| match &args[0] {
        Value::Integer(i) => Ok(Value::Integer(i.abs())),
        Value::Decimal(d) => Ok(Value::Decimal(d.abs())),
        other => Err(Error::type_mismatch("abs", "number", &other.tag().to_string())),
    }))?;
    register_native(registry, root, "sqrt", vec![ParamSpec::positional("value")], Rc::new(|args, _, _| {
        let n = to_numeric(&args[0], "sqrt")?;
        match n {
            Numeric::Int(i) if i < 0 => Err(Error::sqrt_negative("sqrt")),
            Numeric::Int(i) => Ok(Value::Decimal(
                BigDecimal::from(i).sqrt().ok_or_else(|| Error::sqrt_negative("sqrt"))?,
            )),
            Numeric::Dec(d) if d < BigDecimal::from(0) => Err(Error::sqrt_negative("sqrt")),
            Numeric::Dec(d) => Ok(Value::Decimal(d.sqrt().ok_or_else(|| Error::sqrt_negative("sqrt"))?)),
        }
    }))?;
    register_native(registry, root, "min", two("min"), Rc::new(|args, _, _| {
        if comparison_lt(&args[0], &args[1]) { Ok(args[0].clone()) } else { Ok(args[1].clone()) }
    }))?;
    register_native(registry, root, "max", two("max"), Rc::new(|args, _, _| {
        if comparison_lt(&args[0], &args[1]) { Ok(args[1].clone()) } else { Ok(args[0].clone()) }
    }))?;
    Ok(())
}

fn comparison_lt(a: &Value, b: &Value) -> bool {
    match (to_numeric(a, "min/max"), to_numeric(b, "min/max")) {
        (Ok(Numeric::Int(x)), Ok(Numeric::Int(y))) => x < y,
        (Ok(a), Ok(b)) => {
            let x = match a {
                Numeric::Int(x) => BigDecimal::from(x),
                Numeric::Dec(x) => x,
            };
            let y = match b {
                Numeric::Int(y) => BigDecimal::from(y),
                Numeric::Dec(y) => y,
            };
            x < y
        }
        _ => false,
    }
}

fn register_infix(registry: &mut FrameRegistry, root: FrameId, name: &str, native: NativeFn) -> Result<(), Error> {
    register_native(registry, root, name, vec![ParamSpec::positional("a"), ParamSpec::positional("b")], native)?;
    let sym = crate::intern::intern(name);
    let Value::Function(f) = registry.get(root, sym).expect("just registered").clone() else {
        unreachable!("register_native always binds a Function")
    };
    let infixed = Rc::new((*f).clone().infix());
    registry.bind(root, sym, Value::Function(infixed));
    Ok(())
}
