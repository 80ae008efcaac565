//! Control-flow and definition natives:
//! `if`, `either`, `while`, `loop`, `foreach`, `do`, `fn`/`function`,
//! `return`, `break`, `continue`, `compose`, `print`, plus the `true`/
//! `false`/`none` word bindings the parser treats as ordinary `Word`s
//! (`parser/mod.rs`: "`true`/`false`/`none` parse as plain Words").
//!
//! Break/continue propagate as [`crate::error::Error`]'s `Control` category
//! and every loop
//! here intercepts them via [`crate::error::Error::decrement_levels`] before
//! they can escape past the loop they target.
//!
//! Loop-signal unwinding rides the same error channel as ordinary
//! failures (`error.rs`), rather than a second control-flow channel.

use std::rc::Rc;

use crate::{
    error::{Error, ErrorId},
    frame::{FrameId, FrameRegistry},
    function::{FunctionValue, ParamSpec},
    native::{EvalHandle, NativeFn, RefMap, register_native},
    value::{BlockSeries, Value},
};

pub fn register(registry: &mut FrameRegistry, root: FrameId) -> Result<(), Error> {
    registry.bind(root, crate::intern::intern("true"), Value::Logic(true));
    registry.bind(root, crate::intern::intern("false"), Value::Logic(false));
    registry.bind(root, crate::intern::intern("none"), Value::None);

    register_native(
        registry,
        root,
        "if",
        vec![ParamSpec::positional("cond"), ParamSpec::lit_positional("body"), ParamSpec::optional_lit_positional("else-body")],
        native_if(),
    )?;
    register_native(
        registry,
        root,
        "either",
        vec![ParamSpec::positional("cond"), ParamSpec::lit_positional("true-body"), ParamSpec::lit_positional("false-body")],
        native_either(),
    )?;
    register_native(
        registry,
        root,
        "while",
        vec![ParamSpec::lit_positional("cond"), ParamSpec::lit_positional("body")],
        native_while(),
    )?;
    register_native(registry, root, "loop", vec![ParamSpec::positional("count"), ParamSpec::lit_positional("body")], native_loop())?;
    register_native(
        registry,
        root,
        "foreach",
        vec![ParamSpec::lit_positional("word"), ParamSpec::positional("series"), ParamSpec::lit_positional("body")],
        native_foreach(),
    )?;
    register_native(registry, root, "do", vec![ParamSpec::positional("value")], native_do())?;
    let function_native = native_fn();
    register_native(registry, root, "fn", vec![ParamSpec::lit_positional("params"), ParamSpec::lit_positional("body")], Rc::clone(&function_native))?;
    register_native(registry, root, "function", vec![ParamSpec::lit_positional("params"), ParamSpec::lit_positional("body")], function_native)?;
    register_native(registry, root, "return", vec![ParamSpec::positional("value")], Rc::new(|args, _refs, _eval| {
        Err(Error::return_signal(args[0].clone()))
    }))?;
    register_native(registry, root, "break", vec![ParamSpec::refinement("levels", true)], Rc::new(|_args, refs, _eval| {
        Err(Error::break_signal(levels_of(refs)))
    }))?;
    register_native(registry, root, "continue", vec![ParamSpec::refinement("levels", true)], Rc::new(|_args, refs, _eval| {
        Err(Error::continue_signal(levels_of(refs)))
    }))?;
    register_native(registry, root, "compose", vec![ParamSpec::lit_positional("body")], native_compose())?;
    register_native(registry, root, "print", vec![ParamSpec::positional("value")], Rc::new(|args, _refs, eval| {
        let text = args[0].form();
        let w = eval.output_writer();
        let _ = std::io::Write::write_all(w, text.as_bytes());
        let _ = std::io::Write::write_all(w, b"\n");
        Ok(Value::None)
    }))?;
    Ok(())
}

fn levels_of(refs: &RefMap) -> u32 {
    refs.get("levels").and_then(Value::as_integer).map_or(1, |n| n.max(1) as u32)
}

fn require_block<'a>(v: &'a Value, op: &str) -> Result<&'a BlockSeries, Error> {
    v.as_block().ok_or_else(|| Error::type_mismatch(op, "block", &v.tag().to_string()))
}

fn native_if() -> NativeFn {
    Rc::new(|args, _refs, eval| {
        if args[0].is_truthy() {
            eval.do_blk(require_block(&args[1], "if")?)
        } else if let Some(else_body) = args[2].as_block() {
            eval.do_blk(else_body)
        } else {
            Ok(Value::None)
        }
    })
}

fn native_either() -> NativeFn {
    Rc::new(|args, _refs, eval| {
        if args[0].is_truthy() {
            eval.do_blk(require_block(&args[1], "either")?)
        } else {
            eval.do_blk(require_block(&args[2], "either")?)
        }
    })
}

/// Shared "absorb this loop's own break/continue, propagate anything with
/// levels left over" reducer every loop native below folds its body result
/// through.
enum StepOutcome {
    Continue,
    Break,
    Propagate(Error),
}

fn fold_control(result: Result<Value, Error>) -> Result<StepOutcome, Error> {
    match result {
        Ok(_) => Ok(StepOutcome::Continue),
        Err(e) if e.id == ErrorId::Break => match e.decrement_levels() {
            Ok(_) => Ok(StepOutcome::Break),
            Err(remaining) => Ok(StepOutcome::Propagate(remaining)),
        },
        Err(e) if e.id == ErrorId::Continue => match e.decrement_levels() {
            Ok(_) => Ok(StepOutcome::Continue),
            Err(remaining) => Ok(StepOutcome::Propagate(remaining)),
        },
        Err(e) => Err(e),
    }
}

fn native_while() -> NativeFn {
    Rc::new(|args, _refs, eval| {
        let cond = require_block(&args[0], "while")?.clone_handle();
        let body = require_block(&args[1], "while")?.clone_handle();
        loop {
            if !eval.do_blk(&cond)?.is_truthy() {
                return Ok(Value::None);
            }
            match fold_control(eval.do_blk(&body))? {
                StepOutcome::Continue => {}
                StepOutcome::Break => return Ok(Value::None),
                StepOutcome::Propagate(e) => return Err(e),
            }
        }
    })
}

fn native_loop() -> NativeFn {
    Rc::new(|args, _refs, eval| {
        let count = args[0].as_integer().ok_or_else(|| Error::type_mismatch("loop", "integer", &args[0].tag().to_string()))?;
        let body = require_block(&args[1], "loop")?.clone_handle();
        for _ in 0..count.max(0) {
            match fold_control(eval.do_blk(&body))? {
                StepOutcome::Continue => {}
                StepOutcome::Break => break,
                StepOutcome::Propagate(e) => return Err(e),
            }
        }
        Ok(Value::None)
    })
}

/// Flattens any series into the element sequence `foreach` walks.
fn series_elements(v: &Value, op: &str) -> Result<Vec<Value>, Error> {
    if let Some(block) = v.as_block() {
        return Ok(block.snapshot());
    }
    if let Some(s) = v.as_string() {
        return Ok(s.snapshot().into_iter().map(|c| Value::string(&c.to_string())).collect());
    }
    if let Some(b) = v.as_binary() {
        return Ok(b.snapshot().into_iter().map(|b| Value::Integer(i64::from(b))).collect());
    }
    Err(Error::type_mismatch(op, "series", &v.tag().to_string()))
}

fn native_foreach() -> NativeFn {
    Rc::new(|args, _refs, eval| {
        let sym = args[0].as_symbol().ok_or_else(|| Error::type_mismatch("foreach", "word", &args[0].tag().to_string()))?;
        let items = series_elements(&args[1], "foreach")?;
        let body = require_block(&args[2], "foreach")?.clone_handle();
        let frame = eval.current_frame_index();
        for item in items {
            eval.bind(frame, sym, item);
            match fold_control(eval.do_blk(&body))? {
                StepOutcome::Continue => {}
                StepOutcome::Break => break,
                StepOutcome::Propagate(e) => return Err(e),
            }
        }
        Ok(Value::None)
    })
}

fn native_do() -> NativeFn {
    Rc::new(|args, _refs, eval| match &args[0] {
        Value::Block(_) | Value::Paren(_) => eval.do_blk(require_block(&args[0], "do")?),
        other => Ok(other.clone()),
    })
}

/// Builds a `ParamSpec` list from a `fn`/`function` parameter block: plain
/// words are eager positionals, lit-words (`'word`) are lit-positionals,
/// and `--name` words are refinements. Every refinement is declared
/// `takes_value: true`.
fn parse_param_spec(params: &BlockSeries) -> Vec<ParamSpec> {
    params
        .snapshot()
        .into_iter()
        .filter_map(|v| match v {
            Value::Word(sym) => {
                let text = sym.as_str();
                Some(if let Some(name) = text.strip_prefix("--") {
                    ParamSpec::refinement(name, true)
                } else {
                    ParamSpec::positional(text)
                })
            }
            Value::LitWord(sym) => Some(ParamSpec::lit_positional(sym.as_str())),
            _ => None,
        })
        .collect()
}

fn native_fn() -> NativeFn {
    Rc::new(|args, _refs, eval| {
        let params = parse_param_spec(require_block(&args[0], "fn")?);
        let body = require_block(&args[1], "fn")?.clone_handle();
        let captured = eval.current_frame_index();
        eval.mark_frame_captured(captured);
        let f = FunctionValue::user(None, params, body, captured);
        Ok(Value::Function(Rc::new(f)))
    })
}

/// `compose`: parens inside the block evaluate; a paren evaluating to a
/// block splices its elements in place, any other result is inserted as a
/// single element, and everything else passes through unchanged (the
/// standard Rebol reading of `compose`).
fn native_compose() -> NativeFn {
    Rc::new(|args, _refs, eval| {
        let source = require_block(&args[0], "compose")?.snapshot();
        let mut out = Vec::with_capacity(source.len());
        for element in source {
            match element {
                Value::Paren(body) => {
                    let result = eval.do_blk(&body)?;
                    if let Value::Block(spliced) | Value::Paren(spliced) = &result {
                        out.extend(spliced.snapshot());
                    } else {
                        out.push(result);
                    }
                }
                other => out.push(other),
            }
        }
        Ok(Value::block(out))
    })
}
