//! Objects.
//!
//! `object [...]` evaluates a literal spec block in a fresh `Object`-kind
//! frame, the same "push a frame, run the body, every set-word binds into
//! it" shape `fn`'s body execution uses (`control.rs::native_fn`) — except
//! the frame here is the *result* rather than a closure's captured parent.
//!
//! Backed by the same frame-registry machinery every lexical scope uses,
//! wrapped as a frame-backed `ObjectInstance` (`value.rs`).

use std::{cell::RefCell, rc::Rc};

use crate::{
    error::Error,
    frame::{FrameId, FrameKind, FrameRegistry},
    function::ParamSpec,
    native::{EvalHandle, NativeFn, register_native},
    typeframe::TypeFrames,
    value::{ObjectInstance, Tag, Value},
};

pub fn register(registry: &mut FrameRegistry, root: FrameId, types: TypeFrames) -> Result<(), Error> {
    register_native(registry, root, "object", vec![ParamSpec::lit_positional("body")], native_object())?;
    types.register_action(registry, Tag::Object, "select", native_select())?;
    types.register_action(registry, Tag::Object, "put", native_put())?;
    Ok(())
}

fn require_object(v: &Value, op: &str) -> Result<Rc<RefCell<ObjectInstance>>, Error> {
    v.as_object().cloned().ok_or_else(|| Error::type_mismatch(op, "object", &v.tag().to_string()))
}

fn require_word(v: &Value, op: &str) -> Result<crate::intern::Symbol, Error> {
    v.as_symbol().ok_or_else(|| Error::type_mismatch(op, "word", &v.tag().to_string()))
}

/// Runs `body` inside a fresh, parentless `Object` frame and wraps
/// the frame as the resulting `Object` value.
fn native_object() -> NativeFn {
    Rc::new(|args, _refs, eval| {
        let body = args[0].as_block().ok_or_else(|| Error::type_mismatch("object", "block", &args[0].tag().to_string()))?.clone_handle();
        let frame = eval.register_frame(FrameKind::Object, None);
        eval.push_frame(frame);
        let result = eval.do_blk(&body);
        eval.pop_frame();
        result?;
        Ok(Value::Object(Rc::new(RefCell::new(ObjectInstance { frame }))))
    })
}

/// `select object 'field` reads a field by name, `None` when absent — the
/// same "miss is a value, not an error" contract `select` has over series.
fn native_select() -> NativeFn {
    Rc::new(|args, _refs, eval| {
        let obj = require_object(&args[0], "select")?;
        let sym = require_word(&args[1], "select")?;
        let frame = obj.borrow().frame;
        Ok(eval.get(frame, sym).unwrap_or(Value::None))
    })
}

/// `put object 'field value` binds `field` in the object's own frame,
/// creating it if absent.
fn native_put() -> NativeFn {
    Rc::new(|args, _refs, eval| {
        let obj = require_object(&args[0], "put")?;
        let sym = require_word(&args[1], "put")?;
        let value = args[2].clone();
        let frame = obj.borrow().frame;
        eval.bind(frame, sym, value.clone());
        Ok(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{eval::Evaluator, io::HostIo, limits::NoLimits};

    fn test_eval() -> Evaluator {
        let mut eval = Evaluator::new(HostIo::null(), Box::new(NoLimits));
        let types = TypeFrames::install(&mut eval.frames);
        register(&mut eval.frames, eval.root_frame(), types).unwrap();
        crate::natives::control::register(&mut eval.frames, eval.root_frame()).unwrap();
        crate::natives::math::register(&mut eval.frames, eval.root_frame()).unwrap();
        crate::dispatch::register_dispatchers(&mut eval.frames, eval.root_frame(), types).unwrap();
        eval
    }

    #[test]
    fn object_fields_are_readable_by_select() {
        let mut eval = test_eval();
        let source = "p: object [x: 1 y: 2] select p 'x";
        let block = crate::parser::parse(source).unwrap().root;
        let result = eval.eval_stream(block.as_block().unwrap()).unwrap();
        assert_eq!(result, Value::Integer(1));
    }

    #[test]
    fn put_adds_or_overwrites_a_field() {
        let mut eval = test_eval();
        let source = "p: object [x: 1] put p 'x 99 select p 'x";
        let block = crate::parser::parse(source).unwrap().root;
        let result = eval.eval_stream(block.as_block().unwrap()).unwrap();
        assert_eq!(result, Value::Integer(99));
    }

    #[test]
    fn select_missing_field_is_none_not_error() {
        let mut eval = test_eval();
        let source = "p: object [x: 1] select p 'missing";
        let block = crate::parser::parse(source).unwrap().root;
        let result = eval.eval_stream(block.as_block().unwrap()).unwrap();
        assert_eq!(result, Value::None);
    }
}
