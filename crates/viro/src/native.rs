//! Native ABI and registration.
//!
//! Every built-in operation — math, control flow, series manipulation,
//! I/O — is a [`NativeFn`]: a uniform `(args, refs, eval) -> Result<Value,
//! Error>` closure, identical to what a user-defined function boils down to
//! from the evaluator's point of view. [`EvalHandle`] is the
//! facade a native gets instead of the evaluator's internals directly, so
//! `natives/*` never needs to know about `Do_Next`'s recursion structure,
//! only the handful of operations it exposes.
//!
//! Built-ins are organized into per-category submodules, each registered
//! into the root frame once at startup.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::{
    error::Error,
    frame::{FrameId, FrameKind},
    function::{FunctionValue, ParamSpec},
    intern::Symbol,
    value::{BlockSeries, Value},
};

/// Refinement arguments collected for one call:
/// present keys are the refinements the caller supplied, by bare name (no
/// leading `--`). A valueless refinement's value is `Value::Logic(true)`;
/// a valued one holds the collected argument.
pub type RefMap = IndexMap<String, Value>;

/// The uniform native signature.
pub type NativeFn = Rc<dyn Fn(&[Value], &RefMap, &mut dyn EvalHandle) -> Result<Value, Error>>;

/// What a native gets instead of direct evaluator internals:
/// recursion back into user code (`do_next`/`do_blk`), frame-registry
/// operations for natives like `fn`/`object` that mint new scopes, and the
/// host's I/O streams.
///
/// Object-safe by construction (`&mut dyn EvalHandle` is what a
/// [`NativeFn`] actually receives), so lookups that would naturally return
/// a borrowed `&Value` instead return an owned clone — cheap for immediate
/// values, an `Rc` bump for series/functions/objects.
pub trait EvalHandle {
    /// Evaluates a single value (word lookup, function call, set-word
    /// assignment, or pass-through for literals) — `Do_Next`.
    fn do_next(&mut self, v: Value) -> Result<Value, Error>;

    /// Evaluates a whole block, including infix fixup between consecutive
    /// results — `Do_Blk`.
    fn do_blk(&mut self, block: &BlockSeries) -> Result<Value, Error>;

    fn current_frame_index(&self) -> FrameId;

    /// Pushes `frame` as the current evaluation frame. Paired with
    /// [`EvalHandle::pop_frame`] — prefer [`with_frame`] over calling these
    /// directly, since it restores the previous frame even if the closure
    /// returns `Err`.
    fn push_frame(&mut self, frame: FrameId);
    fn pop_frame(&mut self);

    fn register_frame(&mut self, kind: FrameKind, parent: Option<FrameId>) -> FrameId;
    fn mark_frame_captured(&mut self, id: FrameId);

    fn bind(&mut self, frame: FrameId, name: Symbol, value: Value);
    fn resolve(&self, frame: FrameId, name: Symbol) -> Result<Value, Error>;
    /// Soft lookup: `None` rather than `unbound-word` when absent. Used by
    /// natives like `select` where a missing field is a normal result, not
    /// a failure.
    fn get(&self, frame: FrameId, name: Symbol) -> Option<Value>;

    fn output_writer(&mut self) -> &mut dyn std::io::Write;
    fn error_writer(&mut self) -> &mut dyn std::io::Write;
    fn input_reader(&mut self) -> &mut dyn std::io::BufRead;
}

/// Runs `body` with `frame` pushed as current, guaranteeing the matching
/// pop regardless of how `body` returns — the native-ABI counterpart of `frame::with_frame`, usable
/// through the object-safe [`EvalHandle`] trait object.
pub fn with_frame<T>(
    eval: &mut dyn EvalHandle,
    frame: FrameId,
    body: impl FnOnce(&mut dyn EvalHandle) -> Result<T, Error>,
) -> Result<T, Error> {
    eval.push_frame(frame);
    let result = body(eval);
    eval.pop_frame();
    result
}

/// Registers `native` under `name` into `frame`, raising `duplicate-native`
/// if the name is already locally bound there.
pub fn register_native(
    registry: &mut crate::frame::FrameRegistry,
    frame: FrameId,
    name: &str,
    params: impl Into<smallvec::SmallVec<[ParamSpec; 4]>>,
    native: NativeFn,
) -> Result<(), Error> {
    let sym = crate::intern::intern(name);
    if registry.has_local_binding(frame, sym) {
        return Err(Error::duplicate_native(name));
    }
    let function = FunctionValue::native(name, params, native);
    registry.bind(frame, sym, Value::Function(Rc::new(function)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameRegistry;

    fn noop_native() -> NativeFn {
        Rc::new(|_, _, _| Ok(Value::None))
    }

    #[test]
    fn duplicate_registration_in_same_frame_is_fatal() {
        let mut registry = FrameRegistry::new();
        register_native(&mut registry, FrameId::ROOT, "widget", vec![], noop_native()).unwrap();
        let err = register_native(&mut registry, FrameId::ROOT, "widget", vec![], noop_native())
            .expect_err("duplicate must error");
        assert_eq!(err.id, crate::error::ErrorId::DuplicateNative);
    }
}
