//! Action dispatch.
//!
//! Actions (`first`, `append`, `length?`, …) are ordinary root-frame
//! `Function` values whose native body is the single dispatcher built by
//! this module, shared by every action name. `natives/*` registers the
//! per-type implementations into [`crate::typeframe::TypeFrames`]; this
//! file only does the lookup-and-forward.
//!
//! Dispatch is polymorphic by first-argument type: look up the type
//! frame for `type(args[0])`, then the action name within it.

use std::rc::Rc;

use crate::{
    error::Error,
    frame::{FrameId, FrameRegistry},
    function::{FunctionKind, FunctionValue},
    native::{EvalHandle, NativeFn, RefMap, register_native},
    typeframe::TypeFrames,
    value::Value,
};

/// Builds the dispatcher native for `action_name`: asserts an argument exists, looks up its type's table, forwards
/// the original `(args, refs, eval)` verbatim. `types` is captured by
/// value — a handful of `FrameId`s, cheaper than threading a reference
/// through the native ABI.
fn dispatcher(action_name: &'static str, types: TypeFrames) -> NativeFn {
    Rc::new(move |args, refs, eval: &mut dyn EvalHandle| -> Result<Value, Error> {
        let first = args.first().ok_or_else(|| Error::arg_count(action_name, 1, 0))?;
        let tag = first.tag();
        let sym = crate::intern::intern(action_name);
        let bound = eval
            .resolve(types.table_for(tag), sym)
            .map_err(|_| Error::action_no_impl(action_name, &tag.to_string()))?;
        let Value::Function(f) = bound else {
            return Err(Error::action_no_impl(action_name, &tag.to_string()));
        };
        invoke_looked_up(&f, args, refs, eval)
    })
}

fn invoke_looked_up(f: &FunctionValue, args: &[Value], refs: &RefMap, eval: &mut dyn EvalHandle) -> Result<Value, Error> {
    match &f.body {
        FunctionKind::Native(native) => native(args, refs, eval),
        FunctionKind::User { .. } => Err(Error::internal(
            crate::error::ErrorId::InvalidOperation,
            ["type-frame actions must be natives".to_owned()],
        )),
    }
}

/// Registers every name in [`crate::natives::ACTION_NAMES`] as a dispatcher
/// bound in `root`.
pub fn register_dispatchers(registry: &mut FrameRegistry, root: FrameId, types: TypeFrames) -> Result<(), Error> {
    for &name in crate::natives::ACTION_NAMES {
        let params = crate::natives::action_params(name);
        register_native(registry, root, name, params, dispatcher(name, types))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameKind;

    #[test]
    fn dispatch_forwards_to_registered_type_impl() {
        let mut registry = FrameRegistry::new();
        let types = TypeFrames::install(&mut registry);
        let native: NativeFn = Rc::new(|args, _refs, _eval| Ok(Value::Integer(args.len() as i64)));
        types.register_action(&mut registry, crate::value::Tag::Block, "length?", native).unwrap();
        register_dispatchers(&mut registry, FrameId::ROOT, types).unwrap();

        let sym = crate::intern::intern("length?");
        let Value::Function(dispatch_fn) = registry.get(FrameId::ROOT, sym).cloned().unwrap() else {
            panic!("dispatcher not registered");
        };
        let FunctionKind::Native(native) = &dispatch_fn.body else { panic!("expected native") };
        let mut eval = crate::eval::Evaluator::new(crate::io::HostIo::null(), Box::new(crate::limits::NoLimits));
        let _ = FrameKind::Root;
        let result = native(&[Value::block(vec![])], &RefMap::new(), &mut eval).unwrap();
        assert_eq!(result, Value::Integer(1));
    }
}
