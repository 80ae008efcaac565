//! The native library, organized into per-category submodules registered
//! at startup: control, math, series, I/O, bitwise, object.
//!
//! The library itself is conceptually an external plug-in obeying the
//! native ABI; this module is a representative slice — enough breadth to
//! run every core language scenario and the standard action set, without
//! pretending to be a full standard library.

pub mod bitwise;
pub mod control;
pub mod io_ops;
pub mod math;
pub mod object_ops;
pub mod series_ops;

use crate::{
    error::Error,
    frame::{FrameId, FrameRegistry},
    function::ParamSpec,
    typeframe::TypeFrames,
};

/// Every action name the dispatcher (`dispatch.rs`) installs — the
/// representative core set (no `intersect`/`difference`/`union`: those
/// remain named-only, outside this representative slice's depth).
pub const ACTION_NAMES: &[&str] = &[
    "first", "last", "next", "back", "head", "tail", "head?", "tail?", "index?", "append", "insert", "remove",
    "change", "copy", "take", "skip", "length?", "empty?", "at", "pick", "poke", "find", "select", "clear",
    "reverse", "sort", "trim", "put",
];

/// Positional/refinement signature for each action name in [`ACTION_NAMES`].
/// The dispatcher (`dispatch.rs`) registers each name's root-frame `Function`
/// with exactly this signature, since argument *collection*
/// happens before the dispatcher ever sees the type of `args[0]` — the
/// signature can't vary by type the way the per-type *implementation* can.
#[must_use]
pub fn action_params(name: &str) -> Vec<ParamSpec> {
    let subject = || ParamSpec::positional("subject");
    match name {
        "append" | "insert" | "change" | "find" | "select" | "skip" | "at" | "pick" => {
            vec![subject(), ParamSpec::positional("value")]
        }
        "poke" | "put" => vec![subject(), ParamSpec::positional("key"), ParamSpec::positional("value")],
        "remove" | "copy" | "take" => vec![subject(), ParamSpec::refinement("part", true)],
        _ => vec![subject()],
    }
}

/// Registers every category's natives into `root`, and every action's
/// per-type implementation into `types`.
pub fn register_all(registry: &mut FrameRegistry, root: FrameId, types: TypeFrames) -> Result<(), Error> {
    math::register(registry, root)?;
    control::register(registry, root)?;
    io_ops::register(registry, root)?;
    bitwise::register(registry, root, types)?;
    series_ops::register(registry, types)?;
    object_ops::register(registry, root, types)?;
    crate::dispatch::register_dispatchers(registry, root, types)?;
    Ok(())
}
