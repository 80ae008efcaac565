//! Viro: a tree-walking interpreter for a small Rebol-style dynamic
//! language.
//!
//! The crate is organised leaf-first: [`value`] and [`series`] are the
//! value universe and its cursor-bearing sequences; [`intern`] and
//! [`frame`] are the symbol table and lexical binding environments;
//! [`function`] and [`typeframe`] describe callables and per-type method
//! tables; [`eval`] is the tree-walking core; [`dispatch`] wires
//! polymorphic actions into it; [`native`] and [`natives`] are the ABI
//! every built-in obeys and the built-ins themselves; [`error`] is the
//! closed error taxonomy that threads through all of the above;
//! [`parser`], [`port`], [`io`], [`limits`], [`run`], [`repl`] and
//! [`repl_error`] round out parsing, I/O, resource limits, and the
//! one-shot/REPL execution entry points.

#![expect(clippy::module_name_repetitions, reason = "FrameRegistry/FrameStack naming mirrors the domain vocabulary")]

pub mod dispatch;
pub mod error;
pub mod eval;
pub mod frame;
pub mod function;
pub mod intern;
pub mod io;
pub mod limits;
pub mod native;
pub mod natives;
pub mod parser;
pub mod port;
pub mod repl;
pub mod repl_error;
pub mod run;
pub mod series;
pub mod typeframe;
pub mod value;

pub use crate::{
    error::{Category, ControlPayload, Error, ErrorId},
    eval::Evaluator,
    frame::{Frame, FrameId, FrameKind, FrameRegistry, FrameStack},
    function::{FunctionKind, FunctionValue, ParamSpec},
    intern::Symbol,
    io::HostIo,
    limits::{BoundedLimits, Limits, NoLimits},
    native::{EvalHandle, NativeFn, RefMap},
    port::Port,
    repl::ReplSession,
    repl_error::ReplError,
    run::{Runner, run_source},
    series::SeriesCore,
    typeframe::TypeFrames,
    value::{BinarySeries, BlockSeries, ObjectInstance, StringSeries, Tag, Value},
};
