//! Persistent REPL session support.
//!
//! `ReplSession` keeps one [`Evaluator`] (and with it, one frame registry
//! and one root frame) alive across successive [`ReplSession::execute`]
//! calls, so interactive snippets share variables, functions, and objects
//! the same way a single running Viro program would — entering `x: 1` on
//! one line and reading `x` back on the next is exactly a two-element
//! `Do_Blk` split across two calls.
//!
//! Viro's tree-walking evaluator has no external yield point, so
//! `execute` simply runs a whole line to completion and returns — no
//! pause/resume protocol is needed.

use crate::{error::Error, eval::Evaluator, io::HostIo, limits::Limits, natives, repl_error::ReplError, value::Value};

/// An interactive session: one evaluator, reused across lines of input.
pub struct ReplSession {
    eval: Evaluator,
}

impl ReplSession {
    /// Builds a session with every native category registered into the
    /// root frame.
    pub fn new(io: HostIo, limits: Box<dyn Limits>) -> Result<Self, Error> {
        let mut eval = Evaluator::new(io, limits);
        let root = eval.root_frame();
        let types = eval.types;
        natives::register_all(&mut eval.frames, root, types)?;
        Ok(Self { eval })
    }

    /// Parses and evaluates one line/snippet against this session's
    /// persistent frame state, returning the value of its last expression.
    pub fn execute(&mut self, source: &str) -> Result<Value, ReplError> {
        let parsed = crate::parser::parse(source).map_err(ReplError::Parse)?;
        let block = parsed.root.as_block().expect("parser always produces a Block root");
        self.eval.eval_stream(block).map_err(ReplError::Runtime)
    }

    /// Direct access to the session's evaluator, for hosts (the CLI's
    /// `--max-depth`/`--max-steps` wiring, embedding code) that need to
    /// inspect frame state between lines.
    #[must_use]
    pub fn evaluator(&self) -> &Evaluator {
        &self.eval
    }

    #[must_use]
    pub fn evaluator_mut(&mut self) -> &mut Evaluator {
        &mut self.eval
    }
}
