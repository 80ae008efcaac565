//! One-shot program execution.
//!
//! `Runner` parses and evaluates an entire source string in a single call,
//! the shape a non-interactive CLI invocation (`viro script.viro`) wants:
//! build an [`Evaluator`], register every native category, run the whole
//! program, hand back the last expression's value or the error that
//! stopped it.
//!
//! Viro's evaluator never suspends mid-program — there is no external
//! yield point to resume from — so `Runner::run` returns
//! `Result<Value, ReplError>` directly instead of a progress enum with a
//! `Finished`/`Suspended` split.

use crate::{error::Error, eval::Evaluator, io::HostIo, limits::Limits, natives, repl_error::ReplError, value::Value};

/// Runs one Viro program from source to completion.
pub struct Runner {
    eval: Evaluator,
}

impl Runner {
    pub fn new(io: HostIo, limits: Box<dyn Limits>) -> Result<Self, Error> {
        let mut eval = Evaluator::new(io, limits);
        let root = eval.root_frame();
        let types = eval.types;
        natives::register_all(&mut eval.frames, root, types)?;
        Ok(Self { eval })
    }

    /// Parses `source` as a whole program and evaluates it top to bottom,
    /// returning the final expression's value.
    pub fn run(&mut self, source: &str) -> Result<Value, ReplError> {
        let parsed = crate::parser::parse(source).map_err(ReplError::Parse)?;
        let block = parsed.root.as_block().expect("parser always produces a Block root");
        self.eval.eval_stream(block).map_err(ReplError::Runtime)
    }

    #[must_use]
    pub fn evaluator(&self) -> &Evaluator {
        &self.eval
    }
}

/// Convenience one-shot entry point: builds a fresh `Runner` with no
/// resource limits and stdio wired up, runs `source`, and tears the
/// evaluator down. What the CLI's non-interactive mode calls directly.
pub fn run_source(source: &str) -> Result<Value, ReplError> {
    let mut runner = Runner::new(HostIo::stdio(), Box::new(crate::limits::NoLimits)).map_err(ReplError::Runtime)?;
    runner.run(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::NoLimits;

    fn runner() -> Runner {
        Runner::new(HostIo::null(), Box::new(NoLimits)).unwrap()
    }

    #[test]
    fn runs_a_whole_program_and_returns_its_last_value() {
        let mut runner = runner();
        let result = runner.run("fib: fn [n] [either n < 2 [n] [(fib n - 1) + (fib n - 2)]] fib 10").unwrap();
        assert_eq!(result, Value::Integer(55));
    }

    #[test]
    fn propagates_the_first_unhandled_error() {
        let mut runner = runner();
        let err = runner.run("1 / 0").unwrap_err();
        assert_eq!(err.inner().id, crate::error::ErrorId::DivisionByZero);
    }
}
