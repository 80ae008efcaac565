//! The tree-walking evaluator.
//!
//! `Evaluator` owns every piece of process-wide state a running program
//! touches: the frame registry, the frame stack, the type-frame tables,
//! host I/O, and the resource [`Limits`]. [`Evaluator::eval_stream`] is
//! `Do_Blk`; [`Evaluator::step`] is `Do_Next`. Both are private — external
//! callers (natives, the CLI, the REPL) only ever see them through the
//! [`EvalHandle`] trait impl below, which is exactly the same recursion the
//! core evaluator itself uses.
//!
//! Call dispatch is one recursive `step`/`eval_stream` pair rather than a
//! multi-stage call-resolution chain, since a tree-walker has no bytecode
//! dispatch loop to fast-path around.

use std::rc::Rc;

use tracing::instrument;

use crate::{
    error::{ControlPayload, Error, ErrorId},
    frame::{FrameId, FrameKind, FrameRegistry, FrameStack},
    function::{FunctionKind, FunctionValue},
    intern::Symbol,
    io::HostIo,
    limits::Limits,
    native::{EvalHandle, RefMap},
    typeframe::TypeFrames,
    value::{BlockSeries, Value},
};

/// Everything a running Viro program needs.
pub struct Evaluator {
    pub frames: FrameRegistry,
    stack: FrameStack,
    pub types: TypeFrames,
    io: HostIo,
    limits: Box<dyn Limits>,
    depth: usize,
}

impl Evaluator {
    #[must_use]
    pub fn new(io: HostIo, limits: Box<dyn Limits>) -> Self {
        let mut frames = FrameRegistry::new();
        let types = TypeFrames::install(&mut frames);
        let stack = FrameStack::new(FrameId::ROOT);
        Self { frames, stack, types, io, limits, depth: 0 }
    }

    #[must_use]
    pub fn root_frame(&self) -> FrameId {
        FrameId::ROOT
    }

    #[must_use]
    pub fn current_frame(&self) -> FrameId {
        self.stack.current()
    }

    /// `Do_Blk`: iterates `block`'s elements on a private
    /// cursor, applying infix fixup between consecutive results.
    #[instrument(level = "trace", skip(self, block))]
    pub fn eval_stream(&mut self, block: &BlockSeries) -> Result<Value, Error> {
        let mut cursor = block.clone_handle();
        cursor.to_head();
        if cursor.is_tail() {
            return Ok(Value::None);
        }
        let mut last = Value::None;
        loop {
            self.limits.check_step()?;
            last = self
                .step(&mut cursor)
                .map_err(|e| e.with_near_if_absent(|| Some(near_text(&cursor))))?;
            loop {
                let Some(infix) = self.peek_infix(&cursor) else { break };
                cursor.next();
                last = self
                    .call_function(infix, &mut cursor, Some(last))
                    .map_err(|e| e.with_near_if_absent(|| Some(near_text(&cursor))))?;
            }
            if cursor.is_tail() {
                break;
            }
        }
        Ok(last)
    }

    /// If the element currently at the cursor is a `Word` bound to an
    /// infix [`FunctionValue`], returns it.
    fn peek_infix(&self, cursor: &BlockSeries) -> Option<Rc<FunctionValue>> {
        let candidate = cursor.first()?;
        let Value::Word(sym) = candidate else { return None };
        let bound = self.frames.get(self.stack.current(), sym)?;
        let Value::Function(f) = bound else { return None };
        if f.infix { Some(Rc::clone(f)) } else { None }
    }

    /// `Do_Next`: consumes one element from `cursor` and
    /// evaluates it.
    fn step(&mut self, cursor: &mut BlockSeries) -> Result<Value, Error> {
        if cursor.is_tail() {
            return Ok(Value::None);
        }
        let current = cursor.first().expect("checked not tail");
        cursor.next();
        match current {
            Value::Paren(body) => self.eval_stream(&body),
            Value::Word(sym) => {
                let bound = self.frames.resolve(self.stack.current(), sym)?.clone();
                match bound {
                    Value::Function(f) => self.call_function(f, cursor, None),
                    other => Ok(other),
                }
            }
            Value::GetWord(sym) => Ok(self.frames.resolve(self.stack.current(), sym)?.clone()),
            Value::LitWord(sym) => Ok(Value::Word(sym)),
            Value::SetWord(sym) => {
                let value = self.step_chained(cursor)?;
                self.frames.bind(self.stack.current(), sym, value.clone());
                Ok(value)
            }
            literal => Ok(literal),
        }
    }

    /// One `step`, followed by as many infix applications as the cursor
    /// offers. Both [`Self::step`]'s `SetWord` arm and [`Self::require_next`]
    /// go through this so `x: 1 + 2` and `if x > 5 [...]` see the same
    /// infix chaining top-level statements do.
    fn step_chained(&mut self, cursor: &mut BlockSeries) -> Result<Value, Error> {
        let mut last = self.step(cursor)?;
        while let Some(infix) = self.peek_infix(cursor) {
            cursor.next();
            last = self.call_function(infix, cursor, Some(last))?;
        }
        Ok(last)
    }

    /// Evaluates the next source element unevaluated — what a lit-param
    /// consumes.
    fn take_raw(&mut self, cursor: &mut BlockSeries, fn_name: &str, expected: usize, got: usize) -> Result<Value, Error> {
        if cursor.is_tail() {
            return Err(Error::arg_count(fn_name, expected, got));
        }
        let v = cursor.first().expect("checked not tail");
        cursor.next();
        Ok(v)
    }

    /// An eager argument slot evaluates one full infix-chained expression,
    /// not just one `Do_Next` term — `if x > 5 [...]`'s condition must see
    /// `x > 5` the same way top-level `Do_Blk` would.
    fn require_next(&mut self, cursor: &mut BlockSeries, fn_name: &str, expected: usize, got: usize) -> Result<Value, Error> {
        if cursor.is_tail() {
            return Err(Error::arg_count(fn_name, expected, got));
        }
        self.step_chained(cursor)
    }

    /// An infix operator's right-hand operand is exactly one `Do_Next`
    /// term, never a further infix-chained expression — `1 + 2 * 3` must
    /// bind `+`'s right operand to plain `2`, leaving `* 3` for
    /// `eval_stream`'s own infix loop to apply to the sum afterward.
    /// Collecting it with `step_chained` instead would have `+` itself
    /// swallow `2 * 3` and break strict left-to-right chaining.
    fn require_next_infix_operand(&mut self, cursor: &mut BlockSeries, fn_name: &str, expected: usize, got: usize) -> Result<Value, Error> {
        if cursor.is_tail() {
            return Err(Error::arg_count(fn_name, expected, got));
        }
        self.step(cursor)
    }

    /// Collects positional and refinement arguments for one call.
    ///
    /// Refinement tokens (`--name`) may appear anywhere in the call's
    /// trailing source, interspersed with positional expressions rather
    /// than only after every positional slot is filled — `copy --part 5 b`
    /// puts the refinement ahead of the subject it modifies, so each
    /// positional slot is preceded by a refinement scan rather than just
    /// the tail of the whole call.
    fn collect_args(
        &mut self,
        f: &FunctionValue,
        cursor: &mut BlockSeries,
        infix_arg0: Option<Value>,
    ) -> Result<(Vec<Value>, RefMap), Error> {
        let fn_name = f.name.as_deref().unwrap_or("anonymous");
        let positional: Vec<_> = f.positional_params().cloned().collect();
        let mut pos_args = vec![Value::None; positional.len()];
        let mut refs = RefMap::new();
        let mut start = 0;
        let is_infix_call = infix_arg0.is_some();
        if let Some(arg0) = infix_arg0 {
            if !positional.is_empty() {
                pos_args[0] = arg0;
                start = 1;
            }
        }
        for (i, spec) in positional.iter().enumerate().skip(start) {
            self.consume_refinements(f, cursor, fn_name, positional.len(), &mut refs)?;
            if spec.optional && cursor.is_tail() {
                continue;
            }
            pos_args[i] = if spec.evaluate {
                if is_infix_call {
                    self.require_next_infix_operand(cursor, fn_name, positional.len(), i)?
                } else {
                    self.require_next(cursor, fn_name, positional.len(), i)?
                }
            } else {
                self.take_raw(cursor, fn_name, positional.len(), i)?
            };
        }
        self.consume_refinements(f, cursor, fn_name, positional.len(), &mut refs)?;
        Ok((pos_args, refs))
    }

    /// Consumes every `--name` refinement token at the cursor, in any
    /// order, stopping at the first element that isn't one.
    fn consume_refinements(
        &mut self,
        f: &FunctionValue,
        cursor: &mut BlockSeries,
        fn_name: &str,
        positional_len: usize,
        refs: &mut RefMap,
    ) -> Result<(), Error> {
        loop {
            if cursor.is_tail() {
                break;
            }
            let Some(candidate) = cursor.first() else { break };
            let Value::Word(sym) = &candidate else { break };
            let text = sym.as_str();
            if !text.starts_with("--") {
                break;
            }
            let bare = &text[2..];
            cursor.next();
            let Some(spec) = f.find_refinement(bare) else {
                return Err(Error::invalid_operation(&format!("unrecognised refinement --{bare}")));
            };
            if spec.takes_value {
                let value = if spec.evaluate {
                    self.step(cursor)?
                } else {
                    self.take_raw(cursor, fn_name, positional_len, positional_len)?
                };
                refs.insert(bare.to_owned(), value);
            } else {
                refs.insert(bare.to_owned(), Value::Logic(true));
            }
        }
        Ok(())
    }

    /// Invokes `f`, recursing into this same evaluator for argument
    /// collection.
    fn call_function(&mut self, f: Rc<FunctionValue>, cursor: &mut BlockSeries, infix_arg0: Option<Value>) -> Result<Value, Error> {
        self.depth += 1;
        let outcome = self
            .limits
            .check_recursion(self.depth)
            .and_then(|()| self.call_function_inner(&f, cursor, infix_arg0));
        self.depth -= 1;
        outcome
    }

    fn call_function_inner(&mut self, f: &Rc<FunctionValue>, cursor: &mut BlockSeries, infix_arg0: Option<Value>) -> Result<Value, Error> {
        let (pos_args, refs) = self.collect_args(f, cursor, infix_arg0)?;
        match &f.body {
            FunctionKind::Native(native) => native(&pos_args, &refs, self),
            FunctionKind::User { body } => self.call_user(f, pos_args, refs, body.clone_handle()),
        }
    }

    fn call_user(&mut self, f: &Rc<FunctionValue>, pos_args: Vec<Value>, refs: RefMap, body: BlockSeries) -> Result<Value, Error> {
        let parent = f.captured_frame.unwrap_or(FrameId::ROOT);
        let frame_id = self.frames.register_frame(FrameKind::Function, Some(parent));
        self.limits.check_frame_count(self.frames.frame_count())?;
        for (spec, value) in f.positional_params().zip(pos_args) {
            self.frames.bind(frame_id, crate::intern::intern(&spec.name), value);
        }
        for spec in f.refinement_params() {
            let value = refs.get(&spec.name).cloned().unwrap_or(Value::None);
            self.frames.bind(frame_id, crate::intern::intern(&spec.name), value);
        }
        self.stack.push_frame(frame_id);
        let result = self.eval_stream(&body);
        self.stack.pop_frame();
        match result {
            Err(e) if e.id == ErrorId::Return => match e.payload {
                ControlPayload::Value(v) => Ok(*v),
                _ => Ok(Value::None),
            },
            other => other,
        }
    }
}

impl EvalHandle for Evaluator {
    fn do_next(&mut self, v: Value) -> Result<Value, Error> {
        self.eval_stream(&BlockSeries::from_vec(vec![v]))
    }

    fn do_blk(&mut self, block: &BlockSeries) -> Result<Value, Error> {
        self.eval_stream(block)
    }

    fn current_frame_index(&self) -> FrameId {
        self.stack.current()
    }

    fn push_frame(&mut self, frame: FrameId) {
        self.stack.push_frame(frame);
    }

    fn pop_frame(&mut self) {
        self.stack.pop_frame();
    }

    fn register_frame(&mut self, kind: FrameKind, parent: Option<FrameId>) -> FrameId {
        self.frames.register_frame(kind, parent)
    }

    fn mark_frame_captured(&mut self, id: FrameId) {
        self.frames.mark_frame_captured(id);
    }

    fn bind(&mut self, frame: FrameId, name: Symbol, value: Value) {
        self.frames.bind(frame, name, value);
    }

    fn resolve(&self, frame: FrameId, name: Symbol) -> Result<Value, Error> {
        self.frames.resolve(frame, name).cloned()
    }

    fn get(&self, frame: FrameId, name: Symbol) -> Option<Value> {
        self.frames.get(frame, name).cloned()
    }

    fn output_writer(&mut self) -> &mut dyn std::io::Write {
        &mut *self.io.output
    }

    fn error_writer(&mut self) -> &mut dyn std::io::Write {
        &mut *self.io.error
    }

    fn input_reader(&mut self) -> &mut dyn std::io::BufRead {
        &mut *self.io.input
    }
}

/// Molds a small window of the cursor's buffer around its current
/// position for a diagnostic "near" string.
fn near_text(cursor: &BlockSeries) -> String {
    let snapshot = cursor.snapshot();
    let idx = cursor.index();
    let start = idx.saturating_sub(2);
    let end = (idx + 2).min(snapshot.len());
    snapshot[start..end].iter().map(Value::mold).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::ParamSpec;

    fn test_eval() -> Evaluator {
        Evaluator::new(HostIo::null(), Box::new(crate::limits::NoLimits))
    }

    fn register_plus(eval: &mut Evaluator) {
        let native: crate::native::NativeFn = Rc::new(|args, _refs, _eval| {
            let a = args[0].as_integer().unwrap();
            let b = args[1].as_integer().unwrap();
            Ok(Value::Integer(a + b))
        });
        let function = FunctionValue::native("+", vec![ParamSpec::positional("a"), ParamSpec::positional("b")], native).infix();
        eval.frames.bind(eval.root_frame(), crate::intern::intern("+"), Value::Function(Rc::new(function)));
    }

    #[test]
    fn set_word_binds_and_returns_value() {
        let mut eval = test_eval();
        let block = crate::parser::parse("x: 5").unwrap().root;
        let result = eval.eval_stream(block.as_block().unwrap()).unwrap();
        assert_eq!(result, Value::Integer(5));
        let sym = crate::intern::intern("x");
        assert_eq!(eval.frames.get(eval.root_frame(), sym), Some(&Value::Integer(5)));
    }

    #[test]
    fn infix_plus_chains_left_to_right() {
        let mut eval = test_eval();
        register_plus(&mut eval);
        let block = crate::parser::parse("1 + 2 + 3").unwrap().root;
        let result = eval.eval_stream(block.as_block().unwrap()).unwrap();
        assert_eq!(result, Value::Integer(6));
    }

    #[test]
    fn frame_stack_depth_restored_after_error() {
        let mut eval = test_eval();
        let before = eval.current_frame();
        let block = crate::parser::parse("nonexistent-word").unwrap().root;
        let result = eval.eval_stream(block.as_block().unwrap());
        assert!(result.is_err());
        assert_eq!(eval.current_frame(), before);
    }
}
