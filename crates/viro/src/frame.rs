//! The frame (lexical binding environment) system.
//!
//! Frames are addressed by stable integer index through a process-wide
//! [`FrameRegistry`] rather than owned directly, because a captured frame
//! (a closure's parent) can outlive the call that created it. A
//! [`FunctionValue`](crate::function::FunctionValue) only ever holds a
//! `FrameId`, never a `Frame`, so no ownership cycle can form between
//! functions and the frames that capture them.
//!
//! A registry-by-index design rather than direct ownership, since the
//! binding maps here are dynamic symbol→Value maps resolved by runtime
//! parent-chain lookup rather than statically numbered slots.

use crate::{error::Error, intern::Symbol, value::Value};

/// Stable index into a [`FrameRegistry`]. Indices are never reused while any
/// live reference (a captured closure, an `Object`) might still name them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(u32);

impl FrameId {
    pub const ROOT: FrameId = FrameId(0);

    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a frame was created for; purely informational (diagnostics,
/// `mold`ing objects) — lookup behavior is identical across kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Root,
    Function,
    Object,
    Block,
    /// A per-type method table. Has no parent: action lookup in a type
    /// frame is a single local scan, never a chain walk — only
    /// `Do_Next`'s word resolution walks parents.
    Type,
}

/// A single lexical scope: a symbol→value map, a parent link, and a kind
/// tag.
#[derive(Debug)]
pub struct Frame {
    kind: FrameKind,
    parent: Option<FrameId>,
    bindings: Vec<(Symbol, Value)>,
    captured: bool,
}

impl Frame {
    fn new(kind: FrameKind, parent: Option<FrameId>) -> Self {
        Self {
            kind,
            parent,
            bindings: Vec::new(),
            captured: false,
        }
    }

    #[must_use]
    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    #[must_use]
    pub fn parent(&self) -> Option<FrameId> {
        self.parent
    }

    /// Binds `name` to `value` in *this* frame only. Case-sensitive, linear
    /// scan-then-insert — frames are small (function
    /// parameter counts, object field counts), so a `Vec` beats a hash map
    /// both in memory and in practice for typical sizes.
    fn bind(&mut self, name: Symbol, value: Value) {
        for (existing, slot) in &mut self.bindings {
            if *existing == name {
                *slot = value;
                return;
            }
        }
        self.bindings.push((name, value));
    }

    fn get_local(&self, name: Symbol) -> Option<&Value> {
        self.bindings.iter().find(|(sym, _)| *sym == name).map(|(_, v)| v)
    }

    fn get_local_mut(&mut self, name: Symbol) -> Option<&mut Value> {
        self.bindings.iter_mut().find(|(sym, _)| *sym == name).map(|(_, v)| v)
    }

    #[must_use]
    pub fn local_names(&self) -> Vec<Symbol> {
        self.bindings.iter().map(|(sym, _)| *sym).collect()
    }
}

/// Process-wide frame storage. Single-threaded by construction.
#[derive(Debug)]
pub struct FrameRegistry {
    frames: Vec<Frame>,
}

impl Default for FrameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameRegistry {
    #[must_use]
    pub fn new() -> Self {
        let mut frames = Vec::new();
        frames.push(Frame::new(FrameKind::Root, None));
        Self { frames }
    }

    /// Inserts `frame` and returns its stable index.
    pub fn register_frame(&mut self, kind: FrameKind, parent: Option<FrameId>) -> FrameId {
        let id = FrameId(u32::try_from(self.frames.len()).expect("frame registry overflow"));
        self.frames.push(Frame::new(kind, parent));
        id
    }

    /// Marks a frame as captured so it is never reclaimed while a function
    /// value still references it. Viro keeps every
    /// frame for the process lifetime (no GC), so this is bookkeeping used
    /// by diagnostics and by the final trimming of dead root-level
    /// temporaries rather than a precondition for correctness.
    pub fn mark_frame_captured(&mut self, id: FrameId) {
        self.frames[id.index()].captured = true;
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_captured(&self, id: FrameId) -> bool {
        self.frames[id.index()].captured
    }

    fn frame(&self, id: FrameId) -> &Frame {
        &self.frames[id.index()]
    }

    fn frame_mut(&mut self, id: FrameId) -> &mut Frame {
        &mut self.frames[id.index()]
    }

    #[must_use]
    pub fn kind_of(&self, id: FrameId) -> FrameKind {
        self.frame(id).kind()
    }

    #[must_use]
    pub fn parent_of(&self, id: FrameId) -> Option<FrameId> {
        self.frame(id).parent()
    }

    /// Binds `name` in frame `id` directly (does not walk the parent
    /// chain) — this is what `SetWord` evaluation uses.
    pub fn bind(&mut self, id: FrameId, name: Symbol, value: Value) {
        self.frame_mut(id).bind(name, value);
    }

    /// Walks the parent chain starting at `id`, returning the first
    /// binding found.
    #[must_use]
    pub fn get(&self, id: FrameId, name: Symbol) -> Option<&Value> {
        let mut current = Some(id);
        while let Some(frame_id) = current {
            let frame = self.frame(frame_id);
            if let Some(value) = frame.get_local(name) {
                return Some(value);
            }
            current = frame.parent();
        }
        None
    }

    /// Same chain walk as [`get`](Self::get), returning the id of the frame
    /// that owns the binding (used by actions that need to mutate a bound
    /// series value in place, e.g. `append foo ...` where `foo` is a word).
    #[must_use]
    pub fn get_owning_frame(&self, id: FrameId, name: Symbol) -> Option<FrameId> {
        let mut current = Some(id);
        while let Some(frame_id) = current {
            let frame = self.frame(frame_id);
            if frame.get_local(name).is_some() {
                return Some(frame_id);
            }
            current = frame.parent();
        }
        None
    }

    /// Mutable access to a binding found anywhere along the parent chain.
    pub fn get_mut(&mut self, id: FrameId, name: Symbol) -> Option<&mut Value> {
        let owner = self.get_owning_frame(id, name)?;
        Some(self.frame_mut(owner).get_local_mut(name).expect("binding vanished"))
    }

    /// Whether `name` is bound directly in frame `id`, ignoring its
    /// parents. Used by native registration to detect a duplicate name
    /// within one category/type frame without tripping on an unrelated
    /// binding further up the chain.
    #[must_use]
    pub fn has_local_binding(&self, id: FrameId, name: Symbol) -> bool {
        self.frame(id).get_local(name).is_some()
    }

    /// `get` but producing an `unbound-word` error on failure, the form
    /// the evaluator actually wants at call sites.
    pub fn resolve(&self, id: FrameId, name: Symbol) -> Result<&Value, Error> {
        self.get(id, name).ok_or_else(|| Error::unbound_word(name.as_str()))
    }
}

/// RAII guard implementing `push_frame_context`/`pop_frame_context`
///: the frame is active for the
/// guard's lifetime and is always retired — including on panics unwinding
/// through it, and on every early-return `?` path — when it drops.
pub struct FrameContext {
    previous: Option<FrameId>,
}

/// A stack of "current frame" markers, one push per nested call.
#[derive(Debug, Default)]
pub struct FrameStack {
    stack: Vec<FrameId>,
}

impl FrameStack {
    #[must_use]
    pub fn new(root: FrameId) -> Self {
        Self { stack: vec![root] }
    }

    #[must_use]
    pub fn current(&self) -> FrameId {
        *self.stack.last().expect("frame stack is never empty")
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Pushes `frame` as current; returns a guard that restores the
    /// previous current frame on drop.
    pub fn push(&mut self, frame: FrameId) -> FrameContext {
        let previous = self.stack.last().copied();
        self.stack.push(frame);
        FrameContext { previous }
    }

    fn pop(&mut self) {
        self.stack.pop();
    }

    /// Unguarded push, for callers (the native ABI's `EvalHandle` impl)
    /// that cannot hold an RAII [`FrameContext`] across an object-safe
    /// trait boundary and instead pair this with [`FrameStack::pop_frame`]
    /// by hand.
    pub fn push_frame(&mut self, id: FrameId) {
        self.stack.push(id);
    }

    pub fn pop_frame(&mut self) {
        self.stack.pop();
    }
}

/// Pops the frame pushed alongside this guard. Stored separately from
/// `FrameStack` so the guard can carry a `&mut FrameStack` at drop time
/// without borrow-checker contortions at call sites — callers use
/// [`FrameStack::push`] paired with [`FrameContext::pop`] explicitly inside
/// a scope, rather than relying on an implicit `Drop` impl tied to a
/// borrowed stack.
impl FrameContext {
    pub fn pop(self, stack: &mut FrameStack) {
        stack.pop();
        debug_assert_eq!(stack.stack.last().copied(), self.previous);
    }
}

/// Runs `body` with `frame` pushed as current, guaranteeing the pop
/// happens on every exit path, including `body` returning `Err`.
pub fn with_frame<T>(
    stack: &mut FrameStack,
    frame: FrameId,
    body: impl FnOnce(&mut FrameStack) -> Result<T, Error>,
) -> Result<T, Error> {
    let ctx = stack.push(frame);
    let result = body(stack);
    ctx.pop(stack);
    result
}
