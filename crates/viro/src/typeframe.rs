//! Type frames: per-type action tables.
//!
//! One [`Frame`](crate::frame::Frame) per [`Tag`], storing `action name ->
//! Function value`. The dispatcher native in `dispatch.rs` is the only
//! reader; `natives/*` modules are the only writers, each registering its
//! per-type implementations into the table for the tags it supports.
//!
//! Using a frame lookup rather than a fixed enum-match means adding a new
//! action to a type is "register a binding", not "extend a match arm".

use strum::EnumCount;

use crate::{
    error::Error,
    frame::{FrameId, FrameKind, FrameRegistry},
    intern::Symbol,
    value::Tag,
};

/// One [`FrameId`] per [`Tag`], indexed by `Tag::index()`.
///
/// `Copy` because it is just a fixed array of small indices — dispatcher
/// closures (`dispatch.rs`) capture it by value instead of threading a
/// reference through the native ABI, which only passes `&mut dyn
/// EvalHandle`.
#[derive(Clone, Copy)]
pub struct TypeFrames {
    tables: [FrameId; Tag::COUNT],
}

impl TypeFrames {
    /// Allocates one fresh, parentless `Type`-kind frame per tag.
    pub fn install(registry: &mut FrameRegistry) -> Self {
        let mut tables = [FrameId::ROOT; Tag::COUNT];
        for slot in &mut tables {
            *slot = registry.register_frame(FrameKind::Type, None);
        }
        Self { tables }
    }

    #[must_use]
    pub fn table_for(&self, tag: Tag) -> FrameId {
        self.tables[tag.index()]
    }

    /// Registers `action_name -> native` into `tag`'s table, raising
    /// `duplicate-native` if already present (the same idempotency rule
    /// native registration uses).
    pub fn register_action(
        &self,
        registry: &mut FrameRegistry,
        tag: Tag,
        action_name: &str,
        native: crate::native::NativeFn,
    ) -> Result<(), Error> {
        crate::native::register_native(registry, self.table_for(tag), action_name, vec![], native)
    }

    /// Looks up `action_name` within `tag`'s table only (no parent chain —
    /// type frames have none). Raises `action-no-impl` when absent.
    pub fn lookup(
        &self,
        registry: &FrameRegistry,
        tag: Tag,
        action_name: &str,
    ) -> Result<crate::value::Value, Error> {
        let sym = crate::intern::intern(action_name);
        registry
            .get(self.table_for(tag), sym)
            .cloned()
            .ok_or_else(|| Error::action_no_impl(action_name, &tag.to_string()))
    }

    #[must_use]
    pub fn has_action(&self, registry: &FrameRegistry, tag: Tag, sym: Symbol) -> bool {
        registry.has_local_binding(self.table_for(tag), sym)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use std::rc::Rc;

    #[test]
    fn missing_action_reports_type_and_name() {
        let mut registry = FrameRegistry::new();
        let frames = TypeFrames::install(&mut registry);
        let err = frames.lookup(&registry, Tag::Integer, "append").unwrap_err();
        assert_eq!(err.id, crate::error::ErrorId::ActionNoImpl);
        assert_eq!(err.args[0], "append");
        assert_eq!(err.args[1], "integer");
    }

    #[test]
    fn registered_action_round_trips() {
        let mut registry = FrameRegistry::new();
        let frames = TypeFrames::install(&mut registry);
        let native: crate::native::NativeFn = Rc::new(|_, _, _| Ok(Value::Integer(1)));
        frames.register_action(&mut registry, Tag::Block, "length?", native).unwrap();
        let looked_up = frames.lookup(&registry, Tag::Block, "length?").unwrap();
        assert!(looked_up.is_callable());
    }
}
