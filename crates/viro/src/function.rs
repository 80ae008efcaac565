//! Function values: native and user-defined callables.
//!
//! Viro closures capture a single parent frame *index* rather than
//! per-variable cells, since the frame chain itself already provides the
//! lookup a cell/free-var scheme would otherwise need to repeat at call
//! time.

use smallvec::SmallVec;

use crate::{frame::FrameId, native::NativeFn, value::{BlockSeries, Value}};

/// Whether a function runs host Rust code or a user-authored body block.
#[derive(Clone)]
pub enum FunctionKind {
    /// A host-implemented operation.
    Native(NativeFn),
    /// A `fn [...] [...]`-defined function: a body block evaluated in a
    /// fresh frame on every call.
    User { body: BlockSeries },
}

impl std::fmt::Debug for FunctionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Native(_) => f.write_str("Native(..)"),
            Self::User { body } => f.debug_struct("User").field("body", body).finish(),
        }
    }
}

/// One parameter declaration in a function's spec list.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: String,
    /// A type-tag hint (e.g. restrict to `integer!`); `None` accepts anything.
    pub type_hint: Option<crate::value::Tag>,
    pub optional: bool,
    /// `--name` style modifier rather than a positional parameter.
    pub refinement: bool,
    /// Only meaningful when `refinement` is set: whether `--name` itself
    /// takes a trailing argument.
    pub takes_value: bool,
    /// Whether the argument collector evaluates the source element feeding
    /// this parameter, or copies it verbatim (a lit-param).
    pub evaluate: bool,
}

impl ParamSpec {
    #[must_use]
    pub fn positional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_hint: None,
            optional: false,
            refinement: false,
            takes_value: false,
            evaluate: true,
        }
    }

    #[must_use]
    pub fn lit_positional(name: impl Into<String>) -> Self {
        Self {
            evaluate: false,
            ..Self::positional(name)
        }
    }

    /// A lit-positional that may be omitted from the call entirely — `if`'s
    /// else-branch is the only current user. Omitting it leaves the
    /// argument slot `Value::None` rather than raising `arg-count`.
    #[must_use]
    pub fn optional_lit_positional(name: impl Into<String>) -> Self {
        Self {
            optional: true,
            ..Self::lit_positional(name)
        }
    }

    #[must_use]
    pub fn refinement(name: impl Into<String>, takes_value: bool) -> Self {
        Self {
            name: name.into(),
            type_hint: None,
            optional: true,
            refinement: true,
            takes_value,
            evaluate: true,
        }
    }
}

/// A callable value.
#[derive(Debug, Clone)]
pub struct FunctionValue {
    pub kind: FunctionKindTag,
    /// Absent for anonymous function literals; used in `mold` and in
    /// diagnostics.
    pub name: Option<String>,
    pub params: SmallVec<[ParamSpec; 4]>,
    /// The parent frame closed-over at definition time, or `None` for
    /// top-level natives that have no lexical parent of their own.
    pub captured_frame: Option<FrameId>,
    /// Infix functions take their first positional argument from the
    /// *preceding* evaluated result rather than the following source
    /// element.
    pub infix: bool,
    pub doc: Option<String>,
    pub body: FunctionKind,
}

/// Cheap tag mirroring `FunctionKind` without the closure/body payload, so
/// callers can match on "native vs. user" without borrowing `body`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKindTag {
    Native,
    User,
}

impl FunctionValue {
    #[must_use]
    pub fn native(
        name: impl Into<String>,
        params: impl Into<SmallVec<[ParamSpec; 4]>>,
        native: NativeFn,
    ) -> Self {
        Self {
            kind: FunctionKindTag::Native,
            name: Some(name.into()),
            params: params.into(),
            captured_frame: None,
            infix: false,
            doc: None,
            body: FunctionKind::Native(native),
        }
    }

    #[must_use]
    pub fn user(
        name: Option<String>,
        params: impl Into<SmallVec<[ParamSpec; 4]>>,
        body: BlockSeries,
        captured_frame: FrameId,
    ) -> Self {
        Self {
            kind: FunctionKindTag::User,
            name,
            params: params.into(),
            captured_frame: Some(captured_frame),
            infix: false,
            doc: None,
            body: FunctionKind::User { body },
        }
    }

    #[must_use]
    pub fn infix(mut self) -> Self {
        self.infix = true;
        self
    }

    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Number of non-refinement parameters whose `evaluate` flag is true —
    /// exactly the `N` the argument collector recurses into `Do_Next` for.
    #[must_use]
    pub fn eager_positional_count(&self) -> usize {
        self.params.iter().filter(|p| !p.refinement && p.evaluate).count()
    }

    #[must_use]
    pub fn positional_params(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params.iter().filter(|p| !p.refinement)
    }

    #[must_use]
    pub fn refinement_params(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params.iter().filter(|p| p.refinement)
    }

    #[must_use]
    pub fn find_refinement(&self, name: &str) -> Option<&ParamSpec> {
        self.refinement_params().find(|p| p.name == name)
    }

    /// `arity` used only for `arg-count` error messages; refinements do not
    /// count (they are optional by definition).
    #[must_use]
    pub fn positional_arity(&self) -> usize {
        self.positional_params().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eager_positional_count_excludes_lit_params_and_refinements() {
        let f = FunctionValue {
            kind: FunctionKindTag::User,
            name: Some("demo".into()),
            params: SmallVec::from_vec(vec![
                ParamSpec::positional("a"),
                ParamSpec::lit_positional("b"),
                ParamSpec::refinement("loud", false),
            ]),
            captured_frame: None,
            infix: false,
            doc: None,
            body: FunctionKind::User { body: BlockSeries::from_vec(vec![]) },
        };
        assert_eq!(f.eager_positional_count(), 1);
        assert_eq!(f.positional_arity(), 2);
    }
}
