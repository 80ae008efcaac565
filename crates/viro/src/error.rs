//! The error model.
//!
//! Errors are ordinary `Value`s: a failing
//! operation returns `Err(Error)` through the same `Result` channel every
//! native and evaluator routine uses, and the evaluator never silently
//! coerces an `Err` into a success. Break/continue/return are modelled as
//! the same `Error` type with `Category::Control` and an attached
//! [`ControlPayload`], so `loop`/`while`/`foreach`/user-function calls can
//! intercept them without a second result channel.
//!
//! A flat `category` + stable `id` pair, rather than a class hierarchy of
//! exception types, keeps matching on error kind a simple field
//! comparison for both host code and user scripts.

use std::fmt;

use smallvec::SmallVec;
use strum::{Display, EnumString};

use crate::value::Value;

/// Closed taxonomy of error categories.
///
/// `Control` is an implementation-internal extension used to carry
/// break/continue/return signals through the same channel; it is never
/// printed to the user because `loop`/`while`/`foreach`/user-function calls
/// always intercept it before it reaches the REPL or CLI driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, serde::Serialize, serde::Deserialize)]
#[strum(serialize_all = "kebab-case")]
pub enum Category {
    Script,
    Math,
    Access,
    Internal,
    User,
    Control,
}

/// Stable error id, narrowing the cause within a [`Category`].
///
/// The `Display` form (kebab-case) is the stable id string: what
/// `error.id.to_string()` gives tests and user code to match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, serde::Serialize, serde::Deserialize)]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorId {
    ArgCount,
    TypeMismatch,
    OutOfBounds,
    EmptySeries,
    ActionNoImpl,
    UnboundWord,
    SqrtNegative,
    LogDomain,
    ExpOverflow,
    DivisionByZero,
    PortClosed,
    InvalidOperation,
    AssertionFailed,
    /// A native was registered under a name already present in its category frame.
    DuplicateNative,
    /// A user-level `raise`/`make error!` construction.
    UserRaised,
    /// Control-flow: `break` unwinding to an enclosing loop.
    Break,
    /// Control-flow: `continue` unwinding to an enclosing loop.
    Continue,
    /// Control-flow: `return` unwinding to the enclosing function frame.
    Return,
}

/// Payload carried by `Category::Control` errors.
///
/// Ordinary errors carry none; `break`/`continue` carry the number of loop
/// levels to unwind (`--levels`); `return` carries the actual value to
/// hand back from the enclosing user-function call.
#[derive(Debug, Clone)]
pub enum ControlPayload {
    None,
    Levels(u32),
    Value(Box<Value>),
}

/// A first-class error value.
#[derive(Debug, Clone)]
pub struct Error {
    pub category: Category,
    pub id: ErrorId,
    /// Up to three argument strings used to format the message.
    pub args: SmallVec<[String; 3]>,
    /// Source window captured at the point of failure, molded text of surrounding values.
    pub near: Option<String>,
    pub payload: ControlPayload,
}

impl Error {
    fn new(category: Category, id: ErrorId, args: impl IntoIterator<Item = String>) -> Self {
        Self {
            category,
            id,
            args: args.into_iter().collect(),
            near: None,
            payload: ControlPayload::None,
        }
    }

    /// Attaches a near-expression window if one isn't already present.
    ///
    /// The evaluator calls this on the way back up the call stack so the
    /// innermost failing native's window wins.
    pub fn with_near_if_absent(mut self, near: impl FnOnce() -> Option<String>) -> Self {
        if self.near.is_none() {
            self.near = near();
        }
        self
    }

    #[must_use]
    pub fn script(id: ErrorId, args: impl IntoIterator<Item = String>) -> Self {
        Self::new(Category::Script, id, args)
    }

    #[must_use]
    pub fn math(id: ErrorId, args: impl IntoIterator<Item = String>) -> Self {
        Self::new(Category::Math, id, args)
    }

    #[must_use]
    pub fn access(id: ErrorId, args: impl IntoIterator<Item = String>) -> Self {
        Self::new(Category::Access, id, args)
    }

    #[must_use]
    pub fn internal(id: ErrorId, args: impl IntoIterator<Item = String>) -> Self {
        Self::new(Category::Internal, id, args)
    }

    #[must_use]
    pub fn user(args: impl IntoIterator<Item = String>) -> Self {
        Self::new(Category::User, ErrorId::UserRaised, args)
    }

    // --- Frequently used constructors -------------------------------------

    #[must_use]
    pub fn arg_count(fn_name: &str, expected: usize, got: usize) -> Self {
        Self::script(ErrorId::ArgCount, [fn_name.to_owned(), expected.to_string(), got.to_string()])
    }

    #[must_use]
    pub fn type_mismatch(op: &str, expected: &str, got: &str) -> Self {
        Self::script(ErrorId::TypeMismatch, [op.to_owned(), expected.to_owned(), got.to_owned()])
    }

    #[must_use]
    pub fn out_of_bounds(op: &str, detail: &str) -> Self {
        Self::script(ErrorId::OutOfBounds, [op.to_owned(), detail.to_owned()])
    }

    #[must_use]
    pub fn action_no_impl(action: &str, type_name: &str) -> Self {
        Self::script(ErrorId::ActionNoImpl, [action.to_owned(), type_name.to_owned()])
    }

    #[must_use]
    pub fn unbound_word(name: &str) -> Self {
        Self::script(ErrorId::UnboundWord, [name.to_owned()])
    }

    #[must_use]
    pub fn invalid_operation(detail: &str) -> Self {
        Self::script(ErrorId::InvalidOperation, [detail.to_owned()])
    }

    #[must_use]
    pub fn duplicate_native(name: &str) -> Self {
        Self::internal(ErrorId::DuplicateNative, [name.to_owned()])
    }

    #[must_use]
    pub fn division_by_zero(op: &str) -> Self {
        Self::math(ErrorId::DivisionByZero, [op.to_owned()])
    }

    #[must_use]
    pub fn sqrt_negative(op: &str) -> Self {
        Self::math(ErrorId::SqrtNegative, [op.to_owned()])
    }

    #[must_use]
    pub fn assertion_failed(detail: &str) -> Self {
        Self::script(ErrorId::AssertionFailed, [detail.to_owned()])
    }

    // --- Control flow -------------------------------------------------------

    #[must_use]
    pub fn break_signal(levels: u32) -> Self {
        Self {
            category: Category::Control,
            id: ErrorId::Break,
            args: SmallVec::new(),
            near: None,
            payload: ControlPayload::Levels(levels),
        }
    }

    #[must_use]
    pub fn continue_signal(levels: u32) -> Self {
        Self {
            category: Category::Control,
            id: ErrorId::Continue,
            args: SmallVec::new(),
            near: None,
            payload: ControlPayload::Levels(levels),
        }
    }

    #[must_use]
    pub fn return_signal(value: Value) -> Self {
        Self {
            category: Category::Control,
            id: ErrorId::Return,
            args: SmallVec::new(),
            near: None,
            payload: ControlPayload::Value(Box::new(value)),
        }
    }

    #[must_use]
    pub fn is_control(&self) -> bool {
        self.category == Category::Control
    }

    /// Decrements a break/continue level count, returning `None` once it has
    /// fully unwound to the frame that should swallow it.
    #[must_use]
    pub fn decrement_levels(mut self) -> Result<Self, Self> {
        match &mut self.payload {
            ControlPayload::Levels(n) if *n > 1 => {
                *n -= 1;
                Err(self)
            }
            ControlPayload::Levels(_) => Ok(self),
            _ => Err(self),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "** {} error: {}", self.category, self.id)?;
        if !self.args.is_empty() {
            write!(f, " ({})", self.args.join(", "))?;
        }
        if let Some(near) = &self.near {
            write!(f, "\n** Near: {near}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}
