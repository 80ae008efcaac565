//! The value universe.
//!
//! `Value` is the tagged union every other component operates on: the
//! evaluator walks it, series hold it (`Block`), frames bind names to it,
//! and natives both consume and produce it. None of the operations defined
//! here ever allocate frames or call the evaluator — that
//! separation is what lets `value.rs` be tested in isolation.
//!
//! Immediate variants (`None`, `Logic`, `Integer`, `Decimal`) are stored
//! inline; everything with shared mutable state sits behind an `Rc`
//! handle. See `DESIGN.md` for why `Rc<RefCell<_>>` is used directly
//! rather than a manually refcounted heap arena.

use std::{cell::RefCell, fmt::Write as _, rc::Rc};

use bigdecimal::BigDecimal;
use strum::{Display, EnumCount, EnumIter};

use crate::{
    error::Error,
    frame::FrameId,
    function::FunctionValue,
    intern::Symbol,
    port::Port,
    series::SeriesCore,
};

/// Series of arbitrary `Value`s; also doubles as unevaluated code.
pub type BlockSeries = SeriesCore<Value>;
/// Series of Unicode scalars.
pub type StringSeries = SeriesCore<char>;
/// Series of bytes.
pub type BinarySeries = SeriesCore<u8>;

/// A frame-backed record.
#[derive(Debug)]
pub struct ObjectInstance {
    pub frame: FrameId,
}

/// The type tag every `Value` carries.
///
/// Doubles as the index into the per-type method table array:
/// `EnumCount`/`EnumIter` let `typeframe.rs` build one table per tag
/// without hand-maintaining a parallel list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumCount, EnumIter, serde::Serialize, serde::Deserialize)]
#[strum(serialize_all = "lowercase")]
pub enum Tag {
    None,
    Logic,
    Integer,
    Decimal,
    String,
    Binary,
    Block,
    /// A parenthesised group (`(...)`): same series shape as `Block`, but
    /// the evaluator enters it automatically wherever it appears in a
    /// source stream, rather than only under `do`/`foreach`/etc. Kept as
    /// its own tag rather than conflated with `Block`, so that single
    /// behavioral distinction has somewhere to attach (Rebol/Red's
    /// `paren!` plays the identical role).
    Paren,
    Word,
    GetWord,
    LitWord,
    SetWord,
    Function,
    Object,
    Port,
    Error,
}

impl Tag {
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// The tagged value union.
#[derive(Debug, Clone)]
pub enum Value {
    None,
    Logic(bool),
    Integer(i64),
    Decimal(BigDecimal),
    String(StringSeries),
    Binary(BinarySeries),
    Block(BlockSeries),
    Paren(BlockSeries),
    Word(Symbol),
    GetWord(Symbol),
    LitWord(Symbol),
    SetWord(Symbol),
    Function(Rc<FunctionValue>),
    Object(Rc<RefCell<ObjectInstance>>),
    Port(Rc<RefCell<Port>>),
    Error(Rc<Error>),
}

impl Value {
    #[must_use]
    pub fn string(text: &str) -> Self {
        Self::String(StringSeries::from_vec(text.chars().collect()))
    }

    #[must_use]
    pub fn binary(bytes: Vec<u8>) -> Self {
        Self::Binary(BinarySeries::from_vec(bytes))
    }

    #[must_use]
    pub fn block(items: Vec<Value>) -> Self {
        Self::Block(BlockSeries::from_vec(items))
    }

    #[must_use]
    pub fn paren(items: Vec<Value>) -> Self {
        Self::Paren(BlockSeries::from_vec(items))
    }

    #[must_use]
    pub fn error(err: Error) -> Self {
        Self::Error(Rc::new(err))
    }

    #[must_use]
    pub fn tag(&self) -> Tag {
        match self {
            Self::None => Tag::None,
            Self::Logic(_) => Tag::Logic,
            Self::Integer(_) => Tag::Integer,
            Self::Decimal(_) => Tag::Decimal,
            Self::String(_) => Tag::String,
            Self::Binary(_) => Tag::Binary,
            Self::Block(_) => Tag::Block,
            Self::Paren(_) => Tag::Paren,
            Self::Word(_) => Tag::Word,
            Self::GetWord(_) => Tag::GetWord,
            Self::LitWord(_) => Tag::LitWord,
            Self::SetWord(_) => Tag::SetWord,
            Self::Function(_) => Tag::Function,
            Self::Object(_) => Tag::Object,
            Self::Port(_) => Tag::Port,
            Self::Error(_) => Tag::Error,
        }
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    #[must_use]
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::None | Self::Logic(false))
    }

    #[must_use]
    pub fn is_series(&self) -> bool {
        matches!(self, Self::String(_) | Self::Binary(_) | Self::Block(_) | Self::Paren(_))
    }

    #[must_use]
    pub fn is_word_family(&self) -> bool {
        matches!(self, Self::Word(_) | Self::GetWord(_) | Self::LitWord(_) | Self::SetWord(_))
    }

    #[must_use]
    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Function(_))
    }

    // --- Narrowing accessors -------------------------------------------
    // Each returns `Option<T>`, the idiomatic-Rust form of a
    // "success flag + value" type predicate.

    #[must_use]
    pub fn as_logic(&self) -> Option<bool> {
        match self {
            Self::Logic(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_decimal(&self) -> Option<&BigDecimal> {
        match self {
            Self::Decimal(d) => Some(d),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_string(&self) -> Option<&StringSeries> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_string_mut(&mut self) -> Option<&mut StringSeries> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_binary(&self) -> Option<&BinarySeries> {
        match self {
            Self::Binary(b) => Some(b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_binary_mut(&mut self) -> Option<&mut BinarySeries> {
        match self {
            Self::Binary(b) => Some(b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_block(&self) -> Option<&BlockSeries> {
        match self {
            Self::Block(b) | Self::Paren(b) => Some(b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_block_mut(&mut self) -> Option<&mut BlockSeries> {
        match self {
            Self::Block(b) | Self::Paren(b) => Some(b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_symbol(&self) -> Option<Symbol> {
        match self {
            Self::Word(s) | Self::GetWord(s) | Self::LitWord(s) | Self::SetWord(s) => Some(*s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_function(&self) -> Option<&Rc<FunctionValue>> {
        match self {
            Self::Function(f) => Some(f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_error(&self) -> Option<&Rc<Error>> {
        match self {
            Self::Error(e) => Some(e),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&Rc<RefCell<ObjectInstance>>> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Structural/identity equality.
    ///
    /// Series compare by content *and* cursor position; functions/objects/ports compare by identity, since two
    /// independently-created callables or records are never
    /// interchangeable even if they happen to look alike.
    #[must_use]
    pub fn equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Logic(a), Self::Logic(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Integer(a), Self::Decimal(b)) | (Self::Decimal(b), Self::Integer(a)) => {
                BigDecimal::from(*a) == *b
            }
            (Self::Decimal(a), Self::Decimal(b)) => a == b,
            (Self::String(a), Self::String(b)) => a.content_eq(b),
            (Self::Binary(a), Self::Binary(b)) => a.content_eq(b),
            (Self::Block(a), Self::Block(b)) | (Self::Paren(a), Self::Paren(b)) => a.content_eq(b),
            (Self::Word(a), Self::Word(b))
            | (Self::GetWord(a), Self::GetWord(b))
            | (Self::LitWord(a), Self::LitWord(b))
            | (Self::SetWord(a), Self::SetWord(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Object(a), Self::Object(b)) => Rc::ptr_eq(a, b),
            (Self::Port(a), Self::Port(b)) => Rc::ptr_eq(a, b),
            (Self::Error(a), Self::Error(b)) => {
                a.category == b.category && a.id == b.id && a.args == b.args
            }
            _ => false,
        }
    }

    /// Loadable textual form.
    #[must_use]
    pub fn mold(&self) -> String {
        let mut out = String::new();
        self.mold_into(&mut out);
        out
    }

    /// Human-readable form: strings unquoted, block elements space-joined
    /// without brackets.
    #[must_use]
    pub fn form(&self) -> String {
        let mut out = String::new();
        self.form_into(&mut out);
        out
    }

    fn mold_into(&self, out: &mut String) {
        match self {
            Self::None => out.push_str("none"),
            Self::Logic(b) => out.push_str(if *b { "true" } else { "false" }),
            Self::Integer(i) => {
                let _ = write!(out, "{i}");
            }
            Self::Decimal(d) => mold_decimal(d, out),
            Self::String(s) => mold_string(s, out),
            Self::Binary(b) => mold_binary(b, out),
            Self::Block(b) => {
                out.push('[');
                for (i, el) in b.snapshot().into_iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    el.mold_into(out);
                }
                out.push(']');
            }
            Self::Paren(b) => {
                out.push('(');
                for (i, el) in b.snapshot().into_iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    el.mold_into(out);
                }
                out.push(')');
            }
            Self::Word(s) => out.push_str(s.as_str()),
            Self::GetWord(s) => {
                out.push(':');
                out.push_str(s.as_str());
            }
            Self::LitWord(s) => {
                out.push('\'');
                out.push_str(s.as_str());
            }
            Self::SetWord(s) => {
                out.push_str(s.as_str());
                out.push(':');
            }
            Self::Function(f) => {
                let _ = write!(out, "#[function! {}]", f.name.as_deref().unwrap_or("anonymous"));
            }
            Self::Object(_) => out.push_str("#[object!]"),
            Self::Port(_) => out.push_str("#[port!]"),
            Self::Error(e) => {
                let _ = write!(out, "#[error! {} {}]", e.category, e.id);
            }
        }
    }

    fn form_into(&self, out: &mut String) {
        match self {
            Self::String(s) => {
                for ch in s.snapshot() {
                    out.push(ch);
                }
            }
            Self::Block(b) | Self::Paren(b) => {
                for (i, el) in b.snapshot().into_iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    el.form_into(out);
                }
            }
            _ => self.mold_into(out),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.form())
    }
}

fn mold_decimal(d: &BigDecimal, out: &mut String) {
    let text = d.to_string();
    if text.contains('.') {
        out.push_str(&text);
    } else {
        let _ = write!(out, "{text}.0");
    }
}

fn mold_string(s: &StringSeries, out: &mut String) {
    out.push('"');
    for ch in s.snapshot() {
        match ch {
            '"' => out.push_str("^\""),
            '\\' => out.push_str("^^"),
            '\n' => out.push_str("^/"),
            other => out.push(other),
        }
    }
    out.push('"');
}

fn mold_binary(b: &BinarySeries, out: &mut String) {
    out.push_str("#{");
    for byte in b.snapshot() {
        let _ = write!(out, "{byte:02X}");
    }
    out.push('}');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mold_round_trips_literals_textually() {
        assert_eq!(Value::None.mold(), "none");
        assert_eq!(Value::Logic(true).mold(), "true");
        assert_eq!(Value::Integer(42).mold(), "42");
        assert_eq!(Value::string("abc").mold(), "\"abc\"");
        assert_eq!(Value::binary(vec![0xDE, 0xAD]).mold(), "#{DEAD}");
        let block = Value::block(vec![Value::Integer(1), Value::Integer(2)]);
        assert_eq!(block.mold(), "[1 2]");
    }

    #[test]
    fn form_unquotes_strings_and_flattens_blocks() {
        assert_eq!(Value::string("abc").form(), "abc");
        let block = Value::block(vec![Value::string("a"), Value::Integer(1)]);
        assert_eq!(block.form(), "a 1");
    }

    #[test]
    fn series_equality_considers_cursor_position() {
        let mut a = BlockSeries::from_vec(vec![Value::Integer(1), Value::Integer(2)]);
        let b = BlockSeries::from_vec(vec![Value::Integer(1), Value::Integer(2)]);
        assert!(Value::Block(a.clone()).equals(&Value::Block(b.clone())));
        a.next();
        assert!(!Value::Block(a).equals(&Value::Block(b)));
    }
}
