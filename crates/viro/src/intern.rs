//! Symbol interning for words, set-words, get-words, and lit-words.
//!
//! Every `Word`-family value carries a `Symbol` rather than an
//! owned `String`. Interning keeps frame lookups and value equality down to a
//! single integer comparison instead of a string compare, which matters
//! because every variable reference in the evaluator's hot path goes through a symbol lookup.
//!
//! Symbol comparison is case-sensitive: `"Foo"` and `"foo"`
//! intern to distinct symbols.

use std::sync::{Mutex, OnceLock};

use ahash::AHashMap;

/// Interned identifier. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Symbol(u32);

impl Symbol {
    /// Looks up the textual form of this symbol.
    ///
    /// Panics if the symbol did not come from [`Interner::intern`], which
    /// cannot happen for symbols obtained through the public API.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        Interner::global().resolve(self)
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Process-wide string interner.
///
/// Strings are leaked intentionally: Viro is a long-running interpreter
/// process (or a one-shot CLI invocation) and the number of distinct
/// identifiers in any real program is small and bounded, so trading a bit of
/// address space for `'static` string slices (no lifetime threading through
/// every `Value`) is the right call.
struct Interner {
    strings: Mutex<InternerTables>,
}

struct InternerTables {
    by_name: AHashMap<&'static str, Symbol>,
    by_id: Vec<&'static str>,
}

impl Interner {
    fn global() -> &'static Interner {
        static INSTANCE: OnceLock<Interner> = OnceLock::new();
        INSTANCE.get_or_init(|| Interner {
            strings: Mutex::new(InternerTables {
                by_name: AHashMap::default(),
                by_id: Vec::new(),
            }),
        })
    }

    fn intern(&self, name: &str) -> Symbol {
        let mut tables = self.strings.lock().expect("interner mutex poisoned");
        if let Some(sym) = tables.by_name.get(name) {
            return *sym;
        }
        let leaked: &'static str = Box::leak(name.to_owned().into_boxed_str());
        let id = u32::try_from(tables.by_id.len()).expect("too many interned symbols");
        let sym = Symbol(id);
        tables.by_id.push(leaked);
        tables.by_name.insert(leaked, sym);
        sym
    }

    fn resolve(&self, sym: Symbol) -> &'static str {
        let tables = self.strings.lock().expect("interner mutex poisoned");
        tables.by_id[sym.0 as usize]
    }
}

/// Interns `name`, returning a stable [`Symbol`] for it.
///
/// Repeated calls with the same text return the same `Symbol`, so equality
/// between two words reduces to `Symbol == Symbol`.
#[must_use]
pub fn intern(name: &str) -> Symbol {
    Interner::global().intern(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_interns_to_same_symbol() {
        assert_eq!(intern("foo"), intern("foo"));
    }

    #[test]
    fn case_sensitive() {
        assert_ne!(intern("Foo"), intern("foo"));
    }

    #[test]
    fn round_trips_through_as_str() {
        let sym = intern("append");
        assert_eq!(sym.as_str(), "append");
    }
}
