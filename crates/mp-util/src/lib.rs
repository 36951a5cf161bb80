//! mp-util — shared foundation types for the minipar pipeline.
//!
//! Every other crate in this workspace (`mp-lex`, `mp-par`, `mp-sem`,
//! `mp-runtime`) depends on this one for interned identifiers and the
//! shared source-line type. Nothing here is specific to any single
//! pipeline phase.
//!
//! # String interning
//!
//! Identifiers and keywords recur constantly across a source file. Rather
//! than pass owned `String`s through every AST node, we intern them once
//! into a process-wide table and pass around a 4-byte [`Symbol`] instead.
//! Symbols compare in O(1) and are `Copy`.
//!
//! Strings are never removed from the table (leak-on-purpose): the total
//! number of distinct identifiers in a minipar program is small, and this
//! keeps the table free of lifetime bookkeeping.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::OnceLock;

pub mod error;

pub use error::{SymbolError, SymbolResult};

/// An interned string identifier.
///
/// `Symbol` is a compact handle into the global [`StringTable`]. Two
/// symbols compare equal iff the strings they were interned from compare
/// equal.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

impl Symbol {
    /// Intern a string, returning its symbol. Interning the same string
    /// twice returns the same symbol.
    pub fn intern(s: &str) -> Self {
        table().intern(s)
    }

    /// Resolve this symbol back to its string contents.
    pub fn as_str(&self) -> &'static str {
        table()
            .get(*self)
            .expect("Symbol is only ever constructed by StringTable::intern")
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Global interned-string table, keyed by symbol index.
struct StringTable {
    by_index: RwLock<Vec<&'static str>>,
    by_str: RwLock<FxHashMap<&'static str, u32>>,
}

impl StringTable {
    fn new() -> Self {
        Self {
            by_index: RwLock::new(Vec::new()),
            by_str: RwLock::new(FxHashMap::default()),
        }
    }

    fn intern(&self, s: &str) -> Symbol {
        if let Some(&index) = self.by_str.read().get(s) {
            return Symbol(index);
        }

        let mut by_str = self.by_str.write();
        // Another thread may have interned the same string while we
        // waited for the write lock.
        if let Some(&index) = by_str.get(s) {
            return Symbol(index);
        }

        let leaked: &'static str = Box::leak(s.to_string().into_boxed_str());
        let mut by_index = self.by_index.write();
        let index = by_index.len() as u32;
        by_index.push(leaked);
        by_str.insert(leaked, index);
        Symbol(index)
    }

    fn get(&self, symbol: Symbol) -> SymbolResult<&'static str> {
        self.by_index
            .read()
            .get(symbol.0 as usize)
            .copied()
            .ok_or(SymbolError::NotFound { index: symbol.0 })
    }
}

fn table() -> &'static StringTable {
    static TABLE: OnceLock<StringTable> = OnceLock::new();
    TABLE.get_or_init(StringTable::new)
}

/// A 1-based source line number, the only positional information the
/// language's diagnostics carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Line(pub u32);

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_same_string_yields_same_symbol() {
        let a = Symbol::intern("par");
        let b = Symbol::intern("par");
        assert_eq!(a, b);
    }

    #[test]
    fn interning_distinct_strings_yields_distinct_symbols() {
        let a = Symbol::intern("c_channel");
        let b = Symbol::intern("s_channel");
        assert_ne!(a, b);
    }

    #[test]
    fn symbol_round_trips_through_as_str() {
        let sym = Symbol::intern("request_handler");
        assert_eq!(sym.as_str(), "request_handler");
    }

}
