//! Compile-time symbol table: nested lexical scopes used by the parser
//! to reject redeclarations and undeclared-name uses before the
//! semantic analyzer ever runs.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use mp_util::Symbol;

use crate::ast::TypeTag;

/// What a declared name denotes. Plain variables carry their
/// [`TypeTag`]; functions and channels are tracked as their own kind
/// since they're never assigned to or used in expressions the way a
/// variable is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Var(TypeTag),
    Func,
    CChannel,
    SChannel,
}

/// A declared name's compile-time type.
#[derive(Debug, Clone, Copy)]
pub struct SymbolEntry {
    pub kind: SymbolKind,
}

struct Scope {
    bindings: HashMap<Symbol, SymbolEntry>,
    parent: Option<SymTable>,
}

/// A lexical scope, nested via an outer-scope pointer. Cheap to clone
/// (shares the underlying scope via `Rc`); cloning does not copy
/// bindings.
#[derive(Clone)]
pub struct SymTable(Rc<RefCell<Scope>>);

impl SymTable {
    /// A fresh root scope with no parent, pre-seeded with the
    /// language's builtin function names.
    pub fn new_root() -> Self {
        let table = SymTable(Rc::new(RefCell::new(Scope {
            bindings: HashMap::new(),
            parent: None,
        })));
        for name in BUILTIN_FUNCTIONS {
            table
                .insert(
                    Symbol::intern(name),
                    SymbolEntry {
                        kind: SymbolKind::Func,
                    },
                )
                .expect("builtin names are distinct and the root scope starts empty");
        }
        table
    }

    /// A new scope nested under `self`.
    pub fn child(&self) -> Self {
        SymTable(Rc::new(RefCell::new(Scope {
            bindings: HashMap::new(),
            parent: Some(self.clone()),
        })))
    }

    /// Insert a new binding in this exact scope. Fails if `name` is
    /// already bound here (shadowing an outer scope is fine; a
    /// same-scope redeclaration is not).
    pub fn insert(&self, name: Symbol, entry: SymbolEntry) -> Result<(), ()> {
        let mut scope = self.0.borrow_mut();
        if scope.bindings.contains_key(&name) {
            return Err(());
        }
        scope.bindings.insert(name, entry);
        Ok(())
    }

    /// Look up `name`, walking outward through parent scopes.
    pub fn find(&self, name: Symbol) -> Option<SymbolEntry> {
        let scope = self.0.borrow();
        if let Some(entry) = scope.bindings.get(&name) {
            return Some(*entry);
        }
        scope.parent.as_ref().and_then(|p| p.find(name))
    }

    /// True iff `name` is bound in this exact scope (not an outer one).
    pub fn defined_locally(&self, name: Symbol) -> bool {
        self.0.borrow().bindings.contains_key(&name)
    }
}

/// Builtin function names pre-inserted at module scope with type
/// `FUNC`.
pub const BUILTIN_FUNCTIONS: &[&str] = &[
    "print",
    "input",
    "sleep",
    "to_number",
    "to_string",
    "to_bool",
    "send",
    "close",
    "len",
    "isalpha",
    "isnum",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_preseeded() {
        let root = SymTable::new_root();
        let print = root.find(Symbol::intern("print")).unwrap();
        assert_eq!(print.kind, SymbolKind::Func);
    }

    #[test]
    fn child_scope_sees_parent_bindings() {
        let root = SymTable::new_root();
        root.insert(
            Symbol::intern("x"),
            SymbolEntry {
                kind: SymbolKind::Var(TypeTag::Number),
            },
        )
        .unwrap();
        let child = root.child();
        assert!(child.find(Symbol::intern("x")).is_some());
    }

    #[test]
    fn same_scope_redeclaration_fails() {
        let root = SymTable::new_root();
        let x = Symbol::intern("x");
        root.insert(
            x,
            SymbolEntry {
                kind: SymbolKind::Var(TypeTag::Number),
            },
        )
        .unwrap();
        assert!(root
            .insert(
                x,
                SymbolEntry {
                    kind: SymbolKind::Var(TypeTag::String),
                }
            )
            .is_err());
    }

    #[test]
    fn shadowing_in_child_scope_succeeds() {
        let root = SymTable::new_root();
        let x = Symbol::intern("x");
        root.insert(
            x,
            SymbolEntry {
                kind: SymbolKind::Var(TypeTag::Number),
            },
        )
        .unwrap();
        let child = root.child();
        assert!(child
            .insert(
                x,
                SymbolEntry {
                    kind: SymbolKind::Var(TypeTag::String),
                }
            )
            .is_ok());
    }
}
