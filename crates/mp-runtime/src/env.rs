//! The runtime variable environment and the open-connection table.
//!
//! Shaped like [`mp_par::symtable::SymTable`] and `mp-sem`'s own
//! `TypeEnv`: a chain of flat scopes linked by an outer-scope pointer.
//! `Rc<RefCell<_>>` is fine for the single-threaded walk a plain call
//! or block performs, but a `par` block hands each statement its own
//! *independent* copy with no sharing at all, and that copy has to
//! cross into a freshly spawned OS thread, where an `Rc` can't go.
//! [`VarTable::snapshot`]/[`VarTable::from_snapshot`] round-trip
//! through a plain, `Send` `Vec` of owned maps for exactly that
//! handoff.

use std::cell::RefCell;
use std::collections::HashMap;
use std::net::TcpStream;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use mp_util::Symbol;

use crate::value::Value;

struct Scope {
    bindings: HashMap<Symbol, Value>,
    parent: Option<VarTable>,
}

/// A chain of flat variable scopes linked to an enclosing scope.
#[derive(Clone)]
pub struct VarTable(Rc<RefCell<Scope>>);

impl VarTable {
    pub fn new_root() -> Self {
        VarTable(Rc::new(RefCell::new(Scope {
            bindings: HashMap::new(),
            parent: None,
        })))
    }

    pub fn child(&self) -> Self {
        VarTable(Rc::new(RefCell::new(Scope {
            bindings: HashMap::new(),
            parent: Some(self.clone()),
        })))
    }

    pub fn get(&self, name: Symbol) -> Option<Value> {
        let scope = self.0.borrow();
        if let Some(v) = scope.bindings.get(&name) {
            return Some(v.clone());
        }
        scope.parent.as_ref().and_then(|p| p.get(name))
    }

    /// A declaration, or a name not found in any enclosing scope,
    /// binds in the current scope; otherwise the *nearest* scope that
    /// already defines the name is mutated in place.
    pub fn assign(&self, name: Symbol, value: Value, decl: bool) {
        if !decl {
            if let Some(scope) = self.scope_defining(name) {
                scope.0.borrow_mut().bindings.insert(name, value);
                return;
            }
        }
        self.0.borrow_mut().bindings.insert(name, value);
    }

    fn scope_defining(&self, name: Symbol) -> Option<VarTable> {
        if self.0.borrow().bindings.contains_key(&name) {
            return Some(self.clone());
        }
        let parent = self.0.borrow().parent.clone();
        parent.and_then(|p| p.scope_defining(name))
    }

    /// Flattens the whole scope chain (outermost first) into owned,
    /// `Send` maps for handing to a spawned thread.
    pub fn snapshot(&self) -> Vec<HashMap<Symbol, Value>> {
        let mut levels = match &self.0.borrow().parent {
            Some(p) => p.snapshot(),
            None => Vec::new(),
        };
        levels.push(self.0.borrow().bindings.clone());
        levels
    }

    /// Rebuilds a scope chain from a snapshot, innermost scope last.
    pub fn from_snapshot(levels: Vec<HashMap<Symbol, Value>>) -> Self {
        let mut table = VarTable::new_root();
        let mut first = true;
        for bindings in levels {
            if first {
                table.0.borrow_mut().bindings = bindings;
                first = false;
            } else {
                let next = table.child();
                next.0.borrow_mut().bindings = bindings;
                table = next;
            }
        }
        table
    }
}

/// Open TCP connections, keyed by channel name. A `par` block gives
/// each spawned statement an OS-level duplicate of every socket
/// (`TcpStream::try_clone`), never the same handle: channels are
/// shared resources at the OS level, not at the in-process reference
/// level.
#[derive(Clone)]
pub struct ConnectionTable(Rc<RefCell<FxHashMap<Symbol, TcpStream>>>);

impl ConnectionTable {
    pub fn new() -> Self {
        ConnectionTable(Rc::new(RefCell::new(FxHashMap::default())))
    }

    pub fn insert(&self, name: Symbol, stream: TcpStream) {
        self.0.borrow_mut().insert(name, stream);
    }

    pub fn remove(&self, name: Symbol) -> Option<TcpStream> {
        self.0.borrow_mut().remove(&name)
    }

    pub fn with<T>(&self, name: Symbol, f: impl FnOnce(&mut TcpStream) -> T) -> Option<T> {
        self.0.borrow_mut().get_mut(&name).map(f)
    }

    pub fn contains(&self, name: Symbol) -> bool {
        self.0.borrow().contains_key(&name)
    }

    /// A plain, `Send` snapshot of every open socket, duplicated at
    /// the OS level, for handing to a spawned thread.
    pub fn snapshot(&self) -> std::io::Result<Vec<(Symbol, TcpStream)>> {
        self.0
            .borrow()
            .iter()
            .map(|(name, stream)| stream.try_clone().map(|s| (*name, s)))
            .collect()
    }

    pub fn from_snapshot(entries: Vec<(Symbol, TcpStream)>) -> Self {
        let table = ConnectionTable::new();
        for (name, stream) in entries {
            table.insert(name, stream);
        }
        table
    }
}

impl Default for ConnectionTable {
    fn default() -> Self {
        Self::new()
    }
}
