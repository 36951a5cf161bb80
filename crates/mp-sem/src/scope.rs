//! Runtime-shaped type environment used during semantic analysis.
//!
//! The parser's own `SymTable` only lives for the duration of parsing
//! and is discarded once the AST is built, so this analyzer walks the
//! tree again with its own nested scopes to recover each variable's
//! declared type. Same shape as the parser's table (an outer-scope
//! back-pointer), kept separate because this one only ever tracks a
//! variable's [`TypeTag`], never functions or channels.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use mp_par::ast::TypeTag;
use mp_util::Symbol;

struct Scope {
    bindings: HashMap<Symbol, TypeTag>,
    parent: Option<TypeEnv>,
}

#[derive(Clone)]
pub struct TypeEnv(Rc<RefCell<Scope>>);

impl TypeEnv {
    pub fn new_root() -> Self {
        TypeEnv(Rc::new(RefCell::new(Scope {
            bindings: HashMap::new(),
            parent: None,
        })))
    }

    pub fn child(&self) -> Self {
        TypeEnv(Rc::new(RefCell::new(Scope {
            bindings: HashMap::new(),
            parent: Some(self.clone()),
        })))
    }

    /// Declares `name` with `ty` in this exact scope. Never fails: the
    /// parser has already rejected same-scope redeclaration by the
    /// time this runs.
    pub fn declare(&self, name: Symbol, ty: TypeTag) {
        self.0.borrow_mut().bindings.insert(name, ty);
    }

    pub fn find(&self, name: Symbol) -> Option<TypeTag> {
        let scope = self.0.borrow();
        if let Some(ty) = scope.bindings.get(&name) {
            return Some(*ty);
        }
        scope.parent.as_ref().and_then(|p| p.find(name))
    }
}
