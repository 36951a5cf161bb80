//! AST node definitions for minipar.
//!
//! Every expression node carries its originating [`Token`] and a
//! mutable [`TypeTag`] slot the semantic analyzer fills in; every
//! statement node carries the [`Line`] it started on so later phases
//! can report runtime errors against real source lines.

use std::cell::Cell;

use mp_lex::Token;
use mp_util::{Line, Symbol};

/// A source-level type tag. Surface syntax spells these lowercase
/// (`number`, `string`, `bool`, `void`); `Func` is never written by the
/// user and exists only to type callable names in the symbol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Number,
    String,
    Bool,
    Void,
    Func,
}

impl TypeTag {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "number" => Some(TypeTag::Number),
            "string" => Some(TypeTag::String),
            "bool" => Some(TypeTag::Bool),
            "void" => Some(TypeTag::Void),
            _ => None,
        }
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TypeTag::Number => "number",
            TypeTag::String => "string",
            TypeTag::Bool => "bool",
            TypeTag::Void => "void",
            TypeTag::Func => "func",
        };
        f.write_str(s)
    }
}

/// An expression node: its variant payload, the token it was parsed
/// from, and a type slot the semantic analyzer populates.
#[derive(Debug, Clone)]
pub struct ExprNode {
    pub kind: ExprKind,
    pub token: Token,
    pub ty: Cell<Option<TypeTag>>,
}

pub type Expr = Box<ExprNode>;

impl ExprNode {
    pub fn new(kind: ExprKind, token: Token) -> Expr {
        Box::new(ExprNode {
            kind,
            token,
            ty: Cell::new(None),
        })
    }

    pub fn line(&self) -> Line {
        self.token.line
    }
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    /// A `NUMBER`, `STRING`, `TRUE`, or `FALSE` literal; which one is
    /// determined by `token.kind`.
    Constant,
    /// A variable reference. `decl` is set by the parser at the
    /// declaration site (`x: number`) and nowhere else.
    Id { decl: bool },
    /// String indexing, `name[index]`.
    Access { index: Expr },
    /// `&&` / `||`, distinguished by `token.kind`.
    Logical { left: Expr, right: Expr },
    /// `==`, `!=`, `<`, `>`, `<=`, `>=`.
    Relational { left: Expr, right: Expr },
    /// `+`, `-`, `*`, `/`, `%`.
    Arithmetic { left: Expr, right: Expr },
    /// `!` or unary `-`.
    Unary { expr: Expr },
    /// A call. `token` holds the callee (or method receiver) name.
    /// `id` is the interned callee name for a plain call; `oper` is
    /// the method name for `receiver.method(args)` syntax (only
    /// reachable for the `send`/`close` builtins).
    Call {
        id: Option<Symbol>,
        args: Vec<Expr>,
        oper: Option<Symbol>,
    },
}

/// A statement node: its variant payload and the line it started on.
#[derive(Debug, Clone)]
pub struct StmtNode {
    pub kind: StmtKind,
    pub line: Line,
}

pub type Stmt = Box<StmtNode>;

impl StmtNode {
    pub fn new(kind: StmtKind, line: Line) -> Stmt {
        Box::new(StmtNode { kind, line })
    }
}

/// A function parameter: name, declared type, and an optional default
/// value expression. Declaration order is preserved.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: Symbol,
    pub ty: TypeTag,
    pub default: Option<Expr>,
}

/// A function definition. `Clone` is derived throughout this module:
/// a `par` block gives every spawned thread its own independent,
/// owned copy of whatever statement it runs, so no thread ever shares
/// a function body with another. An owned `Clone` is the only way to
/// cross a `thread::spawn` boundary — neither `Rc` nor a borrowed
/// reference into a `Cell`-bearing node is ever `Send`.
#[derive(Debug, Clone)]
pub struct FuncDef {
    pub name: Symbol,
    pub return_type: TypeTag,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub line: Line,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    /// A bare expression statement — in practice always a `Call`
    /// (`print(x)`, a standalone function call with no assignment).
    Expr(Expr),
    /// `left = right`. `left` is always an `Id` expression.
    Assign { left: Expr, right: Expr },
    Return(Expr),
    Break,
    Continue,
    FuncDef(FuncDef),
    If {
        cond: Expr,
        body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
    },
    /// Structured-concurrency block: every statement in `body` runs on
    /// its own thread; all are joined before `Par` completes.
    Par { body: Vec<Stmt> },
    /// Sequential block; a true no-op at evaluation time. `body` is
    /// carried for syntactic symmetry with `Par` but is never executed
    /// or type-checked.
    Seq { body: Vec<Stmt> },
    /// TCP client channel: `c_channel name { host, port }`.
    CChannel {
        name: Symbol,
        host: Expr,
        port: Expr,
    },
    /// TCP server channel bound to a function:
    /// `s_channel name { func_name, description, host, port }`.
    SChannel {
        name: Symbol,
        func_name: Symbol,
        description: Expr,
        host: Expr,
        port: Expr,
    },
}

/// A parsed program: the top-level statement sequence.
pub type Ast = Vec<Stmt>;
