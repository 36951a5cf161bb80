//! mp-sem — semantic analyzer for minipar.
//!
//! A visitor over the parser's AST that maintains a `context_stack` of
//! enclosing nodes, used to validate scoping rules (`return` inside a
//! function, `break`/`continue` inside a loop, no nested `func` inside
//! `if`/`while`/`par`) while computing and checking a [`TypeTag`] for
//! every expression. Analysis stops at the first violation: it is
//! total on any parser-accepted AST — it produces no error or exactly
//! one.
//!
//! Dispatch is by exhaustive match over `StmtKind`/`ExprKind` rather
//! than reflective method lookup.

pub mod error;
mod scope;

use std::rc::Rc;

use mp_lex::TokenKind;
use mp_par::ast::{Ast, Expr, ExprKind, FuncDef, Stmt, StmtKind, TypeTag};
use mp_util::Symbol;
use rustc_hash::FxHashMap;

pub use error::{SemResult, SemanticError};
use scope::TypeEnv;

/// Builtin names and the type tag a call to them produces.
fn builtin_return_type(name: Symbol) -> Option<TypeTag> {
    match name.as_str() {
        "print" | "sleep" | "close" => Some(TypeTag::Void),
        "input" | "to_string" | "send" => Some(TypeTag::String),
        "to_number" | "len" => Some(TypeTag::Number),
        "to_bool" | "isalpha" | "isnum" => Some(TypeTag::Bool),
        _ => None,
    }
}

/// The enclosing node kinds the analyzer needs to know about to
/// validate contextual rules. Only nodes actually consulted by a rule
/// are pushed; e.g. `Seq` never restricts anything and is not tracked.
#[derive(Clone, Copy)]
enum Context {
    FuncDef(TypeTag),
    If,
    While,
    Par,
}

/// Functions discovered so far, keyed by name. Registered in the
/// function table on first visit, so forward references across
/// top-level statements are rejected exactly as the parser already
/// rejects them at the symbol-table level.
pub type FunctionTable = FxHashMap<Symbol, Rc<FuncDef>>;

/// Runs semantic analysis over a complete program, returning the
/// function table the evaluator will use to resolve calls.
pub fn analyze(program: &Ast) -> SemResult<FunctionTable> {
    let mut analyzer = Analyzer::new();
    analyzer.visit_block(program)?;
    Ok(analyzer.functions)
}

struct Analyzer {
    context_stack: Vec<Context>,
    functions: FunctionTable,
    types: TypeEnv,
}

impl Analyzer {
    fn new() -> Self {
        Analyzer {
            context_stack: Vec::new(),
            functions: FxHashMap::default(),
            types: TypeEnv::new_root(),
        }
    }

    fn visit_block(&mut self, block: &[Stmt]) -> SemResult<()> {
        for stmt in block {
            self.visit_stmt(stmt)?;
        }
        Ok(())
    }

    fn visit_stmt(&mut self, stmt: &Stmt) -> SemResult<()> {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.visit_expr(expr)?;
                Ok(())
            }
            StmtKind::Assign { left, right } => self.visit_assign(left, right),
            StmtKind::Return(expr) => self.visit_return(expr),
            StmtKind::Break => self.visit_break_continue("break"),
            StmtKind::Continue => self.visit_break_continue("continue"),
            StmtKind::FuncDef(def) => self.visit_funcdef(def),
            StmtKind::If {
                cond,
                body,
                else_body,
            } => self.visit_if(cond, body, else_body.as_deref()),
            StmtKind::While { cond, body } => self.visit_while(cond, body),
            StmtKind::Par { body } => self.visit_par(body),
            // A true no-op, mirroring the evaluator: `seq`'s body is
            // never executed, so it is never type-checked either.
            StmtKind::Seq { .. } => Ok(()),
            StmtKind::CChannel { name, host, port } => self.visit_c_channel(*name, host, port),
            StmtKind::SChannel {
                name,
                func_name,
                description,
                host,
                port,
            } => self.visit_s_channel(*name, *func_name, description, host, port),
        }
    }

    fn visit_assign(&mut self, left: &Expr, right: &Expr) -> SemResult<()> {
        let right_ty = self.visit_expr(right)?;

        let (decl, name) = match &left.kind {
            ExprKind::Id { decl } => (*decl, id_name(left)),
            _ => {
                return Err(SemanticError::new(
                    "assignment target must be a variable",
                ))
            }
        };

        let left_ty = if decl {
            // The parser set this at the declaration site.
            left.ty
                .get()
                .expect("ID(decl=true) always carries its declared type")
        } else {
            self.types
                .find(name)
                .ok_or_else(|| SemanticError::new(format!("undeclared variable '{}'", name)))?
        };

        if left_ty != right_ty {
            return Err(SemanticError::new(format!(
                "variable '{}' expects {}, found {}",
                name, left_ty, right_ty
            )));
        }

        self.types.declare(name, left_ty);
        Ok(())
    }

    fn visit_return(&mut self, expr: &Expr) -> SemResult<()> {
        let enclosing = self
            .context_stack
            .iter()
            .rev()
            .find_map(|c| match c {
                Context::FuncDef(ret) => Some(*ret),
                _ => None,
            })
            .ok_or_else(|| SemanticError::new("return found outside of a function"))?;

        let expr_ty = self.visit_expr(expr)?;
        if expr_ty != enclosing {
            return Err(SemanticError::new(format!(
                "return type {} does not match declared return type {}",
                expr_ty, enclosing
            )));
        }
        Ok(())
    }

    fn visit_break_continue(&mut self, which: &str) -> SemResult<()> {
        let in_loop = self
            .context_stack
            .iter()
            .any(|c| matches!(c, Context::While));
        if !in_loop {
            return Err(SemanticError::new(format!(
                "{} found outside of a loop",
                which
            )));
        }
        Ok(())
    }

    fn visit_funcdef(&mut self, def: &FuncDef) -> SemResult<()> {
        let nested_in_local_scope = self
            .context_stack
            .iter()
            .any(|c| matches!(c, Context::If | Context::While | Context::Par));
        if nested_in_local_scope {
            return Err(SemanticError::new(
                "functions cannot be declared inside if/while/par blocks",
            ));
        }

        self.functions
            .entry(def.name)
            .or_insert_with(|| Rc::new(def.clone()));

        let outer = self.types.clone();
        self.types = outer.child();
        for param in &def.params {
            self.types.declare(param.name, param.ty);
            if let Some(default) = &param.default {
                self.visit_expr(default)?;
            }
        }

        self.context_stack.push(Context::FuncDef(def.return_type));
        let result = self.visit_block(&def.body);
        self.context_stack.pop();
        self.types = outer;
        result
    }

    fn visit_if(&mut self, cond: &Expr, body: &[Stmt], else_body: Option<&[Stmt]>) -> SemResult<()> {
        self.expect_type(cond, TypeTag::Bool)?;

        self.context_stack.push(Context::If);
        let outer = self.types.clone();
        self.types = outer.child();
        let result = self.visit_block(body);
        self.types = outer.clone();
        result?;
        if let Some(else_body) = else_body {
            self.types = outer.child();
            let result = self.visit_block(else_body);
            self.types = outer;
            result?;
        }
        self.context_stack.pop();
        Ok(())
    }

    fn visit_while(&mut self, cond: &Expr, body: &[Stmt]) -> SemResult<()> {
        self.expect_type(cond, TypeTag::Bool)?;

        self.context_stack.push(Context::While);
        let outer = self.types.clone();
        self.types = outer.child();
        let result = self.visit_block(body);
        self.types = outer;
        self.context_stack.pop();
        result
    }

    fn visit_par(&mut self, body: &[Stmt]) -> SemResult<()> {
        for stmt in body {
            if !matches!(&stmt.kind, StmtKind::Expr(e) if matches!(e.kind, ExprKind::Call { .. }))
            {
                return Err(SemanticError::new(
                    "every statement in a 'par' block must be a call",
                ));
            }
        }

        self.context_stack.push(Context::Par);
        let outer = self.types.clone();
        self.types = outer.child();
        let result = self.visit_block(body);
        self.types = outer;
        self.context_stack.pop();
        result
    }

    fn visit_c_channel(&mut self, name: Symbol, host: &Expr, port: &Expr) -> SemResult<()> {
        self.expect_type(host, TypeTag::String)
            .map_err(|_| SemanticError::new(format!("host in '{}' must be STRING", name)))?;
        self.expect_type(port, TypeTag::Number)
            .map_err(|_| SemanticError::new(format!("port in '{}' must be NUMBER", name)))?;
        Ok(())
    }

    fn visit_s_channel(
        &mut self,
        name: Symbol,
        func_name: Symbol,
        description: &Expr,
        host: &Expr,
        port: &Expr,
    ) -> SemResult<()> {
        let func = self.functions.get(&func_name).ok_or_else(|| {
            SemanticError::new(format!(
                "'{}' references undeclared function '{}'",
                name, func_name
            ))
        })?;

        if func.return_type != TypeTag::String {
            return Err(SemanticError::new(format!(
                "the function backing '{}' must return STRING",
                name
            )));
        }
        if func.params.len() != 1 || func.params[0].ty != TypeTag::String {
            return Err(SemanticError::new(format!(
                "the function backing '{}' must take exactly one STRING parameter",
                name
            )));
        }

        self.expect_type(description, TypeTag::String)
            .map_err(|_| SemanticError::new(format!("description in '{}' must be STRING", name)))?;
        self.expect_type(host, TypeTag::String)
            .map_err(|_| SemanticError::new(format!("host in '{}' must be STRING", name)))?;
        self.expect_type(port, TypeTag::Number)
            .map_err(|_| SemanticError::new(format!("port in '{}' must be NUMBER", name)))?;
        Ok(())
    }

    fn expect_type(&mut self, expr: &Expr, expected: TypeTag) -> SemResult<()> {
        let ty = self.visit_expr(expr)?;
        if ty != expected {
            return Err(SemanticError::new(format!(
                "expected {}, found {}",
                expected, ty
            )));
        }
        Ok(())
    }

    fn visit_expr(&mut self, expr: &Expr) -> SemResult<TypeTag> {
        let ty = match &expr.kind {
            ExprKind::Constant => self.visit_constant(expr),
            ExprKind::Id { decl } => self.visit_id(expr, *decl)?,
            ExprKind::Access { index } => self.visit_access(expr, index)?,
            ExprKind::Logical { left, right } => self.visit_logical(left, right)?,
            ExprKind::Relational { left, right } => self.visit_relational(expr, left, right)?,
            ExprKind::Arithmetic { left, right } => self.visit_arithmetic(expr, left, right)?,
            ExprKind::Unary { expr: inner } => self.visit_unary(expr, inner)?,
            ExprKind::Call { id, args, oper } => self.visit_call(*id, args, *oper)?,
        };
        expr.ty.set(Some(ty));
        Ok(ty)
    }

    fn visit_constant(&self, expr: &Expr) -> TypeTag {
        match &expr.token.kind {
            TokenKind::String(_) => TypeTag::String,
            TokenKind::True | TokenKind::False => TypeTag::Bool,
            _ => TypeTag::Number,
        }
    }

    fn visit_id(&self, expr: &Expr, decl: bool) -> SemResult<TypeTag> {
        if decl {
            return Ok(expr
                .ty
                .get()
                .expect("ID(decl=true) always carries its declared type"));
        }
        let name = id_name(expr);
        self.types
            .find(name)
            .ok_or_else(|| SemanticError::new(format!("undeclared variable '{}'", name)))
    }

    fn visit_access(&mut self, expr: &Expr, index: &Expr) -> SemResult<TypeTag> {
        self.expect_type(index, TypeTag::Number)?;
        let name = id_name(expr);
        let container_ty = self
            .types
            .find(name)
            .ok_or_else(|| SemanticError::new(format!("undeclared variable '{}'", name)))?;
        if container_ty != TypeTag::String {
            return Err(SemanticError::new(
                "index access is only valid on a string",
            ));
        }
        Ok(TypeTag::String)
    }

    fn visit_logical(&mut self, left: &Expr, right: &Expr) -> SemResult<TypeTag> {
        let left_ty = self.visit_expr(left)?;
        let right_ty = self.visit_expr(right)?;
        if left_ty != TypeTag::Bool || right_ty != TypeTag::Bool {
            return Err(SemanticError::new(format!(
                "expected BOOL, found {} and {}",
                left_ty, right_ty
            )));
        }
        Ok(TypeTag::Bool)
    }

    fn visit_relational(&mut self, expr: &Expr, left: &Expr, right: &Expr) -> SemResult<TypeTag> {
        let left_ty = self.visit_expr(left)?;
        let right_ty = self.visit_expr(right)?;
        if matches!(expr.token.kind, TokenKind::EqEq | TokenKind::NotEq) {
            if left_ty != right_ty {
                return Err(SemanticError::new(format!(
                    "expected matching types, found {} and {}",
                    left_ty, right_ty
                )));
            }
        } else if left_ty != TypeTag::Number || right_ty != TypeTag::Number {
            return Err(SemanticError::new(format!(
                "expected NUMBER, found {} and {}",
                left_ty, right_ty
            )));
        }
        Ok(TypeTag::Bool)
    }

    fn visit_arithmetic(&mut self, expr: &Expr, left: &Expr, right: &Expr) -> SemResult<TypeTag> {
        let left_ty = self.visit_expr(left)?;
        let right_ty = self.visit_expr(right)?;
        if matches!(expr.token.kind, TokenKind::Plus) {
            if left_ty != right_ty {
                return Err(SemanticError::new(format!(
                    "expected matching types, found {} and {}",
                    left_ty, right_ty
                )));
            }
        } else if left_ty != TypeTag::Number || right_ty != TypeTag::Number {
            return Err(SemanticError::new(format!(
                "expected NUMBER, found {} and {}",
                left_ty, right_ty
            )));
        }
        Ok(left_ty)
    }

    fn visit_unary(&mut self, expr: &Expr, inner: &Expr) -> SemResult<TypeTag> {
        let inner_ty = self.visit_expr(inner)?;
        match expr.token.kind {
            TokenKind::Minus if inner_ty != TypeTag::Number => {
                return Err(SemanticError::new(format!(
                    "expected NUMBER, found {}",
                    inner_ty
                )))
            }
            TokenKind::Bang if inner_ty != TypeTag::Bool => {
                return Err(SemanticError::new(format!(
                    "expected BOOL, found {}",
                    inner_ty
                )))
            }
            _ => {}
        }
        Ok(inner_ty)
    }

    fn visit_call(
        &mut self,
        id: Option<Symbol>,
        args: &[Expr],
        oper: Option<Symbol>,
    ) -> SemResult<TypeTag> {
        for arg in args {
            self.visit_expr(arg)?;
        }

        let func_name = oper.or(id).expect("Call always carries id or oper");

        if let Some(def) = self.functions.get(&func_name) {
            let required = def.params.iter().filter(|p| p.default.is_none()).count();
            if required > args.len() {
                return Err(SemanticError::new(format!(
                    "'{}' expects at least {} argument(s), found {}",
                    func_name,
                    required,
                    args.len()
                )));
            }
            return Ok(def.return_type);
        }

        builtin_return_type(func_name)
            .ok_or_else(|| SemanticError::new(format!("function '{}' is not declared", func_name)))
    }
}

fn id_name(expr: &Expr) -> Symbol {
    match expr.token.kind {
        TokenKind::Id(sym) => sym,
        _ => unreachable!("Id/Access expressions always carry an Id token"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze_ok(src: &str) -> FunctionTable {
        let ast = mp_par::parse(src).expect("parses");
        analyze(&ast).expect("analyzes")
    }

    fn analyze_err(src: &str) -> SemanticError {
        let ast = mp_par::parse(src).expect("parses");
        analyze(&ast).expect_err("should fail semantic analysis")
    }

    #[test]
    fn accepts_well_typed_assignment() {
        analyze_ok("x: number\nx = 2 + 3");
    }

    #[test]
    fn rejects_mismatched_assignment() {
        let err = analyze_err("x: number\nx = \"hi\"");
        assert!(err.0.contains("expects"));
    }

    #[test]
    fn accepts_string_concatenation() {
        analyze_ok("s: string\ns = \"a\" + \"b\"");
    }

    #[test]
    fn rejects_arithmetic_type_mismatch() {
        let err = analyze_err("x: number\nx = 1 + \"a\"");
        assert!(err.0.contains("matching types"));
    }

    #[test]
    fn rejects_return_outside_function() {
        let err = analyze_err("return 1");
        assert!(err.0.contains("outside of a function"));
    }

    #[test]
    fn accepts_matching_return_type() {
        analyze_ok("func f(x: number) -> number { return x }");
    }

    #[test]
    fn rejects_mismatched_return_type() {
        let err = analyze_err("func f() -> number { return \"a\" }");
        assert!(err.0.contains("does not match"));
    }

    #[test]
    fn rejects_break_outside_loop() {
        let err = analyze_err("break");
        assert!(err.0.contains("outside of a loop"));
    }

    #[test]
    fn accepts_break_inside_while() {
        analyze_ok("i: number\ni = 0\nwhile (i < 1) { break }");
    }

    #[test]
    fn rejects_funcdef_nested_in_while() {
        let err = analyze_err("i: number\ni = 0\nwhile (i < 1) { func g() -> void { return } }");
        assert!(err.0.contains("if/while/par"));
    }

    #[test]
    fn rejects_non_bool_if_condition() {
        let err = analyze_err("if (1) { print(1) }");
        assert!(err.0.contains("expected"));
    }

    #[test]
    fn rejects_par_with_non_call_statement() {
        let err = analyze_err("par { x: number }");
        assert!(err.0.contains("call"));
    }

    #[test]
    fn accepts_c_channel_with_correct_types() {
        analyze_ok(r#"c_channel C { "127.0.0.1", 9999 }"#);
    }

    #[test]
    fn rejects_c_channel_with_wrong_port_type() {
        let err = analyze_err(r#"c_channel C { "127.0.0.1", "x" }"#);
        assert!(err.0.contains("port"));
    }

    #[test]
    fn accepts_s_channel_with_matching_function_shape() {
        analyze_ok(
            r#"
            func svc(q: string) -> string { return q }
            s_channel C { svc, "hi", "127.0.0.1", 9999 }
            "#,
        );
    }

    #[test]
    fn rejects_s_channel_with_wrong_return_type() {
        let err = analyze_err(
            r#"
            func svc(q: string) -> number { return 1 }
            s_channel C { svc, "hi", "127.0.0.1", 9999 }
            "#,
        );
        assert!(err.0.contains("must return STRING"));
    }

    #[test]
    fn accepts_string_index_access() {
        analyze_ok("s: string\ns = \"abc\"\nprint(s[0])");
    }

    #[test]
    fn rejects_index_access_on_number() {
        let err = analyze_err("x: number\nx = 1\nprint(x[0])");
        assert!(err.0.contains("string"));
    }

    #[test]
    fn accepts_builtin_call_with_tabulated_return_type() {
        analyze_ok("s: string\ns = to_string(3)");
    }

    #[test]
    fn rejects_call_to_undeclared_function() {
        let err = analyze_err("nope()");
        assert!(err.0.contains("not declared"));
    }

    #[test]
    fn accepts_call_with_fewer_args_than_defaulted_params() {
        analyze_ok("func f(x: number = 1) -> number { return x }\nprint(f())");
    }

    #[test]
    fn rejects_call_missing_required_argument() {
        let err = analyze_err("func f(x: number) -> number { return x }\nprint(f())");
        assert!(err.0.contains("expects at least"));
    }
}
