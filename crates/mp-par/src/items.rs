//! Parsing for the three declaration-shaped statements: `funcdef`,
//! `c_channel`, and `s_channel`. Each inserts its name into the
//! enclosing scope with a dedicated [`SymbolKind`] before (or while)
//! parsing its body, so a channel or function can reference itself
//! and later statements can reference it.

use mp_lex::TokenKind;
use mp_util::Symbol;

use crate::ast::{FuncDef, Param, StmtKind, StmtNode};
use crate::error::ParseResult;
use crate::symtable::{SymbolEntry, SymbolKind};
use crate::Parser;

type Stmt = crate::ast::Stmt;

impl<'a> Parser<'a> {
    /// `funcdef := 'func' ID '(' params? ')' '->' TYPE block`
    pub(crate) fn parse_funcdef(&mut self) -> ParseResult<Stmt> {
        let line = self.line();
        self.bump(); // 'func'

        let name_tok = self.expect_id()?;
        let name = match name_tok.kind {
            TokenKind::Id(sym) => sym,
            _ => unreachable!(),
        };
        self.symbols
            .insert(
                name,
                SymbolEntry {
                    kind: SymbolKind::Func,
                },
            )
            .map_err(|_| self.error(format!("'{}' is already declared in this scope", name)))?;

        self.expect_kind(&TokenKind::LParen, "'('")?;
        let outer = self.symbols.clone();
        self.symbols = outer.child();
        let result = self.finish_funcdef(line, name);
        self.symbols = outer;
        result
    }

    fn finish_funcdef(&mut self, line: mp_util::Line, name: Symbol) -> ParseResult<Stmt> {
        let params = self.parse_params()?;
        self.expect_kind(&TokenKind::RParen, "')'")?;
        self.expect_kind(&TokenKind::RArrow, "'->'")?;
        let ty_tok = self.expect_kind(&TokenKind::Type(Symbol::intern("")), "a return type")?;
        let return_type = self.type_tag_of(&ty_tok)?;
        self.expect_kind(&TokenKind::LBrace, "'{'")?;
        let body = self.parse_stmts()?;
        self.expect_kind(&TokenKind::RBrace, "'}'")?;

        Ok(StmtNode::new(
            StmtKind::FuncDef(FuncDef {
                name,
                return_type,
                params,
                body,
                line,
            }),
            line,
        ))
    }

    /// `params := param ( ',' param )*`
    /// `param  := ID ':' TYPE ( '=' disjunction )?`
    fn parse_params(&mut self) -> ParseResult<Vec<Param>> {
        let mut params = Vec::new();
        if self.at(&TokenKind::RParen) {
            return Ok(params);
        }
        params.push(self.parse_param()?);
        while self.at(&TokenKind::Comma) {
            self.bump();
            params.push(self.parse_param()?);
        }
        Ok(params)
    }

    fn parse_param(&mut self) -> ParseResult<Param> {
        let name_tok = self.expect_id()?;
        let name = match name_tok.kind {
            TokenKind::Id(sym) => sym,
            _ => unreachable!(),
        };
        self.expect_kind(&TokenKind::Colon, "':'")?;
        let ty_tok = self.expect_kind(&TokenKind::Type(Symbol::intern("")), "a type name")?;
        let ty = self.type_tag_of(&ty_tok)?;

        self.symbols
            .insert(
                name,
                SymbolEntry {
                    kind: SymbolKind::Var(ty),
                },
            )
            .map_err(|_| self.error(format!("duplicate parameter name '{}'", name)))?;

        let default = if self.at(&TokenKind::Assign) {
            self.bump();
            Some(self.parse_disjunction()?)
        } else {
            None
        };

        Ok(Param { name, ty, default })
    }

    /// `c_channel := 'c_channel' ID '{' ari ',' ari '}'`
    pub(crate) fn parse_c_channel(&mut self) -> ParseResult<Stmt> {
        let line = self.line();
        self.bump();
        let name_tok = self.expect_id()?;
        let name = match name_tok.kind {
            TokenKind::Id(sym) => sym,
            _ => unreachable!(),
        };
        self.symbols
            .insert(
                name,
                SymbolEntry {
                    kind: SymbolKind::CChannel,
                },
            )
            .map_err(|_| self.error(format!("'{}' is already declared in this scope", name)))?;

        self.expect_kind(&TokenKind::LBrace, "'{'")?;
        let host = self.parse_ari()?;
        self.expect_kind(&TokenKind::Comma, "','")?;
        let port = self.parse_ari()?;
        self.expect_kind(&TokenKind::RBrace, "'}'")?;

        Ok(StmtNode::new(StmtKind::CChannel { name, host, port }, line))
    }

    /// `s_channel := 's_channel' ID '{' ID ',' ari ',' ari ',' ari '}'`
    pub(crate) fn parse_s_channel(&mut self) -> ParseResult<Stmt> {
        let line = self.line();
        self.bump();
        let name_tok = self.expect_id()?;
        let name = match name_tok.kind {
            TokenKind::Id(sym) => sym,
            _ => unreachable!(),
        };
        self.symbols
            .insert(
                name,
                SymbolEntry {
                    kind: SymbolKind::SChannel,
                },
            )
            .map_err(|_| self.error(format!("'{}' is already declared in this scope", name)))?;

        self.expect_kind(&TokenKind::LBrace, "'{'")?;

        let func_tok = self.expect_id()?;
        let func_name = match func_tok.kind {
            TokenKind::Id(sym) => sym,
            _ => unreachable!(),
        };
        match self.symbols.find(func_name) {
            Some(entry) if entry.kind == SymbolKind::Func => {}
            Some(_) => {
                return Err(self.error(format!("'{}' is not a function", func_name)));
            }
            None => {
                return Err(self.error(format!("undeclared function '{}'", func_name)));
            }
        }

        self.expect_kind(&TokenKind::Comma, "','")?;
        let description = self.parse_ari()?;
        self.expect_kind(&TokenKind::Comma, "','")?;
        let host = self.parse_ari()?;
        self.expect_kind(&TokenKind::Comma, "','")?;
        let port = self.parse_ari()?;
        self.expect_kind(&TokenKind::RBrace, "'}'")?;

        Ok(StmtNode::new(
            StmtKind::SChannel {
                name,
                func_name,
                description,
                host,
                port,
            },
            line,
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::parse;

    #[test]
    fn parses_function_definition() {
        let ast = parse("func f(x: number) -> number { return x * x }").unwrap();
        assert_eq!(ast.len(), 1);
    }

    #[test]
    fn parses_function_with_default_param() {
        let ast = parse("func f(x: number = 1) -> number { return x }").unwrap();
        assert_eq!(ast.len(), 1);
    }

    #[test]
    fn parses_c_channel() {
        let ast = parse(r#"c_channel C { "127.0.0.1", 9999 }"#).unwrap();
        assert_eq!(ast.len(), 1);
    }

    #[test]
    fn parses_s_channel_referencing_existing_function() {
        let src = r#"
            func svc(q: string) -> string { return q }
            s_channel C { svc, "hi", "127.0.0.1", 9999 }
        "#;
        let ast = parse(src).unwrap();
        assert_eq!(ast.len(), 2);
    }

    #[test]
    fn s_channel_rejects_undeclared_function() {
        let err = parse(r#"s_channel C { svc, "hi", "127.0.0.1", 9999 }"#).unwrap_err();
        assert!(err.message.contains("undeclared"));
    }
}
