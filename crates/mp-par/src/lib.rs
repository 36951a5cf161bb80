//! mp-par — recursive-descent parser for minipar.
//!
//! Single-token lookahead: [`Parser::bump`] advances the lookahead by
//! one token; each `parse_*` method decides its production from the
//! current lookahead alone, consistent with the grammar being LL(1).
//! Past end of input the lexer's `Eof` token is held forever, so the
//! parser never needs a special "ran out of tokens" case.
//!
//! The parser also drives a [`SymTable`] alongside the grammar: each
//! `block` pushes a nested scope, `local`'s declaration form inserts a
//! symbol, and every other name reference is resolved immediately so
//! that an undeclared name is rejected at parse time rather than later.

pub mod ast;
pub mod error;
pub mod symtable;

mod expr;
mod items;
mod stmt;

use mp_lex::{Lexer, Token, TokenKind};
use mp_util::Line;

pub use ast::Ast;
pub use error::{ParseError, ParseResult};
pub use symtable::SymTable;

/// Parse a complete program from source text.
pub fn parse(source: &str) -> ParseResult<Ast> {
    Parser::new(source).parse_program()
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    pub(crate) symbols: SymTable,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Parser {
            lexer,
            current,
            symbols: SymTable::new_root(),
        }
    }

    pub fn parse_program(&mut self) -> ParseResult<Ast> {
        let stmts = self.parse_stmts()?;
        self.expect_kind(&TokenKind::Eof, "end of input")?;
        Ok(stmts)
    }

    /// Parses statements until `}` or end of input, per the grammar's
    /// `stmts := stmt* ; followed by '}' or EOF`.
    pub(crate) fn parse_stmts(&mut self) -> ParseResult<Vec<ast::Stmt>> {
        let mut stmts = Vec::new();
        while !self.at(&TokenKind::RBrace) && !self.at(&TokenKind::Eof) {
            stmts.push(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    /// Parses a `{ stmts }` block in a fresh nested scope.
    pub(crate) fn parse_block(&mut self) -> ParseResult<Vec<ast::Stmt>> {
        self.expect_kind(&TokenKind::LBrace, "'{'")?;
        let outer = self.symbols.clone();
        self.symbols = outer.child();
        let result = self.parse_stmts();
        self.symbols = outer;
        let stmts = result?;
        self.expect_kind(&TokenKind::RBrace, "'}'")?;
        Ok(stmts)
    }

    pub(crate) fn line(&self) -> Line {
        self.current.line
    }

    pub(crate) fn current(&self) -> &Token {
        &self.current
    }

    pub(crate) fn bump(&mut self) -> Token {
        let next = self.lexer.next_token();
        std::mem::replace(&mut self.current, next)
    }

    pub(crate) fn at(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    /// Consumes and returns the current token if its kind matches,
    /// otherwise produces a syntax error.
    pub(crate) fn expect_kind(&mut self, kind: &TokenKind, expected: &str) -> ParseResult<Token> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.error(format!(
                "expected {}, found '{}'",
                expected,
                self.current.describe()
            )))
        }
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            line: self.line(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_empty_program() {
        assert!(parse("").unwrap().is_empty());
    }

    #[test]
    fn rejects_redeclaration_in_same_scope() {
        let err = parse("x: number\nx: string").unwrap_err();
        assert!(err.message.contains("already declared") || err.message.contains("redeclar"));
    }

    #[test]
    fn rejects_undeclared_name_use() {
        let err = parse("print(y)").unwrap_err();
        assert!(err.message.to_lowercase().contains("undeclared") || err.message.contains("y"));
    }
}
