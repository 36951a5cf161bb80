//! Statement parsing: the dispatcher and every production except
//! `funcdef`/`c_channel`/`s_channel`, which live in `items` alongside
//! the symbol-table bookkeeping specific to named declarations.

use mp_lex::TokenKind;

use crate::ast::{ExprKind, StmtKind, StmtNode};
use crate::error::ParseResult;
use crate::Parser;

type Stmt = crate::ast::Stmt;

impl<'a> Parser<'a> {
    /// `stmt := assign_or_call | funcdef | return | break | continue
    ///        | if | while | seq | par | c_channel | s_channel`
    pub(crate) fn parse_stmt(&mut self) -> ParseResult<Stmt> {
        match &self.current().kind {
            TokenKind::Func => self.parse_funcdef(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Break => self.parse_break(),
            TokenKind::Continue => self.parse_continue(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Seq => self.parse_seq(),
            TokenKind::Par => self.parse_par(),
            TokenKind::CChannel => self.parse_c_channel(),
            TokenKind::SChannel => self.parse_s_channel(),
            _ => self.parse_assign_or_call(),
        }
    }

    /// `assign_or_call := local ( '=' disjunction )?`
    fn parse_assign_or_call(&mut self) -> ParseResult<Stmt> {
        let line = self.line();
        let left = self.parse_local()?;

        if self.at(&TokenKind::Assign) {
            self.bump();
            let right = self.parse_disjunction()?;
            return Ok(StmtNode::new(StmtKind::Assign { left, right }, line));
        }

        match &left.kind {
            ExprKind::Call { .. } => Ok(StmtNode::new(StmtKind::Expr(left), line)),
            ExprKind::Id { decl: true } => Ok(StmtNode::new(StmtKind::Expr(left), line)),
            _ => Err(self.error("expected '=' or a call after this expression")),
        }
    }

    /// `return := 'return' disjunction`
    fn parse_return(&mut self) -> ParseResult<Stmt> {
        let line = self.line();
        self.bump();
        let expr = self.parse_disjunction()?;
        Ok(StmtNode::new(StmtKind::Return(expr), line))
    }

    fn parse_break(&mut self) -> ParseResult<Stmt> {
        let line = self.line();
        self.bump();
        Ok(StmtNode::new(StmtKind::Break, line))
    }

    fn parse_continue(&mut self) -> ParseResult<Stmt> {
        let line = self.line();
        self.bump();
        Ok(StmtNode::new(StmtKind::Continue, line))
    }

    /// `if := 'if' '(' disjunction ')' block ( 'else' block )?`
    fn parse_if(&mut self) -> ParseResult<Stmt> {
        let line = self.line();
        self.bump();
        self.expect_kind(&TokenKind::LParen, "'('")?;
        let cond = self.parse_disjunction()?;
        self.expect_kind(&TokenKind::RParen, "')'")?;
        let body = self.parse_block()?;
        let else_body = if self.at(&TokenKind::Else) {
            self.bump();
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(StmtNode::new(
            StmtKind::If {
                cond,
                body,
                else_body,
            },
            line,
        ))
    }

    /// `while := 'while' '(' disjunction ')' block`
    fn parse_while(&mut self) -> ParseResult<Stmt> {
        let line = self.line();
        self.bump();
        self.expect_kind(&TokenKind::LParen, "'('")?;
        let cond = self.parse_disjunction()?;
        self.expect_kind(&TokenKind::RParen, "')'")?;
        let body = self.parse_block()?;
        Ok(StmtNode::new(StmtKind::While { cond, body }, line))
    }

    /// `seq := 'seq' block`
    fn parse_seq(&mut self) -> ParseResult<Stmt> {
        let line = self.line();
        self.bump();
        let body = self.parse_block()?;
        Ok(StmtNode::new(StmtKind::Seq { body }, line))
    }

    /// `par := 'par' block`
    fn parse_par(&mut self) -> ParseResult<Stmt> {
        let line = self.line();
        self.bump();
        let body = self.parse_block()?;
        for stmt in &body {
            if !matches!(&stmt.kind, StmtKind::Expr(e) if matches!(e.kind, ExprKind::Call { .. }))
            {
                return Err(self.error("every statement in a 'par' block must be a call"));
            }
        }
        Ok(StmtNode::new(StmtKind::Par { body }, line))
    }
}

#[cfg(test)]
mod tests {
    use crate::parse;

    #[test]
    fn parses_assignment() {
        let ast = parse("x: number\nx = 2 + 3").unwrap();
        assert_eq!(ast.len(), 2);
    }

    #[test]
    fn parses_while_loop() {
        let ast = parse("i: number\ni = 0\nwhile (i < 3) { i = i + 1 }").unwrap();
        assert_eq!(ast.len(), 3);
    }

    #[test]
    fn parses_if_else() {
        let ast = parse("x: number\nx = 1\nif (x == 1) { x = 2 } else { x = 3 }").unwrap();
        assert_eq!(ast.len(), 3);
    }

    #[test]
    fn par_rejects_non_call_statements() {
        let err = parse("par { x: number }").unwrap_err();
        assert!(err.message.contains("call"));
    }
}
