//! Expression parsing: the precedence ladder `disjunction .. primary`,
//! and `local`, which covers every form an identifier reference can
//! take (declaration, indexing, method-style dispatch, call).

use mp_lex::TokenKind;
use mp_util::Symbol;

use crate::ast::{ExprKind, ExprNode, TypeTag};
use crate::error::ParseResult;
use crate::symtable::{SymbolEntry, SymbolKind};
use crate::Parser;

type Expr = crate::ast::Expr;

impl<'a> Parser<'a> {
    pub(crate) fn parse_disjunction(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_conjunction()?;
        while self.at(&TokenKind::Or) {
            let op = self.bump();
            let right = self.parse_conjunction()?;
            left = ExprNode::new(ExprKind::Logical { left, right }, op);
        }
        Ok(left)
    }

    fn parse_conjunction(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_equality()?;
        while self.at(&TokenKind::And) {
            let op = self.bump();
            let right = self.parse_equality()?;
            left = ExprNode::new(ExprKind::Logical { left, right }, op);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_comparison()?;
        while self.at(&TokenKind::EqEq) || self.at(&TokenKind::NotEq) {
            let op = self.bump();
            let right = self.parse_comparison()?;
            left = ExprNode::new(ExprKind::Relational { left, right }, op);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_ari()?;
        while self.at(&TokenKind::Lt)
            || self.at(&TokenKind::Gt)
            || self.at(&TokenKind::Lte)
            || self.at(&TokenKind::Gte)
        {
            let op = self.bump();
            let right = self.parse_ari()?;
            left = ExprNode::new(ExprKind::Relational { left, right }, op);
        }
        Ok(left)
    }

    pub(crate) fn parse_ari(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_term()?;
        while self.at(&TokenKind::Plus) || self.at(&TokenKind::Minus) {
            let op = self.bump();
            let right = self.parse_term()?;
            left = ExprNode::new(ExprKind::Arithmetic { left, right }, op);
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_unary()?;
        while self.at(&TokenKind::Star) || self.at(&TokenKind::Slash) || self.at(&TokenKind::Percent)
        {
            let op = self.bump();
            let right = self.parse_unary()?;
            left = ExprNode::new(ExprKind::Arithmetic { left, right }, op);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        if self.at(&TokenKind::Bang) || self.at(&TokenKind::Minus) {
            let op = self.bump();
            let expr = self.parse_unary()?;
            return Ok(ExprNode::new(ExprKind::Unary { expr }, op));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        if self.at(&TokenKind::LParen) {
            self.bump();
            let expr = self.parse_disjunction()?;
            self.expect_kind(&TokenKind::RParen, "')'")?;
            return Ok(expr);
        }

        if self.at(&TokenKind::Number) {
            let tok = self.bump();
            return Ok(ExprNode::new(ExprKind::Constant, tok));
        }

        if matches!(self.current().kind, TokenKind::String(_)) {
            let tok = self.bump();
            return Ok(ExprNode::new(ExprKind::Constant, tok));
        }

        if self.at(&TokenKind::True) || self.at(&TokenKind::False) {
            let tok = self.bump();
            return Ok(ExprNode::new(ExprKind::Constant, tok));
        }

        if matches!(self.current().kind, TokenKind::Id(_)) {
            return self.parse_local();
        }

        Err(self.error(format!(
            "expected an expression, found '{}'",
            self.current().describe()
        )))
    }

    /// `local := ID ( ':' TYPE | ('[' ari ']')? ('.' ID)? ('(' args? ')')? )`
    pub(crate) fn parse_local(&mut self) -> ParseResult<Expr> {
        let id_tok = self.expect_id()?;
        let name = match id_tok.kind {
            TokenKind::Id(sym) => sym,
            _ => unreachable!("expect_id only returns Id tokens"),
        };

        if self.at(&TokenKind::Colon) {
            self.bump();
            let ty_tok = self.expect_kind(&TokenKind::Type(Symbol::intern("")), "a type name")?;
            let ty = self.type_tag_of(&ty_tok)?;
            self.symbols
                .insert(
                    name,
                    SymbolEntry {
                        kind: SymbolKind::Var(ty),
                    },
                )
                .map_err(|_| self.error(format!("'{}' is already declared in this scope", name)))?;
            let node = ExprNode::new(ExprKind::Id { decl: true }, id_tok);
            node.ty.set(Some(ty));
            return Ok(node);
        }

        self.symbols
            .find(name)
            .ok_or_else(|| self.error(format!("undeclared name '{}'", name)))?;

        let mut index = None;
        if self.at(&TokenKind::LBracket) {
            self.bump();
            index = Some(self.parse_ari()?);
            self.expect_kind(&TokenKind::RBracket, "']'")?;
        }

        let mut oper = None;
        if self.at(&TokenKind::Dot) {
            self.bump();
            let method_tok = self.expect_id()?;
            oper = match method_tok.kind {
                TokenKind::Id(sym) => Some(sym),
                _ => unreachable!(),
            };
        }

        if self.at(&TokenKind::LParen) {
            self.bump();
            let args = self.parse_args()?;
            self.expect_kind(&TokenKind::RParen, "')'")?;
            let id = if oper.is_none() { Some(name) } else { None };
            return Ok(ExprNode::new(ExprKind::Call { id, args, oper }, id_tok));
        }

        if let Some(index) = index {
            return Ok(ExprNode::new(ExprKind::Access { index }, id_tok));
        }

        Ok(ExprNode::new(ExprKind::Id { decl: false }, id_tok))
    }

    /// `args := disjunction ( ',' disjunction )*`
    fn parse_args(&mut self) -> ParseResult<Vec<Expr>> {
        let mut args = Vec::new();
        if self.at(&TokenKind::RParen) {
            return Ok(args);
        }
        args.push(self.parse_disjunction()?);
        while self.at(&TokenKind::Comma) {
            self.bump();
            args.push(self.parse_disjunction()?);
        }
        Ok(args)
    }

    pub(crate) fn expect_id(&mut self) -> ParseResult<mp_lex::Token> {
        if matches!(self.current().kind, TokenKind::Id(_)) {
            Ok(self.bump())
        } else {
            Err(self.error(format!(
                "expected an identifier, found '{}'",
                self.current().describe()
            )))
        }
    }

    pub(crate) fn type_tag_of(&self, tok: &mp_lex::Token) -> ParseResult<TypeTag> {
        match &tok.kind {
            TokenKind::Type(sym) => TypeTag::from_name(sym.as_str())
                .ok_or_else(|| self.error(format!("unknown type '{}'", sym))),
            _ => Err(self.error("expected a type name")),
        }
    }
}
