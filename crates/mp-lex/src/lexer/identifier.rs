//! Identifier and keyword lexing.

use mp_util::Symbol;

use super::core::{is_ident_continue, is_ident_start};
use crate::{Lexer, Token, TokenKind};

const TYPE_NAMES: &[&str] = &["number", "bool", "string", "void"];

impl<'a> Lexer<'a> {
    /// Lexes an identifier, type name, or keyword.
    ///
    /// Identifiers start with a letter or underscore, followed by any
    /// number of alphanumerics or underscores. The resulting lexeme is
    /// then checked against the language's fixed keyword set.
    pub(super) fn scan_identifier(&mut self) -> Token {
        debug_assert!(is_ident_start(self.current_char()));
        let start = self.position;
        while is_ident_continue(self.current_char()) {
            self.advance();
        }
        let text = &self.source[start..self.position];

        let kind = match text {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "func" => TokenKind::Func,
            "while" => TokenKind::While,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "return" => TokenKind::Return,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "par" => TokenKind::Par,
            "seq" => TokenKind::Seq,
            "c_channel" => TokenKind::CChannel,
            "s_channel" => TokenKind::SChannel,
            name if TYPE_NAMES.contains(&name) => TokenKind::Type(Symbol::intern(name)),
            name => TokenKind::Id(Symbol::intern(name)),
        };

        self.make(kind, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_wins_over_identifier() {
        let mut lx = Lexer::new("while");
        assert_eq!(lx.next_token().kind, TokenKind::While);
    }

    #[test]
    fn type_names_are_distinguished_from_plain_identifiers() {
        let mut lx = Lexer::new("number count");
        assert_eq!(
            lx.next_token().kind,
            TokenKind::Type(Symbol::intern("number"))
        );
        assert_eq!(lx.next_token().kind, TokenKind::Id(Symbol::intern("count")));
    }

    #[test]
    fn channel_keywords_are_recognized() {
        let mut lx = Lexer::new("c_channel s_channel");
        assert_eq!(lx.next_token().kind, TokenKind::CChannel);
        assert_eq!(lx.next_token().kind, TokenKind::SChannel);
    }

    #[test]
    fn underscore_prefixed_identifier_is_not_a_keyword() {
        let mut lx = Lexer::new("_par");
        assert_eq!(lx.next_token().kind, TokenKind::Id(Symbol::intern("_par")));
    }
}
