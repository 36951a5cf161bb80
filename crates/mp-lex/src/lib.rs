//! mp-lex — lexical analyzer for minipar.
//!
//! Transforms a source string into a stream of [`Token`]s. The lexer is a
//! single-pass, direct-coded (not table-driven) scanner: `Lexer::next_token`
//! dispatches on the current character and calls into the submodule that
//! knows how to consume that lexeme class (see `lexer::core`).
//!
//! Every token carries the [`Line`] it started on; that is the only
//! position information this language's diagnostics need.

use mp_util::{Line, Symbol};

mod lexer;

pub use lexer::Lexer;

/// The kind of a token. Mirrors the closed tag set from the language
/// grammar: keywords, literals, operators, punctuation, and a catch-all
/// for characters that don't belong to the language (unscannable input
/// never fails lexing — it simply produces `Other`).
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Identifiers and type names
    Id(Symbol),
    /// A type name (`number`, `string`, `bool`, `void`).
    Type(Symbol),

    // Literals
    Number,
    String(Symbol),
    True,
    False,

    // Keywords
    Func,
    While,
    If,
    Else,
    Return,
    Break,
    Continue,
    Par,
    Seq,
    CChannel,
    SChannel,

    // Multi-character operators
    RArrow,
    Or,
    And,
    EqEq,
    NotEq,
    Lte,
    Gte,

    // Single-character operators and punctuation
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Lt,
    Gt,
    Assign,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Dot,
    Bang,

    /// End of input. Synthesized once the scanner is exhausted; the parser
    /// also synthesizes this if it asks for a token past end-of-stream.
    Eof,

    /// A single character that isn't part of the language. Lexing never
    /// fails; unscannable text surfaces here and becomes a syntax error
    /// only if the parser tries to use it.
    Other(char),
}

/// A single lexical token: its kind, the literal source text it was
/// scanned from, and the line it appeared on.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: Line,
}

impl Token {
    pub fn eof(line: Line) -> Self {
        Token {
            kind: TokenKind::Eof,
            lexeme: "EOF".to_string(),
            line,
        }
    }

    /// Short label used in syntax error messages, e.g. `"while"` or `"+"`.
    pub fn describe(&self) -> &str {
        &self.lexeme
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_assignment_statement() {
        let mut lx = Lexer::new("x: number\nx = 2 + 3");
        let kinds: Vec<TokenKind> = std::iter::from_fn(|| {
            let tok = lx.next_token();
            if tok.kind == TokenKind::Eof {
                None
            } else {
                Some(tok.kind)
            }
        })
        .collect();

        assert_eq!(
            kinds,
            vec![
                TokenKind::Id(Symbol::intern("x")),
                TokenKind::Colon,
                TokenKind::Type(Symbol::intern("number")),
                TokenKind::Id(Symbol::intern("x")),
                TokenKind::Assign,
                TokenKind::Number,
                TokenKind::Plus,
                TokenKind::Number,
            ]
        );
    }

    #[test]
    fn line_tracking_counts_newlines() {
        let mut lx = Lexer::new("x\ny\nz");
        assert_eq!(lx.next_token().line, Line(1));
        assert_eq!(lx.next_token().line, Line(2));
        assert_eq!(lx.next_token().line, Line(3));
    }

    #[test]
    fn block_comment_advances_line_count() {
        let mut lx = Lexer::new("x /* line1\nline2\nline3 */ y");
        let first = lx.next_token();
        assert_eq!(first.line, Line(1));
        let second = lx.next_token();
        assert_eq!(second.line, Line(3));
    }

    #[test]
    fn unrecognized_character_becomes_other() {
        let mut lx = Lexer::new("@");
        let tok = lx.next_token();
        assert_eq!(tok.kind, TokenKind::Other('@'));
    }

    // ------------------------------------------------------------------
    // PROPERTY-BASED TESTS
    // ------------------------------------------------------------------

    #[test]
    fn property_line_is_monotonic_and_counts_newlines() {
        use proptest::prelude::*;

        proptest!(|(newline_positions in prop::collection::vec(1u32..5, 0..20))| {
            let mut source = String::new();
            for n in &newline_positions {
                source.push_str(&"x ".repeat(*n as usize));
                source.push('\n');
            }
            source.push_str("x");

            let mut lx = Lexer::new(&source);
            let mut last_line = Line(1);
            loop {
                let tok = lx.next_token();
                if tok.kind == TokenKind::Eof {
                    break;
                }
                prop_assert!(tok.line.0 >= last_line.0);
                last_line = tok.line;
            }
        });
    }

    #[test]
    fn property_arbitrary_identifiers_lex_to_one_id_token() {
        use proptest::prelude::*;

        proptest!(|(input in "[a-zA-Z_][a-zA-Z0-9_]{0,30}")| {
            let mut lx = Lexer::new(&input);
            let tok = lx.next_token();
            prop_assert!(matches!(tok.kind, TokenKind::Id(_)) || matches!(tok.kind, TokenKind::Type(_)) || matches!(tok.kind, TokenKind::True | TokenKind::False));
            prop_assert_eq!(lx.next_token().kind, TokenKind::Eof);
        });
    }

    #[test]
    fn property_arbitrary_decimal_numbers_lex_to_one_number_token() {
        use proptest::prelude::*;

        proptest!(|(input in "[0-9]{1,15}")| {
            let mut lx = Lexer::new(&input);
            let tok = lx.next_token();
            prop_assert_eq!(tok.kind, TokenKind::Number);
            prop_assert_eq!(tok.lexeme, input);
            prop_assert_eq!(lx.next_token().kind, TokenKind::Eof);
        });
    }

    #[test]
    fn property_arbitrary_string_literals_lex_to_one_string_token() {
        use proptest::prelude::*;

        proptest!(|(input in "[a-zA-Z0-9 ]{0,40}")| {
            let source = format!("\"{}\"", input);
            let mut lx = Lexer::new(&source);
            let tok = lx.next_token();
            prop_assert_eq!(tok.kind, TokenKind::String(Symbol::intern(&input)));
        });
    }
}
