//! Tokens produced by the [`Lexer`](super::lexer::Lexer).

use std::fmt;

use super::error::LexError;

/// The kind of a [`Token`].
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A bare word: command names, operators, anything unquoted.
    Ident,
    /// A `"..."` string with escapes already resolved.
    String,
    /// A number, always re-emitted in base 10.
    Number,
    /// `$name`, literal includes the leading `$`.
    Variable,
    /// `{...}`, literal is the text between the braces.
    Block,
    /// `[...]`, literal includes the brackets.
    Eval,
    Semicolon,
    Newline,
    Eof,
    /// Lexing failed; the literal holds the error message.
    Illegal(LexError),
}

impl TokenKind {
    /// Short upper-case name, as used in trace output.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Ident => "IDENT",
            TokenKind::String => "STRING",
            TokenKind::Number => "NUMBER",
            TokenKind::Variable => "VARIABLE",
            TokenKind::Block => "BLOCK",
            TokenKind::Eval => "EVAL",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Eof => "EOF",
            TokenKind::Illegal(_) => "ILLEGAL",
        }
    }
}

/// A single lexical token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    /// 1-based line the token starts on.
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, line: usize) -> Self {
        Token { kind, literal: literal.into(), line }
    }

    /// `true` for the tokens that end a command.
    pub fn is_terminator(&self) -> bool {
        matches!(self.kind, TokenKind::Semicolon | TokenKind::Newline | TokenKind::Eof)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::String => write!(f, "{}", self.literal),
            _ => write!(f, "token{{Type:{} Literal:{}}}", self.kind.name(), self.literal),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
