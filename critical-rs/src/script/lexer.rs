//! Script lexer.
//!
//! Turns source text into a flat stream of [`Token`]s.  The language has very
//! little syntax, so the interesting parts are:
//!
//! - `"..."` strings, with `\n \r \t \" \\` escapes and backslash-newline
//!   continuation
//! - `{...}` blocks and `[...]` evaluations, read by one depth-tracking
//!   reader so that inner pairs of the same kind nest
//! - numbers, which may be written in hex (`0xff`) or binary (`0b101`) but are
//!   always re-emitted in base 10
//!
//! Errors never abort the lexer; they come back as an `ILLEGAL` token which
//! the parser turns into a parse failure.

use std::num::IntErrorKind;

use super::error::LexError;
use super::token::{Token, TokenKind};

/// A lexer over a borrowed source string.
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer { src, pos: 0, line: 1 }
    }

    /// Return the next token.  Once the input is exhausted this keeps
    /// returning `EOF`.
    pub fn next_token(&mut self) -> Token {
        let tok = self.lex();
        tracing::trace!(kind = tok.kind.name(), literal = %tok.literal, line = tok.line, "token");
        tok
    }

    // ── Character access ──────────────────────────────────────────────────────

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek2(&self) -> Option<char> {
        let mut it = self.src[self.pos..].chars();
        it.next();
        it.next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
        }
        Some(ch)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if is_whitespace(c)) {
            self.pos += 1;
        }
    }

    // ── Dispatch ──────────────────────────────────────────────────────────────

    fn lex(&mut self) -> Token {
        self.skip_ws();
        let line = self.line;
        let Some(ch) = self.peek() else {
            return Token::new(TokenKind::Eof, "", line);
        };

        match ch {
            '\n' => {
                self.advance();
                Token::new(TokenKind::Newline, "\\n", line)
            }
            ';' => {
                self.advance();
                Token::new(TokenKind::Semicolon, ";", line)
            }
            ']' | '}' => {
                self.advance();
                illegal(LexError::UnexpectedClose(ch), line)
            }
            '$' => self.read_variable(line),
            '"' => match self.read_string() {
                Ok(s) => Token::new(TokenKind::String, s, line),
                Err(e) => illegal(e, line),
            },
            '[' => match self.read_nested_pair('[', ']') {
                Ok(s) => Token::new(TokenKind::Eval, format!("[{s}]"), line),
                Err(e) => illegal(e, line),
            },
            '{' => match self.read_nested_pair('{', '}') {
                Ok(s) => Token::new(TokenKind::Block, s, line),
                Err(e) => illegal(e, line),
            },
            c if c.is_ascii_digit() => self.read_number(line),
            '-' if matches!(self.peek2(), Some(d) if d.is_ascii_digit()) => self.read_number(line),
            _ => self.read_ident(line),
        }
    }

    // ── Readers ───────────────────────────────────────────────────────────────

    fn read_ident(&mut self, line: usize) -> Token {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_ident_char(c)) {
            self.advance();
        }
        Token::new(TokenKind::Ident, &self.src[start..self.pos], line)
    }

    /// `$name` or `$$name`: a `$` followed by any run of `$` and ASCII
    /// letters.  Digits, `_` and braces end the token; quote the word to get
    /// the wider `${name}` and `$name_1` forms of substitution.
    fn read_variable(&mut self, line: usize) -> Token {
        let start = self.pos;
        self.advance();
        while matches!(self.peek(), Some(c) if c == '$' || c.is_ascii_alphabetic()) {
            self.advance();
        }
        Token::new(TokenKind::Variable, &self.src[start..self.pos], line)
    }

    /// Read a `"..."` string, resolving escapes.  Positioned on the opening quote.
    fn read_string(&mut self) -> Result<String, LexError> {
        self.advance();
        let mut out = String::new();
        loop {
            match self.advance() {
                None => return Err(LexError::UnterminatedString),
                Some('"') => return Ok(out),
                Some('\\') => {
                    if self.peek() == Some('\n') {
                        self.advance();
                        continue;
                    }
                    match self.advance() {
                        None => return Err(LexError::UnterminatedString),
                        Some('n') => out.push('\n'),
                        Some('r') => out.push('\r'),
                        Some('t') => out.push('\t'),
                        Some(c) => out.push(c),
                    }
                }
                Some(c) => out.push(c),
            }
        }
    }

    /// Read the text between `open` and its matching `close`, counting nested
    /// pairs of the same kind.  Positioned on the opening character; the
    /// returned text excludes the outermost pair.
    fn read_nested_pair(&mut self, open: char, close: char) -> Result<String, LexError> {
        self.advance();
        let mut depth = 1usize;
        let mut out = String::new();
        loop {
            let Some(c) = self.advance() else {
                return Err(LexError::UnterminatedPair { open, close, depth });
            };
            if c == open {
                depth += 1;
            } else if c == close {
                depth -= 1;
                if depth == 0 {
                    return Ok(out);
                }
            }
            out.push(c);
        }
    }

    /// Read a decimal, `0x` hex, or `0b` binary number.
    fn read_number(&mut self, line: usize) -> Token {
        let start = self.pos;

        let radix = match (self.peek(), self.peek2()) {
            (Some('0'), Some('x')) => 16,
            (Some('0'), Some('b')) => 2,
            _ => 10,
        };

        if radix != 10 {
            self.advance();
            self.advance();
            let digits_start = self.pos;
            while matches!(self.peek(), Some(c) if c.is_digit(radix)) {
                self.advance();
            }
            let text = &self.src[start..self.pos];
            return match i64::from_str_radix(&self.src[digits_start..self.pos], radix) {
                Ok(n) => Token::new(TokenKind::Number, n.to_string(), line),
                Err(e) => illegal(int_error(e.kind(), text), line),
            };
        }

        while matches!(self.peek(), Some(c) if c == '-' || c.is_ascii_digit()) {
            self.advance();
        }
        if self.src[start + 1..self.pos].contains('-') {
            return illegal(LexError::MisplacedSign, line);
        }

        // One optional fractional part, kept as written.
        if self.peek() == Some('.') && matches!(self.peek2(), Some(d) if d.is_ascii_digit()) {
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
            return Token::new(TokenKind::Number, &self.src[start..self.pos], line);
        }

        let text = &self.src[start..self.pos];
        match text.parse::<i64>() {
            Ok(n) => Token::new(TokenKind::Number, n.to_string(), line),
            Err(e) => illegal(int_error(e.kind(), text), line),
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    /// Yields tokens up to, but not including, `EOF`.  An `ILLEGAL` token is
    /// yielded and then iteration stops.
    fn next(&mut self) -> Option<Token> {
        if self.pos > self.src.len() {
            return None;
        }
        let tok = self.next_token();
        match tok.kind {
            TokenKind::Eof => None,
            TokenKind::Illegal(_) => {
                self.pos = self.src.len() + 1;
                Some(tok)
            }
            _ => Some(tok),
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn illegal(e: LexError, line: usize) -> Token {
    let msg = e.to_string();
    Token::new(TokenKind::Illegal(e), msg, line)
}

fn int_error(kind: &IntErrorKind, text: &str) -> LexError {
    match kind {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            LexError::NumberOutOfRange(text.to_owned())
        }
        _ => LexError::InvalidNumber(text.to_owned()),
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r')
}

fn is_ident_char(c: char) -> bool {
    !is_whitespace(c) && !matches!(c, '{' | '}' | '[' | ']' | '$' | ';' | '\n')
}

// ── Tests ─────────────────────────────────────────────────────────────────────
