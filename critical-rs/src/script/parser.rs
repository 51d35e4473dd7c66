//! Script parser.
//!
//! Groups the token stream into [`Command`]s.  A command is its head token
//! followed by every token up to the next `;`, newline, or end of input.
//! Nothing is evaluated here: blocks and brackets stay as raw text until the
//! interpreter reaches them.

use super::error::ScriptError;
use super::lexer::Lexer;
use super::token::{Token, TokenKind};

/// One command: a head word and its arguments, as tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub command: Token,
    pub arguments: Vec<Token>,
}

/// A parsed script.
pub type Program = Vec<Command>;

pub struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str) -> Self {
        Parser { lexer: Lexer::new(src) }
    }

    /// Parse the whole input.  The first `ILLEGAL` token aborts the parse.
    pub fn parse(mut self) -> Result<Program, ScriptError> {
        let mut program = Vec::new();
        loop {
            let head = self.next()?;
            match head.kind {
                TokenKind::Eof => return Ok(program),
                TokenKind::Newline | TokenKind::Semicolon => continue,
                _ => {}
            }

            let mut arguments = Vec::new();
            loop {
                let tok = self.next()?;
                if tok.is_terminator() {
                    let eof = tok.kind == TokenKind::Eof;
                    program.push(Command { command: head, arguments });
                    if eof {
                        return Ok(program);
                    }
                    break;
                }
                arguments.push(tok);
            }
        }
    }

    fn next(&mut self) -> Result<Token, ScriptError> {
        let tok = self.lexer.next_token();
        match tok.kind {
            TokenKind::Illegal(source) => Err(ScriptError::Parse { line: tok.line, source }),
            _ => Ok(tok),
        }
    }
}

/// Parse `src` into a [`Program`].
pub fn parse(src: &str) -> Result<Program, ScriptError> {
    Parser::new(src).parse()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
