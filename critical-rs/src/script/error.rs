//! Errors and non-local control signals.
//!
//! Evaluation returns `Result<String, Signal>`.  A [`Signal`] is either one
//! of the four control outcomes (`break`, `continue`, `return`, `exit`) or a
//! genuine [`ScriptError`].  Builtins propagate both with `?`.

use thiserror::Error;

// ── LexError ──────────────────────────────────────────────────────────────────

/// Why the lexer produced an `ILLEGAL` token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unterminated string")]
    UnterminatedString,
    #[error("unterminated pair {open}-{close} depth:{depth}")]
    UnterminatedPair { open: char, close: char, depth: usize },
    #[error("'-' may only occur at the start of the number")]
    MisplacedSign,
    #[error("number out of range: {0}")]
    NumberOutOfRange(String),
    #[error("invalid number: {0}")]
    InvalidNumber(String),
    #[error("closing '{0}' without opening one")]
    UnexpectedClose(char),
}

// ── ScriptError ───────────────────────────────────────────────────────────────

/// A fatal error raised while parsing or evaluating a script.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("line {line}: illegal token: {source}")]
    Parse {
        line: usize,
        #[source]
        source: LexError,
    },

    #[error("{command} expects {expected}, got {got}")]
    Arity { command: String, expected: &'static str, got: usize },

    #[error("function argument mismatch, {name} takes {expected} arguments, {got} supplied")]
    FunctionArity { name: String, expected: usize, got: usize },

    #[error("not a number: '{0}'")]
    NotANumber(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("unknown operation {lhs} {op} {rhs}")]
    UnknownOperation { lhs: String, op: String, rhs: String },

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("a block cannot be used as a command name: {{{0}}}")]
    InvalidCommand(String),

    #[error("expected 'else', got '{0}'")]
    ExpectedElse(String),

    #[error(transparent)]
    Regex(#[from] regex::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("break outside a loop")]
    BreakOutsideLoop,

    #[error("continue outside a loop")]
    ContinueOutsideLoop,

    #[error("maximum nesting depth of {0} exceeded")]
    RecursionLimit(usize),

    #[error("interrupted")]
    Interrupted,

    #[error("cannot register builtin '{0}' after evaluation has started")]
    BuiltinsSealed(String),

    #[error("error invoking {name}: {source}")]
    Command {
        name: String,
        #[source]
        source: Box<ScriptError>,
    },
}

impl ScriptError {
    /// Attach the name of the failing command.  Errors that describe the
    /// whole evaluation rather than one command are returned unchanged.
    pub fn in_command(self, name: &str) -> Self {
        match self {
            ScriptError::RecursionLimit(_) | ScriptError::Interrupted => self,
            other => ScriptError::Command { name: name.to_owned(), source: Box::new(other) },
        }
    }

    /// The innermost error, with all [`ScriptError::Command`] context removed.
    pub fn root(&self) -> &ScriptError {
        match self {
            ScriptError::Command { source, .. } => source.root(),
            other => other,
        }
    }
}

// ── Signal ────────────────────────────────────────────────────────────────────

/// Anything other than a normal value that evaluation can produce.
#[derive(Debug)]
pub enum Signal {
    /// Leave the innermost loop.  Carries the last value produced before it.
    Break(Option<String>),
    /// Skip to the innermost loop's next test.
    Continue(Option<String>),
    /// Leave the innermost procedure (or the program) with a value.
    Return(String),
    /// Stop the whole script with a value.
    Exit(String),
    Error(ScriptError),
}

impl Signal {
    /// Fill an empty `break`/`continue` payload with `last`.
    pub(crate) fn stamp(self, last: &str) -> Self {
        match self {
            Signal::Break(None) => Signal::Break(Some(last.to_owned())),
            Signal::Continue(None) => Signal::Continue(Some(last.to_owned())),
            other => other,
        }
    }
}

impl From<ScriptError> for Signal {
    fn from(e: ScriptError) -> Self {
        Signal::Error(e)
    }
}

impl From<regex::Error> for Signal {
    fn from(e: regex::Error) -> Self {
        Signal::Error(e.into())
    }
}

impl From<std::io::Error> for Signal {
    fn from(e: std::io::Error) -> Self {
        Signal::Error(e.into())
    }
}

// ── Outcome ───────────────────────────────────────────────────────────────────

/// How a top-level evaluation finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The program ran to the end; carries the last command's value.
    Normal(String),
    /// A top-level `return`.
    Return(String),
    /// `exit` was called somewhere.
    Exit(String),
}

impl Outcome {
    pub fn value(&self) -> &str {
        match self {
            Outcome::Normal(v) | Outcome::Return(v) | Outcome::Exit(v) => v,
        }
    }

    pub fn into_value(self) -> String {
        match self {
            Outcome::Normal(v) | Outcome::Return(v) | Outcome::Exit(v) => v,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
