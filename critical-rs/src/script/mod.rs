//! The scripting language.
//!
//! A small Tcl-like language where every value is a string and every
//! construct, `if` and `while` included, is an ordinary command:
//!
//! - [`lexer`] turns source text into [`token::Token`]s
//! - [`parser`] groups tokens into commands
//! - [`interp`] expands arguments and dispatches commands, with
//!   [`env`] holding variable scopes and [`builtins`] the command table
//! - control flow (`break`, `continue`, `return`, `exit`) travels as an
//!   [`error::Signal`] through ordinary `Result`s
//!
//! # Quick start
//!
//! ```rust
//! use critical::script::{Interpreter, Outcome};
//!
//! let mut interp = Interpreter::new("proc squared {x} { expr $x * $x }\nsquared 9").unwrap();
//! assert_eq!(interp.evaluate().unwrap(), Outcome::Normal("81".into()));
//! ```

pub mod builtins;
pub mod env;
pub mod error;
pub mod expand;
pub mod interp;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod value;

// Re-exports for convenience.
pub use builtins::{BuiltinFn, BuiltinTable};
pub use error::{LexError, Outcome, ScriptError, Signal};
pub use interp::{Interpreter, OutputSink, UserFunction};
pub use parser::{parse, Command, Program};
