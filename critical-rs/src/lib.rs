//! `critical`: an embeddable Tcl-flavoured scripting language.
//!
//! The language itself lives in [`script`].  [`cli`] and [`stdlib`] support
//! the bundled `critical` runner.

pub mod cli;
pub mod script;
pub mod stdlib;

pub use script::{BuiltinTable, Interpreter, Outcome, ScriptError, Signal};
