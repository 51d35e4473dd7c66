//! Script interpreter.
//!
//! The [`Interpreter`] owns the parsed program, the variable scopes, the
//! builtin and procedure tables, and the output sink.  All nested evaluation
//! (brackets, blocks, `eval`, procedure bodies) goes back through
//! [`Interpreter::eval`], so every level shares the same state.

use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{
    builtins::{BuiltinFn, BuiltinTable},
    env::Environment,
    error::{Outcome, ScriptError, Signal},
    expand::{expand, ExpandContext},
    parser::{parse, Command, Program},
    token::{Token, TokenKind},
};

/// Default maximum evaluation nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// Grow the native stack when less than this much remains.
const RED_ZONE: usize = 128 * 1024;
/// Size of each additional stack segment.
const STACK_SEGMENT: usize = 2 * 1024 * 1024;

// ── OutputSink ────────────────────────────────────────────────────────────────

/// Where `puts` writes.
pub enum OutputSink {
    Stdout,
    /// Collect lines in memory; see [`Interpreter::take_output`].
    Capture(Vec<String>),
    Writer(Box<dyn Write + Send>),
}

impl OutputSink {
    fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        match self {
            OutputSink::Stdout => {
                let stdout = std::io::stdout();
                let mut out = stdout.lock();
                writeln!(out, "{line}")
            }
            OutputSink::Capture(lines) => {
                lines.push(line.to_owned());
                Ok(())
            }
            OutputSink::Writer(w) => writeln!(w, "{line}"),
        }
    }
}

// ── UserFunction ──────────────────────────────────────────────────────────────

/// A procedure defined with `proc`.  The body is parsed once, at definition.
#[derive(Debug)]
pub struct UserFunction {
    pub params: Vec<String>,
    pub body: String,
    program: Program,
}

impl UserFunction {
    pub fn new(params: Vec<String>, body: String) -> Result<Self, ScriptError> {
        let program = parse(&body)?;
        Ok(UserFunction { params, body, program })
    }
}

// ── Interpreter ───────────────────────────────────────────────────────────────

pub struct Interpreter {
    program: Arc<Program>,
    builtins: Arc<BuiltinTable>,
    /// Set by the first [`evaluate`](Self::evaluate); no more builtins after.
    sealed: bool,
    functions: HashMap<String, Arc<UserFunction>>,
    env: Environment,
    output: OutputSink,
    interrupt: Option<Arc<AtomicBool>>,
    depth: usize,
    max_depth: usize,
}

impl Interpreter {
    /// Parse `source` and prepare an interpreter with the standard builtins.
    pub fn new(source: &str) -> Result<Self, ScriptError> {
        Self::with_builtins(source, BuiltinTable::standard())
    }

    /// Parse `source` and prepare an interpreter with the given builtins.
    pub fn with_builtins(source: &str, builtins: BuiltinTable) -> Result<Self, ScriptError> {
        let program = parse(source)?;
        Ok(Interpreter {
            program: Arc::new(program),
            builtins: Arc::new(builtins),
            sealed: false,
            functions: HashMap::new(),
            env: Environment::new(),
            output: OutputSink::Stdout,
            interrupt: None,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        })
    }

    /// Add or replace a host builtin.  Only allowed before the first
    /// [`evaluate`](Self::evaluate).
    pub fn register_builtin<F>(&mut self, name: &str, f: F) -> Result<(), ScriptError>
    where
        F: Fn(&mut Interpreter, &[String]) -> Result<String, Signal> + Send + Sync + 'static,
    {
        if self.sealed {
            return Err(ScriptError::BuiltinsSealed(name.to_owned()));
        }
        Arc::make_mut(&mut self.builtins).register(name, f);
        Ok(())
    }

    /// Run the parsed program from the start.
    ///
    /// May be called more than once; variables and procedures persist
    /// between runs.
    pub fn evaluate(&mut self) -> Result<Outcome, ScriptError> {
        let program = Arc::clone(&self.program);
        self.evaluate_program(&program)
    }

    /// Parse and run further source text at top level, sharing this
    /// interpreter's variables and procedures.  Parse errors count lines
    /// from the start of `source`.
    pub fn evaluate_source(&mut self, source: &str) -> Result<Outcome, ScriptError> {
        let program = parse(source)?;
        self.evaluate_program(&program)
    }

    fn evaluate_program(&mut self, program: &Program) -> Result<Outcome, ScriptError> {
        self.sealed = true;
        match self.run(program) {
            Ok(v) => Ok(Outcome::Normal(v)),
            Err(Signal::Return(v)) => Ok(Outcome::Return(v)),
            Err(Signal::Exit(v)) => Ok(Outcome::Exit(v)),
            Err(Signal::Break(_)) => Err(ScriptError::BreakOutsideLoop),
            Err(Signal::Continue(_)) => Err(ScriptError::ContinueOutsideLoop),
            Err(Signal::Error(e)) => Err(e),
        }
    }

    /// Parse and evaluate `text` in the current scope.
    pub fn eval(&mut self, text: &str) -> Result<String, Signal> {
        let program = parse(text)?;
        self.run(&program)
    }

    // ── Host accessors ────────────────────────────────────────────────────────

    pub fn get_var(&self, name: &str) -> Option<&str> {
        self.env.get(name)
    }

    pub fn set_var(&mut self, name: &str, value: impl Into<String>) {
        self.env.set(name, value);
    }

    /// Remove a variable from the innermost scope that holds it.
    pub fn unset_var(&mut self, name: &str) -> Option<String> {
        self.env.clear(name)
    }

    pub fn set_output(&mut self, sink: OutputSink) {
        self.output = sink;
    }

    /// Send `puts` output to an in-memory buffer.
    pub fn capture_output(&mut self) {
        self.output = OutputSink::Capture(Vec::new());
    }

    /// Drain captured output lines.  Empty unless capturing.
    pub fn take_output(&mut self) -> Vec<String> {
        match &mut self.output {
            OutputSink::Capture(lines) => std::mem::take(lines),
            _ => Vec::new(),
        }
    }

    /// Write one line to the output sink.
    pub fn write_line(&mut self, line: &str) -> Result<(), ScriptError> {
        self.output.write_line(line)?;
        Ok(())
    }

    /// Install a flag which, once set, stops evaluation with
    /// [`ScriptError::Interrupted`].
    pub fn set_interrupt(&mut self, flag: Arc<AtomicBool>) {
        self.interrupt = Some(flag);
    }

    pub fn set_max_depth(&mut self, depth: usize) {
        self.max_depth = depth;
    }

    pub fn has_builtin(&self, name: &str) -> bool {
        self.builtins.contains(name)
    }

    pub fn function(&self, name: &str) -> Option<&UserFunction> {
        self.functions.get(name).map(|f| f.as_ref())
    }

    /// Define (or redefine) a procedure.
    pub fn define_function(&mut self, name: &str, function: UserFunction) {
        tracing::debug!(name = %name, params = ?function.params, "define proc");
        if self.has_builtin(name) {
            tracing::warn!(name = %name, "proc is shadowed by a builtin of the same name");
        }
        self.functions.insert(name.to_owned(), Arc::new(function));
    }

    /// Fail with [`ScriptError::Interrupted`] if the interrupt flag is set.
    pub fn check_interrupt(&self) -> Result<(), ScriptError> {
        match &self.interrupt {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(ScriptError::Interrupted),
            _ => Ok(()),
        }
    }

    // ── Evaluation ────────────────────────────────────────────────────────────

    /// Evaluate a parsed program one nesting level deeper.
    pub(crate) fn run(&mut self, program: &Program) -> Result<String, Signal> {
        if self.depth >= self.max_depth {
            return Err(ScriptError::RecursionLimit(self.max_depth).into());
        }
        self.depth += 1;
        tracing::trace!(depth = self.depth, commands = program.len(), "eval");
        let result = stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, || self.run_commands(program));
        self.depth -= 1;
        result
    }

    fn run_commands(&mut self, program: &Program) -> Result<String, Signal> {
        let mut last = String::new();
        let mut produced = false;
        for cmd in program {
            self.check_interrupt()?;
            match self.exec_command(cmd) {
                Ok(v) => {
                    last = v;
                    produced = true;
                }
                Err(sig) if produced => return Err(sig.stamp(&last)),
                Err(sig) => return Err(sig),
            }
        }
        Ok(last)
    }

    fn exec_command(&mut self, cmd: &Command) -> Result<String, Signal> {
        let name = self.command_name(&cmd.command)?;

        let mut args = Vec::with_capacity(cmd.arguments.len());
        for arg in &cmd.arguments {
            args.push(self.expand_token(arg)?);
        }

        if let Some(f) = self.builtins.get(&name).cloned() {
            return self.call_builtin(&name, &f, &args);
        }

        if let Some(func) = self.functions.get(&name).cloned() {
            return self.call_function(&name, &func, &args);
        }

        let literal = matches!(
            cmd.command.kind,
            TokenKind::String | TokenKind::Number | TokenKind::Variable | TokenKind::Eval
        );
        if literal && args.is_empty() {
            return Ok(name);
        }

        Err(ScriptError::UnknownCommand(name).into())
    }

    /// Resolve the head token of a command to a name.
    fn command_name(&mut self, tok: &Token) -> Result<String, Signal> {
        match tok.kind {
            TokenKind::Variable | TokenKind::Eval => expand(&tok.literal, self),
            TokenKind::Block => Err(ScriptError::InvalidCommand(tok.literal.clone()).into()),
            _ => Ok(tok.literal.clone()),
        }
    }

    fn expand_token(&mut self, tok: &Token) -> Result<String, Signal> {
        match tok.kind {
            TokenKind::Block => Ok(tok.literal.clone()),
            _ => expand(&tok.literal, self),
        }
    }

    fn call_builtin(&mut self, name: &str, f: &BuiltinFn, args: &[String]) -> Result<String, Signal> {
        f(self, args).map_err(|sig| match sig {
            Signal::Error(e) => Signal::Error(e.in_command(name)),
            other => other,
        })
    }

    fn call_function(
        &mut self,
        name: &str,
        func: &UserFunction,
        args: &[String],
    ) -> Result<String, Signal> {
        if args.len() != func.params.len() {
            return Err(ScriptError::FunctionArity {
                name: name.to_owned(),
                expected: func.params.len(),
                got: args.len(),
            }
            .into());
        }

        tracing::debug!(name = %name, args = ?args, depth = self.depth, "call proc");
        self.env.push_frame();
        for (param, value) in func.params.iter().zip(args) {
            self.env.set_local(param, value.as_str());
        }
        let result = self.run(&func.program);
        self.env.pop_frame();

        match result {
            Ok(v) | Err(Signal::Return(v)) => Ok(v),
            Err(Signal::Break(_)) => Err(ScriptError::BreakOutsideLoop.into()),
            Err(Signal::Continue(_)) => Err(ScriptError::ContinueOutsideLoop.into()),
            Err(other) => Err(other),
        }
    }
}

impl ExpandContext for Interpreter {
    fn var(&self, name: &str) -> Option<&str> {
        self.env.get(name)
    }

    fn eval(&mut self, script: &str) -> Result<String, Signal> {
        Interpreter::eval(self, script)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
