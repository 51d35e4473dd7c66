//! Built-in commands.
//!
//! Every builtin receives the interpreter and its already-expanded arguments
//! and returns `Result<String, Signal>`.  Control commands (`break`,
//! `return`, ...) work by returning the matching [`Signal`]; the loop
//! builtins and procedure calls are where those signals are caught.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;

use super::{
    error::{ScriptError, Signal},
    interp::{Interpreter, UserFunction},
    parser::parse,
    value::{bool_str, format_number, is_true, parse_number},
};

/// A host function callable as a command.
pub type BuiltinFn =
    Arc<dyn Fn(&mut Interpreter, &[String]) -> Result<String, Signal> + Send + Sync>;

// ── BuiltinTable ──────────────────────────────────────────────────────────────

/// Name → host function.
#[derive(Clone, Default)]
pub struct BuiltinTable {
    table: HashMap<String, BuiltinFn>,
}

impl BuiltinTable {
    /// A table with no commands at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// The language's own commands.
    pub fn standard() -> Self {
        let mut t = Self::new();
        t.register("#", comment);
        t.register("//", comment);
        t.register("append", append);
        t.register("break", break_);
        t.register("continue", continue_);
        t.register("decr", decr);
        t.register("env", env);
        t.register("eval", eval);
        t.register("exit", exit);
        t.register("expr", expr);
        t.register("for", for_);
        t.register("if", if_);
        t.register("incr", incr);
        t.register("proc", proc_);
        t.register("puts", puts);
        t.register("regexp", regexp);
        t.register("return", return_);
        t.register("set", set);
        t.register("unset", unset);
        t.register("while", while_);
        t
    }

    /// Add or replace a command.
    pub fn register<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&mut Interpreter, &[String]) -> Result<String, Signal> + Send + Sync + 'static,
    {
        self.table.insert(name.to_owned(), Arc::new(f));
    }

    pub fn get(&self, name: &str) -> Option<&BuiltinFn> {
        self.table.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.table.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for BuiltinTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn arity(
    command: &str,
    args: &[String],
    counts: &[usize],
    expected: &'static str,
) -> Result<(), ScriptError> {
    if counts.contains(&args.len()) {
        Ok(())
    } else {
        Err(ScriptError::Arity { command: command.to_owned(), expected, got: args.len() })
    }
}

// ── Variables ─────────────────────────────────────────────────────────────────

fn set(interp: &mut Interpreter, args: &[String]) -> Result<String, Signal> {
    arity("set", args, &[1, 2], "1 or 2 arguments")?;
    match args {
        [name, value] => {
            interp.set_var(name, value.as_str());
            Ok(value.clone())
        }
        _ => Ok(interp.get_var(&args[0]).unwrap_or_default().to_owned()),
    }
}

fn unset(interp: &mut Interpreter, args: &[String]) -> Result<String, Signal> {
    arity("unset", args, &[1], "1 argument")?;
    interp.unset_var(&args[0]);
    Ok(String::new())
}

fn append(interp: &mut Interpreter, args: &[String]) -> Result<String, Signal> {
    let Some((name, rest)) = args.split_first() else {
        return Err(ScriptError::Arity {
            command: "append".into(),
            expected: "at least 1 argument",
            got: 0,
        }
        .into());
    };
    let mut value = interp.get_var(name).unwrap_or_default().to_owned();
    for piece in rest {
        value.push_str(piece);
    }
    interp.set_var(name, value.as_str());
    Ok(value)
}

fn incr(interp: &mut Interpreter, args: &[String]) -> Result<String, Signal> {
    adjust(interp, args, "incr", 1.0)
}

fn decr(interp: &mut Interpreter, args: &[String]) -> Result<String, Signal> {
    adjust(interp, args, "decr", -1.0)
}

/// Shared body of `incr` and `decr`.  An unbound or empty variable counts as 0.
fn adjust(
    interp: &mut Interpreter,
    args: &[String],
    command: &str,
    sign: f64,
) -> Result<String, Signal> {
    arity(command, args, &[1, 2], "1 or 2 arguments")?;
    let name = &args[0];
    let current = match interp.get_var(name) {
        None | Some("") => 0.0,
        Some(v) => parse_number(v)?,
    };
    let step = match args.get(1) {
        Some(s) => parse_number(s)?,
        None => 1.0,
    };
    let value = format_number(current + sign * step);
    interp.set_var(name, value.as_str());
    Ok(value)
}

fn env(_interp: &mut Interpreter, args: &[String]) -> Result<String, Signal> {
    arity("env", args, &[1], "1 argument")?;
    Ok(std::env::var(&args[0]).unwrap_or_default())
}

// ── Expressions ───────────────────────────────────────────────────────────────

fn expr(_interp: &mut Interpreter, args: &[String]) -> Result<String, Signal> {
    arity("expr", args, &[3], "3 arguments")?;
    let (lhs, op, rhs) = (&args[0], args[1].as_str(), &args[2]);

    match op {
        "eq" => return Ok(bool_str(lhs == rhs)),
        "ne" => return Ok(bool_str(lhs != rhs)),
        "+" | "-" | "*" | "/" | "%" | "<" | "<=" | ">" | ">=" | "==" | "!=" => {}
        _ => {
            return Err(ScriptError::UnknownOperation {
                lhs: lhs.clone(),
                op: op.to_owned(),
                rhs: rhs.clone(),
            }
            .into())
        }
    }

    let a = parse_number(lhs)?;
    let b = parse_number(rhs)?;

    let result = match op {
        "+" => format_number(a + b),
        "-" => format_number(a - b),
        "*" => format_number(a * b),
        "/" | "%" if b == 0.0 => return Err(ScriptError::DivisionByZero.into()),
        "/" => format_number(a / b),
        "%" => format_number(a % b),
        "<" => bool_str(a < b),
        "<=" => bool_str(a <= b),
        ">" => bool_str(a > b),
        ">=" => bool_str(a >= b),
        "==" => bool_str(a == b),
        _ => bool_str(a != b),
    };
    Ok(result)
}

fn regexp(_interp: &mut Interpreter, args: &[String]) -> Result<String, Signal> {
    arity("regexp", args, &[2], "2 arguments")?;
    let re = Regex::new(&args[0])?;
    Ok(bool_str(re.is_match(&args[1])))
}

// ── Control flow ──────────────────────────────────────────────────────────────

fn if_(interp: &mut Interpreter, args: &[String]) -> Result<String, Signal> {
    arity("if", args, &[2, 4], "2 or 4 arguments")?;
    if args.len() == 4 && args[2] != "else" {
        return Err(ScriptError::ExpectedElse(args[2].clone()).into());
    }

    let test = interp.eval(&args[0])?;
    if is_true(&test) {
        interp.eval(&args[1])
    } else if let Some(alternative) = args.get(3) {
        interp.eval(alternative)
    } else {
        Ok(String::new())
    }
}

fn while_(interp: &mut Interpreter, args: &[String]) -> Result<String, Signal> {
    arity("while", args, &[2], "2 arguments")?;
    run_loop(interp, &args[0], None, &args[1])
}

fn for_(interp: &mut Interpreter, args: &[String]) -> Result<String, Signal> {
    arity("for", args, &[4], "4 arguments")?;
    interp.eval(&args[0])?;
    run_loop(interp, &args[1], Some(&args[2]), &args[3])
}

/// The loop shared by `while` and `for`.  Returns the last value produced by
/// the body.
fn run_loop(
    interp: &mut Interpreter,
    cond: &str,
    step: Option<&str>,
    body: &str,
) -> Result<String, Signal> {
    let cond = parse(cond)?;
    let body = parse(body)?;
    let step = step.map(parse).transpose()?;

    let mut last = String::new();
    loop {
        interp.check_interrupt()?;
        if !is_true(&interp.run(&cond)?) {
            break;
        }
        match interp.run(&body) {
            Ok(v) => last = v,
            Err(Signal::Break(v)) => {
                if let Some(v) = v {
                    last = v;
                }
                break;
            }
            Err(Signal::Continue(v)) => {
                if let Some(v) = v {
                    last = v;
                }
            }
            Err(other) => return Err(other),
        }
        if let Some(step) = &step {
            interp.run(step)?;
        }
    }
    Ok(last)
}

fn break_(_interp: &mut Interpreter, args: &[String]) -> Result<String, Signal> {
    arity("break", args, &[0], "no arguments")?;
    Err(Signal::Break(None))
}

fn continue_(_interp: &mut Interpreter, args: &[String]) -> Result<String, Signal> {
    arity("continue", args, &[0], "no arguments")?;
    Err(Signal::Continue(None))
}

fn return_(_interp: &mut Interpreter, args: &[String]) -> Result<String, Signal> {
    arity("return", args, &[1], "1 argument")?;
    Err(Signal::Return(args[0].clone()))
}

fn exit(_interp: &mut Interpreter, args: &[String]) -> Result<String, Signal> {
    arity("exit", args, &[1], "1 argument")?;
    Err(Signal::Exit(args[0].clone()))
}

// ── Procedures and evaluation ─────────────────────────────────────────────────

fn proc_(interp: &mut Interpreter, args: &[String]) -> Result<String, Signal> {
    arity("proc", args, &[3], "3 arguments")?;
    let params = args[1].split_whitespace().map(str::to_owned).collect();
    let function = UserFunction::new(params, args[2].clone())?;
    interp.define_function(&args[0], function);
    Ok(String::new())
}

fn eval(interp: &mut Interpreter, args: &[String]) -> Result<String, Signal> {
    arity("eval", args, &[1], "1 argument")?;
    interp.eval(&args[0])
}

// ── Output ────────────────────────────────────────────────────────────────────

fn puts(interp: &mut Interpreter, args: &[String]) -> Result<String, Signal> {
    arity("puts", args, &[1], "1 argument")?;
    interp.write_line(&args[0])?;
    Ok(args[0].clone())
}

fn comment(_interp: &mut Interpreter, _args: &[String]) -> Result<String, Signal> {
    Ok(String::new())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
