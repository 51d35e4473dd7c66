//! Command-line argument parsing and runner configuration.
//!
//! Usage:
//!   critical [-n] [-d] [-f[<file>]] [-L<file>] [-c<cmd>] [<script>]

use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};

use crate::script::{Interpreter, Outcome, ScriptError};
use crate::stdlib;

/// Environment variable naming a standard library file to use instead of
/// the embedded one.
pub const STDLIB_ENV: &str = "CRITICAL_STDLIB";

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "CRITICAL_LOG";

pub const USAGE: &str = "Usage: critical [-n] [-d] [-f[<file>]] [-L<file>] [-c<cmd>] [<script>]";

// ── Public types ──────────────────────────────────────────────────────────────

/// Parsed command-line arguments.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Standard library override (`-L<file>`).
    pub stdlib: Option<PathBuf>,
    /// Do not load the standard library at all (`-n`).
    pub no_stdlib: bool,
    /// Which user init script to load.
    pub config: ConfigFile,
    /// Script text to run instead of a file (`-c<cmd>`).
    pub command: Option<String>,
    /// Debug logging (`-d`).
    pub debug: bool,
    /// Script file to run; stdin when absent.
    pub script: Option<PathBuf>,
}

/// How to choose the user init script.
#[derive(Debug, Default)]
pub enum ConfigFile {
    /// Look in the platform config dir, then `~/.criticalrc` (default).
    #[default]
    Search,
    /// `-f` with no file argument: no init script.
    Skip,
    /// `-f<file>`: load this specific file.
    Explicit(PathBuf),
}

/// Where the main script comes from.
#[derive(Debug, PartialEq, Eq)]
pub enum Source {
    Command(String),
    File(PathBuf),
    Stdin,
}

impl CliArgs {
    pub fn source(&self) -> Source {
        match (&self.command, &self.script) {
            (Some(cmd), _) => Source::Command(cmd.clone()),
            (None, Some(path)) => Source::File(path.clone()),
            (None, None) => Source::Stdin,
        }
    }
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse `std::env::args()` and return [`CliArgs`] or an error message.
pub fn parse_args() -> Result<CliArgs, String> {
    let raw: Vec<String> = std::env::args().collect();
    parse_argv(raw.get(1..).unwrap_or_default())
}

/// Parse a slice of argument strings (exposed for testing).
pub fn parse_argv(argv: &[String]) -> Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut positional: Vec<String> = Vec::new();
    let mut i = 0;

    while i < argv.len() {
        let arg = argv[i].as_str();

        // `--` ends flag processing.
        if arg == "--" {
            positional.extend(argv[i + 1..].iter().cloned());
            break;
        }

        // Non-flag argument.
        if !arg.starts_with('-') || arg == "-" {
            positional.push(arg.to_owned());
            i += 1;
            continue;
        }

        // Flag argument: iterate over characters after the leading `-`.
        let chars: Vec<char> = arg[1..].chars().collect();
        let mut j = 0;
        while j < chars.len() {
            match chars[j] {
                'd' => args.debug = true,
                'n' => args.no_stdlib = true,

                // -f[<file>]
                'f' => {
                    if j + 1 < chars.len() {
                        let file: String = chars[j + 1..].iter().collect();
                        args.config = ConfigFile::Explicit(PathBuf::from(file));
                        j = chars.len();
                    } else {
                        args.config = ConfigFile::Skip;
                    }
                }

                // -c<cmd>
                'c' => {
                    let cmd = if j + 1 < chars.len() {
                        let s: String = chars[j + 1..].iter().collect();
                        j = chars.len();
                        s
                    } else if i + 1 < argv.len() {
                        i += 1;
                        argv[i].clone()
                    } else {
                        return Err("-c requires a command argument".to_owned());
                    };
                    args.command = Some(cmd);
                }

                // -L<file>
                'L' => {
                    let file = if j + 1 < chars.len() {
                        let s: String = chars[j + 1..].iter().collect();
                        j = chars.len();
                        s
                    } else if i + 1 < argv.len() {
                        i += 1;
                        argv[i].clone()
                    } else {
                        return Err("-L requires a file argument".to_owned());
                    };
                    args.stdlib = Some(PathBuf::from(file));
                }

                c => return Err(format!("unknown option: -{c}")),
            }
            j += 1;
        }
        i += 1;
    }

    match positional.len() {
        0 => {}
        1 => args.script = positional.pop().map(PathBuf::from),
        n => return Err(format!("too many arguments ({n})")),
    }

    Ok(args)
}

// ── Path helpers ──────────────────────────────────────────────────────────────

/// Candidate locations for the user init script, in search order.
pub fn user_config_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dirs) = ProjectDirs::from("", "", "critical") {
        candidates.push(dirs.config_dir().join("init.tcl"));
    }
    if let Some(base) = BaseDirs::new() {
        candidates.push(base.home_dir().join(".criticalrc"));
    }
    candidates
}

/// Search for the user init script in the standard locations.
/// Returns the first path that exists, or `None`.
pub fn find_user_config() -> Option<PathBuf> {
    user_config_candidates().into_iter().find(|p| p.exists())
}

/// Determine where the standard library comes from.
///
/// Priority: `-L<file>` CLI flag → `CRITICAL_STDLIB` env var → `None`, which
/// means the copy embedded in the binary.
pub fn resolve_stdlib(cli_override: Option<&PathBuf>) -> Option<PathBuf> {
    if let Some(p) = cli_override {
        return Some(p.clone());
    }
    std::env::var_os(STDLIB_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("can't read {}: {e}", path.display()))
}

/// Scripts run ahead of the main script: the standard library and the user
/// init script, as configured.  Each is kept separate so that parse errors
/// report lines relative to their own file.
pub fn load_prologue(args: &CliArgs) -> Result<Vec<String>, String> {
    let mut parts = Vec::new();

    if !args.no_stdlib {
        match resolve_stdlib(args.stdlib.as_ref()) {
            Some(path) => parts.push(read_file(&path)?),
            None => parts.push(stdlib::embedded().to_owned()),
        }
    }

    match &args.config {
        ConfigFile::Skip => {}
        ConfigFile::Explicit(path) => parts.push(read_file(path)?),
        ConfigFile::Search => {
            if let Some(path) = find_user_config() {
                tracing::debug!(path = %path.display(), "loading init script");
                parts.push(read_file(&path)?);
            }
        }
    }

    Ok(parts)
}

/// Read the main script.  Stdin is read by the caller.
pub fn load_source(source: &Source) -> Result<Option<String>, String> {
    match source {
        Source::Command(cmd) => Ok(Some(cmd.clone())),
        Source::File(path) => read_file(path).map(Some),
        Source::Stdin => Ok(None),
    }
}

// ── Running ───────────────────────────────────────────────────────────────────

/// Run each prologue script and then `script` in one interpreter.  An `exit`
/// or an error in the prologue stops before the main script.
pub fn run(prologue: &[String], script: &str) -> Result<Outcome, ScriptError> {
    let mut interp = Interpreter::new("")?;
    for part in prologue {
        if let Outcome::Exit(v) = interp.evaluate_source(part)? {
            return Ok(Outcome::Exit(v));
        }
    }
    interp.evaluate_source(script)
}

// ── Reporting ─────────────────────────────────────────────────────────────────

/// What the runner prints and how it exits after an evaluation.
#[derive(Debug, PartialEq, Eq)]
pub struct Report {
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub code: i32,
}

/// Turn the result of [`run`] into a [`Report`].
///
/// An integer `exit` value becomes the process exit code.  Values outside
/// `0..=255` cannot be represented by the OS and are reported as 255.
pub fn report(result: Result<Outcome, ScriptError>) -> Report {
    let printed = |v: String| if v.is_empty() { None } else { Some(v) };
    match result {
        Ok(Outcome::Normal(v)) | Ok(Outcome::Return(v)) => {
            Report { stdout: printed(v), stderr: None, code: 0 }
        }
        Ok(Outcome::Exit(v)) => match v.trim().parse::<i32>() {
            Ok(code) => {
                let code = if (0..=255).contains(&code) { code } else { 255 };
                Report { stdout: None, stderr: None, code }
            }
            Err(_) => Report { stdout: printed(v), stderr: None, code: 0 },
        },
        Err(e) => Report { stdout: None, stderr: Some(format!("critical: {e}")), code: 1 },
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
