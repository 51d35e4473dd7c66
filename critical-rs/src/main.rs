use std::io::Read;

use tracing_subscriber::EnvFilter;

use critical::cli::{self, Source};

fn main() {
    let args = match cli::parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("critical: {e}");
            eprintln!("{}", cli::USAGE);
            std::process::exit(2);
        }
    };

    // ── Logging ───────────────────────────────────────────────────────────────
    let filter = EnvFilter::try_from_env(cli::LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(if args.debug { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // ── Assemble the program ──────────────────────────────────────────────────
    let prologue = match cli::load_prologue(&args) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("critical: {e}");
            std::process::exit(1);
        }
    };

    let source = args.source();
    let script = match cli::load_source(&source) {
        Ok(Some(s)) => s,
        Ok(None) => {
            let mut s = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut s) {
                eprintln!("critical: can't read stdin: {e}");
                std::process::exit(1);
            }
            s
        }
        Err(e) => {
            eprintln!("critical: {e}");
            std::process::exit(1);
        }
    };
    if let Source::File(path) = &source {
        tracing::debug!(path = %path.display(), "running script");
    }

    // ── Run ───────────────────────────────────────────────────────────────────
    let report = cli::report(cli::run(&prologue, &script));
    if let Some(out) = report.stdout {
        println!("{out}");
    }
    if let Some(err) = report.stderr {
        eprintln!("{err}");
    }
    std::process::exit(report.code);
}
