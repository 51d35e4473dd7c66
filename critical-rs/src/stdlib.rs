//! The standard library script.
//!
//! `lib/critical/stdlib.tcl` is baked into the binary at compile time via
//! `include_str!()`, so the runner works without any installed files.
//!
//! # Resolution order (see [`cli::resolve_stdlib`](crate::cli::resolve_stdlib))
//! 1. `-L<file>` CLI flag         → read that file
//! 2. `$CRITICAL_STDLIB` env var  → read that file
//! 3. **This embedded copy**

/// Source of the embedded standard library.
pub const STDLIB: &str = include_str!("../../lib/critical/stdlib.tcl");

/// The embedded standard library source.
pub fn embedded() -> &'static str {
    STDLIB
}

// ── Tests ─────────────────────────────────────────────────────────────────────
