//! Numeric helpers.
//!
//! Every script value is a string.  Arithmetic parses operands as `f64` on
//! demand and formats the result back: as an integer when the result is
//! integral, otherwise with six decimal places (`6.400000`).

use super::error::ScriptError;

/// Integral results at or beyond this magnitude are printed with decimals,
/// since they no longer fit an `i64`.
const I64_LIMIT: f64 = 9.2e18;

/// Parse `s` as a number.  Surrounding whitespace is ignored.
pub fn parse_number(s: &str) -> Result<f64, ScriptError> {
    let t = s.trim();
    t.parse::<f64>()
        .ok()
        .filter(|n| !t.is_empty() && !is_special(t) && n.is_finite())
        .ok_or_else(|| ScriptError::NotANumber(s.to_owned()))
}

/// `inf`, `nan` and friends parse as `f64` but are not script numbers.
fn is_special(t: &str) -> bool {
    t.bytes().any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E')
}

/// Format `n` as an integer if it is integral, else with six decimals.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < I64_LIMIT {
        format!("{}", n as i64)
    } else {
        format!("{n:.6}")
    }
}

/// Truth test shared by `if`, `while` and `for`: empty and `"0"` are false.
pub fn is_true(s: &str) -> bool {
    !s.is_empty() && s != "0"
}

/// `"1"` or `"0"`.
pub fn bool_str(b: bool) -> String {
    if b { "1" } else { "0" }.to_owned()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
