//! Argument expansion.
//!
//! Every non-block argument goes through two passes before a command sees it:
//!
//! | Sequence     | Meaning                                              |
//! |--------------|------------------------------------------------------|
//! | `$name`      | Value of variable `name` (ASCII alphanumerics, `_`)  |
//! | `${name}`    | Same, braced form                                    |
//! | `$$`         | Literal `$`                                          |
//! | `[script]`   | Result of evaluating `script`, innermost first       |
//!
//! Unbound variables expand to the empty string.  A `$` that starts none of
//! the forms above is kept as written, as are unmatched brackets.

use super::error::Signal;

/// What expansion needs from the interpreter.
pub trait ExpandContext {
    /// Current value of variable `name`.
    fn var(&self, name: &str) -> Option<&str>;
    /// Evaluate `script` and return its value.
    fn eval(&mut self, script: &str) -> Result<String, Signal>;
}

/// Variable substitution followed by bracket expansion.
pub fn expand(src: &str, ctx: &mut dyn ExpandContext) -> Result<String, Signal> {
    let substituted = substitute_vars(src, ctx);
    expand_brackets(&substituted, ctx)
}

/// Replace `$name`, `${name}` and `$$` in `src`.
pub fn substitute_vars(src: &str, ctx: &dyn ExpandContext) -> String {
    if !src.contains('$') {
        return src.to_owned();
    }

    let mut out = String::with_capacity(src.len());
    let mut rest = src;

    while let Some(i) = rest.find('$') {
        out.push_str(&rest[..i]);
        let after = &rest[i + 1..];

        if let Some(tail) = after.strip_prefix('$') {
            out.push('$');
            rest = tail;
            continue;
        }

        if let Some(braced) = after.strip_prefix('{') {
            if let Some(end) = braced.find('}') {
                let name = &braced[..end];
                if is_name(name) {
                    out.push_str(ctx.var(name).unwrap_or(""));
                    rest = &braced[end + 1..];
                    continue;
                }
            }
            out.push('$');
            rest = after;
            continue;
        }

        let len = after.bytes().take_while(|&b| is_name_byte(b)).count();
        if len == 0 {
            out.push('$');
        } else {
            out.push_str(ctx.var(&after[..len]).unwrap_or(""));
        }
        rest = &after[len..];
    }

    out.push_str(rest);
    out
}

/// Replace every `[...]` in `src` with the value of evaluating its contents.
///
/// Pairs are resolved innermost first and left to right.  Text produced by an
/// evaluation is inserted verbatim and is not scanned again on its own; it
/// only becomes code again as part of an enclosing bracket.
pub fn expand_brackets(src: &str, ctx: &mut dyn ExpandContext) -> Result<String, Signal> {
    if !src.contains('[') {
        return Ok(src.to_owned());
    }

    let mut out = String::with_capacity(src.len());
    let mut opens: Vec<usize> = Vec::new();

    for ch in src.chars() {
        match ch {
            '[' => {
                opens.push(out.len());
                out.push('[');
            }
            ']' => match opens.pop() {
                Some(start) => {
                    let inner = out[start + 1..].to_owned();
                    out.truncate(start);
                    let value = ctx.eval(&inner)?;
                    out.push_str(&value);
                }
                None => out.push(']'),
            },
            c => out.push(c),
        }
    }

    Ok(out)
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_name(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(is_name_byte)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
