//! Variable scopes.
//!
//! The environment is a stack of frames.  Frame 0 is the global scope and
//! lives as long as the interpreter; each procedure call pushes one frame and
//! pops it on return.  Lookups walk the stack from the innermost frame out.

use std::collections::HashMap;

#[derive(Debug, Default)]
struct Frame {
    vars: HashMap<String, String>,
}

/// A chain of variable scopes, innermost last.
#[derive(Debug)]
pub struct Environment {
    frames: Vec<Frame>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// An environment with only the global scope.
    pub fn new() -> Self {
        Environment { frames: vec![Frame::default()] }
    }

    /// Enter a child scope.
    pub fn push_frame(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Leave the innermost child scope.  The global scope is never popped.
    pub fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .find_map(|f| f.vars.get(name))
            .map(String::as_str)
    }

    /// Assign `name`.  An existing binding anywhere in the chain is updated
    /// in place; otherwise the variable is created in the innermost frame.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        for frame in self.frames.iter_mut().rev() {
            if let Some(slot) = frame.vars.get_mut(name) {
                *slot = value;
                return;
            }
        }
        self.set_local(name, value);
    }

    /// Bind `name` in the innermost frame, shadowing any outer binding.
    pub fn set_local(&mut self, name: &str, value: impl Into<String>) {
        if let Some(frame) = self.frames.last_mut() {
            frame.vars.insert(name.to_owned(), value.into());
        }
    }

    /// Remove `name` from the innermost frame that holds it.  Returns the old
    /// value, if there was one.
    pub fn clear(&mut self, name: &str) -> Option<String> {
        self.frames.iter_mut().rev().find_map(|f| f.vars.remove(name))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
