use std::collections::HashMap;

use tracing::trace;

use crate::value::Value;

/// Lexical scope chain as an explicit stack of frames.
///
/// The last frame is the innermost. The root frame is created with the scope
/// and is never popped, so lookups always have somewhere to start.
#[derive(Debug, Clone)]
pub struct Scope {
    frames: Vec<HashMap<String, Value>>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    pub fn new() -> Self {
        Scope {
            frames: vec![HashMap::new()],
        }
    }

    /// Number of frames, root included.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push(&mut self) {
        self.frames.push(HashMap::new());
        trace!(depth = self.frames.len(), "scope push");
    }

    /// Discard the innermost frame and its bindings. The root frame stays.
    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
        trace!(depth = self.frames.len(), "scope pop");
    }

    /// Look `name` up from the innermost frame outwards.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name).copied())
    }

    /// Bind `name` in the innermost frame, shadowing any outer binding.
    pub fn set(&mut self, name: &str, value: Value) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string(), value);
        }
    }

    /// Overwrite the nearest existing binding of `name`. Returns `false`
    /// when no frame binds it.
    pub fn update(&mut self, name: &str, value: Value) -> bool {
        match self
            .frames
            .iter_mut()
            .rev()
            .find_map(|frame| frame.get_mut(name))
        {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}
