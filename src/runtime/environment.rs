use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::runtime::Value;

/// Variable storage for a running program
///
/// Holds the global scope and a stack of call frames. Outside a call every
/// lookup and assignment goes to the globals. Inside a call, lookups check
/// the frame's locals first and then the snapshot of globals the callee
/// captured when it was defined; assignments always land in the locals.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Global scope
    globals: HashMap<String, Value>,
    /// Active call frames, innermost last
    frames: Vec<Frame>,
}

/// Single call frame
#[derive(Debug, Clone)]
struct Frame {
    /// Parameters and variables assigned during the call
    locals: HashMap<String, Value>,
    /// Globals as they were when the function was defined
    captured: Arc<HashMap<String, Value>>,
}

impl Environment {
    /// Creates a new environment with the predefined constants bound
    pub fn new() -> Self {
        let mut env = Environment {
            globals: HashMap::new(),
            frames: Vec::new(),
        };
        env.bind_constants();
        env
    }

    fn bind_constants(&mut self) {
        self.globals
            .insert("pi".to_string(), Value::Float(std::f64::consts::PI));
        self.globals
            .insert("e".to_string(), Value::Float(std::f64::consts::E));
    }

    /// Gets the value of a variable by name
    pub fn get(&self, name: &str) -> Result<Value> {
        let found = match self.frames.last() {
            Some(frame) => frame
                .locals
                .get(name)
                .or_else(|| frame.captured.get(name)),
            None => self.globals.get(name),
        };

        found.cloned().ok_or_else(|| Error::UndefinedVariable {
            name: name.to_string(),
        })
    }

    /// Checks if a variable is visible from the current scope
    pub fn exists(&self, name: &str) -> bool {
        self.get(name).is_ok()
    }

    /// Binds a variable in the innermost scope (current frame, else globals)
    pub fn set(&mut self, name: &str, value: Value) {
        match self.frames.last_mut() {
            Some(frame) => frame.locals.insert(name.to_string(), value),
            None => self.globals.insert(name.to_string(), value),
        };
    }

    /// Copies the current globals for a function definition to capture
    pub fn snapshot_globals(&self) -> Arc<HashMap<String, Value>> {
        Arc::new(self.globals.clone())
    }

    /// Enters a call frame with the given parameter bindings
    pub fn push_frame(&mut self, locals: HashMap<String, Value>, captured: Arc<HashMap<String, Value>>) {
        self.frames.push(Frame { locals, captured });
    }

    /// Leaves the innermost call frame
    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    /// Number of active call frames
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// True while a function body is executing
    pub fn in_call(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Global variables sorted by name
    pub fn variables(&self) -> BTreeMap<String, Value> {
        self.globals
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Drops every user variable and frame; the constants are rebound
    pub fn clear(&mut self) {
        self.globals.clear();
        self.frames.clear();
        self.bind_constants();
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
