//! Builtin functions for QOR
//!
//! Host functions live under reserved names that user code cannot redefine.
//! Each one implements [`Builtin`] and is registered by name in a
//! [`BuiltinRegistry`].

pub mod convert;
pub mod introspection;
pub mod math;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::runtime::Value;

/// Number of arguments a builtin accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many
    Exact(usize),
    /// Between the two bounds, inclusive
    Between(usize, usize),
    /// This many or more
    AtLeast(usize),
}

impl Arity {
    /// True if `count` arguments are acceptable
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exact(n) => count == n,
            Arity::Between(min, max) => (min..=max).contains(&count),
            Arity::AtLeast(min) => count >= min,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{}", n),
            Arity::Between(min, max) => write!(f, "{} to {}", min, max),
            Arity::AtLeast(min) => write!(f, "at least {}", min),
        }
    }
}

/// Builtin trait - every host function implements this
pub trait Builtin: Send + Sync {
    /// Name the function is called by
    fn name(&self) -> &str;

    /// One-line description, shown by the shell's `help`
    fn description(&self) -> &str;

    /// Accepted argument counts
    fn arity(&self) -> Arity;

    /// Execute the builtin on already-evaluated arguments
    fn call(&self, args: &[Value]) -> Result<Value>;
}

/// Builtin registry
pub struct BuiltinRegistry {
    builtins: HashMap<String, Arc<dyn Builtin>>,
}

impl BuiltinRegistry {
    /// Create new registry with every standard builtin
    pub fn new() -> Self {
        let mut registry = BuiltinRegistry::empty();

        math::register(&mut registry);
        convert::register(&mut registry);
        introspection::register(&mut registry);

        registry
    }

    /// Create empty registry (for testing)
    pub fn empty() -> Self {
        BuiltinRegistry {
            builtins: HashMap::new(),
        }
    }

    /// Register a builtin
    pub fn register<T: Builtin + 'static>(&mut self, builtin: T) {
        let name = builtin.name().to_string();
        self.builtins.insert(name, Arc::new(builtin));
    }

    /// Get builtin by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Builtin>> {
        self.builtins.get(name).cloned()
    }

    /// Check if a builtin exists
    pub fn has(&self, name: &str) -> bool {
        self.builtins.contains_key(name)
    }

    /// Checks the argument count and invokes the builtin
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        let builtin = self.get(name).ok_or_else(|| Error::UndefinedFunction {
            name: name.to_string(),
        })?;

        let arity = builtin.arity();
        if !arity.accepts(args.len()) {
            return Err(Error::ArgumentCountMismatch {
                name: name.to_string(),
                expected: arity.to_string(),
                got: args.len(),
            });
        }

        builtin.call(args)
    }

    /// List all builtin names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.builtins.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get builtin count
    pub fn count(&self) -> usize {
        self.builtins.len()
    }
}

impl Default for BuiltinRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts a float argument or fails with the builtin's name
pub(crate) fn float_arg(name: &str, value: &Value) -> Result<f64> {
    value
        .as_float()
        .map_err(|_| Error::builtin(name, format!("expected a number, got {}", value.type_name())))
}

/// Converts a float to an int, rejecting nan, infinities and out-of-range values
pub(crate) fn float_to_int(name: &str, f: f64) -> Result<i64> {
    if !f.is_finite() || f < i64::MIN as f64 || f >= i64::MAX as f64 {
        return Err(Error::builtin(name, format!("cannot convert {} to int", f)));
    }
    Ok(f as i64)
}
