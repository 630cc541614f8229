//! Introspection builtins

use super::{Arity, Builtin, BuiltinRegistry};
use crate::error::{Error, Result};
use crate::runtime::Value;

/// Register introspection builtins
pub fn register(registry: &mut BuiltinRegistry) {
    registry.register(LenBuiltin);
    registry.register(TypeBuiltin);
}

/// Length of a string, list, dict or range
///
/// Usage: `len(value) -> int`
/// Example: `len([1, 2, 3])` returns `3`
pub struct LenBuiltin;

impl Builtin for LenBuiltin {
    fn name(&self) -> &str {
        "len"
    }

    fn description(&self) -> &str {
        "Number of elements"
    }

    fn arity(&self) -> Arity {
        Arity::Exact(1)
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        let length = args[0].len()?;
        i64::try_from(length)
            .map(Value::Int)
            .map_err(|_| Error::Overflow {
                op: "len".to_string(),
            })
    }
}

/// Name of a value's type
///
/// Usage: `type(value) -> string`
/// Example: `type(1.5)` returns `"float"`
pub struct TypeBuiltin;

impl Builtin for TypeBuiltin {
    fn name(&self) -> &str {
        "type"
    }

    fn description(&self) -> &str {
        "Type name of a value"
    }

    fn arity(&self) -> Arity {
        Arity::Exact(1)
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        Ok(Value::from(args[0].type_name()))
    }
}
