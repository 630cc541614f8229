//! Type conversion builtins

use super::{float_to_int, Arity, Builtin, BuiltinRegistry};
use crate::error::{Error, Result};
use crate::runtime::Value;

/// Register conversion builtins
pub fn register(registry: &mut BuiltinRegistry) {
    registry.register(IntBuiltin);
    registry.register(FloatBuiltin);
    registry.register(StrBuiltin);
    registry.register(BoolBuiltin);
    registry.register(ListBuiltin);
}

/// Converts to an integer; floats truncate toward zero
///
/// Usage: `int(value) -> int`
/// Example: `int("42")` returns `42`, `int(3.9)` returns `3`
pub struct IntBuiltin;

impl Builtin for IntBuiltin {
    fn name(&self) -> &str {
        "int"
    }

    fn description(&self) -> &str {
        "Convert to integer"
    }

    fn arity(&self) -> Arity {
        Arity::Exact(1)
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        match &args[0] {
            Value::Int(n) => Ok(Value::Int(*n)),
            Value::Float(f) => Ok(Value::Int(float_to_int("int", f.trunc())?)),
            Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
            Value::String(s) => s.trim().parse().map(Value::Int).map_err(|_| {
                Error::builtin("int", format!("invalid literal for int(): {}", args[0].repr()))
            }),
            other => Err(Error::type_error("number, bool or string", other.type_name())),
        }
    }
}

/// Converts to a float
///
/// Usage: `float(value) -> float`
/// Example: `float("2.5")` returns `2.5`
pub struct FloatBuiltin;

impl Builtin for FloatBuiltin {
    fn name(&self) -> &str {
        "float"
    }

    fn description(&self) -> &str {
        "Convert to float"
    }

    fn arity(&self) -> Arity {
        Arity::Exact(1)
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        match &args[0] {
            Value::Int(n) => Ok(Value::Float(*n as f64)),
            Value::Float(f) => Ok(Value::Float(*f)),
            Value::Bool(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
            Value::String(s) => s.trim().parse().map(Value::Float).map_err(|_| {
                Error::builtin(
                    "float",
                    format!("could not convert string to float: {}", args[0].repr()),
                )
            }),
            other => Err(Error::type_error("number, bool or string", other.type_name())),
        }
    }
}

/// Converts any value to its printed form
pub struct StrBuiltin;

impl Builtin for StrBuiltin {
    fn name(&self) -> &str {
        "str"
    }

    fn description(&self) -> &str {
        "Convert to string"
    }

    fn arity(&self) -> Arity {
        Arity::Exact(1)
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        Ok(Value::String(args[0].to_string()))
    }
}

/// Truthiness of any value
pub struct BoolBuiltin;

impl Builtin for BoolBuiltin {
    fn name(&self) -> &str {
        "bool"
    }

    fn description(&self) -> &str {
        "Convert to boolean by truthiness"
    }

    fn arity(&self) -> Arity {
        Arity::Exact(1)
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        Ok(Value::Bool(args[0].is_truthy()))
    }
}

/// Collects an iterable into a list; no argument gives an empty list
pub struct ListBuiltin;

impl Builtin for ListBuiltin {
    fn name(&self) -> &str {
        "list"
    }

    fn description(&self) -> &str {
        "Convert an iterable to a list"
    }

    fn arity(&self) -> Arity {
        Arity::Between(0, 1)
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        match args.first() {
            Some(iterable) => Ok(Value::List(iterable.iterate()?)),
            None => Ok(Value::List(Vec::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Range;

    fn call(name: &str, args: &[Value]) -> Result<Value> {
        BuiltinRegistry::new().call(name, args)
    }

    #[test]
    fn test_int_conversion() {
        assert_eq!(call("int", &[Value::from(" 42 ")]).unwrap(), Value::Int(42));
        assert_eq!(call("int", &[Value::Float(-3.9)]).unwrap(), Value::Int(-3));
        assert_eq!(call("int", &[Value::Bool(true)]).unwrap(), Value::Int(1));
        assert_eq!(
            call("int", &[Value::from("abc")]),
            Err(Error::builtin("int", "invalid literal for int(): \"abc\""))
        );
        assert!(call("int", &[Value::Float(f64::INFINITY)]).is_err());
    }

    #[test]
    fn test_float_conversion() {
        assert_eq!(call("float", &[Value::from("2.5")]).unwrap(), Value::Float(2.5));
        assert_eq!(call("float", &[Value::Int(2)]).unwrap(), Value::Float(2.0));
        assert!(call("float", &[Value::from("x")]).is_err());
    }

    #[test]
    fn test_str_and_bool() {
        assert_eq!(call("str", &[Value::Float(5.0)]).unwrap(), Value::from("5.0"));
        assert_eq!(
            call("str", &[Value::List(vec![Value::from("a")])]).unwrap(),
            Value::from("[\"a\"]")
        );
        assert_eq!(call("bool", &[Value::from("")]).unwrap(), Value::Bool(false));
        assert_eq!(call("bool", &[Value::Int(2)]).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_list_conversion() {
        assert_eq!(call("list", &[]).unwrap(), Value::List(vec![]));
        assert_eq!(
            call("list", &[Value::Range(Range::new(0, 3, 1).unwrap())]).unwrap(),
            Value::List(vec![Value::Int(0), Value::Int(1), Value::Int(2)])
        );
        assert_eq!(
            call("list", &[Value::from("ab")]).unwrap(),
            Value::List(vec![Value::from("a"), Value::from("b")])
        );
        assert!(call("list", &[Value::Int(1)]).is_err());
    }
}
