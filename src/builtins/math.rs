//! Math builtins

use std::cmp::Ordering;

use super::{float_arg, float_to_int, Arity, Builtin, BuiltinRegistry};
use crate::error::{Error, Result};
use crate::runtime::{operators, Value};

/// Register math builtins
pub fn register(registry: &mut BuiltinRegistry) {
    registry.register(AbsBuiltin);
    registry.register(SqrtBuiltin);
    registry.register(PowBuiltin);
    registry.register(RoundBuiltin);
    registry.register(FloorBuiltin);
    registry.register(CeilBuiltin);
    registry.register(ExtremumBuiltin::min());
    registry.register(ExtremumBuiltin::max());
    registry.register(SumBuiltin);
    registry.register(LogBuiltin);
    registry.register(FloatFn {
        name: "sin",
        description: "Sine of an angle in radians",
        op: f64::sin,
    });
    registry.register(FloatFn {
        name: "cos",
        description: "Cosine of an angle in radians",
        op: f64::cos,
    });
    registry.register(FloatFn {
        name: "tan",
        description: "Tangent of an angle in radians",
        op: f64::tan,
    });
    registry.register(FloatFn {
        name: "exp",
        description: "e raised to the given power",
        op: f64::exp,
    });
}

/// Absolute value
///
/// Usage: `abs(number) -> number`
/// Example: `abs(-5)` returns `5`
pub struct AbsBuiltin;

impl Builtin for AbsBuiltin {
    fn name(&self) -> &str {
        "abs"
    }

    fn description(&self) -> &str {
        "Absolute value"
    }

    fn arity(&self) -> Arity {
        Arity::Exact(1)
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        match &args[0] {
            Value::Int(n) => n.checked_abs().map(Value::Int).ok_or_else(|| Error::Overflow {
                op: "abs".to_string(),
            }),
            Value::Float(f) => Ok(Value::Float(f.abs())),
            other => Err(Error::type_error("number", other.type_name())),
        }
    }
}

/// Square root
///
/// Usage: `sqrt(number) -> float`
/// Example: `sqrt(16)` returns `4.0`
pub struct SqrtBuiltin;

impl Builtin for SqrtBuiltin {
    fn name(&self) -> &str {
        "sqrt"
    }

    fn description(&self) -> &str {
        "Square root"
    }

    fn arity(&self) -> Arity {
        Arity::Exact(1)
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        let val = float_arg("sqrt", &args[0])?;
        if val < 0.0 {
            return Err(Error::builtin("sqrt", "math domain error"));
        }
        Ok(Value::Float(val.sqrt()))
    }
}

/// Power, with the same typing rules as the `**` operator
///
/// Usage: `pow(base, exponent) -> number`
/// Example: `pow(2, 8)` returns `256`
pub struct PowBuiltin;

impl Builtin for PowBuiltin {
    fn name(&self) -> &str {
        "pow"
    }

    fn description(&self) -> &str {
        "Power (base ** exponent)"
    }

    fn arity(&self) -> Arity {
        Arity::Exact(2)
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        operators::power(&args[0], &args[1])
    }
}

/// Rounds half to even. Without `ndigits` the result is an int.
pub struct RoundBuiltin;

fn round_half_even(f: f64) -> f64 {
    if (f - f.trunc()).abs() == 0.5 {
        2.0 * (f / 2.0).round()
    } else {
        f.round()
    }
}

impl Builtin for RoundBuiltin {
    fn name(&self) -> &str {
        "round"
    }

    fn description(&self) -> &str {
        "Round to the nearest integer, or to ndigits decimals"
    }

    fn arity(&self) -> Arity {
        Arity::Between(1, 2)
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        let digits = match args.get(1) {
            Some(digits) => Some(digits.as_int()?),
            None => None,
        };

        match (&args[0], digits) {
            (Value::Int(n), None) => Ok(Value::Int(*n)),
            (Value::Int(n), Some(d)) if d >= 0 => Ok(Value::Int(*n)),
            (value, None) => {
                let f = float_arg("round", value)?;
                Ok(Value::Int(float_to_int("round", round_half_even(f))?))
            }
            (value, Some(d)) => {
                let f = float_arg("round", value)?;
                let scale = 10f64.powi(d.clamp(-308, 308) as i32);
                let rounded = round_half_even(f * scale) / scale;
                match value {
                    Value::Int(_) => Ok(Value::Int(float_to_int("round", rounded)?)),
                    _ => Ok(Value::Float(rounded)),
                }
            }
        }
    }
}

/// Largest integer not greater than the argument
pub struct FloorBuiltin;

impl Builtin for FloorBuiltin {
    fn name(&self) -> &str {
        "floor"
    }

    fn description(&self) -> &str {
        "Round down to an integer"
    }

    fn arity(&self) -> Arity {
        Arity::Exact(1)
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        match &args[0] {
            Value::Int(n) => Ok(Value::Int(*n)),
            value => Ok(Value::Int(float_to_int("floor", float_arg("floor", value)?.floor())?)),
        }
    }
}

/// Smallest integer not less than the argument
pub struct CeilBuiltin;

impl Builtin for CeilBuiltin {
    fn name(&self) -> &str {
        "ceil"
    }

    fn description(&self) -> &str {
        "Round up to an integer"
    }

    fn arity(&self) -> Arity {
        Arity::Exact(1)
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        match &args[0] {
            Value::Int(n) => Ok(Value::Int(*n)),
            value => Ok(Value::Int(float_to_int("ceil", float_arg("ceil", value)?.ceil())?)),
        }
    }
}

/// `min` and `max`: over the arguments, or over a single iterable argument
pub struct ExtremumBuiltin {
    name: &'static str,
    description: &'static str,
    keep: Ordering,
}

impl ExtremumBuiltin {
    fn min() -> Self {
        ExtremumBuiltin {
            name: "min",
            description: "Smallest argument, or smallest element of one iterable",
            keep: Ordering::Less,
        }
    }

    fn max() -> Self {
        ExtremumBuiltin {
            name: "max",
            description: "Largest argument, or largest element of one iterable",
            keep: Ordering::Greater,
        }
    }
}

impl Builtin for ExtremumBuiltin {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn arity(&self) -> Arity {
        Arity::AtLeast(1)
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        let candidates = if args.len() == 1 {
            args[0].iterate()?
        } else {
            args.to_vec()
        };

        let mut candidates = candidates.into_iter();
        let mut best = candidates
            .next()
            .ok_or_else(|| Error::builtin(self.name, "empty sequence"))?;
        for candidate in candidates {
            if candidate.compare(&best)? == self.keep {
                best = candidate;
            }
        }
        Ok(best)
    }
}

/// Sum of an iterable, plus an optional start value
///
/// Usage: `sum(iterable, start?) -> number`
/// Example: `sum([1, 2, 3])` returns `6`
pub struct SumBuiltin;

impl Builtin for SumBuiltin {
    fn name(&self) -> &str {
        "sum"
    }

    fn description(&self) -> &str {
        "Sum of the elements of an iterable"
    }

    fn arity(&self) -> Arity {
        Arity::Between(1, 2)
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        let start = args.get(1).cloned().unwrap_or(Value::Int(0));
        args[0]
            .iterate()?
            .iter()
            .try_fold(start, |total, item| operators::add(&total, item))
    }
}

/// Natural logarithm, or logarithm in a given base
pub struct LogBuiltin;

impl Builtin for LogBuiltin {
    fn name(&self) -> &str {
        "log"
    }

    fn description(&self) -> &str {
        "Natural logarithm, or log(x, base)"
    }

    fn arity(&self) -> Arity {
        Arity::Between(1, 2)
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        let x = float_arg("log", &args[0])?;
        if x <= 0.0 {
            return Err(Error::builtin("log", "math domain error"));
        }

        match args.get(1) {
            Some(base) => {
                let base = float_arg("log", base)?;
                if base <= 0.0 || base == 1.0 {
                    return Err(Error::builtin("log", "math domain error"));
                }
                Ok(Value::Float(x.ln() / base.ln()))
            }
            None => Ok(Value::Float(x.ln())),
        }
    }
}

/// One-argument float function (sin, cos, tan, exp)
pub struct FloatFn {
    name: &'static str,
    description: &'static str,
    op: fn(f64) -> f64,
}

impl Builtin for FloatFn {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn arity(&self) -> Arity {
        Arity::Exact(1)
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        Ok(Value::Float((self.op)(float_arg(self.name, &args[0])?)))
    }
}
