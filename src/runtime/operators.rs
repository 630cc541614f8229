//! Arithmetic and comparison semantics shared by the evaluator and builtins

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::parser::BinaryOp;
use crate::runtime::Value;

/// Applies a non-short-circuiting binary operator to two evaluated operands.
/// `and`/`or` never reach this function.
pub fn apply_binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    match op {
        BinaryOp::Add => add(left, right),
        BinaryOp::Sub => subtract(left, right),
        BinaryOp::Mul => multiply(left, right),
        BinaryOp::Div => divide(left, right),
        BinaryOp::Mod => modulo(left, right),
        BinaryOp::Pow => power(left, right),
        BinaryOp::Eq => Ok(Value::Bool(left == right)),
        BinaryOp::NotEq => Ok(Value::Bool(left != right)),
        BinaryOp::Lt => ordered(left, right, |o| o == Ordering::Less),
        BinaryOp::Gt => ordered(left, right, |o| o == Ordering::Greater),
        BinaryOp::LtEq => ordered(left, right, |o| o != Ordering::Greater),
        BinaryOp::GtEq => ordered(left, right, |o| o != Ordering::Less),
        BinaryOp::And | BinaryOp::Or => Err(Error::UnknownOperator { op: op.to_string() }),
    }
}

fn ordered(left: &Value, right: &Value, test: impl Fn(Ordering) -> bool) -> Result<Value> {
    Ok(Value::Bool(test(left.compare(right)?)))
}

fn invalid(op: &str, left: &Value, right: &Value) -> Error {
    Error::InvalidOperation {
        op: op.to_string(),
        left_type: left.type_name().to_string(),
        right_type: right.type_name().to_string(),
    }
}

fn overflow(op: &str) -> Error {
    Error::Overflow { op: op.to_string() }
}

/// `+`: numeric addition, string and list concatenation
pub fn add(left: &Value, right: &Value) -> Result<Value> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => a.checked_add(*b).map(Value::Int).ok_or_else(|| overflow("+")),
        (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
        (Value::List(a), Value::List(b)) => {
            let mut items = a.clone();
            items.extend(b.iter().cloned());
            Ok(Value::List(items))
        }
        (a, b) if a.is_number() && b.is_number() => Ok(Value::Float(a.as_float()? + b.as_float()?)),
        _ => Err(invalid("+", left, right)),
    }
}

/// `-`: numeric subtraction
pub fn subtract(left: &Value, right: &Value) -> Result<Value> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => a.checked_sub(*b).map(Value::Int).ok_or_else(|| overflow("-")),
        (a, b) if a.is_number() && b.is_number() => Ok(Value::Float(a.as_float()? - b.as_float()?)),
        _ => Err(invalid("-", left, right)),
    }
}

/// `*`: numeric multiplication, string and list repetition by an int
pub fn multiply(left: &Value, right: &Value) -> Result<Value> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => a.checked_mul(*b).map(Value::Int).ok_or_else(|| overflow("*")),
        (Value::String(s), Value::Int(n)) | (Value::Int(n), Value::String(s)) => {
            let count = repeat_count(*n);
            repeated_len(s.len(), count, 1)?;
            Ok(Value::String(s.repeat(count)))
        }
        (Value::List(items), Value::Int(n)) | (Value::Int(n), Value::List(items)) => {
            let count = repeat_count(*n);
            let total = repeated_len(items.len(), count, std::mem::size_of::<Value>())?;
            let repeated: Vec<Value> = items.iter().cloned().cycle().take(total).collect();
            Ok(Value::List(repeated))
        }
        (a, b) if a.is_number() && b.is_number() => Ok(Value::Float(a.as_float()? * b.as_float()?)),
        _ => Err(invalid("*", left, right)),
    }
}

fn repeat_count(n: i64) -> usize {
    usize::try_from(n).unwrap_or(0)
}

/// Element count of a repetition, rejecting results no allocation can hold
fn repeated_len(len: usize, count: usize, element_size: usize) -> Result<usize> {
    let total = len.checked_mul(count).ok_or_else(|| overflow("*"))?;
    match total.checked_mul(element_size) {
        Some(bytes) if bytes <= isize::MAX as usize => Ok(total),
        _ => Err(overflow("*")),
    }
}

/// `/`: true division, always a float
pub fn divide(left: &Value, right: &Value) -> Result<Value> {
    if !(left.is_number() && right.is_number()) {
        return Err(invalid("/", left, right));
    }
    let divisor = right.as_float()?;
    if divisor == 0.0 {
        return Err(Error::DivisionByZero);
    }
    Ok(Value::Float(left.as_float()? / divisor))
}

/// `%`: floored modulo, the result takes the sign of the divisor
pub fn modulo(left: &Value, right: &Value) -> Result<Value> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => {
            if *b == 0 {
                return Err(Error::DivisionByZero);
            }
            let rem = a.checked_rem(*b).ok_or_else(|| overflow("%"))?;
            if rem != 0 && (rem < 0) != (*b < 0) {
                Ok(Value::Int(rem + b))
            } else {
                Ok(Value::Int(rem))
            }
        }
        (a, b) if a.is_number() && b.is_number() => {
            let (x, y) = (a.as_float()?, b.as_float()?);
            if y == 0.0 {
                return Err(Error::DivisionByZero);
            }
            let rem = x % y;
            if rem != 0.0 && (rem < 0.0) != (y < 0.0) {
                Ok(Value::Float(rem + y))
            } else {
                Ok(Value::Float(rem))
            }
        }
        _ => Err(invalid("%", left, right)),
    }
}

/// `**`: int result for an int base and non-negative int exponent unless it
/// overflows, float otherwise
pub fn power(left: &Value, right: &Value) -> Result<Value> {
    match (left, right) {
        (Value::Int(base), Value::Int(exp)) if *exp >= 0 => {
            let exact = u32::try_from(*exp)
                .ok()
                .and_then(|e| base.checked_pow(e));
            match exact {
                Some(n) => Ok(Value::Int(n)),
                None => Ok(Value::Float((*base as f64).powf(*exp as f64))),
            }
        }
        (a, b) if a.is_number() && b.is_number() => {
            let (base, exp) = (a.as_float()?, b.as_float()?);
            if base == 0.0 && exp < 0.0 {
                return Err(Error::DivisionByZero);
            }
            Ok(Value::Float(base.powf(exp)))
        }
        _ => Err(invalid("**", left, right)),
    }
}

/// Unary minus
pub fn negate(operand: &Value) -> Result<Value> {
    match operand {
        Value::Int(n) => n.checked_neg().map(Value::Int).ok_or_else(|| overflow("-")),
        Value::Float(f) => Ok(Value::Float(-f)),
        other => Err(Error::type_error("number", other.type_name())),
    }
}
