//! Native methods on lists, strings and dicts
//!
//! Each call works on a receiver the evaluator owns. Mutating methods change
//! it in place and report so, letting the evaluator store the result back
//! into the variable the receiver came from.

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::runtime::value::{resolve_index, Dict};
use crate::runtime::Value;

/// Outcome of a native method call
#[derive(Debug, Clone, PartialEq)]
pub struct MethodOutcome {
    /// Value the call expression evaluates to
    pub value: Value,
    /// True when the receiver was modified
    pub mutated: bool,
}

impl MethodOutcome {
    fn read(value: Value) -> Self {
        MethodOutcome {
            value,
            mutated: false,
        }
    }

    fn write(value: Value) -> Self {
        MethodOutcome {
            value,
            mutated: true,
        }
    }
}

/// Dispatches `receiver.method(args)` on the receiver's native method set
pub fn call_method(receiver: &mut Value, method: &str, args: &[Value]) -> Result<MethodOutcome> {
    match receiver {
        Value::List(items) => list_method(items, method, args),
        Value::String(s) => string_method(s, method, args),
        Value::Dict(dict) => dict_method(dict, method, args),
        other => Err(unknown(other.type_name(), method)),
    }
}

fn unknown(type_name: &str, method: &str) -> Error {
    Error::UnknownMethod {
        type_name: type_name.to_string(),
        method: method.to_string(),
    }
}

/// Checks the argument count of `type.method`
fn arity(type_name: &str, method: &str, args: &[Value], min: usize, max: usize) -> Result<()> {
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            min.to_string()
        } else {
            format!("{} to {}", min, max)
        };
        return Err(Error::ArgumentCountMismatch {
            name: format!("{}.{}", type_name, method),
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

// =============================================================================
// list
// =============================================================================

fn list_method(items: &mut Vec<Value>, method: &str, args: &[Value]) -> Result<MethodOutcome> {
    let check = |min, max| arity("list", method, args, min, max);

    match method {
        "append" => {
            check(1, 1)?;
            items.push(args[0].clone());
            Ok(MethodOutcome::write(Value::Nil))
        }
        "insert" => {
            check(2, 2)?;
            let len = items.len() as i64;
            let requested = args[0].as_int()?;
            let position = if requested < 0 {
                (requested + len).max(0)
            } else {
                requested.min(len)
            };
            items.insert(position as usize, args[1].clone());
            Ok(MethodOutcome::write(Value::Nil))
        }
        "pop" => {
            check(0, 1)?;
            let requested = match args.first() {
                Some(index) => index.as_int()?,
                None => -1,
            };
            let position = resolve_index(requested, items.len())?;
            Ok(MethodOutcome::write(items.remove(position)))
        }
        "remove" => {
            check(1, 1)?;
            let position = items
                .iter()
                .position(|item| *item == args[0])
                .ok_or_else(|| Error::builtin("list.remove", "value not in list"))?;
            items.remove(position);
            Ok(MethodOutcome::write(Value::Nil))
        }
        "index" => {
            check(1, 1)?;
            let position = items
                .iter()
                .position(|item| *item == args[0])
                .ok_or_else(|| Error::builtin("list.index", "value not in list"))?;
            Ok(MethodOutcome::read(Value::Int(position as i64)))
        }
        "count" => {
            check(1, 1)?;
            let count = items.iter().filter(|item| **item == args[0]).count();
            Ok(MethodOutcome::read(Value::Int(count as i64)))
        }
        "reverse" => {
            check(0, 0)?;
            items.reverse();
            Ok(MethodOutcome::write(Value::Nil))
        }
        "sort" => {
            check(0, 0)?;
            sort_values(items)?;
            Ok(MethodOutcome::write(Value::Nil))
        }
        "extend" => {
            check(1, 1)?;
            items.extend(args[0].iterate()?);
            Ok(MethodOutcome::write(Value::Nil))
        }
        "copy" => {
            check(0, 0)?;
            Ok(MethodOutcome::read(Value::List(items.clone())))
        }
        "clear" => {
            check(0, 0)?;
            items.clear();
            Ok(MethodOutcome::write(Value::Nil))
        }
        _ => Err(unknown("list", method)),
    }
}

/// Stable ascending sort that surfaces the first incomparable pair
pub fn sort_values(items: &mut [Value]) -> Result<()> {
    let mut failure = None;
    items.sort_by(|a, b| {
        a.compare(b).unwrap_or_else(|err| {
            failure.get_or_insert(err);
            Ordering::Equal
        })
    });
    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

// =============================================================================
// string
// =============================================================================

fn string_method(s: &mut String, method: &str, args: &[Value]) -> Result<MethodOutcome> {
    let check = |min, max| arity("string", method, args, min, max);

    let value = match method {
        "upper" => {
            check(0, 0)?;
            Value::String(s.to_uppercase())
        }
        "lower" => {
            check(0, 0)?;
            Value::String(s.to_lowercase())
        }
        "strip" => {
            check(0, 1)?;
            match args.first() {
                Some(chars) => {
                    let chars: Vec<char> = chars.as_str()?.chars().collect();
                    Value::String(s.trim_matches(chars.as_slice()).to_string())
                }
                None => Value::String(s.trim().to_string()),
            }
        }
        "split" => {
            check(0, 1)?;
            let parts: Vec<Value> = match args.first() {
                Some(separator) => {
                    let separator = separator.as_str()?;
                    if separator.is_empty() {
                        return Err(Error::builtin("string.split", "empty separator"));
                    }
                    s.split(separator).map(Value::from).collect()
                }
                None => s.split_whitespace().map(Value::from).collect(),
            };
            Value::List(parts)
        }
        "replace" => {
            check(2, 2)?;
            Value::String(s.replace(args[0].as_str()?, args[1].as_str()?))
        }
        "startswith" => {
            check(1, 1)?;
            Value::Bool(s.starts_with(args[0].as_str()?))
        }
        "endswith" => {
            check(1, 1)?;
            Value::Bool(s.ends_with(args[0].as_str()?))
        }
        "find" => {
            check(1, 1)?;
            match s.find(args[0].as_str()?) {
                Some(byte_offset) => Value::Int(s[..byte_offset].chars().count() as i64),
                None => Value::Int(-1),
            }
        }
        "join" => {
            check(1, 1)?;
            let pieces = args[0]
                .iterate()?
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Result<Vec<_>>>()?;
            Value::String(pieces.join(s.as_str()))
        }
        "count" => {
            check(1, 1)?;
            let needle = args[0].as_str()?;
            let count = if needle.is_empty() {
                s.chars().count() + 1
            } else {
                s.matches(needle).count()
            };
            Value::Int(count as i64)
        }
        _ => return Err(unknown("string", method)),
    };

    Ok(MethodOutcome::read(value))
}

// =============================================================================
// dict
// =============================================================================

fn dict_method(dict: &mut Dict, method: &str, args: &[Value]) -> Result<MethodOutcome> {
    let check = |min, max| arity("dict", method, args, min, max);

    match method {
        "keys" => {
            check(0, 0)?;
            Ok(MethodOutcome::read(Value::List(dict.keys().cloned().collect())))
        }
        "values" => {
            check(0, 0)?;
            Ok(MethodOutcome::read(Value::List(dict.values().cloned().collect())))
        }
        "items" => {
            check(0, 0)?;
            let pairs = dict
                .iter()
                .map(|(k, v)| Value::List(vec![k.clone(), v.clone()]))
                .collect();
            Ok(MethodOutcome::read(Value::List(pairs)))
        }
        "get" => {
            check(1, 2)?;
            let found = dict
                .get(&args[0])
                .cloned()
                .or_else(|| args.get(1).cloned())
                .unwrap_or(Value::Nil);
            Ok(MethodOutcome::read(found))
        }
        "pop" => {
            check(1, 2)?;
            match dict.remove(&args[0]) {
                Some(value) => Ok(MethodOutcome::write(value)),
                None => match args.get(1) {
                    Some(default) => Ok(MethodOutcome::read(default.clone())),
                    None => Err(Error::KeyNotFound {
                        key: args[0].repr(),
                    }),
                },
            }
        }
        "update" => {
            check(1, 1)?;
            for (key, value) in args[0].as_dict()?.iter() {
                dict.insert(key.clone(), value.clone())?;
            }
            Ok(MethodOutcome::write(Value::Nil))
        }
        "copy" => {
            check(0, 0)?;
            Ok(MethodOutcome::read(Value::Dict(dict.clone())))
        }
        "clear" => {
            check(0, 0)?;
            dict.clear();
            Ok(MethodOutcome::write(Value::Nil))
        }
        _ => Err(unknown("dict", method)),
    }
}
