use std::cmp::Ordering;
use std::fmt;

use crate::error::{Error, Result};

/// Runtime value representation
///
/// Values are plain data: assignment and argument passing clone them, so two
/// variables never alias the same list or dict.
#[derive(Debug, Clone)]
pub enum Value {
    /// Absence of a value (`return` with no expression, `print` result)
    Nil,
    /// Boolean value
    Bool(bool),
    /// 64-bit integer value
    Int(i64),
    /// 64-bit floating-point value
    Float(f64),
    /// String value
    String(String),
    /// Ordered list of values
    List(Vec<Value>),
    /// Insertion-ordered dictionary
    Dict(Dict),
    /// Lazy integer sequence produced by `range(...)`
    Range(Range),
}

impl Value {
    /// Returns the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
            Value::Range(_) => "range",
        }
    }

    /// Returns true if the value is truthy in a boolean context
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Dict(dict) => !dict.is_empty(),
            Value::Range(range) => range.len() > 0,
        }
    }

    /// True for `Int` and `Float`
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    // Type conversion methods

    /// Returns the integer value
    pub fn as_int(&self) -> Result<i64> {
        match self {
            Value::Int(n) => Ok(*n),
            _ => Err(Error::type_error("int", self.type_name())),
        }
    }

    /// Returns the numeric value as a float (ints are widened)
    pub fn as_float(&self) -> Result<f64> {
        match self {
            Value::Float(f) => Ok(*f),
            Value::Int(n) => Ok(*n as f64),
            _ => Err(Error::type_error("number", self.type_name())),
        }
    }

    /// Returns a reference to the string value
    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::String(s) => Ok(s),
            _ => Err(Error::type_error("string", self.type_name())),
        }
    }

    /// Returns a reference to the dict value
    pub fn as_dict(&self) -> Result<&Dict> {
        match self {
            Value::Dict(dict) => Ok(dict),
            _ => Err(Error::type_error("dict", self.type_name())),
        }
    }

    /// Number of elements for sized values
    pub fn len(&self) -> Result<usize> {
        match self {
            Value::String(s) => Ok(s.chars().count()),
            Value::List(items) => Ok(items.len()),
            Value::Dict(dict) => Ok(dict.len()),
            Value::Range(range) => Ok(range.len()),
            _ => Err(Error::type_error("string, list, dict or range", self.type_name())),
        }
    }

    /// Materializes the elements a `for` loop visits: list items, range
    /// integers, string characters, or dict keys
    pub fn iterate(&self) -> Result<Vec<Value>> {
        match self {
            Value::List(items) => Ok(items.clone()),
            Value::Range(range) => Ok(range.iter().map(Value::Int).collect()),
            Value::String(s) => Ok(s.chars().map(|c| Value::String(c.to_string())).collect()),
            Value::Dict(dict) => Ok(dict.keys().cloned().collect()),
            _ => Err(Error::type_error("iterable", self.type_name())),
        }
    }

    /// Gets an element by index (lists, strings, ranges) or by key (dicts)
    pub fn get_index(&self, index: &Value) -> Result<Value> {
        match self {
            Value::List(items) => {
                let idx = resolve_index(index.as_int()?, items.len())?;
                Ok(items[idx].clone())
            }
            Value::String(s) => {
                let length = s.chars().count();
                let idx = resolve_index(index.as_int()?, length)?;
                Ok(s.chars()
                    .nth(idx)
                    .map(|c| Value::String(c.to_string()))
                    .unwrap_or(Value::Nil))
            }
            Value::Range(range) => {
                let idx = resolve_index(index.as_int()?, range.len())?;
                Ok(Value::Int(range.nth(idx)))
            }
            Value::Dict(dict) => dict.get(index).cloned().ok_or_else(|| Error::KeyNotFound {
                key: index.repr(),
            }),
            _ => Err(Error::type_error("list, string, dict or range", self.type_name())),
        }
    }

    /// Stores an element by index (lists) or by key (dicts)
    pub fn set_index(&mut self, index: Value, value: Value) -> Result<()> {
        match self {
            Value::List(items) => {
                let idx = resolve_index(index.as_int()?, items.len())?;
                items[idx] = value;
                Ok(())
            }
            Value::Dict(dict) => dict.insert(index, value),
            _ => Err(Error::type_error("list or dict", self.type_name())),
        }
    }

    /// Ordering used by `<`, `>`, `<=`, `>=`, `min`, `max` and `sort`.
    /// Numbers compare numerically, strings and lists lexicographically.
    pub fn compare(&self, other: &Value) -> Result<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Ok(a.cmp(b)),
            (Value::List(a), Value::List(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.compare(y)? {
                        Ordering::Equal => continue,
                        unequal => return Ok(unequal),
                    }
                }
                Ok(a.len().cmp(&b.len()))
            }
            (a, b) if a.is_number() && b.is_number() => {
                let (x, y) = (a.as_float()?, b.as_float()?);
                x.partial_cmp(&y).ok_or_else(|| Error::InvalidOperation {
                    op: "compare".to_string(),
                    left_type: "nan".to_string(),
                    right_type: b.type_name().to_string(),
                })
            }
            _ => Err(Error::InvalidOperation {
                op: "compare".to_string(),
                left_type: self.type_name().to_string(),
                right_type: other.type_name().to_string(),
            }),
        }
    }

    /// Source-like rendering used inside collections: strings are quoted
    pub fn repr(&self) -> String {
        match self {
            Value::String(s) => {
                let mut quoted = String::with_capacity(s.len() + 2);
                quoted.push('"');
                for c in s.chars() {
                    match c {
                        '"' => quoted.push_str("\\\""),
                        '\\' => quoted.push_str("\\\\"),
                        '\n' => quoted.push_str("\\n"),
                        '\t' => quoted.push_str("\\t"),
                        '\r' => quoted.push_str("\\r"),
                        _ => quoted.push(c),
                    }
                }
                quoted.push('"');
                quoted
            }
            other => other.to_string(),
        }
    }
}

/// Maps a possibly negative index onto `0..length`
pub fn resolve_index(index: i64, length: usize) -> Result<usize> {
    let resolved = if index < 0 {
        index as i128 + length as i128
    } else {
        index as i128
    };
    if resolved < 0 || resolved >= length as i128 {
        return Err(Error::IndexOutOfBounds { index, length });
    }
    Ok(resolved as usize)
}

/// Formats a float the way the language prints it: always with a decimal
/// point or exponent, `inf`/`nan` spelled out.
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = f.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let formatted = format!("{:e}", f);
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                format!("{}e{}{:0>2}", mantissa, sign, digits)
            }
            None => formatted,
        };
    }

    if f.fract() == 0.0 {
        format!("{:.1}", f)
    } else {
        format!("{}", f)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(fl) => write!(f, "{}", format_float(*fl)),
            Value::String(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, val) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", val.repr())?;
                }
                write!(f, "]")
            }
            Value::Dict(dict) => {
                write!(f, "{{")?;
                for (i, (key, val)) in dict.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key.repr(), val.repr())?;
                }
                write!(f, "}}")
            }
            Value::Range(range) => write!(f, "{}", range),
        }
    }
}

// Int and Float compare numerically; Bool never equals a number
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Dict(a), Value::Dict(b)) => a == b,
            (Value::Range(a), Value::Range(b)) => a == b,
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

// =============================================================================
// Dict
// =============================================================================

/// Insertion-ordered dictionary
///
/// Backed by a vector of pairs so iteration and printing follow insertion
/// order. Keys are restricted to hashable scalars: int, float, string, bool.
#[derive(Debug, Clone, Default)]
pub struct Dict {
    entries: Vec<(Value, Value)>,
}

impl Dict {
    /// Creates an empty dict
    pub fn new() -> Self {
        Dict::default()
    }

    /// Rejects values that cannot be used as keys
    pub fn check_key(key: &Value) -> Result<()> {
        match key {
            Value::Int(_) | Value::Float(_) | Value::String(_) | Value::Bool(_) => Ok(()),
            other => Err(Error::type_error("int, float, string or bool key", other.type_name())),
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the dict has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a key
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Inserts or replaces a value. Replacing keeps the key's original position.
    pub fn insert(&mut self, key: Value, value: Value) -> Result<()> {
        Dict::check_key(&key)?;
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        Ok(())
    }

    /// Removes a key and returns its value
    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        let position = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(position).1)
    }

    /// Removes every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterates keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Iterates values in insertion order
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Iterates entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

// Order-insensitive, like a mapping
impl PartialEq for Dict {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|v| v == value))
    }
}

// =============================================================================
// Range
// =============================================================================

/// Arithmetic integer sequence `start, start + step, ...` stopping before `stop`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    /// First value (inclusive)
    pub start: i64,
    /// Bound (exclusive)
    pub stop: i64,
    /// Increment, never zero
    pub step: i64,
}

impl Range {
    /// Creates a range, rejecting a zero step
    pub fn new(start: i64, stop: i64, step: i64) -> Result<Self> {
        if step == 0 {
            return Err(Error::InvalidRange {
                reason: "step must not be zero".to_string(),
            });
        }
        Ok(Range { start, stop, step })
    }

    /// Number of values the range yields
    pub fn len(&self) -> usize {
        let (start, stop, step) = (self.start as i128, self.stop as i128, self.step as i128);
        let count = if step > 0 && start < stop {
            (stop - start + step - 1) / step
        } else if step < 0 && start > stop {
            (start - stop - step - 1) / -step
        } else {
            0
        };
        count as usize
    }

    /// True when the range yields nothing
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The value at position `index`; the caller bounds-checks
    pub fn nth(&self, index: usize) -> i64 {
        (self.start as i128 + index as i128 * self.step as i128) as i64
    }

    /// Iterates the values; ranges can be iterated any number of times
    pub fn iter(&self) -> RangeIter {
        RangeIter {
            range: *self,
            position: 0,
            length: self.len(),
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.step == 1 {
            write!(f, "range({}, {})", self.start, self.stop)
        } else {
            write!(f, "range({}, {}, {})", self.start, self.stop, self.step)
        }
    }
}

/// Iterator over a [`Range`]
#[derive(Debug, Clone)]
pub struct RangeIter {
    range: Range,
    position: usize,
    length: usize,
}

impl Iterator for RangeIter {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        if self.position >= self.length {
            return None;
        }
        let value = self.range.nth(self.position);
        self.position += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.length - self.position;
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Nil.type_name(), "nil");
        assert_eq!(Value::Bool(true).type_name(), "bool");
        assert_eq!(Value::Int(42).type_name(), "int");
        assert_eq!(Value::Float(2.71).type_name(), "float");
        assert_eq!(Value::from("test").type_name(), "string");
        assert_eq!(Value::List(vec![]).type_name(), "list");
        assert_eq!(Value::Dict(Dict::new()).type_name(), "dict");
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(Value::Int(42).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(!Value::String(String::new()).is_truthy());
        assert!(Value::from("test").is_truthy());
        assert!(!Value::List(vec![]).is_truthy());
        assert!(!Value::Range(Range::new(3, 3, 1).unwrap()).is_truthy());
    }

    #[test]
    fn test_numeric_equality() {
        assert_eq!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::Bool(true), Value::Int(1));
        assert_ne!(Value::from("1"), Value::Int(1));
    }

    #[test]
    fn test_float_display() {
        assert_eq!(format_float(5.0), "5.0");
        assert_eq!(format_float(-0.5), "-0.5");
        assert_eq!(format_float(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(1.5e-5), "1.5e-05");
        assert_eq!(format_float(f64::INFINITY), "inf");
        assert_eq!(format_float(f64::NAN), "nan");
    }

    #[test]
    fn test_collection_display() {
        let list = Value::List(vec![Value::Int(1), Value::from("a"), Value::Bool(false)]);
        assert_eq!(list.to_string(), "[1, \"a\", false]");

        let mut dict = Dict::new();
        dict.insert(Value::from("x"), Value::Float(2.0)).unwrap();
        dict.insert(Value::Int(3), Value::Nil).unwrap();
        assert_eq!(Value::Dict(dict).to_string(), "{\"x\": 2.0, 3: nil}");

        assert_eq!(Value::from("plain").to_string(), "plain");
    }

    #[test]
    fn test_negative_index() {
        let list = Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(list.get_index(&Value::Int(-1)).unwrap(), Value::Int(3));
        assert_eq!(
            list.get_index(&Value::Int(3)),
            Err(Error::IndexOutOfBounds {
                index: 3,
                length: 3
            })
        );
        assert!(list.get_index(&Value::Int(-4)).is_err());
    }

    #[test]
    fn test_string_index_by_char() {
        let s = Value::from("héllo");
        assert_eq!(s.get_index(&Value::Int(1)).unwrap(), Value::from("é"));
        assert_eq!(s.len().unwrap(), 5);
    }

    #[test]
    fn test_dict_operations() {
        let mut dict = Dict::new();
        dict.insert(Value::from("a"), Value::Int(1)).unwrap();
        dict.insert(Value::from("b"), Value::Int(2)).unwrap();
        dict.insert(Value::from("a"), Value::Int(10)).unwrap();

        let keys: Vec<String> = dict.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(dict.get(&Value::from("a")), Some(&Value::Int(10)));
        assert_eq!(dict.remove(&Value::from("b")), Some(Value::Int(2)));
        assert_eq!(dict.len(), 1);

        assert!(dict.insert(Value::List(vec![]), Value::Nil).is_err());

        let missing = Value::Dict(dict).get_index(&Value::from("zzz"));
        assert_eq!(
            missing,
            Err(Error::KeyNotFound {
                key: "\"zzz\"".to_string()
            })
        );
    }

    #[test]
    fn test_range_iteration() {
        let range = Range::new(0, 5, 1).unwrap();
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
        // restartable
        assert_eq!(range.iter().count(), 5);

        let down = Range::new(10, 0, -3).unwrap();
        assert_eq!(down.iter().collect::<Vec<_>>(), vec![10, 7, 4, 1]);
        assert_eq!(down.len(), 4);

        assert!(Range::new(0, 5, 0).is_err());
        assert_eq!(Range::new(5, 0, 1).unwrap().len(), 0);
    }

    #[test]
    fn test_index_into_huge_range() {
        let range = Value::Range(Range::new(-i64::MAX, i64::MAX, 1).unwrap());
        assert_eq!(range.get_index(&Value::Int(-1)).unwrap(), Value::Int(i64::MAX - 1));
        assert_eq!(range.get_index(&Value::Int(0)).unwrap(), Value::Int(-i64::MAX));
        assert_eq!(range.get_index(&Value::Int(-i64::MAX)).unwrap(), Value::Int(0));
        assert_eq!(range.get_index(&Value::Int(i64::MIN)).unwrap(), Value::Int(-1));
        assert_eq!(range.get_index(&Value::Int(i64::MAX)).unwrap(), Value::Int(0));
    }

    #[test]
    fn test_range_display() {
        assert_eq!(Range::new(0, 5, 1).unwrap().to_string(), "range(0, 5)");
        assert_eq!(Range::new(1, 9, 2).unwrap().to_string(), "range(1, 9, 2)");
    }

    #[test]
    fn test_ordering() {
        assert_eq!(
            Value::Int(1).compare(&Value::Float(1.5)).unwrap(),
            Ordering::Less
        );
        assert_eq!(
            Value::from("b").compare(&Value::from("a")).unwrap(),
            Ordering::Greater
        );
        assert!(Value::Int(1).compare(&Value::from("a")).is_err());
    }
}
