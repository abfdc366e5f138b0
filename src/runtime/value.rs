use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::parser::Stmt;

/// A runtime value in Brook
///
/// Numbers, strings and booleans have copy semantics; arrays and records are
/// reference values, so clones of a [`Value::Array`] or [`Value::Record`]
/// alias the same underlying storage.
#[derive(Debug, Clone)]
pub enum Value {
    /// Absence of a value; produced by statements and missing members
    Null,
    /// Boolean
    Bool(bool),
    /// Double-precision float, the only numeric type
    Number(f64),
    /// Immutable string
    Str(String),
    /// Mutable array with shared-reference semantics
    Array(Rc<RefCell<Vec<Value>>>),
    /// Mutable string-keyed record with shared-reference semantics
    ///
    /// Fields keep insertion order, so printing a record is deterministic
    /// and mirrors the literal that built it. Keys are unique; writes to an
    /// existing key replace in place.
    Record(Rc<RefCell<Vec<(String, Value)>>>),
    /// User-defined function
    Closure {
        /// Declared name, used in diagnostics
        name: String,
        /// Ordered parameter names
        params: Rc<Vec<String>>,
        /// Body statements, shared with the declaration AST
        body: Rc<Vec<Stmt>>,
    },
}

impl Value {
    /// Wraps a vector of values in array reference semantics
    pub fn array(elements: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(elements)))
    }

    /// Wraps an ordered field list in record reference semantics
    pub fn record(fields: Vec<(String, Value)>) -> Self {
        Value::Record(Rc::new(RefCell::new(fields)))
    }

    /// Human-readable type name, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Record(_) => "record",
            Value::Closure { .. } => "function",
        }
    }

    /// Truthiness for conditions and logical operators
    ///
    /// Falsy values are `null`, `false`, `0`, NaN and the empty string.
    /// Arrays and records are always truthy, even when empty.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Array(_) | Value::Record(_) | Value::Closure { .. } => true,
        }
    }

    /// Numeric coercion for arithmetic and comparison operands
    ///
    /// `null` is 0, booleans are 0 or 1, strings are trimmed and parsed
    /// (empty string is 0, unparseable is NaN), containers and functions
    /// are NaN.
    pub fn as_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::Str(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().unwrap_or(f64::NAN)
                }
            }
            Value::Array(_) | Value::Record(_) | Value::Closure { .. } => f64::NAN,
        }
    }
}

/// Structural equality
///
/// Arrays and records compare element-wise (after an identity fast path);
/// closures compare by identity of their shared body. Numbers follow float
/// equality, so NaN is not equal to itself.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            // Same fields, regardless of insertion order
            (Value::Record(a), Value::Record(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len()
                    && a.iter()
                        .all(|(key, value)| b.iter().any(|(k, v)| k == key && v == value))
            }
            (Value::Closure { body: a, .. }, Value::Closure { body: b, .. }) => {
                Rc::ptr_eq(a, b)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            // Top-level strings print bare; inside containers they are quoted
            Value::Str(s) => write!(f, "{}", s),
            Value::Array(elements) => {
                write!(f, "[")?;
                for (i, element) in elements.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_nested(f, element)?;
                }
                write!(f, "]")
            }
            Value::Record(fields) => {
                write!(f, "{{")?;
                for (i, (key, value)) in fields.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: ", key)?;
                    write_nested(f, value)?;
                }
                write!(f, "}}")
            }
            Value::Closure { name, params, .. } => {
                write!(f, "<function {}({} params)>", name, params.len())
            }
        }
    }
}

fn write_nested(f: &mut fmt::Formatter, value: &Value) -> fmt::Result {
    match value {
        Value::Str(s) => write!(f, "\"{}\"", s),
        other => write!(f, "{}", other),
    }
}

/// Formats a number the way the language prints it: integral finite values
/// drop the fractional part (`3`, not `3.0`), and infinities spell out
/// `Infinity` the way the host float-to-string does.
fn format_number(n: f64) -> String {
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
