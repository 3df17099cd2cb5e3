//! Dynamic value representation
//!
//! Composed members traffic in host-dynamic values: attribute strings,
//! property values, method results. This module provides a small value enum
//! with JavaScript-style truthiness, which the prefer-base/prefer-mixin
//! composition rules use to decide whether a result counts as "an answer".

use std::fmt;
use std::sync::Arc;

/// A dynamic value passed between composed members.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit null
    Null,

    /// Missing value (absent property, void method result)
    Undefined,

    /// Boolean (true/false)
    Bool(bool),

    /// Number (always f64)
    Number(f64),

    /// Immutable string
    Str(Arc<str>),
}

impl Value {
    /// Create a string value
    pub fn str(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    /// Create a number value
    pub fn number(n: f64) -> Self {
        Value::Number(n)
    }

    /// Create a boolean value
    pub fn bool(b: bool) -> Self {
        Value::Bool(b)
    }

    /// Check if this value is null or undefined
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    /// Check if value is truthy (host truthiness rules)
    ///
    /// `false`, `null`, `undefined`, `0`, `NaN` and the empty string are
    /// falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null | Value::Undefined => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
        }
    }

    /// Borrow the string payload, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the type name (for diagnostics)
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Undefined => "undefined",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Undefined => write!(f, "undefined"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Undefined
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::str(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
