//! Runtime values shared by the VM and the tree-walking interpreter

use std::fmt;
use std::rc::Rc;

use crate::interpreter::Function;

/// A dynamically typed runtime value
#[derive(Debug, Clone)]
pub enum Value {
    /// `NULO`
    Nil,

    /// `ISSOAI` / `MENTIRA`
    Bool(bool),

    /// 32-bit integer
    Int(i32),

    /// 64-bit float
    Float(f64),

    /// Immutable string
    String(Rc<str>),

    /// User function; only produced by the tree-walking interpreter
    Function(Rc<Function>),
}

impl Value {
    /// Create a string value
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    /// Returns true if this value is considered "truthy"
    ///
    /// Only `nil` and `false` are falsy; `0` and `""` are truthy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            _ => true,
        }
    }

    /// Returns true for integers and floats
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Numeric value widened to f64
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(f64::from(*i)),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the type name of this value (for error messages)
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nulo",
            Value::Bool(_) => "booleano",
            Value::Int(_) => "inteiro",
            Value::Float(_) => "quebrado",
            Value::String(_) => "texto",
            Value::Function(_) => "função",
        }
    }

    /// Interpret a line of user input: integer, then float, then raw text
    ///
    /// Only numeric-looking lines become floats, so words such as `inf` or
    /// `NaN` stay text.
    pub fn from_input(line: &str) -> Self {
        if let Ok(i) = line.parse::<i32>() {
            return Value::Int(i);
        }
        if has_float_shape(line) {
            if let Ok(f) = line.parse::<f64>() {
                return Value::Float(f);
            }
        }
        Value::string(line)
    }
}

/// Digits with an optional sign, fraction and exponent
fn has_float_shape(text: &str) -> bool {
    text.bytes().any(|b| b.is_ascii_digit())
        && text
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
}

impl PartialEq for Value {
    /// Values of different variants are never equal, so `1 == 1.0` is false.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nulo"),
            Value::Bool(true) => write!(f, "verdadeiro"),
            Value::Bool(false) => write!(f, "falso"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(n) if n.is_nan() => write!(f, "NaN"),
            Value::Float(n) if n.is_infinite() => {
                write!(f, "{}Infinity", if *n < 0.0 { "-" } else { "" })
            }
            // f64's Display never prints a trailing ".0": 2.0 renders as "2"
            Value::Float(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Function(func) => write!(f, "<função {}>", func.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_words_stay_text() {
        for word in ["Nan", "NaN", "inf", "Infinity", "-infinity", "e", "1e", "Ana"] {
            assert_eq!(Value::from_input(word), Value::string(word), "{word}");
        }
        assert_eq!(Value::from_input("42"), Value::Int(42));
        assert_eq!(Value::from_input("-2.5"), Value::Float(-2.5));
        assert_eq!(Value::from_input("1e3"), Value::Float(1000.0));
        assert_eq!(Value::from_input("99999999999"), Value::Float(99_999_999_999.0));
    }

    #[test]
    fn non_finite_floats_display() {
        assert_eq!(Value::Float(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(Value::Float(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(Value::Float(f64::NAN).to_string(), "NaN");
        assert_eq!(Value::Float(2.0).to_string(), "2");
    }

    #[test]
    fn value_truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Int(0).is_truthy());
        assert!(Value::string("").is_truthy());
    }

    #[test]
    fn value_equality() {
        assert_eq!(Value::Nil, Value::Nil);
        assert_eq!(Value::Int(42), Value::Int(42));
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::Nil, Value::Bool(false));
        assert_eq!(Value::string("oi"), Value::string("oi"));
    }

    #[test]
    fn value_display() {
        assert_eq!(Value::Nil.to_string(), "nulo");
        assert_eq!(Value::Bool(true).to_string(), "verdadeiro");
        assert_eq!(Value::Bool(false).to_string(), "falso");
        assert_eq!(Value::Float(2.0).to_string(), "2");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Int(-7).to_string(), "-7");
        assert_eq!(Value::string("abc").to_string(), "abc");
    }

    #[test]
    fn input_coercion() {
        assert_eq!(Value::from_input("42"), Value::Int(42));
        assert_eq!(Value::from_input("4.5"), Value::Float(4.5));
        assert_eq!(Value::from_input("olá"), Value::string("olá"));
        assert_eq!(Value::from_input(""), Value::string(""));
    }
}
