//! Value operators shared by the VM and the tree-walking interpreter
//!
//! Integer arithmetic is 32-bit and wraps; any float operand promotes the
//! operation to f64. Errors carry no line; callers attach it.

use crate::bytecode::Value;

use super::error::RuntimeErrorKind;

type OpResult = Result<Value, RuntimeErrorKind>;

/// `+`: string concatenation if either side is a string, otherwise numeric
pub(crate) fn add(left: &Value, right: &Value) -> OpResult {
    if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) {
        return Ok(Value::string(format!("{left}{right}")));
    }
    numeric(left, right, "+", i32::wrapping_add, |x, y| x + y)
}

pub(crate) fn subtract(left: &Value, right: &Value) -> OpResult {
    numeric(left, right, "-", i32::wrapping_sub, |x, y| x - y)
}

pub(crate) fn multiply(left: &Value, right: &Value) -> OpResult {
    numeric(left, right, "*", i32::wrapping_mul, |x, y| x * y)
}

/// `/`: truncating for two integers, IEEE otherwise
pub(crate) fn divide(left: &Value, right: &Value) -> OpResult {
    if let (Value::Int(_), Value::Int(0)) = (left, right) {
        return Err(RuntimeErrorKind::DivisionByZero);
    }
    numeric(left, right, "/", i32::wrapping_div, |x, y| x / y)
}

/// `%`: only reachable from the tree-walking interpreter
pub(crate) fn remainder(left: &Value, right: &Value) -> OpResult {
    if let (Value::Int(_), Value::Int(0)) = (left, right) {
        return Err(RuntimeErrorKind::DivisionByZero);
    }
    numeric(left, right, "%", i32::wrapping_rem, |x, y| x % y)
}

pub(crate) fn negate(operand: &Value) -> OpResult {
    match operand {
        Value::Int(i) => Ok(Value::Int(i.wrapping_neg())),
        Value::Float(f) => Ok(Value::Float(-f)),
        _ => Err(RuntimeErrorKind::OperandMustBeNumber),
    }
}

pub(crate) fn greater(left: &Value, right: &Value) -> OpResult {
    compare(left, right, ">", |x, y| x > y, |x, y| x > y)
}

pub(crate) fn less(left: &Value, right: &Value) -> OpResult {
    compare(left, right, "<", |x, y| x < y, |x, y| x < y)
}

/// Structural equality; values of different types are never equal
pub(crate) fn equal(left: &Value, right: &Value) -> Value {
    Value::Bool(left == right)
}

fn numeric(
    left: &Value,
    right: &Value,
    operation: &'static str,
    int_op: fn(i32, i32) -> i32,
    float_op: fn(f64, f64) -> f64,
) -> OpResult {
    match (left, right) {
        (Value::Int(x), Value::Int(y)) => Ok(Value::Int(int_op(*x, *y))),
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(x), Some(y)) => Ok(Value::Float(float_op(x, y))),
            _ => Err(RuntimeErrorKind::OperandsMustBeNumbers { operation }),
        },
    }
}

fn compare(
    left: &Value,
    right: &Value,
    operation: &'static str,
    int_op: fn(&i32, &i32) -> bool,
    float_op: fn(&f64, &f64) -> bool,
) -> OpResult {
    match (left, right) {
        (Value::Int(x), Value::Int(y)) => Ok(Value::Bool(int_op(x, y))),
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(x), Some(y)) => Ok(Value::Bool(float_op(&x, &y))),
            _ => Err(RuntimeErrorKind::OperandsMustBeNumbers { operation }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_arithmetic_stays_integer() {
        assert_eq!(add(&Value::Int(1), &Value::Int(1)), Ok(Value::Int(2)));
        assert_eq!(divide(&Value::Int(5), &Value::Int(2)), Ok(Value::Int(2)));
        assert_eq!(divide(&Value::Int(-7), &Value::Int(2)), Ok(Value::Int(-3)));
        assert_eq!(remainder(&Value::Int(7), &Value::Int(3)), Ok(Value::Int(1)));
    }

    #[test]
    fn integer_arithmetic_wraps() {
        assert_eq!(
            add(&Value::Int(i32::MAX), &Value::Int(1)),
            Ok(Value::Int(i32::MIN))
        );
        assert_eq!(negate(&Value::Int(i32::MIN)), Ok(Value::Int(i32::MIN)));
        assert_eq!(
            divide(&Value::Int(i32::MIN), &Value::Int(-1)),
            Ok(Value::Int(i32::MIN))
        );
    }

    #[test]
    fn float_promotion() {
        assert_eq!(divide(&Value::Float(5.0), &Value::Int(2)), Ok(Value::Float(2.5)));
        assert_eq!(multiply(&Value::Int(2), &Value::Float(1.5)), Ok(Value::Float(3.0)));
        assert_eq!(subtract(&Value::Float(1.0), &Value::Int(3)), Ok(Value::Float(-2.0)));
    }

    #[test]
    fn string_concatenation_wins() {
        assert_eq!(add(&Value::string("a"), &Value::Int(1)), Ok(Value::string("a1")));
        assert_eq!(add(&Value::Float(2.0), &Value::string("x")), Ok(Value::string("2x")));
        assert_eq!(
            add(&Value::Bool(true), &Value::string("!")),
            Ok(Value::string("verdadeiro!"))
        );
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(
            divide(&Value::Int(1), &Value::Int(0)),
            Err(RuntimeErrorKind::DivisionByZero)
        );
        assert_eq!(
            remainder(&Value::Int(1), &Value::Int(0)),
            Err(RuntimeErrorKind::DivisionByZero)
        );
        assert_eq!(
            divide(&Value::Float(1.0), &Value::Int(0)),
            Ok(Value::Float(f64::INFINITY))
        );
    }

    #[test]
    fn type_errors() {
        assert_eq!(
            subtract(&Value::string("a"), &Value::Int(1)),
            Err(RuntimeErrorKind::OperandsMustBeNumbers { operation: "-" })
        );
        assert_eq!(
            add(&Value::Nil, &Value::Int(1)),
            Err(RuntimeErrorKind::OperandsMustBeNumbers { operation: "+" })
        );
        assert_eq!(negate(&Value::Bool(true)), Err(RuntimeErrorKind::OperandMustBeNumber));
        assert_eq!(
            less(&Value::string("a"), &Value::string("b")),
            Err(RuntimeErrorKind::OperandsMustBeNumbers { operation: "<" })
        );
    }

    #[test]
    fn comparisons() {
        assert_eq!(greater(&Value::Int(2), &Value::Int(1)), Ok(Value::Bool(true)));
        assert_eq!(less(&Value::Int(1), &Value::Float(1.5)), Ok(Value::Bool(true)));
        assert_eq!(equal(&Value::Int(1), &Value::Float(1.0)), Value::Bool(false));
        assert_eq!(equal(&Value::Nil, &Value::Nil), Value::Bool(true));
    }
}
