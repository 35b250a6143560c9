// ABOUTME: Runtime value model, arithmetic/comparison dispatch, and display formatting

use crate::ast::Stmt;
use crate::env::Environment;
use crate::error::RuntimeError;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    /// Either a single array argument, or one-or-more scalar arguments.
    OneOrMore,
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
            Arity::OneOrMore => write!(f, "at least 1"),
        }
    }
}

pub struct FunctionValue {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
    pub env: Rc<Environment>,
}

pub struct BuiltinValue {
    pub name: &'static str,
    pub arity: Arity,
    pub func: fn(&[Value], usize) -> Result<Value, RuntimeError>,
}

#[derive(Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(Rc<String>),
    Array(Rc<Vec<Value>>),
    Unit,
    Function(Rc<FunctionValue>),
    Builtin(Rc<BuiltinValue>),
}

impl Value {
    pub fn str(s: impl Into<String>) -> Value {
        Value::Str(Rc::new(s.into()))
    }

    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(items))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Unit => "unit",
            Value::Function(_) => "function",
            Value::Builtin(_) => "builtin",
        }
    }

    /// Python-style truthiness: `0`, `0.0`, empty string, empty array, and
    /// `false` are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Array(a) => !a.is_empty(),
            Value::Unit => false,
            Value::Function(_) | Value::Builtin(_) => true,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Elementwise equality used by `==`/`!=`, including on arrays.
    pub fn values_equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => *a as f64 == *b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Unit, Value::Unit) => true,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.values_equal(y))
            }
            _ => false,
        }
    }

    fn numeric_binop(
        a: &Value,
        b: &Value,
        line: usize,
        int_op: impl Fn(i64, i64) -> Option<i64>,
        float_op: impl Fn(f64, f64) -> f64,
    ) -> Result<Value, RuntimeError> {
        match (a, b) {
            (Value::Int(x), Value::Int(y)) => match int_op(*x, *y) {
                Some(result) => Ok(Value::Int(result)),
                None => Ok(Value::Float(float_op(*x as f64, *y as f64))),
            },
            _ => {
                let (x, y) = (a.as_f64(), b.as_f64());
                match (x, y) {
                    (Some(x), Some(y)) => Ok(Value::Float(float_op(x, y))),
                    _ => Err(RuntimeError::type_error(
                        format!(
                            "unsupported operand types '{}' and '{}'",
                            a.type_name(),
                            b.type_name()
                        ),
                        line,
                    )),
                }
            }
        }
    }

    fn broadcast(
        a: &Value,
        b: &Value,
        line: usize,
        op: impl Fn(&Value, &Value, usize) -> Result<Value, RuntimeError> + Copy,
    ) -> Result<Value, RuntimeError> {
        match (a, b) {
            (Value::Array(xs), Value::Array(ys)) => {
                if xs.len() != ys.len() {
                    return Err(RuntimeError::ShapeMismatch {
                        lhs: xs.len(),
                        rhs: ys.len(),
                        line,
                    });
                }
                let out = xs
                    .iter()
                    .zip(ys.iter())
                    .map(|(x, y)| op(x, y, line))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::array(out))
            }
            (Value::Array(xs), scalar) => {
                let out = xs
                    .iter()
                    .map(|x| op(x, scalar, line))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::array(out))
            }
            (scalar, Value::Array(ys)) => {
                let out = ys
                    .iter()
                    .map(|y| op(scalar, y, line))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::array(out))
            }
            _ => unreachable!("broadcast called without an array operand"),
        }
    }

    pub fn add(&self, other: &Value, line: usize) -> Result<Value, RuntimeError> {
        if matches!(self, Value::Str(_)) || matches!(other, Value::Str(_)) {
            return match (self, other) {
                (Value::Str(a), Value::Str(b)) => Ok(Value::str(format!("{a}{b}"))),
                _ => Err(RuntimeError::type_error(
                    format!(
                        "cannot add '{}' and '{}'",
                        self.type_name(),
                        other.type_name()
                    ),
                    line,
                )),
            };
        }
        if matches!(self, Value::Array(_)) || matches!(other, Value::Array(_)) {
            return Value::broadcast(self, other, line, Value::add);
        }
        Value::numeric_binop(
            self,
            other,
            line,
            |x, y| x.checked_add(y),
            |x, y| x + y,
        )
    }

    pub fn sub(&self, other: &Value, line: usize) -> Result<Value, RuntimeError> {
        if matches!(self, Value::Array(_)) || matches!(other, Value::Array(_)) {
            return Value::broadcast(self, other, line, Value::sub);
        }
        Value::numeric_binop(
            self,
            other,
            line,
            |x, y| x.checked_sub(y),
            |x, y| x - y,
        )
    }

    pub fn mul(&self, other: &Value, line: usize) -> Result<Value, RuntimeError> {
        if matches!(self, Value::Array(_)) || matches!(other, Value::Array(_)) {
            return Value::broadcast(self, other, line, Value::mul);
        }
        Value::numeric_binop(
            self,
            other,
            line,
            |x, y| x.checked_mul(y),
            |x, y| x * y,
        )
    }

    pub fn div(&self, other: &Value, line: usize) -> Result<Value, RuntimeError> {
        if matches!(self, Value::Array(_)) || matches!(other, Value::Array(_)) {
            return Value::broadcast(self, other, line, Value::div);
        }
        let (x, y) = match (self.as_f64(), other.as_f64()) {
            (Some(x), Some(y)) => (x, y),
            _ => {
                return Err(RuntimeError::type_error(
                    format!(
                        "cannot divide '{}' by '{}'",
                        self.type_name(),
                        other.type_name()
                    ),
                    line,
                ))
            }
        };
        if y == 0.0 {
            return Err(RuntimeError::DivisionByZero { line });
        }
        Ok(Value::Float(x / y))
    }

    pub fn rem(&self, other: &Value, line: usize) -> Result<Value, RuntimeError> {
        if matches!(self, Value::Array(_)) || matches!(other, Value::Array(_)) {
            return Value::broadcast(self, other, line, Value::rem);
        }
        if let (Value::Int(x), Value::Int(y)) = (self, other) {
            if *y == 0 {
                return Err(RuntimeError::DivisionByZero { line });
            }
            return Ok(Value::Int(x % y));
        }
        let (x, y) = match (self.as_f64(), other.as_f64()) {
            (Some(x), Some(y)) => (x, y),
            _ => {
                return Err(RuntimeError::type_error(
                    format!(
                        "unsupported operand types '{}' and '{}' for %",
                        self.type_name(),
                        other.type_name()
                    ),
                    line,
                ))
            }
        };
        if y == 0.0 {
            return Err(RuntimeError::DivisionByZero { line });
        }
        Ok(Value::Float(x % y))
    }

    pub fn pow(&self, other: &Value, line: usize) -> Result<Value, RuntimeError> {
        if matches!(self, Value::Array(_)) || matches!(other, Value::Array(_)) {
            return Value::broadcast(self, other, line, Value::pow);
        }
        if let (Value::Int(base), Value::Int(exp)) = (self, other) {
            if *exp >= 0 {
                return Ok(match base.checked_pow(*exp as u32) {
                    Some(result) => Value::Int(result),
                    None => Value::Float((*base as f64).powf(*exp as f64)),
                });
            }
            return Ok(Value::Float((*base as f64).powf(*exp as f64)));
        }
        let (x, y) = match (self.as_f64(), other.as_f64()) {
            (Some(x), Some(y)) => (x, y),
            _ => {
                return Err(RuntimeError::type_error(
                    format!(
                        "unsupported operand types '{}' and '{}' for **",
                        self.type_name(),
                        other.type_name()
                    ),
                    line,
                ))
            }
        };
        Ok(Value::Float(x.powf(y)))
    }

    /// Numeric/lexicographic ordering used by `< > <= >=`. Arrays are not
    /// orderable and fail with `TypeError`.
    pub fn compare(&self, other: &Value, line: usize) -> Result<std::cmp::Ordering, RuntimeError> {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
            (a, b) if a.is_numeric() && b.is_numeric() => {
                let (x, y) = (a.as_f64().unwrap(), b.as_f64().unwrap());
                x.partial_cmp(&y).ok_or_else(|| {
                    RuntimeError::type_error("cannot compare NaN".to_string(), line)
                })
            }
            _ => Err(RuntimeError::type_error(
                format!(
                    "cannot compare '{}' and '{}'",
                    self.type_name(),
                    other.type_name()
                ),
                line,
            )),
        }
    }
}

fn format_float(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let s = format!("{n}");
    if s.contains('.') {
        s
    } else {
        format!("{s}.0")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{}", format_float(*n)),
            Value::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Str(s) => write!(f, "{s}"),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Unit => Ok(()),
            Value::Function(_) => write!(f, "<function>"),
            Value::Builtin(b) => write!(f, "<builtin:{}>", b.name),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_display_has_no_point() {
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Int(-7).to_string(), "-7");
    }

    #[test]
    fn test_float_display_keeps_dot_zero() {
        assert_eq!(Value::Float(55.0).to_string(), "55.0");
        assert_eq!(Value::Float(30.28).to_string(), "30.28");
    }

    #[test]
    fn test_array_display() {
        let v = Value::array(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(v.to_string(), "[1, 2, 3]");
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Int(0).is_truthy());
        assert!(Value::Int(1).is_truthy());
        assert!(!Value::str("").is_truthy());
        assert!(Value::str("x").is_truthy());
        assert!(!Value::array(vec![]).is_truthy());
        assert!(!Value::Bool(false).is_truthy());
    }

    #[test]
    fn test_add_int_promotion() {
        let sum = Value::Int(2).add(&Value::Float(1.5), 1).unwrap();
        match sum {
            Value::Float(f) => assert_eq!(f, 3.5),
            _ => panic!("expected float"),
        }
    }

    #[test]
    fn test_broadcast_scalar_over_array() {
        let v = Value::array(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        let doubled = v.mul(&Value::Int(2), 1).unwrap();
        assert_eq!(doubled.to_string(), "[2, 4, 6]");
    }

    #[test]
    fn test_shape_mismatch() {
        let a = Value::array(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        let b = Value::array(vec![Value::Int(1), Value::Int(2)]);
        let err = a.add(&b, 1).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::ShapeMismatch {
                lhs: 3,
                rhs: 2,
                line: 1
            }
        );
    }

    #[test]
    fn test_pow_int_stays_int() {
        assert!(matches!(Value::Int(2).pow(&Value::Int(10), 1), Ok(Value::Int(1024))));
        assert!(matches!(Value::Int(2).pow(&Value::Int(0), 1), Ok(Value::Int(1))));
        assert!(matches!(Value::Int(2).pow(&Value::Int(-1), 1), Ok(Value::Float(_))));
    }

    #[test]
    fn test_pow_int_overflow_promotes_to_float() {
        let result = Value::Int(10).pow(&Value::Int(30), 1).unwrap();
        assert!(matches!(result, Value::Float(_)));
    }

    #[test]
    fn test_division_always_float() {
        match Value::Int(4).div(&Value::Int(2), 1).unwrap() {
            Value::Float(f) => assert_eq!(f, 2.0),
            _ => panic!("expected float"),
        }
    }

    #[test]
    fn test_division_by_zero() {
        let err = Value::Int(1).div(&Value::Int(0), 1).unwrap_err();
        assert_eq!(err, RuntimeError::DivisionByZero { line: 1 });
    }
}
