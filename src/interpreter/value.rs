// File: src/interpreter/value.rs
//
// Runtime value model for the formula interpreter.
// A value is either a single number (Scalar) or a numeric sequence aligned
// one-to-one with the input bars (Series). Binary operators are defined on
// two scalars and lifted elementwise, broadcasting a scalar operand across
// every position of a series operand.
//
// NaN is reserved for the warm-up positions of windowed functions. Numeric
// exceptions (division by zero) never degrade to NaN: the whole operation
// fails, even when only one index of a series is affected.

use crate::ast::{BinaryOp, UnaryOp};
use crate::errors::FormulaError;

/// Absolute-difference tolerance used by == and != instead of bit equality.
const EQ_TOLERANCE: f64 = 1e-10;

/// A computed value: one number, or one number per input bar.
#[derive(Debug, Clone)]
pub enum Value {
    Scalar(f64),
    Series(Vec<f64>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        // NaN marks warm-up positions; treat matching NaN slots as equal so
        // that two identically-computed series compare equal.
        fn eq_f64(a: f64, b: f64) -> bool {
            a == b || (a.is_nan() && b.is_nan())
        }
        match (self, other) {
            (Value::Scalar(a), Value::Scalar(b)) => eq_f64(*a, *b),
            (Value::Series(a), Value::Series(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| eq_f64(*x, *y))
            }
            _ => false,
        }
    }
}

impl Value {
    pub fn is_series(&self) -> bool {
        matches!(self, Value::Series(_))
    }

    /// Series length; None for scalars.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Scalar(_) => None,
            Value::Series(data) => Some(data.len()),
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(v) => Some(*v),
            Value::Series(_) => None,
        }
    }

    pub fn as_series(&self) -> Option<&[f64]> {
        match self {
            Value::Scalar(_) => None,
            Value::Series(data) => Some(data),
        }
    }

    /// Applies a binary operator with broadcasting.
    ///
    /// scalar op scalar -> scalar; series op series -> series (lengths must
    /// match); mixed -> series with the scalar applied at every position.
    pub fn binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, FormulaError> {
        match (lhs, rhs) {
            (Value::Scalar(a), Value::Scalar(b)) => scalar_op(op, *a, *b).map(Value::Scalar),
            (Value::Series(a), Value::Series(b)) => {
                if a.len() != b.len() {
                    return Err(FormulaError::runtime("series length mismatch"));
                }
                a.iter()
                    .zip(b.iter())
                    .map(|(x, y)| scalar_op(op, *x, *y))
                    .collect::<Result<Vec<f64>, _>>()
                    .map(Value::Series)
            }
            (Value::Series(a), Value::Scalar(b)) => a
                .iter()
                .map(|x| scalar_op(op, *x, *b))
                .collect::<Result<Vec<f64>, _>>()
                .map(Value::Series),
            (Value::Scalar(a), Value::Series(b)) => b
                .iter()
                .map(|y| scalar_op(op, *a, *y))
                .collect::<Result<Vec<f64>, _>>()
                .map(Value::Series),
        }
    }

    /// Applies a unary operator, lifted elementwise over a series.
    pub fn unary(op: UnaryOp, operand: &Value) -> Value {
        match op {
            UnaryOp::Neg => match operand {
                Value::Scalar(v) => Value::Scalar(-v),
                Value::Series(data) => Value::Series(data.iter().map(|v| -v).collect()),
            },
        }
    }
}

/// The scalar core every operator lifts from.
///
/// Comparisons and logical operators yield 1.0/0.0. AND/OR treat any nonzero
/// operand as true. Division by exact zero is an error, not infinity.
fn scalar_op(op: BinaryOp, a: f64, b: f64) -> Result<f64, FormulaError> {
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(FormulaError::runtime("division by zero"));
            }
            a / b
        }
        BinaryOp::Gt => truth(a > b),
        BinaryOp::Lt => truth(a < b),
        BinaryOp::Ge => truth(a >= b),
        BinaryOp::Le => truth(a <= b),
        BinaryOp::Eq => truth((a - b).abs() < EQ_TOLERANCE),
        BinaryOp::Ne => truth((a - b).abs() >= EQ_TOLERANCE),
        BinaryOp::And => truth(a != 0.0 && b != 0.0),
        BinaryOp::Or => truth(a != 0.0 || b != 0.0),
    };
    Ok(result)
}

fn truth(condition: bool) -> f64 {
    if condition {
        1.0
    } else {
        0.0
    }
}
