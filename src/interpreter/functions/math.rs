// File: src/interpreter/functions/math.rs
//
// Elementwise math, no windowing.

use super::arity;
use crate::errors::FormulaError;
use crate::interpreter::value::Value;

/// MAX(a, b): elementwise or scalar maximum. Both arguments must have the
/// same shape; one series and one scalar is rejected.
pub fn max(args: &[Value]) -> Result<Value, FormulaError> {
    pairwise("MAX", args, f64::max)
}

/// MIN(a, b): elementwise or scalar minimum, same shape rules as MAX.
pub fn min(args: &[Value]) -> Result<Value, FormulaError> {
    pairwise("MIN", args, f64::min)
}

fn pairwise(name: &str, args: &[Value], combine: fn(f64, f64) -> f64) -> Result<Value, FormulaError> {
    arity(name, args, 2)?;

    match (&args[0], &args[1]) {
        (Value::Scalar(a), Value::Scalar(b)) => Ok(Value::Scalar(combine(*a, *b))),
        (Value::Series(a), Value::Series(b)) => {
            if a.len() != b.len() {
                return Err(FormulaError::runtime(format!("{}: series length mismatch", name)));
            }
            Ok(Value::Series(
                a.iter().zip(b.iter()).map(|(x, y)| combine(*x, *y)).collect(),
            ))
        }
        _ => Err(FormulaError::runtime(format!("{}: incompatible argument types", name))),
    }
}

/// ABS(x): absolute value, elementwise over a series.
pub fn abs(args: &[Value]) -> Result<Value, FormulaError> {
    unary_math("ABS", args, f64::abs)
}

/// SQRT(x): square root, elementwise over a series.
pub fn sqrt(args: &[Value]) -> Result<Value, FormulaError> {
    unary_math("SQRT", args, f64::sqrt)
}

fn unary_math(name: &str, args: &[Value], apply: fn(f64) -> f64) -> Result<Value, FormulaError> {
    arity(name, args, 1)?;

    match &args[0] {
        Value::Scalar(v) => Ok(Value::Scalar(apply(*v))),
        Value::Series(data) => Ok(Value::Series(data.iter().map(|v| apply(*v)).collect())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_and_min_work_elementwise() {
        let a = Value::Series(vec![1.0, 5.0]);
        let b = Value::Series(vec![3.0, 2.0]);
        assert_eq!(max(&[a.clone(), b.clone()]).unwrap(), Value::Series(vec![3.0, 5.0]));
        assert_eq!(min(&[a, b]).unwrap(), Value::Series(vec![1.0, 2.0]));
    }

    #[test]
    fn max_and_min_work_on_scalars() {
        assert_eq!(max(&[Value::Scalar(1.0), Value::Scalar(2.0)]).unwrap(), Value::Scalar(2.0));
        assert_eq!(min(&[Value::Scalar(1.0), Value::Scalar(2.0)]).unwrap(), Value::Scalar(1.0));
    }

    #[test]
    fn mixed_shapes_are_rejected() {
        let err = max(&[Value::Series(vec![1.0]), Value::Scalar(2.0)]).unwrap_err();
        assert!(err.message().contains("MAX: incompatible argument types"));
    }

    #[test]
    fn abs_and_sqrt_lift_over_series() {
        let v = abs(&[Value::Series(vec![-1.0, 2.0])]).unwrap();
        assert_eq!(v, Value::Series(vec![1.0, 2.0]));
        let v = sqrt(&[Value::Series(vec![4.0, 9.0])]).unwrap();
        assert_eq!(v, Value::Series(vec![2.0, 3.0]));
    }

    #[test]
    fn arity_is_checked() {
        assert!(abs(&[]).is_err());
        assert!(max(&[Value::Scalar(1.0)]).is_err());
    }
}
