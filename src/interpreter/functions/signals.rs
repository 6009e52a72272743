// File: src/interpreter/functions/signals.rs
//
// Condition and signal functions. These operate on 0/1-style condition
// series produced by comparisons, but any nonzero value counts as true.

use super::{arity, scalar_arg, series_arg, windowed};
use crate::errors::FormulaError;
use crate::interpreter::value::Value;

/// IF(cond, a, b). A scalar condition selects one branch value wholesale.
/// A series condition requires both branches to be series of equal length
/// and selects elementwise by nonzero test.
pub fn select(args: &[Value]) -> Result<Value, FormulaError> {
    arity("IF", args, 3)?;

    match &args[0] {
        Value::Scalar(condition) => {
            if *condition != 0.0 {
                Ok(args[1].clone())
            } else {
                Ok(args[2].clone())
            }
        }
        Value::Series(condition) => {
            let (Value::Series(when_true), Value::Series(when_false)) = (&args[1], &args[2]) else {
                return Err(FormulaError::runtime(
                    "IF: when the condition is a series, both branches must be series",
                ));
            };
            if condition.len() != when_true.len() || condition.len() != when_false.len() {
                return Err(FormulaError::runtime("IF: series length mismatch"));
            }

            let out = condition
                .iter()
                .zip(when_true.iter().zip(when_false.iter()))
                .map(|(c, (t, f))| if *c != 0.0 { *t } else { *f })
                .collect();
            Ok(Value::Series(out))
        }
    }
}

/// CROSS(a, b): 1 where a crosses above b, i.e. a[i-1] <= b[i-1] and
/// a[i] > b[i]. Upward crossings only; position 0 is always 0.
pub fn cross(args: &[Value]) -> Result<Value, FormulaError> {
    arity("CROSS", args, 2)?;
    let a = series_arg("CROSS", args, 0)?;
    let b = series_arg("CROSS", args, 1)?;
    if a.len() != b.len() {
        return Err(FormulaError::runtime("CROSS: series length mismatch"));
    }

    let mut out = vec![0.0; a.len()];
    for i in 1..a.len() {
        if a[i - 1] <= b[i - 1] && a[i] > b[i] {
            out[i] = 1.0;
        }
    }
    Ok(Value::Series(out))
}

/// FILTER(condition, n): emits 1 at the first nonzero condition, then
/// suppresses further signals for n positions (refractory window).
pub fn filter(args: &[Value]) -> Result<Value, FormulaError> {
    arity("FILTER", args, 2)?;
    let condition = series_arg("FILTER", args, 0)?;
    let n = scalar_arg("FILTER", args, 1)? as i64;
    if n <= 0 {
        return Err(FormulaError::runtime("FILTER period must be positive"));
    }

    let mut out = vec![0.0; condition.len()];
    // Seeded so a signal at index 0 always passes
    let mut last_signal: i64 = -n - 1;
    for (i, &c) in condition.iter().enumerate() {
        if c != 0.0 && (i as i64 - last_signal) >= n {
            out[i] = 1.0;
            last_signal = i as i64;
        }
    }
    Ok(Value::Series(out))
}

/// COUNT(condition, n): how many of the trailing n values are nonzero.
/// NaN warm-up like the numeric windows.
pub fn count(args: &[Value]) -> Result<Value, FormulaError> {
    windowed("COUNT", args, f64::NAN, |window| {
        window.iter().filter(|v| **v != 0.0).count() as f64
    })
}

/// EVERY(condition, n): 1 if all of the trailing n values are nonzero.
/// Warm-up positions are 0, not NaN.
pub fn every(args: &[Value]) -> Result<Value, FormulaError> {
    windowed("EVERY", args, 0.0, |window| {
        if window.iter().all(|v| *v != 0.0) {
            1.0
        } else {
            0.0
        }
    })
}

/// EXIST(condition, n): 1 if any of the trailing n values is nonzero.
/// Warm-up positions are 0, not NaN.
pub fn exist(args: &[Value]) -> Result<Value, FormulaError> {
    windowed("EXIST", args, 0.0, |window| {
        if window.iter().any(|v| *v != 0.0) {
            1.0
        } else {
            0.0
        }
    })
}

/// BETWEEN(value, lower, upper): 1 where lower <= value <= upper.
/// With a series value, each bound may independently be a scalar or a
/// series of the same length.
pub fn between(args: &[Value]) -> Result<Value, FormulaError> {
    arity("BETWEEN", args, 3)?;

    match &args[0] {
        Value::Scalar(v) => {
            let (Value::Scalar(lower), Value::Scalar(upper)) = (&args[1], &args[2]) else {
                return Err(FormulaError::runtime(
                    "BETWEEN: value must be a series when using series bounds",
                ));
            };
            let inside = *lower <= *v && *v <= *upper;
            Ok(Value::Scalar(if inside { 1.0 } else { 0.0 }))
        }
        Value::Series(values) => {
            let lower = bound_at("BETWEEN lower", &args[1], values.len())?;
            let upper = bound_at("BETWEEN upper", &args[2], values.len())?;

            let out = values
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    let inside = lower(i) <= *v && *v <= upper(i);
                    if inside {
                        1.0
                    } else {
                        0.0
                    }
                })
                .collect();
            Ok(Value::Series(out))
        }
    }
}

/// A bound usable per index: a scalar broadcasts, a series must match.
fn bound_at<'a>(
    label: &str,
    bound: &'a Value,
    len: usize,
) -> Result<impl Fn(usize) -> f64 + 'a, FormulaError> {
    if let Value::Series(data) = bound {
        if data.len() != len {
            return Err(FormulaError::runtime(format!("{} bound: series length mismatch", label)));
        }
    }
    Ok(move |i: usize| match bound {
        Value::Scalar(v) => *v,
        Value::Series(data) => data[i],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(data: &[f64]) -> Value {
        Value::Series(data.to_vec())
    }

    fn run(f: fn(&[Value]) -> Result<Value, FormulaError>, args: &[Value]) -> Vec<f64> {
        match f(args).unwrap() {
            Value::Series(out) => out,
            Value::Scalar(_) => panic!("expected series"),
        }
    }

    #[test]
    fn select_scalar_condition_picks_branch_wholesale() {
        let a = series(&[1.0, 2.0]);
        let b = series(&[3.0, 4.0]);
        assert_eq!(select(&[Value::Scalar(1.0), a.clone(), b.clone()]).unwrap(), a);
        assert_eq!(select(&[Value::Scalar(0.0), a, b.clone()]).unwrap(), b);
    }

    #[test]
    fn select_series_condition_picks_elementwise() {
        let out = run(
            select,
            &[series(&[1.0, 0.0, 2.0]), series(&[10.0, 20.0, 30.0]), series(&[-1.0, -2.0, -3.0])],
        );
        assert_eq!(out, vec![10.0, -2.0, 30.0]);
    }

    #[test]
    fn select_series_condition_requires_series_branches() {
        let err = select(&[series(&[1.0]), Value::Scalar(1.0), series(&[2.0])]).unwrap_err();
        assert!(err.message().contains("both branches must be series"));
    }

    #[test]
    fn cross_detects_upward_crossing_only() {
        let a = series(&[5.0, 6.0, 4.0, 7.0]);
        let b = series(&[5.0, 5.0, 5.0, 5.0]);
        let out = run(cross, &[a, b]);
        assert_eq!(out, vec![0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn cross_requires_two_series() {
        let err = cross(&[series(&[1.0]), Value::Scalar(1.0)]).unwrap_err();
        assert!(err.message().contains("CROSS second argument must be a series"));
    }

    #[test]
    fn filter_suppresses_within_refractory_window() {
        let out = run(filter, &[series(&[1.0, 1.0, 0.0, 0.0, 1.0]), Value::Scalar(3.0)]);
        assert_eq!(out, vec![1.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn count_counts_nonzero_in_window() {
        let out = run(count, &[series(&[1.0, 0.0, 2.0, 0.0]), Value::Scalar(2.0)]);
        assert!(out[0].is_nan());
        assert_eq!(&out[1..], &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn every_and_exist_fill_warmup_with_zero() {
        let condition = series(&[1.0, 1.0, 0.0, 1.0]);
        let all = run(every, &[condition.clone(), Value::Scalar(2.0)]);
        let any = run(exist, &[condition, Value::Scalar(2.0)]);
        assert_eq!(all, vec![0.0, 1.0, 0.0, 0.0]);
        assert_eq!(any, vec![0.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn between_mixes_scalar_and_series_bounds() {
        let out = run(
            between,
            &[series(&[1.0, 5.0, 9.0]), Value::Scalar(2.0), series(&[8.0, 8.0, 8.0])],
        );
        assert_eq!(out, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn between_all_scalars_is_a_scalar() {
        let v = between(&[Value::Scalar(5.0), Value::Scalar(1.0), Value::Scalar(9.0)]).unwrap();
        assert_eq!(v, Value::Scalar(1.0));
    }

    #[test]
    fn between_bounds_are_inclusive() {
        let out = run(between, &[series(&[2.0, 8.0]), Value::Scalar(2.0), Value::Scalar(8.0)]);
        assert_eq!(out, vec![1.0, 1.0]);
    }
}
