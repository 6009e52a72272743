// File: src/interpreter/functions/dispersion.rs
//
// Dispersion measures over a trailing window. All three use the population
// convention: divide by n, not n-1.

use super::windowed;
use crate::errors::FormulaError;
use crate::interpreter::value::Value;

fn mean(window: &[f64]) -> f64 {
    window.iter().sum::<f64>() / window.len() as f64
}

fn population_variance(window: &[f64]) -> f64 {
    let m = mean(window);
    window.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / window.len() as f64
}

/// STD(data, n): population standard deviation over the trailing window.
pub fn stdev(args: &[Value]) -> Result<Value, FormulaError> {
    windowed("STD", args, f64::NAN, |window| population_variance(window).sqrt())
}

/// VAR(data, n): population variance over the trailing window.
pub fn variance(args: &[Value]) -> Result<Value, FormulaError> {
    windowed("VAR", args, f64::NAN, population_variance)
}

/// AVEDEV(data, n): mean absolute deviation from the window's own mean.
pub fn avedev(args: &[Value]) -> Result<Value, FormulaError> {
    windowed("AVEDEV", args, f64::NAN, |window| {
        let m = mean(window);
        window.iter().map(|v| (v - m).abs()).sum::<f64>() / window.len() as f64
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(f: fn(&[Value]) -> Result<Value, FormulaError>, data: &[f64], n: f64) -> Vec<f64> {
        match f(&[Value::Series(data.to_vec()), Value::Scalar(n)]).unwrap() {
            Value::Series(out) => out,
            Value::Scalar(_) => panic!("expected series"),
        }
    }

    #[test]
    fn variance_divides_by_n() {
        let out = run(variance, &[2.0, 4.0, 6.0], 3.0);
        assert!(out[0].is_nan() && out[1].is_nan());
        // mean 4, squared deviations 4 + 0 + 4, / 3
        assert!((out[2] - 8.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn stdev_is_sqrt_of_variance() {
        let v = run(variance, &[2.0, 4.0, 6.0], 3.0)[2];
        let s = run(stdev, &[2.0, 4.0, 6.0], 3.0)[2];
        assert!((s - v.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn avedev_uses_absolute_deviations() {
        let out = run(avedev, &[1.0, 2.0, 9.0], 3.0);
        // mean 4, |1-4| + |2-4| + |9-4| = 10, / 3
        assert!((out[2] - 10.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn constant_window_has_zero_spread() {
        assert_eq!(run(stdev, &[5.0, 5.0, 5.0], 3.0)[2], 0.0);
        assert_eq!(run(avedev, &[5.0, 5.0, 5.0], 3.0)[2], 0.0);
    }
}
