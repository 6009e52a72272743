// File: src/interpreter/functions/averages.rs
//
// Moving averages and trailing accumulation.

use super::{arity, period_arg, series_arg, windowed};
use crate::errors::FormulaError;
use crate::interpreter::value::Value;

/// MA(data, n) / SMA(data, n): simple moving average over the trailing n
/// points. The first n-1 positions are NaN.
pub fn ma(args: &[Value]) -> Result<Value, FormulaError> {
    windowed("MA", args, f64::NAN, |window| {
        window.iter().sum::<f64>() / window.len() as f64
    })
}

/// EMA(data, n): exponential average with smoothing 2/(n+1).
/// No NaN warm-up: the first output is the first input value.
pub fn ema(args: &[Value]) -> Result<Value, FormulaError> {
    arity("EMA", args, 2)?;
    let data = series_arg("EMA", args, 0)?;
    let n = period_arg("EMA", args, 1, data.len())?;

    let alpha = 2.0 / (n as f64 + 1.0);
    let mut out = Vec::with_capacity(data.len());
    out.push(data[0]);
    for i in 1..data.len() {
        let previous = out[i - 1];
        out.push(alpha * data[i] + (1.0 - alpha) * previous);
    }
    Ok(Value::Series(out))
}

/// WMA(data, n): linearly weighted average, most recent point weight n,
/// oldest weight 1, divided by n(n+1)/2.
pub fn wma(args: &[Value]) -> Result<Value, FormulaError> {
    windowed("WMA", args, f64::NAN, |window| {
        let n = window.len();
        let weight_sum = (n * (n + 1) / 2) as f64;
        let weighted: f64 = window
            .iter()
            .enumerate()
            .map(|(k, v)| v * (k + 1) as f64)
            .sum();
        weighted / weight_sum
    })
}

/// SUM(data, n): trailing sum, NaN warm-up.
pub fn sum(args: &[Value]) -> Result<Value, FormulaError> {
    windowed("SUM", args, f64::NAN, |window| window.iter().sum())
}
