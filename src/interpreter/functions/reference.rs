// File: src/interpreter/functions/reference.rs
//
// Lookback functions: values and extrema from earlier bars.

use super::{arity, scalar_arg, series_arg, windowed};
use crate::errors::FormulaError;
use crate::interpreter::value::Value;

/// REF(data, n): the value n steps back. The first n positions are NaN;
/// n = 0 is the identity. Unlike the windowed functions, n may exceed the
/// series length (every position is then NaN).
pub fn ref_back(args: &[Value]) -> Result<Value, FormulaError> {
    arity("REF", args, 2)?;
    let data = series_arg("REF", args, 0)?;
    let n = scalar_arg("REF", args, 1)? as i64;
    if n < 0 {
        return Err(FormulaError::runtime("REF period must be non-negative"));
    }
    let shift = n as usize;

    let mut out = vec![f64::NAN; data.len()];
    for i in shift..data.len() {
        out[i] = data[i - shift];
    }
    Ok(Value::Series(out))
}

/// HHV(data, n): highest value over the trailing window, NaN warm-up.
pub fn hhv(args: &[Value]) -> Result<Value, FormulaError> {
    windowed("HHV", args, f64::NAN, |window| {
        window.iter().copied().fold(f64::MIN, f64::max)
    })
}

/// LLV(data, n): lowest value over the trailing window, NaN warm-up.
pub fn llv(args: &[Value]) -> Result<Value, FormulaError> {
    windowed("LLV", args, f64::NAN, |window| {
        window.iter().copied().fold(f64::MAX, f64::min)
    })
}

/// BARSLAST(condition): bars since the condition was last nonzero.
/// 0 at a true position, NaN before the first true position.
pub fn bars_last(args: &[Value]) -> Result<Value, FormulaError> {
    arity("BARSLAST", args, 1)?;
    let condition = series_arg("BARSLAST", args, 0)?;

    let mut out = vec![f64::NAN; condition.len()];
    let mut last_true: Option<usize> = None;
    for (i, &c) in condition.iter().enumerate() {
        if c != 0.0 {
            last_true = Some(i);
            out[i] = 0.0;
        } else if let Some(t) = last_true {
            out[i] = (i - t) as f64;
        }
    }
    Ok(Value::Series(out))
}
