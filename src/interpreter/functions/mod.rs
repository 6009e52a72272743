// File: src/interpreter/functions/mod.rs
//
// Built-in function registry for the formula interpreter.
// Dispatch is by exact uppercased name; each function validates its own
// arity and argument shapes before computing. Implementations are grouped
// by category in the submodules.
//
// The default table is built once at process start. A registry instance is
// a plain cloneable mapping, so a host can register additional functions on
// its engine before running formulas.

pub mod averages;
pub mod dispersion;
pub mod math;
pub mod reference;
pub mod signals;

use super::value::Value;
use crate::errors::{find_closest_match, FormulaError};
use ahash::AHashMap;
use once_cell::sync::Lazy;

/// A built-in or host-registered function.
/// Arguments arrive fully evaluated, in call order.
pub type NativeFn = fn(&[Value]) -> Result<Value, FormulaError>;

/// Default name -> implementation table, built once.
static BUILTINS: Lazy<Vec<(&'static str, NativeFn)>> = Lazy::new(|| {
    let table: Vec<(&'static str, NativeFn)> = vec![
        // Moving averages and accumulation
        ("MA", averages::ma),
        ("SMA", averages::ma),
        ("EMA", averages::ema),
        ("WMA", averages::wma),
        ("SUM", averages::sum),
        // Dispersion
        ("STD", dispersion::stdev),
        ("VAR", dispersion::variance),
        ("AVEDEV", dispersion::avedev),
        // Reference / lookback
        ("REF", reference::ref_back),
        ("HHV", reference::hhv),
        ("LLV", reference::llv),
        ("BARSLAST", reference::bars_last),
        // Conditions and signals
        ("IF", signals::select),
        ("CROSS", signals::cross),
        ("FILTER", signals::filter),
        ("COUNT", signals::count),
        ("EVERY", signals::every),
        ("EXIST", signals::exist),
        ("BETWEEN", signals::between),
        // Elementwise math
        ("MAX", math::max),
        ("MIN", math::min),
        ("ABS", math::abs),
        ("SQRT", math::sqrt),
    ];
    table
});

/// Name -> implementation table with case-insensitive dispatch.
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    functions: AHashMap<String, NativeFn>,
}

impl FunctionRegistry {
    /// A registry pre-populated with the built-in function library.
    pub fn new() -> Self {
        let mut registry = FunctionRegistry { functions: AHashMap::new() };
        for &(name, function) in BUILTINS.iter() {
            registry.register(name, function);
        }
        registry
    }

    /// Registers a function under an uppercased name, replacing any
    /// previous binding.
    pub fn register(&mut self, name: &str, function: NativeFn) {
        self.functions.insert(name.to_ascii_uppercase(), function);
    }

    /// Dispatches a call by uppercased name.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, FormulaError> {
        let key = name.to_ascii_uppercase();
        match self.functions.get(&key) {
            Some(function) => function(args),
            None => {
                let mut message = format!("undefined function: {}", name);
                let known: Vec<String> = self.functions.keys().cloned().collect();
                if let Some(suggestion) = find_closest_match(&key, &known) {
                    message.push_str(&format!(" (did you mean {}?)", suggestion));
                }
                Err(FormulaError::runtime(message))
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(&name.to_ascii_uppercase())
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        FunctionRegistry::new()
    }
}

// Shared argument validation, used by every category module.

pub(crate) fn arity(name: &str, args: &[Value], expected: usize) -> Result<(), FormulaError> {
    if args.len() != expected {
        let plural = if expected == 1 { "" } else { "s" };
        return Err(FormulaError::runtime(format!(
            "{} requires {} argument{}",
            name, expected, plural
        )));
    }
    Ok(())
}

pub(crate) fn series_arg<'a>(name: &str, args: &'a [Value], pos: usize) -> Result<&'a [f64], FormulaError> {
    match &args[pos] {
        Value::Series(data) => Ok(data),
        Value::Scalar(_) => Err(FormulaError::runtime(format!(
            "{} {} argument must be a series",
            name,
            ordinal(pos)
        ))),
    }
}

pub(crate) fn scalar_arg(name: &str, args: &[Value], pos: usize) -> Result<f64, FormulaError> {
    match &args[pos] {
        Value::Scalar(v) => Ok(*v),
        Value::Series(_) => Err(FormulaError::runtime(format!(
            "{} {} argument must be a number",
            name,
            ordinal(pos)
        ))),
    }
}

/// A window length: scalar, truncated to integer, in 1..=len.
pub(crate) fn period_arg(name: &str, args: &[Value], pos: usize, len: usize) -> Result<usize, FormulaError> {
    let n = scalar_arg(name, args, pos)? as i64;
    if n <= 0 || n as usize > len {
        return Err(FormulaError::runtime(format!(
            "{} period must be between 1 and {}",
            name, len
        )));
    }
    Ok(n as usize)
}

fn ordinal(pos: usize) -> &'static str {
    match pos {
        0 => "first",
        1 => "second",
        2 => "third",
        _ => "trailing",
    }
}

/// The trailing-window combinator behind most windowed built-ins.
///
/// Takes (series, period), fills positions before the window is full with
/// `warmup`, and applies `compute` to each full trailing window, oldest
/// element first.
pub(crate) fn windowed(
    name: &str,
    args: &[Value],
    warmup: f64,
    compute: impl Fn(&[f64]) -> f64,
) -> Result<Value, FormulaError> {
    arity(name, args, 2)?;
    let data = series_arg(name, args, 0)?;
    let n = period_arg(name, args, 1, data.len())?;

    let mut out = vec![warmup; data.len()];
    for i in (n - 1)..data.len() {
        out[i] = compute(&data[i + 1 - n..=i]);
    }
    Ok(Value::Series(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_is_case_insensitive() {
        let registry = FunctionRegistry::new();
        let args = [Value::Series(vec![1.0, 2.0, 3.0]), Value::Scalar(2.0)];
        let upper = registry.call("MA", &args).unwrap();
        let lower = registry.call("ma", &args).unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn unknown_function_suggests_a_near_name() {
        let registry = FunctionRegistry::new();
        let err = registry.call("CORSS", &[]).unwrap_err();
        let message = err.message();
        assert!(message.contains("undefined function: CORSS"));
        assert!(message.contains("did you mean CROSS?"));
    }

    #[test]
    fn host_registration_replaces_and_extends() {
        fn always_one(_args: &[Value]) -> Result<Value, FormulaError> {
            Ok(Value::Scalar(1.0))
        }

        let mut registry = FunctionRegistry::new();
        registry.register("typical", always_one);
        assert!(registry.contains("TYPICAL"));
        assert_eq!(registry.call("TyPiCaL", &[]).unwrap(), Value::Scalar(1.0));
    }

    #[test]
    fn arity_error_names_the_function() {
        let registry = FunctionRegistry::new();
        let err = registry.call("MA", &[Value::Scalar(1.0)]).unwrap_err();
        assert!(err.message().contains("MA requires 2 arguments"));
    }

    #[test]
    fn period_must_fit_the_series() {
        let registry = FunctionRegistry::new();
        let args = [Value::Series(vec![1.0, 2.0]), Value::Scalar(3.0)];
        let err = registry.call("MA", &args).unwrap_err();
        assert!(err.message().contains("MA period must be between 1 and 2"));

        let args = [Value::Series(vec![1.0, 2.0]), Value::Scalar(0.0)];
        assert!(registry.call("MA", &args).is_err());
    }

    #[test]
    fn period_must_be_a_scalar() {
        let registry = FunctionRegistry::new();
        let args = [
            Value::Series(vec![1.0, 2.0]),
            Value::Series(vec![1.0, 2.0]),
        ];
        let err = registry.call("MA", &args).unwrap_err();
        assert!(err.message().contains("MA second argument must be a number"));
    }
}
