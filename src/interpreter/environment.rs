// File: src/interpreter/environment.rs
//
// Variable environment for the formula interpreter.
//
// A flat name -> Value map plus a separately tracked, insertion-ordered list
// of user-declared names. The list exists only to order the final output;
// the map itself has no meaningful order. Built-in series (OPEN, CLOSE, ...)
// are seeded without being recorded, so they never appear in the result
// unless a formula declares them explicitly.

use super::value::Value;
use ahash::AHashMap;

#[derive(Debug, Clone, Default)]
pub struct Environment {
    values: AHashMap<String, Value>,
    declared: Vec<String>,
}

impl Environment {
    pub fn new() -> Self {
        Environment::default()
    }

    /// Binds a built-in name. Not recorded in declaration order.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Binds a user declaration and records it in declaration order.
    /// Declaring the same name twice records it twice; the result carries
    /// the final binding at each recorded position.
    pub fn declare(&mut self, name: String, value: Value) {
        self.values.insert(name.clone(), value);
        self.declared.push(name);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// User-declared names in source order.
    pub fn declared(&self) -> &[String] {
        &self.declared
    }

    /// All bound names, for "did you mean?" suggestions.
    pub fn names(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_not_recorded_as_declared() {
        let mut env = Environment::new();
        env.define("CLOSE", Value::Series(vec![1.0]));
        env.declare("MA5".to_string(), Value::Scalar(1.0));

        assert_eq!(env.declared(), &["MA5".to_string()]);
        assert!(env.get("CLOSE").is_some());
    }

    #[test]
    fn declarations_keep_source_order() {
        let mut env = Environment::new();
        env.declare("B".to_string(), Value::Scalar(1.0));
        env.declare("A".to_string(), Value::Scalar(2.0));
        env.declare("C".to_string(), Value::Scalar(3.0));

        assert_eq!(env.declared(), &["B".to_string(), "A".to_string(), "C".to_string()]);
    }

    #[test]
    fn redeclaring_shadows_the_previous_binding() {
        let mut env = Environment::new();
        env.define("CLOSE", Value::Series(vec![1.0, 2.0]));
        env.declare("CLOSE".to_string(), Value::Series(vec![2.0, 4.0]));

        assert_eq!(env.get("CLOSE"), Some(&Value::Series(vec![2.0, 4.0])));
        assert_eq!(env.declared(), &["CLOSE".to_string()]);
    }
}
