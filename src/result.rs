// File: src/result.rs
//
// The result of one formula run: output series in declaration order, plus a
// map of scalar declarations. Created empty, populated statement by
// statement, never mutated after the run returns it.

use crate::ast::LineStyle;
use serde::Serialize;
use std::collections::HashMap;

/// One named output series, aligned one-to-one with the input bars.
/// Style is inert presentation metadata from the declaration, if any.
#[derive(Debug, Clone, Serialize)]
pub struct OutputLine {
    pub name: String,
    pub data: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<LineStyle>,
}

impl PartialEq for OutputLine {
    fn eq(&self, other: &Self) -> bool {
        // NaN marks warm-up positions; matching NaN slots compare equal so
        // that two identical runs produce equal output lines.
        self.name == other.name
            && self.style == other.style
            && self.data.len() == other.data.len()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| a == b || (a.is_nan() && b.is_nan()))
    }
}

/// Everything a run produces. Declarations that evaluated to a series
/// become `outputs`, in declaration order; scalar declarations go into
/// `variables` instead and are not output lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormulaResult {
    pub outputs: Vec<OutputLine>,
    pub variables: HashMap<String, f64>,
}

impl FormulaResult {
    pub fn new() -> Self {
        FormulaResult::default()
    }

    pub fn add_output(&mut self, name: String, data: Vec<f64>, style: Option<LineStyle>) {
        self.outputs.push(OutputLine { name, data, style });
    }

    pub fn set_variable(&mut self, name: String, value: f64) {
        self.variables.insert(name, value);
    }

    /// Looks up an output line by name (first match in declaration order).
    pub fn output(&self, name: &str) -> Option<&OutputLine> {
        self.outputs.iter().find(|line| line.name == name)
    }

    pub fn variable(&self, name: &str) -> Option<f64> {
        self.variables.get(name).copied()
    }
}
