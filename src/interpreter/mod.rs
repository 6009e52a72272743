// File: src/interpreter/mod.rs
//
// Tree-walking interpreter for formula programs.
// Executes a parsed program by traversing the AST statement by statement.
//
// The interpreter seeds its environment with the six built-in series taken
// from the input bars (OPEN, CLOSE, HIGH, LOW, VOLUME, AMOUNT), evaluates
// each statement's expression into a Value, and binds declared names in
// source order. Later statements may reference any earlier binding, never a
// later one. After the last statement, declared names holding a series
// become output lines in declaration order; scalar declarations land in the
// result's variable map instead.

mod environment;
pub mod functions;
mod value;

pub use environment::Environment;
pub use functions::{FunctionRegistry, NativeFn};
pub use value::Value;

use crate::ast::{Expr, LineStyle, Program, Stmt};
use crate::errors::{find_closest_match, FormulaError};
use crate::market::Bar;
use crate::result::FormulaResult;
use ahash::AHashMap;

/// Name given to bare expression statements that are not plain identifier
/// references, so they still surface in the output.
const ANONYMOUS_EXPR: &str = "__expr__";

/// Executes one program over one bar sequence. All state is private to the
/// run; concurrent runs over independent inputs need no coordination.
pub struct Interpreter<'a> {
    bars: &'a [Bar],
    env: Environment,
    styles: AHashMap<String, LineStyle>,
    registry: FunctionRegistry,
}

impl<'a> Interpreter<'a> {
    pub fn new(bars: &'a [Bar], registry: FunctionRegistry) -> Self {
        Interpreter {
            bars,
            env: Environment::new(),
            styles: AHashMap::new(),
            registry,
        }
    }

    /// Runs the program and assembles the result.
    pub fn execute(mut self, program: &Program) -> Result<FormulaResult, FormulaError> {
        self.seed_builtin_series();

        for stmt in &program.statements {
            self.execute_statement(stmt)?;
        }

        Ok(self.build_result())
    }

    /// Seeds OPEN/CLOSE/HIGH/LOW/VOLUME/AMOUNT from the bars. With an empty
    /// bar sequence no series variables are defined at all, so any formula
    /// referencing them fails with an undefined-variable error.
    fn seed_builtin_series(&mut self) {
        if self.bars.is_empty() {
            return;
        }

        let n = self.bars.len();
        let mut open = Vec::with_capacity(n);
        let mut close = Vec::with_capacity(n);
        let mut high = Vec::with_capacity(n);
        let mut low = Vec::with_capacity(n);
        let mut volume = Vec::with_capacity(n);
        let mut amount = Vec::with_capacity(n);

        for bar in self.bars {
            open.push(bar.open);
            close.push(bar.close);
            high.push(bar.high);
            low.push(bar.low);
            volume.push(bar.volume);
            amount.push(bar.amount);
        }

        self.env.define("OPEN", Value::Series(open));
        self.env.define("CLOSE", Value::Series(close));
        self.env.define("HIGH", Value::Series(high));
        self.env.define("LOW", Value::Series(low));
        self.env.define("VOLUME", Value::Series(volume));
        self.env.define("AMOUNT", Value::Series(amount));
    }

    fn execute_statement(&mut self, stmt: &Stmt) -> Result<(), FormulaError> {
        match stmt {
            Stmt::Declare { name, value } => {
                let value = self.evaluate(value)?;
                self.env.declare(name.clone(), value);
            }
            Stmt::Output { name, value, style } => {
                let value = self.evaluate(value)?;
                self.env.declare(name.clone(), value);
                if let Some(style) = style {
                    self.styles.insert(name.clone(), style.clone());
                }
            }
            Stmt::Expr(expr) => {
                // Standalone expressions still surface in the output, under
                // the identifier's own name when there is one
                let value = self.evaluate(expr)?;
                let name = match expr {
                    Expr::Identifier(name) => name.clone(),
                    _ => ANONYMOUS_EXPR.to_string(),
                };
                self.env.declare(name, value);
            }
        }
        Ok(())
    }

    /// Direct structural recursion over the expression tree.
    fn evaluate(&self, expr: &Expr) -> Result<Value, FormulaError> {
        match expr {
            Expr::Number(v) => Ok(Value::Scalar(*v)),
            Expr::Identifier(name) => self.lookup(name),
            Expr::Unary { op, operand } => {
                let operand = self.evaluate(operand)?;
                Ok(Value::unary(*op, &operand))
            }
            Expr::Binary { op, left, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                Value::binary(*op, &left, &right)
            }
            Expr::Call { name, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.evaluate(arg)?);
                }
                self.registry.call(name, &values)
            }
        }
    }

    fn lookup(&self, name: &str) -> Result<Value, FormulaError> {
        match self.env.get(name) {
            Some(value) => Ok(value.clone()),
            None => {
                let mut message = format!("undefined variable: {}", name);
                let known = self.env.names();
                if let Some(suggestion) = find_closest_match(name, &known) {
                    message.push_str(&format!(" (did you mean {}?)", suggestion));
                }
                Err(FormulaError::runtime(message))
            }
        }
    }

    fn build_result(&self) -> FormulaResult {
        let mut result = FormulaResult::new();

        for name in self.env.declared() {
            match self.env.get(name) {
                Some(Value::Series(data)) => {
                    result.add_output(name.clone(), data.clone(), self.styles.get(name).cloned());
                }
                Some(Value::Scalar(v)) => {
                    result.set_variable(name.clone(), *v);
                }
                None => unreachable!("declared names are always bound"),
            }
        }

        result
    }
}
