// File: src/engine.rs
//
// FormulaEngine: the façade wiring the pipeline stages together.
// Compile turns source text into an AST (lexer then parser); execute walks
// the AST over a bar sequence; run composes the two. The engine owns the
// function registry so a host can register extra functions once and reuse
// the engine across runs — each run's interpreter state stays private.

use crate::ast::Program;
use crate::errors::FormulaError;
use crate::interpreter::{FunctionRegistry, Interpreter, NativeFn};
use crate::lexer::Lexer;
use crate::market::Bar;
use crate::parser::Parser;
use crate::result::FormulaResult;

pub struct FormulaEngine {
    registry: FunctionRegistry,
}

impl FormulaEngine {
    /// An engine with the built-in function library.
    pub fn new() -> Self {
        FormulaEngine { registry: FunctionRegistry::new() }
    }

    /// Registers a host function, callable from formulas by (uppercased)
    /// name. Registering a builtin name replaces it.
    pub fn register_function(&mut self, name: &str, function: NativeFn) {
        self.registry.register(name, function);
    }

    /// Source text -> AST. Fails on the first lex or parse error.
    pub fn compile(&self, source: &str) -> Result<Program, FormulaError> {
        let tokens = Lexer::new(source).tokenize()?;
        Parser::new(tokens).parse()
    }

    /// AST + bars -> ordered output series and scalar variables.
    pub fn execute(&self, program: &Program, bars: &[Bar]) -> Result<FormulaResult, FormulaError> {
        Interpreter::new(bars, self.registry.clone()).execute(program)
    }

    /// Compile and execute in one step.
    pub fn run(&self, source: &str, bars: &[Bar]) -> Result<FormulaResult, FormulaError> {
        let program = self.compile(source)?;
        self.execute(&program, bars)
    }
}

impl Default for FormulaEngine {
    fn default() -> Self {
        FormulaEngine::new()
    }
}
