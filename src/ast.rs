// File: src/ast.rs
//
// Abstract Syntax Tree (AST) definitions for the formula language.
// The tree is immutable once built: the parser produces it, the interpreter
// only reads it. Every node is owned exactly once by its parent.

use serde::Serialize;
use std::fmt;

/// Binary operators, lowest payload in a BinaryExpression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,
    And,
    Or,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let symbol = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Gt => ">",
            BinaryOp::Lt => "<",
            BinaryOp::Ge => ">=",
            BinaryOp::Le => "<=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
        };
        write!(f, "{}", symbol)
    }
}

/// Unary operators. Negation is the only one the grammar admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
}

/// An expression: something that evaluates to a scalar or a series.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal; all numbers in the language are floating point
    Number(f64),
    /// Variable reference, resolved against the environment at run time
    Identifier(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Function call; the name is resolved case-insensitively in the registry
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

/// Presentation metadata attached to an output declaration.
/// Parsed and carried through to the result, never evaluated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LineStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_thick: Option<u32>,
    pub dotted: bool,
    pub stick: bool,
}

/// A statement: one line of a formula program.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `name := expression`
    Declare { name: String, value: Expr },
    /// `name : expression` with an optional trailing style clause
    Output {
        name: String,
        value: Expr,
        style: Option<LineStyle>,
    },
    /// A bare expression; still surfaces in the result under the
    /// expression's identifier name, or a placeholder
    Expr(Expr),
}

/// Root of the AST: an ordered sequence of statements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}
