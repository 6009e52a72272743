// File: src/parser.rs
//
// Recursive descent parser for the formula language.
// Transforms the token stream into an Abstract Syntax Tree.
//
// Grammar, lowest to highest precedence:
//
//   program      := (newline | statement)*
//   statement    := IDENTIFIER ':=' expression stmt-end?
//                 | IDENTIFIER ':'  expression style-clause? stmt-end?
//                 | expression stmt-end?
//   stmt-end     := ';' | newline
//   expression   := logic-or
//   logic-or     := logic-and (OR logic-and)*
//   logic-and    := comparison (AND comparison)*
//   comparison   := additive ((> | < | >= | <= | == | !=) additive)*
//   additive     := multiplicative ((+ | -) multiplicative)*
//   multiplicative := unary ((* | /) unary)*
//   unary        := '-' unary | primary
//   primary      := NUMBER | IDENTIFIER ['(' arglist ')'] | '(' expression ')'
//   arglist      := (expression (',' expression)*)?
//   style-clause := (',' (COLOR ident | LINETHICK number | DOTLINE | STICK))*
//
// The parser uses one token of lookahead beyond the current token, which is
// what disambiguates `x := ...` / `x : ...` from a bare expression starting
// with an identifier. There is no error recovery: the first structural
// problem aborts the whole parse.

use crate::ast::{BinaryOp, Expr, LineStyle, Program, Stmt, UnaryOp};
use crate::errors::FormulaError;
use crate::lexer::{Token, TokenKind};

/// Parser maintains a position in the token stream; the stream always ends
/// with an EOF token, which doubles as the position for end-of-input errors.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    /// Parse the entire token stream into a program.
    pub fn parse(&mut self) -> Result<Program, FormulaError> {
        let mut statements = Vec::new();

        while !self.at_end() {
            // Blank lines between statements
            if self.current().kind == TokenKind::Newline {
                self.advance();
                continue;
            }
            statements.push(self.parse_statement()?);
        }

        Ok(Program { statements })
    }

    fn parse_statement(&mut self) -> Result<Stmt, FormulaError> {
        if self.current().kind == TokenKind::Identifier {
            match self.peek_next().map(|t| t.kind) {
                Some(TokenKind::Assign) => return self.parse_declaration(),
                Some(TokenKind::Colon) => return self.parse_output(),
                _ => {}
            }
        }

        let expr = self.parse_expression()?;
        self.skip_statement_end();
        Ok(Stmt::Expr(expr))
    }

    /// `name := expression`
    fn parse_declaration(&mut self) -> Result<Stmt, FormulaError> {
        let name = self.current().text.clone();
        self.advance(); // identifier
        self.advance(); // :=

        let value = self.parse_expression()?;
        self.skip_statement_end();

        Ok(Stmt::Declare { name, value })
    }

    /// `name : expression` with an optional trailing style clause.
    /// Style metadata is inert: it rides through to the output untouched.
    fn parse_output(&mut self) -> Result<Stmt, FormulaError> {
        let name = self.current().text.clone();
        self.advance(); // identifier
        self.advance(); // :

        let value = self.parse_expression()?;
        let style = self.parse_style_clause()?;
        self.skip_statement_end();

        Ok(Stmt::Output { name, value, style })
    }

    fn parse_style_clause(&mut self) -> Result<Option<LineStyle>, FormulaError> {
        let mut style: Option<LineStyle> = None;

        while self.current().kind == TokenKind::Comma
            && matches!(
                self.peek_next().map(|t| t.kind),
                Some(TokenKind::Color | TokenKind::LineThick | TokenKind::DotLine | TokenKind::Stick)
            )
        {
            self.advance(); // comma
            let entry = style.get_or_insert_with(LineStyle::default);

            match self.current().kind {
                TokenKind::Color => {
                    self.advance();
                    if self.current().kind != TokenKind::Identifier {
                        return Err(self.error("expected color name after COLOR"));
                    }
                    entry.color = Some(self.current().text.clone());
                    self.advance();
                }
                TokenKind::LineThick => {
                    self.advance();
                    if self.current().kind != TokenKind::Number {
                        return Err(self.error("expected line width after LINETHICK"));
                    }
                    let text = self.current().text.clone();
                    let width: f64 = text
                        .parse()
                        .map_err(|_| self.error(format!("invalid number: {}", text)))?;
                    entry.line_thick = Some(width as u32);
                    self.advance();
                }
                TokenKind::DotLine => {
                    entry.dotted = true;
                    self.advance();
                }
                TokenKind::Stick => {
                    entry.stick = true;
                    self.advance();
                }
                _ => unreachable!("guarded by the lookahead above"),
            }
        }

        Ok(style)
    }

    /// Consumes one trailing ';' or newline if present.
    fn skip_statement_end(&mut self) {
        if !self.at_end()
            && matches!(self.current().kind, TokenKind::Semicolon | TokenKind::Newline)
        {
            self.advance();
        }
    }

    fn parse_expression(&mut self) -> Result<Expr, FormulaError> {
        self.parse_logic_or()
    }

    fn parse_logic_or(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.parse_logic_and()?;

        while self.current().kind == TokenKind::Or {
            self.advance();
            let right = self.parse_logic_and()?;
            left = binary(BinaryOp::Or, left, right);
        }

        Ok(left)
    }

    fn parse_logic_and(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.parse_comparison()?;

        while self.current().kind == TokenKind::And {
            self.advance();
            let right = self.parse_comparison()?;
            left = binary(BinaryOp::And, left, right);
        }

        Ok(left)
    }

    // Comparisons are left-associative with no chaining restriction:
    // `a > b > c` parses as `(a > b) > c`.
    fn parse_comparison(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match self.current().kind {
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Ge => BinaryOp::Ge,
                TokenKind::Le => BinaryOp::Le,
                TokenKind::Eq => BinaryOp::Eq,
                TokenKind::Ne => BinaryOp::Ne,
                _ => return Ok(left),
            };

            self.advance();
            let right = self.parse_additive()?;
            left = binary(op, left, right);
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.parse_multiplicative()?;

        while matches!(self.current().kind, TokenKind::Plus | TokenKind::Minus) {
            let op = if self.current().kind == TokenKind::Plus {
                BinaryOp::Add
            } else {
                BinaryOp::Sub
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.parse_unary()?;

        while matches!(self.current().kind, TokenKind::Star | TokenKind::Slash) {
            let op = if self.current().kind == TokenKind::Star {
                BinaryOp::Mul
            } else {
                BinaryOp::Div
            };
            self.advance();
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, FormulaError> {
        if self.current().kind == TokenKind::Minus {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary { op: UnaryOp::Neg, operand: Box::new(operand) });
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, FormulaError> {
        match self.current().kind {
            TokenKind::Number => self.parse_number(),
            // IF is accepted as a function name here; the language has no
            // native conditional syntax
            TokenKind::Identifier | TokenKind::If => self.parse_identifier_or_call(),
            TokenKind::LParen => self.parse_grouped(),
            TokenKind::Eof => Err(self.error("unexpected end of input")),
            other => Err(self.error(format!("unexpected token: {}", other))),
        }
    }

    fn parse_number(&mut self) -> Result<Expr, FormulaError> {
        let text = self.current().text.clone();
        let value: f64 = text
            .parse()
            .map_err(|_| self.error(format!("invalid number: {}", text)))?;
        self.advance();
        Ok(Expr::Number(value))
    }

    fn parse_identifier_or_call(&mut self) -> Result<Expr, FormulaError> {
        let name = self.current().text.clone();
        self.advance();

        if self.current().kind == TokenKind::LParen {
            return self.parse_call(name);
        }

        Ok(Expr::Identifier(name))
    }

    fn parse_call(&mut self, name: String) -> Result<Expr, FormulaError> {
        self.advance(); // (

        let mut args = Vec::new();
        while !self.at_end() && self.current().kind != TokenKind::RParen {
            args.push(self.parse_expression()?);

            if self.current().kind == TokenKind::Comma {
                self.advance();
            } else if self.current().kind != TokenKind::RParen {
                return Err(self.error("expected ',' or ')' in function call"));
            }
        }

        if self.current().kind != TokenKind::RParen {
            return Err(self.error("expected ')' after function arguments"));
        }
        self.advance(); // )

        Ok(Expr::Call { name, args })
    }

    fn parse_grouped(&mut self) -> Result<Expr, FormulaError> {
        self.advance(); // (

        let expr = self.parse_expression()?;

        if self.current().kind != TokenKind::RParen {
            return Err(self.error("expected ')' after expression"));
        }
        self.advance(); // )

        Ok(expr)
    }

    /// The current token. Safe at any position: the stream ends in EOF and
    /// the cursor never moves past it.
    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or_else(|| {
            self.tokens.last().expect("token stream always ends with EOF")
        })
    }

    fn peek_next(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1)
    }

    fn advance(&mut self) {
        if !self.at_end() {
            self.pos += 1;
        }
    }

    fn at_end(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    fn error(&self, message: impl Into<String>) -> FormulaError {
        let token = self.current();
        FormulaError::parse(message, token.line, token.column)
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary { op, left: Box::new(left), right: Box::new(right) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse(source: &str) -> Program {
        Parser::new(tokenize(source).unwrap()).parse().unwrap()
    }

    fn parse_err(source: &str) -> FormulaError {
        Parser::new(tokenize(source).unwrap()).parse().unwrap_err()
    }

    #[test]
    fn declaration_needs_assign_lookahead() {
        let program = parse("MA5 := MA(CLOSE, 5)");
        assert_eq!(program.statements.len(), 1);
        match &program.statements[0] {
            Stmt::Declare { name, value } => {
                assert_eq!(name, "MA5");
                assert!(matches!(value, Expr::Call { name, args } if name == "MA" && args.len() == 2));
            }
            other => panic!("expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn bare_identifier_is_an_expression_statement() {
        let program = parse("CLOSE");
        assert!(matches!(
            &program.statements[0],
            Stmt::Expr(Expr::Identifier(name)) if name == "CLOSE"
        ));
    }

    #[test]
    fn precedence_mul_binds_tighter_than_add() {
        let program = parse("X := 1 + 2 * 3");
        match &program.statements[0] {
            Stmt::Declare { value: Expr::Binary { op: BinaryOp::Add, right, .. }, .. } => {
                assert!(matches!(**right, Expr::Binary { op: BinaryOp::Mul, .. }));
            }
            other => panic!("expected 1 + (2 * 3), got {:?}", other),
        }
    }

    #[test]
    fn comparison_binds_looser_than_arithmetic() {
        let program = parse("S := CLOSE - OPEN > 0");
        match &program.statements[0] {
            Stmt::Declare { value: Expr::Binary { op: BinaryOp::Gt, left, .. }, .. } => {
                assert!(matches!(**left, Expr::Binary { op: BinaryOp::Sub, .. }));
            }
            other => panic!("expected (CLOSE - OPEN) > 0, got {:?}", other),
        }
    }

    #[test]
    fn comparison_chains_left_to_right() {
        // (a > b) > c: accepted quirk, not a rejected form
        let program = parse("X := a > b > c");
        match &program.statements[0] {
            Stmt::Declare { value: Expr::Binary { op: BinaryOp::Gt, left, .. }, .. } => {
                assert!(matches!(**left, Expr::Binary { op: BinaryOp::Gt, .. }));
            }
            other => panic!("expected left-associative chain, got {:?}", other),
        }
    }

    #[test]
    fn if_is_usable_as_a_function_name() {
        let program = parse("X := IF(CLOSE > OPEN, 1, 0)");
        match &program.statements[0] {
            Stmt::Declare { value: Expr::Call { name, args }, .. } => {
                assert_eq!(name, "IF");
                assert_eq!(args.len(), 3);
            }
            other => panic!("expected IF call, got {:?}", other),
        }
    }

    #[test]
    fn unary_minus_nests() {
        let program = parse("X := --5");
        match &program.statements[0] {
            Stmt::Declare { value: Expr::Unary { operand, .. }, .. } => {
                assert!(matches!(**operand, Expr::Unary { .. }));
            }
            other => panic!("expected nested negation, got {:?}", other),
        }
    }

    #[test]
    fn statements_split_on_semicolon_and_newline() {
        let program = parse("A := 1; B := 2\nC := 3");
        assert_eq!(program.statements.len(), 3);
    }

    #[test]
    fn output_declaration_with_style_clause() {
        let program = parse("MA5 : MA(CLOSE, 5), COLOR red, LINETHICK 2, DOTLINE");
        match &program.statements[0] {
            Stmt::Output { name, style: Some(style), .. } => {
                assert_eq!(name, "MA5");
                assert_eq!(style.color.as_deref(), Some("red"));
                assert_eq!(style.line_thick, Some(2));
                assert!(style.dotted);
                assert!(!style.stick);
            }
            other => panic!("expected styled output, got {:?}", other),
        }
    }

    #[test]
    fn output_declaration_without_style() {
        let program = parse("DIF : CLOSE - OPEN");
        assert!(matches!(
            &program.statements[0],
            Stmt::Output { style: None, .. }
        ));
    }

    #[test]
    fn unclosed_call_reports_position() {
        let err = parse_err("X := MA(CLOSE, 5");
        match err {
            FormulaError::Parse { line, .. } => assert_eq!(line, 1),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn dangling_operator_is_unexpected_end() {
        let err = parse_err("X := 1 +");
        assert!(err.message().contains("unexpected end of input"));
    }

    #[test]
    fn malformed_exponent_is_an_invalid_number() {
        let err = parse_err("X := 1e");
        assert!(err.message().contains("invalid number: 1e"));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let program = parse("\n\nA := 1\n\n\nB := 2\n");
        assert_eq!(program.statements.len(), 2);
    }
}
