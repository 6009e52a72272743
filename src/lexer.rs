// File: src/lexer.rs
//
// Lexical analyzer (tokenizer) for the formula language.
// Converts formula source text into a stream of tokens for parsing.
//
// Supports:
// - Numbers with optional decimal part and exponent (all floating point)
// - Identifiers and case-insensitive keywords (IF, AND, OR, plus the
//   chart-styling keywords COLOR, LINETHICK, DOTLINE, STICK)
// - Operators: +, -, *, /, >, <, >=, <=, ==, != (and the <> alias), :=
// - Punctuation: ( ) , ; :
// - Newlines as significant tokens (statement terminators, like ';')

use crate::errors::FormulaError;
use ahash::AHashMap;
use once_cell::sync::Lazy;
use std::fmt;

/// The closed set of token kinds the parser consumes.
/// Display strings exist only for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    Number,
    Identifier,

    // Arithmetic operators
    Plus,
    Minus,
    Star,
    Slash,

    // Comparison operators
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,

    // Logical keywords
    And,
    Or,

    // IF is a keyword token but is accepted wherever an identifier is
    // expected, so it can name the builtin IF(cond, a, b) function
    If,

    // Chart-styling keywords, reserved; parsed as output-style metadata only
    Color,
    LineThick,
    DotLine,
    Stick,

    // Punctuation
    LParen,
    RParen,
    Comma,
    Semicolon,
    Colon,

    // Assignment
    Assign,

    // Special
    Newline,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            TokenKind::Number => "NUMBER",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Star => "STAR",
            TokenKind::Slash => "SLASH",
            TokenKind::Gt => "GT",
            TokenKind::Lt => "LT",
            TokenKind::Ge => "GE",
            TokenKind::Le => "LE",
            TokenKind::Eq => "EQ",
            TokenKind::Ne => "NE",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::If => "IF",
            TokenKind::Color => "COLOR",
            TokenKind::LineThick => "LINETHICK",
            TokenKind::DotLine => "DOTLINE",
            TokenKind::Stick => "STICK",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::Comma => "COMMA",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Colon => "COLON",
            TokenKind::Assign => "ASSIGN",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Eof => "EOF",
        };
        write!(f, "{}", name)
    }
}

/// A single token with its source text and 1-indexed position.
/// Keywords are matched case-insensitively but `text` preserves the original
/// casing; identifier names are matched case-sensitively by the interpreter.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

/// Keyword table, built once at process start. Lookup is by uppercased text.
static KEYWORDS: Lazy<AHashMap<&'static str, TokenKind>> = Lazy::new(|| {
    let mut map = AHashMap::new();
    map.insert("IF", TokenKind::If);
    map.insert("AND", TokenKind::And);
    map.insert("OR", TokenKind::Or);
    map.insert("COLOR", TokenKind::Color);
    map.insert("LINETHICK", TokenKind::LineThick);
    map.insert("DOTLINE", TokenKind::DotLine);
    map.insert("STICK", TokenKind::Stick);
    map
});

/// Single left-to-right pass over the source with one character of lookahead.
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    /// Tokenizes the whole input, appending a final EOF token.
    /// The first unrecognizable character aborts the scan.
    pub fn tokenize(mut self) -> Result<Vec<Token>, FormulaError> {
        while !self.at_end() {
            self.scan_token()?;
        }
        let (line, column) = (self.line, self.column);
        self.push(TokenKind::Eof, String::new(), line, column);
        Ok(self.tokens)
    }

    fn scan_token(&mut self) -> Result<(), FormulaError> {
        // Skip whitespace, but not newlines: they terminate statements
        while !self.at_end() && matches!(self.peek(), ' ' | '\t' | '\r') {
            self.advance();
        }
        if self.at_end() {
            return Ok(());
        }

        let ch = self.peek();

        if ch == '\n' {
            let (line, column) = (self.line, self.column);
            self.push(TokenKind::Newline, "\n".to_string(), line, column);
            self.advance();
            self.line += 1;
            self.column = 1;
            return Ok(());
        }

        if ch.is_ascii_digit() {
            self.scan_number();
            return Ok(());
        }

        if ch.is_alphabetic() || ch == '_' {
            self.scan_identifier();
            return Ok(());
        }

        self.scan_operator()
    }

    /// Greedy number scan: digits, optional '.' + digits, optional exponent.
    /// Malformed trailing forms like "1e" are left for the parser's float
    /// conversion to reject, so the error points at the whole literal.
    fn scan_number(&mut self) {
        let start = self.pos;
        let (line, column) = (self.line, self.column);

        while !self.at_end() && self.peek().is_ascii_digit() {
            self.advance();
        }
        if !self.at_end() && self.peek() == '.' {
            self.advance();
            while !self.at_end() && self.peek().is_ascii_digit() {
                self.advance();
            }
        }
        if !self.at_end() && matches!(self.peek(), 'e' | 'E') {
            self.advance();
            if !self.at_end() && matches!(self.peek(), '+' | '-') {
                self.advance();
            }
            while !self.at_end() && self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let text: String = self.chars[start..self.pos].iter().collect();
        self.push(TokenKind::Number, text, line, column);
    }

    fn scan_identifier(&mut self) {
        let start = self.pos;
        let (line, column) = (self.line, self.column);

        while !self.at_end() && (self.peek().is_alphanumeric() || self.peek() == '_') {
            self.advance();
        }

        let text: String = self.chars[start..self.pos].iter().collect();
        let kind = KEYWORDS
            .get(text.to_ascii_uppercase().as_str())
            .copied()
            .unwrap_or(TokenKind::Identifier);
        self.push(kind, text, line, column);
    }

    fn scan_operator(&mut self) -> Result<(), FormulaError> {
        let (line, column) = (self.line, self.column);
        let ch = self.advance();

        let (kind, text) = match ch {
            '+' => (TokenKind::Plus, "+"),
            '-' => (TokenKind::Minus, "-"),
            '*' => (TokenKind::Star, "*"),
            '/' => (TokenKind::Slash, "/"),
            '(' => (TokenKind::LParen, "("),
            ')' => (TokenKind::RParen, ")"),
            ',' => (TokenKind::Comma, ","),
            ';' => (TokenKind::Semicolon, ";"),
            ':' => {
                if self.matches('=') {
                    (TokenKind::Assign, ":=")
                } else {
                    (TokenKind::Colon, ":")
                }
            }
            '>' => {
                if self.matches('=') {
                    (TokenKind::Ge, ">=")
                } else {
                    (TokenKind::Gt, ">")
                }
            }
            '<' => {
                if self.matches('=') {
                    (TokenKind::Le, "<=")
                } else if self.matches('>') {
                    // <> is an alias for !=
                    (TokenKind::Ne, "<>")
                } else {
                    (TokenKind::Lt, "<")
                }
            }
            '=' => {
                // '=' alone and '==' both mean equality
                if self.matches('=') {
                    (TokenKind::Eq, "==")
                } else {
                    (TokenKind::Eq, "=")
                }
            }
            '!' => {
                if self.matches('=') {
                    (TokenKind::Ne, "!=")
                } else {
                    return Err(FormulaError::lex("unexpected character", line, column, Some('!')));
                }
            }
            other => {
                return Err(FormulaError::lex(
                    format!("unexpected character: {}", other),
                    line,
                    column,
                    Some(other),
                ));
            }
        };

        self.push(kind, text.to_string(), line, column);
        Ok(())
    }

    fn peek(&self) -> char {
        self.chars[self.pos]
    }

    fn advance(&mut self) -> char {
        let ch = self.chars[self.pos];
        self.pos += 1;
        self.column += 1;
        ch
    }

    /// Consumes the next character if it equals `expected`.
    fn matches(&mut self, expected: char) -> bool {
        if !self.at_end() && self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn push(&mut self, kind: TokenKind, text: String, line: usize, column: usize) {
        self.tokens.push(Token { kind, text, line, column });
    }
}

/// Convenience wrapper over `Lexer::new(source).tokenize()`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, FormulaError> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn tokenizes_declaration() {
        assert_eq!(
            kinds("MA5 := MA(CLOSE, 5)"),
            vec![
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Identifier,
                TokenKind::LParen,
                TokenKind::Identifier,
                TokenKind::Comma,
                TokenKind::Number,
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn numbers_take_decimals_and_exponents() {
        let tokens = tokenize("1.5 2e3 4.25E-2 7").unwrap();
        let texts: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Number)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(texts, vec!["1.5", "2e3", "4.25E-2", "7"]);
    }

    #[test]
    fn keywords_are_case_insensitive_but_keep_casing() {
        let tokens = tokenize("if And OR").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::If);
        assert_eq!(tokens[0].text, "if");
        assert_eq!(tokens[1].kind, TokenKind::And);
        assert_eq!(tokens[2].kind, TokenKind::Or);
    }

    #[test]
    fn comparison_operators_and_aliases() {
        assert_eq!(
            kinds("a > b >= c < d <= e == f = g != h <> i"),
            vec![
                TokenKind::Identifier,
                TokenKind::Gt,
                TokenKind::Identifier,
                TokenKind::Ge,
                TokenKind::Identifier,
                TokenKind::Lt,
                TokenKind::Identifier,
                TokenKind::Le,
                TokenKind::Identifier,
                TokenKind::Eq,
                TokenKind::Identifier,
                TokenKind::Eq,
                TokenKind::Identifier,
                TokenKind::Ne,
                TokenKind::Identifier,
                TokenKind::Ne,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn colon_and_assign_are_distinct() {
        assert_eq!(
            kinds("a : b := c"),
            vec![
                TokenKind::Identifier,
                TokenKind::Colon,
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn newline_is_a_token_and_tracks_position() {
        let tokens = tokenize("a\nb").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Newline);
        assert_eq!(tokens[2].line, 2);
        assert_eq!(tokens[2].column, 1);
    }

    #[test]
    fn bare_bang_is_a_lex_error() {
        let err = tokenize("1 ! 2").unwrap_err();
        match err {
            FormulaError::Lex { line, column, character, .. } => {
                assert_eq!((line, column), (1, 3));
                assert_eq!(character, Some('!'));
            }
            other => panic!("expected lex error, got {:?}", other),
        }
    }

    #[test]
    fn unknown_character_reports_position() {
        let err = tokenize("x := 1 @ 2").unwrap_err();
        match err {
            FormulaError::Lex { line, column, character, .. } => {
                assert_eq!((line, column), (1, 8));
                assert_eq!(character, Some('@'));
            }
            other => panic!("expected lex error, got {:?}", other),
        }
    }
}
