// File: src/errors.rs
//
// Error types for the formula engine.
// Every failure in the pipeline is one of three kinds: a lex error (bad
// character), a parse error (bad structure), or a runtime error (bad
// evaluation). Lex and parse errors carry 1-indexed source coordinates;
// runtime errors carry a message only, since evaluation is detached from
// source positions.

use colored::Colorize;
use std::fmt;

/// A failure from any stage of the compile/execute pipeline.
///
/// The engine fails fast: the first error aborts the whole run and is
/// returned to the caller unchanged. There is no partial result and no
/// internal recovery.
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaError {
    Lex {
        message: String,
        line: usize,
        column: usize,
        character: Option<char>,
    },
    Parse {
        message: String,
        line: usize,
        column: usize,
    },
    Runtime {
        message: String,
    },
}

impl FormulaError {
    pub fn lex(message: impl Into<String>, line: usize, column: usize, character: Option<char>) -> Self {
        FormulaError::Lex { message: message.into(), line, column, character }
    }

    pub fn parse(message: impl Into<String>, line: usize, column: usize) -> Self {
        FormulaError::Parse { message: message.into(), line, column }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        FormulaError::Runtime { message: message.into() }
    }

    /// The full human-readable description, uniform across kinds.
    pub fn message(&self) -> String {
        match self {
            FormulaError::Lex { message, line, column, character } => {
                let char_part = match character {
                    Some(ch) => format!(" (char: '{}')", ch),
                    None => String::new(),
                };
                format!("lexer error at line {}, column {}: {}{}", line, column, message, char_part)
            }
            FormulaError::Parse { message, line, column } => {
                format!("parser error at line {}, column {}: {}", line, column, message)
            }
            FormulaError::Runtime { message } => {
                format!("runtime error: {}", message)
            }
        }
    }

    /// Colored terminal rendering for the CLI and REPL.
    /// The core never prints this itself.
    pub fn pretty(&self) -> String {
        let (kind, detail) = match self {
            FormulaError::Lex { message, character, .. } => {
                let detail = match character {
                    Some(ch) => format!("{} (char: '{}')", message, ch),
                    None => message.clone(),
                };
                ("Lex Error", detail)
            }
            FormulaError::Parse { message, .. } => ("Parse Error", message.clone()),
            FormulaError::Runtime { message } => ("Runtime Error", message.clone()),
        };

        let mut out = format!("{}: {}", kind.red().bold(), detail.bold());
        if let Some((line, column)) = self.location() {
            out.push('\n');
            out.push_str(&format!("  --> {}:{}", line, column).bright_blue().to_string());
        }
        out
    }

    /// Source coordinates, when the error kind carries them.
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            FormulaError::Lex { line, column, .. } | FormulaError::Parse { line, column, .. } => {
                Some((*line, *column))
            }
            FormulaError::Runtime { .. } => None,
        }
    }
}

impl fmt::Display for FormulaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for FormulaError {}

/// Computes the Levenshtein distance between two strings
/// Used for "did you mean?" suggestions
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let len1 = s1.chars().count();
    let len2 = s2.chars().count();

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    let mut matrix = vec![vec![0; len2 + 1]; len1 + 1];

    for (i, row) in matrix.iter_mut().enumerate().take(len1 + 1) {
        row[0] = i;
    }
    for j in 0..=len2 {
        matrix[0][j] = j;
    }

    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();

    for i in 1..=len1 {
        for j in 1..=len2 {
            let cost = if s1_chars[i - 1] == s2_chars[j - 1] { 0 } else { 1 };
            matrix[i][j] = std::cmp::min(
                std::cmp::min(
                    matrix[i - 1][j] + 1, // deletion
                    matrix[i][j - 1] + 1, // insertion
                ),
                matrix[i - 1][j - 1] + cost, // substitution
            );
        }
    }

    matrix[len1][len2]
}

/// Find the closest match from a list of candidates using Levenshtein distance
/// Returns None if no good match is found (distance > 3)
pub fn find_closest_match<'a>(target: &str, candidates: &'a [String]) -> Option<&'a str> {
    let mut best_match = None;
    let mut best_distance = usize::MAX;

    for candidate in candidates {
        let distance = levenshtein_distance(target, candidate);
        if distance <= 3 && distance < best_distance {
            best_distance = distance;
            best_match = Some(candidate.as_str());
        }
    }

    best_match
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_message_includes_position_and_char() {
        let err = FormulaError::lex("unexpected character", 2, 7, Some('@'));
        assert_eq!(
            err.message(),
            "lexer error at line 2, column 7: unexpected character (char: '@')"
        );
        assert_eq!(err.location(), Some((2, 7)));
    }

    #[test]
    fn runtime_error_has_no_location() {
        let err = FormulaError::runtime("division by zero");
        assert_eq!(err.message(), "runtime error: division by zero");
        assert_eq!(err.location(), None);
    }

    #[test]
    fn closest_match_suggests_near_names() {
        let candidates = vec!["CLOSE".to_string(), "OPEN".to_string(), "VOLUME".to_string()];
        assert_eq!(find_closest_match("CLSE", &candidates), Some("CLOSE"));
        assert_eq!(find_closest_match("ZZZZZZZ", &candidates), None);
    }
}
