//! Error types reported by the lexer and parser.

use std::fmt;

use thiserror::Error;

/// Renders a small context window around `position` with a caret line.
fn render_context(f: &mut fmt::Formatter<'_>, source: &str, position: usize) -> fmt::Result {
    const WINDOW: usize = 40;
    let chars: Vec<char> = source.chars().collect();
    let position = position.min(chars.len());
    let start = position.saturating_sub(WINDOW);
    let end = (position + WINDOW).min(chars.len());
    let snippet: String = chars[start..end].iter().collect();
    write!(f, "{snippet}\n{}^", " ".repeat(position - start))
}

/// Raised when the lexer encounters a character sequence that does not
/// belong to any token class.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct LexError {
    /// Description of the failure.
    pub message: String,
    /// The input the lexer was working on.
    pub source_text: String,
    /// Character offset of the offending input.
    pub position: usize,
}

impl LexError {
    pub fn new(message: impl Into<String>, source_text: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            source_text: source_text.into(),
            position,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} at position {}", self.message, self.position)?;
        render_context(f, &self.source_text, self.position)
    }
}

/// Raised when the parser cannot derive a tree from the token stream.
///
/// `source_text` is the source reconstructed from the token lexemes, so
/// `position` is a character offset into that string rather than the
/// original input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct SyntaxError {
    /// Description of the failure.
    pub message: String,
    /// Source reconstructed by concatenating token lexemes.
    pub source_text: String,
    /// Character offset into `source_text`.
    pub position: usize,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, source_text: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            source_text: source_text.into(),
            position,
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} at position {}", self.message, self.position)?;
        render_context(f, &self.source_text, self.position)
    }
}

/// Either front-end failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GlslError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caret_points_at_offender() {
        let error = LexError::new("Unknown token", "float a @", 8);
        let rendered = error.to_string();
        let mut lines = rendered.lines();
        assert_eq!(lines.next(), Some("Unknown token at position 8"));
        assert_eq!(lines.next(), Some("float a @"));
        assert_eq!(lines.next(), Some("        ^"));
    }

    #[test]
    fn caret_clamps_to_input_length() {
        let error = SyntaxError::new("Expected ;", "void", 99);
        let rendered = error.to_string();
        assert!(rendered.ends_with("void\n    ^"));
    }
}
