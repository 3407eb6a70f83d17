//! ponyfront_diagnostics: Error types for the front end.
//!
//! Lexing and parsing are fail-fast: the first error aborts the run. A
//! `SyntaxError` carries the offending token and the full set of token kinds
//! that would have been accepted in its place; the completion engine reads
//! that set off the error rather than reaching into parser internals.

use ponyfront_ast::token::{Token, TokenKind};
use ponyfront_core::text::LineAndColumn;
use thiserror::Error;

/// An unlexable character or unterminated literal.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("lexing failed at line {}, column {}", position.line + 1, position.character + 1)]
pub struct LexError {
    /// Where lexing stopped.
    pub position: LineAndColumn,
}

impl LexError {
    pub fn new(position: LineAndColumn) -> Self {
        Self { position }
    }
}

/// A token the grammar could not accept.
#[derive(Debug, Clone, Error)]
#[error("unexpected {:?} {:?} at line {}", token.kind, token.text, token.line + 1)]
pub struct SyntaxError {
    /// The offending token.
    pub token: Token,
    expected: Vec<TokenKind>,
}

impl SyntaxError {
    pub fn new(token: Token, expected: Vec<TokenKind>) -> Self {
        Self { token, expected }
    }

    /// The token kinds that would have been accepted where the offending
    /// token appeared, in grammar-declaration order.
    pub fn admissible_terminals(&self) -> &[TokenKind] {
        &self.expected
    }
}

/// Any front-end failure.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use ponyfront_core::text::TextSpan;

    #[test]
    fn test_lex_error_display_is_one_based() {
        let err = LexError::new(LineAndColumn::new(2, 5));
        assert_eq!(err.to_string(), "lexing failed at line 3, column 6");
    }

    #[test]
    fn test_syntax_error_exposes_admissible_terminals() {
        let token = Token::new(
            TokenKind::EndKeyword,
            "end".to_string(),
            TextSpan::new(0, 3),
            0,
        );
        let err = SyntaxError::new(token, vec![TokenKind::ThenKeyword]);
        assert_eq!(err.admissible_terminals(), &[TokenKind::ThenKeyword]);
    }
}
