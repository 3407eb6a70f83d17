//! ponyfront_lexer: Source text to tokens.
//!
//! Lexing happens in two layers. The raw [`Scanner`] emits every token,
//! trivia included, with no knowledge of line-start context. The filter
//! layer ([`filter_significant`]) drops trivia, records line breaks in token
//! flags, and retags the four context-dependent kinds to their `New`
//! variants. [`tokenize`] composes the two; the completion engine calls the
//! layers separately so it can tag the raw token under the cursor first.

pub mod scanner;

pub use scanner::Scanner;

use ponyfront_ast::token::{Token, TokenFlags, TokenKind};
use ponyfront_diagnostics::LexError;

/// Scan the whole source into raw tokens, trivia included, ending with an
/// `Eof` token. Fail-fast: the first unlexable character aborts.
pub fn raw_tokens(source: &str) -> Result<Vec<Token>, LexError> {
    let mut scanner = Scanner::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = scanner.scan()?;
        let at_eof = token.kind == TokenKind::Eof;
        tokens.push(token);
        if at_eof {
            return Ok(tokens);
        }
    }
}

/// Drop trivia, fold line breaks into `PRECEDING_NEWLINE` flags, and retag
/// the context-dependent kinds. The start of the file counts as a line
/// start. A newline inside a block comment counts as a line break.
pub fn filter_significant(raw: Vec<Token>) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(raw.len());
    let mut pending_newline = true;
    for mut token in raw {
        if token.kind.is_trivia() {
            if token.kind == TokenKind::Newline
                || (token.kind == TokenKind::BlockComment && token.text.contains('\n'))
            {
                pending_newline = true;
            }
            continue;
        }
        if pending_newline {
            token.flags |= TokenFlags::PRECEDING_NEWLINE;
            if let Some(retagged) = token.kind.newline_variant() {
                token.kind = retagged;
            }
            pending_newline = false;
        }
        tokens.push(token);
    }
    tokens
}

/// Lex source into the significant-token stream the parser consumes.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Ok(filter_significant(raw_tokens(source)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .expect("lexes")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_context_kinds_after_newline() {
        assert_eq!(
            kinds("foo (bar)"),
            vec![
                TokenKind::Identifier,
                TokenKind::OpenParen,
                TokenKind::Identifier,
                TokenKind::CloseParen,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("foo\n(bar)"),
            vec![
                TokenKind::Identifier,
                TokenKind::OpenParenNew,
                TokenKind::Identifier,
                TokenKind::CloseParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_minus_retagging() {
        assert_eq!(
            kinds("a - b"),
            vec![
                TokenKind::Identifier,
                TokenKind::Minus,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("a\n-b"),
            vec![
                TokenKind::Identifier,
                TokenKind::MinusNew,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("a\n-~b"),
            vec![
                TokenKind::Identifier,
                TokenKind::MinusTildeNew,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_newline_inside_block_comment_counts() {
        assert_eq!(
            kinds("a /* x\ny */ (b)"),
            vec![
                TokenKind::Identifier,
                TokenKind::OpenParenNew,
                TokenKind::Identifier,
                TokenKind::CloseParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_file_start_counts_as_line_start() {
        assert_eq!(
            kinds("(a)"),
            vec![
                TokenKind::OpenParenNew,
                TokenKind::Identifier,
                TokenKind::CloseParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_preceding_newline_flag() {
        let tokens = tokenize("use\n\"collections\"").expect("lexes");
        assert_eq!(tokens[1].kind, TokenKind::String);
        assert!(tokens[1].has_preceding_newline());
        assert!(!tokenize("use \"collections\"").expect("lexes")[1].has_preceding_newline());
    }
}
