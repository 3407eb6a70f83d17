//! ponyfront_complete: Keyword completion from parse failures.
//!
//! The engine piggybacks on the parser instead of keeping its own grammar
//! model. The raw token covering the cursor is retagged as `Complete`, a
//! kind no production accepts, so parsing the tagged stream fails exactly at
//! the cursor with the admissible-terminal set of that grammar state. Those
//! terminals are mapped back to keyword spellings and filtered by whatever
//! the user had typed.
//!
//! Errors elsewhere in the source are real errors independent of the cursor
//! and propagate unchanged.

use ponyfront_ast::token::{Token, TokenKind};
use ponyfront_diagnostics::Error;
use ponyfront_lexer::{filter_significant, raw_tokens};
use ponyfront_parser::Parser;

/// Suggest keywords at `cursor`, a character offset into `source`.
pub fn complete(source: &str, cursor: u32) -> Result<Vec<String>, Error> {
    let mut tokens = raw_tokens(source)?;

    // The cursor token is the first raw token whose end reaches the cursor;
    // trivia counts, so a cursor inside whitespace or a comment is tagged
    // too. The `Eof` token is a catch-all for a cursor past the last token.
    let mut typed_prefix = String::new();
    let mut underlying = TokenKind::Eof;
    let mut terminator = None;
    for token in tokens.iter_mut() {
        if token.span.end() >= cursor || token.kind == TokenKind::Eof {
            underlying = token.kind;
            // A cursor resting in trivia has typed no part of a keyword.
            if !underlying.is_trivia() {
                let consumed = cursor.saturating_sub(token.span.start) as usize;
                typed_prefix = token.text.chars().take(consumed).collect();
            }
            token.kind = TokenKind::Complete;
            // Retagging the stream's own `Eof` leaves it unterminated; a
            // fresh zero-width terminator goes in behind the cursor token.
            if underlying == TokenKind::Eof {
                terminator = Some(Token::new(
                    TokenKind::Eof,
                    String::new(),
                    token.span,
                    token.line,
                ));
            }
            break;
        }
    }
    tokens.extend(terminator);

    // A cursor inside a literal has no keyword to finish.
    if matches!(
        underlying,
        TokenKind::String | TokenKind::Int | TokenKind::Float
    ) {
        return Ok(Vec::new());
    }

    match Parser::from_tokens(filter_significant(tokens)).module() {
        Ok(_) => Ok(Vec::new()),
        Err(err) if err.token.kind == TokenKind::Complete => {
            Ok(suggestions(err.admissible_terminals(), &typed_prefix))
        }
        Err(err) => Err(err.into()),
    }
}

/// Map admissible terminals to keyword spellings, keep those matching the
/// typed prefix, and drop duplicates while preserving table order.
fn suggestions(admissible: &[TokenKind], typed_prefix: &str) -> Vec<String> {
    let mut seen: Vec<TokenKind> = Vec::new();
    let mut out = Vec::new();
    for &kind in admissible {
        if seen.contains(&kind) {
            continue;
        }
        seen.push(kind);
        if let Some(spelling) = kind.keyword_spelling() {
            if spelling.starts_with(typed_prefix) {
                out.push(spelling.to_string());
            }
        }
    }
    out
}

/// Convenience wrapper used by editor glue: a cursor at the end of the
/// source text.
pub fn complete_at_end(source: &str) -> Result<Vec<String>, Error> {
    complete(source, source.chars().count() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_level_prefix() {
        let source = "\"\"\"Docstring\"\"\"\nuse \"collections\"\n\nact";
        let result = complete(source, source.chars().count() as u32).expect("completes");
        assert_eq!(result, vec!["actor".to_string()]);
    }

    #[test]
    fn test_empty_prefix_lists_module_starters() {
        let result = complete_at_end("use \"collections\"\n\n").expect("completes");
        assert_eq!(
            result,
            vec![
                "use".to_string(),
                "type".to_string(),
                "interface".to_string(),
                "trait".to_string(),
                "primitive".to_string(),
                "struct".to_string(),
                "class".to_string(),
                "actor".to_string(),
            ]
        );
    }

    #[test]
    fn test_cursor_in_string_literal_is_empty() {
        let source = "use \"collections\"";
        assert_eq!(complete(source, 9).expect("completes"), Vec::<String>::new());
    }

    #[test]
    fn test_error_away_from_cursor_propagates() {
        // The stray `)` fails before the cursor token is ever reached.
        let source = ")\n\nact";
        assert!(complete(source, source.chars().count() as u32).is_err());
    }

    #[test]
    fn test_empty_source_lists_module_starters() {
        let result = complete("", 0).expect("completes");
        assert_eq!(
            result,
            vec![
                "use".to_string(),
                "type".to_string(),
                "interface".to_string(),
                "trait".to_string(),
                "primitive".to_string(),
                "struct".to_string(),
                "class".to_string(),
                "actor".to_string(),
            ]
        );
    }

    #[test]
    fn test_cursor_past_end_of_source() {
        // The cursor lands on the end-of-input token; the engine still has
        // to produce the member and definition starters admissible there.
        let result = complete("actor Main", 99).expect("completes");
        assert_eq!(
            result,
            vec![
                "type".to_string(),
                "interface".to_string(),
                "trait".to_string(),
                "primitive".to_string(),
                "struct".to_string(),
                "class".to_string(),
                "actor".to_string(),
                "var".to_string(),
                "let".to_string(),
                "embed".to_string(),
                "new".to_string(),
                "fun".to_string(),
                "be".to_string(),
            ]
        );
    }

    #[test]
    fn test_member_level_completion() {
        let source = "actor Main\n  n";
        let result = complete(source, source.chars().count() as u32).expect("completes");
        assert_eq!(result, vec!["new".to_string()]);
    }
}
