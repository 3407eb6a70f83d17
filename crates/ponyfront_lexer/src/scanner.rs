//! The raw scanner.
//!
//! Longest-match scanning over a `Vec<char>`. Every token keeps its raw
//! matched text (string literals keep their quotes, comments keep their
//! delimiters) so downstream layers can reproduce source verbatim.
//!
//! Character literals lex as `Int`: they are integer values in the language.
//! Block comments do not nest; `/* /* */` ends at the first `*/`.

use ponyfront_ast::token::{gencap_kind, keyword_kind, Token, TokenKind};
use ponyfront_core::text::{LineMap, TextSpan};
use ponyfront_diagnostics::LexError;

/// The raw scanner. Produces one token per [`Scanner::scan`] call, trivia
/// included, then an endless supply of `Eof`.
pub struct Scanner {
    /// The source text being scanned.
    text: Vec<char>,
    /// Current position in the text.
    pos: usize,
    /// Start of the token being scanned.
    token_start: usize,
    /// Line starts, for attaching line numbers to tokens and errors.
    line_map: LineMap,
}

impl Scanner {
    /// Create a new scanner for the given source text.
    pub fn new(source: &str) -> Self {
        Self {
            text: source.chars().collect(),
            pos: 0,
            token_start: 0,
            line_map: LineMap::new(source),
        }
    }

    #[inline]
    fn current_char(&self) -> Option<char> {
        self.text.get(self.pos).copied()
    }

    #[inline]
    fn char_at(&self, offset: usize) -> Option<char> {
        self.text.get(self.pos + offset).copied()
    }

    #[inline]
    fn is_eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn error_at(&self, pos: usize) -> LexError {
        LexError::new(self.line_map.line_and_column_of(pos as u32))
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        let span = TextSpan::from_bounds(self.token_start as u32, self.pos as u32);
        let text: String = self.text[self.token_start..self.pos].iter().collect();
        Token::new(kind, text, span, self.line_map.line_of(span.start))
    }

    /// Scan the next token.
    pub fn scan(&mut self) -> Result<Token, LexError> {
        self.token_start = self.pos;
        let ch = match self.current_char() {
            Some(ch) => ch,
            None => return Ok(self.make_token(TokenKind::Eof)),
        };

        match ch {
            ' ' | '\t' | '\r' => {
                while matches!(self.current_char(), Some(' ' | '\t' | '\r')) {
                    self.pos += 1;
                }
                Ok(self.make_token(TokenKind::Whitespace))
            }
            '\n' => {
                self.pos += 1;
                Ok(self.make_token(TokenKind::Newline))
            }
            '/' => match self.char_at(1) {
                Some('/') => self.scan_line_comment(),
                Some('*') => self.scan_block_comment(),
                _ => self.scan_operator(),
            },
            '"' => self.scan_string(),
            '\'' => self.scan_char_literal(),
            '#' => self.scan_gencap(),
            '0'..='9' => self.scan_number(),
            _ if is_identifier_start(ch) => Ok(self.scan_identifier()),
            _ => self.scan_operator(),
        }
    }

    // ========================================================================
    // Trivia
    // ========================================================================

    fn scan_line_comment(&mut self) -> Result<Token, LexError> {
        self.pos += 2;
        while let Some(ch) = self.current_char() {
            if ch == '\n' {
                break;
            }
            self.pos += 1;
        }
        Ok(self.make_token(TokenKind::LineComment))
    }

    fn scan_block_comment(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        self.pos += 2;
        while !self.is_eof() {
            if self.current_char() == Some('*') && self.char_at(1) == Some('/') {
                self.pos += 2;
                return Ok(self.make_token(TokenKind::BlockComment));
            }
            self.pos += 1;
        }
        Err(self.error_at(start))
    }

    // ========================================================================
    // Literals
    // ========================================================================

    fn scan_string(&mut self) -> Result<Token, LexError> {
        if self.char_at(1) == Some('"') && self.char_at(2) == Some('"') {
            return self.scan_triple_string();
        }
        let start = self.pos;
        self.pos += 1;
        while let Some(ch) = self.current_char() {
            match ch {
                '"' => {
                    self.pos += 1;
                    return Ok(self.make_token(TokenKind::String));
                }
                '\\' => self.scan_escape()?,
                _ => self.pos += 1,
            }
        }
        Err(self.error_at(start))
    }

    fn scan_triple_string(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        self.pos += 3;
        while !self.is_eof() {
            if self.current_char() == Some('"')
                && self.char_at(1) == Some('"')
                && self.char_at(2) == Some('"')
            {
                self.pos += 3;
                return Ok(self.make_token(TokenKind::String));
            }
            self.pos += 1;
        }
        Err(self.error_at(start))
    }

    /// Character literals are integer values, so they lex as `Int`.
    fn scan_char_literal(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        self.pos += 1;
        while let Some(ch) = self.current_char() {
            match ch {
                '\'' => {
                    self.pos += 1;
                    return Ok(self.make_token(TokenKind::Int));
                }
                '\n' => break,
                '\\' => self.scan_escape()?,
                _ => self.pos += 1,
            }
        }
        Err(self.error_at(start))
    }

    /// Consume a backslash escape. Hex and unicode escapes must carry their
    /// full digit count; any other single character is accepted as-is.
    fn scan_escape(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        self.pos += 1; // backslash
        let digits = match self.current_char() {
            Some('x') => 2,
            Some('u') => 4,
            Some('U') => 6,
            Some(_) => {
                self.pos += 1;
                return Ok(());
            }
            None => return Err(self.error_at(start)),
        };
        self.pos += 1;
        for _ in 0..digits {
            match self.current_char() {
                Some(ch) if ch.is_ascii_hexdigit() => self.pos += 1,
                _ => return Err(self.error_at(start)),
            }
        }
        Ok(())
    }

    fn scan_number(&mut self) -> Result<Token, LexError> {
        if self.current_char() == Some('0') && matches!(self.char_at(1), Some('x' | 'X')) {
            let start = self.pos;
            self.pos += 2;
            if !self.consume_digits(|ch| ch.is_ascii_hexdigit()) {
                return Err(self.error_at(start));
            }
            return Ok(self.make_token(TokenKind::Int));
        }
        if self.current_char() == Some('0') && matches!(self.char_at(1), Some('b' | 'B')) {
            let start = self.pos;
            self.pos += 2;
            if !self.consume_digits(|ch| ch == '0' || ch == '1') {
                return Err(self.error_at(start));
            }
            return Ok(self.make_token(TokenKind::Int));
        }

        self.consume_digits(|ch| ch.is_ascii_digit());
        let mut is_float = false;

        // A dot only joins the number when digits follow, so `1.` stays an
        // int followed by a dot suffix.
        if self.current_char() == Some('.')
            && self.char_at(1).is_some_and(|ch| ch.is_ascii_digit())
        {
            is_float = true;
            self.pos += 1;
            self.consume_digits(|ch| ch.is_ascii_digit());
        }
        if matches!(self.current_char(), Some('e' | 'E')) {
            let after_sign = if matches!(self.char_at(1), Some('+' | '-')) { 2 } else { 1 };
            if self.char_at(after_sign).is_some_and(|ch| ch.is_ascii_digit()) {
                is_float = true;
                self.pos += after_sign;
                self.consume_digits(|ch| ch.is_ascii_digit());
            }
        }

        Ok(self.make_token(if is_float {
            TokenKind::Float
        } else {
            TokenKind::Int
        }))
    }

    /// Consume digits matching the predicate, with `_` separators allowed.
    /// Returns whether at least one digit was consumed.
    fn consume_digits(&mut self, accept: impl Fn(char) -> bool) -> bool {
        let mut any = false;
        while let Some(ch) = self.current_char() {
            if accept(ch) {
                any = true;
                self.pos += 1;
            } else if ch == '_' && any {
                self.pos += 1;
            } else {
                break;
            }
        }
        any
    }

    // ========================================================================
    // Words and operators
    // ========================================================================

    fn scan_identifier(&mut self) -> Token {
        self.pos += 1;
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        // Identifiers may end in primes: `x'`, `x''`.
        while self.current_char() == Some('\'') {
            self.pos += 1;
        }
        let text: String = self.text[self.token_start..self.pos].iter().collect();
        let kind = keyword_kind(&text).unwrap_or(TokenKind::Identifier);
        self.make_token(kind)
    }

    fn scan_gencap(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        self.pos += 1;
        let word_start = self.pos;
        while self
            .current_char()
            .is_some_and(|ch| ch.is_ascii_lowercase())
        {
            self.pos += 1;
        }
        let word: String = self.text[word_start..self.pos].iter().collect();
        match gencap_kind(&word) {
            Some(kind) => Ok(self.make_token(kind)),
            None => Err(self.error_at(start)),
        }
    }

    fn scan_operator(&mut self) -> Result<Token, LexError> {
        let ch = self.text[self.pos];
        let one = |kind| (kind, 1usize);
        let (kind, len) = match ch {
            '(' => one(TokenKind::OpenParen),
            ')' => one(TokenKind::CloseParen),
            '[' => one(TokenKind::OpenBracket),
            ']' => one(TokenKind::CloseBracket),
            '{' => one(TokenKind::OpenBrace),
            '}' => one(TokenKind::CloseBrace),
            ',' => one(TokenKind::Comma),
            ';' => one(TokenKind::Semicolon),
            ':' => one(TokenKind::Colon),
            '?' => one(TokenKind::Question),
            '\\' => one(TokenKind::Backslash),
            '|' => one(TokenKind::Pipe),
            '&' => one(TokenKind::Ampersand),
            '^' => one(TokenKind::Hat),
            '@' => one(TokenKind::At),
            '~' => one(TokenKind::Tilde),
            '.' => {
                if self.char_at(1) == Some('.') && self.char_at(2) == Some('.') {
                    (TokenKind::Ellipsis, 3)
                } else if self.char_at(1) == Some('>') {
                    (TokenKind::Chain, 2)
                } else {
                    one(TokenKind::Dot)
                }
            }
            '=' => match (self.char_at(1), self.char_at(2)) {
                (Some('='), Some('~')) => (TokenKind::EqTilde, 3),
                (Some('='), _) => (TokenKind::Eq, 2),
                (Some('>'), _) => (TokenKind::DblArrow, 2),
                _ => one(TokenKind::Assign),
            },
            '!' => match (self.char_at(1), self.char_at(2)) {
                (Some('='), Some('~')) => (TokenKind::NeTilde, 3),
                (Some('='), _) => (TokenKind::Ne, 2),
                _ => one(TokenKind::Bang),
            },
            '<' => match (self.char_at(1), self.char_at(2)) {
                (Some(':'), _) => (TokenKind::Subtype, 2),
                (Some('<'), Some('~')) => (TokenKind::ShlTilde, 3),
                (Some('<'), _) => (TokenKind::Shl, 2),
                (Some('='), Some('~')) => (TokenKind::LeTilde, 3),
                (Some('='), _) => (TokenKind::Le, 2),
                (Some('~'), _) => (TokenKind::LtTilde, 2),
                _ => one(TokenKind::Lt),
            },
            '>' => match (self.char_at(1), self.char_at(2)) {
                (Some('>'), Some('~')) => (TokenKind::ShrTilde, 3),
                (Some('>'), _) => (TokenKind::Shr, 2),
                (Some('='), Some('~')) => (TokenKind::GeTilde, 3),
                (Some('='), _) => (TokenKind::Ge, 2),
                (Some('~'), _) => (TokenKind::GtTilde, 2),
                _ => one(TokenKind::Gt),
            },
            '+' => match self.char_at(1) {
                Some('~') => (TokenKind::PlusTilde, 2),
                _ => one(TokenKind::Plus),
            },
            '-' => match self.char_at(1) {
                Some('~') => (TokenKind::MinusTilde, 2),
                Some('>') => (TokenKind::Arrow, 2),
                _ => one(TokenKind::Minus),
            },
            '*' => match self.char_at(1) {
                Some('~') => (TokenKind::StarTilde, 2),
                _ => one(TokenKind::Star),
            },
            '/' => match self.char_at(1) {
                Some('~') => (TokenKind::SlashTilde, 2),
                _ => one(TokenKind::Slash),
            },
            '%' => match self.char_at(1) {
                Some('~') => (TokenKind::PercentTilde, 2),
                _ => one(TokenKind::Percent),
            },
            _ => return Err(self.error_at(self.pos)),
        };
        self.pos += len;
        Ok(self.make_token(kind))
    }
}

#[inline]
fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}
