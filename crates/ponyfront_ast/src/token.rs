//! Token vocabulary and the reserved-word tables.
//!
//! Four token kinds come in plain/`New` pairs: `(`, `[`, `-` and `-~` mean
//! different things when they are the first token on a line (new expression)
//! versus mid-line (call, index, binary minus). The lexer's filter layer
//! retags them based on the `PRECEDING_NEWLINE` flag so the parser never has
//! to look at whitespace.

use ponyfront_core::text::TextSpan;
use rustc_hash::FxHashMap;
use std::sync::OnceLock;

/// The kind of a lexical token.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum TokenKind {
    // Terminals with payloads
    Identifier,
    Int,
    Float,
    String,

    // Trivia (dropped by the filter layer)
    Whitespace,
    Newline,
    LineComment,
    BlockComment,

    // Keywords
    UseKeyword,
    TypeKeyword,
    InterfaceKeyword,
    TraitKeyword,
    PrimitiveKeyword,
    StructKeyword,
    ClassKeyword,
    ActorKeyword,
    ObjectKeyword,
    LambdaKeyword,
    AsKeyword,
    IsKeyword,
    IsntKeyword,
    VarKeyword,
    LetKeyword,
    EmbedKeyword,
    NewKeyword,
    FunKeyword,
    BeKeyword,
    IsoKeyword,
    TrnKeyword,
    RefKeyword,
    ValKeyword,
    BoxKeyword,
    TagKeyword,
    ThisKeyword,
    ReturnKeyword,
    BreakKeyword,
    ContinueKeyword,
    ErrorKeyword,
    CompileIntrinsicKeyword,
    CompileErrorKeyword,
    IfKeyword,
    IfdefKeyword,
    IftypeKeyword,
    ThenKeyword,
    ElseifKeyword,
    ElseKeyword,
    EndKeyword,
    WhileKeyword,
    DoKeyword,
    RepeatKeyword,
    UntilKeyword,
    ForKeyword,
    InKeyword,
    WithKeyword,
    MatchKeyword,
    WhereKeyword,
    TryKeyword,
    RecoverKeyword,
    ConsumeKeyword,
    NotKeyword,
    AndKeyword,
    OrKeyword,
    XorKeyword,
    DigestofKeyword,
    AddressofKeyword,
    TrueKeyword,
    FalseKeyword,

    // Generic capability sets
    CapRead,
    CapSend,
    CapShare,
    CapAlias,
    CapAny,

    // Punctuation
    OpenBrace,
    CloseBrace,
    OpenParen,
    OpenParenNew,
    CloseParen,
    OpenBracket,
    OpenBracketNew,
    CloseBracket,
    Comma,
    Dot,
    Tilde,
    Chain,
    Colon,
    Semicolon,
    Assign,
    Arrow,
    DblArrow,
    At,
    Question,
    Backslash,
    Ellipsis,
    Subtype,
    Pipe,
    Ampersand,
    Hat,
    Bang,

    // Operators
    Plus,
    Minus,
    MinusNew,
    Star,
    Slash,
    Percent,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    PlusTilde,
    MinusTilde,
    MinusTildeNew,
    StarTilde,
    SlashTilde,
    PercentTilde,
    ShlTilde,
    ShrTilde,
    EqTilde,
    NeTilde,
    LtTilde,
    LeTilde,
    GtTilde,
    GeTilde,

    /// The token under an editor cursor. Produced only by the completion
    /// engine; matches no grammar production, so parsing always stops on it
    /// with the admissible-terminal set of that state.
    Complete,

    Eof,
}

impl TokenKind {
    /// Whether this kind is dropped by the significant-token filter.
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace
                | TokenKind::Newline
                | TokenKind::LineComment
                | TokenKind::BlockComment
        )
    }

    /// Whether this kind is a concrete reference capability.
    #[inline]
    pub fn is_capability(self) -> bool {
        matches!(
            self,
            TokenKind::IsoKeyword
                | TokenKind::TrnKeyword
                | TokenKind::RefKeyword
                | TokenKind::ValKeyword
                | TokenKind::BoxKeyword
                | TokenKind::TagKeyword
        )
    }

    /// Whether this kind is a generic capability set (`#read` and friends).
    #[inline]
    pub fn is_gencap(self) -> bool {
        matches!(
            self,
            TokenKind::CapRead
                | TokenKind::CapSend
                | TokenKind::CapShare
                | TokenKind::CapAlias
                | TokenKind::CapAny
        )
    }

    /// The line-start variant of a context-dependent kind, if it has one.
    #[inline]
    pub fn newline_variant(self) -> Option<TokenKind> {
        match self {
            TokenKind::OpenParen => Some(TokenKind::OpenParenNew),
            TokenKind::OpenBracket => Some(TokenKind::OpenBracketNew),
            TokenKind::Minus => Some(TokenKind::MinusNew),
            TokenKind::MinusTilde => Some(TokenKind::MinusTildeNew),
            _ => None,
        }
    }

    /// The keyword spelling of this kind, if it is a reserved word.
    pub fn keyword_spelling(self) -> Option<&'static str> {
        spelling_table().get(&self).copied()
    }
}

bitflags::bitflags! {
    /// Flags attached to tokens by the scanner and filter layer.
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub struct TokenFlags: u8 {
        const NONE = 0;
        /// A line break occurred in the trivia before this token.
        const PRECEDING_NEWLINE = 1 << 0;
    }
}

/// A lexical token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The raw matched text. String literals keep their quotes so the
    /// printer can reproduce them verbatim.
    pub text: String,
    /// Character span in the source.
    pub span: TextSpan,
    /// 0-based line of the token start.
    pub line: u32,
    /// Preceding-newline and similar flags.
    pub flags: TokenFlags,
}

impl Token {
    pub fn new(kind: TokenKind, text: String, span: TextSpan, line: u32) -> Self {
        Self {
            kind,
            text,
            span,
            line,
            flags: TokenFlags::NONE,
        }
    }

    /// Whether a line break occurred before this token.
    #[inline]
    pub fn has_preceding_newline(&self) -> bool {
        self.flags.contains(TokenFlags::PRECEDING_NEWLINE)
    }
}

// ============================================================================
// Reserved-word tables
// ============================================================================

/// Reserved words in declaration order. The completion engine relies on this
/// order when presenting suggestions.
pub const KEYWORDS: &[(&str, TokenKind)] = &[
    ("use", TokenKind::UseKeyword),
    ("type", TokenKind::TypeKeyword),
    ("interface", TokenKind::InterfaceKeyword),
    ("trait", TokenKind::TraitKeyword),
    ("primitive", TokenKind::PrimitiveKeyword),
    ("struct", TokenKind::StructKeyword),
    ("class", TokenKind::ClassKeyword),
    ("actor", TokenKind::ActorKeyword),
    ("object", TokenKind::ObjectKeyword),
    ("lambda", TokenKind::LambdaKeyword),
    ("as", TokenKind::AsKeyword),
    ("is", TokenKind::IsKeyword),
    ("isnt", TokenKind::IsntKeyword),
    ("var", TokenKind::VarKeyword),
    ("let", TokenKind::LetKeyword),
    ("embed", TokenKind::EmbedKeyword),
    ("new", TokenKind::NewKeyword),
    ("fun", TokenKind::FunKeyword),
    ("be", TokenKind::BeKeyword),
    ("iso", TokenKind::IsoKeyword),
    ("trn", TokenKind::TrnKeyword),
    ("ref", TokenKind::RefKeyword),
    ("val", TokenKind::ValKeyword),
    ("box", TokenKind::BoxKeyword),
    ("tag", TokenKind::TagKeyword),
    ("this", TokenKind::ThisKeyword),
    ("return", TokenKind::ReturnKeyword),
    ("break", TokenKind::BreakKeyword),
    ("continue", TokenKind::ContinueKeyword),
    ("error", TokenKind::ErrorKeyword),
    ("compile_intrinsic", TokenKind::CompileIntrinsicKeyword),
    ("compile_error", TokenKind::CompileErrorKeyword),
    ("if", TokenKind::IfKeyword),
    ("ifdef", TokenKind::IfdefKeyword),
    ("iftype", TokenKind::IftypeKeyword),
    ("then", TokenKind::ThenKeyword),
    ("elseif", TokenKind::ElseifKeyword),
    ("else", TokenKind::ElseKeyword),
    ("end", TokenKind::EndKeyword),
    ("while", TokenKind::WhileKeyword),
    ("do", TokenKind::DoKeyword),
    ("repeat", TokenKind::RepeatKeyword),
    ("until", TokenKind::UntilKeyword),
    ("for", TokenKind::ForKeyword),
    ("in", TokenKind::InKeyword),
    ("with", TokenKind::WithKeyword),
    ("match", TokenKind::MatchKeyword),
    ("where", TokenKind::WhereKeyword),
    ("try", TokenKind::TryKeyword),
    ("recover", TokenKind::RecoverKeyword),
    ("consume", TokenKind::ConsumeKeyword),
    ("not", TokenKind::NotKeyword),
    ("and", TokenKind::AndKeyword),
    ("or", TokenKind::OrKeyword),
    ("xor", TokenKind::XorKeyword),
    ("digestof", TokenKind::DigestofKeyword),
    ("addressof", TokenKind::AddressofKeyword),
    ("true", TokenKind::TrueKeyword),
    ("false", TokenKind::FalseKeyword),
];

/// Generic capability spellings (`#` plus a fixed word, lexed as one token).
pub const GENCAPS: &[(&str, TokenKind)] = &[
    ("read", TokenKind::CapRead),
    ("send", TokenKind::CapSend),
    ("share", TokenKind::CapShare),
    ("alias", TokenKind::CapAlias),
    ("any", TokenKind::CapAny),
];

fn keyword_table() -> &'static FxHashMap<&'static str, TokenKind> {
    static TABLE: OnceLock<FxHashMap<&'static str, TokenKind>> = OnceLock::new();
    TABLE.get_or_init(|| KEYWORDS.iter().copied().collect())
}

fn spelling_table() -> &'static FxHashMap<TokenKind, &'static str> {
    static TABLE: OnceLock<FxHashMap<TokenKind, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| KEYWORDS.iter().map(|&(text, kind)| (kind, text)).collect())
}

/// Look up a reserved word, returning its kind.
pub fn keyword_kind(text: &str) -> Option<TokenKind> {
    keyword_table().get(text).copied()
}

/// Look up a generic capability word (without the leading `#`).
pub fn gencap_kind(text: &str) -> Option<TokenKind> {
    GENCAPS
        .iter()
        .find(|&&(spelling, _)| spelling == text)
        .map(|&(_, kind)| kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(keyword_kind("actor"), Some(TokenKind::ActorKeyword));
        assert_eq!(keyword_kind("consume"), Some(TokenKind::ConsumeKeyword));
        assert_eq!(keyword_kind("elseif"), Some(TokenKind::ElseifKeyword));
        assert_eq!(keyword_kind("frobnicate"), None);
    }

    #[test]
    fn test_spelling_round_trips() {
        for &(text, kind) in KEYWORDS {
            assert_eq!(kind.keyword_spelling(), Some(text));
        }
        assert_eq!(TokenKind::OpenParen.keyword_spelling(), None);
    }

    #[test]
    fn test_newline_variants() {
        assert_eq!(
            TokenKind::OpenParen.newline_variant(),
            Some(TokenKind::OpenParenNew)
        );
        assert_eq!(
            TokenKind::MinusTilde.newline_variant(),
            Some(TokenKind::MinusTildeNew)
        );
        assert_eq!(TokenKind::Plus.newline_variant(), None);
    }

    #[test]
    fn test_gencap_lookup() {
        assert_eq!(gencap_kind("share"), Some(TokenKind::CapShare));
        assert_eq!(gencap_kind("write"), None);
    }
}
