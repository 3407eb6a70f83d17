//! The recursive-descent parser.
//!
//! One method per production. Every failure site reports the full set of
//! token kinds acceptable at that point; dispatch sites report their first
//! sets, `expect` sites report the single expected kind. The `Complete`
//! token kind matches nothing, so a stream carrying one always fails exactly
//! there.
//!
//! Operator chains are deliberately flat: every binary operator has the same
//! precedence and folds left, so `1 + 2 * 3` is `(1 + 2) * 3`. The language
//! expects parentheses for anything else.

use ponyfront_ast::node::*;
use ponyfront_ast::token::{Token, TokenKind};
use ponyfront_diagnostics::SyntaxError;

use TokenKind::*;

/// First set of a term (an operand of the flat operator chain).
const TERM_FIRST: &[TokenKind] = &[
    IfKeyword,
    IfdefKeyword,
    IftypeKeyword,
    MatchKeyword,
    WhileKeyword,
    RepeatKeyword,
    ForKeyword,
    WithKeyword,
    TryKeyword,
    RecoverKeyword,
    ConsumeKeyword,
    VarKeyword,
    LetKeyword,
    NotKeyword,
    Minus,
    MinusNew,
    MinusTilde,
    MinusTildeNew,
    AddressofKeyword,
    DigestofKeyword,
    Identifier,
    ThisKeyword,
    TrueKeyword,
    FalseKeyword,
    Int,
    Float,
    String,
    OpenParen,
    OpenParenNew,
    OpenBracket,
    OpenBracketNew,
    ObjectKeyword,
    At,
];

/// First set of a type.
const TYPE_FIRST: &[TokenKind] = &[
    ThisKeyword,
    IsoKeyword,
    TrnKeyword,
    RefKeyword,
    ValKeyword,
    BoxKeyword,
    TagKeyword,
    CapRead,
    CapSend,
    CapShare,
    CapAlias,
    CapAny,
    OpenParen,
    OpenParenNew,
    Identifier,
];

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Build a parser over an already-filtered token stream. The stream must
    /// end with an `Eof` token, as `tokenize` guarantees.
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        debug_assert!(matches!(tokens.last(), Some(t) if t.kind == Eof));
        Self { tokens, pos: 0 }
    }

    // ========================================================================
    // Start symbols (each consumes the whole stream)
    // ========================================================================

    pub fn module(&mut self) -> Result<Module, SyntaxError> {
        let module = self.parse_module()?;
        self.expect(Eof)?;
        Ok(module)
    }

    pub fn class_def(&mut self) -> Result<ClassDef, SyntaxError> {
        let def = self.parse_class_def()?;
        self.expect(Eof)?;
        Ok(def)
    }

    pub fn method(&mut self) -> Result<Method, SyntaxError> {
        let method = self.parse_method()?;
        self.expect(Eof)?;
        Ok(method)
    }

    pub fn expression(&mut self) -> Result<Expr, SyntaxError> {
        let expr = self.parse_assignment()?;
        self.expect(Eof)?;
        Ok(expr)
    }

    pub fn seq(&mut self) -> Result<Seq, SyntaxError> {
        let seq = self.parse_seq()?;
        self.expect(Eof)?;
        Ok(seq)
    }

    pub fn ty(&mut self) -> Result<Type, SyntaxError> {
        let ty = self.parse_type()?;
        self.expect(Eof)?;
        Ok(ty)
    }

    pub fn use_directive(&mut self) -> Result<Use, SyntaxError> {
        let use_ = self.parse_use()?;
        self.expect(Eof)?;
        Ok(use_)
    }

    pub fn ffi_decl(&mut self) -> Result<FfiDecl, SyntaxError> {
        let decl = self.parse_ffi_decl()?;
        self.expect(Eof)?;
        Ok(decl)
    }

    pub fn id_seq(&mut self) -> Result<IdPattern, SyntaxError> {
        let pattern = self.parse_id_seq()?;
        self.expect(Eof)?;
        Ok(pattern)
    }

    // ========================================================================
    // Token plumbing
    // ========================================================================

    #[inline]
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    #[inline]
    fn kind(&self) -> TokenKind {
        self.tokens[self.pos].kind
    }

    #[inline]
    fn kind_at(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map_or(Eof, |t| t.kind)
    }

    #[inline]
    fn at(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    /// Consume and return the current token. Never advances past `Eof`.
    fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if token.kind != Eof {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.at(kind) {
            Some(self.bump())
        } else {
            None
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, SyntaxError> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(vec![kind]))
        }
    }

    fn unexpected(&self, expected: Vec<TokenKind>) -> SyntaxError {
        SyntaxError::new(self.peek().clone(), expected)
    }

    /// Consume an identifier, returning its text.
    fn expect_id(&mut self) -> Result<std::string::String, SyntaxError> {
        Ok(self.expect(Identifier)?.text)
    }

    // ========================================================================
    // Module level
    // ========================================================================

    fn parse_module(&mut self) -> Result<Module, SyntaxError> {
        let docstring = self.eat(String).map(|t| t.text);
        let mut uses = Vec::new();
        let mut class_defs: Vec<ClassDef> = Vec::new();
        loop {
            match self.kind() {
                UseKeyword if class_defs.is_empty() => uses.push(self.parse_use()?),
                TypeKeyword | InterfaceKeyword | TraitKeyword | PrimitiveKeyword
                | StructKeyword | ClassKeyword | ActorKeyword => {
                    class_defs.push(self.parse_class_def()?)
                }
                Eof => break,
                _ => {
                    let mut expected = Vec::new();
                    if class_defs.is_empty() {
                        expected.push(UseKeyword);
                    }
                    expected.extend([
                        TypeKeyword,
                        InterfaceKeyword,
                        TraitKeyword,
                        PrimitiveKeyword,
                        StructKeyword,
                        ClassKeyword,
                        ActorKeyword,
                    ]);
                    if !class_defs.is_empty() {
                        // Still inside the last definition's member list.
                        expected.extend([
                            VarKeyword, LetKeyword, EmbedKeyword, NewKeyword, FunKeyword,
                            BeKeyword,
                        ]);
                    }
                    expected.push(Eof);
                    return Err(self.unexpected(expected));
                }
            }
        }
        Ok(Module {
            docstring,
            uses,
            class_defs,
        })
    }

    fn parse_use(&mut self) -> Result<Use, SyntaxError> {
        self.expect(UseKeyword)?;
        let id = if self.at(Identifier) && self.kind_at(1) == Assign {
            let id = self.bump().text;
            self.bump(); // '='
            Some(id)
        } else {
            None
        };
        let (package, ffi) = match self.kind() {
            String => (Some(self.bump().text), None),
            At => (None, Some(self.parse_ffi_decl()?)),
            _ => {
                let mut expected = vec![String, At];
                if id.is_none() {
                    expected.insert(0, Identifier);
                }
                return Err(self.unexpected(expected));
            }
        };
        let guard = if self.eat(IfKeyword).is_some() {
            Some(self.parse_infix()?)
        } else {
            None
        };
        Ok(Use {
            id,
            package,
            ffi,
            guard,
        })
    }

    fn parse_ffi_decl(&mut self) -> Result<FfiDecl, SyntaxError> {
        self.expect(At)?;
        let id = match self.kind() {
            Identifier | String => self.bump().text,
            _ => return Err(self.unexpected(vec![Identifier, String])),
        };
        let type_args = if self.at(OpenBracket) {
            self.parse_type_args()?
        } else {
            Vec::new()
        };
        self.expect(OpenParen)?;
        let mut params = Vec::new();
        let mut varargs = false;
        if !self.at(CloseParen) {
            loop {
                if self.eat(Ellipsis).is_some() {
                    varargs = true;
                    break;
                }
                params.push(self.parse_param()?);
                if self.eat(Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(CloseParen)?;
        let partial = self.eat(Question).is_some();
        Ok(FfiDecl {
            id,
            type_args,
            params,
            varargs,
            partial,
        })
    }

    // ========================================================================
    // Type definitions and members
    // ========================================================================

    fn parse_class_def(&mut self) -> Result<ClassDef, SyntaxError> {
        let kind = match self.kind() {
            TypeKeyword => ClassKind::Type,
            InterfaceKeyword => ClassKind::Interface,
            TraitKeyword => ClassKind::Trait,
            PrimitiveKeyword => ClassKind::Primitive,
            StructKeyword => ClassKind::Struct,
            ClassKeyword => ClassKind::Class,
            ActorKeyword => ClassKind::Actor,
            _ => {
                return Err(self.unexpected(vec![
                    TypeKeyword,
                    InterfaceKeyword,
                    TraitKeyword,
                    PrimitiveKeyword,
                    StructKeyword,
                    ClassKeyword,
                    ActorKeyword,
                ]))
            }
        };
        self.bump();
        let annotations = self.parse_annotations()?;
        let capability = self.eat_capability();
        let id = self.expect_id()?;
        let type_params = if self.at(OpenBracket) {
            self.parse_type_params()?
        } else {
            Vec::new()
        };
        let provides = if self.eat(IsKeyword).is_some() {
            Some(self.parse_type()?)
        } else {
            None
        };
        let docstring = self.eat(String).map(|t| t.text);
        let (fields, methods) = self.parse_members()?;
        Ok(ClassDef {
            kind,
            annotations,
            capability,
            id,
            type_params,
            provides,
            docstring,
            fields,
            methods,
        })
    }

    /// Members of a class or object literal. The shape itself forces all
    /// fields before all methods.
    fn parse_members(&mut self) -> Result<(Vec<Field>, Vec<Method>), SyntaxError> {
        let mut fields = Vec::new();
        while matches!(self.kind(), VarKeyword | LetKeyword | EmbedKeyword) {
            fields.push(self.parse_field()?);
        }
        let mut methods = Vec::new();
        while matches!(self.kind(), NewKeyword | FunKeyword | BeKeyword) {
            methods.push(self.parse_method()?);
        }
        Ok((fields, methods))
    }

    fn parse_field(&mut self) -> Result<Field, SyntaxError> {
        let kind = match self.kind() {
            VarKeyword => FieldKind::Var,
            LetKeyword => FieldKind::Let,
            EmbedKeyword => FieldKind::Embed,
            _ => return Err(self.unexpected(vec![VarKeyword, LetKeyword, EmbedKeyword])),
        };
        self.bump();
        let id = self.expect_id()?;
        self.expect(Colon)?;
        let ty = self.parse_type()?;
        let default = if self.eat(Assign).is_some() {
            Some(self.parse_infix()?)
        } else {
            None
        };
        Ok(Field {
            kind,
            id,
            ty,
            default,
        })
    }

    fn parse_method(&mut self) -> Result<Method, SyntaxError> {
        let kind = match self.kind() {
            NewKeyword => MethodKind::New,
            FunKeyword => MethodKind::Fun,
            BeKeyword => MethodKind::Be,
            _ => return Err(self.unexpected(vec![NewKeyword, FunKeyword, BeKeyword])),
        };
        self.bump();
        let annotations = self.parse_annotations()?;
        let capability = if self.at(At) {
            self.bump();
            Some("@".to_string())
        } else {
            self.eat_capability()
        };
        let id = self.expect_id()?;
        let type_params = if self.at(OpenBracket) {
            self.parse_type_params()?
        } else {
            Vec::new()
        };
        self.expect(OpenParen)?;
        let mut params = Vec::new();
        if !self.at(CloseParen) {
            loop {
                params.push(self.parse_param()?);
                if self.eat(Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(CloseParen)?;
        let return_type = if self.eat(Colon).is_some() {
            Some(self.parse_type()?)
        } else {
            None
        };
        let partial = self.eat(Question).is_some();
        let docstring = self.eat(String).map(|t| t.text);
        let guard = if self.eat(IfKeyword).is_some() {
            Some(self.parse_seq()?)
        } else {
            None
        };
        let body = if self.eat(DblArrow).is_some() {
            Some(self.parse_seq()?)
        } else {
            None
        };
        Ok(Method {
            kind,
            annotations,
            capability,
            id,
            type_params,
            params,
            return_type,
            partial,
            docstring,
            guard,
            body,
        })
    }

    fn parse_param(&mut self) -> Result<Param, SyntaxError> {
        let id = self.expect_id()?;
        let ty = if self.eat(Colon).is_some() {
            Some(self.parse_type()?)
        } else {
            None
        };
        let default = if self.eat(Assign).is_some() {
            Some(self.parse_infix()?)
        } else {
            None
        };
        Ok(Param { id, ty, default })
    }

    fn parse_type_params(&mut self) -> Result<Vec<TypeParam>, SyntaxError> {
        self.expect(OpenBracket)?;
        let mut params = Vec::new();
        loop {
            let id = self.expect_id()?;
            let constraint = if self.eat(Colon).is_some() {
                Some(self.parse_type()?)
            } else {
                None
            };
            let default = if self.eat(Assign).is_some() {
                Some(self.parse_type_arg()?)
            } else {
                None
            };
            params.push(TypeParam {
                id,
                constraint,
                default,
            });
            if self.eat(Comma).is_none() {
                break;
            }
        }
        self.expect(CloseBracket)?;
        Ok(params)
    }

    /// Annotations: `\id, id\` after a keyword.
    fn parse_annotations(&mut self) -> Result<Vec<std::string::String>, SyntaxError> {
        if self.eat(Backslash).is_none() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        loop {
            ids.push(self.expect_id()?);
            if self.eat(Comma).is_none() {
                break;
            }
        }
        self.expect(Backslash)?;
        Ok(ids)
    }

    fn eat_capability(&mut self) -> Option<std::string::String> {
        if self.kind().is_capability() || self.kind().is_gencap() {
            Some(self.bump().text)
        } else {
            None
        }
    }

    // ========================================================================
    // Sequences and jumps
    // ========================================================================

    fn at_jump_start(&self) -> bool {
        matches!(
            self.kind(),
            ReturnKeyword
                | BreakKeyword
                | ContinueKeyword
                | ErrorKeyword
                | CompileIntrinsicKeyword
                | CompileErrorKeyword
        )
    }

    /// Whether the current token can begin a new expression in a sequence.
    /// The plain `(`, `[`, `-` and `-~` kinds are absent: mid-line they bind
    /// to the previous expression as suffixes or operators, and only their
    /// line-start variants open a fresh expression.
    fn starts_next_expr(&self) -> bool {
        matches!(
            self.kind(),
            Identifier
                | Int
                | Float
                | String
                | TrueKeyword
                | FalseKeyword
                | ThisKeyword
                | NotKeyword
                | ConsumeKeyword
                | RecoverKeyword
                | IfKeyword
                | IfdefKeyword
                | IftypeKeyword
                | MatchKeyword
                | WhileKeyword
                | RepeatKeyword
                | ForKeyword
                | WithKeyword
                | TryKeyword
                | VarKeyword
                | LetKeyword
                | ObjectKeyword
                | AddressofKeyword
                | DigestofKeyword
                | At
                | OpenParenNew
                | OpenBracketNew
                | MinusNew
                | MinusTildeNew
        )
    }

    fn parse_seq(&mut self) -> Result<Seq, SyntaxError> {
        let mut exprs = Vec::new();
        let mut jump = None;
        if self.at_jump_start() {
            return Ok(Seq {
                exprs,
                jump: Some(self.parse_jump()?),
            });
        }
        exprs.push(self.parse_assignment()?);
        loop {
            if self.eat(Semicolon).is_some() {
                if self.at_jump_start() {
                    jump = Some(self.parse_jump()?);
                    break;
                }
                if !self.starts_next_expr() {
                    let mut expected = TERM_FIRST.to_vec();
                    expected.extend([
                        ReturnKeyword,
                        BreakKeyword,
                        ContinueKeyword,
                        ErrorKeyword,
                        CompileIntrinsicKeyword,
                        CompileErrorKeyword,
                    ]);
                    return Err(self.unexpected(expected));
                }
                exprs.push(self.parse_assignment()?);
                continue;
            }
            if self.at_jump_start() {
                jump = Some(self.parse_jump()?);
                break;
            }
            if self.starts_next_expr() {
                exprs.push(self.parse_assignment()?);
                continue;
            }
            break;
        }
        Ok(Seq { exprs, jump })
    }

    fn parse_jump(&mut self) -> Result<Jump, SyntaxError> {
        let kind = match self.kind() {
            ReturnKeyword => JumpKind::Return,
            BreakKeyword => JumpKind::Break,
            ContinueKeyword => JumpKind::Continue,
            ErrorKeyword => JumpKind::Error,
            CompileIntrinsicKeyword => JumpKind::CompileIntrinsic,
            CompileErrorKeyword => JumpKind::CompileError,
            _ => {
                return Err(self.unexpected(vec![
                    ReturnKeyword,
                    BreakKeyword,
                    ContinueKeyword,
                    ErrorKeyword,
                    CompileIntrinsicKeyword,
                    CompileErrorKeyword,
                ]))
            }
        };
        self.bump();
        // No expression precedes the jump keyword, so plain `(`, `[`, `-`
        // and `-~` have nothing to bind to and open the value even mid-line.
        let value = if TERM_FIRST.contains(&self.kind()) {
            Some(Box::new(self.parse_seq()?))
        } else {
            None
        };
        Ok(Jump { kind, value })
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn parse_assignment(&mut self) -> Result<Expr, SyntaxError> {
        let lhs = self.parse_infix()?;
        if self.eat(Assign).is_some() {
            let rhs = self.parse_assignment()?;
            Ok(Expr::Assign {
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            })
        } else {
            Ok(lhs)
        }
    }

    /// The flat operator chain: every operator at equal precedence, folding
    /// left. `is`/`isnt` and `as` participate in the same chain.
    fn parse_infix(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_term()?;
        loop {
            match self.kind() {
                AndKeyword | OrKeyword | XorKeyword | Plus | Minus | Star | Slash | Percent
                | Shl | Shr | Eq | Ne | Lt | Le | Gt | Ge | PlusTilde | MinusTilde | StarTilde
                | SlashTilde | PercentTilde | ShlTilde | ShrTilde | EqTilde | NeTilde | LtTilde
                | LeTilde | GtTilde | GeTilde => {
                    let op = self.bump().text;
                    let partial = self.eat(Question).is_some();
                    let right = self.parse_term()?;
                    left = Expr::Binop {
                        op,
                        left: Box::new(left),
                        right: Box::new(right),
                        partial,
                    };
                }
                IsKeyword | IsntKeyword => {
                    let op = self.bump().text;
                    let right = self.parse_term()?;
                    left = Expr::Isop {
                        op,
                        left: Box::new(left),
                        right: Box::new(right),
                    };
                }
                AsKeyword => {
                    self.bump();
                    let ty = self.parse_type()?;
                    left = Expr::AsOp {
                        expr: Box::new(left),
                        ty,
                    };
                }
                _ => break,
            }
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, SyntaxError> {
        match self.kind() {
            IfKeyword => self.parse_if(),
            IfdefKeyword => self.parse_ifdef(),
            IftypeKeyword => self.parse_iftype(),
            MatchKeyword => self.parse_match(),
            WhileKeyword => self.parse_while(),
            RepeatKeyword => self.parse_repeat(),
            ForKeyword => self.parse_for(),
            WithKeyword => self.parse_with(),
            TryKeyword => self.parse_try(),
            RecoverKeyword => self.parse_recover(),
            ConsumeKeyword => self.parse_consume(),
            VarKeyword | LetKeyword => self.parse_local(),
            NotKeyword | Minus | MinusNew | MinusTilde | MinusTildeNew | AddressofKeyword
            | DigestofKeyword => {
                let op = self.bump().text;
                let expr = self.parse_term()?;
                Ok(Expr::Unary {
                    op,
                    expr: Box::new(expr),
                })
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_local(&mut self) -> Result<Expr, SyntaxError> {
        let kind = if self.eat(VarKeyword).is_some() {
            LocalKind::Var
        } else {
            self.expect(LetKeyword)?;
            LocalKind::Let
        };
        let id = self.expect_id()?;
        let ty = if self.eat(Colon).is_some() {
            Some(self.parse_type()?)
        } else {
            None
        };
        Ok(Expr::Local { kind, id, ty })
    }

    // ========================================================================
    // Postfix suffixes
    // ========================================================================

    /// An atom followed by any number of suffixes, folding left. Only the
    /// plain `(` and `[` kinds attach as call/qualify suffixes; their
    /// line-start variants begin a new expression instead.
    fn parse_postfix(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.parse_atom()?;
        loop {
            match self.kind() {
                Dot => {
                    self.bump();
                    let id = self.expect_id()?;
                    expr = Expr::Dot {
                        expr: Box::new(expr),
                        id,
                    };
                }
                Tilde => {
                    self.bump();
                    let id = self.expect_id()?;
                    expr = Expr::Tilde {
                        expr: Box::new(expr),
                        id,
                    };
                }
                Chain => {
                    self.bump();
                    let id = self.expect_id()?;
                    expr = Expr::Chain {
                        expr: Box::new(expr),
                        id,
                    };
                }
                OpenBracket => {
                    let type_args = self.parse_type_args()?;
                    expr = Expr::Qualify {
                        expr: Box::new(expr),
                        type_args,
                    };
                }
                OpenParen => {
                    let (positional, named) = self.parse_call_args()?;
                    let partial = self.eat(Question).is_some();
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        positional,
                        named,
                        partial,
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// Call arguments: positional sequences, then `where`-introduced named
    /// arguments.
    fn parse_call_args(&mut self) -> Result<(Vec<Seq>, Vec<NamedArg>), SyntaxError> {
        self.expect(OpenParen)?;
        let mut positional = Vec::new();
        let mut named = Vec::new();
        if !self.at(CloseParen) && !self.at(WhereKeyword) {
            loop {
                positional.push(self.parse_seq()?);
                if self.eat(Comma).is_none() {
                    break;
                }
            }
        }
        if self.eat(WhereKeyword).is_some() {
            loop {
                let id = self.expect_id()?;
                self.expect(Assign)?;
                let value = self.parse_seq()?;
                named.push(NamedArg { id, value });
                if self.eat(Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(CloseParen)?;
        Ok((positional, named))
    }

    // ========================================================================
    // Atoms
    // ========================================================================

    fn parse_atom(&mut self) -> Result<Expr, SyntaxError> {
        match self.kind() {
            Identifier => Ok(Expr::Reference(self.bump().text)),
            ThisKeyword => {
                self.bump();
                Ok(Expr::This)
            }
            TrueKeyword => {
                self.bump();
                Ok(Expr::True)
            }
            FalseKeyword => {
                self.bump();
                Ok(Expr::False)
            }
            Int => Ok(Expr::Int(self.bump().text)),
            Float => Ok(Expr::Float(self.bump().text)),
            String => Ok(Expr::Str(self.bump().text)),
            OpenParen | OpenParenNew => self.parse_tuple(),
            OpenBracket | OpenBracketNew => self.parse_array(),
            ObjectKeyword => self.parse_object(),
            At => self.parse_ffi_call(),
            _ => Err(self.unexpected(TERM_FIRST.to_vec())),
        }
    }

    fn parse_tuple(&mut self) -> Result<Expr, SyntaxError> {
        self.bump(); // '(' in either flavour
        let mut elems = vec![self.parse_seq()?];
        while self.eat(Comma).is_some() {
            elems.push(self.parse_seq()?);
        }
        self.expect(CloseParen)?;
        Ok(Expr::Tuple(elems))
    }

    fn parse_array(&mut self) -> Result<Expr, SyntaxError> {
        self.bump(); // '[' in either flavour
        let ty = if self.eat(AsKeyword).is_some() {
            let ty = self.parse_type()?;
            self.expect(Colon)?;
            Some(ty)
        } else {
            None
        };
        let elems = if self.at(CloseBracket) {
            None
        } else {
            Some(self.parse_seq()?)
        };
        self.expect(CloseBracket)?;
        Ok(Expr::Array { ty, elems })
    }

    fn parse_object(&mut self) -> Result<Expr, SyntaxError> {
        self.expect(ObjectKeyword)?;
        let capability = self.eat_capability();
        let provides = if self.eat(IsKeyword).is_some() {
            Some(self.parse_type()?)
        } else {
            None
        };
        let (fields, methods) = self.parse_members()?;
        self.expect(EndKeyword)?;
        Ok(Expr::Object {
            capability,
            provides,
            fields,
            methods,
        })
    }

    fn parse_ffi_call(&mut self) -> Result<Expr, SyntaxError> {
        self.expect(At)?;
        let id = match self.kind() {
            Identifier | String => self.bump().text,
            _ => return Err(self.unexpected(vec![Identifier, String])),
        };
        let type_args = if self.at(OpenBracket) {
            self.parse_type_args()?
        } else {
            Vec::new()
        };
        let (positional, named) = self.parse_call_args()?;
        let partial = self.eat(Question).is_some();
        Ok(Expr::FfiCall {
            id,
            type_args,
            positional,
            named,
            partial,
        })
    }

    // ========================================================================
    // Control constructs
    // ========================================================================

    fn parse_if(&mut self) -> Result<Expr, SyntaxError> {
        self.expect(IfKeyword)?;
        let arm = self.parse_if_arm()?;
        self.expect(EndKeyword)?;
        Ok(Expr::If(Box::new(arm)))
    }

    /// The body of an `if` or `elseif` arm, up to (but not consuming) the
    /// shared `end`.
    fn parse_if_arm(&mut self) -> Result<IfExpr, SyntaxError> {
        let annotations = self.parse_annotations()?;
        let condition = self.parse_seq()?;
        self.expect(ThenKeyword)?;
        let then_body = self.parse_seq()?;
        let else_branch = match self.kind() {
            ElseifKeyword => {
                self.bump();
                Some(IfElse::Elseif(Box::new(self.parse_if_arm()?)))
            }
            ElseKeyword => {
                self.bump();
                Some(IfElse::Else(self.parse_else_block()?))
            }
            EndKeyword => None,
            _ => return Err(self.unexpected(vec![ElseifKeyword, ElseKeyword, EndKeyword])),
        };
        Ok(IfExpr {
            annotations,
            condition,
            then_body,
            else_branch,
        })
    }

    fn parse_ifdef(&mut self) -> Result<Expr, SyntaxError> {
        self.expect(IfdefKeyword)?;
        let arm = self.parse_ifdef_arm()?;
        self.expect(EndKeyword)?;
        Ok(Expr::Ifdef(Box::new(arm)))
    }

    fn parse_ifdef_arm(&mut self) -> Result<IfdefExpr, SyntaxError> {
        let annotations = self.parse_annotations()?;
        let condition = self.parse_seq()?;
        self.expect(ThenKeyword)?;
        let then_body = self.parse_seq()?;
        let else_branch = match self.kind() {
            ElseifKeyword => {
                self.bump();
                Some(IfdefElse::Elseif(Box::new(self.parse_ifdef_arm()?)))
            }
            ElseKeyword => {
                self.bump();
                Some(IfdefElse::Else(self.parse_else_block()?))
            }
            EndKeyword => None,
            _ => return Err(self.unexpected(vec![ElseifKeyword, ElseKeyword, EndKeyword])),
        };
        Ok(IfdefExpr {
            annotations,
            condition,
            then_body,
            else_branch,
        })
    }

    fn parse_iftype(&mut self) -> Result<Expr, SyntaxError> {
        self.expect(IftypeKeyword)?;
        let arm = self.parse_iftype_arm()?;
        self.expect(EndKeyword)?;
        Ok(Expr::Iftype(Box::new(arm)))
    }

    fn parse_iftype_arm(&mut self) -> Result<IftypeExpr, SyntaxError> {
        let annotations = self.parse_annotations()?;
        let sub = self.parse_type()?;
        self.expect(Subtype)?;
        let super_ = self.parse_type()?;
        self.expect(ThenKeyword)?;
        let then_body = self.parse_seq()?;
        let else_branch = match self.kind() {
            ElseifKeyword => {
                self.bump();
                Some(IftypeElse::Elseif(Box::new(self.parse_iftype_arm()?)))
            }
            ElseKeyword => {
                self.bump();
                Some(IftypeElse::Else(self.parse_else_block()?))
            }
            EndKeyword => None,
            _ => return Err(self.unexpected(vec![ElseifKeyword, ElseKeyword, EndKeyword])),
        };
        Ok(IftypeExpr {
            annotations,
            sub,
            super_,
            then_body,
            else_branch,
        })
    }

    fn parse_else_block(&mut self) -> Result<ElseBlock, SyntaxError> {
        let annotations = self.parse_annotations()?;
        let body = self.parse_seq()?;
        Ok(ElseBlock { annotations, body })
    }

    fn parse_match(&mut self) -> Result<Expr, SyntaxError> {
        self.expect(MatchKeyword)?;
        let annotations = self.parse_annotations()?;
        let subject = self.parse_seq()?;
        let mut cases = Vec::new();
        while self.eat(Pipe).is_some() {
            cases.push(self.parse_case()?);
        }
        let else_branch = if self.eat(ElseKeyword).is_some() {
            Some(self.parse_else_block()?)
        } else {
            None
        };
        self.expect(EndKeyword)?;
        Ok(Expr::Match {
            annotations,
            subject,
            cases,
            else_branch,
        })
    }

    /// One match case, after its `|`. All three parts are optional; a bare
    /// `|` is a wildcard arm.
    fn parse_case(&mut self) -> Result<Case, SyntaxError> {
        let annotations = self.parse_annotations()?;
        let pattern = if matches!(
            self.kind(),
            IfKeyword | DblArrow | Pipe | ElseKeyword | EndKeyword
        ) {
            None
        } else {
            Some(self.parse_infix()?)
        };
        let guard = if self.eat(IfKeyword).is_some() {
            Some(self.parse_seq()?)
        } else {
            None
        };
        let action = if self.eat(DblArrow).is_some() {
            Some(self.parse_seq()?)
        } else {
            None
        };
        Ok(Case {
            annotations,
            pattern,
            guard,
            action,
        })
    }

    fn parse_while(&mut self) -> Result<Expr, SyntaxError> {
        self.expect(WhileKeyword)?;
        let annotations = self.parse_annotations()?;
        let condition = self.parse_seq()?;
        self.expect(DoKeyword)?;
        let body = self.parse_seq()?;
        let else_branch = if self.eat(ElseKeyword).is_some() {
            Some(self.parse_else_block()?)
        } else {
            None
        };
        self.expect(EndKeyword)?;
        Ok(Expr::While {
            annotations,
            condition,
            body,
            else_branch,
        })
    }

    fn parse_repeat(&mut self) -> Result<Expr, SyntaxError> {
        self.expect(RepeatKeyword)?;
        let annotations = self.parse_annotations()?;
        let body = self.parse_seq()?;
        self.expect(UntilKeyword)?;
        let condition = self.parse_seq()?;
        let else_branch = if self.eat(ElseKeyword).is_some() {
            Some(self.parse_else_block()?)
        } else {
            None
        };
        self.expect(EndKeyword)?;
        Ok(Expr::Repeat {
            annotations,
            body,
            condition,
            else_branch,
        })
    }

    fn parse_for(&mut self) -> Result<Expr, SyntaxError> {
        self.expect(ForKeyword)?;
        let annotations = self.parse_annotations()?;
        let pattern = self.parse_id_seq()?;
        self.expect(InKeyword)?;
        let iterator = self.parse_seq()?;
        self.expect(DoKeyword)?;
        let body = self.parse_seq()?;
        let else_branch = if self.eat(ElseKeyword).is_some() {
            Some(self.parse_else_block()?)
        } else {
            None
        };
        self.expect(EndKeyword)?;
        Ok(Expr::For {
            annotations,
            pattern,
            iterator,
            body,
            else_branch,
        })
    }

    fn parse_with(&mut self) -> Result<Expr, SyntaxError> {
        self.expect(WithKeyword)?;
        let annotations = self.parse_annotations()?;
        let mut elems = Vec::new();
        loop {
            let pattern = self.parse_id_seq()?;
            self.expect(Assign)?;
            let initialiser = self.parse_seq()?;
            elems.push(WithElem {
                pattern,
                initialiser,
            });
            if self.eat(Comma).is_none() {
                break;
            }
        }
        self.expect(DoKeyword)?;
        let body = self.parse_seq()?;
        let else_branch = if self.eat(ElseKeyword).is_some() {
            Some(self.parse_else_block()?)
        } else {
            None
        };
        self.expect(EndKeyword)?;
        Ok(Expr::With {
            annotations,
            elems,
            body,
            else_branch,
        })
    }

    fn parse_try(&mut self) -> Result<Expr, SyntaxError> {
        self.expect(TryKeyword)?;
        let annotations = self.parse_annotations()?;
        let body = self.parse_seq()?;
        let else_branch = if self.eat(ElseKeyword).is_some() {
            Some(self.parse_else_block()?)
        } else {
            None
        };
        let then_branch = if self.eat(ThenKeyword).is_some() {
            Some(self.parse_seq()?)
        } else {
            None
        };
        self.expect(EndKeyword)?;
        Ok(Expr::Try {
            annotations,
            body,
            else_branch,
            then_branch,
        })
    }

    fn parse_recover(&mut self) -> Result<Expr, SyntaxError> {
        self.expect(RecoverKeyword)?;
        let annotations = self.parse_annotations()?;
        let capability = self.eat_capability();
        let body = self.parse_seq()?;
        self.expect(EndKeyword)?;
        Ok(Expr::Recover {
            annotations,
            capability,
            body,
        })
    }

    fn parse_consume(&mut self) -> Result<Expr, SyntaxError> {
        self.expect(ConsumeKeyword)?;
        let capability = self.eat_capability();
        let expr = self.parse_term()?;
        Ok(Expr::Consume {
            capability,
            expr: Box::new(expr),
        })
    }

    fn parse_id_seq(&mut self) -> Result<IdPattern, SyntaxError> {
        match self.kind() {
            Identifier => Ok(IdPattern::Name(self.bump().text)),
            OpenParen | OpenParenNew => {
                self.bump();
                let mut elems = vec![self.parse_id_seq()?];
                while self.eat(Comma).is_some() {
                    elems.push(self.parse_id_seq()?);
                }
                self.expect(CloseParen)?;
                Ok(IdPattern::Tuple(elems))
            }
            _ => Err(self.unexpected(vec![Identifier, OpenParen, OpenParenNew])),
        }
    }

    // ========================================================================
    // Types
    // ========================================================================

    fn parse_type(&mut self) -> Result<Type, SyntaxError> {
        let origin = self.parse_atom_type()?;
        if self.eat(Arrow).is_some() {
            // Right-associative viewpoint adaptation.
            let target = self.parse_type()?;
            return Ok(Type::Arrow {
                origin: Box::new(origin),
                target: Box::new(target),
            });
        }
        Ok(origin)
    }

    fn parse_atom_type(&mut self) -> Result<Type, SyntaxError> {
        match self.kind() {
            ThisKeyword => {
                self.bump();
                Ok(Type::This)
            }
            kind if kind.is_capability() || kind.is_gencap() => Ok(Type::Cap(self.bump().text)),
            OpenParen | OpenParenNew => self.parse_grouped_type(),
            Identifier => self.parse_nominal_type(),
            _ => Err(self.unexpected(TYPE_FIRST.to_vec())),
        }
    }

    /// A parenthesised type: union, intersection, tuple, or plain grouping,
    /// depending on the separator. Separators may not be mixed at one level.
    fn parse_grouped_type(&mut self) -> Result<Type, SyntaxError> {
        self.bump(); // '(' in either flavour
        let first = self.parse_type()?;
        let ty = match self.kind() {
            Pipe => {
                let mut types = vec![first];
                while self.eat(Pipe).is_some() {
                    types.push(self.parse_type()?);
                }
                Type::Union(types)
            }
            Ampersand => {
                let mut types = vec![first];
                while self.eat(Ampersand).is_some() {
                    types.push(self.parse_type()?);
                }
                Type::Isect(types)
            }
            Comma => {
                let mut types = vec![first];
                while self.eat(Comma).is_some() {
                    types.push(self.parse_type()?);
                }
                Type::Tuple(types)
            }
            _ => first,
        };
        self.expect(CloseParen)?;
        Ok(ty)
    }

    fn parse_nominal_type(&mut self) -> Result<Type, SyntaxError> {
        let first = self.expect_id()?;
        let (package, id) = if self.eat(Dot).is_some() {
            (Some(first), self.expect_id()?)
        } else {
            (None, first)
        };
        let type_args = if self.at(OpenBracket) || self.at(OpenBracketNew) {
            self.parse_type_args()?
        } else {
            Vec::new()
        };
        let capability = self.eat_capability();
        let cap_modifier = match self.kind() {
            Hat | Bang => Some(self.bump().text),
            _ => None,
        };
        Ok(Type::Nominal {
            package,
            id,
            type_args,
            capability,
            cap_modifier,
        })
    }

    fn parse_type_args(&mut self) -> Result<Vec<TypeArg>, SyntaxError> {
        self.bump(); // '[' in either flavour
        let mut args = Vec::new();
        loop {
            args.push(self.parse_type_arg()?);
            if self.eat(Comma).is_none() {
                break;
            }
        }
        self.expect(CloseBracket)?;
        Ok(args)
    }

    /// A type argument is usually a type, but literal values are admitted
    /// for value-dependent generics.
    fn parse_type_arg(&mut self) -> Result<TypeArg, SyntaxError> {
        match self.kind() {
            Int => Ok(TypeArg::Literal(Expr::Int(self.bump().text))),
            Float => Ok(TypeArg::Literal(Expr::Float(self.bump().text))),
            String => Ok(TypeArg::Literal(Expr::Str(self.bump().text))),
            TrueKeyword => {
                self.bump();
                Ok(TypeArg::Literal(Expr::True))
            }
            FalseKeyword => {
                self.bump();
                Ok(TypeArg::Literal(Expr::False))
            }
            Minus | MinusNew => {
                let op = self.bump().text;
                let value = match self.kind() {
                    Int => Expr::Int(self.bump().text),
                    Float => Expr::Float(self.bump().text),
                    _ => return Err(self.unexpected(vec![Int, Float])),
                };
                Ok(TypeArg::Literal(Expr::Unary {
                    op,
                    expr: Box::new(value),
                }))
            }
            _ => Ok(TypeArg::Type(self.parse_type()?)),
        }
    }
}
