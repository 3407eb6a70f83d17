//! Owned AST node types.
//!
//! Every node owns its children outright; trees are self-contained values
//! with no back-references and are never mutated after the parser builds
//! them. Capabilities and operators are stored by their surface spelling so
//! the printer can reproduce source verbatim.

/// A whole source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub docstring: Option<String>,
    pub uses: Vec<Use>,
    pub class_defs: Vec<ClassDef>,
}

/// A `use` directive: package import, aliased import, or FFI declaration,
/// each optionally guarded by a platform expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Use {
    pub id: Option<String>,
    /// Raw string token of the package path, quotes included.
    pub package: Option<String>,
    pub ffi: Option<FfiDecl>,
    pub guard: Option<Expr>,
}

/// An FFI signature declaration, as in `use @getuid[U32]()`.
#[derive(Debug, Clone, PartialEq)]
pub struct FfiDecl {
    pub id: String,
    pub type_args: Vec<TypeArg>,
    pub params: Vec<Param>,
    pub varargs: bool,
    pub partial: bool,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ClassKind {
    Type,
    Interface,
    Trait,
    Primitive,
    Struct,
    Class,
    Actor,
}

impl ClassKind {
    pub fn spelling(self) -> &'static str {
        match self {
            ClassKind::Type => "type",
            ClassKind::Interface => "interface",
            ClassKind::Trait => "trait",
            ClassKind::Primitive => "primitive",
            ClassKind::Struct => "struct",
            ClassKind::Class => "class",
            ClassKind::Actor => "actor",
        }
    }
}

/// A type definition of any flavour (`class`, `actor`, `trait`, ...).
/// The grammar itself forces all fields to precede all methods.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub kind: ClassKind,
    pub annotations: Vec<String>,
    pub capability: Option<String>,
    pub id: String,
    pub type_params: Vec<TypeParam>,
    pub provides: Option<Type>,
    pub docstring: Option<String>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    pub id: String,
    pub constraint: Option<Type>,
    pub default: Option<TypeArg>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FieldKind {
    Var,
    Let,
    Embed,
}

impl FieldKind {
    pub fn spelling(self) -> &'static str {
        match self {
            FieldKind::Var => "var",
            FieldKind::Let => "let",
            FieldKind::Embed => "embed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub kind: FieldKind,
    pub id: String,
    pub ty: Type,
    pub default: Option<Expr>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MethodKind {
    New,
    Fun,
    Be,
}

impl MethodKind {
    pub fn spelling(self) -> &'static str {
        match self {
            MethodKind::New => "new",
            MethodKind::Fun => "fun",
            MethodKind::Be => "be",
        }
    }
}

/// A constructor, function, or behaviour. `capability` holds either a
/// reference capability spelling or `"@"` for bare functions.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub kind: MethodKind,
    pub annotations: Vec<String>,
    pub capability: Option<String>,
    pub id: String,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: Option<Type>,
    pub partial: bool,
    pub docstring: Option<String>,
    pub guard: Option<Seq>,
    pub body: Option<Seq>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub id: String,
    pub ty: Option<Type>,
    pub default: Option<Expr>,
}

/// A sequence of expressions, optionally ending in a jump.
#[derive(Debug, Clone, PartialEq)]
pub struct Seq {
    pub exprs: Vec<Expr>,
    pub jump: Option<Jump>,
}

impl Seq {
    pub fn single(expr: Expr) -> Self {
        Seq {
            exprs: vec![expr],
            jump: None,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum JumpKind {
    Return,
    Break,
    Continue,
    Error,
    CompileIntrinsic,
    CompileError,
}

impl JumpKind {
    pub fn spelling(self) -> &'static str {
        match self {
            JumpKind::Return => "return",
            JumpKind::Break => "break",
            JumpKind::Continue => "continue",
            JumpKind::Error => "error",
            JumpKind::CompileIntrinsic => "compile_intrinsic",
            JumpKind::CompileError => "compile_error",
        }
    }
}

/// A control-flow jump terminating a sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Jump {
    pub kind: JumpKind,
    pub value: Option<Box<Seq>>,
}

/// An `if`/`elseif` arm. The same shape serves both: an `elseif` is this
/// node nested in the else slot of its predecessor.
#[derive(Debug, Clone, PartialEq)]
pub struct IfExpr {
    pub annotations: Vec<String>,
    pub condition: Seq,
    pub then_body: Seq,
    pub else_branch: Option<IfElse>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IfElse {
    Elseif(Box<IfExpr>),
    Else(ElseBlock),
}

/// An `ifdef`/`elseif` arm (compile-time platform conditional).
#[derive(Debug, Clone, PartialEq)]
pub struct IfdefExpr {
    pub annotations: Vec<String>,
    pub condition: Seq,
    pub then_body: Seq,
    pub else_branch: Option<IfdefElse>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IfdefElse {
    Elseif(Box<IfdefExpr>),
    Else(ElseBlock),
}

/// An `iftype`/`elseif` arm (compile-time subtype conditional).
#[derive(Debug, Clone, PartialEq)]
pub struct IftypeExpr {
    pub annotations: Vec<String>,
    pub sub: Type,
    pub super_: Type,
    pub then_body: Seq,
    pub else_branch: Option<IftypeElse>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IftypeElse {
    Elseif(Box<IftypeExpr>),
    Else(ElseBlock),
}

/// A plain `else` block.
#[derive(Debug, Clone, PartialEq)]
pub struct ElseBlock {
    pub annotations: Vec<String>,
    pub body: Seq,
}

/// One arm of a `match` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub annotations: Vec<String>,
    pub pattern: Option<Expr>,
    pub guard: Option<Seq>,
    pub action: Option<Seq>,
}

/// A named call argument after `where`.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedArg {
    pub id: String,
    pub value: Seq,
}

/// One `pattern = initialiser` element of a `with` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct WithElem {
    pub pattern: IdPattern,
    pub initialiser: Seq,
}

/// The destructuring pattern of `for` and `with` bindings.
#[derive(Debug, Clone, PartialEq)]
pub enum IdPattern {
    Name(String),
    Tuple(Vec<IdPattern>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Right-associative `=`.
    Assign { lhs: Box<Expr>, rhs: Box<Expr> },
    /// A binary operator application. Operator chains fold left with every
    /// operator at equal precedence, so `1 + 2 * 3` parses as
    /// `(1 + 2) * 3`. `partial` records a trailing `?` on the operator.
    Binop {
        op: String,
        left: Box<Expr>,
        right: Box<Expr>,
        partial: bool,
    },
    /// `is` / `isnt` identity comparison, folded in the same flat chain.
    Isop {
        op: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `expr as Type`.
    AsOp { expr: Box<Expr>, ty: Type },
    /// Prefix operator: `not`, `-`, `-~`, `addressof`, `digestof`.
    Unary { op: String, expr: Box<Expr> },
    Consume {
        capability: Option<String>,
        expr: Box<Expr>,
    },
    Recover {
        annotations: Vec<String>,
        capability: Option<String>,
        body: Seq,
    },
    If(Box<IfExpr>),
    Ifdef(Box<IfdefExpr>),
    Iftype(Box<IftypeExpr>),
    Match {
        annotations: Vec<String>,
        subject: Seq,
        cases: Vec<Case>,
        else_branch: Option<ElseBlock>,
    },
    While {
        annotations: Vec<String>,
        condition: Seq,
        body: Seq,
        else_branch: Option<ElseBlock>,
    },
    Repeat {
        annotations: Vec<String>,
        body: Seq,
        condition: Seq,
        else_branch: Option<ElseBlock>,
    },
    For {
        annotations: Vec<String>,
        pattern: IdPattern,
        iterator: Seq,
        body: Seq,
        else_branch: Option<ElseBlock>,
    },
    With {
        annotations: Vec<String>,
        elems: Vec<WithElem>,
        body: Seq,
        else_branch: Option<ElseBlock>,
    },
    Try {
        annotations: Vec<String>,
        body: Seq,
        else_branch: Option<ElseBlock>,
        then_branch: Option<Seq>,
    },
    /// A local binding, `var x: T` or `let x`.
    Local {
        kind: LocalKind,
        id: String,
        ty: Option<Type>,
    },

    // Postfix suffixes, folding left over their receiver
    Dot { expr: Box<Expr>, id: String },
    /// Partial application, `expr~method`.
    Tilde { expr: Box<Expr>, id: String },
    /// Method chaining, `expr.>method`.
    Chain { expr: Box<Expr>, id: String },
    /// Type-argument qualification, `expr[T1, T2]`.
    Qualify {
        expr: Box<Expr>,
        type_args: Vec<TypeArg>,
    },
    Call {
        callee: Box<Expr>,
        positional: Vec<Seq>,
        named: Vec<NamedArg>,
        partial: bool,
    },

    // Atoms
    Reference(String),
    This,
    True,
    False,
    /// Integer literal, raw text (covers decimal, hex, binary, and
    /// character-literal forms).
    Int(String),
    Float(String),
    /// String literal, raw text with quotes.
    Str(String),
    Tuple(Vec<Seq>),
    Array {
        ty: Option<Type>,
        elems: Option<Seq>,
    },
    Object {
        capability: Option<String>,
        provides: Option<Type>,
        fields: Vec<Field>,
        methods: Vec<Method>,
    },
    FfiCall {
        id: String,
        type_args: Vec<TypeArg>,
        positional: Vec<Seq>,
        named: Vec<NamedArg>,
        partial: bool,
    },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LocalKind {
    Var,
    Let,
}

impl LocalKind {
    pub fn spelling(self) -> &'static str {
        match self {
            LocalKind::Var => "var",
            LocalKind::Let => "let",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    This,
    /// A bare capability used as a type, e.g. in constraints.
    Cap(String),
    /// Right-associative viewpoint adaptation, `origin->target`.
    Arrow { origin: Box<Type>, target: Box<Type> },
    Union(Vec<Type>),
    Isect(Vec<Type>),
    Tuple(Vec<Type>),
    Nominal {
        package: Option<String>,
        id: String,
        type_args: Vec<TypeArg>,
        /// Concrete capability or generic capability set spelling.
        capability: Option<String>,
        /// `^` (ephemeral) or `!` (aliased).
        cap_modifier: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeArg {
    Type(Type),
    /// A literal value used as a type argument.
    Literal(Expr),
}
