//! ponyfront_parser: Tokens to AST.
//!
//! A hand-written recursive-descent parser for the full grammar. Parsing is
//! fail-fast: the first token the grammar cannot accept produces a
//! `SyntaxError` carrying the admissible-terminal set of that point, which
//! is all the completion engine needs.
//!
//! Each start symbol has a source-level entry function here; all of them
//! demand that their production consumes the whole token stream.

pub mod parser;

pub use parser::Parser;

use ponyfront_ast::node::*;
use ponyfront_diagnostics::Error;
use ponyfront_lexer::tokenize;

/// Parse a whole source file.
pub fn parse_module(source: &str) -> Result<Module, Error> {
    Ok(Parser::from_tokens(tokenize(source)?).module()?)
}

/// Parse a single type definition.
pub fn parse_class_def(source: &str) -> Result<ClassDef, Error> {
    Ok(Parser::from_tokens(tokenize(source)?).class_def()?)
}

/// Parse a single method.
pub fn parse_method(source: &str) -> Result<Method, Error> {
    Ok(Parser::from_tokens(tokenize(source)?).method()?)
}

/// Parse a single expression.
pub fn parse_expression(source: &str) -> Result<Expr, Error> {
    Ok(Parser::from_tokens(tokenize(source)?).expression()?)
}

/// Parse an expression sequence.
pub fn parse_seq(source: &str) -> Result<Seq, Error> {
    Ok(Parser::from_tokens(tokenize(source)?).seq()?)
}

/// Parse a type.
pub fn parse_type(source: &str) -> Result<Type, Error> {
    Ok(Parser::from_tokens(tokenize(source)?).ty()?)
}

/// Parse a `use` directive.
pub fn parse_use(source: &str) -> Result<Use, Error> {
    Ok(Parser::from_tokens(tokenize(source)?).use_directive()?)
}

/// Parse an FFI signature declaration.
pub fn parse_ffi_decl(source: &str) -> Result<FfiDecl, Error> {
    Ok(Parser::from_tokens(tokenize(source)?).ffi_decl()?)
}

/// Parse a binding pattern.
pub fn parse_id_seq(source: &str) -> Result<IdPattern, Error> {
    Ok(Parser::from_tokens(tokenize(source)?).id_seq()?)
}
