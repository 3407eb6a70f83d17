//! ponyfront_ast: Tokens and syntax tree for the Pony front end.
//!
//! Defines the token vocabulary (including the context-dependent kinds the
//! lexer retags after a line break), the owned AST node types, and the
//! canonical ordered-map projection used for structural comparison.

pub mod map;
pub mod node;
pub mod token;

pub use map::MapValue;
pub use token::{Token, TokenFlags, TokenKind};
