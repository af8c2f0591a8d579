//! GLSL front end: lexer, parser, syntax tree, and source printer.
//!
//! The usual flow is [`parse`] to get a [`ast::GlslTree`], transform
//! the tree, then [`ast::GlslTree::to_source_string`] to emit GLSL
//! again.

pub mod ast;
pub mod error;
pub mod lexer;
mod number;
pub mod parser;
pub mod printer;
pub mod reader;
pub mod token;

pub use error::{GlslError, LexError, SyntaxError};
pub use parser::{parse, parse_expression};
