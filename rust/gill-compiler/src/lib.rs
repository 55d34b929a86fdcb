//! GILL Compiler
//!
//! Transforms GILL source text into an AST: source → tokens → `Node::Block`.

pub mod compiler;
pub mod diagnostics;

use compiler::ast::Node;
use compiler::lexer::{LexError, Lexer};
use compiler::parser::{ParseError, Parser};
use compiler::tokens::Token;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompileError {
    #[error("LexError: {0}")]
    Lex(#[from] LexError),
    #[error("ParseError: {0}")]
    Parse(#[from] ParseError),
}

/// Tokenize a source buffer.
pub fn tokenize(source: &str) -> Result<Vec<Token>, CompileError> {
    Ok(Lexer::new(source).tokenize()?)
}

/// Run the full front end: source text to a top-level block node.
pub fn compile_source(source: &str) -> Result<Node, CompileError> {
    let tokens = Lexer::new(source).tokenize()?;
    let program = Parser::new(tokens).parse_program()?;
    Ok(program)
}
