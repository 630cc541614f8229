//! QOR Parser Module
//!
//! Parses the token stream into an Abstract Syntax Tree (AST) by recursive
//! descent, one routine per precedence level.

mod ast;
mod descent;

pub use ast::{BinaryOp, ElifBranch, Expression, Program, Statement, UnaryOp};
pub use descent::Parser;

use crate::error::Result;
use crate::lexer::Token;

/// Parses a complete token sequence into a program
pub fn parse(tokens: Vec<Token>) -> Result<Program> {
    Parser::new(tokens).parse()
}
