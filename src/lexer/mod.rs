//! Lexical analysis for QOR
//!
//! Converts source text into a stream of tokens using an ordered table of
//! regular-expression rules.

mod scanner;
mod token;

pub use scanner::Scanner;
pub use token::{Token, TokenKind};

use crate::error::Result;

/// Tokenizes a complete source string
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Scanner::new(source).scan_tokens()
}
