//! Lexical analysis for Brook
//!
//! Converts source text into a fully materialized sequence of tokens.

mod scanner;
mod token;

pub use scanner::Scanner;
pub use token::{Token, TokenKind};
