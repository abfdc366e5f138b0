//! Syntax analysis for Brook
//!
//! Consumes the scanner's token sequence and produces the program AST.

mod ast;
mod descent;

pub use ast::{Expr, Program, Stmt};
pub use descent::Parser;
