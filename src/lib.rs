//! # Brook
//!
//! A small imperative scripting language: a tokenizer, a recursive-descent
//! parser, and a tree-walking evaluator with snapshot-scoped environments.
//!
//! The pipeline is three explicit stages. Each stage finishes before the
//! next begins, so tokens and the AST can be inspected (or serialized)
//! between stages.
//!
//! ## Quick start
//!
//! ```
//! use brook::execute;
//!
//! let mut output = Vec::new();
//! let source = r#"
//!     function square(n) { return n * n; }
//!     for (let i = 1; i < 4; i = i + 1) print(square(i));
//! "#;
//! execute(source, &mut output).unwrap();
//! assert_eq!(String::from_utf8(output).unwrap(), "1\n4\n9\n");
//! ```
//!
//! ## Stage by stage
//!
//! ```
//! use brook::{Scanner, Parser, Evaluator, Value};
//!
//! let tokens = Scanner::new("2 + 3 * 4;").scan_tokens().unwrap();
//! let program = Parser::new(tokens).parse().unwrap();
//!
//! let mut sink = Vec::new();
//! let result = Evaluator::new(&mut sink).execute(&program).unwrap();
//! assert_eq!(result, Value::Number(14.0));
//! ```
//!
//! ## Language notes
//!
//! Scopes are snapshots: blocks and function calls copy the visible
//! bindings on entry and discard their own writes on exit. Arrays and
//! records are reference values, so shared storage is the one channel
//! through which a callee can affect its caller:
//!
//! ```
//! use brook::execute;
//!
//! let mut output = Vec::new();
//! execute(
//!     "let a = [1]; function f(arr) { arr[0] = 2; } f(a); print(a[0]);",
//!     &mut output,
//! )
//! .unwrap();
//! assert_eq!(String::from_utf8(output).unwrap(), "2\n");
//! ```

pub mod error;
pub mod lexer;
pub mod parser;
pub mod runtime;

pub use error::{Error, Result};
pub use lexer::{Scanner, Token, TokenKind};
pub use parser::{Expr, Parser, Program, Stmt};
pub use runtime::{Environment, Evaluator, Value};

/// Version of the Brook interpreter
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Scans source text into a token sequence
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Scanner::new(source).scan_tokens()
}

/// Parses a token sequence into a program AST
pub fn parse(tokens: Vec<Token>) -> Result<Program> {
    Parser::new(tokens).parse()
}

/// Runs source text end to end, writing `print` output to `sink`
///
/// Returns the value of the program's final statement.
pub fn execute(source: &str, sink: &mut dyn std::io::Write) -> Result<Value> {
    let program = parse(tokenize(source)?)?;
    Evaluator::new(sink).execute(&program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_execute_end_to_end() {
        let mut out = Vec::new();
        let result = execute("let x = 40; print(x + 2);", &mut out).unwrap();
        assert_eq!(result, Value::Null);
        assert_eq!(String::from_utf8(out).unwrap(), "42\n");
    }

    #[test]
    fn test_execute_surfaces_each_stage_error() {
        let mut out = Vec::new();
        assert!(matches!(
            execute("let x = @;", &mut out),
            Err(Error::UnexpectedCharacter { .. })
        ));
        assert!(matches!(
            execute("let x = ;", &mut out),
            Err(Error::UnexpectedToken { .. })
        ));
        assert!(matches!(
            execute("x + 1;", &mut out),
            Err(Error::UndefinedVariable { .. })
        ));
    }
}
