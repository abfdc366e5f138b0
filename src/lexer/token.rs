use serde::{Deserialize, Serialize};

/// A single token from the source code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The type of token
    pub kind: TokenKind,
    /// Line number where the token starts (1-indexed)
    pub line: usize,
    /// Column number where the token starts (1-indexed)
    pub column: usize,
}

impl Token {
    /// Creates a new token at the given position
    pub fn new(kind: TokenKind, line: usize, column: usize) -> Self {
        Token { kind, line, column }
    }
}

/// All possible token types in Brook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenKind {
    // Literals
    /// Numeric literal (all Brook numbers are double-precision floats)
    Number(f64),
    /// String literal (quotes stripped, no escape processing)
    Str(String),

    /// Identifier that is not a reserved word
    Identifier(String),

    // Keywords
    /// `let` keyword
    Let,
    /// `if` keyword
    If,
    /// `else` keyword
    Else,
    /// `while` keyword
    While,
    /// `for` keyword
    For,
    /// `function` keyword
    Function,
    /// `return` keyword
    Return,
    /// `true` literal
    True,
    /// `false` literal
    False,
    /// `print` keyword
    Print,

    /// Operator token; the payload is the operator text (`+`, `==`, `&&`, ...)
    Operator(String),
    /// Delimiter token; one of `( ) { } [ ] , ; . :`
    Delimiter(char),

    /// End of file marker, always the final token
    Eof,
}

impl TokenKind {
    /// Maps a reserved word to its keyword token, or `None` for identifiers
    pub fn keyword(s: &str) -> Option<TokenKind> {
        match s {
            "let" => Some(TokenKind::Let),
            "if" => Some(TokenKind::If),
            "else" => Some(TokenKind::Else),
            "while" => Some(TokenKind::While),
            "for" => Some(TokenKind::For),
            "function" => Some(TokenKind::Function),
            "return" => Some(TokenKind::Return),
            "true" => Some(TokenKind::True),
            "false" => Some(TokenKind::False),
            "print" => Some(TokenKind::Print),
            _ => None,
        }
    }

    /// Check if token is a keyword
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Let
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Function
                | TokenKind::Return
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Print
        )
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "{}", n),
            TokenKind::Str(s) => write!(f, "\"{}\"", s),
            TokenKind::Identifier(name) => write!(f, "{}", name),
            TokenKind::Let => write!(f, "let"),
            TokenKind::If => write!(f, "if"),
            TokenKind::Else => write!(f, "else"),
            TokenKind::While => write!(f, "while"),
            TokenKind::For => write!(f, "for"),
            TokenKind::Function => write!(f, "function"),
            TokenKind::Return => write!(f, "return"),
            TokenKind::True => write!(f, "true"),
            TokenKind::False => write!(f, "false"),
            TokenKind::Print => write!(f, "print"),
            TokenKind::Operator(op) => write!(f, "{}", op),
            TokenKind::Delimiter(d) => write!(f, "{}", d),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}
