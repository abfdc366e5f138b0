use lazy_static::lazy_static;

use super::token::{Token, TokenKind};
use crate::error::{Error, Result};

lazy_static! {
    /// Known operators, sorted descending by length so that multi-character
    /// operators win over their prefixes (`==` before `=`, `<=` before `<`).
    static ref OPERATORS: Vec<&'static str> = {
        let mut ops = vec![
            "+", "-", "*", "/", "=", "==", "!=", "<", ">", "<=", ">=", "&&", "||", "!",
        ];
        ops.sort_by(|a, b| b.len().cmp(&a.len()));
        ops
    };
}

const DELIMITERS: &[char] = &['(', ')', '{', '}', '[', ']', ',', ';', '.', ':'];

/// Scanner for Brook source text
///
/// A single left-to-right pass over the source with a cursor; the full token
/// sequence is materialized before parsing begins.
pub struct Scanner {
    /// Source code as character vector
    source: Vec<char>,
    /// Accumulated tokens
    tokens: Vec<Token>,
    /// Current position in source
    current: usize,
    /// Current line number (1-indexed)
    line: usize,
    /// Current column number (1-indexed)
    column: usize,
}

impl Scanner {
    /// Creates a new scanner from source code
    pub fn new(source: &str) -> Self {
        Scanner {
            source: source.chars().collect(),
            tokens: Vec::new(),
            current: 0,
            line: 1,
            column: 1,
        }
    }

    /// Scans all tokens from source code and returns them as a vector
    ///
    /// The sequence always ends with an [`TokenKind::Eof`] token.
    pub fn scan_tokens(mut self) -> Result<Vec<Token>> {
        while !self.is_at_end() {
            self.scan_token()?;
        }

        self.tokens
            .push(Token::new(TokenKind::Eof, self.line, self.column));

        Ok(self.tokens)
    }

    fn scan_token(&mut self) -> Result<()> {
        let c = self.peek();

        // Whitespace
        if c.is_whitespace() {
            self.advance();
            return Ok(());
        }

        // Line comments
        if c == '/' && self.peek_next() == '/' {
            self.skip_line_comment();
            return Ok(());
        }

        // Numbers
        if c.is_ascii_digit() {
            self.scan_number();
            return Ok(());
        }

        // Strings (single or double quoted)
        if c == '\'' || c == '"' {
            return self.scan_string();
        }

        // Identifiers and keywords
        if c.is_ascii_alphabetic() || c == '_' {
            self.scan_identifier_or_keyword();
            return Ok(());
        }

        // Operators, longest match first
        if self.scan_operator() {
            return Ok(());
        }

        // Delimiters
        if DELIMITERS.contains(&c) {
            let (line, column) = (self.line, self.column);
            self.advance();
            self.tokens
                .push(Token::new(TokenKind::Delimiter(c), line, column));
            return Ok(());
        }

        Err(Error::UnexpectedCharacter {
            ch: c,
            line: self.line,
            column: self.column,
        })
    }

    fn skip_line_comment(&mut self) {
        while !self.is_at_end() && self.peek() != '\n' {
            self.advance();
        }
    }

    /// Reads a greedy run of digits and dots and converts it to a float.
    ///
    /// Runs with more than one dot are accepted, not rejected: the value is
    /// the longest parseable prefix (`1.2.3` yields 1.2), with NaN as the
    /// last resort.
    fn scan_number(&mut self) {
        let (line, column) = (self.line, self.column);
        let mut text = String::new();

        while !self.is_at_end() && (self.peek().is_ascii_digit() || self.peek() == '.') {
            text.push(self.advance());
        }

        let value = parse_number(&text);
        self.tokens
            .push(Token::new(TokenKind::Number(value), line, column));
    }

    /// Reads a quoted run verbatim until the matching quote.
    ///
    /// No escape sequences: every character between the quotes, including
    /// backslashes and newlines, lands in the literal as-is.
    fn scan_string(&mut self) -> Result<()> {
        let (line, column) = (self.line, self.column);
        let quote = self.advance();
        let mut value = String::new();

        while !self.is_at_end() && self.peek() != quote {
            value.push(self.advance());
        }

        if self.is_at_end() {
            return Err(Error::UnterminatedString { line, column });
        }
        self.advance(); // closing quote

        self.tokens
            .push(Token::new(TokenKind::Str(value), line, column));
        Ok(())
    }

    fn scan_identifier_or_keyword(&mut self) {
        let (line, column) = (self.line, self.column);
        let mut text = String::new();

        while !self.is_at_end()
            && (self.peek().is_ascii_alphanumeric() || self.peek() == '_')
        {
            text.push(self.advance());
        }

        let kind = TokenKind::keyword(&text).unwrap_or(TokenKind::Identifier(text));
        self.tokens.push(Token::new(kind, line, column));
    }

    /// Tries every known operator at the cursor, longest first.
    fn scan_operator(&mut self) -> bool {
        for op in OPERATORS.iter() {
            if self.lookahead_matches(op) {
                let (line, column) = (self.line, self.column);
                for _ in 0..op.len() {
                    self.advance();
                }
                self.tokens.push(Token::new(
                    TokenKind::Operator(op.to_string()),
                    line,
                    column,
                ));
                return true;
            }
        }
        false
    }

    fn lookahead_matches(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, c)| self.source.get(self.current + i) == Some(&c))
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.source[self.current]
        }
    }

    fn peek_next(&self) -> char {
        if self.current + 1 >= self.source.len() {
            '\0'
        } else {
            self.source[self.current + 1]
        }
    }
}

/// Longest-parseable-prefix float conversion for digit-and-dot runs.
fn parse_number(text: &str) -> f64 {
    if let Ok(value) = text.parse::<f64>() {
        return value;
    }

    // Keep digits and at most one dot; a second dot ends the prefix.
    let mut prefix = String::new();
    let mut seen_dot = false;
    for c in text.chars() {
        if c == '.' {
            if seen_dot {
                break;
            }
            seen_dot = true;
        }
        prefix.push(c);
    }
    prefix.parse::<f64>().unwrap_or(f64::NAN)
}
