use std::rc::Rc;

use super::ast::{Expr, Program, Stmt};
use crate::error::{Error, Result};
use crate::lexer::{Token, TokenKind};

/// Recursive-descent parser for Brook
///
/// One statement-level dispatcher plus one production function per operator
/// precedence tier, lowest binding first:
///
/// assignment → `||` → `&&` → equality → relational → additive →
/// multiplicative → unary → postfix chains → atoms
///
/// Each tier parses the next-tighter tier and then loops while its own
/// operators are present, which yields left associativity everywhere except
/// assignment and prefix unary (both right-associative by recursion).
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    /// Creates a new parser over a scanned token sequence
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, current: 0 }
    }

    /// Parses the tokens into a program AST
    pub fn parse(&mut self) -> Result<Program> {
        let mut body = Vec::new();

        while !self.is_at_end() {
            body.push(self.parse_statement()?);
        }

        Ok(Program { body })
    }

    // ---- statements ----

    fn parse_statement(&mut self) -> Result<Stmt> {
        match &self.peek().kind {
            TokenKind::Let => self.parse_variable_declaration(),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::Function => self.parse_function_declaration(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::Print => self.parse_print_statement(),
            TokenKind::Delimiter('{') => self.parse_block_statement(),
            _ => {
                let expr = self.parse_expression()?;
                self.expect_delimiter(';')?;
                Ok(Stmt::Expression(expr))
            }
        }
    }

    fn parse_variable_declaration(&mut self) -> Result<Stmt> {
        self.expect_keyword(TokenKind::Let, "'let'")?;
        let name = self.expect_identifier()?;
        self.expect_operator("=")?;
        let value = self.parse_expression()?;
        self.expect_delimiter(';')?;
        Ok(Stmt::VariableDeclaration { name, value })
    }

    fn parse_print_statement(&mut self) -> Result<Stmt> {
        self.expect_keyword(TokenKind::Print, "'print'")?;
        self.expect_delimiter('(')?;
        let argument = self.parse_expression()?;
        self.expect_delimiter(')')?;
        self.expect_delimiter(';')?;
        Ok(Stmt::Print(argument))
    }

    fn parse_function_declaration(&mut self) -> Result<Stmt> {
        self.expect_keyword(TokenKind::Function, "'function'")?;
        let name = self.expect_identifier()?;
        self.expect_delimiter('(')?;

        let mut params = Vec::new();
        if !self.check_delimiter(')') {
            loop {
                params.push(self.expect_identifier()?);
                if self.check_delimiter(',') {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect_delimiter(')')?;

        let body = self.parse_block_body()?;
        Ok(Stmt::FunctionDeclaration {
            name,
            params,
            body: Rc::new(body),
        })
    }

    fn parse_return_statement(&mut self) -> Result<Stmt> {
        self.expect_keyword(TokenKind::Return, "'return'")?;
        let argument = self.parse_expression()?;
        self.expect_delimiter(';')?;
        Ok(Stmt::Return(argument))
    }

    fn parse_if_statement(&mut self) -> Result<Stmt> {
        self.expect_keyword(TokenKind::If, "'if'")?;
        self.expect_delimiter('(')?;
        let test = self.parse_expression()?;
        self.expect_delimiter(')')?;

        let consequent = Box::new(self.parse_statement()?);

        // Dangling else binds to the nearest unmatched if, by construction.
        let alternate = if matches!(self.peek().kind, TokenKind::Else) {
            self.advance();
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            test,
            consequent,
            alternate,
        })
    }

    fn parse_while_statement(&mut self) -> Result<Stmt> {
        self.expect_keyword(TokenKind::While, "'while'")?;
        self.expect_delimiter('(')?;
        let test = self.parse_expression()?;
        self.expect_delimiter(')')?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::While { test, body })
    }

    fn parse_for_statement(&mut self) -> Result<Stmt> {
        self.expect_keyword(TokenKind::For, "'for'")?;
        self.expect_delimiter('(')?;

        // The initializer must be a `let` declaration; bare expressions and
        // empty initializers are grammar errors.
        if !matches!(self.peek().kind, TokenKind::Let) {
            return Err(self.expected("'let' declaration as for-loop initializer"));
        }
        let init = Box::new(self.parse_variable_declaration()?); // consumes its ';'

        let test = self.parse_expression()?;
        self.expect_delimiter(';')?;
        let update = self.parse_expression()?;
        self.expect_delimiter(')')?;
        let body = Box::new(self.parse_statement()?);

        Ok(Stmt::For {
            init,
            test,
            update,
            body,
        })
    }

    fn parse_block_statement(&mut self) -> Result<Stmt> {
        Ok(Stmt::Block(self.parse_block_body()?))
    }

    fn parse_block_body(&mut self) -> Result<Vec<Stmt>> {
        self.expect_delimiter('{')?;
        let mut body = Vec::new();
        while !self.check_delimiter('}') {
            if self.is_at_end() {
                return Err(self.expected("'}'"));
            }
            body.push(self.parse_statement()?);
        }
        self.expect_delimiter('}')?;
        Ok(body)
    }

    // ---- expressions, lowest precedence first ----

    fn parse_expression(&mut self) -> Result<Expr> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expr> {
        let left = self.parse_logical_or()?;

        if self.check_operator("=") {
            self.advance();
            let value = self.parse_assignment()?; // right-associative
            return Ok(Expr::Assignment {
                target: Box::new(left),
                value: Box::new(value),
            });
        }

        Ok(left)
    }

    fn parse_logical_or(&mut self) -> Result<Expr> {
        let mut left = self.parse_logical_and()?;
        while self.check_operator("||") {
            let op = self.advance_operator();
            let right = self.parse_logical_and()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_logical_and(&mut self) -> Result<Expr> {
        let mut left = self.parse_equality()?;
        while self.check_operator("&&") {
            let op = self.advance_operator();
            let right = self.parse_equality()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr> {
        let mut left = self.parse_relational()?;
        while self.check_operator("==") || self.check_operator("!=") {
            let op = self.advance_operator();
            let right = self.parse_relational()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> Result<Expr> {
        let mut left = self.parse_additive()?;
        while ["<", ">", "<=", ">="].iter().any(|op| self.check_operator(op)) {
            let op = self.advance_operator();
            let right = self.parse_additive()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        let mut left = self.parse_multiplicative()?;
        while self.check_operator("+") || self.check_operator("-") {
            let op = self.advance_operator();
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;
        while self.check_operator("*") || self.check_operator("/") {
            let op = self.advance_operator();
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if self.check_operator("-") || self.check_operator("!") {
            let op = self.advance_operator();
            let operand = self.parse_unary()?; // prefix, right-associative
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }
        self.parse_postfix()
    }

    /// Postfix chains: calls, computed indexing, and dotted members are all
    /// left-associative and chainable in any order (`a.b[0](x).c`).
    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_atom()?;

        loop {
            match self.peek().kind {
                TokenKind::Delimiter('(') => expr = self.parse_call(expr)?,
                TokenKind::Delimiter('[') => {
                    self.advance();
                    let property = self.parse_expression()?;
                    self.expect_delimiter(']')?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property: Box::new(property),
                        computed: true,
                    };
                }
                TokenKind::Delimiter('.') => {
                    self.advance();
                    let name = self.expect_identifier()?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property: Box::new(Expr::Identifier(name)),
                        computed: false,
                    };
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_call(&mut self, callee: Expr) -> Result<Expr> {
        self.expect_delimiter('(')?;
        let mut args = Vec::new();
        if !self.check_delimiter(')') {
            loop {
                args.push(self.parse_expression()?);
                if self.check_delimiter(',') {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect_delimiter(')')?;
        Ok(Expr::Call {
            callee: Box::new(callee),
            args,
        })
    }

    fn parse_atom(&mut self) -> Result<Expr> {
        match self.peek().kind.clone() {
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expr::Number(n))
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Expr::Str(s))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Bool(true))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Bool(false))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Expr::Identifier(name))
            }
            TokenKind::Delimiter('(') => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_delimiter(')')?;
                Ok(expr)
            }
            TokenKind::Delimiter('[') => self.parse_array_literal(),
            TokenKind::Delimiter('{') => self.parse_object_literal(),
            _ => Err(self.expected("an expression")),
        }
    }

    fn parse_array_literal(&mut self) -> Result<Expr> {
        self.expect_delimiter('[')?;
        let mut elements = Vec::new();
        if !self.check_delimiter(']') {
            loop {
                elements.push(self.parse_expression()?);
                if self.check_delimiter(',') {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect_delimiter(']')?;
        Ok(Expr::Array(elements))
    }

    fn parse_object_literal(&mut self) -> Result<Expr> {
        self.expect_delimiter('{')?;
        let mut properties = Vec::new();
        if !self.check_delimiter('}') {
            loop {
                // Keys are bare identifiers only; no string or computed keys.
                let key = self.expect_identifier()?;
                self.expect_delimiter(':')?;
                let value = self.parse_expression()?;
                properties.push((key, value));
                if self.check_delimiter(',') {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect_delimiter('}')?;
        Ok(Expr::Object(properties))
    }

    // ---- token helpers ----

    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.current].clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    /// Consumes the current operator token and returns its text.
    ///
    /// Callers check the kind first, so the fallback only guards against
    /// misuse inside this module.
    fn advance_operator(&mut self) -> String {
        match self.advance().kind {
            TokenKind::Operator(op) => op,
            other => other.to_string(),
        }
    }

    fn check_delimiter(&self, d: char) -> bool {
        matches!(self.peek().kind, TokenKind::Delimiter(c) if c == d)
    }

    fn check_operator(&self, op: &str) -> bool {
        matches!(&self.peek().kind, TokenKind::Operator(o) if o == op)
    }

    fn expect_delimiter(&mut self, d: char) -> Result<Token> {
        if self.check_delimiter(d) {
            Ok(self.advance())
        } else {
            Err(self.expected(&format!("'{}'", d)))
        }
    }

    fn expect_operator(&mut self, op: &str) -> Result<Token> {
        if self.check_operator(op) {
            Ok(self.advance())
        } else {
            Err(self.expected(&format!("'{}'", op)))
        }
    }

    fn expect_keyword(&mut self, kind: TokenKind, name: &str) -> Result<Token> {
        if self.peek().kind == kind {
            Ok(self.advance())
        } else {
            Err(self.expected(name))
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        match self.peek().kind.clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.expected("an identifier")),
        }
    }

    fn expected(&self, expected: &str) -> Error {
        let token = self.peek();
        Error::UnexpectedToken {
            expected: expected.to_string(),
            got: token.kind.to_string(),
            line: token.line,
            column: token.column,
        }
    }
}

fn binary(op: String, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}
