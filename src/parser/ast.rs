use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Complete Brook program: an ordered list of top-level statements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Top-level statements in source order
    pub body: Vec<Stmt>,
}

/// Statements
///
/// Operators inside expressions are stored as their source text; the
/// evaluator matches on the text and treats anything it does not recognize
/// as an internal-corruption error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// Variable declaration: `let name = expr;`
    VariableDeclaration {
        /// Name being declared
        name: String,
        /// Initializer expression
        value: Expr,
    },

    /// If statement with optional else branch
    If {
        /// Condition expression
        test: Expr,
        /// Statement (or block) run when the test is truthy
        consequent: Box<Stmt>,
        /// Statement (or block) run otherwise
        alternate: Option<Box<Stmt>>,
    },

    /// While loop
    While {
        /// Loop condition, re-evaluated before each iteration
        test: Expr,
        /// Loop body
        body: Box<Stmt>,
    },

    /// C-style for loop: `for (let i = 0; test; update) body`
    ///
    /// The grammar requires the initializer to be a `let` declaration, so
    /// `init` always holds [`Stmt::VariableDeclaration`].
    For {
        /// Initializer, run exactly once
        init: Box<Stmt>,
        /// Condition, re-evaluated before each iteration
        test: Expr,
        /// Update expression, run after each iteration
        update: Expr,
        /// Loop body
        body: Box<Stmt>,
    },

    /// Braced statement list; introduces a scope snapshot at evaluation
    Block(Vec<Stmt>),

    /// `print(expr);`
    Print(Expr),

    /// Function declaration
    ///
    /// The body is shared via `Rc` so closure values can reference it
    /// without cloning the statement tree.
    FunctionDeclaration {
        /// Function name, bound in the declaring scope
        name: String,
        /// Ordered parameter names
        params: Vec<String>,
        /// Block body statements
        body: Rc<Vec<Stmt>>,
    },

    /// `return expr;`
    Return(Expr),

    /// Bare expression statement: `expr;`
    Expression(Expr),
}

/// Expressions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Variable reference
    Identifier(String),
    /// Numeric literal
    Number(f64),
    /// String literal
    Str(String),
    /// Boolean literal
    Bool(bool),

    /// Binary operation; `op` is the operator text (`+`, `==`, `&&`, ...)
    Binary {
        /// Operator text
        op: String,
        /// Left operand
        left: Box<Expr>,
        /// Right operand
        right: Box<Expr>,
    },

    /// Prefix unary operation; `op` is `-` or `!`
    Unary {
        /// Operator text
        op: String,
        /// Operand
        operand: Box<Expr>,
    },

    /// Assignment: `target = value` (right-associative)
    ///
    /// `target` is an identifier or a member expression; anything else is
    /// rejected at evaluation time.
    Assignment {
        /// Assignment target
        target: Box<Expr>,
        /// Value expression
        value: Box<Expr>,
    },

    /// Call: `callee(args...)`
    Call {
        /// Callee expression
        callee: Box<Expr>,
        /// Argument expressions in source order
        args: Vec<Expr>,
    },

    /// Member access: `object.name` or `object[expr]`
    Member {
        /// Object expression
        object: Box<Expr>,
        /// Property: an identifier for `.name`, any expression for `[expr]`
        property: Box<Expr>,
        /// True for `[expr]` (property is evaluated), false for `.name`
        computed: bool,
    },

    /// Array literal: `[a, b, c]`
    Array(Vec<Expr>),

    /// Object literal: `{key: expr, ...}`; keys are bare identifiers
    Object(Vec<(String, Expr)>),
}
