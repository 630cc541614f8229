use serde::{Deserialize, Serialize};
use std::fmt;

/// Complete QOR program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Top-level statements in the program
    pub statements: Vec<Statement>,
}

/// Statements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// Variable assignment: `x = expr`
    Assignment {
        /// Name of the variable to assign to
        name: String,
        /// Expression value to assign
        value: Expression,
    },

    /// Element assignment: `x[index] = expr`
    IndexAssignment {
        /// Name of the list or dict variable
        name: String,
        /// Index or key expression
        index: Expression,
        /// Expression value to store
        value: Expression,
    },

    /// Print statement: `print(expr)`
    Print(Expression),

    /// Function definition: `function name(a, b): body`
    FunctionDef {
        /// Function name
        name: String,
        /// Parameter names in order
        params: Vec<String>,
        /// Function body
        body: Vec<Statement>,
    },

    /// Return statement
    Return {
        /// Optional value to return
        value: Option<Expression>,
    },

    /// If statement with optional elif chain and else branch
    If {
        /// Condition expression to evaluate
        condition: Expression,
        /// Statements to execute if condition is true
        then_branch: Vec<Statement>,
        /// `elif` branches, tried in order
        elif_branches: Vec<ElifBranch>,
        /// Optional statements to execute if no condition matched
        else_branch: Option<Vec<Statement>>,
    },

    /// For loop: `for item in iterable: body`
    For {
        /// Loop variable name
        variable: String,
        /// Expression to iterate over
        iterable: Expression,
        /// Statements to execute in loop body
        body: Vec<Statement>,
    },

    /// While loop
    While {
        /// Loop condition expression
        condition: Expression,
        /// Statements to execute in loop body
        body: Vec<Statement>,
    },

    /// Expression statement (function or method calls invoked for effect)
    Expression(Expression),
}

/// A single `elif condition: body` branch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElifBranch {
    /// Branch condition
    pub condition: Expression,
    /// Statements to execute if condition is true
    pub body: Vec<Statement>,
}

/// Expressions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    // Literals
    /// Integer literal expression
    IntLiteral(i64),
    /// Floating-point literal expression
    FloatLiteral(f64),
    /// String literal expression
    StringLiteral(String),
    /// Boolean literal expression
    BoolLiteral(bool),

    // Collections
    /// List literal expression
    ListLiteral(Vec<Expression>),
    /// Dict literal expression with key-value pairs
    DictLiteral(Vec<(Expression, Expression)>),
    /// Range expression `range(start, stop, step)`
    Range {
        /// Start expression (0 when omitted)
        start: Option<Box<Expression>>,
        /// Stop expression (exclusive)
        stop: Box<Expression>,
        /// Step expression (1 when omitted)
        step: Option<Box<Expression>>,
    },

    /// Variable reference expression
    Identifier(String),

    /// Binary operation expression
    Binary {
        /// Binary operator to apply
        op: BinaryOp,
        /// Left operand expression
        left: Box<Expression>,
        /// Right operand expression
        right: Box<Expression>,
    },

    /// Unary operation expression
    Unary {
        /// Unary operator to apply
        op: UnaryOp,
        /// Operand expression
        operand: Box<Expression>,
    },

    /// Builtin or user function call
    Call {
        /// Name of the function to call
        name: String,
        /// Positional arguments
        args: Vec<Expression>,
    },

    /// Index access expression (`target[index]`)
    Index {
        /// Collection being indexed
        target: Box<Expression>,
        /// Index expression
        index: Box<Expression>,
    },

    /// Native method call (`target.method(args)`)
    MethodCall {
        /// Receiver expression
        target: Box<Expression>,
        /// Method name
        method: String,
        /// Positional arguments
        args: Vec<Expression>,
    },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    // Arithmetic
    /// Addition operator (+)
    Add,
    /// Subtraction operator (-)
    Sub,
    /// Multiplication operator (*)
    Mul,
    /// Division operator (/)
    Div,
    /// Modulo operator (%)
    Mod,
    /// Power operator (**)
    Pow,

    // Comparison
    /// Equality operator (==)
    Eq,
    /// Inequality operator (!=)
    NotEq,
    /// Less than operator (<)
    Lt,
    /// Greater than operator (>)
    Gt,
    /// Less than or equal operator (<=)
    LtEq,
    /// Greater than or equal operator (>=)
    GtEq,

    // Logical
    /// Logical AND operator
    And,
    /// Logical OR operator
    Or,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Negation operator (-x)
    Neg,
    /// Logical NOT operator (not x)
    Not,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
            BinaryOp::Mod => write!(f, "%"),
            BinaryOp::Pow => write!(f, "**"),
            BinaryOp::Eq => write!(f, "=="),
            BinaryOp::NotEq => write!(f, "!="),
            BinaryOp::Lt => write!(f, "<"),
            BinaryOp::Gt => write!(f, ">"),
            BinaryOp::LtEq => write!(f, "<="),
            BinaryOp::GtEq => write!(f, ">="),
            BinaryOp::And => write!(f, "and"),
            BinaryOp::Or => write!(f, "or"),
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Not => write!(f, "not"),
        }
    }
}
