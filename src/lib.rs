//! # QOR - a small dynamically-typed scripting language
//!
//! A tree-walking interpreter for QOR: a lexer driven by an ordered table of
//! regular expressions, a recursive-descent parser with explicit precedence
//! levels, and an evaluator that executes the AST directly.
//!
//! ## Quick Start
//!
//! ```rust
//! use qor::{Evaluator, EvaluatorConfig, Parser, Scanner, Value};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let code = "\
//! total = 0
//! for i in range(1, 11):
//!     total = total + i
//! print(total)
//! ";
//!
//! // Tokenize (scan)
//! let tokens = Scanner::new(code).scan_tokens()?;
//!
//! // Parse into AST
//! let program = Parser::new(tokens).parse()?;
//!
//! // Execute
//! let mut evaluator = Evaluator::with_config(EvaluatorConfig {
//!     echo_output: false,
//!     ..EvaluatorConfig::default()
//! });
//! evaluator.execute(&program)?;
//!
//! assert_eq!(evaluator.env().get("total")?, Value::Int(55));
//! assert_eq!(evaluator.output(), &["55".to_string()]);
//! # Ok(())
//! # }
//! ```
//!
//! The [`run`] helper does all three steps on a fresh, non-echoing evaluator:
//!
//! ```rust
//! # fn main() -> qor::Result<()> {
//! let evaluator = qor::run("function add(a, b): return a + b\nprint(add(2, 3))")?;
//! assert_eq!(evaluator.output(), &["5".to_string()]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Language Overview
//!
//! - **Values**: `int`, `float`, `string`, `bool`, `list` `[1, 2]`,
//!   `dict` `{"a": 1}`, `range(start, stop, step)`, `nil`
//! - **Statements**: assignment, `xs[i] = v`, `print(expr)`,
//!   `function name(params): body`, `return`, `if`/`elif`/`else`,
//!   `for name in iterable:`, `while cond:`
//! - **Blocks**: one simple statement after the `:`, or an indented block on
//!   the following lines
//! - **Operators**, loosest first: `or`, `and`, `not`, comparisons,
//!   `+ -`, `* / %`, `**`, unary `-`
//!
//! ## Architecture
//!
//! ```text
//! Source Code → Scanner → Tokens → Parser → AST → Evaluator → output + Environment
//! ```
//!
//! - [`Scanner`] - Tokenizes source code, including indentation
//! - [`Parser`] - Parses tokens into a [`Program`]
//! - [`Evaluator`] - Executes the AST, records printed lines
//! - [`Environment`] - Globals plus call frames
//! - [`BuiltinRegistry`] - Host functions such as `len`, `sqrt`, `int`

/// Version of the QOR interpreter
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod builtins;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod runtime;

// Re-export main types
pub use builtins::{Arity, Builtin, BuiltinRegistry};
pub use error::{Error, ErrorCategory, Result};
pub use lexer::{tokenize, Scanner, Token, TokenKind};
pub use parser::{parse, BinaryOp, Expression, Parser, Program, Statement, UnaryOp};
pub use runtime::{Environment, Evaluator, EvaluatorConfig, Value};

/// Tokenizes, parses and executes `source` on a fresh evaluator that records
/// output without echoing it
pub fn run(source: &str) -> Result<Evaluator> {
    let mut evaluator = Evaluator::with_config(EvaluatorConfig {
        echo_output: false,
        ..EvaluatorConfig::default()
    });
    run_with(&mut evaluator, source)?;
    Ok(evaluator)
}

/// Tokenizes, parses and executes `source` on an existing evaluator, keeping
/// its variables and functions
pub fn run_with(evaluator: &mut Evaluator, source: &str) -> Result<()> {
    let program = parse(tokenize(source)?)?;
    evaluator.execute(&program)
}
