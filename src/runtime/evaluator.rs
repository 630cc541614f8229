use std::collections::HashMap;
use std::sync::Arc;

use crate::builtins::BuiltinRegistry;
use crate::error::{Error, Result};
use crate::parser::{BinaryOp, Expression, Program, Statement, UnaryOp};
use crate::runtime::methods::call_method;
use crate::runtime::value::{Dict, Range};
use crate::runtime::{operators, Environment, Value};

/// Remaining stack below which evaluation moves to a fresh segment
const STACK_RED_ZONE: usize = 128 * 1024;
/// Size of each new stack segment
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Configuration for an [`Evaluator`]
#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    /// Write each printed line to stdout as well as recording it
    pub echo_output: bool,
    /// Maximum number of nested user function calls
    pub max_call_depth: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        EvaluatorConfig {
            echo_output: true,
            max_call_depth: 256,
        }
    }
}

/// How a statement finished
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Fell through to the next statement
    Normal,
    /// A `return` is unwinding to the nearest call
    Return(Value),
}

/// User-defined function
#[derive(Debug, Clone)]
pub struct Function {
    /// Function name
    pub name: String,
    /// Parameter names in order
    pub params: Vec<String>,
    /// Function body
    pub body: Arc<Vec<Statement>>,
    /// Globals visible to the body, copied at definition time
    pub captured: Arc<HashMap<String, Value>>,
}

/// Tree-walking evaluator for QOR programs
///
/// Executes statements directly from the AST:
/// - assignments bind in the innermost scope (call frame, else globals)
/// - `function` registers into a function table, separate from variables
/// - calls try builtins first, then user functions
/// - `return` unwinds through [`Flow::Return`]
///
/// Printed lines are recorded in order and stay available through
/// [`Evaluator::output`] after execution, as does the environment.
pub struct Evaluator {
    /// Variable environment
    env: Environment,
    /// User function table
    functions: HashMap<String, Function>,
    /// Builtin registry
    builtins: Arc<BuiltinRegistry>,
    /// Printed lines, in order
    output: Vec<String>,
    /// Evaluator configuration
    config: EvaluatorConfig,
}

impl Evaluator {
    /// Creates a new evaluator with default configuration
    pub fn new() -> Self {
        Self::with_config(EvaluatorConfig::default())
    }

    /// Creates a new evaluator with custom configuration
    pub fn with_config(config: EvaluatorConfig) -> Self {
        Evaluator {
            env: Environment::new(),
            functions: HashMap::new(),
            builtins: Arc::new(BuiltinRegistry::new()),
            output: Vec::new(),
            config,
        }
    }

    /// Executes a parsed program
    pub fn execute(&mut self, program: &Program) -> Result<()> {
        self.interpret(&program.statements)
    }

    /// Executes top-level statements in order, stopping at the first error
    pub fn interpret(&mut self, statements: &[Statement]) -> Result<()> {
        for statement in statements {
            self.execute_statement(statement)?;
        }
        Ok(())
    }

    /// Lines printed so far
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Takes the printed lines, leaving the record empty
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    /// The variable environment
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// The builtin registry
    pub fn builtins(&self) -> &BuiltinRegistry {
        &self.builtins
    }

    /// Names of the user-defined functions, sorted
    pub fn function_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    /// Drops all variables, functions and recorded output
    pub fn reset(&mut self) {
        self.env.clear();
        self.functions.clear();
        self.output.clear();
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn execute_block(&mut self, statements: &[Statement]) -> Result<Flow> {
        for statement in statements {
            if let Flow::Return(value) = self.execute_statement(statement)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    fn execute_statement(&mut self, stmt: &Statement) -> Result<Flow> {
        match stmt {
            Statement::Assignment { name, value } => {
                let val = self.evaluate(value)?;
                self.env.set(name, val);
                Ok(Flow::Normal)
            }

            Statement::IndexAssignment { name, index, value } => {
                let mut container = self.env.get(name)?;
                let key = self.evaluate(index)?;
                let val = self.evaluate(value)?;
                container.set_index(key, val)?;
                self.env.set(name, container);
                Ok(Flow::Normal)
            }

            Statement::Print(expr) => {
                let line = self.evaluate(expr)?.to_string();
                if self.config.echo_output {
                    println!("{}", line);
                }
                self.output.push(line);
                Ok(Flow::Normal)
            }

            Statement::FunctionDef { name, params, body } => {
                if self.builtins.has(name) {
                    return Err(Error::BuiltinRedefinition { name: name.clone() });
                }

                tracing::debug!(function = %name, params = params.len(), "defined function");
                let function = Function {
                    name: name.clone(),
                    params: params.clone(),
                    body: Arc::new(body.clone()),
                    captured: self.env.snapshot_globals(),
                };
                self.functions.insert(name.clone(), function);
                Ok(Flow::Normal)
            }

            Statement::Return { value } => {
                if !self.env.in_call() {
                    return Err(Error::ReturnOutsideFunction);
                }
                let val = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Ok(Flow::Return(val))
            }

            Statement::If {
                condition,
                then_branch,
                elif_branches,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    return self.execute_block(then_branch);
                }
                for branch in elif_branches {
                    if self.evaluate(&branch.condition)?.is_truthy() {
                        return self.execute_block(&branch.body);
                    }
                }
                match else_branch {
                    Some(body) => self.execute_block(body),
                    None => Ok(Flow::Normal),
                }
            }

            Statement::For {
                variable,
                iterable,
                body,
            } => {
                let items: Box<dyn Iterator<Item = Value>> = match self.evaluate(iterable)? {
                    Value::Range(range) => Box::new(range.iter().map(Value::Int)),
                    other => Box::new(other.iterate()?.into_iter()),
                };

                for item in items {
                    self.env.set(variable, item);
                    if let Flow::Return(value) = self.execute_block(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }

            Statement::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Flow::Return(value) = self.execute_block(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }

            Statement::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Evaluates a single expression against the current environment
    pub fn evaluate(&mut self, expr: &Expression) -> Result<Value> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.evaluate_inner(expr))
    }

    fn evaluate_inner(&mut self, expr: &Expression) -> Result<Value> {
        match expr {
            Expression::IntLiteral(n) => Ok(Value::Int(*n)),
            Expression::FloatLiteral(f) => Ok(Value::Float(*f)),
            Expression::StringLiteral(s) => Ok(Value::String(s.clone())),
            Expression::BoolLiteral(b) => Ok(Value::Bool(*b)),

            Expression::ListLiteral(elements) => {
                let items = elements
                    .iter()
                    .map(|element| self.evaluate(element))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::List(items))
            }

            Expression::DictLiteral(pairs) => {
                let mut dict = Dict::new();
                for (key, value) in pairs {
                    let key = self.evaluate(key)?;
                    let value = self.evaluate(value)?;
                    dict.insert(key, value)?;
                }
                Ok(Value::Dict(dict))
            }

            Expression::Range { start, stop, step } => {
                let start = match start {
                    Some(expr) => self.range_bound(expr)?,
                    None => 0,
                };
                let stop = self.range_bound(stop)?;
                let step = match step {
                    Some(expr) => self.range_bound(expr)?,
                    None => 1,
                };
                Ok(Value::Range(Range::new(start, stop, step)?))
            }

            Expression::Identifier(name) => self.env.get(name),

            Expression::Binary { op, left, right } => match op {
                BinaryOp::And => {
                    let left = self.evaluate(left)?;
                    if !left.is_truthy() {
                        return Ok(left);
                    }
                    self.evaluate(right)
                }
                BinaryOp::Or => {
                    let left = self.evaluate(left)?;
                    if left.is_truthy() {
                        return Ok(left);
                    }
                    self.evaluate(right)
                }
                _ => {
                    let left = self.evaluate(left)?;
                    let right = self.evaluate(right)?;
                    operators::apply_binary(*op, &left, &right)
                }
            },

            Expression::Unary { op, operand } => {
                let value = self.evaluate(operand)?;
                match op {
                    UnaryOp::Neg => operators::negate(&value),
                    UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                }
            }

            Expression::Call { name, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.evaluate(arg))
                    .collect::<Result<Vec<_>>>()?;
                self.call_function(name, args)
            }

            Expression::Index { target, index } => {
                let target = self.evaluate(target)?;
                let index = self.evaluate(index)?;
                target.get_index(&index)
            }

            Expression::MethodCall {
                target,
                method,
                args,
            } => {
                let mut receiver = self.evaluate(target)?;
                let args = args
                    .iter()
                    .map(|arg| self.evaluate(arg))
                    .collect::<Result<Vec<_>>>()?;

                let outcome = call_method(&mut receiver, method, &args)?;
                if outcome.mutated {
                    if let Expression::Identifier(name) = target.as_ref() {
                        self.env.set(name, receiver);
                    }
                }
                Ok(outcome.value)
            }
        }
    }

    fn range_bound(&mut self, expr: &Expression) -> Result<i64> {
        match self.evaluate(expr)? {
            Value::Int(n) => Ok(n),
            other => Err(Error::InvalidRange {
                reason: format!("arguments must be int, got {}", other.type_name()),
            }),
        }
    }

    /// Calls a builtin or user function with evaluated arguments
    ///
    /// The host stack grows on demand, so nesting is bounded only by
    /// [`EvaluatorConfig::max_call_depth`].
    pub fn call_function(&mut self, name: &str, args: Vec<Value>) -> Result<Value> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.call_function_inner(name, args)
        })
    }

    fn call_function_inner(&mut self, name: &str, args: Vec<Value>) -> Result<Value> {
        if self.builtins.has(name) {
            return self.builtins.call(name, &args);
        }

        let function = match self.functions.get(name) {
            Some(function) => function.clone(),
            None => {
                return Err(Error::UndefinedFunction {
                    name: name.to_string(),
                })
            }
        };

        if args.len() != function.params.len() {
            return Err(Error::ArgumentCountMismatch {
                name: name.to_string(),
                expected: function.params.len().to_string(),
                got: args.len(),
            });
        }

        if self.env.depth() >= self.config.max_call_depth {
            return Err(Error::RecursionLimit {
                limit: self.config.max_call_depth,
            });
        }

        let locals: HashMap<String, Value> = function.params.iter().cloned().zip(args).collect();

        tracing::trace!(function = %name, depth = self.env.depth() + 1, "call");
        self.env.push_frame(locals, function.captured.clone());
        let result = self.execute_block(&function.body);
        self.env.pop_frame();

        let value = match result? {
            Flow::Return(value) => value,
            Flow::Normal => Value::Nil,
        };
        tracing::trace!(function = %name, returned = %value, "return");
        Ok(value)
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}
