//! Runtime execution for QOR programs by walking the AST

mod environment;
mod evaluator;
pub mod methods;
pub mod operators;
mod value;

pub use environment::Environment;
pub use evaluator::{Evaluator, EvaluatorConfig, Flow, Function};
pub use value::{format_float, Dict, Range, RangeIter, Value};
