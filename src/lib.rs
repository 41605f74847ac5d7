//! A small Lisp with s-expressions, q-expressions and first class
//! functions, evaluated by walking the value tree.
//!
//! ```
//! use lispy::Interpreter;
//!
//! let lispy = Interpreter::new();
//! assert_eq!(lispy.evaluate_line("+ 1 (* 2 3)").unwrap().to_string(), "7");
//! assert_eq!(lispy.evaluate_line("head {1 2 3}").unwrap().to_string(), "{1}");
//! ```

pub mod builtins;
pub mod config;
pub mod env;
pub mod error;
pub mod eval;
pub mod grammar;
pub mod reader;
pub mod value;

pub use crate::{
    builtins::Builtin,
    config::{Config, Overflow},
    env::Env,
    error::{ErrorKind, LispError},
    value::{EvalResult, Value},
};

use crate::grammar::Tree;

/// One interpreter session: a root environment holding the builtins and
/// every `def` made so far. Dropping the session clears its root scope.
#[derive(Debug)]
pub struct Interpreter {
    env: Env,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Self {
        Self {
            env: Env::with_builtins(config.overflow),
        }
    }

    #[inline]
    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Reads the whole line as one s-expression and evaluates it.
    /// Syntax errors come back as `ErrorKind::Syntax`.
    pub fn evaluate_line(&self, line: &str) -> EvalResult {
        eval::eval(reader::read_str(line)?, &self.env)
    }

    /// Evaluates each top-level expression of `source` on its own, in order.
    pub fn run_source(&self, source: &str) -> Vec<EvalResult> {
        match grammar::parse(source) {
            Ok(root) => root
                .children()
                .iter()
                .filter(|child| child.tag() != "regex")
                .map(|child| eval::eval(reader::read(child), &self.env))
                .collect(),
            Err(err) => vec![Err(err.into())],
        }
    }
}

impl Drop for Interpreter {
    fn drop(&mut self) {
        self.env.clear();
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
