//! Lispy - a small Q-expression Lisp interpreter
//!
//! This crate provides the runtime backend for a read-eval-print loop: a dynamically
//! typed value model, a flat global environment, a reader that turns a parsed syntax
//! tree into values, a recursive evaluator and a fixed catalog of builtins.
//!
//! ## Two kinds of lists
//!
//! ```text
//! (+ 1 2 3)             ; S-expression: evaluated, first element must be a function
//! {1 2 3}               ; Q-expression: quoted data, never evaluated on its own
//! (eval {+ 1 2})        ; turn data back into code
//! (def {x y} 1 2)       ; bind symbols named by a Q-expression
//! ```
//!
//! ## Errors are values
//!
//! Evaluation never fails at the Rust level. Unbound symbols, type and arity
//! mismatches, division by zero and friends all evaluate to [`ast::Value::Error`],
//! which flows through containers like any other value and collapses the enclosing
//! S-expression before any builtin runs. Only host-level failures (unparseable text,
//! line editor problems) surface as [`Error`].
//!
//! ## Modules
//!
//! - `ast`: the [`ast::Value`] type, list ownership operations and printing
//! - `environment`: symbol bindings
//! - `syntax`: the syntax tree produced by the parser and consumed by the reader
//! - `reader`: syntax tree to value conversion
//! - `evaluator`: recursive evaluation and builtin dispatch
//! - `builtinops`: the builtin registry and implementations
//! - `parser`: text to syntax tree (feature `parser`)
//! - `repl`: interactive loop (feature `repl`)

use std::fmt;

use crate::ast::{Value, ValueKind};
use crate::builtinops::Arity;

/// Maximum nesting of parenthesised or braced expressions accepted by the parser
pub const MAX_PARSE_DEPTH: usize = 64;

/// Maximum depth of nested evaluations before an error value is produced.
/// `eval` can re-enter the evaluator on data bound in the environment, so the
/// parse depth alone does not bound recursion.
pub const MAX_EVAL_DEPTH: usize = 256;

/// Categorizes the different kinds of parsing errors.
#[derive(Debug, PartialEq, Clone)]
pub enum ParseErrorKind {
    /// Invalid or unexpected syntax (bad tokens, malformed expressions)
    InvalidSyntax,
    /// Input ended before the expression was complete (unclosed delimiters)
    Incomplete,
    /// Expression nesting exceeded the maximum parse depth
    TooDeeplyNested,
}

/// A structured error providing detailed information about a parsing failure.
#[derive(Debug, PartialEq, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    /// Context snippet from the input showing where the error occurred (max 40 chars)
    pub context: Option<String>,
    /// The problematic character encountered, if any
    pub found: Option<char>,
}

impl ParseError {
    pub fn new(
        kind: ParseErrorKind,
        message: impl Into<String>,
        context: Option<String>,
        found: Option<char>,
    ) -> Self {
        ParseError {
            kind,
            message: message.into(),
            context,
            found,
        }
    }

    /// Create a ParseError with context extracted from input at a given byte offset
    pub fn with_context(
        kind: ParseErrorKind,
        message: impl Into<String>,
        input: &str,
        error_offset: usize,
    ) -> Self {
        const MAX_CONTEXT: usize = 40;

        let context_start = error_offset.saturating_sub(10);
        let before = input.get(context_start..error_offset).unwrap_or_default();
        let rest = input.get(error_offset..).unwrap_or_default();
        let found = rest.chars().next();

        let mut context = String::new();
        if context_start > 0 {
            context.push_str("[...]");
        }
        context.push_str(before);
        context.extend(rest.chars().take(MAX_CONTEXT));
        if rest.chars().count() > MAX_CONTEXT {
            context.push_str("[...]");
        }

        Self::new(kind, message, Some(context), found)
    }
}

/// Host-level errors: everything that stops a line from reaching the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    ParseError(ParseError),
    ReplError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ParseError(e) => {
                write!(f, "ParseError: {}", e.message)?;
                if let Some(found) = e.found {
                    write!(f, "\nFound: '{found}'")?;
                }
                if let Some(context) = &e.context {
                    write!(f, "\nContext: {context}")?;
                }
                Ok(())
            }
            Error::ReplError(msg) => write!(f, "ReplError: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

/// Reasons an evaluation produces an [`Value::Error`].
///
/// Builtins and the evaluator construct these with structured fields; the
/// `Display` impl owns the wording, so every message lives in one place.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    UnboundSymbol(String),
    InvalidNumber,
    UnrecognisedNode(String),
    IncorrectType {
        function: &'static str,
        index: usize,
        got: ValueKind,
        expected: ValueKind,
    },
    IncorrectArity {
        function: &'static str,
        got: usize,
        expected: Arity,
    },
    EmptyList {
        function: &'static str,
        index: usize,
    },
    NonSymbolDefinition(ValueKind),
    DefinitionCountMismatch {
        symbols: usize,
        values: usize,
    },
    DivisionByZero,
    IntegerOverflow(&'static str),
    NotAFunction(ValueKind),
    DepthLimitExceeded,
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EvalError::UnboundSymbol(name) => write!(f, "Unbound symbol '{name}'"),
            EvalError::InvalidNumber => write!(f, "Invalid number."),
            EvalError::UnrecognisedNode(tag) => write!(f, "Unrecognised syntax node '{tag}'"),
            EvalError::IncorrectType {
                function,
                index,
                got,
                expected,
            } => write!(
                f,
                "Function '{function}' passed incorrect type for argument {index}. Got {got}, Expected {expected}."
            ),
            EvalError::IncorrectArity {
                function,
                got,
                expected,
            } => write!(
                f,
                "Function '{function}' passed incorrect number of arguments. Got {got}, Expected {expected}."
            ),
            EvalError::EmptyList { function, index } => {
                write!(f, "Function '{function}' passed {{}} for argument {index}.")
            }
            EvalError::NonSymbolDefinition(got) => write!(
                f,
                "Function 'def' cannot define non-symbol. Got {got}, expected {}.",
                ValueKind::Symbol
            ),
            // Reworded from the classic "passed too many arguments for symbols",
            // which also fired when too few values were given.
            EvalError::DefinitionCountMismatch { symbols, values } => write!(
                f,
                "Function 'def' passed incorrect number of values for symbols. Got {values}, Expected {symbols}."
            ),
            EvalError::DivisionByZero => write!(f, "Division by Zero"),
            EvalError::IntegerOverflow(operation) => {
                write!(f, "Integer overflow in {operation}")
            }
            EvalError::NotAFunction(got) => write!(
                f,
                "S-Expression starts with incorrect type. Got {got}, expected {}.",
                ValueKind::Function
            ),
            EvalError::DepthLimitExceeded => write!(
                f,
                "Evaluation depth limit exceeded (max: {MAX_EVAL_DEPTH})"
            ),
        }
    }
}

impl From<EvalError> for Value {
    fn from(error: EvalError) -> Self {
        Value::Error(error.to_string())
    }
}

pub mod ast;
pub mod builtinops;
pub mod environment;
pub mod evaluator;
pub mod reader;
pub mod syntax;

#[cfg(feature = "parser")]
pub mod parser;

#[cfg(feature = "repl")]
pub mod repl;

/// Parse, read and evaluate one line of input against `env`.
///
/// The whole line is read as an implicit S-expression, so `+ 1 2` and
/// `(+ 1 2)` both evaluate to `3`. Evaluation errors come back as
/// `Ok(Value::Error(..))`; only unparseable text yields `Err`.
#[cfg(feature = "parser")]
pub fn run_line(env: &mut environment::Environment, input: &str) -> Result<Value, Error> {
    let tree = parser::parse(input)?;
    Ok(evaluator::eval(env, reader::read(&tree)))
}
