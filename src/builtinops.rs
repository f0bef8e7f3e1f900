//! Built-in operations registry.
//!
//! This module provides the fixed catalog of primitive operations, each paired with
//! an argument contract. Builtins receive their arguments already evaluated and take
//! ownership of the argument list: nothing is handed back to the caller except the
//! result.
//!
//! ```text
//! (list 1 2 3)          ; {1 2 3}
//! (head {1 2 3})        ; {1}
//! (tail {1 2 3})        ; {2 3}
//! (join {1 2} {3 4})    ; {1 2 3 4}
//! (eval {+ 1 2})        ; 3
//! (def {x y} 1 2)       ; ()
//! (- 5)                 ; -5
//! ```
//!
//! ## Functions vs environment forms
//!
//! - **Functions**: pure transformations over their arguments (`list`, `+`, `head`, ...)
//! - **Environment forms**: need the environment and current evaluation depth
//!   (`def` binds symbols, `eval` re-enters the evaluator)
//!
//! ## Error handling
//!
//! Contract violations are reported as [`EvalError`] and surface as error values.
//! Every builtin validates its whole argument list before doing any work, so a
//! failing call never leaves a partial result behind: `def` binds nothing when any
//! of its checks fail, and arithmetic rejects a non-number anywhere in the list
//! before folding. Arithmetic is checked: overflow is an error, not a wrap.
//!
//! ## Adding new operations
//!
//! 1. **Implement the function** with the [`BuiltinFn`] or [`EnvironmentFn`] signature
//! 2. **Add it to `BUILTIN_OPS`** with its name and arity
//! 3. **Add tests** covering the contract and its error cases

use std::fmt;

use crate::ast::{NumberType, Value, ValueKind};
use crate::environment::Environment;
use crate::evaluator::eval_with_depth_tracking;
use crate::EvalError;

/// Number of arguments a builtin accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly n arguments
    Exact(usize),
    /// At least n arguments
    AtLeast(usize),
    /// Any number of arguments, including none
    Any,
}

impl Arity {
    pub fn validate(self, function: &'static str, got: usize) -> Result<(), EvalError> {
        let ok = match self {
            Arity::Exact(n) => got == n,
            Arity::AtLeast(n) => got >= n,
            Arity::Any => true,
        };
        if ok {
            Ok(())
        } else {
            Err(EvalError::IncorrectArity {
                function,
                got,
                expected: self,
            })
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
            Arity::Any => write!(f, "any number"),
        }
    }
}

/// A builtin that only transforms its arguments
pub type BuiltinFn = fn(Vec<Value>) -> Result<Value, EvalError>;

/// A builtin that reads or writes the environment, given the current evaluation depth
pub type EnvironmentFn = fn(Vec<Value>, &mut Environment, usize) -> Result<Value, EvalError>;

/// Represents the implementation of a builtin
#[derive(Clone, Copy)]
pub enum OpKind {
    Function(BuiltinFn),
    WithEnvironment(EnvironmentFn),
}

impl fmt::Debug for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpKind::Function(_) => write!(f, "Function(<fn>)"),
            OpKind::WithEnvironment(_) => write!(f, "WithEnvironment(<fn>)"),
        }
    }
}

/// Definition of a built-in operation
#[derive(Debug)]
pub struct BuiltinOp {
    /// The symbol this operation is bound to in the global environment
    pub name: &'static str,
    pub op_kind: OpKind,
    pub arity: Arity,
}

impl PartialEq for BuiltinOp {
    fn eq(&self, other: &Self) -> bool {
        // names are unique within the registry
        self.name == other.name
    }
}

impl BuiltinOp {
    /// Validate arity, then run the operation. Consumes `args` on every path.
    pub(crate) fn call(
        &self,
        args: Vec<Value>,
        env: &mut Environment,
        depth: usize,
    ) -> Result<Value, EvalError> {
        self.arity.validate(self.name, args.len())?;
        match self.op_kind {
            OpKind::Function(func) => func(args),
            OpKind::WithEnvironment(func) => func(args, env, depth),
        }
    }
}

//
// Argument contract helpers
//

fn incorrect_type(function: &'static str, index: usize, got: &Value, expected: ValueKind) -> EvalError {
    EvalError::IncorrectType {
        function,
        index,
        got: got.kind(),
        expected,
    }
}

/// The sole argument of a one-argument builtin, which must be a Q-expression
fn sole_qexpr(function: &'static str, args: Vec<Value>) -> Result<Vec<Value>, EvalError> {
    match args.into_iter().next() {
        Some(Value::QExpr(cells)) => Ok(cells),
        Some(other) => Err(incorrect_type(function, 0, &other, ValueKind::QExpression)),
        None => Err(EvalError::IncorrectArity {
            function,
            got: 0,
            expected: Arity::Exact(1),
        }),
    }
}

fn non_empty_qexpr(function: &'static str, args: Vec<Value>) -> Result<Vec<Value>, EvalError> {
    let cells = sole_qexpr(function, args)?;
    if cells.is_empty() {
        return Err(EvalError::EmptyList { function, index: 0 });
    }
    Ok(cells)
}

/// Unwrap every argument as a number, failing on the first that is not one
fn numbers(function: &'static str, args: Vec<Value>) -> Result<Vec<NumberType>, EvalError> {
    args.into_iter()
        .enumerate()
        .map(|(index, arg)| match arg {
            Value::Number(n) => Ok(n),
            other => Err(incorrect_type(function, index, &other, ValueKind::Number)),
        })
        .collect()
}

/// Left fold over all-number arguments; the first failing step aborts the fold
fn fold_numbers(
    function: &'static str,
    args: Vec<Value>,
    step: impl Fn(NumberType, NumberType) -> Result<NumberType, EvalError>,
) -> Result<Value, EvalError> {
    let numbers = numbers(function, args)?;
    let Some((&first, rest)) = numbers.split_first() else {
        return Err(EvalError::IncorrectArity {
            function,
            got: 0,
            expected: Arity::AtLeast(1),
        });
    };
    rest.iter()
        .try_fold(first, |acc, &n| step(acc, n))
        .map(Value::Number)
}

//
// Builtin Function Implementations
//

fn builtin_list(args: Vec<Value>) -> Result<Value, EvalError> {
    Ok(Value::QExpr(args))
}

fn builtin_head(args: Vec<Value>) -> Result<Value, EvalError> {
    let mut cells = non_empty_qexpr("head", args)?;
    cells.truncate(1);
    Ok(Value::QExpr(cells))
}

fn builtin_tail(args: Vec<Value>) -> Result<Value, EvalError> {
    let mut list = Value::QExpr(non_empty_qexpr("tail", args)?);
    list.pop(0);
    Ok(list)
}

fn builtin_join(args: Vec<Value>) -> Result<Value, EvalError> {
    if let Some((index, other)) = args
        .iter()
        .enumerate()
        .find(|(_, arg)| !matches!(arg, Value::QExpr(_)))
    {
        return Err(incorrect_type("join", index, other, ValueKind::QExpression));
    }

    let mut args = args.into_iter();
    let first = args.next().unwrap_or_else(Value::qexpr);
    Ok(args.fold(first, Value::join))
}

fn builtin_eval(args: Vec<Value>, env: &mut Environment, depth: usize) -> Result<Value, EvalError> {
    let cells = sole_qexpr("eval", args)?;
    Ok(eval_with_depth_tracking(env, Value::SExpr(cells), depth + 1))
}

fn builtin_def(args: Vec<Value>, env: &mut Environment, _depth: usize) -> Result<Value, EvalError> {
    let mut args = args.into_iter();
    let symbols = match args.next() {
        Some(Value::QExpr(cells)) => cells,
        Some(other) => return Err(incorrect_type("def", 0, &other, ValueKind::QExpression)),
        None => {
            return Err(EvalError::IncorrectArity {
                function: "def",
                got: 0,
                expected: Arity::AtLeast(1),
            });
        }
    };

    let names = symbols
        .into_iter()
        .map(|symbol| match symbol {
            Value::Symbol(name) => Ok(name),
            other => Err(EvalError::NonSymbolDefinition(other.kind())),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let values: Vec<Value> = args.collect();
    if names.len() != values.len() {
        return Err(EvalError::DefinitionCountMismatch {
            symbols: names.len(),
            values: values.len(),
        });
    }

    // All checks passed: commit every binding.
    for (name, value) in names.into_iter().zip(values) {
        tracing::debug!(%name, %value, "def");
        env.define(name, value);
    }
    Ok(Value::sexpr())
}

fn builtin_add(args: Vec<Value>) -> Result<Value, EvalError> {
    fold_numbers("+", args, |a, b| {
        a.checked_add(b)
            .ok_or(EvalError::IntegerOverflow("addition"))
    })
}

fn builtin_sub(args: Vec<Value>) -> Result<Value, EvalError> {
    if let [Value::Number(n)] = args.as_slice() {
        return n
            .checked_neg()
            .map(Value::Number)
            .ok_or(EvalError::IntegerOverflow("negation"));
    }
    fold_numbers("-", args, |a, b| {
        a.checked_sub(b)
            .ok_or(EvalError::IntegerOverflow("subtraction"))
    })
}

fn builtin_mul(args: Vec<Value>) -> Result<Value, EvalError> {
    fold_numbers("*", args, |a, b| {
        a.checked_mul(b)
            .ok_or(EvalError::IntegerOverflow("multiplication"))
    })
}

fn builtin_div(args: Vec<Value>) -> Result<Value, EvalError> {
    fold_numbers("/", args, |a, b| {
        if b == 0 {
            return Err(EvalError::DivisionByZero);
        }
        a.checked_div(b)
            .ok_or(EvalError::IntegerOverflow("division"))
    })
}

fn builtin_mod(args: Vec<Value>) -> Result<Value, EvalError> {
    fold_numbers("%", args, |a, b| {
        if b == 0 {
            return Err(EvalError::DivisionByZero);
        }
        a.checked_rem(b)
            .ok_or(EvalError::IntegerOverflow("modulo"))
    })
}

/// Global registry of all built-in operations, in environment insertion order.
static BUILTIN_OPS: [BuiltinOp; 11] = [
    // Variable functions
    BuiltinOp {
        name: "def",
        op_kind: OpKind::WithEnvironment(builtin_def),
        arity: Arity::AtLeast(1),
    },
    // List functions
    BuiltinOp {
        name: "list",
        op_kind: OpKind::Function(builtin_list),
        arity: Arity::Any,
    },
    BuiltinOp {
        name: "head",
        op_kind: OpKind::Function(builtin_head),
        arity: Arity::Exact(1),
    },
    BuiltinOp {
        name: "tail",
        op_kind: OpKind::Function(builtin_tail),
        arity: Arity::Exact(1),
    },
    BuiltinOp {
        name: "eval",
        op_kind: OpKind::WithEnvironment(builtin_eval),
        arity: Arity::Exact(1),
    },
    BuiltinOp {
        name: "join",
        op_kind: OpKind::Function(builtin_join),
        arity: Arity::AtLeast(1),
    },
    // Arithmetic
    BuiltinOp {
        name: "+",
        op_kind: OpKind::Function(builtin_add),
        arity: Arity::AtLeast(1),
    },
    BuiltinOp {
        name: "-",
        op_kind: OpKind::Function(builtin_sub),
        arity: Arity::AtLeast(1),
    },
    BuiltinOp {
        name: "*",
        op_kind: OpKind::Function(builtin_mul),
        arity: Arity::AtLeast(1),
    },
    BuiltinOp {
        name: "/",
        op_kind: OpKind::Function(builtin_div),
        arity: Arity::AtLeast(1),
    },
    BuiltinOp {
        name: "%",
        op_kind: OpKind::Function(builtin_mod),
        arity: Arity::AtLeast(1),
    },
];

/// Get all builtin operations
pub fn get_builtin_ops() -> &'static [BuiltinOp] {
    &BUILTIN_OPS
}

/// Find a builtin operation by the symbol it is bound to
pub fn find_builtin_op(name: &str) -> Option<&'static BuiltinOp> {
    BUILTIN_OPS.iter().find(|op| op.name == name)
}
