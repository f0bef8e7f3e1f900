use crate::ast::Value;
use crate::environment::Environment;
use crate::{EvalError, MAX_EVAL_DEPTH};

/// Evaluate a value against `env`, consuming it (public API)
pub fn eval(env: &mut Environment, value: Value) -> Value {
    eval_with_depth_tracking(env, value, 0)
}

/// Evaluate a value with depth tracking to prevent stack overflow
pub(crate) fn eval_with_depth_tracking(env: &mut Environment, value: Value, depth: usize) -> Value {
    if depth >= MAX_EVAL_DEPTH {
        tracing::warn!(depth, "evaluation depth limit exceeded");
        return EvalError::DepthLimitExceeded.into();
    }
    match value {
        Value::Symbol(name) => {
            tracing::trace!(%name, "resolving symbol");
            env.get(&name)
        }
        Value::SExpr(cells) => eval_sexpr(env, cells, depth),
        // Numbers, errors, builtins and Q-expressions are self-evaluating
        other => other,
    }
}

/// Evaluate an S-expression.
///
/// Every child is evaluated left to right before any of them is inspected, so a
/// side effect in a later child (a `def`, say) still happens when an earlier child
/// evaluates to an error. After that the first error wins, `()` stays `()`, a
/// single child collapses to itself, and otherwise the first child must be a
/// builtin, which is applied to the rest.
fn eval_sexpr(env: &mut Environment, cells: Vec<Value>, depth: usize) -> Value {
    let mut cells: Vec<Value> = cells
        .into_iter()
        .map(|cell| eval_with_depth_tracking(env, cell, depth + 1))
        .collect();

    if let Some(index) = cells.iter().position(Value::is_error) {
        return cells.swap_remove(index);
    }

    if cells.len() <= 1 {
        return cells.pop().unwrap_or_else(Value::sexpr);
    }

    match cells.remove(0) {
        Value::Builtin(op) => {
            tracing::debug!(builtin = op.name, args = cells.len(), "applying builtin");
            op.call(cells, env, depth).unwrap_or_else(Value::from)
        }
        head => EvalError::NotAFunction(head.kind()).into(),
    }
}
