use std::collections::HashMap;

use crate::ast::Value;
use crate::builtinops::get_builtin_ops;
use crate::EvalError;

/// Environment for symbol bindings
///
/// A single flat scope. Entries keep their insertion order; redefining a name
/// replaces its value in place. The name index only speeds up lookup and is
/// not observable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Environment {
    bindings: Vec<(String, Value)>,
    index: HashMap<String, usize>,
}

impl Environment {
    pub fn new() -> Self {
        Environment::default()
    }

    /// Store `value` under `name`, overwriting any existing binding in place
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if let Some(&slot) = self.index.get(&name) {
            self.bindings[slot].1 = value;
            return;
        }
        self.index.insert(name.clone(), self.bindings.len());
        self.bindings.push((name, value));
    }

    /// Borrow the value bound to `name`
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.index.get(name).map(|&slot| &self.bindings[slot].1)
    }

    /// An independent copy of the value bound to `name`, or an unbound-symbol
    /// error value
    pub fn get(&self, name: &str) -> Value {
        match self.lookup(name) {
            Some(value) => value.clone(),
            None => EvalError::UnboundSymbol(name.to_owned()).into(),
        }
    }

    /// All bindings, oldest first
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.bindings
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Create a global environment with every builtin bound to its name
pub fn create_global_env() -> Environment {
    let mut env = Environment::new();
    for builtin_op in get_builtin_ops() {
        env.define(builtin_op.name, Value::Builtin(builtin_op));
    }
    env
}
