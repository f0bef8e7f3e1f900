//! This module defines the runtime value type of the interpreter. The main enum,
//! [`Value`], is a tagged union of numbers, error values, symbols, builtin functions
//! and the two list kinds: S-expressions (code, evaluated on encounter) and
//! Q-expressions (quoted data, never evaluated on their own). Lists exclusively own
//! their children, so moving a `Value` moves the whole tree and `Clone` is a deep
//! copy. The list operations mirror the ownership discipline of the evaluator:
//! [`Value::add`] appends, [`Value::pop`] detaches, [`Value::take`] detaches and
//! drops the container, [`Value::join`] splices one list into another.

use std::fmt;

use crate::builtinops::BuiltinOp;

/// Type alias for number values in interpreter
pub type NumberType = i64;

/// The discriminant of a [`Value`], used when reporting type mismatches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Number,
    Error,
    Symbol,
    Function,
    SExpression,
    QExpression,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Number => "Number",
            ValueKind::Error => "Error",
            ValueKind::Symbol => "Symbol",
            ValueKind::Function => "Function",
            ValueKind::SExpression => "S-Expression",
            ValueKind::QExpression => "Q-Expression",
        };
        f.write_str(name)
    }
}

/// Core value type in interpreter
///
/// To build values in tests, use the helper functions:
/// - `val(42)` for numbers, `sym("name")` for symbols
/// - `val([1, 2, 3])` for homogeneous Q-expressions
/// - `sexpr(vec![sym("+"), val(1), val(2)])` for code
#[derive(Clone, PartialEq)]
pub enum Value {
    /// Signed 64-bit integers
    Number(NumberType),
    /// A formatted diagnostic; propagates through evaluation instead of unwinding
    Error(String),
    /// Identifiers, resolved against the environment when evaluated
    Symbol(String),
    /// One of the fixed builtin operations
    Builtin(&'static BuiltinOp),
    /// Expressions awaiting evaluation
    SExpr(Vec<Value>),
    /// Literal lists, never auto-evaluated
    QExpr(Vec<Value>),
}

impl Value {
    pub fn error(message: impl Into<String>) -> Self {
        Value::Error(message.into())
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Value::Symbol(name.into())
    }

    /// An empty S-expression `()`
    pub fn sexpr() -> Self {
        Value::SExpr(Vec::new())
    }

    /// An empty Q-expression `{}`
    pub fn qexpr() -> Self {
        Value::QExpr(Vec::new())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Number,
            Value::Error(_) => ValueKind::Error,
            Value::Symbol(_) => ValueKind::Symbol,
            Value::Builtin(_) => ValueKind::Function,
            Value::SExpr(_) => ValueKind::SExpression,
            Value::QExpr(_) => ValueKind::QExpression,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Children of a list value; `None` for atoms
    pub fn cells(&self) -> Option<&[Value]> {
        match self {
            Value::SExpr(cells) | Value::QExpr(cells) => Some(cells),
            _ => None,
        }
    }

    pub(crate) fn cells_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::SExpr(cells) | Value::QExpr(cells) => Some(cells),
            _ => None,
        }
    }

    /// Number of children of a list value (0 for atoms)
    pub fn len(&self) -> usize {
        self.cells().map_or(0, <[Value]>::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append `child` to a list value, taking ownership of it.
    /// Atoms are returned unchanged and `child` is dropped.
    #[must_use]
    pub fn add(mut self, child: Value) -> Value {
        if let Some(cells) = self.cells_mut() {
            cells.push(child);
        }
        self
    }

    /// Detach the child at `index`, shifting the remaining children left.
    pub fn pop(&mut self, index: usize) -> Option<Value> {
        let cells = self.cells_mut()?;
        (index < cells.len()).then(|| cells.remove(index))
    }

    /// Detach the child at `index` and drop what is left of the container.
    pub fn take(mut self, index: usize) -> Option<Value> {
        self.pop(index)
    }

    /// Move every child of `other` onto the end of `self`.
    /// An atom in `other` position is appended as a single child.
    #[must_use]
    pub fn join(mut self, other: Value) -> Value {
        if let Some(cells) = self.cells_mut() {
            match other {
                Value::SExpr(more) | Value::QExpr(more) => cells.extend(more),
                atom => cells.push(atom),
            }
        }
        self
    }

    /// Relabel a list as a Q-expression; atoms are returned unchanged
    #[must_use]
    pub fn into_qexpr(self) -> Value {
        match self {
            Value::SExpr(cells) => Value::QExpr(cells),
            other => other,
        }
    }

    /// Relabel a list as an S-expression; atoms are returned unchanged
    #[must_use]
    pub fn into_sexpr(self) -> Value {
        match self {
            Value::QExpr(cells) => Value::SExpr(cells),
            other => other,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "Number({n})"),
            Value::Error(msg) => write!(f, "Error({msg:?})"),
            Value::Symbol(s) => write!(f, "Symbol({s})"),
            Value::Builtin(op) => write!(f, "Builtin({})", op.name),
            Value::SExpr(cells) => debug_cells(f, "SExpr", cells),
            Value::QExpr(cells) => debug_cells(f, "QExpr", cells),
        }
    }
}

fn debug_cells(f: &mut fmt::Formatter<'_>, label: &str, cells: &[Value]) -> fmt::Result {
    write!(f, "{label}(")?;
    for (i, v) in cells.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{v:?}")?;
    }
    write!(f, ")")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Error(msg) => write!(f, "Error: {msg}"),
            Value::Symbol(s) => write!(f, "{s}"),
            Value::Builtin(_) => write!(f, "<function>"),
            Value::SExpr(cells) => display_cells(f, '(', ')', cells),
            Value::QExpr(cells) => display_cells(f, '{', '}', cells),
        }
    }
}

fn display_cells(f: &mut fmt::Formatter<'_>, open: char, close: char, cells: &[Value]) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, elem) in cells.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{elem}")?;
    }
    write!(f, "{close}")
}

macro_rules! impl_from_integer {
    ($int_type:ty) => {
        impl From<$int_type> for Value {
            fn from(n: $int_type) -> Self {
                Value::Number(NumberType::from(n))
            }
        }
    };
}

impl_from_integer!(i8);
impl_from_integer!(i16);
impl_from_integer!(i32);
impl_from_integer!(NumberType);
impl_from_integer!(u8);
impl_from_integer!(u16);
impl_from_integer!(u32);

// Rust collections become Q-expressions: data, not code.
impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::QExpr(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(arr: [T; N]) -> Self {
        Value::QExpr(arr.into_iter().map(Into::into).collect())
    }
}

/// Helper function for creating symbols
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn sym<S: AsRef<str>>(name: S) -> Value {
    Value::Symbol(name.as_ref().to_owned())
}

/// Helper function for creating values from Rust literals
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn val<T: Into<Value>>(value: T) -> Value {
    value.into()
}

/// Helper function for creating S-expressions from mixed children
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn sexpr(cells: Vec<Value>) -> Value {
    Value::SExpr(cells)
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;
    use crate::builtinops::find_builtin_op;

    #[test]
    fn test_helper_functions_data_driven() {
        let test_cases = vec![
            (val(42), Value::Number(42)),
            (val(-17), Value::Number(-17)),
            (val(255u8), Value::Number(255)),
            (val(-32768i16), Value::Number(-32768)),
            (val(NumberType::MAX), Value::Number(NumberType::MAX)),
            (sym("head"), Value::Symbol("head".to_owned())),
            (sym(String::from("x")), Value::Symbol("x".to_owned())),
            (val(Vec::<Value>::new()), Value::qexpr()),
            (
                val([1, 2, 3]),
                Value::QExpr(vec![Value::Number(1), Value::Number(2), Value::Number(3)]),
            ),
            (
                sexpr(vec![sym("+"), val(1)]),
                Value::SExpr(vec![Value::Symbol("+".to_owned()), Value::Number(1)]),
            ),
        ];

        for (i, (actual, expected)) in test_cases.iter().enumerate() {
            assert_eq!(actual, expected, "Test case {} failed", i + 1);
        }
    }

    #[test]
    fn test_display() {
        let plus = Value::Builtin(find_builtin_op("+").unwrap());
        let test_cases = vec![
            (val(42), "42"),
            (val(-5), "-5"),
            (Value::error("Division by Zero"), "Error: Division by Zero"),
            (sym("foo"), "foo"),
            (plus.clone(), "<function>"),
            (Value::sexpr(), "()"),
            (Value::qexpr(), "{}"),
            (val([1, 2, 3]), "{1 2 3}"),
            (sexpr(vec![plus, val(1), val([2])]), "(<function> 1 {2})"),
            (
                sexpr(vec![sym("eval"), val(vec![sym("head"), val([1, 2])])]),
                "(eval {head {1 2}})",
            ),
        ];

        for (value, expected) in test_cases {
            assert_eq!(format!("{value}"), expected);
        }
    }

    #[test]
    fn test_kind_names() {
        let plus = Value::Builtin(find_builtin_op("+").unwrap());
        let test_cases = vec![
            (val(1), "Number"),
            (Value::error("x"), "Error"),
            (sym("x"), "Symbol"),
            (plus, "Function"),
            (Value::sexpr(), "S-Expression"),
            (Value::qexpr(), "Q-Expression"),
        ];

        for (value, expected) in test_cases {
            assert_eq!(value.kind().to_string(), expected);
        }
    }

    #[test]
    fn test_list_ownership_operations() {
        let list = Value::qexpr().add(val(1)).add(val(2)).add(val(3));
        assert_eq!(list, val([1, 2, 3]));
        assert_eq!(list.len(), 3);

        let mut list = list;
        assert_eq!(list.pop(0), Some(val(1)));
        assert_eq!(list, val([2, 3]));
        assert_eq!(list.pop(5), None);

        assert_eq!(list.clone().take(1), Some(val(3)));
        assert_eq!(Value::qexpr().take(0), None);

        let joined = val([1, 2]).join(val([3, 4]));
        assert_eq!(joined, val([1, 2, 3, 4]));

        // atoms ignore list operations
        assert_eq!(val(7).add(val(1)), val(7));
        assert_eq!(val(7).pop(0), None);
        assert!(val(7).is_empty());
    }

    #[test]
    fn test_relabel_and_deep_copy() {
        let code = sexpr(vec![sym("+"), val(1), val([2, 3])]);
        let data = code.clone().into_qexpr();
        assert_eq!(data.kind(), ValueKind::QExpression);
        assert_eq!(data.cells(), code.cells());

        // the copy is independent of the original
        let mut copy = data.clone();
        copy.pop(0).unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(copy.len(), 2);

        assert_eq!(data.into_sexpr(), code);
        assert_eq!(val(1).into_qexpr(), val(1));
    }
}
