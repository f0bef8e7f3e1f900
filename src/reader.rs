use crate::ast::{NumberType, Value};
use crate::syntax::{SyntaxNode, ROOT_TAG};
use crate::EvalError;

/// Convert a syntax tree into a value tree.
///
/// Numbers and symbols become atoms, the root and `sexpr` nodes become
/// S-expressions, `qexpr` nodes become Q-expressions. Delimiters and anchors
/// are skipped. A number literal outside the `i64` range reads as an
/// `Invalid number.` error value rather than wrapping.
pub fn read(node: &SyntaxNode) -> Value {
    let tag = node.tag.as_str();

    if tag.contains("number") {
        return read_number(&node.contents);
    }
    if tag.contains("symbol") {
        return Value::symbol(node.contents.as_str());
    }

    let list = if tag == ROOT_TAG || tag.contains("sexpr") {
        Value::sexpr()
    } else if tag.contains("qexpr") {
        Value::qexpr()
    } else {
        return EvalError::UnrecognisedNode(node.tag.clone()).into();
    };

    node.children
        .iter()
        .filter(|child| !child.is_punctuation())
        .fold(list, |list, child| list.add(read(child)))
}

fn read_number(literal: &str) -> Value {
    literal
        .parse::<NumberType>()
        .map_or_else(|_| EvalError::InvalidNumber.into(), Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{sexpr, sym, val};

    fn number(text: &str) -> SyntaxNode {
        SyntaxNode::leaf("expr|number|regex", text)
    }

    fn symbol(text: &str) -> SyntaxNode {
        SyntaxNode::leaf("expr|symbol|regex", text)
    }

    fn list(tag: &str, open: char, close: char, items: Vec<SyntaxNode>) -> SyntaxNode {
        let mut children = vec![SyntaxNode::delimiter(open)];
        children.extend(items);
        children.push(SyntaxNode::delimiter(close));
        SyntaxNode::branch(tag, children)
    }

    fn root(items: Vec<SyntaxNode>) -> SyntaxNode {
        let mut children = vec![SyntaxNode::anchor()];
        children.extend(items);
        children.push(SyntaxNode::anchor());
        SyntaxNode::branch(ROOT_TAG, children)
    }

    #[test]
    fn test_read_atoms() {
        let test_cases = vec![
            (number("42"), val(42)),
            (number("-7"), val(-7)),
            (number("007"), val(7)),
            (number("9223372036854775807"), val(NumberType::MAX)),
            (number("-9223372036854775808"), val(NumberType::MIN)),
            (number("9223372036854775808"), Value::error("Invalid number.")),
            (number("-99999999999999999999"), Value::error("Invalid number.")),
            (symbol("head"), sym("head")),
            (symbol("+"), sym("+")),
            // a bare tag without the rule path is classified the same way
            (SyntaxNode::leaf("number", "5"), val(5)),
        ];

        for (i, (node, expected)) in test_cases.iter().enumerate() {
            assert_eq!(read(node), *expected, "Read test #{} failed", i + 1);
        }
    }

    #[test]
    fn test_read_lists_skip_punctuation() {
        // + 1 {2 (x)}
        let tree = root(vec![
            symbol("+"),
            number("1"),
            list(
                "expr|qexpr|>",
                '{',
                '}',
                vec![number("2"), list("expr|sexpr|>", '(', ')', vec![symbol("x")])],
            ),
        ]);

        assert_eq!(
            read(&tree),
            sexpr(vec![
                sym("+"),
                val(1),
                val(vec![val(2), sexpr(vec![sym("x")])]),
            ])
        );
    }

    #[test]
    fn test_read_empty_lists() {
        assert_eq!(read(&root(vec![])), Value::sexpr());
        assert_eq!(
            read(&root(vec![list("expr|qexpr|>", '{', '}', vec![])])),
            sexpr(vec![Value::qexpr()])
        );
        assert_eq!(
            read(&list("sexpr", '(', ')', vec![])),
            Value::sexpr()
        );
    }

    #[test]
    fn test_read_keeps_invalid_number_in_place() {
        let tree = root(vec![symbol("+"), number("99999999999999999999"), number("1")]);
        assert_eq!(
            read(&tree),
            sexpr(vec![sym("+"), Value::error("Invalid number."), val(1)])
        );
    }

    #[test]
    fn test_read_unrecognised_node() {
        let node = SyntaxNode::branch("expr|string", vec![]);
        assert_eq!(
            read(&node),
            Value::error("Unrecognised syntax node 'expr|string'")
        );
    }
}
