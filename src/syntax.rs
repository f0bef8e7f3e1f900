//! The syntax tree handed from the parser to the reader.
//!
//! Nodes are classified by a tag string rather than an enum: a tag is a
//! `|`-separated path of grammar rules (`expr|number|regex`, `expr|sexpr|>`),
//! the root is tagged exactly `>`, literal delimiters are tagged `char` and
//! zero-width anchors `regex`. The reader classifies nodes by substring, so any
//! producer that follows this scheme can feed it.

/// Tag of the root node
pub const ROOT_TAG: &str = ">";

/// Tag of zero-width anchor nodes (start and end of input)
pub const ANCHOR_TAG: &str = "regex";

/// Tag of literal delimiter nodes such as `(` and `}`
pub const DELIMITER_TAG: &str = "char";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyntaxNode {
    pub tag: String,
    pub contents: String,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// A leaf carrying literal text, e.g. a number or symbol token
    pub fn leaf(tag: impl Into<String>, contents: impl Into<String>) -> Self {
        SyntaxNode {
            tag: tag.into(),
            contents: contents.into(),
            children: Vec::new(),
        }
    }

    /// An interior node whose meaning comes from its children
    pub fn branch(tag: impl Into<String>, children: Vec<SyntaxNode>) -> Self {
        SyntaxNode {
            tag: tag.into(),
            contents: String::new(),
            children,
        }
    }

    pub fn delimiter(contents: char) -> Self {
        Self::leaf(DELIMITER_TAG, contents)
    }

    pub fn anchor() -> Self {
        Self::leaf(ANCHOR_TAG, "")
    }

    /// Whitespace and delimiter tokens carry no value of their own
    pub fn is_punctuation(&self) -> bool {
        matches!(self.contents.as_str(), "(" | ")" | "{" | "}") || self.tag == ANCHOR_TAG
    }
}
