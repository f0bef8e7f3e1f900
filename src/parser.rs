use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, digit1, multispace0},
    combinator::{cut, eof, opt, recognize},
    error::ErrorKind,
    multi::many0,
    sequence::{pair, preceded},
    IResult, Parser,
};

use crate::syntax::{SyntaxNode, ROOT_TAG};
use crate::{Error, ParseError, ParseErrorKind, MAX_PARSE_DEPTH};

/// Allowed non-alphanumeric characters in symbol names
const SYMBOL_SPECIAL_CHARS: &str = "_+-*/\\=<>!&";

const NUMBER_TAG: &str = "expr|number|regex";
const SYMBOL_TAG: &str = "expr|symbol|regex";
const SEXPR_TAG: &str = "expr|sexpr|>";
const QEXPR_TAG: &str = "expr|qexpr|>";

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || SYMBOL_SPECIAL_CHARS.contains(c)
}

/// Convert nom parsing errors to user-friendly messages
fn parse_error_from_nom(input: &str, error: nom::Err<nom::error::Error<&str>>) -> ParseError {
    match error {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let position = input.len().saturating_sub(e.input.len());
            let (kind, message) = if e.code == ErrorKind::TooLarge {
                (
                    ParseErrorKind::TooDeeplyNested,
                    format!("Expression too deeply nested (max depth: {MAX_PARSE_DEPTH})"),
                )
            } else if e.input.is_empty() {
                (
                    ParseErrorKind::Incomplete,
                    "Unexpected end of input, expected closing delimiter".to_owned(),
                )
            } else {
                (
                    ParseErrorKind::InvalidSyntax,
                    format!("Unexpected character at position {position}"),
                )
            };
            ParseError::with_context(kind, message, input, position)
        }
        nom::Err::Incomplete(_) => {
            ParseError::new(ParseErrorKind::Incomplete, "Incomplete input", None, None)
        }
    }
}

/// Parse a number literal: an optional minus sign and decimal digits.
/// Range checking is left to the reader.
fn parse_number(input: &str) -> IResult<&str, SyntaxNode> {
    let (input, literal) = recognize(pair(opt(char('-')), digit1)).parse(input)?;
    Ok((input, SyntaxNode::leaf(NUMBER_TAG, literal)))
}

/// Parse a symbol (identifier or operator)
fn parse_symbol(input: &str) -> IResult<&str, SyntaxNode> {
    let (input, name) = take_while1(is_symbol_char).parse(input)?;
    Ok((input, SyntaxNode::leaf(SYMBOL_TAG, name)))
}

/// Parse a delimited list; `depth` counts the lists enclosing this one
fn parse_list<'a>(
    input: &'a str,
    open: char,
    close: char,
    tag: &'static str,
    depth: usize,
) -> IResult<&'a str, SyntaxNode> {
    let (input, _) = char(open).parse(input)?;
    if depth >= MAX_PARSE_DEPTH {
        return Err(nom::Err::Failure(nom::error::Error::new(
            input,
            ErrorKind::TooLarge,
        )));
    }

    let (input, items) = many0(|input| parse_expr(input, depth + 1)).parse(input)?;

    // Once a list is open, a missing close delimiter is a hard failure
    let (input, _) = cut(preceded(multispace0, char(close))).parse(input)?;

    let mut children = Vec::with_capacity(items.len() + 2);
    children.push(SyntaxNode::delimiter(open));
    children.extend(items);
    children.push(SyntaxNode::delimiter(close));
    Ok((input, SyntaxNode::branch(tag, children)))
}

fn parse_expr(input: &str, depth: usize) -> IResult<&str, SyntaxNode> {
    preceded(
        multispace0,
        alt((
            parse_number,
            parse_symbol,
            |input| parse_list(input, '(', ')', SEXPR_TAG, depth),
            |input| parse_list(input, '{', '}', QEXPR_TAG, depth),
        )),
    )
    .parse(input)
}

fn parse_root(input: &str) -> IResult<&str, Vec<SyntaxNode>> {
    let (input, exprs) = many0(|input| parse_expr(input, 0)).parse(input)?;
    let (input, _) = multispace0.parse(input)?;
    let (input, _) = eof.parse(input)?;
    Ok((input, exprs))
}

/// Parse a whole line of input into a syntax tree.
///
/// The root holds every top-level expression between two anchors, so the
/// reader turns a line into one implicit S-expression. Empty input is valid
/// and yields an empty root.
pub fn parse(input: &str) -> Result<SyntaxNode, Error> {
    match parse_root(input) {
        Ok((_, exprs)) => {
            let mut children = Vec::with_capacity(exprs.len() + 2);
            children.push(SyntaxNode::anchor());
            children.extend(exprs);
            children.push(SyntaxNode::anchor());
            Ok(SyntaxNode::branch(ROOT_TAG, children))
        }
        Err(e) => Err(Error::ParseError(parse_error_from_nom(input, e))),
    }
}
