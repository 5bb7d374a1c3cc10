//! Text front end for propositional expressions.
//!
//! Grammar (loosest binding first):
//!
//! ```text
//! biconditional := implication ("<->" implication)*      left associative
//! implication   := disjunction ("->" implication)?       right associative
//! disjunction   := conjunction ("or" conjunction)*       n-ary
//! conjunction   := negation ("and" negation)*            n-ary
//! negation      := "not" negation | atom
//! atom          := "(" biconditional ")" | constant | identifier
//! constant      := "0" | "1" | "True" | "False" | "true" | "false"
//! ```
//!
//! A chain such as `x and y and z` becomes one three-operand `And`; a
//! parenthesized group stays a separate node, so `(x and y) and z` keeps its
//! nesting. This makes `parse(expr.to_string()) == expr` hold for every tree.

use crate::expr::{Connective, Expr};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char as pchar, multispace0, satisfy},
    combinator::{all_consuming, map, not, opt, recognize, value},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated},
    IResult,
};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty expression")]
    Empty,
    #[error("unbalanced parentheses at offset {offset}")]
    Unbalanced { offset: usize },
    #[error("unexpected input at offset {offset}: `{snippet}`")]
    Unexpected { offset: usize, snippet: String },
}

const RESERVED: &[&str] = &["and", "or", "not", "True", "False", "true", "false"];

/// Parse an expression in the canonical (or any equivalent loose) syntax.
pub fn parse_expr(text: &str) -> Result<Expr, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    check_balanced(text)?;

    match all_consuming(terminated(biconditional, multispace0))(text) {
        Ok((_, expr)) => Ok(expr),
        Err(nom::Err::Error(err)) | Err(nom::Err::Failure(err)) => {
            let offset = text.len() - err.input.len();
            Err(ParseError::Unexpected {
                offset,
                snippet: err.input.chars().take(24).collect(),
            })
        }
        Err(nom::Err::Incomplete(_)) => Err(ParseError::Unexpected {
            offset: text.len(),
            snippet: String::new(),
        }),
    }
}

impl std::str::FromStr for Expr {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_expr(s)
    }
}

impl TryFrom<String> for Expr {
    type Error = ParseError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        parse_expr(&text)
    }
}

fn check_balanced(text: &str) -> Result<(), ParseError> {
    let mut open: Vec<usize> = Vec::new();
    for (offset, c) in text.char_indices() {
        match c {
            '(' => open.push(offset),
            ')' => {
                if open.pop().is_none() {
                    return Err(ParseError::Unbalanced { offset });
                }
            }
            _ => {}
        }
    }
    match open.pop() {
        Some(offset) => Err(ParseError::Unbalanced { offset }),
        None => Ok(()),
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    preceded(
        multispace0,
        terminated(tag(word), not(satisfy(is_ident_continue))),
    )
}

fn symbol<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    preceded(multispace0, tag(word))
}

fn identifier(input: &str) -> IResult<&str, &str> {
    let (rest, name) = preceded(
        multispace0,
        recognize(pair(satisfy(is_ident_start), take_while(is_ident_continue))),
    )(input)?;
    if RESERVED.contains(&name) {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Tag,
        )));
    }
    Ok((rest, name))
}

fn constant(input: &str) -> IResult<&str, bool> {
    alt((
        value(true, keyword("1")),
        value(false, keyword("0")),
        value(true, keyword("True")),
        value(false, keyword("False")),
        value(true, keyword("true")),
        value(false, keyword("false")),
    ))(input)
}

fn atom(input: &str) -> IResult<&str, Expr> {
    alt((
        delimited(
            preceded(multispace0, pchar('(')),
            biconditional,
            preceded(multispace0, pchar(')')),
        ),
        map(constant, Expr::Constant),
        map(identifier, Expr::lit),
    ))(input)
}

fn negation(input: &str) -> IResult<&str, Expr> {
    alt((map(preceded(keyword("not"), negation), Expr::not), atom))(input)
}

fn conjunction(input: &str) -> IResult<&str, Expr> {
    let (input, first) = negation(input)?;
    let (input, rest) = many0(preceded(keyword("and"), negation))(input)?;
    Ok((input, Connective::And.fold(first, rest)))
}

fn disjunction(input: &str) -> IResult<&str, Expr> {
    let (input, first) = conjunction(input)?;
    let (input, rest) = many0(preceded(keyword("or"), conjunction))(input)?;
    Ok((input, Connective::Or.fold(first, rest)))
}

fn implication(input: &str) -> IResult<&str, Expr> {
    let (input, lhs) = disjunction(input)?;
    let (input, rhs) = opt(preceded(symbol("->"), implication))(input)?;
    Ok((
        input,
        match rhs {
            Some(rhs) => Expr::implies(lhs, rhs),
            None => lhs,
        },
    ))
}

fn biconditional(input: &str) -> IResult<&str, Expr> {
    let (input, first) = implication(input)?;
    let (input, rest) = many0(preceded(symbol("<->"), implication))(input)?;
    Ok((
        input,
        rest.into_iter().fold(first, |acc, rhs| Expr::iff(acc, rhs)),
    ))
}
