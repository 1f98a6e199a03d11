//! Nom-based arithmetic parser.
//!
//! Parses the body of a non-function formula (`A1+3*(B2-.5)`) into an AST.
//! Only numbers, single-letter cell references, `+ - * /`, unary signs and
//! parentheses are accepted.

use nom::{
    branch::alt,
    character::complete::{char, digit0, digit1, multispace0, one_of, satisfy},
    combinator::{map, map_opt, opt, recognize},
    multi::fold_many0,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};
use thiserror::Error;

use crate::ast::{BinaryOp, Expr, UnaryOp};
use sheetcalc_core::CellCoord;

/// Deepest parenthesis or sign nesting accepted before parsing
const MAX_NESTING: usize = 128;

// =============================================================================
// Error Type
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

// =============================================================================
// Helper Combinators
// =============================================================================

/// Skip whitespace
fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Parse a decimal number: `12`, `1.5`, `.5`, `3.`, `2e-3`
fn parse_number(input: &str) -> IResult<&str, Expr> {
    map_opt(
        recognize(tuple((
            alt((
                recognize(pair(digit1, opt(pair(char('.'), digit0)))),
                recognize(pair(char('.'), digit1)),
            )),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        |num_str: &str| num_str.parse::<f64>().ok().map(Expr::Number),
    )(input)
}

/// Parse a cell reference (one uppercase column letter, 1-based row)
fn parse_cell_ref(input: &str) -> IResult<&str, Expr> {
    map_opt(
        recognize(pair(satisfy(|c| c.is_ascii_uppercase()), digit1)),
        |name: &str| CellCoord::from_name(name).map(|c| Expr::cell_ref(c.row, c.col)),
    )(input)
}

// =============================================================================
// Operator Parsers
// =============================================================================

fn parse_additive_op(input: &str) -> IResult<&str, BinaryOp> {
    alt((
        map(char('+'), |_| BinaryOp::Add),
        map(char('-'), |_| BinaryOp::Sub),
    ))(input)
}

fn parse_multiplicative_op(input: &str) -> IResult<&str, BinaryOp> {
    alt((
        map(char('*'), |_| BinaryOp::Mul),
        map(char('/'), |_| BinaryOp::Div),
    ))(input)
}

// =============================================================================
// Expression Parsers (Precedence Climbing)
// =============================================================================

/// Parse a primary expression (number, cell ref, parentheses)
fn parse_primary(input: &str) -> IResult<&str, Expr> {
    ws(alt((
        map(
            delimited(char('('), parse_expression, char(')')),
            |e| Expr::Grouped(Box::new(e)),
        ),
        parse_number,
        parse_cell_ref,
    )))(input)
}

/// Parse a unary expression (prefix - or +)
fn parse_unary(input: &str) -> IResult<&str, Expr> {
    let (input, _) = multispace0(input)?;

    alt((
        map(preceded(char('-'), parse_unary), |e| {
            Expr::unary(UnaryOp::Neg, e)
        }),
        map(preceded(char('+'), parse_unary), |e| {
            Expr::unary(UnaryOp::Pos, e)
        }),
        parse_primary,
    ))(input)
}

/// Parse multiplicative expressions (*, /)
fn parse_multiplicative(input: &str) -> IResult<&str, Expr> {
    let (input, init) = parse_unary(input)?;

    fold_many0(
        pair(ws(parse_multiplicative_op), parse_unary),
        move || init.clone(),
        |acc, (op, val)| Expr::binary(acc, op, val),
    )(input)
}

/// Parse additive expressions (+, -)
fn parse_additive(input: &str) -> IResult<&str, Expr> {
    let (input, init) = parse_multiplicative(input)?;

    fold_many0(
        pair(ws(parse_additive_op), parse_multiplicative),
        move || init.clone(),
        |acc, (op, val)| Expr::binary(acc, op, val),
    )(input)
}

/// Parse a complete expression
pub fn parse_expression(input: &str) -> IResult<&str, Expr> {
    let (input, _) = multispace0(input)?;
    parse_additive(input)
}

/// Deepest nesting of parentheses and consecutive signs
fn nesting_depth(input: &str) -> usize {
    let mut depth: usize = 0;
    let mut max_depth = 0;
    let mut sign_run = 0;

    for c in input.chars() {
        match c {
            '(' => {
                depth += 1;
                sign_run = 0;
            }
            ')' => {
                depth = depth.saturating_sub(1);
                sign_run = 0;
            }
            '+' | '-' => sign_run += 1,
            c if c.is_whitespace() => {}
            _ => sign_run = 0,
        }
        max_depth = max_depth.max(depth + sign_run);
    }

    max_depth
}

// =============================================================================
// Public API
// =============================================================================

/// Arithmetic expression parser
#[derive(Debug, Default, Clone, Copy)]
pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Parser
    }

    /// Nesting the parser needs for `input`: open parentheses plus runs of signs
    pub fn nesting(&self, input: &str) -> usize {
        nesting_depth(input)
    }

    /// Parse an arithmetic expression into an AST. A leading `=` is ignored.
    pub fn parse(&self, input: &str) -> Result<Expr, ParseError> {
        let input = input.strip_prefix('=').unwrap_or(input);

        if input.trim().is_empty() {
            return Err(ParseError {
                message: "Empty expression".to_string(),
                position: 0,
            });
        }
        if nesting_depth(input) > MAX_NESTING {
            return Err(ParseError {
                message: format!("Expression nested deeper than {}", MAX_NESTING),
                position: 0,
            });
        }

        match parse_expression(input) {
            Ok((remaining, expr)) => {
                // Check that all input was consumed
                let rest = remaining.trim();
                if rest.is_empty() {
                    Ok(expr)
                } else {
                    Err(ParseError {
                        message: format!("Unexpected input: '{}'", rest),
                        position: input.len() - remaining.trim_start().len(),
                    })
                }
            }
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(ParseError {
                message: format!("Unexpected input: '{}'", e.input.trim()),
                position: input.len() - e.input.len(),
            }),
            Err(nom::Err::Incomplete(_)) => Err(ParseError {
                message: "Incomplete expression".to_string(),
                position: input.len(),
            }),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
