//! Parser for `#function(arg, ...)` expressions embedded in transform strings.
//!
//! Arguments are either nested calls or raw text. Raw text runs up to the
//! next top-level `,` or `)`; commas and parentheses inside brackets or
//! quotes do not end an argument, so paths like `$['a,b']` stay intact.
use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::map,
    multi::separated_list0,
    sequence::delimited,
    IResult, Parser,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `#name(args)`
    Call { name: String, args: Vec<Expr> },
    /// Raw argument text, taken verbatim
    Text(String),
}

/// Parse a whole transform string. `None` means the string is not an
/// expression and should be copied through as a literal.
pub fn parse_expression(input: &str) -> Option<Expr> {
    match call(input.trim()) {
        Ok(("", expr)) => Some(expr),
        _ => None,
    }
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_').parse(input)
}

fn call(input: &str) -> IResult<&str, Expr> {
    let (input, _) = char('#').parse(input)?;
    let (input, name) = identifier(input)?;
    let (input, _) = multispace0(input)?;
    let (input, mut args) =
        delimited(char('('), separated_list0(char(','), argument), char(')')).parse(input)?;

    // `#f()` parses as a single empty argument
    if matches!(args.as_slice(), [Expr::Text(t)] if t.is_empty()) {
        args.clear();
    }

    Ok((
        input,
        Expr::Call {
            name: name.to_ascii_lowercase(),
            args,
        },
    ))
}

fn argument(input: &str) -> IResult<&str, Expr> {
    alt((
        delimited(multispace0, call, multispace0),
        map(raw_text, |s: &str| Expr::Text(s.to_string())),
    ))
    .parse(input)
}

/// Raw text up to the next top-level `,` or `)`. May be empty.
fn raw_text(input: &str) -> IResult<&str, &str> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (idx, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'') | (None, '"') => quote = Some(c),
            (None, '[') | (None, '(') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ')') if depth > 0 => depth -= 1,
            (None, ',') | (None, ')') if depth == 0 => return Ok((&input[idx..], &input[..idx])),
            _ => {}
        }
    }
    Ok(("", input))
}
