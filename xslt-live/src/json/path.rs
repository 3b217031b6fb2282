//! A `nom`-based parser and evaluator for the JSON path subset used by the
//! transform functions: `$`, `.key`, `['key']`, `[n]`, `.*` and `[*]`.
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, multispace0, u64 as nom_u64},
    combinator::{map, opt},
    multi::many0,
    sequence::{delimited, preceded},
    IResult, Parser,
};
use serde_json::Value;

use super::error::JsonTransformError;

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Key(String),
    Index(usize),
    Wildcard,
}

/// A parsed path. Paths are always evaluated relative to the node they are
/// applied to; the leading `$` is optional.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPath {
    segments: Vec<Segment>,
}

impl JsonPath {
    pub fn parse(input: &str) -> Result<Self, JsonTransformError> {
        let trimmed = input.trim();
        match path(trimmed) {
            Ok(("", segments)) => Ok(Self { segments }),
            Ok((rem, _)) => Err(JsonTransformError::PathParse(
                input.to_string(),
                format!("unexpected input at '{}'", rem),
            )),
            Err(e) => Err(JsonTransformError::PathParse(input.to_string(), e.to_string())),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True when the path can select at most one node
    pub fn is_singular(&self) -> bool {
        !self.segments.contains(&Segment::Wildcard)
    }

    /// Every node the path selects, in document order
    pub fn select<'v>(&self, value: &'v Value) -> Vec<&'v Value> {
        let mut current = vec![value];
        for segment in &self.segments {
            let mut next = Vec::new();
            for node in current {
                match (segment, node) {
                    (Segment::Key(key), Value::Object(map)) => next.extend(map.get(key)),
                    (Segment::Index(idx), Value::Array(items)) => next.extend(items.get(*idx)),
                    (Segment::Wildcard, Value::Array(items)) => next.extend(items.iter()),
                    (Segment::Wildcard, Value::Object(map)) => next.extend(map.values()),
                    _ => {}
                }
            }
            current = next;
        }
        current
    }

    /// Select and fold into one value: `null` when nothing matches, the node
    /// itself for singular paths, an array otherwise
    pub fn evaluate(&self, value: &Value) -> Value {
        let nodes = self.select(value);
        if self.is_singular() {
            nodes.into_iter().next().cloned().unwrap_or(Value::Null)
        } else {
            Value::Array(nodes.into_iter().cloned().collect())
        }
    }
}

// --- Combinators ---

fn path(input: &str) -> IResult<&str, Vec<Segment>> {
    let (input, _) = opt(char('$')).parse(input)?;
    let (input, first) = opt(map(key_name, |s: &str| Segment::Key(s.to_string()))).parse(input)?;
    let (input, rest) = many0(segment).parse(input)?;
    let mut segments: Vec<Segment> = first.into_iter().collect();
    segments.extend(rest);
    Ok((input, segments))
}

fn key_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '-' || c == '@').parse(input)
}

fn quoted(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('\''), take_while(|c| c != '\''), char('\'')),
        delimited(char('"'), take_while(|c| c != '"'), char('"')),
    ))
    .parse(input)
}

fn bracketed<'a, O, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>
where
    F: Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>,
{
    delimited(char('['), delimited(multispace0, inner, multispace0), char(']'))
}

fn segment(input: &str) -> IResult<&str, Segment> {
    alt((
        map(tag(".*"), |_| Segment::Wildcard),
        map(preceded(char('.'), key_name), |s: &str| Segment::Key(s.to_string())),
        map(bracketed(char('*')), |_| Segment::Wildcard),
        map(bracketed(nom_u64), |i| Segment::Index(i as usize)),
        map(bracketed(quoted), |s: &str| Segment::Key(s.to_string())),
    ))
    .parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_mixed_segments() {
        let p = JsonPath::parse("$.orders[1]['unit price']").unwrap();
        assert_eq!(
            p.segments(),
            &[
                Segment::Key("orders".into()),
                Segment::Index(1),
                Segment::Key("unit price".into()),
            ]
        );
    }

    #[test]
    fn root_alone_selects_document() {
        let data = json!({"a": 1});
        assert_eq!(JsonPath::parse("$").unwrap().evaluate(&data), data);
    }

    #[test]
    fn wildcard_always_yields_array() {
        let data = json!({"items": [{"id": 1}, {"id": 2}]});
        let p = JsonPath::parse("$.items[*].id").unwrap();
        assert_eq!(p.evaluate(&data), json!([1, 2]));
        let p = JsonPath::parse("$.missing.*").unwrap();
        assert_eq!(p.evaluate(&data), json!([]));
    }

    #[test]
    fn missing_singular_path_is_null() {
        let data = json!({"a": {"b": 1}});
        assert_eq!(JsonPath::parse("$.a.c").unwrap().evaluate(&data), Value::Null);
        assert_eq!(JsonPath::parse("a.b").unwrap().evaluate(&data), json!(1));
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(JsonPath::parse("$.a[").is_err());
    }
}
