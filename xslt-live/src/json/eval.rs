//! Template rendering and the built-in function set.

use serde_json::{Map, Number, Value};

use super::error::JsonTransformError;
use super::expr::{parse_expression, Expr};
use super::path::JsonPath;

type Result<T> = std::result::Result<T, JsonTransformError>;

/// The element currently being visited by a `#loop`
#[derive(Debug, Clone, Copy)]
struct LoopFrame<'v> {
    items: &'v [Value],
    index: usize,
}

impl<'v> LoopFrame<'v> {
    fn current(&self) -> &'v Value {
        &self.items[self.index]
    }
}

/// Evaluation scope: the input document plus the innermost loop, if any
#[derive(Debug, Clone, Copy)]
pub struct Scope<'v> {
    root: &'v Value,
    frame: Option<LoopFrame<'v>>,
}

impl<'v> Scope<'v> {
    pub fn root(root: &'v Value) -> Self {
        Self { root, frame: None }
    }

    fn frame(&self, function: &str) -> Result<LoopFrame<'v>> {
        self.frame
            .ok_or_else(|| JsonTransformError::OutsideLoop(function.to_string()))
    }

    /// Nested loops select relative to the element of the enclosing loop
    fn loop_context(&self) -> &'v Value {
        self.frame.map(|f| f.current()).unwrap_or(self.root)
    }
}

/// Render a template against the scope
pub fn render(template: &Value, scope: &Scope<'_>) -> Result<Value> {
    match template {
        Value::String(s) if s.starts_with('#') => match parse_expression(s) {
            Some(expr) => evaluate(&expr, scope),
            None => Ok(template.clone()),
        },
        Value::Object(map) => {
            if let Some(rendered) = render_loop(map, scope)? {
                return Ok(rendered);
            }
            let mut out = Map::with_capacity(map.len());
            for (key, value) in map {
                out.insert(key.clone(), render(value, scope)?);
            }
            Ok(Value::Object(out))
        }
        Value::Array(items) => items
            .iter()
            .map(|item| render(item, scope))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        other => Ok(other.clone()),
    }
}

/// `{"#loop(path)": template}` renders to an array, one entry per element
fn render_loop(map: &Map<String, Value>, scope: &Scope<'_>) -> Result<Option<Value>> {
    if map.len() != 1 {
        return Ok(None);
    }
    let Some((key, body)) = map.iter().next() else {
        return Ok(None);
    };
    let Some(Expr::Call { name, args }) = parse_expression(key) else {
        return Ok(None);
    };
    if name != "loop" {
        return Ok(None);
    }

    let [path_arg] = args.as_slice() else {
        return Err(JsonTransformError::function("loop", "expects exactly one path"));
    };
    let path = JsonPath::parse(&text_of(&argument(path_arg, scope)?))?;
    let selected = path.evaluate(scope.loop_context());
    let items = match &selected {
        Value::Array(items) => items.as_slice(),
        Value::Null => &[][..],
        other => {
            return Err(JsonTransformError::function(
                "loop",
                format!("path '{}' selected {} instead of an array", key, type_name(other)),
            ))
        }
    };

    let mut out = Vec::with_capacity(items.len());
    for index in 0..items.len() {
        let inner = Scope {
            root: scope.root,
            frame: Some(LoopFrame { items, index }),
        };
        out.push(render(body, &inner)?);
    }
    Ok(Some(Value::Array(out)))
}

fn argument(expr: &Expr, scope: &Scope<'_>) -> Result<Value> {
    match expr {
        Expr::Text(text) => Ok(Value::String(text.clone())),
        call @ Expr::Call { .. } => evaluate(call, scope),
    }
}

fn arguments(args: &[Expr], scope: &Scope<'_>) -> Result<Vec<Value>> {
    args.iter().map(|a| argument(a, scope)).collect()
}

fn expect_args<'a, const N: usize>(name: &str, values: &'a [Value]) -> Result<&'a [Value; N]> {
    values.try_into().map_err(|_| {
        JsonTransformError::function(
            name,
            format!("expects {} argument(s), got {}", N, values.len()),
        )
    })
}

/// Evaluate a single function call
pub fn evaluate(expr: &Expr, scope: &Scope<'_>) -> Result<Value> {
    let (name, args) = match expr {
        Expr::Text(text) => return Ok(Value::String(text.clone())),
        Expr::Call { name, args } => (name.as_str(), args),
    };
    let values = arguments(args, scope)?;

    match name {
        "valueof" => {
            let [path] = expect_args::<1>(name, &values)?;
            Ok(JsonPath::parse(&text_of(path))?.evaluate(scope.root))
        }
        "currentvalue" => {
            expect_args::<0>(name, &values)?;
            Ok(scope.frame(name)?.current().clone())
        }
        "currentindex" => {
            expect_args::<0>(name, &values)?;
            Ok(Value::from(scope.frame(name)?.index as u64))
        }
        "lastindex" => {
            expect_args::<0>(name, &values)?;
            Ok(Value::from(scope.frame(name)?.items.len().saturating_sub(1) as u64))
        }
        "lastvalue" => {
            expect_args::<0>(name, &values)?;
            Ok(scope.frame(name)?.items.last().cloned().unwrap_or(Value::Null))
        }
        "currentvalueatpath" => {
            let [path] = expect_args::<1>(name, &values)?;
            let frame = scope.frame(name)?;
            Ok(JsonPath::parse(&text_of(path))?.evaluate(frame.current()))
        }
        "concat" => Ok(Value::String(values.iter().map(text_of).collect())),
        "substring" => {
            let [s, start, len] = expect_args::<3>(name, &values)?;
            let start = to_index(name, start)?;
            let len = to_index(name, len)?;
            let chars: Vec<char> = text_of(s).chars().collect();
            let Some(end) = start.checked_add(len).filter(|end| *end <= chars.len()) else {
                return Err(JsonTransformError::function(
                    name,
                    format!(
                        "start {} and length {} are outside a string of length {}",
                        start,
                        len,
                        chars.len()
                    ),
                ));
            };
            Ok(Value::String(chars[start..end].iter().collect()))
        }
        "firstindexof" | "lastindexof" => {
            let [s, needle] = expect_args::<2>(name, &values)?;
            let (s, needle) = (text_of(s), text_of(needle));
            let found = if name == "firstindexof" {
                s.find(&needle)
            } else {
                s.rfind(&needle)
            };
            Ok(match found {
                Some(byte_idx) => Value::from(s[..byte_idx].chars().count() as i64),
                None => Value::from(-1),
            })
        }
        "add" | "subtract" | "multiply" | "divide" => {
            let [a, b] = expect_args::<2>(name, &values)?;
            arithmetic(name, a, b)
        }
        "stringequals" => {
            let [a, b] = expect_args::<2>(name, &values)?;
            Ok(Value::Bool(text_of(a) == text_of(b)))
        }
        "ifcondition" => {
            let [cond, value, then, otherwise] = expect_args::<4>(name, &values)?;
            if text_of(cond) == text_of(value) {
                Ok(then.clone())
            } else {
                Ok(otherwise.clone())
            }
        }
        "tointeger" => {
            let [v] = expect_args::<1>(name, &values)?;
            let n = to_number(name, v)?;
            Ok(Value::from(n.trunc() as i64))
        }
        "tostring" => {
            let [v] = expect_args::<1>(name, &values)?;
            Ok(Value::String(text_of(v)))
        }
        "length" => {
            let [v] = expect_args::<1>(name, &values)?;
            let target = match v {
                Value::String(s) if s.trim_start().starts_with('$') => {
                    JsonPath::parse(s)?.evaluate(scope.root)
                }
                other => other.clone(),
            };
            let len = match &target {
                Value::Array(items) => items.len(),
                Value::Object(map) => map.len(),
                Value::String(s) => s.chars().count(),
                Value::Null => 0,
                other => text_of(other).chars().count(),
            };
            Ok(Value::from(len as u64))
        }
        other => Err(JsonTransformError::UnknownFunction(other.to_string())),
    }
}

fn arithmetic(name: &str, a: &Value, b: &Value) -> Result<Value> {
    let (x, y) = (to_number(name, a)?, to_number(name, b)?);
    if name == "divide" && y == 0.0 {
        return Err(JsonTransformError::function(name, "division by zero"));
    }

    if name != "divide" {
        if let (Some(xi), Some(yi)) = (to_integer(name, a)?, to_integer(name, b)?) {
            let result = match name {
                "add" => xi.checked_add(yi),
                "subtract" => xi.checked_sub(yi),
                _ => xi.checked_mul(yi),
            };
            return result
                .and_then(integer_value)
                .ok_or_else(|| JsonTransformError::function(name, "integer overflow"));
        }
    }

    let result = match name {
        "add" => x + y,
        "subtract" => x - y,
        "multiply" => x * y,
        _ => x / y,
    };
    Number::from_f64(result)
        .map(Value::Number)
        .ok_or_else(|| JsonTransformError::function(name, "result is not a finite number"))
}

fn integer_value(n: i128) -> Option<Value> {
    i64::try_from(n)
        .map(Value::from)
        .or_else(|_| u64::try_from(n).map(Value::from))
        .ok()
}

/// Exact integer value of `v`, `None` when it is not integral. Integers
/// outside the 64-bit range are rejected rather than rounded.
fn to_integer(function: &str, v: &Value) -> Result<Option<i128>> {
    let out_of_range =
        || JsonTransformError::function(function, format!("'{}' is out of range", text_of(v)));
    match v {
        Value::Number(n) => Ok(n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from))),
        Value::String(s) => {
            let s = s.trim();
            let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Ok(None);
            }
            let n: i128 = s.parse().map_err(|_| out_of_range())?;
            if n < i128::from(i64::MIN) || n > i128::from(u64::MAX) {
                return Err(out_of_range());
            }
            Ok(Some(n))
        }
        _ => Ok(None),
    }
}

fn to_number(function: &str, v: &Value) -> Result<f64> {
    let parsed = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed.ok_or_else(|| {
        JsonTransformError::function(function, format!("'{}' is not a number", text_of(v)))
    })
}

fn to_index(function: &str, v: &Value) -> Result<usize> {
    let n = to_number(function, v)?;
    if n < 0.0 || n.fract() != 0.0 || n >= usize::MAX as f64 {
        return Err(JsonTransformError::function(
            function,
            format!("'{}' is not a valid index", text_of(v)),
        ));
    }
    Ok(n as usize)
}

/// String form used when values are concatenated or compared
fn text_of(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
