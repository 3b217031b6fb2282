//! JSON-to-JSON transformation language.
//!
//! A transform is itself a JSON document. Strings that start with `#` are
//! function calls evaluated against the input (`"#valueof($.customer.name)"`),
//! and an object whose only key is `#loop(path)` turns into an array with the
//! inner template rendered once per selected element. Everything else is
//! copied to the output unchanged.

pub mod error;
pub mod eval;
pub mod expr;
pub mod path;

pub use error::JsonTransformError;
pub use eval::{render, Scope};
pub use expr::{parse_expression, Expr};
pub use path::JsonPath;

/// Parse both documents and render `transform` against `input`
pub fn transform(input: &str, transform: &str) -> Result<serde_json::Value, JsonTransformError> {
    let input: serde_json::Value = serde_json::from_str(input)
        .map_err(|e| JsonTransformError::InvalidInput(e.to_string()))?;
    let template: serde_json::Value = serde_json::from_str(transform)
        .map_err(|e| JsonTransformError::InvalidTransform(e.to_string()))?;
    render(&template, &Scope::root(&input))
}
