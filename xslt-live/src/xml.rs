//! Shared XML helpers: positioned well-formedness checks and literal quoting

use roxmltree::{Document, Node, ParsingOptions};
use xform_engine_traits::Diagnostic;

/// The XSLT namespace URI
pub const XSLT_NS: &str = "http://www.w3.org/1999/XSL/Transform";

/// Parse `text`, turning a well-formedness error into a positioned diagnostic
pub fn parse(text: &str) -> Result<Document<'_>, Diagnostic> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(text, options).map_err(|e| {
        let pos = e.pos();
        let message = e.to_string();
        // roxmltree appends " at row:col"; the diagnostic carries it separately
        let suffix = format!(" at {}", pos);
        let message = message
            .strip_suffix(&suffix)
            .map(str::to_string)
            .unwrap_or(message);
        Diagnostic::new(message, pos.row, pos.col)
    })
}

/// Diagnostic positioned at the start tag of `node`
pub fn diagnostic_at(doc: &Document<'_>, node: Node<'_, '_>, message: impl Into<String>) -> Diagnostic {
    let pos = doc.text_pos_at(node.range().start);
    Diagnostic::new(message, pos.row, pos.col)
}

/// True when `node` is an element in the XSLT namespace with local name `local`
pub fn is_xsl(node: Node<'_, '_>, local: &str) -> bool {
    node.is_element()
        && node.tag_name().namespace() == Some(XSLT_NS)
        && node.tag_name().name() == local
}

/// Quote `value` as an XPath string literal.
///
/// Values containing both quote characters are assembled with `concat()`.
pub fn xpath_string_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{}'", value);
    }
    if !value.contains('"') {
        return format!("\"{}\"", value);
    }
    let parts: Vec<String> = value
        .split('\'')
        .map(|part| format!("'{}'", part))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

/// Escape text for use inside a double-quoted attribute value
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            _ => out.push(c),
        }
    }
    out
}
