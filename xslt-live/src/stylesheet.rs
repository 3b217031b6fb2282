//! Stylesheet pre-compilation shared by the XSLT adapters
//!
//! Before a stylesheet reaches an engine it is parsed once with positions
//! retained. Well-formedness errors and missing required attributes are
//! reported as [`Diagnostic`]s, so both XSLT engines surface line/column
//! information even when the engine itself only reports a bare message.

use std::collections::HashMap;

use roxmltree::Document;
use xform_engine_traits::{Diagnostic, DiagnosticList, EngineError, ParameterSet};

use crate::xml::{self, is_xsl, XSLT_NS};

const COMPILE_FAILED: &str = "Stylesheet failed to compile";

/// Required attributes per XSLT instruction. An entry with several
/// attributes is satisfied when any one of them is present.
const REQUIRED_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("param", &["name"]),
    ("variable", &["name"]),
    ("with-param", &["name"]),
    ("call-template", &["name"]),
    ("template", &["match", "name"]),
    ("value-of", &["select"]),
    ("for-each", &["select"]),
    ("copy-of", &["select"]),
    ("if", &["test"]),
    ("when", &["test"]),
    ("element", &["name"]),
    ("attribute", &["name"]),
];

/// Instructions whose `select` became optional in XSLT 2.0, where a
/// sequence constructor may take its place
const SELECT_OPTIONAL_SINCE_V2: &[&str] = &["value-of"];

/// Declared XSLT version of the stylesheet, 1.0 when absent or unreadable
fn declared_version(root: roxmltree::Node<'_, '_>) -> f64 {
    root.attribute("version")
        .or_else(|| root.attribute((XSLT_NS, "version")))
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(1.0)
}

/// Parse and check a stylesheet, failing with every collected diagnostic
pub fn precompile(text: &str) -> Result<Document<'_>, EngineError> {
    let doc = xml::parse(text).map_err(|diagnostic| {
        EngineError::compile(COMPILE_FAILED, std::iter::once(diagnostic).collect())
    })?;

    let diagnostics = check(&doc);
    if !diagnostics.is_empty() {
        return Err(EngineError::compile(COMPILE_FAILED, diagnostics));
    }
    Ok(doc)
}

/// Structural checks on an already parsed stylesheet
pub fn check(doc: &Document<'_>) -> DiagnosticList {
    let mut diagnostics = DiagnosticList::new();
    let root = doc.root_element();

    if is_xsl(root, "stylesheet") || is_xsl(root, "transform") {
        if root.attribute("version").is_none() {
            diagnostics.push(xml::diagnostic_at(
                doc,
                root,
                format!(
                    "xsl:{} is missing the required 'version' attribute",
                    root.tag_name().name()
                ),
            ));
        }
    } else if root.attribute((XSLT_NS, "version")).is_none() {
        diagnostics.push(xml::diagnostic_at(
            doc,
            root,
            format!(
                "Document element '{}' is neither xsl:stylesheet, xsl:transform nor a simplified stylesheet",
                root.tag_name().name()
            ),
        ));
    }

    let version_2_or_later = declared_version(root) >= 2.0;

    for node in root.descendants().filter(|n| n.is_element()) {
        if node.tag_name().namespace() != Some(XSLT_NS) {
            continue;
        }
        let local = node.tag_name().name();
        if version_2_or_later
            && SELECT_OPTIONAL_SINCE_V2.contains(&local)
            && node.has_children()
        {
            continue;
        }
        let Some((_, required)) = REQUIRED_ATTRIBUTES.iter().find(|(name, _)| *name == local)
        else {
            continue;
        };
        if required.iter().all(|attr| node.attribute(*attr).is_none()) {
            let wanted = required
                .iter()
                .map(|a| format!("'{}'", a))
                .collect::<Vec<_>>()
                .join(" or ");
            diagnostics.push(xml::diagnostic_at(
                doc,
                node,
                format!("xsl:{} is missing the required {} attribute", local, wanted),
            ));
        }
    }

    diagnostics
}

/// Turn top-level `xsl:param` declarations into global `xsl:variable`s.
///
/// Bound names select their string literal, later duplicates winning; the
/// others keep their declared default. Names are matched unprefixed and
/// without namespace; parameters the stylesheet never declares are ignored.
pub fn bind_parameters(doc: &Document<'_>, text: &str, params: &ParameterSet) -> String {
    let values: HashMap<&str, &str> = params
        .bound()
        .map(|p| (p.name.trim(), p.value.as_str()))
        .collect();

    let root = doc.root_element();
    let mut replacements: Vec<(std::ops::Range<usize>, String)> = root
        .children()
        .filter(|n| is_xsl(*n, "param"))
        .filter_map(|node| {
            let name = node.attribute("name")?;
            let source = &text[node.range()];
            let qname = element_qname(source)?;
            let variable = format!("{}variable", qname.strip_suffix("param")?);
            let replacement = match values.get(name) {
                Some(value) => format!(
                    "<{} name=\"{}\" select=\"{}\"/>",
                    variable,
                    xml::escape_attribute(name),
                    xml::escape_attribute(&xml::xpath_string_literal(value)),
                ),
                None => rename_element(source, qname, &variable),
            };
            Some((node.range(), replacement))
        })
        .collect();

    replacements.sort_by_key(|(range, _)| std::cmp::Reverse(range.start));
    let mut out = text.to_string();
    for (range, replacement) in replacements {
        out.replace_range(range, &replacement);
    }
    out
}

/// Qualified name as written in the start tag of `source`
fn element_qname(source: &str) -> Option<&str> {
    let rest = source.strip_prefix('<')?;
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Rename the element spanning `source` from `qname` to `to`
fn rename_element(source: &str, qname: &str, to: &str) -> String {
    let mut out = format!("<{}{}", to, &source[1 + qname.len()..]);
    if !source.ends_with("/>") {
        if let Some(end) = out.rfind("</") {
            out.replace_range(end.., &format!("</{}>", to));
        }
    }
    out
}

/// Check an input document for well-formedness, reporting the position
pub fn check_input(input: &str) -> Result<(), EngineError> {
    xml::parse(input).map(|_| ()).map_err(|d: Diagnostic| {
        EngineError::invalid_input(format!("Input document is not well-formed: {}", d))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use xform_engine_traits::Parameter;

    const WITH_PARAM: &str = r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:param name="p">default</xsl:param>
  <xsl:template match="/"><out><xsl:value-of select="$p"/></out></xsl:template>
</xsl:stylesheet>"#;

    #[test]
    fn bind_rewrites_declared_param() {
        let doc = xml::parse(WITH_PARAM).unwrap();
        let params: ParameterSet = vec![Parameter::new("p", "v")].into_iter().collect();
        let bound = bind_parameters(&doc, WITH_PARAM, &params);
        assert!(bound.contains(r#"<xsl:variable name="p" select="'v'"/>"#));
        assert!(!bound.contains("default"));
        assert!(!bound.contains("xsl:param"));
    }

    #[test]
    fn unbound_param_keeps_default_as_variable() {
        let doc = xml::parse(WITH_PARAM).unwrap();
        let bound = bind_parameters(&doc, WITH_PARAM, &ParameterSet::new());
        assert!(bound.contains(r#"<xsl:variable name="p">default</xsl:variable>"#));
        assert!(xml::parse(&bound).is_ok());
    }

    #[test]
    fn self_closing_and_unprefixed_params_are_renamed() {
        let text = r#"<stylesheet version="1.0" xmlns="http://www.w3.org/1999/XSL/Transform">
  <param name="n" select="1"/>
  <template match="/"/>
</stylesheet>"#;
        let doc = xml::parse(text).unwrap();
        let bound = bind_parameters(&doc, text, &ParameterSet::new());
        assert!(bound.contains(r#"<variable name="n" select="1"/>"#));
    }

    #[test]
    fn template_params_are_left_alone() {
        let text = r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template name="t"><xsl:param name="p"/></xsl:template>
</xsl:stylesheet>"#;
        let doc = xml::parse(text).unwrap();
        let params: ParameterSet = vec![Parameter::new("p", "v")].into_iter().collect();
        assert_eq!(bind_parameters(&doc, text, &params), text);
    }

    #[test]
    fn bind_last_duplicate_wins() {
        let doc = xml::parse(WITH_PARAM).unwrap();
        let params: ParameterSet = vec![Parameter::new("p", "first"), Parameter::new("p", "second")]
            .into_iter()
            .collect();
        let bound = bind_parameters(&doc, WITH_PARAM, &params);
        assert!(bound.contains("'second'"));
        assert!(!bound.contains("'first'"));
    }

    #[test]
    fn bind_ignores_undeclared_names() {
        let doc = xml::parse(WITH_PARAM).unwrap();
        let params: ParameterSet = vec![Parameter::new("q", "v")].into_iter().collect();
        let bound = bind_parameters(&doc, WITH_PARAM, &params);
        assert!(!bound.contains("'v'"));
        assert!(bound.contains(">default<"));
    }

    #[test]
    fn check_reports_missing_attributes() {
        let text = r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template><xsl:value-of/></xsl:template>
</xsl:stylesheet>"#;
        let doc = xml::parse(text).unwrap();
        let diagnostics = check(&doc);
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.as_slice()[0].message.contains("'match' or 'name'"));
        assert_eq!(diagnostics.as_slice()[0].line, 2);
    }

    #[test]
    fn value_of_content_accepted_from_version_2() {
        let body = r#"<xsl:template match="/"><xsl:value-of>text</xsl:value-of></xsl:template>"#;
        let v2 = format!(
            r#"<xsl:stylesheet version="2.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">{}</xsl:stylesheet>"#,
            body
        );
        let v1 = v2.replace(r#"version="2.0""#, r#"version="1.0""#);
        assert!(check(&xml::parse(&v2).unwrap()).is_empty());
        assert_eq!(check(&xml::parse(&v1).unwrap()).len(), 1);

        let empty_v3 = r#"<xsl:stylesheet version="3.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="/"><xsl:value-of/></xsl:template>
</xsl:stylesheet>"#;
        assert_eq!(check(&xml::parse(empty_v3).unwrap()).len(), 1);
    }

    #[test]
    fn check_rejects_non_stylesheet_root() {
        let doc = xml::parse("<html/>").unwrap();
        assert_eq!(check(&doc).len(), 1);
    }

    #[test]
    fn simplified_stylesheet_is_accepted() {
        let text = r#"<out xsl:version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform"/>"#;
        let doc = xml::parse(text).unwrap();
        assert!(check(&doc).is_empty());
    }
}
