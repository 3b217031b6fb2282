//! Static analysis of transform documents

use tracing::warn;

use crate::xml;

/// Names of every element with local name `param`, in any namespace, in
/// document order. Duplicates are kept and elements without a `name`
/// attribute are skipped.
///
/// Never fails: text that does not parse as XML yields an empty list and a
/// warning.
pub fn extract_parameter_names(transform: &str) -> Vec<String> {
    collect_attributes(transform, &["param"], "name")
}

/// `href` of every `include`/`import` element in document order, with the
/// same never-fail contract as [`extract_parameter_names`]
pub fn extract_include_hrefs(transform: &str) -> Vec<String> {
    collect_attributes(transform, &["include", "import"], "href")
}

fn collect_attributes(text: &str, local_names: &[&str], attribute: &str) -> Vec<String> {
    let doc = match xml::parse(text) {
        Ok(doc) => doc,
        Err(diagnostic) => {
            warn!(%diagnostic, "could not scan transform document");
            return Vec::new();
        }
    };

    doc.descendants()
        .filter(|node| node.is_element() && local_names.contains(&node.tag_name().name()))
        .filter_map(|node| node.attribute(attribute))
        .map(str::to_string)
        .collect()
}
