//! xrust engine adapter (Standard-XSLT)
//!
//! Supports:
//! - stylesheet compilation with positioned diagnostics
//! - string-typed stylesheet parameters
//! - host newline normalization of the serialized result
//!
//! xrust trees are reference counted and not `Send`, so every call builds
//! its own trees and context on the calling thread.

use xform_engine_traits::{newline, EngineError, EngineKind, ParameterSet, Result, TransformEngine};
use xrust::item::{Item as XrustItem, Node};
use xrust::parser::xml::parse as parse_xml;
use xrust::transform::context::{Context, StaticContextBuilder};
use xrust::trees::smite::RNode;
use xrust::xdmerror::{Error as XrustError, ErrorKind};
use xrust::xslt::from_document;

use crate::stylesheet;

/// xrust engine wrapper
pub struct XrustEngine;

impl Default for XrustEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl XrustEngine {
    pub fn new() -> Self {
        Self
    }

    /// Compile `text` with `params` bound.
    ///
    /// Diagnostics found while checking the stylesheet are returned together;
    /// when none were found but xrust still rejects it, xrust's own message
    /// is returned unchanged.
    pub fn compile(&self, text: &str, params: &ParameterSet) -> Result<Context<RNode>> {
        let doc = stylesheet::precompile(text)?;
        let bound = stylesheet::bind_parameters(&doc, text, params);

        let style = RNode::new_document();
        parse_xml(style.clone(), &bound, None)
            .map_err(|e| EngineError::compile_raw(e.to_string()))?;

        from_document(
            style,
            None,
            |s: &str| {
                let doc = RNode::new_document();
                parse_xml(doc.clone(), s, None)?;
                Ok(doc)
            },
            |_| Ok(String::new()),
        )
        .map_err(|e| EngineError::compile_raw(e.to_string()))
    }
}

impl TransformEngine for XrustEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::StandardXslt
    }

    fn name(&self) -> &'static str {
        "xrust"
    }

    fn transform(&self, input: &str, transform: &str, params: &ParameterSet) -> Result<String> {
        let mut context = self.compile(transform, params)?;

        stylesheet::check_input(input)?;
        let source = RNode::new_document();
        parse_xml(source.clone(), input, None)
            .map_err(|e| EngineError::invalid_input(e.to_string()))?;

        // Set source document as context
        context.context(vec![XrustItem::Node(source)], 0);

        let result_doc = RNode::new_document();
        context.result_document(result_doc.clone());

        let mut static_context = StaticContextBuilder::new()
            .message(|_| Ok(()))
            .fetcher(|_| Err(XrustError::new(ErrorKind::NotImplemented, "not implemented")))
            .parser(|_| Err(XrustError::new(ErrorKind::NotImplemented, "not implemented")))
            .build();

        context
            .evaluate(&mut static_context)
            .map_err(|e| EngineError::execution(e.to_string()))?;

        Ok(newline::normalize(&result_doc.to_xml()))
    }
}
