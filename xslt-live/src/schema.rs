//! XSD validation of transform output via libxml2

use std::path::Path;

use libxml::parser::Parser;
use libxml::schemas::{SchemaParserContext, SchemaValidationContext};
use libxml::tree::Document;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::xml;

/// Validates output text against an XSD schema file
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate `output` against the schema at `schema_path`.
    ///
    /// Returns `Ok(None)` when valid, or when there is nothing to validate
    /// (no schema, blank output). A failed validation yields the last message
    /// the validator reported. A schema that cannot be loaded, or output that
    /// is not well-formed XML, is an error.
    pub fn validate(&self, output: &str, schema_path: Option<&Path>) -> Result<Option<String>> {
        let Some(schema_path) = schema_path else {
            return Ok(None);
        };
        if output.trim().is_empty() {
            return Ok(None);
        }

        // Parsed first for a positioned message
        xml::parse(output).map_err(|d| PipelineError::OutputParse(d.to_string()))?;

        let mut context = load_schema(schema_path)?;
        let document = parse_output(output)?;

        match context.validate_document(&document) {
            Ok(()) => Ok(None),
            Err(errors) => {
                debug!(count = errors.len(), "schema validation reported errors");
                let message = errors
                    .iter()
                    .rev()
                    .find_map(|e| e.message.as_deref())
                    .map(|m| m.trim().to_string())
                    .unwrap_or_else(|| "Output does not match the schema".to_string());
                Ok(Some(message))
            }
        }
    }
}

fn load_schema(path: &Path) -> Result<SchemaValidationContext> {
    let schema_load = |message: String| PipelineError::SchemaLoad {
        path: path.to_path_buf(),
        message,
    };

    if !path.is_file() {
        return Err(schema_load("file not found".to_string()));
    }
    let path_str = path
        .to_str()
        .ok_or_else(|| schema_load("path is not valid UTF-8".to_string()))?;

    let mut parser = SchemaParserContext::from_file(path_str);
    SchemaValidationContext::from_parser(&mut parser).map_err(|errors| {
        let message = errors
            .iter()
            .filter_map(|e| e.message.as_deref())
            .map(str::trim)
            .last()
            .unwrap_or("schema could not be compiled")
            .to_string();
        schema_load(message)
    })
}

fn parse_output(output: &str) -> Result<Document> {
    Parser::default()
        .parse_string(output)
        .map_err(|e| PipelineError::OutputParse(format!("{:?}", e)))
}
