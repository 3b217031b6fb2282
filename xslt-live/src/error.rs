//! Error types for the transformation pipeline

use std::path::PathBuf;

use thiserror::Error;
use xform_engine_traits::{EngineError, EngineKind};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Failed to load schema {}: {message}", path.display())]
    SchemaLoad { path: PathBuf, message: String },

    #[error("{0}")]
    OutputParse(String),

    #[error("No engine registered for {0}")]
    EngineNotRegistered(EngineKind),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Message of the innermost error in the `source()` chain
pub fn root_cause_message(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use xform_engine_traits::{Diagnostic, DiagnosticList};

    #[test]
    fn root_cause_of_compile_error_is_diagnostic_text() {
        let list: DiagnosticList = vec![Diagnostic::new("bad tag", 2, 5)].into_iter().collect();
        let err = PipelineError::from(EngineError::compile("Stylesheet failed to compile", list));
        assert_eq!(root_cause_message(&err), "bad tag at line 2, column 5");
    }

    #[test]
    fn root_cause_without_source_is_top_level_message() {
        let err = PipelineError::OutputParse("unexpected end of stream".into());
        assert_eq!(root_cause_message(&err), "unexpected end of stream");
    }
}
