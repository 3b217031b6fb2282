//! Error types for engine operations

use crate::diagnostic::DiagnosticList;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Alias used by adapters and the pipeline
pub type EngineError = Error;

/// Coarse classification of an engine failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorKind {
    /// The transform document could not be compiled
    Compile,
    /// The compiled transform failed against the input
    Execution,
}

/// Unified error type for all engine operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transform document failed to compile. When diagnostics were
    /// collected they are the source, so the root cause of the error is the
    /// joined diagnostic text.
    #[error("{message}")]
    Compile {
        message: String,
        #[source]
        diagnostics: Option<DiagnosticList>,
    },

    /// Compiled transform raised while running
    #[error("{0}")]
    Execution(String),

    /// Input document rejected by the engine
    #[error("{0}")]
    InvalidInput(String),
}

impl Error {
    /// Create a compile error carrying structured diagnostics
    pub fn compile<S: Into<String>>(msg: S, diagnostics: DiagnosticList) -> Self {
        Error::Compile {
            message: msg.into(),
            diagnostics: (!diagnostics.is_empty()).then_some(diagnostics),
        }
    }

    /// Create a compile error from an engine message with no diagnostics
    pub fn compile_raw<S: Into<String>>(msg: S) -> Self {
        Error::Compile {
            message: msg.into(),
            diagnostics: None,
        }
    }

    /// Create a new execution error
    pub fn execution<S: Into<String>>(msg: S) -> Self {
        Error::Execution(msg.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInput(msg.into())
    }

    pub fn kind(&self) -> EngineErrorKind {
        match self {
            Error::Compile { .. } => EngineErrorKind::Compile,
            Error::Execution(_) | Error::InvalidInput(_) => EngineErrorKind::Execution,
        }
    }

    /// Diagnostics attached to a compile error, empty otherwise
    pub fn diagnostics(&self) -> &[crate::Diagnostic] {
        match self {
            Error::Compile {
                diagnostics: Some(diagnostics),
                ..
            } => diagnostics.as_slice(),
            _ => &[],
        }
    }
}
