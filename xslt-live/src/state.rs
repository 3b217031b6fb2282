//! Run requests, outcomes and the published view state

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use xform_engine_traits::{EngineErrorKind, EngineKind, ParameterSet};

use crate::error::{root_cause_message, PipelineError};

/// Immutable snapshot of everything one run needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformRequest {
    /// Monotonically increasing per coordinator
    pub sequence: u64,
    pub input_text: String,
    pub transform_text: String,
    pub parameters: ParameterSet,
    pub engine: EngineKind,
    pub schema_path: Option<PathBuf>,
}

impl TransformRequest {
    /// Blank transforms are not run at all
    pub fn is_empty_transform(&self) -> bool {
        self.transform_text.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    Compile,
    Execution,
    SchemaLoad,
    OutputParse,
    Internal,
}

/// Result of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransformOutcome {
    Success {
        output: String,
        /// Non-fatal schema diagnostic, published next to the output
        validation_message: Option<String>,
    },
    Failure { kind: FailureKind, message: String },
}

impl TransformOutcome {
    pub fn success(output: String, validation_message: Option<String>) -> Self {
        TransformOutcome::Success {
            output,
            validation_message,
        }
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        TransformOutcome::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TransformOutcome::Success { .. })
    }
}

impl From<PipelineError> for TransformOutcome {
    /// Failure carrying the root cause message of `err`
    fn from(err: PipelineError) -> Self {
        let kind = match &err {
            PipelineError::Engine(e) => match e.kind() {
                EngineErrorKind::Compile => FailureKind::Compile,
                EngineErrorKind::Execution => FailureKind::Execution,
            },
            PipelineError::SchemaLoad { .. } => FailureKind::SchemaLoad,
            PipelineError::OutputParse(_) => FailureKind::OutputParse,
            _ => FailureKind::Internal,
        };
        TransformOutcome::failure(kind, root_cause_message(&err))
    }
}

/// What observers see. Replaced as a whole on every publish, so output and
/// errors always come from the same run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub output: String,
    pub errors: String,
    pub completed_runs: u64,
    /// Sequence of the run that produced this state
    pub last_sequence: Option<u64>,
}

impl ViewState {
    pub fn errors_exist(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Fold an outcome into the view: failures clear the output, validation
    /// diagnostics keep it.
    pub fn apply(&mut self, sequence: u64, outcome: &TransformOutcome) {
        match outcome {
            TransformOutcome::Success {
                output,
                validation_message,
            } => {
                self.output = output.clone();
                self.errors = validation_message.clone().unwrap_or_default();
            }
            TransformOutcome::Failure { message, .. } => {
                self.output.clear();
                self.errors = message.clone();
            }
        }
        self.completed_runs += 1;
        self.last_sequence = Some(sequence);
    }
}

/// Emitted after every published outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFinished {
    pub sequence: u64,
    pub engine: EngineKind,
    pub succeeded: bool,
    pub completed_at: DateTime<Utc>,
}
