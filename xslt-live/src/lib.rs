//! xslt-live: debounced, multi-engine transformation pipeline
//!
//! Drives live previews for a transform editor. The input document, the
//! transform document, stylesheet parameters, the selected engine and an
//! optional output schema are held by a [`TransformCoordinator`]. Every edit
//! re-arms a debounce timer; once edits go quiet the selected engine runs off
//! the caller's thread, the output is validated, and one [`ViewState`] update
//! is published.
//!
//! Engines:
//! - `standard-xslt`: xrust
//! - `native-xslt`: libxslt
//! - `json-transform`: a JSON template language ([`json`])
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use xslt_live::{EngineRegistry, PipelineConfig, TransformCoordinator};
//!
//! let config = PipelineConfig::load(None)?;
//! xslt_live::logging::init(&config.log_level);
//! let coordinator = TransformCoordinator::new(EngineRegistry::with_defaults(), config)?;
//! let mut view = coordinator.subscribe();
//! coordinator.set_input_text("<r/>");
//! coordinator.set_transform_text(stylesheet);
//! view.changed().await?;
//! println!("{}", view.borrow().output);
//! ```

pub mod config;
pub mod coordinator;
pub mod document;
pub mod error;
pub mod logging;
pub mod params;
pub mod registry;
pub mod schema;
pub mod state;

pub mod engine_json;
pub mod engine_libxslt;
pub mod engine_xrust;
pub mod json;

mod stylesheet;
mod xml;

pub use config::{ConfigError, PipelineConfig};
pub use coordinator::TransformCoordinator;
pub use document::TransformDocument;
pub use error::{PipelineError, Result};
pub use params::{extract_include_hrefs, extract_parameter_names};
pub use registry::{EngineRegistry, SharedEngine};
pub use schema::SchemaValidator;
pub use state::{FailureKind, RunFinished, TransformOutcome, TransformRequest, ViewState};

pub use engine_json::JsonTransformEngine;
pub use engine_libxslt::LibxsltEngine;
pub use engine_xrust::XrustEngine;

// Re-export the engine contract
pub use xform_engine_traits::{
    Diagnostic, DiagnosticList, EngineError, EngineErrorKind, EngineKind, Parameter, ParameterSet,
    TransformEngine,
};
