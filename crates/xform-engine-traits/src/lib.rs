//! Core trait abstractions for transformation engines.
//!
//! This crate defines the contract every engine adapter implements so the
//! pipeline can drive XSLT and JSON transformers interchangeably: the
//! [`TransformEngine`] trait, the closed set of [`EngineKind`]s, the ordered
//! [`ParameterSet`] handed to engines and the structured [`EngineError`].

pub mod diagnostic;
pub mod engine;
pub mod error;
pub mod newline;
pub mod params;

pub use diagnostic::{Diagnostic, DiagnosticList};
pub use engine::{EngineKind, TransformEngine, UnknownEngine};
pub use error::{EngineError, EngineErrorKind, Error, Result};
pub use params::{Parameter, ParameterSet};
