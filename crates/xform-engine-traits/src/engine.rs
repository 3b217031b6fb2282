//! Transformation engine abstraction trait

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::params::ParameterSet;

/// Identifies one of the registered engine adapters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    /// Standards-conformant XSLT processor
    #[default]
    StandardXslt,
    /// The platform's own XSLT library
    NativeXslt,
    /// JSON-to-JSON transformer
    JsonTransform,
}

impl EngineKind {
    /// Every engine kind, in presentation order
    pub const ALL: [EngineKind; 3] = [
        EngineKind::StandardXslt,
        EngineKind::NativeXslt,
        EngineKind::JsonTransform,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::StandardXslt => "standard-xslt",
            EngineKind::NativeXslt => "native-xslt",
            EngineKind::JsonTransform => "json-transform",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown engine identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown engine '{0}', expected one of: standard-xslt, native-xslt, json-transform")]
pub struct UnknownEngine(pub String);

impl FromStr for EngineKind {
    type Err = UnknownEngine;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard-xslt" | "standard" => Ok(EngineKind::StandardXslt),
            "native-xslt" | "native" => Ok(EngineKind::NativeXslt),
            "json-transform" | "json" => Ok(EngineKind::JsonTransform),
            other => Err(UnknownEngine(other.to_string())),
        }
    }
}

/// Trait for transformation engines.
///
/// Implementations are blocking and are driven from a background thread, so
/// they must be shareable across threads. Engines that hold non-`Send`
/// library state should build it inside [`TransformEngine::transform`].
pub trait TransformEngine: Send + Sync {
    /// The selection this engine serves
    fn kind(&self) -> EngineKind;

    /// Human readable engine name, used in logs
    fn name(&self) -> &'static str;

    /// Whether external parameters are honoured
    fn supports_parameters(&self) -> bool {
        true
    }

    /// Run `transform` against `input`, returning the serialized output
    fn transform(&self, input: &str, transform: &str, params: &ParameterSet) -> Result<String>;
}
