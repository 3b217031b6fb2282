//! JSON transform engine adapter (JSON-Transform)
//!
//! Input is a JSON document, the transform a JSON template (see
//! [`crate::json`]). External parameters are not part of the language and
//! are ignored. Output is pretty-printed JSON.

use xform_engine_traits::{EngineError, EngineKind, ParameterSet, Result, TransformEngine};

use crate::json;

/// JSON template engine wrapper
pub struct JsonTransformEngine;

impl Default for JsonTransformEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonTransformEngine {
    pub fn new() -> Self {
        Self
    }
}

impl TransformEngine for JsonTransformEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::JsonTransform
    }

    fn name(&self) -> &'static str {
        "json-transform"
    }

    fn supports_parameters(&self) -> bool {
        false
    }

    fn transform(&self, input: &str, transform: &str, _params: &ParameterSet) -> Result<String> {
        let value = json::transform(input, transform)?;
        serde_json::to_string_pretty(&value).map_err(|e| EngineError::execution(e.to_string()))
    }
}
