//! Engine registry with runtime selection
//!
//! Maps every [`EngineKind`] to the adapter serving it. The coordinator only
//! ever asks for "the adapter for selection X", so a new adapter is added by
//! registering it here.

use std::collections::HashMap;
use std::sync::Arc;

use xform_engine_traits::{EngineKind, TransformEngine};

use crate::engine_json::JsonTransformEngine;
use crate::engine_libxslt::LibxsltEngine;
use crate::engine_xrust::XrustEngine;
use crate::error::{PipelineError, Result};

/// Shared handle to a registered engine
pub type SharedEngine = Arc<dyn TransformEngine>;

#[derive(Clone, Default)]
pub struct EngineRegistry {
    engines: HashMap<EngineKind, SharedEngine>,
}

impl EngineRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the xrust, libxslt and JSON template adapters
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(XrustEngine::new()));
        registry.register(Arc::new(LibxsltEngine::new()));
        registry.register(Arc::new(JsonTransformEngine::new()));
        registry
    }

    /// Register `engine` under its own kind, replacing any previous adapter
    pub fn register(&mut self, engine: SharedEngine) -> Option<SharedEngine> {
        self.engines.insert(engine.kind(), engine)
    }

    /// The adapter for `kind`
    pub fn get(&self, kind: EngineKind) -> Result<SharedEngine> {
        self.engines
            .get(&kind)
            .cloned()
            .ok_or(PipelineError::EngineNotRegistered(kind))
    }

    pub fn contains(&self, kind: EngineKind) -> bool {
        self.engines.contains_key(&kind)
    }

    /// Registered kinds in presentation order
    pub fn kinds(&self) -> Vec<EngineKind> {
        EngineKind::ALL
            .into_iter()
            .filter(|kind| self.engines.contains_key(kind))
            .collect()
    }
}

impl std::fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self
            .kinds()
            .into_iter()
            .filter_map(|kind| self.engines.get(&kind).map(|e| (kind, e.name())))
            .collect();
        f.debug_struct("EngineRegistry").field("engines", &names).finish()
    }
}
