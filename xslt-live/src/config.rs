//! Pipeline configuration
//!
//! Resolved with deterministic precedence: defaults, then an optional TOML
//! file, then environment overrides. The result is validated before use.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use xform_engine_traits::EngineKind;

pub const DEFAULT_QUIET_PERIOD_MS: u64 = 200;
const DEFAULT_LEVEL: &str = "info";

pub const ENV_QUIET_PERIOD_MS: &str = "XSLT_LIVE_QUIET_PERIOD_MS";
pub const ENV_ENGINE: &str = "XSLT_LIVE_ENGINE";
pub const ENV_DISCARD_STALE: &str = "XSLT_LIVE_DISCARD_STALE";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
}

impl ConfigError {
    fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Resolved pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Debounce delay after the last run request
    pub quiet_period_ms: u64,
    /// Engine selected when the coordinator starts
    pub default_engine: EngineKind,
    /// Drop outcomes older than the last published one instead of letting
    /// the last run to complete win
    pub discard_stale_outcomes: bool,
    /// Fallback tracing directive when `XSLT_LIVE_LOG` is unset
    pub log_level: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            quiet_period_ms: DEFAULT_QUIET_PERIOD_MS,
            default_engine: EngineKind::default(),
            discard_stale_outcomes: false,
            log_level: DEFAULT_LEVEL.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    pipeline: Option<TomlPipeline>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlPipeline {
    quiet_period_ms: Option<u64>,
    default_engine: Option<EngineKind>,
    discard_stale_outcomes: Option<bool>,
    log_level: Option<String>,
}

impl PipelineConfig {
    /// Load configuration: defaults, config file, env overrides.
    ///
    /// A missing file is not an error; an unreadable or malformed one is.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = PipelineConfig::default();
        if let Some(path) = path {
            if let Some(parsed) = Self::load_from_file(path)? {
                config.apply(parsed);
            }
        }
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text, without env overrides
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        let mut config = PipelineConfig::default();
        config.apply(parsed);
        config.validate()?;
        Ok(config)
    }

    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }

    fn load_from_file(path: &Path) -> Result<Option<TomlConfig>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(parsed))
    }

    fn apply(&mut self, toml: TomlConfig) {
        if let Some(pipeline) = toml.pipeline {
            if let Some(quiet_period_ms) = pipeline.quiet_period_ms {
                self.quiet_period_ms = quiet_period_ms;
            }
            if let Some(engine) = pipeline.default_engine {
                self.default_engine = engine;
            }
            if let Some(discard) = pipeline.discard_stale_outcomes {
                self.discard_stale_outcomes = discard;
            }
            if let Some(level) = pipeline.log_level {
                self.log_level = level;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(raw) = env_value(ENV_QUIET_PERIOD_MS) {
            self.quiet_period_ms = raw
                .parse()
                .map_err(|_| ConfigError::invalid(ENV_QUIET_PERIOD_MS, format!("'{}' is not a number", raw)))?;
        }
        if let Some(raw) = env_value(ENV_ENGINE) {
            self.default_engine = EngineKind::from_str(&raw)
                .map_err(|e| ConfigError::invalid(ENV_ENGINE, e.to_string()))?;
        }
        if let Some(raw) = env_value(ENV_DISCARD_STALE) {
            self.discard_stale_outcomes = parse_flag(&raw)
                .ok_or_else(|| ConfigError::invalid(ENV_DISCARD_STALE, format!("'{}' is not a boolean", raw)))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.quiet_period_ms == 0 {
            return Err(ConfigError::invalid(
                "pipeline.quiet_period_ms",
                "must be greater than zero",
            ));
        }
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::invalid("pipeline.log_level", "must not be empty"));
        }
        Ok(())
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
