//! Integration tests for pipeline configuration

use std::env;
use std::fs;

use xslt_live::config::{ENV_DISCARD_STALE, ENV_ENGINE, ENV_QUIET_PERIOD_MS};
use xslt_live::{ConfigError, EngineKind, PipelineConfig};

#[test]
fn defaults() {
    let config = PipelineConfig::default();
    assert_eq!(config.quiet_period_ms, 200);
    assert_eq!(config.default_engine, EngineKind::StandardXslt);
    assert!(!config.discard_stale_outcomes, "last completed run wins by default");
    assert_eq!(config.log_level, "info");
}

#[test]
fn toml_overrides_defaults() {
    let config = PipelineConfig::from_toml_str(
        r#"
[pipeline]
quiet_period_ms = 50
default_engine = "json-transform"
discard_stale_outcomes = true
"#,
    )
    .unwrap();
    assert_eq!(config.quiet_period_ms, 50);
    assert_eq!(config.default_engine, EngineKind::JsonTransform);
    assert!(config.discard_stale_outcomes);
    assert_eq!(config.log_level, "info", "unset keys keep their default");
}

#[test]
fn empty_toml_is_default() {
    assert_eq!(PipelineConfig::from_toml_str("").unwrap(), PipelineConfig::default());
}

#[test]
fn zero_quiet_period_rejected() {
    let err = PipelineConfig::from_toml_str("[pipeline]\nquiet_period_ms = 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }), "got {:?}", err);
}

#[test]
fn unknown_keys_rejected() {
    let err = PipelineConfig::from_toml_str("[pipeline]\nquiet = 3\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got {:?}", err);
}

#[test]
fn unknown_engine_rejected() {
    assert!(PipelineConfig::from_toml_str("[pipeline]\ndefault_engine = \"fastest\"\n").is_err());
}

// The only test touching the process environment
#[test]
fn load_applies_file_then_env() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("xslt-live.toml");
    fs::write(
        &path,
        "[pipeline]\nquiet_period_ms = 75\ndefault_engine = \"native-xslt\"\nlog_level = \"debug\"\n",
    )
    .unwrap();

    env::remove_var(ENV_QUIET_PERIOD_MS);
    env::remove_var(ENV_ENGINE);
    env::remove_var(ENV_DISCARD_STALE);

    let config = PipelineConfig::load(Some(&path)).unwrap();
    assert_eq!(config.quiet_period_ms, 75);
    assert_eq!(config.default_engine, EngineKind::NativeXslt);
    assert_eq!(config.log_level, "debug");

    let missing = PipelineConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
    assert_eq!(missing, PipelineConfig::default(), "missing file falls back to defaults");

    env::set_var(ENV_QUIET_PERIOD_MS, "10");
    env::set_var(ENV_ENGINE, "json");
    env::set_var(ENV_DISCARD_STALE, "yes");
    let config = PipelineConfig::load(Some(&path)).unwrap();
    assert_eq!(config.quiet_period_ms, 10, "env wins over the file");
    assert_eq!(config.default_engine, EngineKind::JsonTransform);
    assert!(config.discard_stale_outcomes);
    assert_eq!(config.quiet_period().as_millis(), 10);

    env::set_var(ENV_QUIET_PERIOD_MS, "soon");
    assert!(PipelineConfig::load(None).is_err());

    env::remove_var(ENV_QUIET_PERIOD_MS);
    env::remove_var(ENV_ENGINE);
    env::remove_var(ENV_DISCARD_STALE);
}
