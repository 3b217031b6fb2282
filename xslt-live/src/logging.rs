//! Tracing subscriber setup

use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::prelude::*;

/// Environment variable holding a tracing filter directive
pub const LOG_ENV: &str = "XSLT_LIVE_LOG";

static LOGGER_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Install a fmt subscriber filtered by `XSLT_LIVE_LOG`, or `default_level`
/// when the variable is unset or invalid.
///
/// Safe to call more than once: later calls, or a subscriber installed by
/// the host application, leave the existing one in place. Returns whether
/// this call installed the subscriber.
pub fn init(default_level: &str) -> bool {
    if LOGGER_INITIALIZED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return false;
    }

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(filter)
        .try_init()
        .is_ok();

    if !installed {
        tracing::debug!("global tracing subscriber already set, keeping it");
    }
    installed
}
