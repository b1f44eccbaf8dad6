// src/logging.rs

//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! Filter priority:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `REDSHIFT_TRAY_LOG` environment variable, any `EnvFilter` directive
//!    (e.g. "debug" or "redshift_tray::exec=trace,info")
//! 3. default to `info`
//!
//! Everything goes to STDERR; stdout is reserved for `--check` and
//! `--print-args` output. The user-visible log (see [`crate::log_sink`]) is
//! mirrored here under the `redshift_tray::log` target.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "REDSHIFT_TRAY_LOG";

/// Initialise the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(level) => EnvFilter::new(level.as_filter()),
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}
