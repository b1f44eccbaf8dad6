// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `redshift-tray`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "redshift-tray",
    version,
    about = "Keep redshift running with your settings, restart it when it crashes.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the settings file (TOML).
    ///
    /// Default: `REDSHIFT_TRAY_SETTINGS`, or `RedshiftTray.toml` in the
    /// current working directory.
    #[arg(long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `REDSHIFT_TRAY_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate the executable and the redshift.conf, print the verdict and exit.
    #[arg(long)]
    pub check: bool,

    /// Print the argument list redshift would be started with and exit.
    #[arg(long)]
    pub print_args: bool,

    /// Reset the screen to its default colours and exit.
    #[arg(long)]
    pub reset: bool,

    /// Use the dummy adjustment method (nothing is applied to the screen).
    #[arg(long)]
    pub dummy: bool,

    /// Import location, temperatures etc. from a redshift.conf into the
    /// settings file before doing anything else.
    #[arg(long, value_name = "PATH")]
    pub import_config: Option<PathBuf>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

pub fn parse() -> CliArgs {
    CliArgs::parse()
}
