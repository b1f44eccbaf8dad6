// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrayError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    #[error("failed to launch '{}': {source}", .path.display())]
    Launch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{}' did not exit within {timeout:?}", .path.display())]
    Timeout { path: PathBuf, timeout: Duration },

    #[error("no executable path configured; deferred configuration is disabled")]
    EmptyExecutablePath,

    #[error("a managed process instance is still active; stop it before starting another")]
    InstanceStillActive,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TrayError>;
