// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Outcome of checking a candidate managed executable.
///
/// `MissingPath` is only produced when deferred configuration is allowed and
/// no path has been configured yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutableStatus {
    Ok,
    NotFound,
    WrongApplication,
    WrongVersion,
    MissingPath,
}

impl ExecutableStatus {
    pub fn is_ok(self) -> bool {
        self == ExecutableStatus::Ok
    }

    /// User-facing explanation, suitable for a settings dialog.
    pub fn describe(self) -> String {
        match self {
            ExecutableStatus::Ok => "Redshift executable is suitable.".to_string(),
            ExecutableStatus::NotFound => "Invalid path to Redshift executable.".to_string(),
            ExecutableStatus::WrongApplication => {
                "Executable seems not to be a valid Redshift binary.".to_string()
            }
            ExecutableStatus::WrongVersion => format!(
                "The Redshift version is too old. Please use at least version {}.",
                crate::version::MIN_REDSHIFT_VERSION
            ),
            ExecutableStatus::MissingPath => {
                "No Redshift executable configured yet.".to_string()
            }
        }
    }
}

/// Outcome of checking an external redshift configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigStatus {
    /// A file with all mandatory markers.
    Ok,
    /// No config file configured; defaults apply.
    NotSet,
    NotFound,
    MissingMandatoryField,
}

impl ConfigStatus {
    /// `NotSet` is acceptable: the managed process falls back to its defaults.
    pub fn is_acceptable(self) -> bool {
        matches!(self, ConfigStatus::Ok | ConfigStatus::NotSet)
    }
}

/// Gamma adjustment method passed to the managed process via `-m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMethod {
    Wingdi,
    Randr,
    Vidmode,
    Drm,
    Quartz,
    Dummy,
}

impl RenderMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            RenderMethod::Wingdi => "wingdi",
            RenderMethod::Randr => "randr",
            RenderMethod::Vidmode => "vidmode",
            RenderMethod::Drm => "drm",
            RenderMethod::Quartz => "quartz",
            RenderMethod::Dummy => "dummy",
        }
    }
}

impl Default for RenderMethod {
    fn default() -> Self {
        if cfg!(windows) {
            RenderMethod::Wingdi
        } else if cfg!(target_os = "macos") {
            RenderMethod::Quartz
        } else {
            RenderMethod::Randr
        }
    }
}

impl fmt::Display for RenderMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wingdi" => Ok(RenderMethod::Wingdi),
            "randr" => Ok(RenderMethod::Randr),
            "vidmode" => Ok(RenderMethod::Vidmode),
            "drm" => Ok(RenderMethod::Drm),
            "quartz" => Ok(RenderMethod::Quartz),
            "dummy" => Ok(RenderMethod::Dummy),
            other => Err(format!(
                "invalid adjustment method: {other} (expected wingdi, randr, vidmode, drm, quartz or dummy)"
            )),
        }
    }
}

/// How the supervisor notices that a continuous instance went away.
///
/// - `Event`: a monitor task awaits the process exit and reports it at once.
/// - `Poll`: a single deferred liveness check fires once after a fixed delay.
///   An exit after that check goes unreported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LivenessMode {
    Event,
    Poll,
}

impl Default for LivenessMode {
    fn default() -> Self {
        LivenessMode::Event
    }
}
