// src/config/model.rs

use std::ops::Deref;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::{LivenessMode, RenderMethod};

/// Top-level settings as read from a TOML file.
///
/// ```toml
/// [redshift]
/// path = "/usr/bin/redshift"
/// method = "randr"
/// transition = false
///
/// [location]
/// latitude = 50.8476
/// longitude = 4.3428
///
/// [temperature]
/// day = 5700
/// night = 3500
///
/// [brightness]
/// day = 1.0
/// night = 0.8
///
/// [gamma]
/// red = 1.0
/// green = 1.0
/// blue = 1.0
///
/// [supervisor]
/// liveness = "event"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawSettingsFile {
    #[serde(default)]
    pub redshift: RedshiftSection,

    #[serde(default)]
    pub location: LocationSection,

    #[serde(default)]
    pub temperature: TemperatureSection,

    #[serde(default)]
    pub brightness: BrightnessSection,

    #[serde(default)]
    pub gamma: GammaSection,

    #[serde(default)]
    pub supervisor: SupervisorSection,
}

/// `[redshift]` section: where the managed executable lives and how to drive it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RedshiftSection {
    /// Path to the executable. Empty means "not configured yet".
    pub path: PathBuf,

    pub method: RenderMethod,

    /// When set, the managed process is driven by this redshift.conf instead
    /// of the discrete settings below.
    pub config_file: Option<PathBuf>,

    pub enabled_on_start: bool,

    /// `false` adds the no-transition flag.
    pub transition: bool,
}

impl Default for RedshiftSection {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            method: RenderMethod::default(),
            config_file: None,
            enabled_on_start: true,
            transition: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LocationSection {
    pub latitude: f64,
    pub longitude: f64,
}

/// Colour temperature in Kelvin.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TemperatureSection {
    pub day: u32,
    pub night: u32,
}

impl Default for TemperatureSection {
    fn default() -> Self {
        Self {
            day: 6500,
            night: 4500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BrightnessSection {
    pub day: f64,
    pub night: f64,
}

impl Default for BrightnessSection {
    fn default() -> Self {
        Self {
            day: 1.0,
            night: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GammaSection {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl Default for GammaSection {
    fn default() -> Self {
        Self {
            red: 1.0,
            green: 1.0,
            blue: 1.0,
        }
    }
}

impl GammaSection {
    pub fn uniform(value: f64) -> Self {
        Self {
            red: value,
            green: value,
            blue: value,
        }
    }
}

/// `[supervisor]` section: crash detection and restart policy.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SupervisorSection {
    pub liveness: LivenessMode,

    /// Delay before the single liveness check in `poll` mode.
    pub poll_delay_ms: u64,

    /// How many crashes in a row are answered with a restart before giving up.
    pub max_restarts: u32,

    /// Upper bound for the version probe; 0 disables the bound.
    pub probe_timeout_ms: u64,
}

impl Default for SupervisorSection {
    fn default() -> Self {
        Self {
            liveness: LivenessMode::Event,
            poll_delay_ms: 5_000,
            max_restarts: 3,
            probe_timeout_ms: 10_000,
        }
    }
}

/// Validated settings snapshot.
///
/// Read-only input to the argument builder and the controller. Can only be
/// constructed from a [`RawSettingsFile`] via `TryFrom`, which enforces the
/// value ranges.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SettingsSnapshot {
    inner: RawSettingsFile,
}

impl SettingsSnapshot {
    pub(crate) fn new_unchecked(inner: RawSettingsFile) -> Self {
        Self { inner }
    }

    pub fn into_raw(self) -> RawSettingsFile {
        self.inner
    }

    pub fn executable_path(&self) -> &PathBuf {
        &self.inner.redshift.path
    }
}

impl Deref for SettingsSnapshot {
    type Target = RawSettingsFile;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
