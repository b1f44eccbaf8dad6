#![allow(dead_code)]

use std::path::Path;

use redshift_tray::config::{GammaSection, RawSettingsFile, SettingsSnapshot};
use redshift_tray::types::{LivenessMode, RenderMethod};

/// Builder for `SettingsSnapshot` to simplify test setup.
pub struct SettingsBuilder {
    settings: RawSettingsFile,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self {
            settings: RawSettingsFile::default(),
        }
    }

    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.settings.redshift.path = path.as_ref().to_path_buf();
        self
    }

    pub fn with_method(mut self, method: RenderMethod) -> Self {
        self.settings.redshift.method = method;
        self
    }

    pub fn with_config_file(mut self, path: impl AsRef<Path>) -> Self {
        self.settings.redshift.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.settings.location.latitude = latitude;
        self.settings.location.longitude = longitude;
        self
    }

    pub fn with_temperature(mut self, day: u32, night: u32) -> Self {
        self.settings.temperature.day = day;
        self.settings.temperature.night = night;
        self
    }

    pub fn with_brightness(mut self, day: f64, night: f64) -> Self {
        self.settings.brightness.day = day;
        self.settings.brightness.night = night;
        self
    }

    pub fn with_gamma(mut self, red: f64, green: f64, blue: f64) -> Self {
        self.settings.gamma = GammaSection { red, green, blue };
        self
    }

    pub fn with_transition(mut self, transition: bool) -> Self {
        self.settings.redshift.transition = transition;
        self
    }

    pub fn enabled_on_start(mut self, enabled: bool) -> Self {
        self.settings.redshift.enabled_on_start = enabled;
        self
    }

    pub fn with_liveness(mut self, mode: LivenessMode, poll_delay_ms: u64) -> Self {
        self.settings.supervisor.liveness = mode;
        self.settings.supervisor.poll_delay_ms = poll_delay_ms;
        self
    }

    pub fn with_max_restarts(mut self, max_restarts: u32) -> Self {
        self.settings.supervisor.max_restarts = max_restarts;
        self
    }

    pub fn raw(self) -> RawSettingsFile {
        self.settings
    }

    pub fn build(self) -> SettingsSnapshot {
        SettingsSnapshot::try_from(self.settings)
            .expect("Failed to build valid settings from builder")
    }
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
