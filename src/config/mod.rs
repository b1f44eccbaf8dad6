// src/config/mod.rs

//! Settings handling.
//!
//! - [`model`]: the TOML settings file and the validated [`SettingsSnapshot`].
//! - [`validate`]: range checks and invariant-decimal coordinate parsing.
//! - [`loader`]: reading / writing the settings file.
//! - [`redshift_conf`]: checks and imports external redshift.conf files.

pub mod loader;
pub mod model;
pub mod redshift_conf;
pub mod validate;

pub use loader::{
    default_settings_path, load_and_validate, load_or_default, load_or_default_with, load_with,
    save_settings,
};
pub use model::{
    BrightnessSection, GammaSection, LocationSection, RawSettingsFile, RedshiftSection,
    SettingsSnapshot, SupervisorSection, TemperatureSection,
};
pub use redshift_conf::{import_redshift_config, validate_config};
pub use validate::{parse_coordinate, parse_location};
