// src/config/loader.rs

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::model::{RawSettingsFile, SettingsSnapshot};
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};

/// Environment variable that overrides [`default_settings_path`].
pub const SETTINGS_ENV: &str = "REDSHIFT_TRAY_SETTINGS";

/// Load a settings file from a given path and return the raw `RawSettingsFile`.
///
/// This only performs TOML deserialization; it does **not** perform range
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawSettingsFile> {
    load_with(&RealFileSystem, path.as_ref())
}

/// [`load_from_path`] through the given filesystem.
pub fn load_with(fs: &dyn FileSystem, path: &Path) -> Result<RawSettingsFile> {
    let contents = fs.read_to_string(path)?;

    let settings: RawSettingsFile = toml::from_str(&contents)?;

    Ok(settings)
}

/// Load a settings file from path and range-check it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<SettingsSnapshot> {
    let raw = load_from_path(&path)?;
    let settings = SettingsSnapshot::try_from(raw)?;
    Ok(settings)
}

/// Like [`load_and_validate`], but a missing file yields the defaults.
///
/// A first start has no settings yet; the executable path then stays empty
/// and validation reports it as missing instead of failing the load.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<SettingsSnapshot> {
    load_or_default_with(&RealFileSystem, path.as_ref())
}

/// [`load_or_default`] through the given filesystem.
pub fn load_or_default_with(fs: &dyn FileSystem, path: &Path) -> Result<SettingsSnapshot> {
    if !fs.exists(path) {
        info!(path = %path.display(), "settings file not found; using defaults");
        return SettingsSnapshot::try_from(RawSettingsFile::default());
    }
    let raw = load_with(fs, path)?;
    SettingsSnapshot::try_from(raw)
}

/// Serialize settings back to TOML through the given filesystem.
pub fn save_settings(fs: &dyn FileSystem, path: &Path, settings: &RawSettingsFile) -> Result<()> {
    let text = toml::to_string(settings)?;
    fs.write(path, text.as_bytes())?;
    Ok(())
}

/// Resolve the settings path: `REDSHIFT_TRAY_SETTINGS` if set, otherwise
/// `RedshiftTray.toml` in the current working directory.
pub fn default_settings_path() -> PathBuf {
    std::env::var_os(SETTINGS_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("RedshiftTray.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    const PATH: &str = "/home/user/RedshiftTray.toml";

    #[test]
    fn loads_through_the_given_filesystem() {
        let fs = MockFileSystem::new();
        fs.add_file(PATH, "[temperature]\nday = 6000\n");

        let settings = load_or_default_with(&fs, Path::new(PATH)).unwrap();
        assert_eq!(settings.into_raw().temperature.day, 6000);
    }

    #[test]
    fn removed_file_falls_back_to_defaults() {
        let fs = MockFileSystem::new();
        fs.add_file(PATH, "[temperature]\nday = 6000\n");
        fs.remove_file(PATH);

        let settings = load_or_default_with(&fs, Path::new(PATH)).unwrap();
        let defaults = SettingsSnapshot::try_from(RawSettingsFile::default()).unwrap();
        assert_eq!(settings.into_raw().temperature.day, defaults.into_raw().temperature.day);
    }

    #[test]
    fn saved_settings_load_back() {
        let fs = MockFileSystem::new();
        let mut raw = RawSettingsFile::default();
        raw.temperature.night = 3200;
        save_settings(&fs, Path::new(PATH), &raw).unwrap();

        assert_eq!(load_with(&fs, Path::new(PATH)).unwrap().temperature.night, 3200);
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let fs = MockFileSystem::new();
        assert!(load_with(&fs, Path::new(PATH)).is_err());
    }
}
