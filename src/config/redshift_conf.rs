// src/config/redshift_conf.rs

//! External redshift.conf support.
//!
//! Two operations on the line-oriented redshift configuration format:
//!
//! - [`validate_config`]: a permissive line-prefix scan for the mandatory
//!   markers. It is *not* a structured parse: a marker counts wherever it
//!   appears, even inside an unrelated section.
//! - [`import_redshift_config`]: pull the values the tray knows about out of
//!   a redshift.conf and merge them onto existing settings.

use std::path::Path;

use crate::config::model::{GammaSection, RawSettingsFile};
use crate::config::validate::parse_coordinate;
use crate::fs::FileSystem;
use crate::log_sink::LogSink;
use crate::types::{ConfigStatus, RenderMethod};

/// Section holding the manual location provider's coordinates.
pub const SECTION_MARKER: &str = "[manual]";
pub const LATITUDE_MARKER: &str = "lat=";
pub const LONGITUDE_MARKER: &str = "lon=";

const COMMENT_CHAR: char = ';';

/// Check that `path` is a usable redshift.conf.
///
/// An empty path is `NotSet` (the managed process then uses its defaults).
pub fn validate_config(fs: &dyn FileSystem, log: &LogSink, path: &Path) -> ConfigStatus {
    log.info("Checking redshift config");

    if path.as_os_str().is_empty() {
        log.info("No redshift config set");
        return ConfigStatus::NotSet;
    }

    if !fs.is_file(path) {
        log.error(format!("Redshift config '{}' not found", path.display()));
        return ConfigStatus::NotFound;
    }

    let contents = match fs.read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            log.error(format!(
                "Redshift config '{}' could not be read: {e:#}",
                path.display()
            ));
            return ConfigStatus::NotFound;
        }
    };

    let mut has_section = false;
    let mut has_lat = false;
    let mut has_lon = false;

    for line in contents.lines() {
        has_section |= line.starts_with(SECTION_MARKER);
        has_lat |= line.starts_with(LATITUDE_MARKER);
        has_lon |= line.starts_with(LONGITUDE_MARKER);
    }

    let missing: Vec<&str> = [
        (has_section, SECTION_MARKER),
        (has_lat, LATITUDE_MARKER),
        (has_lon, LONGITUDE_MARKER),
    ]
    .into_iter()
    .filter(|(present, _)| !present)
    .map(|(_, marker)| marker)
    .collect();

    if !missing.is_empty() {
        log.error(format!(
            "Redshift config is missing mandatory entries: {}",
            missing.join(", ")
        ));
        return ConfigStatus::MissingMandatoryField;
    }

    log.info("Redshift config is suitable");
    ConfigStatus::Ok
}

/// Merge the values found in a redshift.conf onto `base`.
///
/// Tolerates both `brightness=` and the split `brightness-day=` /
/// `brightness-night=` form, and both a scalar `gamma=` and the
/// `gamma=r:g:b` triplet. Unknown keys are ignored; malformed values are
/// skipped with an error entry. The result is not range-checked.
pub fn import_redshift_config(text: &str, base: RawSettingsFile, log: &LogSink) -> RawSettingsFile {
    let mut settings = base;

    for raw_line in text.lines() {
        let line = match raw_line.split_once(COMMENT_CHAR) {
            Some((before, _)) => before,
            None => raw_line,
        }
        .trim();

        if line.is_empty() || line.starts_with('[') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        if !apply_key(&mut settings, key, value) {
            log.error(format!("Ignoring malformed value '{value}' for '{key}'"));
        }
    }

    log.info("Imported redshift config");
    settings
}

/// Returns `false` when the key is known but its value does not parse.
fn apply_key(settings: &mut RawSettingsFile, key: &str, value: &str) -> bool {
    match key {
        "lat" => set(parse_coordinate(value).ok(), |v| settings.location.latitude = v),
        "lon" => set(parse_coordinate(value).ok(), |v| settings.location.longitude = v),
        "temp-day" => set(value.parse().ok(), |v| settings.temperature.day = v),
        "temp-night" => set(value.parse().ok(), |v| settings.temperature.night = v),
        "transition" | "fade" => set(parse_flag(value), |v| settings.redshift.transition = v),
        "brightness" => set(parse_decimal(value), |v| {
            settings.brightness.day = v;
            settings.brightness.night = v;
        }),
        "brightness-day" => set(parse_decimal(value), |v| settings.brightness.day = v),
        "brightness-night" => set(parse_decimal(value), |v| settings.brightness.night = v),
        "gamma" => set(parse_gamma(value), |v| settings.gamma = v),
        "adjustment-method" => set(value.parse::<RenderMethod>().ok(), |v| {
            settings.redshift.method = v
        }),
        _ => true,
    }
}

fn set<T>(parsed: Option<T>, apply: impl FnOnce(T)) -> bool {
    match parsed {
        Some(v) => {
            apply(v);
            true
        }
        None => false,
    }
}

fn parse_decimal(value: &str) -> Option<f64> {
    parse_coordinate(value).ok()
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn parse_gamma(value: &str) -> Option<GammaSection> {
    let channels: Vec<&str> = value.split(':').collect();
    match channels.as_slice() {
        [all] => parse_decimal(all).map(GammaSection::uniform),
        [r, g, b] => Some(GammaSection {
            red: parse_decimal(r)?,
            green: parse_decimal(g)?,
            blue: parse_decimal(b)?,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use crate::log_sink::LogCategory;

    const CONF: &str = "\
; Global settings
[redshift]
temp-day=5700
temp-night=3500
transition=0
brightness-day=1.0
brightness-night=0.8 ; dimmer at night
gamma=0.9:0.8:0.7
adjustment-method=randr
location-provider=manual

[manual]
lat=50.8476
lon=4.3428
";

    #[test]
    fn empty_path_is_not_set_and_does_not_touch_the_filesystem() {
        let fs = MockFileSystem::new();
        let log = LogSink::new();
        assert_eq!(validate_config(&fs, &log, Path::new("")), ConfigStatus::NotSet);
    }

    #[test]
    fn missing_file_is_not_found() {
        let fs = MockFileSystem::new();
        let log = LogSink::new();
        assert_eq!(
            validate_config(&fs, &log, Path::new("redshift.conf")),
            ConfigStatus::NotFound
        );
        assert!(log.contains(LogCategory::Error, "not found"));
    }

    #[test]
    fn complete_config_is_ok() {
        let fs = MockFileSystem::new();
        fs.add_file("redshift.conf", CONF);
        let log = LogSink::new();
        assert_eq!(
            validate_config(&fs, &log, Path::new("redshift.conf")),
            ConfigStatus::Ok
        );
    }

    #[test]
    fn missing_longitude_is_reported() {
        let fs = MockFileSystem::new();
        fs.add_file("redshift.conf", "[manual]\nlat=50.8\n");
        let log = LogSink::new();
        assert_eq!(
            validate_config(&fs, &log, Path::new("redshift.conf")),
            ConfigStatus::MissingMandatoryField
        );
        assert!(log.contains(LogCategory::Error, "lon="));
    }

    #[test]
    fn markers_count_in_any_section() {
        let fs = MockFileSystem::new();
        fs.add_file("redshift.conf", "[redshift]\nlat=1\nlon=2\n[manual]\n");
        let log = LogSink::new();
        assert_eq!(
            validate_config(&fs, &log, Path::new("redshift.conf")),
            ConfigStatus::Ok
        );
    }

    #[test]
    fn indented_marker_does_not_count() {
        let fs = MockFileSystem::new();
        fs.add_file("redshift.conf", "[manual]\n  lat=1\nlon=2\n");
        let log = LogSink::new();
        assert_eq!(
            validate_config(&fs, &log, Path::new("redshift.conf")),
            ConfigStatus::MissingMandatoryField
        );
    }

    #[test]
    fn import_reads_split_brightness_and_gamma_triplet() {
        let log = LogSink::new();
        let settings = import_redshift_config(CONF, RawSettingsFile::default(), &log);

        assert_eq!(settings.location.latitude, 50.8476);
        assert_eq!(settings.location.longitude, 4.3428);
        assert_eq!(settings.temperature.day, 5700);
        assert_eq!(settings.temperature.night, 3500);
        assert!(!settings.redshift.transition);
        assert_eq!(settings.brightness.day, 1.0);
        assert_eq!(settings.brightness.night, 0.8);
        assert_eq!(settings.gamma.red, 0.9);
        assert_eq!(settings.gamma.green, 0.8);
        assert_eq!(settings.gamma.blue, 0.7);
        assert_eq!(settings.redshift.method, RenderMethod::Randr);
    }

    #[test]
    fn import_reads_unified_brightness_and_scalar_gamma() {
        let log = LogSink::new();
        let settings = import_redshift_config(
            "brightness=0.7\ngamma=0.8\nfade=1\n",
            RawSettingsFile::default(),
            &log,
        );

        assert_eq!(settings.brightness.day, 0.7);
        assert_eq!(settings.brightness.night, 0.7);
        assert_eq!(settings.gamma, GammaSection::uniform(0.8));
        assert!(settings.redshift.transition);
    }

    #[test]
    fn import_skips_malformed_values_and_keeps_base() {
        let log = LogSink::new();
        let mut base = RawSettingsFile::default();
        base.temperature.day = 6000;

        let settings = import_redshift_config(
            "temp-day=warm\ngamma=1:2\nunknown-key=whatever\n",
            base.clone(),
            &log,
        );

        assert_eq!(settings.temperature.day, 6000);
        assert_eq!(settings.gamma, base.gamma);
        assert!(log.contains(LogCategory::Error, "temp-day"));
        assert!(log.contains(LogCategory::Error, "gamma"));
        assert!(!log.contains(LogCategory::Error, "unknown-key"));
    }
}
