// tests/settings_files.rs

use std::io::Write;

use tempfile::{tempdir, NamedTempFile};

use redshift_tray::config::{
    import_redshift_config, load_and_validate, load_or_default, save_settings, validate_config,
    RawSettingsFile,
};
use redshift_tray::errors::TrayError;
use redshift_tray::fs::RealFileSystem;
use redshift_tray::log_sink::{LogCategory, LogSink};
use redshift_tray::types::{ConfigStatus, LivenessMode, RenderMethod};
use redshift_tray_test_utils::builders::SettingsBuilder;

#[test]
fn full_settings_file_is_loaded() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[redshift]
path = "/usr/bin/redshift"
method = "randr"
transition = false

[location]
latitude = 50.8476
longitude = 4.3428

[temperature]
day = 5700
night = 3500

[brightness]
day = 1.0
night = 0.8

[supervisor]
liveness = "poll"
poll_delay_ms = 250
"#
    )
    .unwrap();

    let settings = load_and_validate(file.path()).unwrap();
    assert_eq!(settings.redshift.method, RenderMethod::Randr);
    assert!(!settings.redshift.transition);
    assert_eq!(settings.temperature.day, 5700);
    assert_eq!(settings.brightness.night, 0.8);
    assert_eq!(settings.supervisor.liveness, LivenessMode::Poll);
    assert_eq!(settings.supervisor.poll_delay_ms, 250);
    // Untouched sections keep their defaults.
    assert_eq!(settings.gamma.red, 1.0);
    assert_eq!(settings.supervisor.max_restarts, 3);
}

#[test]
fn out_of_range_values_are_structured_errors() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[temperature]\nday = 500\nnight = 3500\n").unwrap();

    match load_and_validate(file.path()) {
        Err(TrayError::InvalidSettings(msg)) => assert!(msg.contains("temperature")),
        other => panic!("expected InvalidSettings, got {other:?}"),
    }
}

#[test]
fn unknown_method_is_a_toml_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[redshift]\nmethod = \"x11\"\n").unwrap();
    assert!(matches!(
        load_and_validate(file.path()),
        Err(TrayError::TomlError(_))
    ));
}

#[test]
fn missing_file_yields_defaults() {
    let dir = tempdir().unwrap();
    let settings = load_or_default(dir.path().join("absent.toml")).unwrap();
    assert!(settings.executable_path().as_os_str().is_empty());
    assert!(settings.redshift.enabled_on_start);
}

#[test]
fn saved_settings_load_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("RedshiftTray.toml");
    let raw = SettingsBuilder::new()
        .with_path("/opt/redshift/bin/redshift")
        .with_location(-33.5, 151.25)
        .with_brightness(0.9, 0.7)
        .raw();

    save_settings(&RealFileSystem, &path, &raw).unwrap();
    let loaded = load_and_validate(&path).unwrap().into_raw();
    assert_eq!(loaded, raw);
}

#[test]
fn redshift_conf_on_disk_is_validated() {
    let log = LogSink::new();
    let dir = tempdir().unwrap();

    let good = dir.path().join("good.conf");
    std::fs::write(&good, "[redshift]\ntemp-day=5700\n[manual]\nlat=50.8\nlon=4.3\n").unwrap();
    assert_eq!(validate_config(&RealFileSystem, &log, &good), ConfigStatus::Ok);

    let partial = dir.path().join("partial.conf");
    std::fs::write(&partial, "[manual]\nlat=50.8\n").unwrap();
    assert_eq!(
        validate_config(&RealFileSystem, &log, &partial),
        ConfigStatus::MissingMandatoryField
    );

    assert_eq!(
        validate_config(&RealFileSystem, &log, dir.path()),
        ConfigStatus::NotFound
    );
    assert!(log.contains(LogCategory::Error, "not found"));
}

#[test]
fn imported_conf_becomes_valid_settings() {
    let log = LogSink::new();
    let text = "\
[redshift]
temp-day=5700
temp-night=3500
transition=0
brightness-night=0.8
gamma=0.9:1.0:1.1
adjustment-method=randr

[manual]
lat=50.8476
lon=4.3428
";
    let raw = import_redshift_config(text, RawSettingsFile::default(), &log);
    let settings = redshift_tray::config::SettingsSnapshot::try_from(raw).unwrap();

    assert_eq!(settings.location.latitude, 50.8476);
    assert_eq!(settings.temperature.night, 3500);
    assert!(!settings.redshift.transition);
    assert_eq!(settings.brightness.night, 0.8);
    assert_eq!(settings.gamma.blue, 1.1);
    assert_eq!(settings.redshift.method, RenderMethod::Randr);
}
