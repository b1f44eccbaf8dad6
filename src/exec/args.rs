// src/exec/args.rs

//! Translate a settings snapshot into the managed process's command line.
//!
//! Values are rendered with Rust's `Display`, which always uses `.` as the
//! decimal separator, so the output does not depend on the host locale.
//! Range checking is done when the snapshot is built, never here.

use std::path::Path;

use crate::config::SettingsSnapshot;
use crate::types::RenderMethod;

pub const FLAG_METHOD: &str = "-m";
pub const FLAG_LOCATION: &str = "-l";
pub const FLAG_TEMPERATURE: &str = "-t";
pub const FLAG_NO_TRANSITION: &str = "-r";
pub const FLAG_BRIGHTNESS: &str = "-b";
pub const FLAG_GAMMA: &str = "-g";
pub const FLAG_CONFIG: &str = "-c";
pub const FLAG_RESET: &str = "-x";
pub const FLAG_VERSION: &str = "-V";

/// Continuous-mode arguments, in the order the managed process expects:
/// method, location, temperature, optional no-transition, brightness, gamma.
pub fn build_arguments(settings: &SettingsSnapshot) -> Vec<String> {
    let mut args = method_args(settings.redshift.method);

    args.push(FLAG_LOCATION.to_string());
    args.push(format!(
        "{}:{}",
        settings.location.latitude, settings.location.longitude
    ));

    args.push(FLAG_TEMPERATURE.to_string());
    args.push(format!(
        "{}:{}",
        settings.temperature.day, settings.temperature.night
    ));

    // Presence-only flag; omitted entirely when transitions are on.
    if !settings.redshift.transition {
        args.push(FLAG_NO_TRANSITION.to_string());
    }

    args.push(FLAG_BRIGHTNESS.to_string());
    args.push(format!(
        "{}:{}",
        settings.brightness.day, settings.brightness.night
    ));

    let gamma = &settings.gamma;
    args.push(FLAG_GAMMA.to_string());
    args.push(format!("{}:{}:{}", gamma.red, gamma.green, gamma.blue));

    args
}

/// Arguments when the managed process reads an external redshift.conf.
pub fn build_config_arguments(method: RenderMethod, config_path: &Path) -> Vec<String> {
    let mut args = method_args(method);
    args.push(FLAG_CONFIG.to_string());
    args.push(config_path.display().to_string());
    args
}

/// One-shot invocation that restores the screen's default gamma ramps.
pub fn build_reset_arguments(method: RenderMethod) -> Vec<String> {
    let mut args = method_args(method);
    args.push(FLAG_RESET.to_string());
    args
}

/// Pick config-driven or discrete arguments for `settings`.
pub fn arguments_for(settings: &SettingsSnapshot) -> Vec<String> {
    match settings.redshift.config_file.as_deref() {
        Some(path) if !path.as_os_str().is_empty() => {
            build_config_arguments(settings.redshift.method, path)
        }
        _ => build_arguments(settings),
    }
}

fn method_args(method: RenderMethod) -> Vec<String> {
    vec![FLAG_METHOD.to_string(), method.as_str().to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawSettingsFile;

    fn snapshot(edit: impl FnOnce(&mut RawSettingsFile)) -> SettingsSnapshot {
        let mut raw = RawSettingsFile::default();
        edit(&mut raw);
        SettingsSnapshot::try_from(raw).unwrap()
    }

    #[test]
    fn transition_flag_is_omitted_when_enabled() {
        let settings = snapshot(|raw| {
            raw.redshift.method = RenderMethod::Dummy;
            raw.redshift.transition = true;
        });
        let args = build_arguments(&settings);
        assert!(!args.iter().any(|a| a == FLAG_NO_TRANSITION));
        assert_eq!(&args[..2], &["-m", "dummy"]);
    }

    #[test]
    fn config_file_switches_to_config_arguments() {
        let settings = snapshot(|raw| {
            raw.redshift.method = RenderMethod::Randr;
            raw.redshift.config_file = Some("/etc/redshift.conf".into());
        });
        assert_eq!(
            arguments_for(&settings),
            vec!["-m", "randr", "-c", "/etc/redshift.conf"]
        );
    }

    #[test]
    fn empty_config_file_falls_back_to_discrete_arguments() {
        let settings = snapshot(|raw| raw.redshift.config_file = Some("".into()));
        assert_eq!(arguments_for(&settings), build_arguments(&settings));
    }

    #[test]
    fn reset_arguments() {
        assert_eq!(
            build_reset_arguments(RenderMethod::Wingdi),
            vec!["-m", "wingdi", "-x"]
        );
    }
}
