// src/config/validate.rs

use crate::config::model::{LocationSection, RawSettingsFile, SettingsSnapshot};
use crate::errors::{Result, TrayError};

pub const TEMPERATURE_RANGE: (u32, u32) = (1000, 25000);
pub const BRIGHTNESS_RANGE: (f64, f64) = (0.1, 1.0);
pub const GAMMA_RANGE: (f64, f64) = (0.1, 10.0);

impl TryFrom<RawSettingsFile> for SettingsSnapshot {
    type Error = crate::errors::TrayError;

    fn try_from(raw: RawSettingsFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_settings(&raw)?;
        Ok(SettingsSnapshot::new_unchecked(raw))
    }
}

fn validate_raw_settings(raw: &RawSettingsFile) -> Result<()> {
    validate_location(&raw.location)?;
    validate_temperature(raw)?;
    validate_brightness(raw)?;
    validate_gamma(raw)?;
    Ok(())
}

fn validate_location(location: &LocationSection) -> Result<()> {
    if !(-90.0..=90.0).contains(&location.latitude) {
        return Err(TrayError::InvalidSettings(format!(
            "[location].latitude must be within -90..90 (got {})",
            location.latitude
        )));
    }
    if !(-180.0..=180.0).contains(&location.longitude) {
        return Err(TrayError::InvalidSettings(format!(
            "[location].longitude must be within -180..180 (got {})",
            location.longitude
        )));
    }
    Ok(())
}

fn validate_temperature(raw: &RawSettingsFile) -> Result<()> {
    let (min, max) = TEMPERATURE_RANGE;
    for (name, value) in [
        ("day", raw.temperature.day),
        ("night", raw.temperature.night),
    ] {
        if !(min..=max).contains(&value) {
            return Err(TrayError::InvalidSettings(format!(
                "[temperature].{name} must be within {min}..{max} K (got {value})"
            )));
        }
    }
    Ok(())
}

fn validate_brightness(raw: &RawSettingsFile) -> Result<()> {
    let (min, max) = BRIGHTNESS_RANGE;
    for (name, value) in [("day", raw.brightness.day), ("night", raw.brightness.night)] {
        if !(min..=max).contains(&value) {
            return Err(TrayError::InvalidSettings(format!(
                "[brightness].{name} must be within {min}..{max} (got {value})"
            )));
        }
    }
    Ok(())
}

fn validate_gamma(raw: &RawSettingsFile) -> Result<()> {
    let (min, max) = GAMMA_RANGE;
    let gamma = &raw.gamma;
    for (name, value) in [
        ("red", gamma.red),
        ("green", gamma.green),
        ("blue", gamma.blue),
    ] {
        if !(min..=max).contains(&value) {
            return Err(TrayError::InvalidSettings(format!(
                "[gamma].{name} must be within {min}..{max} (got {value})"
            )));
        }
    }
    Ok(())
}

/// Parse a user- or provider-supplied coordinate.
///
/// Accepts a comma as decimal separator so values typed under a
/// comma-decimal locale still parse.
pub fn parse_coordinate(value: &str) -> Result<f64> {
    let normalized = value.trim().replace(',', ".");
    normalized.parse::<f64>().map_err(|_| {
        TrayError::InvalidSettings(format!("invalid coordinate '{}'", value.trim()))
    })
}

/// Parse a latitude/longitude pair and range-check it.
pub fn parse_location(latitude: &str, longitude: &str) -> Result<LocationSection> {
    let location = LocationSection {
        latitude: parse_coordinate(latitude)?,
        longitude: parse_coordinate(longitude)?,
    };
    validate_location(&location)?;
    Ok(location)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_can_be_parsed() {
        let location = parse_location("50.8476", "4.3428").unwrap();
        assert_eq!(location.latitude, 50.8476);
        assert_eq!(location.longitude, 4.3428);
    }

    #[test]
    fn comma_decimal_coordinates_are_accepted() {
        let location = parse_location(" 50,8476 ", "-4,3428").unwrap();
        assert_eq!(location.latitude, 50.8476);
        assert_eq!(location.longitude, -4.3428);
    }

    #[test]
    fn out_of_range_latitude_is_rejected() {
        assert!(matches!(
            parse_location("91", "0"),
            Err(TrayError::InvalidSettings(_))
        ));
        assert!(parse_location("north", "0").is_err());
    }

    #[test]
    fn default_settings_are_valid() {
        assert!(SettingsSnapshot::try_from(RawSettingsFile::default()).is_ok());
    }

    #[test]
    fn brightness_out_of_range_is_rejected() {
        let mut raw = RawSettingsFile::default();
        raw.brightness.night = 1.5;
        match SettingsSnapshot::try_from(raw) {
            Err(TrayError::InvalidSettings(msg)) => assert!(msg.contains("[brightness].night")),
            other => panic!("expected InvalidSettings, got {other:?}"),
        }
    }
}
