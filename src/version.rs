// src/version.rs

//! Version policy for the managed executable.
//!
//! Pure and side-effect free: parsing a `major.minor[...]` token and comparing
//! it against a minimum requirement. Only the first two dot-separated
//! components are ever examined.

use std::fmt;

use thiserror::Error;

/// Oldest redshift release the tray knows how to drive.
pub const MIN_REDSHIFT_VERSION: VersionRequirement = VersionRequirement::new(1, 10);

/// A parsed `(major, minor)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    /// Fewer than two dot-separated components.
    #[error("version '{0}' has fewer than two components")]
    TooFewComponents(String),
    /// Major or minor is not a non-negative integer.
    #[error("version '{0}' is not numeric")]
    NotNumeric(String),
}

impl Version {
    pub fn parse(token: &str) -> Result<Self, VersionParseError> {
        let mut parts = token.trim().split('.');
        let (major, minor) = match (parts.next(), parts.next()) {
            (Some(major), Some(minor)) => (major, minor),
            _ => return Err(VersionParseError::TooFewComponents(token.to_string())),
        };

        let parse_component = |s: &str| {
            s.parse::<u32>()
                .map_err(|_| VersionParseError::NotNumeric(token.to_string()))
        };

        Ok(Version {
            major: parse_component(major)?,
            minor: parse_component(minor)?,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Immutable minimum `(major, minor)` requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionRequirement {
    pub min_major: u32,
    pub min_minor: u32,
}

impl VersionRequirement {
    pub const fn new(min_major: u32, min_minor: u32) -> Self {
        Self {
            min_major,
            min_minor,
        }
    }

    pub fn is_satisfied_by(&self, version: Version) -> bool {
        satisfies(version, *self)
    }

    /// Parse `token` and compare it. Any parse failure rejects.
    pub fn accepts(&self, token: &str) -> bool {
        Version::parse(token)
            .map(|v| self.is_satisfied_by(v))
            .unwrap_or(false)
    }
}

impl fmt::Display for VersionRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.min_major, self.min_minor)
    }
}

/// Accept if the major version is newer, or equal with a minor version that
/// is at least the required one.
pub fn satisfies(parsed: Version, required: VersionRequirement) -> bool {
    parsed.major > required.min_major
        || (parsed.major == required.min_major && parsed.minor >= required.min_minor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_patch_versions_by_ignoring_the_tail() {
        assert_eq!(
            Version::parse("1.12.3").unwrap(),
            Version {
                major: 1,
                minor: 12
            }
        );
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(matches!(
            Version::parse("1"),
            Err(VersionParseError::TooFewComponents(_))
        ));
        assert!(matches!(
            Version::parse("1.x"),
            Err(VersionParseError::NotNumeric(_))
        ));
        assert!(matches!(
            Version::parse("-1.10"),
            Err(VersionParseError::NotNumeric(_))
        ));
    }

    #[test]
    fn parse_errors_name_the_token() {
        let err = Version::parse("7").unwrap_err();
        assert_eq!(err.to_string(), "version '7' has fewer than two components");
        let err: Box<dyn std::error::Error> = Box::new(Version::parse("1.x").unwrap_err());
        assert_eq!(err.to_string(), "version '1.x' is not numeric");
    }

    #[test]
    fn minimum_boundary() {
        assert!(MIN_REDSHIFT_VERSION.accepts("1.10"));
        assert!(MIN_REDSHIFT_VERSION.accepts("2.0"));
        assert!(!MIN_REDSHIFT_VERSION.accepts("1.9"));
        assert!(!MIN_REDSHIFT_VERSION.accepts("0.99"));
        assert!(!MIN_REDSHIFT_VERSION.accepts("garbage"));
        assert_eq!(MIN_REDSHIFT_VERSION.to_string(), "1.10");
    }
}
