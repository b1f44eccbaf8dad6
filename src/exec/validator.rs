// src/exec/validator.rs

//! Checks that a candidate path really is a recent-enough redshift binary.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::{Result, TrayError};
use crate::exec::args::FLAG_VERSION;
use crate::exec::oneshot::{run_and_capture, run_and_capture_with_timeout};
use crate::fs::{FileSystem, RealFileSystem};
use crate::log_sink::LogSink;
use crate::types::ExecutableStatus;
use crate::version::{Version, VersionRequirement, MIN_REDSHIFT_VERSION};

/// First token the version probe must print.
pub const PROGRAM_IDENTIFIER: &str = "redshift";

/// Validates managed-executable candidates.
///
/// Every branch writes to the log sink before returning, so a failed check
/// can be diagnosed from the log trail alone.
#[derive(Debug, Clone)]
pub struct ExecutableValidator {
    fs: Arc<dyn FileSystem>,
    log: LogSink,
    requirement: VersionRequirement,
    /// Whether an empty path means "not configured yet" (`MissingPath`)
    /// rather than a caller error.
    allow_missing_path: bool,
    probe_timeout: Option<Duration>,
}

impl ExecutableValidator {
    pub fn new(log: LogSink) -> Self {
        Self {
            fs: Arc::new(RealFileSystem),
            log,
            requirement: MIN_REDSHIFT_VERSION,
            allow_missing_path: true,
            probe_timeout: Some(Duration::from_secs(10)),
        }
    }

    pub fn with_filesystem(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_requirement(mut self, requirement: VersionRequirement) -> Self {
        self.requirement = requirement;
        self
    }

    pub fn allow_missing_path(mut self, allow: bool) -> Self {
        self.allow_missing_path = allow;
        self
    }

    /// `None` lets the probe run unbounded.
    pub fn with_probe_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Classify `path`.
    ///
    /// Errors only on caller misuse: an empty path when deferred
    /// configuration is disabled.
    pub async fn validate(&self, path: &Path) -> Result<ExecutableStatus> {
        let log = &self.log;
        log.info("Checking redshift executable");

        if path.as_os_str().is_empty() {
            if self.allow_missing_path {
                log.info("No redshift path set");
                return Ok(ExecutableStatus::MissingPath);
            }
            log.error("No redshift path set");
            return Err(TrayError::EmptyExecutablePath);
        }

        if !self.fs.is_file(path) {
            log.error(format!(
                "Redshift executable '{}' not found",
                path.display()
            ));
            return Ok(ExecutableStatus::NotFound);
        }

        let probe_args = [FLAG_VERSION.to_string()];
        let probe = match self.probe_timeout {
            Some(limit) => run_and_capture_with_timeout(path, &probe_args, limit, log).await,
            None => run_and_capture(path, &probe_args, log).await,
        };
        let output = match probe {
            Ok(output) => output,
            Err(e) => {
                log.error(format!("Version probe failed: {e}"));
                log.error("Redshift executable is not a valid redshift binary");
                return Ok(ExecutableStatus::WrongApplication);
            }
        };

        Ok(self.classify_probe_output(&output))
    }

    /// Classify the version probe's output (`"<name> <major>.<minor>[...]"`).
    pub fn classify_probe_output(&self, output: &str) -> ExecutableStatus {
        let log = &self.log;
        let first_line = output.lines().next().unwrap_or("");
        let tokens: Vec<&str> = first_line.split_whitespace().collect();

        if tokens.len() < 2 || tokens[0] != PROGRAM_IDENTIFIER {
            log.error("Redshift executable is not a valid redshift binary");
            return ExecutableStatus::WrongApplication;
        }

        log.info(format!(
            "Checking redshift version >= {}",
            self.requirement
        ));

        match Version::parse(tokens[1]) {
            Ok(version) if self.requirement.is_satisfied_by(version) => {
                log.info(format!("Redshift version {version} is suitable"));
                ExecutableStatus::Ok
            }
            Ok(version) => {
                log.error(format!("Redshift version {version} is too low"));
                ExecutableStatus::WrongVersion
            }
            Err(e) => {
                log.error(format!("Redshift version could not be read: {e}"));
                ExecutableStatus::WrongVersion
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use crate::log_sink::LogCategory;

    fn validator() -> (ExecutableValidator, LogSink) {
        let log = LogSink::new();
        (ExecutableValidator::new(log.clone()), log)
    }

    #[test]
    fn classifies_probe_output() {
        let (v, _) = validator();
        assert_eq!(v.classify_probe_output("redshift 1.10\n"), ExecutableStatus::Ok);
        assert_eq!(v.classify_probe_output("redshift 2.0"), ExecutableStatus::Ok);
        assert_eq!(
            v.classify_probe_output("redshift 1.12.1\nextra"),
            ExecutableStatus::Ok
        );
        assert_eq!(
            v.classify_probe_output("redshift 1.9"),
            ExecutableStatus::WrongVersion
        );
        assert_eq!(
            v.classify_probe_output("foo 2.0"),
            ExecutableStatus::WrongApplication
        );
        assert_eq!(
            v.classify_probe_output("redshift"),
            ExecutableStatus::WrongApplication
        );
        assert_eq!(v.classify_probe_output(""), ExecutableStatus::WrongApplication);
    }

    #[test]
    fn custom_requirement_is_honoured() {
        let (v, _) = validator();
        let v = v.with_requirement(VersionRequirement::new(2, 0));
        assert_eq!(
            v.classify_probe_output("redshift 1.12"),
            ExecutableStatus::WrongVersion
        );
        assert_eq!(v.classify_probe_output("redshift 2.0"), ExecutableStatus::Ok);
    }

    #[test]
    fn unparseable_version_is_a_version_failure() {
        let (v, log) = validator();
        assert_eq!(
            v.classify_probe_output("redshift unknown"),
            ExecutableStatus::WrongVersion
        );
        assert!(log.contains(LogCategory::Error, "could not be read"));
    }

    #[tokio::test]
    async fn empty_path_is_missing_when_deferred_configuration_is_allowed() {
        let (v, log) = validator();
        assert_eq!(
            v.validate(Path::new("")).await.unwrap(),
            ExecutableStatus::MissingPath
        );
        assert!(log.contains(LogCategory::Info, "No redshift path set"));
    }

    #[tokio::test]
    async fn empty_path_is_an_error_when_deferred_configuration_is_disabled() {
        let (v, _) = validator();
        let v = v.allow_missing_path(false);
        assert!(matches!(
            v.validate(Path::new("")).await,
            Err(TrayError::EmptyExecutablePath)
        ));
    }

    #[tokio::test]
    async fn nonexistent_path_is_not_found_without_probing() {
        let (v, log) = validator();
        let v = v.with_filesystem(Arc::new(MockFileSystem::new()));
        assert_eq!(
            v.validate(Path::new("/opt/redshift/redshift")).await.unwrap(),
            ExecutableStatus::NotFound
        );
        assert!(!log.contains(LogCategory::Info, "Starting redshift"));
    }
}
