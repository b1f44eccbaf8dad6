// tests/executable_validator.rs
#![cfg(unix)]

use std::path::Path;
use std::time::Duration;

use redshift_tray::errors::TrayError;
use redshift_tray::exec::ExecutableValidator;
use redshift_tray::log_sink::{LogCategory, LogSink};
use redshift_tray::types::ExecutableStatus;
use redshift_tray_test_utils::scripts::{write_executable, FakeExecutable};
use redshift_tray_test_utils::{init_tracing, with_timeout};

async fn status_for(version_line: &str) -> ExecutableStatus {
    let exe = FakeExecutable::new(version_line, "exit 0");
    let validator = ExecutableValidator::new(LogSink::new());
    with_timeout(validator.validate(exe.path())).await.unwrap()
}

#[tokio::test]
async fn version_gate() {
    init_tracing();

    assert_eq!(status_for("redshift 1.9").await, ExecutableStatus::WrongVersion);
    assert_eq!(status_for("redshift 1.10").await, ExecutableStatus::Ok);
    assert_eq!(status_for("redshift 1.12.1").await, ExecutableStatus::Ok);
    assert_eq!(status_for("redshift 2.0").await, ExecutableStatus::Ok);
}

#[tokio::test]
async fn other_programs_are_wrong_application() {
    init_tracing();

    assert_eq!(status_for("foo 2.0").await, ExecutableStatus::WrongApplication);
    assert_eq!(status_for("redshift").await, ExecutableStatus::WrongApplication);
    assert_eq!(status_for("").await, ExecutableStatus::WrongApplication);
}

#[tokio::test]
async fn unparseable_version_is_wrong_version() {
    init_tracing();
    assert_eq!(status_for("redshift 1.x").await, ExecutableStatus::WrongVersion);
}

#[tokio::test]
async fn missing_file_is_not_found_and_logged() {
    init_tracing();
    let log = LogSink::new();
    let validator = ExecutableValidator::new(log.clone());

    let status = validator
        .validate(Path::new("/definitely/not/here/redshift"))
        .await
        .unwrap();

    assert_eq!(status, ExecutableStatus::NotFound);
    assert!(log.contains(LogCategory::Error, "not found"));
}

#[tokio::test]
async fn empty_path_depends_on_deferred_configuration() {
    init_tracing();
    let log = LogSink::new();

    let deferred = ExecutableValidator::new(log.clone());
    assert_eq!(
        deferred.validate(Path::new("")).await.unwrap(),
        ExecutableStatus::MissingPath
    );

    let strict = ExecutableValidator::new(log).allow_missing_path(false);
    assert!(matches!(
        strict.validate(Path::new("")).await,
        Err(TrayError::EmptyExecutablePath)
    ));
}

#[tokio::test]
async fn hanging_probe_is_bounded() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("redshift");
    write_executable(&path, "#!/bin/sh\nexec sleep 30\n");

    let validator = ExecutableValidator::new(LogSink::new())
        .with_probe_timeout(Some(Duration::from_millis(200)));

    let status = with_timeout(validator.validate(&path)).await.unwrap();
    assert_eq!(status, ExecutableStatus::WrongApplication);
}
