// src/exec/oneshot.rs

//! One-shot invocations of the managed executable.
//!
//! The process is launched, awaited until it exits, and its standard output
//! is returned. Used for the version probe and for resetting the screen.
//!
//! The child is created with `kill_on_drop(true)` and owned by the future, so
//! every exit path (launch error, timeout, caller dropping the future) kills
//! and releases it. Both pipes are drained by `Command::output`, so a chatty
//! child cannot block on a full pipe.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use crate::errors::{Result, TrayError};
use crate::exec::args::build_reset_arguments;
use crate::log_sink::LogSink;
use crate::types::RenderMethod;

/// Captured result of a one-shot run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OneShotOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

/// Run `path` with `args` to completion and return its standard output.
///
/// There is no upper bound: a child that never exits blocks the caller.
/// Use [`run_and_capture_with_timeout`] when that matters.
pub async fn run_and_capture(path: &Path, args: &[String], log: &LogSink) -> Result<String> {
    Ok(run_one_shot(path, args, None, log).await?.stdout)
}

/// Like [`run_and_capture`], but gives up (and kills the child) after `timeout`.
pub async fn run_and_capture_with_timeout(
    path: &Path,
    args: &[String],
    timeout: Duration,
    log: &LogSink,
) -> Result<String> {
    Ok(run_one_shot(path, args, Some(timeout), log).await?.stdout)
}

/// Full one-shot run: both streams and the exit code.
pub async fn run_one_shot(
    path: &Path,
    args: &[String],
    timeout: Option<Duration>,
    log: &LogSink,
) -> Result<OneShotOutput> {
    log.info(format!(
        "Starting redshift synchronously with args '{}'",
        args.join(" ")
    ));

    let mut cmd = Command::new(path);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match timeout {
        Some(limit) => match tokio::time::timeout(limit, cmd.output()).await {
            Ok(res) => res,
            Err(_) => {
                log.error(format!(
                    "Redshift did not exit within {} ms; killed it",
                    limit.as_millis()
                ));
                return Err(TrayError::Timeout {
                    path: path.to_path_buf(),
                    timeout: limit,
                });
            }
        },
        None => cmd.output().await,
    }
    .map_err(|source| {
        log.error(format!("Could not start '{}': {source}", path.display()));
        TrayError::Launch {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let result = OneShotOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code(),
    };

    debug!(
        path = %path.display(),
        exit_code = ?result.exit_code,
        stdout_len = result.stdout.len(),
        stderr_len = result.stderr.len(),
        "one-shot process exited"
    );

    log.output(result.stdout.trim_end());
    log.output(result.stderr.trim_end());

    Ok(result)
}

/// Restore the default gamma ramps with the one-shot reset invocation.
pub async fn reset_screen(path: &Path, method: RenderMethod, log: &LogSink) -> Result<String> {
    log.info("Resetting screen");
    run_and_capture(path, &build_reset_arguments(method), log).await
}
