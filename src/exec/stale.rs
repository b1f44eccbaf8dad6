// src/exec/stale.rs

//! Startup cleanup of instances left behind by an earlier session.
//!
//! Two continuous instances fight over the gamma ramps, so anything already
//! running under the managed executable's name is killed before the
//! supervisor starts its own.

use std::ffi::OsStr;
use std::path::Path;

use sysinfo::{ProcessesToUpdate, System};
use tracing::debug;

use crate::exec::validator::PROGRAM_IDENTIFIER;
use crate::log_sink::LogSink;

/// Kill every process named like `executable` (except ourselves).
/// Returns how many were killed.
pub fn kill_stale_instances(executable: &Path, log: &LogSink) -> usize {
    log.info("Looking for running redshift instances.");

    let name = executable
        .file_name()
        .unwrap_or_else(|| OsStr::new(PROGRAM_IDENTIFIER));
    let own_pid = std::process::id();

    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::All, true);

    let mut killed = 0;
    for process in sys.processes().values() {
        if process.name() != name || process.pid().as_u32() == own_pid {
            continue;
        }

        debug!(pid = process.pid().as_u32(), "found stale managed process");
        if process.kill() {
            killed += 1;
            log.info("Killed previous redshift process.");
        } else {
            log.error("Was not able to kill redshift process.");
        }
    }

    killed
}
