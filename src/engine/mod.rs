// src/engine/mod.rs

//! Control engine for the tray application.
//!
//! This module ties together:
//! - the tray status (automatic adjustment on or off)
//! - crash recovery with a bounded number of restarts
//! - the runtime event loop that reacts to:
//!   - toggle / reload requests (signals, CLI)
//!   - quit notifications from the process supervisor
//!   - session end and shutdown
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use crate::exec::notify::QuitNotification;

/// Whether the managed process is supposed to be adjusting the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayStatus {
    Automatic,
    Off,
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    /// Start the managed process as soon as the runtime starts.
    pub enabled_on_start: bool,
    /// How many consecutive crashes are answered with a restart before the
    /// runtime gives up.
    pub max_restarts: u32,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            enabled_on_start: true,
            max_restarts: 3,
        }
    }
}

/// Events flowing into the runtime from signals, the supervisor, etc.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// Switch between automatic adjustment and off.
    ToggleRequested,
    /// Re-read the settings file and apply it.
    ReloadRequested,
    /// The supervisor reported that the continuous instance terminated.
    ManagedQuit(QuitNotification),
    /// Starting the managed process failed.
    StartFailed(String),
    /// The host session is ending.
    SessionEnding,
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

/// Why the runtime stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Requested,
    SessionEnded,
    /// The managed process kept crashing.
    GaveUp,
}

pub mod core;
pub mod runtime;

pub use self::core::{CoreCommand, CoreRuntime, CoreStep};
pub use runtime::{Runtime, SettingsReloader};
