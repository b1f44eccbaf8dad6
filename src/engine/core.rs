// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated tray status
//! - a list of commands describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Runtime`) is responsible for reading
//! events from the channel and driving the process backend. The core is unit
//! tested without any Tokio, channels, or processes.

use crate::engine::{ExitReason, RuntimeEvent, RuntimeOptions, TrayStatus};
use crate::exec::notify::QuitNotification;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreCommand {
    /// Start (or replace) the continuous instance with the current settings.
    Start,
    /// Stop the continuous instance.
    Stop,
    /// Restore the default gamma ramps.
    ResetScreen,
    /// Re-read the settings file.
    ReloadSettings,
    /// Stop reporting crashes; the platform is about to reap everything.
    DisarmCrashDetection,
    Exit(ExitReason),
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn continue_with(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }

    fn exit_with(mut commands: Vec<CoreCommand>, reason: ExitReason) -> Self {
        commands.push(CoreCommand::Exit(reason));
        Self {
            commands,
            keep_running: false,
        }
    }
}

/// Pure core runtime state.
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
#[derive(Debug)]
pub struct CoreRuntime {
    status: TrayStatus,
    crashes: u32,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new(options: RuntimeOptions) -> Self {
        Self {
            status: TrayStatus::Off,
            crashes: 0,
            options,
        }
    }

    pub fn status(&self) -> TrayStatus {
        self.status
    }

    /// Consecutive crashes since the last deliberate (re)start.
    pub fn crashes(&self) -> u32 {
        self.crashes
    }

    /// Commands to run once, before the first event.
    pub fn startup(&mut self) -> CoreStep {
        if self.options.enabled_on_start {
            self.status = TrayStatus::Automatic;
            CoreStep::continue_with(vec![CoreCommand::Start])
        } else {
            CoreStep::continue_with(Vec::new())
        }
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::ToggleRequested => self.toggle(),
            RuntimeEvent::ReloadRequested => {
                let mut commands = vec![CoreCommand::ReloadSettings];
                if self.status == TrayStatus::Automatic {
                    self.crashes = 0;
                    commands.push(CoreCommand::Start);
                }
                CoreStep::continue_with(commands)
            }
            RuntimeEvent::ManagedQuit(notification) => self.managed_quit(&notification),
            RuntimeEvent::StartFailed(_) => {
                self.status = TrayStatus::Off;
                CoreStep::continue_with(Vec::new())
            }
            RuntimeEvent::SessionEnding => CoreStep::exit_with(
                vec![CoreCommand::DisarmCrashDetection],
                ExitReason::SessionEnded,
            ),
            RuntimeEvent::ShutdownRequested => {
                let commands = match self.status {
                    TrayStatus::Automatic => vec![CoreCommand::Stop, CoreCommand::ResetScreen],
                    TrayStatus::Off => Vec::new(),
                };
                self.status = TrayStatus::Off;
                CoreStep::exit_with(commands, ExitReason::Requested)
            }
        }
    }

    fn toggle(&mut self) -> CoreStep {
        match self.status {
            TrayStatus::Automatic => {
                self.status = TrayStatus::Off;
                CoreStep::continue_with(vec![CoreCommand::Stop, CoreCommand::ResetScreen])
            }
            TrayStatus::Off => {
                self.status = TrayStatus::Automatic;
                self.crashes = 0;
                CoreStep::continue_with(vec![CoreCommand::Start])
            }
        }
    }

    fn managed_quit(&mut self, notification: &QuitNotification) -> CoreStep {
        // Manual stops were asked for by this core; nothing to do.
        if notification.manual_kill || self.status == TrayStatus::Off {
            return CoreStep::continue_with(Vec::new());
        }

        self.crashes += 1;
        if self.crashes <= self.options.max_restarts {
            return CoreStep::continue_with(vec![CoreCommand::Start]);
        }

        self.status = TrayStatus::Off;
        CoreStep::exit_with(vec![CoreCommand::ResetScreen], ExitReason::GaveUp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(max_restarts: u32) -> RuntimeOptions {
        RuntimeOptions {
            enabled_on_start: true,
            max_restarts,
        }
    }

    fn quit(manual_kill: bool) -> RuntimeEvent {
        RuntimeEvent::ManagedQuit(QuitNotification {
            manual_kill,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: if manual_kill { None } else { Some(1) },
        })
    }

    #[test]
    fn startup_starts_when_enabled() {
        let mut core = CoreRuntime::new(options(3));
        let step = core.startup();
        assert_eq!(step.commands, vec![CoreCommand::Start]);
        assert_eq!(core.status(), TrayStatus::Automatic);
    }

    #[test]
    fn startup_stays_off_when_disabled() {
        let mut core = CoreRuntime::new(RuntimeOptions {
            enabled_on_start: false,
            max_restarts: 3,
        });
        assert!(core.startup().commands.is_empty());
        assert_eq!(core.status(), TrayStatus::Off);
    }

    #[test]
    fn toggle_alternates_and_resets_the_screen_when_turning_off() {
        let mut core = CoreRuntime::new(options(3));
        core.startup();

        let off = core.step(RuntimeEvent::ToggleRequested);
        assert_eq!(off.commands, vec![CoreCommand::Stop, CoreCommand::ResetScreen]);
        assert_eq!(core.status(), TrayStatus::Off);

        let on = core.step(RuntimeEvent::ToggleRequested);
        assert_eq!(on.commands, vec![CoreCommand::Start]);
        assert!(on.keep_running);
        assert_eq!(core.status(), TrayStatus::Automatic);
    }

    #[test]
    fn manual_quit_is_ignored() {
        let mut core = CoreRuntime::new(options(3));
        core.startup();
        let step = core.step(quit(true));
        assert!(step.commands.is_empty());
        assert_eq!(core.crashes(), 0);
    }

    #[test]
    fn crash_is_restarted_until_the_limit_then_gives_up() {
        let mut core = CoreRuntime::new(options(2));
        core.startup();

        assert_eq!(core.step(quit(false)).commands, vec![CoreCommand::Start]);
        assert_eq!(core.step(quit(false)).commands, vec![CoreCommand::Start]);

        let last = core.step(quit(false));
        assert!(!last.keep_running);
        assert_eq!(
            last.commands,
            vec![
                CoreCommand::ResetScreen,
                CoreCommand::Exit(ExitReason::GaveUp)
            ]
        );
        assert_eq!(core.status(), TrayStatus::Off);
    }

    #[test]
    fn toggling_back_on_resets_the_crash_counter() {
        let mut core = CoreRuntime::new(options(1));
        core.startup();
        core.step(quit(false));
        assert_eq!(core.crashes(), 1);

        core.step(RuntimeEvent::ToggleRequested);
        core.step(RuntimeEvent::ToggleRequested);
        assert_eq!(core.crashes(), 0);
        assert_eq!(core.step(quit(false)).commands, vec![CoreCommand::Start]);
    }

    #[test]
    fn crash_while_off_is_ignored() {
        let mut core = CoreRuntime::new(options(0));
        let step = core.step(quit(false));
        assert!(step.keep_running);
        assert!(step.commands.is_empty());
    }

    #[test]
    fn reload_restarts_only_when_automatic() {
        let mut core = CoreRuntime::new(options(3));
        core.startup();
        assert_eq!(
            core.step(RuntimeEvent::ReloadRequested).commands,
            vec![CoreCommand::ReloadSettings, CoreCommand::Start]
        );

        core.step(RuntimeEvent::ToggleRequested);
        assert_eq!(
            core.step(RuntimeEvent::ReloadRequested).commands,
            vec![CoreCommand::ReloadSettings]
        );
    }

    #[test]
    fn failed_start_turns_status_off() {
        let mut core = CoreRuntime::new(options(3));
        core.startup();
        core.step(RuntimeEvent::StartFailed("no such file".into()));
        assert_eq!(core.status(), TrayStatus::Off);
    }

    #[test]
    fn session_end_disarms_without_stopping() {
        let mut core = CoreRuntime::new(options(3));
        core.startup();
        let step = core.step(RuntimeEvent::SessionEnding);
        assert!(!step.keep_running);
        assert_eq!(
            step.commands,
            vec![
                CoreCommand::DisarmCrashDetection,
                CoreCommand::Exit(ExitReason::SessionEnded)
            ]
        );
    }

    #[test]
    fn shutdown_stops_and_resets_when_automatic() {
        let mut core = CoreRuntime::new(options(3));
        core.startup();
        let step = core.step(RuntimeEvent::ShutdownRequested);
        assert_eq!(
            step.commands,
            vec![
                CoreCommand::Stop,
                CoreCommand::ResetScreen,
                CoreCommand::Exit(ExitReason::Requested)
            ]
        );
    }
}
