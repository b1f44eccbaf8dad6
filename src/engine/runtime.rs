// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::SettingsSnapshot;
use crate::errors::Result;
use crate::exec::ProcessBackend;
use crate::log_sink::LogSink;

use super::core::CoreRuntime;
use super::{CoreCommand, ExitReason, RuntimeEvent};

/// Produces a fresh, validated settings snapshot on reload.
pub type SettingsReloader = Box<dyn FnMut() -> Result<SettingsSnapshot> + Send>;

/// Drives the tray state machine in response to `RuntimeEvent`s and
/// delegates process handling to a `ProcessBackend`.
///
/// This is a pure IO shell around `CoreRuntime`, which contains all the
/// runtime semantics.
pub struct Runtime<B: ProcessBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    backend: B,
    settings: SettingsSnapshot,
    reload: Option<SettingsReloader>,
    log: LogSink,
}

impl<B: ProcessBackend> fmt::Debug for Runtime<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<B: ProcessBackend> Runtime<B> {
    pub fn new(
        core: CoreRuntime,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        backend: B,
        settings: SettingsSnapshot,
        log: LogSink,
    ) -> Self {
        Self {
            core,
            event_rx,
            backend,
            settings,
            reload: None,
            log,
        }
    }

    /// Without a reloader, reload requests keep the current settings.
    pub fn with_reloader(mut self, reload: SettingsReloader) -> Self {
        self.reload = Some(reload);
        self
    }

    /// Main event loop. Returns why it stopped.
    pub async fn run(mut self) -> Result<ExitReason> {
        info!("redshift-tray runtime started");

        let startup = self.core.startup();
        let mut exit = self.execute_all(startup.commands).await;

        while exit.is_none() {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; shutting down");
                    RuntimeEvent::ShutdownRequested
                }
            };

            debug!(?event, status = ?self.core.status(), "runtime received event");

            let step = self.core.step(event);
            exit = self.execute_all(step.commands).await;

            if !step.keep_running && exit.is_none() {
                exit = Some(ExitReason::Requested);
            }
        }

        let reason = exit.unwrap_or(ExitReason::Requested);
        info!(?reason, "runtime exiting");
        Ok(reason)
    }

    async fn execute_all(&mut self, commands: Vec<CoreCommand>) -> Option<ExitReason> {
        let mut exit = None;
        for command in commands {
            if let Some(reason) = self.execute_command(command).await {
                exit = Some(reason);
            }
        }
        exit
    }

    /// Execute a single command from the core.
    async fn execute_command(&mut self, command: CoreCommand) -> Option<ExitReason> {
        match command {
            CoreCommand::Start => {
                if let Err(e) = self.backend.start(&self.settings).await {
                    self.log.error(format!("Could not start redshift: {e}"));
                    // Feed the failure back so the status reflects reality.
                    self.core.step(RuntimeEvent::StartFailed(e.to_string()));
                }
            }
            CoreCommand::Stop => {
                if !self.backend.stop().await {
                    debug!("stop requested but nothing was running");
                }
            }
            CoreCommand::ResetScreen => {
                if let Err(e) = self.backend.reset(&self.settings).await {
                    self.log.error(format!("Could not reset the screen: {e}"));
                }
            }
            CoreCommand::ReloadSettings => self.reload_settings(),
            CoreCommand::DisarmCrashDetection => self.backend.session_ending(),
            CoreCommand::Exit(reason) => return Some(reason),
        }
        None
    }

    fn reload_settings(&mut self) {
        let Some(reload) = self.reload.as_mut() else {
            warn!("reload requested but no settings source is configured");
            return;
        };

        match reload() {
            Ok(settings) => {
                self.settings = settings;
                self.log.info("Settings reloaded.");
            }
            Err(e) => {
                self.log
                    .error(format!("Could not reload settings, keeping the old ones: {e}"));
            }
        }
    }
}
