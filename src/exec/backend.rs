// src/exec/backend.rs

//! Pluggable process backend abstraction.
//!
//! The engine runtime talks to a `ProcessBackend` instead of the supervisor
//! directly. Production code uses [`RealProcessBackend`], which validates the
//! configured executable, builds the argument list and drives a
//! [`ProcessSupervisor`]. Tests can provide their own backend that records
//! what the runtime asked for and emits quit events by hand.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::{validate_config, SettingsSnapshot};
use crate::engine::RuntimeEvent;
use crate::errors::{Result, TrayError};
use crate::exec::args::arguments_for;
use crate::exec::notify::QuitNotification;
use crate::exec::oneshot::reset_screen;
use crate::exec::supervisor::{Liveness, ProcessSupervisor};
use crate::exec::validator::ExecutableValidator;
use crate::fs::{FileSystem, RealFileSystem};
use crate::log_sink::LogSink;
use crate::types::{ConfigStatus, ExecutableStatus};

/// Result of the pre-start checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    pub executable: ExecutableStatus,
    pub config: ConfigStatus,
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        self.executable.is_ok() && self.config.is_acceptable()
    }
}

/// Trait abstracting how the managed process is started and stopped.
pub trait ProcessBackend: Send {
    /// Validate `settings` and start (or replace) the continuous instance.
    fn start<'a>(
        &'a mut self,
        settings: &'a SettingsSnapshot,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

    /// Stop the continuous instance. Returns whether one was running.
    fn stop(&mut self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>>;

    /// Run the one-shot screen reset.
    fn reset<'a>(
        &'a mut self,
        settings: &'a SettingsSnapshot,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

    /// The host session is ending; stop reporting crashes.
    fn session_ending(&mut self);
}

/// Real backend used in production.
#[derive(Debug)]
pub struct RealProcessBackend {
    supervisor: Arc<ProcessSupervisor>,
    validator: ExecutableValidator,
    fs: Arc<dyn FileSystem>,
    log: LogSink,
}

impl RealProcessBackend {
    /// Create a backend whose quit notifications are forwarded to the
    /// runtime as [`RuntimeEvent::ManagedQuit`].
    ///
    /// Must be called inside a tokio runtime: forwarding runs on its own task
    /// and waits for room in `runtime_tx`, so no notification is dropped.
    pub fn new(
        log: LogSink,
        liveness: Liveness,
        validator: ExecutableValidator,
        runtime_tx: mpsc::Sender<RuntimeEvent>,
    ) -> Self {
        let supervisor = Arc::new(ProcessSupervisor::new(log.clone(), liveness));

        let (quit_tx, mut quit_rx) = mpsc::unbounded_channel::<QuitNotification>();
        supervisor.subscribe(Arc::new(move |notification: &QuitNotification| {
            // Called from the monitor task; hand it over to the forwarder.
            if quit_tx.send(notification.clone()).is_err() {
                warn!("quit notification forwarder is gone");
            }
        }));

        tokio::spawn(async move {
            while let Some(notification) = quit_rx.recv().await {
                if runtime_tx
                    .send(RuntimeEvent::ManagedQuit(notification))
                    .await
                    .is_err()
                {
                    debug!("runtime channel closed; no longer forwarding quit notifications");
                    break;
                }
            }
        });

        Self {
            supervisor,
            validator,
            fs: Arc::new(RealFileSystem),
            log,
        }
    }

    pub fn supervisor(&self) -> &Arc<ProcessSupervisor> {
        &self.supervisor
    }

    /// Executable and (if configured) redshift.conf checks.
    pub async fn check(&self, settings: &SettingsSnapshot) -> Result<Readiness> {
        let executable = self.validator.validate(settings.executable_path()).await?;
        let config = match settings.redshift.config_file.as_deref() {
            Some(path) => validate_config(self.fs.as_ref(), &self.log, path),
            None => ConfigStatus::NotSet,
        };
        Ok(Readiness { executable, config })
    }
}

impl ProcessBackend for RealProcessBackend {
    fn start<'a>(
        &'a mut self,
        settings: &'a SettingsSnapshot,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let readiness = self.check(settings).await?;
            if !readiness.is_ready() {
                return Err(TrayError::ConfigError(format!(
                    "cannot start redshift: {:?} / {:?}",
                    readiness.executable, readiness.config
                )));
            }

            let args = arguments_for(settings);
            debug!(?args, "starting continuous instance");
            self.supervisor
                .start_continuous(settings.executable_path(), &args, None)
                .await
        })
    }

    fn stop(&mut self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        let supervisor = Arc::clone(&self.supervisor);
        Box::pin(async move { supervisor.stop().await })
    }

    fn reset<'a>(
        &'a mut self,
        settings: &'a SettingsSnapshot,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let path: &Path = settings.executable_path();
            reset_screen(path, settings.redshift.method, &self.log).await?;
            Ok(())
        })
    }

    fn session_ending(&mut self) {
        self.supervisor.session_ending();
    }
}
