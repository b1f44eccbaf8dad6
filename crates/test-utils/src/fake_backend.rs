use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use redshift_tray::config::SettingsSnapshot;
use redshift_tray::engine::RuntimeEvent;
use redshift_tray::errors::{Result, TrayError};
use redshift_tray::exec::{ProcessBackend, QuitNotification};
use tokio::sync::mpsc;

/// What the runtime asked the backend to do.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    /// Start with the given method name (enough to tell reloads apart).
    Start(String),
    Stop,
    Reset,
    SessionEnding,
}

/// A fake backend that:
/// - records every call
/// - reports a manual quit on stop/replace, like the real supervisor
/// - optionally fails every start.
pub struct FakeBackend {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    calls: Arc<Mutex<Vec<BackendCall>>>,
    running: bool,
    fail_start: bool,
}

impl FakeBackend {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, calls: Arc<Mutex<Vec<BackendCall>>>) -> Self {
        Self {
            runtime_tx,
            calls,
            running: false,
            fail_start: false,
        }
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn manual_quit(&self) {
        let _ = self.runtime_tx.try_send(RuntimeEvent::ManagedQuit(QuitNotification {
            manual_kill: true,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
        }));
    }
}

/// Quit notification for a crashed instance.
pub fn crash(stderr: &str) -> RuntimeEvent {
    RuntimeEvent::ManagedQuit(QuitNotification {
        manual_kill: false,
        stdout: String::new(),
        stderr: stderr.to_string(),
        exit_code: Some(1),
    })
}

impl ProcessBackend for FakeBackend {
    fn start<'a>(
        &'a mut self,
        settings: &'a SettingsSnapshot,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.record(BackendCall::Start(settings.redshift.method.to_string()));
            if self.fail_start {
                return Err(TrayError::ConfigError("fake start failure".to_string()));
            }
            if self.running {
                self.manual_quit();
            }
            self.running = true;
            Ok(())
        })
    }

    fn stop(&mut self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(async move {
            self.record(BackendCall::Stop);
            let was_running = std::mem::replace(&mut self.running, false);
            if was_running {
                self.manual_quit();
            }
            was_running
        })
    }

    fn reset<'a>(
        &'a mut self,
        _settings: &'a SettingsSnapshot,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.record(BackendCall::Reset);
            Ok(())
        })
    }

    fn session_ending(&mut self) {
        self.record(BackendCall::SessionEnding);
    }
}
