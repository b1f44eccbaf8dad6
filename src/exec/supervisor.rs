// src/exec/supervisor.rs

//! Owner of the single continuous managed-process instance.
//!
//! State transitions (start / stop / crash detection / session end) are
//! serialized in two layers:
//!
//! - `control`, an async mutex held for the whole of `start_continuous`,
//!   `stop` and `restart`, so caller-initiated transitions never interleave;
//! - `Shared::slot`, a short-lived std mutex guarding the instance record.
//!   The crash path (monitor task / poll check) only ever takes this one.
//!
//! Crash detection is "armed" per instance. Whoever clears the flag under the
//! slot lock owns the one and only quit notification for that instance. A
//! manual stop clears it *before* asking the monitor to kill the process, so
//! a deliberate stop can never be reported as a crash.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::{Result, TrayError};
use crate::exec::notify::{QuitCallback, QuitNotification, QuitObservers, SubscriptionId};
use crate::log_sink::LogSink;
use crate::types::LivenessMode;

/// Delay before the single liveness check in poll mode.
pub const POLL_CHECK_DELAY: Duration = Duration::from_secs(5);

/// How long to keep reading a dead process's pipes. A grandchild that
/// inherited them could otherwise keep them open forever.
const OUTPUT_DRAIN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Idle,
    Starting,
    Running,
    Stopping,
    Terminated,
}

/// Which crash-detection strategy a supervisor uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Liveness {
    pub mode: LivenessMode,
    /// Only used in [`LivenessMode::Poll`].
    pub poll_delay: Duration,
}

impl Default for Liveness {
    fn default() -> Self {
        Self {
            mode: LivenessMode::Event,
            poll_delay: POLL_CHECK_DELAY,
        }
    }
}

impl Liveness {
    pub fn event() -> Self {
        Self::default()
    }

    pub fn poll(delay: Duration) -> Self {
        Self {
            mode: LivenessMode::Poll,
            poll_delay: delay,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct CapturedOutput {
    stdout: String,
    stderr: String,
}

struct Instance {
    id: u64,
    path: PathBuf,
    args: Vec<String>,
    pid: Option<u32>,
    /// Crash detection subscription.
    armed: bool,
    /// Set as soon as the OS reports the exit, before any output is read.
    exited: bool,
    /// Crash detection fired; the notification goes out once `output` is in.
    crash_owed: bool,
    exit_code: Option<i32>,
    /// Present until a stop has been requested.
    kill_tx: Option<oneshot::Sender<()>>,
    /// Fires once the monitor has collected the output and reported.
    done_rx: Option<oneshot::Receiver<()>>,
    /// `Some` once the process has exited and its output was collected.
    output: Option<CapturedOutput>,
    on_quit: Option<QuitCallback>,
}

impl Instance {
    fn is_alive(&self) -> bool {
        !self.exited
    }

    fn notification(&self, manual_kill: bool) -> QuitNotification {
        let output = self.output.clone().unwrap_or_default();
        QuitNotification {
            manual_kill,
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code: self.exit_code,
        }
    }

    /// Claim the owed crash report, if its output is complete.
    fn take_crash(&mut self) -> Option<(QuitNotification, Option<QuitCallback>)> {
        if !self.crash_owed || self.output.is_none() {
            return None;
        }
        self.crash_owed = false;
        Some((self.notification(false), self.on_quit.clone()))
    }
}

struct Slot {
    state: SupervisorState,
    active: Option<Instance>,
}

/// State reachable from the monitor and poll-check tasks.
struct Shared {
    slot: Mutex<Slot>,
    observers: QuitObservers,
    log: LogSink,
    mode: LivenessMode,
}

impl Shared {
    fn lock(&self) -> std::sync::MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn deliver(&self, notification: QuitNotification, on_quit: Option<QuitCallback>) {
        if notification.is_crash() {
            self.log.error(format!(
                "Redshift quit unexpectedly (exit code {})",
                notification
                    .exit_code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "unknown".to_string())
            ));
        }
        self.observers.notify(&notification);
        if let Some(cb) = on_quit {
            cb(&notification);
        }
    }

    /// Called by the monitor as soon as `wait` returns. Crash ownership is
    /// decided here, while the output may still be draining.
    fn mark_exited(&self, id: u64, exit_code: Option<i32>) {
        let mut slot = self.lock();
        let Some(instance) = slot.active.as_mut().filter(|i| i.id == id) else {
            debug!(instance = id, "exit observed for a replaced instance");
            return;
        };
        instance.exited = true;
        instance.exit_code = exit_code;

        if self.mode == LivenessMode::Event && instance.armed {
            instance.armed = false;
            instance.crash_owed = true;
        }
        if slot.state != SupervisorState::Stopping {
            slot.state = SupervisorState::Terminated;
        }
    }

    /// Called by the monitor once the pipes are read.
    fn record_output(&self, id: u64, output: CapturedOutput) {
        self.log.output(output.stdout.trim_end());
        self.log.output(output.stderr.trim_end());

        let crash = {
            let mut slot = self.lock();
            let Some(instance) = slot.active.as_mut().filter(|i| i.id == id) else {
                debug!(instance = id, "output collected for a replaced instance");
                return;
            };
            instance.output = Some(output);
            instance.take_crash()
        };

        if let Some((notification, on_quit)) = crash {
            info!(instance = id, "managed process exited on its own");
            self.deliver(notification, on_quit);
        }
    }

    /// The single deferred liveness check of poll mode.
    fn poll_check(&self, id: u64) {
        let crash = {
            let mut slot = self.lock();
            match slot.active.as_mut().filter(|i| i.id == id) {
                Some(instance) if instance.armed && !instance.is_alive() => {
                    instance.armed = false;
                    instance.crash_owed = true;
                    // Delivered by the monitor if the output is still draining.
                    instance.take_crash()
                }
                Some(instance) if instance.armed => {
                    debug!(instance = id, "liveness check passed; not checking again");
                    None
                }
                _ => None,
            }
        };

        if let Some((notification, on_quit)) = crash {
            info!(instance = id, "liveness check found the managed process gone");
            self.deliver(notification, on_quit);
        }
    }
}

/// Supervises one continuous managed process at a time.
pub struct ProcessSupervisor {
    shared: Arc<Shared>,
    control: tokio::sync::Mutex<()>,
    liveness: Liveness,
    next_id: AtomicU64,
}

impl fmt::Debug for ProcessSupervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessSupervisor")
            .field("state", &self.state())
            .field("liveness", &self.liveness)
            .finish_non_exhaustive()
    }
}

impl ProcessSupervisor {
    pub fn new(log: LogSink, liveness: Liveness) -> Self {
        Self {
            shared: Arc::new(Shared {
                slot: Mutex::new(Slot {
                    state: SupervisorState::Idle,
                    active: None,
                }),
                observers: QuitObservers::default(),
                log,
                mode: liveness.mode,
            }),
            control: tokio::sync::Mutex::new(()),
            liveness,
            next_id: AtomicU64::new(1),
        }
    }

    /// Observe every quit notification of every instance.
    pub fn subscribe(&self, callback: QuitCallback) -> SubscriptionId {
        self.shared.observers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.observers.unsubscribe(id)
    }

    pub fn state(&self) -> SupervisorState {
        self.shared.lock().state
    }

    pub fn liveness(&self) -> Liveness {
        self.liveness
    }

    /// Whether the tracked process has not exited yet.
    pub fn is_running(&self) -> bool {
        self.shared
            .lock()
            .active
            .as_ref()
            .is_some_and(Instance::is_alive)
    }

    pub fn pid(&self) -> Option<u32> {
        let slot = self.shared.lock();
        slot.active.as_ref().filter(|i| i.is_alive()).and_then(|i| i.pid)
    }

    /// Launch `path` in continuous mode.
    ///
    /// A still-running instance is stopped first (raising its manual quit
    /// notification) before the new one starts. `on_quit` is called for this
    /// instance's notification only, after the supervisor-wide observers.
    ///
    /// The executable is not re-validated here; an invalid path surfaces as
    /// a launch error.
    pub async fn start_continuous(
        &self,
        path: &Path,
        args: &[String],
        on_quit: Option<QuitCallback>,
    ) -> Result<()> {
        let _control = self.control.lock().await;

        if self.stop_locked().await {
            debug!("previous instance stopped before starting a new one");
        }

        self.launch(path, args, on_quit)
    }

    /// Stop the running instance, if any.
    ///
    /// Idempotent: when nothing is running this is a no-op and no
    /// notification is raised. Returns whether an instance was stopped.
    pub async fn stop(&self) -> bool {
        let _control = self.control.lock().await;
        self.stop_locked().await
    }

    /// Stop and start again with the same path and arguments as the most
    /// recent instance.
    pub async fn restart(&self, on_quit: Option<QuitCallback>) -> Result<()> {
        let _control = self.control.lock().await;

        let previous = {
            let slot = self.shared.lock();
            slot.active
                .as_ref()
                .map(|i| (i.path.clone(), i.args.clone(), i.on_quit.clone()))
        };
        let Some((path, args, previous_on_quit)) = previous else {
            return Err(TrayError::ConfigError(
                "nothing to restart: no instance was started yet".to_string(),
            ));
        };

        self.stop_locked().await;
        self.launch(&path, &args, on_quit.or(previous_on_quit))
    }

    /// The host session is ending: stop listening for crashes so the
    /// platform can reap the process without it being reported.
    pub fn session_ending(&self) {
        let mut slot = self.shared.lock();
        if let Some(instance) = slot.active.as_mut() {
            if instance.armed || instance.crash_owed {
                instance.armed = false;
                instance.crash_owed = false;
                info!(instance = instance.id, "session ending; crash detection disarmed");
            }
        }
    }

    /// Captured standard output of the last instance.
    ///
    /// Empty while the process is still running or when there is none.
    pub fn standard_output(&self) -> String {
        self.captured(|output| output.stdout.clone())
    }

    /// Captured standard error of the last instance. Same rules as
    /// [`standard_output`](Self::standard_output).
    pub fn error_output(&self) -> String {
        self.captured(|output| output.stderr.clone())
    }

    fn captured(&self, pick: impl FnOnce(&CapturedOutput) -> String) -> String {
        let slot = self.shared.lock();
        slot.active
            .as_ref()
            .and_then(|i| i.output.as_ref())
            .map(pick)
            .unwrap_or_default()
    }

    /// Must be called with `control` held.
    async fn stop_locked(&self) -> bool {
        let (id, kill_tx, done_rx) = {
            let mut slot = self.shared.lock();
            let Some(instance) = slot.active.as_mut() else {
                return false;
            };
            if !instance.is_alive() {
                // Exited on its own: nothing to stop, but the monitor must
                // finish its report before the slot can be reused.
                (instance.id, None, instance.done_rx.take())
            } else if instance.kill_tx.is_none() {
                return false;
            } else {
                // Disarm before killing.
                instance.armed = false;
                let parts = (instance.id, instance.kill_tx.take(), instance.done_rx.take());
                slot.state = SupervisorState::Stopping;
                parts
            }
        };

        let Some(kill_tx) = kill_tx else {
            if let Some(done_rx) = done_rx {
                let _ = done_rx.await;
            }
            debug!(instance = id, "stop requested after the process had already exited");
            return false;
        };

        self.shared.log.info("Stopped redshift instance.");

        // The monitor may already be past its select; it exits anyway.
        let _ = kill_tx.send(());
        if let Some(done_rx) = done_rx {
            if done_rx.await.is_err() {
                warn!(instance = id, "monitor task ended without recording the exit");
            }
        }

        let (notification, on_quit) = {
            let mut slot = self.shared.lock();
            slot.state = SupervisorState::Terminated;
            match slot.active.as_ref() {
                Some(instance) => (instance.notification(true), instance.on_quit.clone()),
                None => return true,
            }
        };

        self.shared.deliver(notification, on_quit);
        true
    }

    /// Must be called with `control` held.
    fn launch(&self, path: &Path, args: &[String], on_quit: Option<QuitCallback>) -> Result<()> {
        {
            let mut slot = self.shared.lock();
            if slot.active.as_ref().is_some_and(Instance::is_alive) {
                return Err(TrayError::InstanceStillActive);
            }
            slot.state = SupervisorState::Starting;
        }

        self.shared.log.info(format!(
            "Starting redshift with args '{}'",
            args.join(" ")
        ));

        let mut cmd = Command::new(path);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(source) => {
                self.shared
                    .log
                    .error(format!("Could not start '{}': {source}", path.display()));
                let mut slot = self.shared.lock();
                slot.state = if slot.active.is_some() {
                    SupervisorState::Terminated
                } else {
                    SupervisorState::Idle
                };
                return Err(TrayError::Launch {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let pid = child.id();
        let (kill_tx, kill_rx) = oneshot::channel();
        let (done_tx, done_rx) = oneshot::channel();

        {
            let mut slot = self.shared.lock();
            slot.active = Some(Instance {
                id,
                path: path.to_path_buf(),
                args: args.to_vec(),
                pid,
                armed: true,
                exited: false,
                crash_owed: false,
                exit_code: None,
                kill_tx: Some(kill_tx),
                done_rx: Some(done_rx),
                output: None,
                on_quit,
            });
            slot.state = SupervisorState::Running;
        }

        info!(instance = id, pid = ?pid, path = %path.display(), "managed process started");

        tokio::spawn(monitor(Arc::clone(&self.shared), id, child, kill_rx, done_tx));

        if self.liveness.mode == LivenessMode::Poll {
            let shared = Arc::clone(&self.shared);
            let delay = self.liveness.poll_delay;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                shared.poll_check(id);
            });
        }

        Ok(())
    }
}

impl Drop for ProcessSupervisor {
    fn drop(&mut self) {
        // Kill without notifying; the monitor task still reaps the child.
        let mut slot = self.shared.lock();
        if let Some(instance) = slot.active.as_mut() {
            instance.armed = false;
            if let Some(kill_tx) = instance.kill_tx.take() {
                let _ = kill_tx.send(());
            }
        }
    }
}

/// Owns the child: waits for it to exit (or kills it on request), marks the
/// exit at once, then collects the output and reports.
async fn monitor(
    shared: Arc<Shared>,
    id: u64,
    mut child: Child,
    kill_rx: oneshot::Receiver<()>,
    done_tx: oneshot::Sender<()>,
) {
    let stdout = spawn_drain(child.stdout.take());
    let stderr = spawn_drain(child.stderr.take());

    let status = tokio::select! {
        status = child.wait() => status,
        // A dropped sender means the supervisor is gone: kill as well.
        _ = kill_rx => {
            debug!(instance = id, "kill requested");
            if let Err(e) = child.start_kill() {
                warn!(instance = id, error = %e, "failed to kill managed process");
            }
            child.wait().await
        }
    };

    let exit_code = match status {
        Ok(status) => {
            debug!(instance = id, ?status, "managed process exited");
            status.code()
        }
        Err(e) => {
            warn!(instance = id, error = %e, "waiting for managed process failed");
            None
        }
    };

    shared.mark_exited(id, exit_code);

    let output = CapturedOutput {
        stdout: stdout.collect().await,
        stderr: stderr.collect().await,
    };

    shared.record_output(id, output);
    let _ = done_tx.send(());
}

/// Background reader that keeps a pipe from filling up.
struct Drain {
    buf: Arc<Mutex<Vec<u8>>>,
    task: Option<JoinHandle<()>>,
}

fn spawn_drain<R>(reader: Option<R>) -> Drain
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let buf = Arc::new(Mutex::new(Vec::new()));
    let task = reader.map(|mut reader| {
        let buf = Arc::clone(&buf);
        tokio::spawn(async move {
            let mut chunk = [0u8; 4096];
            loop {
                match reader.read(&mut chunk).await {
                    Ok(0) => break,
                    Ok(n) => {
                        let mut bytes = buf.lock().unwrap_or_else(|e| e.into_inner());
                        bytes.extend_from_slice(&chunk[..n]);
                    }
                    Err(e) => {
                        debug!(error = %e, "reading managed process output failed");
                        break;
                    }
                }
            }
        })
    });
    Drain { buf, task }
}

impl Drain {
    /// Wait briefly for EOF, then return whatever was read.
    async fn collect(self) -> String {
        if let Some(mut task) = self.task {
            if tokio::time::timeout(OUTPUT_DRAIN_GRACE, &mut task).await.is_err() {
                warn!("managed process output still open after exit; truncating");
                task.abort();
            }
        }
        let bytes = self.buf.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}
