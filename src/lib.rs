// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod log_sink;
pub mod logging;
pub mod types;
pub mod version;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{
    default_settings_path, import_redshift_config, load_and_validate, load_or_default,
    save_settings, validate_config, RawSettingsFile, SettingsSnapshot, SupervisorSection,
};
use crate::engine::{
    CoreRuntime, ExitReason, Runtime, RuntimeEvent, RuntimeOptions, SettingsReloader,
};
use crate::exec::{
    arguments_for, kill_stale_instances, reset_screen, ExecutableValidator, Liveness,
    RealProcessBackend,
};
use crate::fs::{FileSystem, RealFileSystem};
use crate::log_sink::LogSink;
use crate::types::{ConfigStatus, RenderMethod};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - settings loading (and the optional redshift.conf import)
/// - the one-shot modes (`--check`, `--print-args`, `--reset`)
/// - stale instance cleanup
/// - supervisor backend / core / runtime
/// - signal handling
pub async fn run(args: CliArgs) -> Result<()> {
    let log = LogSink::new();
    let settings_path = args.settings.clone().unwrap_or_else(default_settings_path);
    debug!(path = %settings_path.display(), "using settings file");

    let mut raw = load_or_default(&settings_path)?.into_raw();

    if let Some(conf) = args.import_config.as_deref() {
        raw = import_config_into(&RealFileSystem, conf, raw, &settings_path, &log)?;
    }

    let settings = SettingsSnapshot::try_from(apply_overrides(raw, &args))?;
    let validator = validator_for(&settings.supervisor, &log);

    if args.print_args {
        println!("{}", arguments_for(&settings).join(" "));
        return Ok(());
    }

    if args.check {
        return check(&validator, &settings, &log).await;
    }

    if args.reset {
        reset_screen(settings.executable_path(), settings.redshift.method, &log).await?;
        return Ok(());
    }

    if !settings.executable_path().as_os_str().is_empty() {
        kill_stale_instances(settings.executable_path(), &log);
    }

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let backend = RealProcessBackend::new(
        log.clone(),
        liveness_for(&settings.supervisor),
        validator,
        rt_tx.clone(),
    );

    spawn_signal_listeners(rt_tx);

    let options = RuntimeOptions {
        enabled_on_start: settings.redshift.enabled_on_start,
        max_restarts: settings.supervisor.max_restarts,
    };
    let max_restarts = options.max_restarts;

    let reloader = settings_reloader(settings_path, args.dummy);
    let runtime = Runtime::new(CoreRuntime::new(options), rt_rx, backend, settings, log)
        .with_reloader(reloader);

    match runtime.run().await? {
        ExitReason::GaveUp => bail!("redshift kept crashing; gave up after {max_restarts} restarts"),
        reason => {
            info!(?reason, "redshift-tray stopped");
            Ok(())
        }
    }
}

/// Merge a redshift.conf into `raw` and persist the result.
fn import_config_into(
    fs: &dyn FileSystem,
    conf: &Path,
    raw: RawSettingsFile,
    settings_path: &Path,
    log: &LogSink,
) -> Result<RawSettingsFile> {
    let text = fs
        .read_to_string(conf)
        .with_context(|| format!("importing {}", conf.display()))?;
    let mut imported = import_redshift_config(&text, raw, log);
    imported.redshift.config_file = Some(conf.to_path_buf());

    // Refuse to persist out-of-range values.
    SettingsSnapshot::try_from(imported.clone())?;
    save_settings(fs, settings_path, &imported)?;
    log.info(format!(
        "Imported '{}' into '{}'",
        conf.display(),
        settings_path.display()
    ));
    Ok(imported)
}

fn apply_overrides(mut raw: RawSettingsFile, args: &CliArgs) -> RawSettingsFile {
    if args.dummy {
        raw.redshift.method = RenderMethod::Dummy;
    }
    raw
}

fn liveness_for(section: &SupervisorSection) -> Liveness {
    Liveness {
        mode: section.liveness,
        poll_delay: Duration::from_millis(section.poll_delay_ms),
    }
}

fn validator_for(section: &SupervisorSection, log: &LogSink) -> ExecutableValidator {
    let timeout = (section.probe_timeout_ms > 0)
        .then(|| Duration::from_millis(section.probe_timeout_ms));
    ExecutableValidator::new(log.clone()).with_probe_timeout(timeout)
}

fn settings_reloader(path: PathBuf, dummy: bool) -> SettingsReloader {
    Box::new(move || {
        let mut raw = load_and_validate(&path)?.into_raw();
        if dummy {
            raw.redshift.method = RenderMethod::Dummy;
        }
        SettingsSnapshot::try_from(raw)
    })
}

/// `--check`: print both verdicts, fail when either is unusable.
async fn check(
    validator: &ExecutableValidator,
    settings: &SettingsSnapshot,
    log: &LogSink,
) -> Result<()> {
    let executable = validator.validate(settings.executable_path()).await?;
    println!("{}", executable.describe());

    let config = match settings.redshift.config_file.as_deref() {
        Some(path) => validate_config(&RealFileSystem, log, path),
        None => ConfigStatus::NotSet,
    };
    println!("redshift.conf: {config:?}");

    if !executable.is_ok() || !config.is_acceptable() {
        bail!("redshift is not usable with the current settings");
    }
    Ok(())
}

/// Ctrl-C shuts down; on unix SIGUSR1 toggles, SIGHUP reloads and SIGTERM
/// is treated as the session ending.
fn spawn_signal_listeners(tx: mpsc::Sender<RuntimeEvent>) {
    {
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    #[cfg(unix)]
    spawn_unix_signal_listeners(tx);
}

#[cfg(unix)]
fn spawn_unix_signal_listeners(tx: mpsc::Sender<RuntimeEvent>) {
    use tokio::signal::unix::{signal, SignalKind};

    let table = [
        (SignalKind::user_defined1(), "SIGUSR1", RuntimeEvent::ToggleRequested),
        (SignalKind::hangup(), "SIGHUP", RuntimeEvent::ReloadRequested),
        (SignalKind::terminate(), "SIGTERM", RuntimeEvent::SessionEnding),
    ];

    for (kind, name, event) in table {
        let mut stream = match signal(kind) {
            Ok(stream) => stream,
            Err(e) => {
                warn!(signal = name, error = %e, "failed to install signal handler");
                continue;
            }
        };
        let tx = tx.clone();
        tokio::spawn(async move {
            while stream.recv().await.is_some() {
                debug!(signal = name, "signal received");
                if tx.send(event.clone()).await.is_err() {
                    break;
                }
            }
        });
    }
}
