//! Fake `redshift` executables written as shell scripts.
//!
//! Each script answers the version probe (`-V`) with a configurable line and
//! runs an arbitrary shell body otherwise. Long-running bodies should `exec`
//! their final command so that killing the script kills the whole thing.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A script in its own temp directory; removed on drop.
pub struct FakeExecutable {
    dir: TempDir,
    path: PathBuf,
}

impl FakeExecutable {
    /// Script that prints `version_line` for `-V` and runs `body` otherwise.
    pub fn new(version_line: &str, body: &str) -> Self {
        Self::named("redshift", version_line, body)
    }

    pub fn named(name: &str, version_line: &str, body: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(name);
        let script = format!(
            "#!/bin/sh\nif [ \"$1\" = \"-V\" ]; then\n  echo \"{version_line}\"\n  exit 0\nfi\n{body}\n"
        );
        write_executable(&path, &script);
        Self { dir, path }
    }

    /// `redshift 1.12` that keeps running until killed.
    pub fn long_running() -> Self {
        Self::new("redshift 1.12", "echo started\nexec sleep 60")
    }

    /// `redshift 1.12` that writes to both streams and exits with `code`.
    pub fn crashing(stdout: &str, stderr: &str, code: i32) -> Self {
        Self::new(
            "redshift 1.12",
            &format!("echo \"{stdout}\"\necho \"{stderr}\" >&2\nexit {code}"),
        )
    }

    /// `redshift 1.12` that writes its arguments, one per line, to
    /// [`args_file`](Self::args_file) and keeps running. The reset
    /// invocation (`-x`) exits at once without recording.
    pub fn recording_args() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("redshift");
        let args_file = dir.path().join("args.txt");
        let script = format!(
            "#!/bin/sh\n\
             if [ \"$1\" = \"-V\" ]; then\n  echo \"redshift 1.12\"\n  exit 0\nfi\n\
             case \" $* \" in *\" -x \"*) exit 0 ;; esac\n\
             printf '%s\\n' \"$@\" > \"{}\"\n\
             exec sleep 60\n",
            args_file.display()
        );
        write_executable(&path, &script);
        Self { dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn args_file(&self) -> PathBuf {
        self.dir.path().join("args.txt")
    }

    /// Arguments recorded by a [`recording_args`](Self::recording_args) script.
    pub fn recorded_args(&self) -> Option<Vec<String>> {
        let text = fs::read_to_string(self.args_file()).ok()?;
        Some(text.lines().map(str::to_string).collect())
    }
}

/// Write `contents` to `path` and mark it executable.
pub fn write_executable(path: &Path, contents: &str) {
    fs::write(path, contents).expect("write script");
    let mut perms = fs::metadata(path).expect("stat script").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("chmod script");
}
