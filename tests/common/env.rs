//! Test environment builder for isolated rireki testing.
//!
//! Every `TestEnv` gets its own temporary home directory, so the lock file
//! (`~/.rireki.pid`) and config never touch the real user's home.

use std::fs::{self, File};
use std::path::PathBuf;
use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant, SystemTime};
use tempfile::TempDir;

/// How long helpers wait for a background instance to react
pub const TIMEOUT: Duration = Duration::from_secs(10);

/// Result of running a rireki CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl From<Output> for TestResult {
    fn from(output: Output) -> Self {
        TestResult {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

/// Isolated home directory with a history file inside it.
pub struct TestEnv {
    pub home_dir: TempDir,
    rireki_bin: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            home_dir: TempDir::new().expect("Failed to create temp home"),
            rireki_bin: PathBuf::from(env!("CARGO_BIN_EXE_rireki")),
        }
    }

    pub fn home_path(&self, relative: &str) -> PathBuf {
        self.home_dir.path().join(relative)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.home_path(".rireki.pid")
    }

    pub fn history_path(&self) -> PathBuf {
        self.home_path("hist_dirs")
    }

    pub fn write_history(&self, content: &str) {
        fs::write(self.history_path(), content).expect("Failed to write history");
    }

    /// Rewrite the history file and move its mtime past anything seen so far.
    pub fn rewrite_history(&self, content: &str) {
        self.write_history(content);
        let later = SystemTime::now() + Duration::from_secs(5);
        File::options()
            .write(true)
            .open(self.history_path())
            .and_then(|f| f.set_modified(later))
            .expect("Failed to bump history mtime");
    }

    pub fn read_history(&self) -> String {
        fs::read_to_string(self.history_path()).unwrap_or_default()
    }

    pub fn read_lock_pid(&self) -> Option<u32> {
        fs::read_to_string(self.lock_path())
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.rireki_bin);
        cmd.current_dir(self.home_dir.path())
            .args(args)
            .env("RIREKI_HOME", self.home_dir.path())
            .env("HOME", self.home_dir.path())
            .env("XDG_CONFIG_HOME", self.home_path(".config"))
            .env("HIST_DIRS_FILE", self.history_path())
            .env("RIREKI_INTERVAL_MS", "20")
            .env_remove("RIREKI_LOCK_FILE")
            .env_remove("RIREKI_CONFIG")
            .env_remove("RIREKI_LOG");
        cmd
    }

    /// Run rireki to completion
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let mut cmd = self.command(args);
        for (key, value) in env_vars {
            cmd.env(key, value);
        }
        cmd.output().expect("Failed to execute rireki").into()
    }

    /// Launch `rireki start` in the background
    pub fn spawn_start(&self) -> Child {
        self.spawn_start_with_env(&[])
    }

    pub fn spawn_start_with_env(&self, env_vars: &[(&str, &str)]) -> Child {
        let mut cmd = self.command(&["start"]);
        for (key, value) in env_vars {
            cmd.env(key, value);
        }
        cmd.stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to start rireki")
    }

    /// Wait until the lock file names `pid`
    pub fn wait_for_lock_owner(&self, pid: u32) -> bool {
        wait_until(TIMEOUT, || self.read_lock_pid() == Some(pid))
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

pub fn wait_until(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    check()
}

/// Wait for a background instance to exit, killing it on timeout.
pub fn wait_for_exit(child: &mut Child) -> Option<std::process::ExitStatus> {
    let mut status = None;
    wait_until(TIMEOUT, || {
        status = child.try_wait().expect("Failed to poll child");
        status.is_some()
    });
    if status.is_none() {
        let _ = child.kill();
        let _ = child.wait();
    }
    status
}
