//! Start/stop orchestration for the single background instance
//!
//! `start` evicts whatever instance currently owns the lock file, takes the
//! lock for the current process and drives the watcher on a current-thread
//! runtime until the shutdown token fires. `stop` interrupts the owner named
//! in the lock file and, if it does not clean up within the grace period,
//! removes the lock file itself.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{Config, WATCH_FILE_VAR};
use crate::error::RirekiResult;
use crate::lock::LockFile;
use crate::signal::send_interrupt;
use crate::watcher::FileWatcher;

/// How long `stop` waits for the signalled instance to remove its lock
pub const GRACE_PERIOD: Duration = Duration::from_secs(1);

/// What `stop` found and did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// No lock file; nothing was touched
    NotRunning,
    /// The instance exited and removed its own lock file
    Stopped { pid: u32 },
    /// The lock file outlived the grace period and was deleted
    ForcedCleanup { pid: u32 },
}

#[derive(Debug, Clone)]
pub struct Controller {
    config: Config,
    lock: LockFile,
    grace_period: Duration,
}

impl Controller {
    pub fn new(config: Config) -> Self {
        let lock = LockFile::new(config.lock_file.clone());
        Self {
            config,
            lock,
            grace_period: GRACE_PERIOD,
        }
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    pub fn lock(&self) -> &LockFile {
        &self.lock
    }

    /// Become the running instance and watch until `shutdown` is cancelled.
    ///
    /// The lock is released on every way out of this function, errors
    /// included.
    pub fn start(&self, shutdown: CancellationToken) -> RirekiResult<()> {
        if let Some(pid) = self.lock.read()? {
            info!(pid, "replacing running instance");
            self.stop()?;
        }

        let pid = std::process::id();
        let guard = self.lock.acquire(pid)?;
        info!(pid = guard.pid(), lock = %guard.path().display(), "started");

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        let result = runtime.block_on(self.run(shutdown));

        info!(pid, "shutting down");
        result
    }

    async fn run(&self, shutdown: CancellationToken) -> RirekiResult<()> {
        let Some(path) = &self.config.watch_file else {
            warn!("{WATCH_FILE_VAR} is not set; holding the lock without watching anything");
            shutdown.cancelled().await;
            return Ok(());
        };

        let mut watcher = FileWatcher::new(path, self.config.interval)?
            .with_cancellation(shutdown.child_token());
        watcher.watch().await
    }

    /// Interrupt the running instance, if any.
    ///
    /// Signalling a PID that is no longer alive fails and leaves the lock
    /// file in place.
    pub fn stop(&self) -> RirekiResult<StopOutcome> {
        let Some(pid) = self.lock.read()? else {
            return Ok(StopOutcome::NotRunning);
        };

        if pid == std::process::id() {
            // Stale lock whose PID got recycled for us
            warn!(pid, "lock file names the current process, removing it");
            self.lock.release()?;
            return Ok(StopOutcome::ForcedCleanup { pid });
        }

        info!(pid, "sending interrupt");
        send_interrupt(pid)?;
        std::thread::sleep(self.grace_period);

        if self.lock.exists() {
            warn!(
                pid,
                grace_ms = self.grace_period.as_millis() as u64,
                "lock file still present after grace period, removing it"
            );
            self.lock.release()?;
            return Ok(StopOutcome::ForcedCleanup { pid });
        }

        Ok(StopOutcome::Stopped { pid })
    }
}
