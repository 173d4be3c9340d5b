//! PID lock file for single-instance enforcement
//!
//! The lock file lives at a fixed path (by default `~/.rireki.pid`) and holds
//! the PID of the running instance as plain decimal text, nothing else.
//!
//! While an instance runs it also keeps an advisory exclusive lock
//! (`flock`/`LockFileEx` via `fs2`) on the file, so two simultaneous starts
//! cannot both believe they own it. Existence of the file alone still means
//! "an instance is (or was) running": `stop` relies on that to find the PID
//! and to clean up after an owner that died without removing it.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, warn};

use crate::error::{RirekiError, RirekiResult};

/// File name of the lock file inside the home directory
pub const LOCK_FILE_NAME: &str = ".rireki.pid";

/// Handle on the well-known lock file path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockFile {
    path: PathBuf,
}

impl LockFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the PID stored in the lock file, `None` if there is no lock file.
    ///
    /// An empty file also reads as `None`: `acquire` creates the file before
    /// writing the PID into it.
    pub fn read(&self) -> RirekiResult<Option<u32>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed
            .parse::<u32>()
            .map(Some)
            .map_err(|_| RirekiError::InvalidLock {
                path: self.path.clone(),
                content: trimmed.to_string(),
            })
    }

    /// Write `pid` into the lock file and hold it until the guard is dropped.
    ///
    /// Previous content is overwritten without looking at it; callers evict
    /// any existing instance first. Fails with [`RirekiError::LockHeld`] only
    /// when another live process still holds the advisory lock.
    pub fn acquire(&self, pid: u32) -> RirekiResult<LockGuard> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Not truncated on open: a live owner's PID must survive a failed attempt.
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;

        match file.try_lock_exclusive() {
            Ok(()) => {}
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                return Err(RirekiError::LockHeld {
                    path: self.path.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        }

        file.set_len(0)?;
        file.write_all(pid.to_string().as_bytes())?;
        file.sync_all()?;

        debug!(path = %self.path.display(), pid, "lock acquired");

        Ok(LockGuard {
            file,
            lock: self.clone(),
            pid,
        })
    }

    /// Delete the lock file. Missing file is not an error.
    pub fn release(&self) -> RirekiResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "lock file removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Ownership of the lock file for the lifetime of a running instance.
///
/// Dropping the guard removes the lock file, but only while it still names
/// this guard's PID: after a forced cleanup another instance may already
/// have written its own.
#[derive(Debug)]
pub struct LockGuard {
    file: File,
    lock: LockFile,
    pid: u32,
}

impl LockGuard {
    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn path(&self) -> &Path {
        self.lock.path()
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        match self.lock.read() {
            Ok(Some(pid)) if pid == self.pid => {
                if let Err(e) = self.lock.release() {
                    warn!(path = %self.lock.path().display(), "failed to remove lock file: {e}");
                }
            }
            Ok(owner) => {
                debug!(?owner, pid = self.pid, "lock file taken over, leaving it in place");
            }
            Err(e) => {
                warn!(path = %self.lock.path().display(), "failed to read lock file on release: {e}");
            }
        }

        let _ = FileExt::unlock(&self.file);
    }
}
