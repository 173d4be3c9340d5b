//! Polling watcher that keeps one file free of duplicate lines
//!
//! Change detection is purely timestamp based: the file's modification time
//! is compared against the last value seen on every tick of a fixed-period
//! ticker. When it moved, the whole file is re-read and rewritten with only
//! the last occurrence of each line.
//!
//! Writes are optimistic. If the file changed on disk while a pass was
//! computing its result, the write is dropped and the next tick picks up
//! the newer content instead.

mod dedup;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{RirekiError, RirekiResult};

pub use dedup::{dedup_keep_last, LineMultiset};

/// Default delay between modification-time checks
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(200);

/// Shortest accepted poll interval; a zero period would spin.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Result of a single dedup pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupOutcome {
    /// Every line was already unique; nothing was written
    Unchanged,
    /// The file was rewritten without `removed` duplicate lines
    Rewritten { removed: usize },
    /// The file changed on disk mid-pass; the write was skipped
    Deferred,
}

/// Deduplicated content computed from one read of the file, not yet written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupPlan {
    content: Vec<u8>,
    removed: usize,
}

impl DedupPlan {
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn removed(&self) -> usize {
        self.removed
    }
}

/// A watched file and the state needed to detect changes to it
#[derive(Debug)]
pub struct FileWatcher {
    path: PathBuf,
    mtime: SystemTime,
    interval: Duration,
    cancel: CancellationToken,
}

impl FileWatcher {
    /// Start watching `path`, deduplicating it once right away.
    ///
    /// Fails with [`RirekiError::FileNotFound`] unless `path` is an existing
    /// regular file.
    pub fn new(path: impl AsRef<Path>, interval: Duration) -> RirekiResult<Self> {
        let path = std::path::absolute(path.as_ref())?;
        let mtime = match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => meta.modified()?,
            _ => return Err(RirekiError::FileNotFound { path }),
        };

        let mut watcher = Self {
            path,
            mtime,
            interval: interval.max(MIN_INTERVAL),
            cancel: CancellationToken::new(),
        };
        watcher.deduplicate()?;
        Ok(watcher)
    }

    /// Tie this watcher's lifetime to an externally owned token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Modification time as of the last successful check or write
    pub fn last_modified(&self) -> SystemTime {
        self.mtime
    }

    /// Handle that stops [`FileWatcher::watch`] when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stop the poll loop. A running [`FileWatcher::watch`] returns at its
    /// next await point.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Report whether the file's mtime moved since the last check, and
    /// remember the new value if it did.
    pub fn is_modified(&mut self) -> RirekiResult<bool> {
        let mtime = self.current_mtime()?;
        if mtime == self.mtime {
            return Ok(false);
        }
        self.mtime = mtime;
        Ok(true)
    }

    /// Run one full dedup pass: [`FileWatcher::plan`] then
    /// [`FileWatcher::apply`].
    pub fn deduplicate(&mut self) -> RirekiResult<DedupOutcome> {
        match self.plan()? {
            Some(plan) => self.apply(plan),
            None => Ok(DedupOutcome::Unchanged),
        }
    }

    /// Read the file and compute its deduplicated content.
    ///
    /// `None` when every line is already unique.
    pub fn plan(&self) -> RirekiResult<Option<DedupPlan>> {
        let content = fs::read(&self.path)?;
        let lines = LineMultiset::from_bytes(&content);
        if lines.is_unique() {
            return Ok(None);
        }

        let kept = lines.retain_last();
        let removed = lines.len() - kept.len();
        Ok(Some(DedupPlan {
            content: kept.concat(),
            removed,
        }))
    }

    /// Write `plan` back unless the file changed on disk since it was read.
    ///
    /// A skipped write leaves the stored mtime alone, so the next
    /// [`FileWatcher::is_modified`] still reports the newer content.
    pub fn apply(&mut self, plan: DedupPlan) -> RirekiResult<DedupOutcome> {
        if self.current_mtime()? != self.mtime {
            warn!(path = %self.path.display(), "file changed during dedup pass, deferring write");
            return Ok(DedupOutcome::Deferred);
        }

        // Overwrite in place so appenders keep writing to the same inode
        fs::write(&self.path, &plan.content)?;
        self.mtime = self.current_mtime()?;

        info!(path = %self.path.display(), removed = plan.removed, "removed duplicate lines");
        Ok(DedupOutcome::Rewritten {
            removed: plan.removed,
        })
    }

    /// Poll until cancelled, deduplicating after every detected change.
    ///
    /// Each tick does one mtime check (plus a pass when needed) and yields
    /// back to the scheduler. I/O errors end the loop.
    pub async fn watch(&mut self) -> RirekiResult<()> {
        let cancel = self.cancel.clone();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(path = %self.path.display(), interval_ms = self.interval.as_millis() as u64, "watching");

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if self.is_modified()? {
                        debug!(path = %self.path.display(), "change detected");
                        self.deduplicate()?;
                    }
                }
            }
        }

        debug!(path = %self.path.display(), "watcher stopped");
        Ok(())
    }

    fn current_mtime(&self) -> RirekiResult<SystemTime> {
        Ok(fs::metadata(&self.path)?.modified()?)
    }
}
