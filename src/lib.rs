//! rireki - keeps a shell history file free of duplicate lines
//!
//! A single background instance polls one file and rewrites it whenever it
//! changes, keeping only the last occurrence of every line. A PID lock file
//! in the home directory makes sure only one instance runs at a time.

pub mod config;
pub mod controller;
pub mod error;
pub mod lock;
pub mod logging;
pub mod signal;
pub mod watcher;

// Re-exports for convenience
pub use config::{Config, ConfigWarning};
pub use controller::{Controller, StopOutcome, GRACE_PERIOD};
pub use error::{RirekiError, RirekiResult};
pub use lock::{LockFile, LockGuard};
pub use watcher::{dedup_keep_last, DedupOutcome, DedupPlan, FileWatcher, LineMultiset};
