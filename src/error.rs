//! Error types for rireki
//!
//! Uses `thiserror` for library errors; the binary wraps them in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for rireki operations
pub type RirekiResult<T> = Result<T, RirekiError>;

/// Main error type for rireki operations
#[derive(Error, Debug)]
pub enum RirekiError {
    /// The file to watch does not exist or is not a regular file
    #[error("watched file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Lock file content is not a PID
    #[error("invalid lock file {path}: expected a PID, found '{content}'")]
    InvalidLock { path: PathBuf, content: String },

    /// Another live process holds the advisory lock
    #[error("lock file {path} is held by another running instance")]
    LockHeld { path: PathBuf },

    /// Delivering the shutdown signal failed (usually a stale PID)
    #[error("failed to signal process {pid}: {source}")]
    SignalFailed {
        pid: u32,
        #[source]
        source: std::io::Error,
    },

    /// Malformed configuration file
    #[error("invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// No home directory to place the lock file in
    #[error("could not determine home directory (set RIREKI_HOME or RIREKI_LOCK_FILE)")]
    HomeNotFound,
}
