//! Delivering the shutdown signal to a running instance

use std::io;

use crate::error::{RirekiError, RirekiResult};

/// Ask process `pid` to shut down gracefully by sending it SIGINT.
///
/// A PID that no longer names a live process is an error; nothing is retried.
#[cfg(unix)]
pub fn send_interrupt(pid: u32) -> RirekiResult<()> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    // 0 and negative values address process groups, never a single instance
    let raw = match i32::try_from(pid) {
        Ok(raw) if raw > 0 => raw,
        _ => return Err(invalid_pid(pid)),
    };

    kill(Pid::from_raw(raw), Signal::SIGINT).map_err(|errno| RirekiError::SignalFailed {
        pid,
        source: io::Error::from(errno),
    })
}

#[cfg(not(unix))]
pub fn send_interrupt(pid: u32) -> RirekiResult<()> {
    Err(RirekiError::SignalFailed {
        pid,
        source: io::Error::new(
            io::ErrorKind::Unsupported,
            "signalling another process is only supported on Unix",
        ),
    })
}

#[cfg_attr(not(unix), allow(dead_code))]
fn invalid_pid(pid: u32) -> RirekiError {
    RirekiError::SignalFailed {
        pid,
        source: io::Error::new(io::ErrorKind::InvalidInput, "not a process id"),
    }
}
