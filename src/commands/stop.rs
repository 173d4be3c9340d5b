use anyhow::Result;
use tracing::info;

use rireki::{Controller, StopOutcome};

pub fn cmd_stop(controller: &Controller) -> Result<()> {
    match controller.stop()? {
        StopOutcome::NotRunning => info!("no running instance"),
        StopOutcome::Stopped { pid } => info!(pid, "stopped"),
        StopOutcome::ForcedCleanup { pid } => info!(pid, "stopped, stale lock file removed"),
    }
    Ok(())
}
