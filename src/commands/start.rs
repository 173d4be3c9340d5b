use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use rireki::Controller;

pub fn cmd_start(controller: &Controller) -> Result<()> {
    // Ctrl+C / SIGTERM request a clean shutdown instead of killing the process
    let shutdown = CancellationToken::new();
    let handler_token = shutdown.clone();

    ctrlc::set_handler(move || {
        handler_token.cancel();
    })
    .context("Error setting Ctrl+C handler")?;

    controller.start(shutdown)?;
    Ok(())
}
