//! rireki CLI - keep a shell history file free of duplicate lines
//!
//! Usage: rireki <COMMAND>
//!
//! Commands:
//!   start   Watch $HIST_DIRS_FILE in the foreground, replacing any running instance
//!   stop    Interrupt the running instance

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing::warn;

use cli::{Cli, Commands, MISSING_COMMAND};
use rireki::{logging, Config, Controller, RirekiError};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let Some(command) = cli.command else {
        println!("{MISSING_COMMAND}");
        std::process::exit(1);
    };

    let (config, warnings) = match Config::load() {
        Ok(loaded) => loaded,
        // stop only needs the lock path; a broken config file must not block it
        Err(e @ RirekiError::Config { .. }) if command == Commands::Stop => {
            warn!("{e}; ignoring the config file");
            (Config::load_ignoring_file()?, Vec::new())
        }
        Err(e) => return Err(e.into()),
    };
    for warning in &warnings {
        warn!(
            key = %warning.key,
            file = %warning.file.display(),
            "unknown configuration key"
        );
    }

    let controller = Controller::new(config);
    match command {
        Commands::Start => commands::cmd_start(&controller),
        Commands::Stop => commands::cmd_stop(&controller),
    }
}
