use clap::{Parser, Subcommand};

/// Printed when neither subcommand is given
pub const MISSING_COMMAND: &str = "Argument {start,stop} required.";

/// rireki - keep a shell history file free of duplicate lines
#[derive(Parser, Debug)]
#[command(name = "rireki")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Start watching $HIST_DIRS_FILE, replacing any running instance
    Start,

    /// Stop the running instance
    Stop,
}
