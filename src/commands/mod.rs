//! Subcommand handlers

mod start;
mod stop;

pub use start::cmd_start;
pub use stop::cmd_stop;
