//! Common test utilities for rireki CLI tests.
//!
//! This module provides:
//! - `TestEnv`: isolated home directory plus a history file to watch
//! - Helpers to run `rireki start` in the background and wait on it

pub mod env;

pub use env::*;
