//! Configuration for rireki
//!
//! Resolution order (highest priority first):
//! 1. Environment variables (`HIST_DIRS_FILE`, `RIREKI_*`)
//! 2. User config file (`~/.config/rireki/config.toml`, XDG aware)
//! 3. Built-in defaults
//!
//! The home directory can be overridden with `RIREKI_HOME`, which also moves
//! the config directory underneath it. Tests use it to keep the lock file and
//! config out of the real home.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::error::{RirekiError, RirekiResult};
use crate::lock::LOCK_FILE_NAME;
use crate::watcher::{DEFAULT_INTERVAL, MIN_INTERVAL};

/// Path of the file to keep deduplicated
pub const WATCH_FILE_VAR: &str = "HIST_DIRS_FILE";
/// Poll interval in milliseconds
pub const INTERVAL_VAR: &str = "RIREKI_INTERVAL_MS";
/// Lock file location override
pub const LOCK_FILE_VAR: &str = "RIREKI_LOCK_FILE";
/// Explicit config file path
pub const CONFIG_FILE_VAR: &str = "RIREKI_CONFIG";
/// Home directory override
pub const HOME_VAR: &str = "RIREKI_HOME";

/// Keys accepted in `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// File to watch
    pub file: Option<PathBuf>,
    /// Poll interval in milliseconds
    pub interval_ms: Option<u64>,
    /// Lock file location
    pub lock_file: Option<PathBuf>,
}

/// Non-fatal configuration warning (unknown key in the config file)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
}

/// Fully resolved settings for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// File to watch; `None` means `start` idles without a watcher
    pub watch_file: Option<PathBuf>,
    pub interval: Duration,
    pub lock_file: PathBuf,
}

impl Config {
    /// Resolve from the process environment and the user's config file.
    pub fn load() -> RirekiResult<(Self, Vec<ConfigWarning>)> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Resolve using `get_env` in place of the process environment.
    pub fn resolve(
        get_env: impl Fn(&str) -> Option<String>,
    ) -> RirekiResult<(Self, Vec<ConfigWarning>)> {
        let home = home_dir(&get_env);

        let (file_config, warnings) = match config_file_path(&get_env, home.as_deref()) {
            Some(path) if path.exists() => load_with_warnings(&path)?,
            _ => (FileConfig::default(), Vec::new()),
        };

        let config = Self::from_parts(file_config, home.as_deref(), &get_env)?;
        Ok((config, warnings))
    }

    /// Resolve from the process environment and defaults only.
    ///
    /// Used by `stop` when the config file cannot be parsed, so a running
    /// instance can always be shut down.
    pub fn load_ignoring_file() -> RirekiResult<Self> {
        Self::resolve_ignoring_file(|key| std::env::var(key).ok())
    }

    pub fn resolve_ignoring_file(get_env: impl Fn(&str) -> Option<String>) -> RirekiResult<Self> {
        let home = home_dir(&get_env);
        Self::from_parts(FileConfig::default(), home.as_deref(), &get_env)
    }

    fn from_parts(
        file_config: FileConfig,
        home: Option<&Path>,
        get_env: &impl Fn(&str) -> Option<String>,
    ) -> RirekiResult<Self> {
        // An empty HIST_DIRS_FILE counts as unset
        let watch_file = non_empty(get_env(WATCH_FILE_VAR))
            .map(PathBuf::from)
            .or(file_config.file);

        let file_interval_ms = file_config.interval_ms.filter(|ms| {
            if *ms == 0 {
                warn!("Invalid interval_ms value 0 in config file, expected a positive number of milliseconds");
            }
            *ms > 0
        });
        let interval_ms = match non_empty(get_env(INTERVAL_VAR)) {
            Some(raw) => parse_interval_ms(&raw).or_else(|| {
                warn!("Invalid {INTERVAL_VAR} value '{raw}', expected a positive number of milliseconds");
                file_interval_ms
            }),
            None => file_interval_ms,
        };
        let interval = match interval_ms {
            Some(ms) => Duration::from_millis(ms).max(MIN_INTERVAL),
            None => DEFAULT_INTERVAL,
        };

        let lock_file = match non_empty(get_env(LOCK_FILE_VAR))
            .map(PathBuf::from)
            .or(file_config.lock_file)
        {
            Some(path) => path,
            None => home
                .map(|h| h.join(LOCK_FILE_NAME))
                .ok_or(RirekiError::HomeNotFound)?,
        };

        Ok(Self {
            watch_file,
            interval,
            lock_file,
        })
    }
}

/// Parse and collect unknown keys as warnings instead of failing.
pub fn load_with_warnings(path: &Path) -> RirekiResult<(FileConfig, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);
    let config: FileConfig = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| RirekiError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|key| ConfigWarning {
            key,
            file: path.to_path_buf(),
        })
        .collect();

    Ok((config, warnings))
}

/// `RIREKI_HOME` if set, else the user's home directory.
fn home_dir(get_env: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    non_empty(get_env(HOME_VAR))
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
}

fn config_file_path(
    get_env: &impl Fn(&str) -> Option<String>,
    home: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(explicit) = non_empty(get_env(CONFIG_FILE_VAR)) {
        return Some(PathBuf::from(explicit));
    }

    let config_dir = if get_env(HOME_VAR).is_some() {
        home.map(|h| h.join(".config"))
    } else {
        non_empty(get_env("XDG_CONFIG_HOME"))
            .map(PathBuf::from)
            .or_else(|| home.map(|h| h.join(".config")))
    };

    config_dir.map(|dir| dir.join("rireki").join("config.toml"))
}

fn parse_interval_ms(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|ms| *ms > 0)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
