//! Configuration for the board.
//!
//! Priority, highest first:
//! 1. CLI arguments (and their environment variables)
//! 2. TOML config file (`~/.config/taskers/config.toml`)
//! 3. Compiled defaults
//!
//! A missing default config file is not an error. An explicit `--config` path
//! that cannot be read is.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::transfer::EXPORT_FILE_NAME;

/// Where tasks are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreTarget {
    /// Process-local; nothing survives a restart.
    Memory,
    /// A JSON task document on disk.
    File(PathBuf),
}

impl StoreTarget {
    /// `memory` selects the in-process store; anything else is a file path.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value == "memory" {
            Self::Memory
        } else {
            Self::File(PathBuf::from(value))
        }
    }
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    store: StoreFileConfig,
    ui: UiFileConfig,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct StoreFileConfig {
    path: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UiFileConfig {
    poll_timeout_ms: Option<u64>,
    confirm_destructive: Option<bool>,
    export_path: Option<PathBuf>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreTarget,
    /// How long the TUI waits for input before redrawing.
    pub poll_timeout: Duration,
    /// Ask before deleting a task or resetting the board.
    pub confirm_destructive: bool,
    /// Where `x` in the TUI and `taskers export` write by default.
    pub export_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreTarget::File(default_store_path()),
            poll_timeout: Duration::from_millis(100),
            confirm_destructive: true,
            export_path: PathBuf::from(EXPORT_FILE_NAME),
        }
    }
}

fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("taskers").join("tasks.json"))
        .unwrap_or_else(|| PathBuf::from("kanban_board.json"))
}

impl Config {
    /// Loads the config file and applies CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an explicit config file cannot be read, or
    /// any config file cannot be parsed.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            store: cli
                .store
                .as_deref()
                .or(file.store.path.as_deref())
                .map_or(defaults.store, StoreTarget::parse),
            poll_timeout: file
                .ui
                .poll_timeout_ms
                .map_or(defaults.poll_timeout, Duration::from_millis),
            confirm_destructive: !cli.no_confirm
                && file
                    .ui
                    .confirm_destructive
                    .unwrap_or(defaults.confirm_destructive),
            export_path: file.ui.export_path.clone().unwrap_or(defaults.export_path),
        }
    }
}

/// Commands other than the interactive board.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Write every task to a JSON file.
    Export {
        /// Output file (default: `kanban_tasks.json` or the configured path).
        output: Option<PathBuf>,
    },
    /// Replace every task with the contents of a JSON file.
    Import {
        /// JSON array of tasks.
        input: PathBuf,
    },
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Five-column terminal kanban board")]
pub struct CliArgs {
    /// Path to config file (default: `~/.config/taskers/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Task document path, or `memory` for a throwaway board.
    #[arg(long, env = "TASKERS_STORE")]
    pub store: Option<String>,

    /// Delete and reset without asking.
    #[arg(long)]
    pub no_confirm: bool,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKERS_LOG")]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/taskers.log`).
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

fn load_config_file(explicit_path: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    }

    let Some(config_dir) = dirs::config_dir() else {
        return Ok(ConfigFile::default());
    };
    let path = config_dir.join("taskers").join("config.toml");

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
