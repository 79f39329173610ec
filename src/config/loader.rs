//! Configuration file loading with precedence handling.

use crate::grid::GridOptions;
use crate::nav::NavigationPolicy;
use crate::render::{ViewportConfig, DEFAULT_PREFETCH_ROWS, DEFAULT_ROW_HEIGHT};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "TREEGRID_CONFIG";

/// Environment variable overriding the navigation mode.
pub const NAV_MODE_ENV: &str = "TREEGRID_NAV_MODE";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file path contains invalid UTF-8 or cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or values.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/treegrid/config.toml`:
///
/// ```toml
/// navigation_mode = "start-cell"
/// prefetch_rows = 10
/// cascade_select = false
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Height of a row in terminal lines.
    #[serde(default)]
    pub row_height: Option<u32>,

    /// Rows materialized beyond each edge of the visible window.
    #[serde(default)]
    pub prefetch_rows: Option<usize>,

    /// Navigation policy: `row`, `cell`, `start-row` or `start-cell`.
    #[serde(default)]
    pub navigation_mode: Option<NavigationPolicy>,

    /// Propagate checkbox changes through the tree.
    #[serde(default)]
    pub cascade_select: Option<bool>,

    /// Show checkboxes on every node.
    #[serde(default)]
    pub checkbox: Option<bool>,

    /// Log ignored navigation at warn level.
    #[serde(default)]
    pub warn_on_noop: Option<bool>,

    /// Keyboard movement activates the node it lands on.
    #[serde(default)]
    pub auto_activate: Option<bool>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Row height.
    pub row_height: u32,
    /// Prefetch margin in rows.
    pub prefetch_rows: usize,
    /// Navigation policy.
    pub navigation_mode: NavigationPolicy,
    /// Cascading selection.
    pub cascade_select: bool,
    /// Checkboxes on every node.
    pub checkbox: bool,
    /// Warn on ignored navigation.
    pub warn_on_noop: bool,
    /// Activate on keyboard movement.
    pub auto_activate: bool,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            row_height: DEFAULT_ROW_HEIGHT,
            prefetch_rows: DEFAULT_PREFETCH_ROWS,
            navigation_mode: NavigationPolicy::default(),
            cascade_select: true,
            checkbox: true,
            warn_on_noop: false,
            auto_activate: true,
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Runtime options for a grid built from this configuration.
    pub fn to_grid_options(&self) -> GridOptions {
        GridOptions {
            viewport: ViewportConfig {
                row_height: self.row_height.max(1),
                prefetch_rows: self.prefetch_rows,
            },
            navigation: self.navigation_mode,
            cascade_select: self.cascade_select,
            checkbox: self.checkbox,
            warn_on_noop: self.warn_on_noop,
            auto_activate: self.auto_activate,
            ..GridOptions::default()
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/treegrid/treegrid.log` on Unix-like systems,
/// or the platform state directory elsewhere. Falls back to the current
/// directory when no state directory is known.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("treegrid").join("treegrid.log")
    } else {
        PathBuf::from("treegrid.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/treegrid/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("treegrid").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `TREEGRID_CONFIG` environment variable
/// 3. Default path `~/.config/treegrid/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        if env_path.is_empty() {
            return Err(ConfigError::InvalidPath(format!("{CONFIG_ENV} is empty")));
        }
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Apply environment variable overrides to resolved config.
///
/// Checks `TREEGRID_NAV_MODE`. An unparseable value is logged and ignored.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(value) = std::env::var(NAV_MODE_ENV) {
        match value.parse::<NavigationPolicy>() {
            Ok(policy) => config.navigation_mode = policy,
            Err(err) => warn!(variable = NAV_MODE_ENV, error = %err, "ignoring override"),
        }
    }

    config
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        row_height: config.row_height.unwrap_or(defaults.row_height),
        prefetch_rows: config.prefetch_rows.unwrap_or(defaults.prefetch_rows),
        navigation_mode: config.navigation_mode.unwrap_or(defaults.navigation_mode),
        cascade_select: config.cascade_select.unwrap_or(defaults.cascade_select),
        checkbox: config.checkbox.unwrap_or(defaults.checkbox),
        warn_on_noop: config.warn_on_noop.unwrap_or(defaults.warn_on_noop),
        auto_activate: config.auto_activate.unwrap_or(defaults.auto_activate),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    nav_mode_override: Option<NavigationPolicy>,
    log_file_override: Option<PathBuf>,
) -> ResolvedConfig {
    if let Some(policy) = nav_mode_override {
        config.navigation_mode = policy;
    }

    if let Some(path) = log_file_override {
        config.log_file_path = path;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
