//! Configuration file loading with precedence handling.

use crate::animation::SpringConfig;
use crate::gesture::GestureConfig;
use crate::machine::MachineConfig;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "SNAPSHEET_CONFIG";

/// Environment variable forcing reduced motion on or off.
pub const REDUCED_MOTION_ENV: &str = "SNAPSHEET_REDUCED_MOTION";

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

    /// Config file contains invalid TOML syntax.
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
/// Corresponds to `~/.config/snapsheet/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Whether a downward fling may dismiss the sheet.
    #[serde(default)]
    pub dismissible: Option<bool>,

    /// Whether drags on the content region move the sheet.
    #[serde(default)]
    pub expand_on_content_drag: Option<bool>,

    /// Replace animations with jumps.
    #[serde(default)]
    pub reduced_motion: Option<bool>,

    /// Controlled max height override.
    #[serde(default)]
    pub max_height: Option<f64>,

    /// Focus trap activation safety timeout.
    #[serde(default)]
    pub activation_timeout_ms: Option<u64>,

    /// Focus trap deactivation safety timeout.
    #[serde(default)]
    pub deactivation_timeout_ms: Option<u64>,

    /// Autofocus settle safety timeout.
    #[serde(default)]
    pub autofocus_timeout_ms: Option<u64>,

    /// Content measurement safety timeout.
    #[serde(default)]
    pub dimension_timeout_ms: Option<u64>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Gesture tuning.
    #[serde(default)]
    pub gesture: Option<GestureSection>,

    /// Spring tuning.
    #[serde(default)]
    pub spring: Option<SpringSection>,
}

/// `[gesture]` section.
///
/// ```toml
/// [gesture]
/// prediction_factor = 2.0
/// rubber_band_constant = 0.55
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GestureSection {
    /// Multiplier on `delta * velocity` when predicting the settle height.
    #[serde(default)]
    pub prediction_factor: Option<f64>,
    /// Rubber-band resistance.
    #[serde(default)]
    pub rubber_band_constant: Option<f64>,
    /// Largest release movement treated as a tap.
    #[serde(default)]
    pub tap_threshold: Option<f64>,
    /// Release velocities at or below this are negligible.
    #[serde(default)]
    pub velocity_threshold: Option<f64>,
    /// Velocity used when the release velocity is negligible.
    #[serde(default)]
    pub velocity_floor: Option<f64>,
}

/// `[spring]` section.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SpringSection {
    /// Restoring force strength.
    #[serde(default)]
    pub stiffness: Option<f64>,
    /// Velocity drag.
    #[serde(default)]
    pub damping: Option<f64>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Engine switches and timeouts.
    pub machine: MachineConfig,
    /// Spring used by the animator.
    pub spring: SpringConfig,
    /// Controlled max height override.
    pub max_height: Option<f64>,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            machine: MachineConfig::default(),
            spring: SpringConfig::default(),
            max_height: None,
            log_file_path: default_log_path(),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/snapsheet/snapsheet.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("snapsheet").join("snapsheet.log")
    } else {
        PathBuf::from("snapsheet.log")
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

    if path.as_os_str().is_empty() {
        return Err(ConfigError::InvalidPath("empty path".to_string()));
    }

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
/// Returns `~/.config/snapsheet/config.toml` on Unix, appropriate path on other
/// platforms. Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("snapsheet").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `SNAPSHEET_CONFIG` environment variable
/// 3. Default path `~/.config/snapsheet/config.toml`
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
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `SNAPSHEET_REDUCED_MOTION`: `1`/`true` forces reduced motion on,
///   `0`/`false` forces it off. Other values are ignored.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(value) = std::env::var(REDUCED_MOTION_ENV) {
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" => config.machine.reduced_motion = true,
            "0" | "false" => config.machine.reduced_motion = false,
            _ => {}
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

    let machine = defaults.machine;
    let gesture = merge_gesture(machine.gesture, &config);
    let spring = config.spring.unwrap_or_default();

    ResolvedConfig {
        machine: MachineConfig {
            gesture,
            reduced_motion: config.reduced_motion.unwrap_or(machine.reduced_motion),
            activation_timeout: millis_or(config.activation_timeout_ms, machine.activation_timeout),
            deactivation_timeout: millis_or(
                config.deactivation_timeout_ms,
                machine.deactivation_timeout,
            ),
            autofocus_timeout: millis_or(config.autofocus_timeout_ms, machine.autofocus_timeout),
            dimension_timeout: millis_or(config.dimension_timeout_ms, machine.dimension_timeout),
        },
        spring: SpringConfig {
            stiffness: spring.stiffness.unwrap_or(defaults.spring.stiffness),
            damping: spring.damping.unwrap_or(defaults.spring.damping),
        },
        max_height: config.max_height.or(defaults.max_height),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

fn merge_gesture(defaults: GestureConfig, config: &ConfigFile) -> GestureConfig {
    let section = config.gesture.clone().unwrap_or_default();
    GestureConfig {
        dismissible: config.dismissible.unwrap_or(defaults.dismissible),
        expand_on_content_drag: config
            .expand_on_content_drag
            .unwrap_or(defaults.expand_on_content_drag),
        prediction_factor: section
            .prediction_factor
            .unwrap_or(defaults.prediction_factor),
        rubber_band_constant: section
            .rubber_band_constant
            .unwrap_or(defaults.rubber_band_constant),
        tap_threshold: section.tap_threshold.unwrap_or(defaults.tap_threshold),
        velocity_threshold: section
            .velocity_threshold
            .unwrap_or(defaults.velocity_threshold),
        velocity_floor: section.velocity_floor.unwrap_or(defaults.velocity_floor),
    }
}

fn millis_or(value: Option<u64>, default: Duration) -> Duration {
    value.map(Duration::from_millis).unwrap_or(default)
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    reduced_motion_override: Option<bool>,
    log_file_override: Option<PathBuf>,
) -> ResolvedConfig {
    if let Some(reduced_motion) = reduced_motion_override {
        config.machine.reduced_motion = reduced_motion;
    }

    if let Some(path) = log_file_override {
        config.log_file_path = path;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
