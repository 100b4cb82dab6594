//! Process-wide calculator settings, read once at startup.

use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use thiserror::Error;

/// Environment key for the history file path.
pub const HISTORY_FILE_KEY: &str = "HISTORY_FILE";
/// Environment key for the auto-save switch.
pub const AUTO_SAVE_KEY: &str = "AUTO_SAVE";
/// Environment key for the eviction threshold.
pub const MAX_HISTORY_KEY: &str = "MAX_HISTORY";
/// Environment key for result rounding precision.
pub const DECIMAL_PLACES_KEY: &str = "DECIMAL_PLACES";

/// Dotenv file consulted by [`CalculatorConfig::from_env`].
pub const DEFAULT_ENV_FILE: &str = ".env";
/// Default history file name, relative to the working directory.
pub const DEFAULT_HISTORY_FILE: &str = "calculation_history.csv";
/// Largest accepted `DECIMAL_PLACES`; beyond this f64 has no digits left.
pub const MAX_DECIMAL_PLACES: u32 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A key was set to a value of the wrong shape.
    #[error("invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        /// Offending key.
        key: &'static str,
        /// Raw value.
        value: String,
        /// What was expected.
        reason: &'static str,
    },
    /// The dotenv file exists but could not be read or parsed.
    #[error("cannot read {}: {message}", path.display())]
    EnvFile {
        /// Dotenv file path.
        path: PathBuf,
        /// Underlying read or parse failure.
        message: String,
    },
}

/// Immutable calculator configuration.
///
/// Built once and handed to constructors by reference; the core never reads
/// the environment itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculatorConfig {
    /// Where history is persisted.
    pub history_file: PathBuf,
    /// Register the auto-save listener on `calculation_added`.
    pub auto_save: bool,
    /// History length above which the oldest record is evicted.
    pub max_history: usize,
    /// Result rounding precision.
    pub decimal_places: u32,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            history_file: PathBuf::from(DEFAULT_HISTORY_FILE),
            auto_save: true,
            max_history: 100,
            decimal_places: 2,
        }
    }
}

impl CalculatorConfig {
    /// Reads settings from `.env` in the working directory layered over
    /// process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_file(Path::new(DEFAULT_ENV_FILE))
    }

    /// Reads settings from the dotenv file at `env_file`, falling back to
    /// process environment variables for keys it does not set.
    ///
    /// Values in the file take precedence. A missing file is ignored.
    pub fn from_env_file(env_file: &Path) -> Result<Self, ConfigError> {
        let file = read_env_file(env_file)?;
        Self::from_lookup(|key| file.get(key).cloned().or_else(|| std::env::var(key).ok()))
    }

    /// Reads settings through `lookup`; unset or blank keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut cfg = Self::default();

        if let Some(path) = get(HISTORY_FILE_KEY) {
            cfg.history_file = PathBuf::from(path);
        }
        if let Some(raw) = get(AUTO_SAVE_KEY) {
            cfg.auto_save = parse_bool(&raw).ok_or(ConfigError::InvalidValue {
                key: AUTO_SAVE_KEY,
                value: raw.clone(),
                reason: "expected true/false, 1/0, yes/no or on/off",
            })?;
        }
        if let Some(raw) = get(MAX_HISTORY_KEY) {
            cfg.max_history = raw
                .parse::<usize>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or(ConfigError::InvalidValue {
                    key: MAX_HISTORY_KEY,
                    value: raw.clone(),
                    reason: "expected an integer >= 1",
                })?;
        }
        if let Some(raw) = get(DECIMAL_PLACES_KEY) {
            cfg.decimal_places = raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n <= MAX_DECIMAL_PLACES)
                .ok_or(ConfigError::InvalidValue {
                    key: DECIMAL_PLACES_KEY,
                    value: raw.clone(),
                    reason: "expected an integer between 0 and 15",
                })?;
        }

        Ok(cfg)
    }
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let env_error = |err: dotenvy::Error| ConfigError::EnvFile {
        path: path.to_path_buf(),
        message: err.to_string(),
    };
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(err) if err.not_found() => {
            log::debug!("no env file at {}", path.display());
            return Ok(HashMap::new());
        }
        Err(err) => return Err(env_error(err)),
    };

    let vars = entries
        .map(|entry| entry.map_err(env_error))
        .collect::<Result<HashMap<_, _>, _>>()?;
    log::debug!("read {} entries from {}", vars.len(), path.display());
    Ok(vars)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
