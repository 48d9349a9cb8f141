//! Runtime configuration and display preferences.
//!
//! # Responsibility
//! - Resolve store path and logging options from the environment.
//! - Define display preference values persisted apart from the workspace.
//!
//! # Invariants
//! - Blank environment values fall back to defaults.
//! - Percentage preferences stay within `0..=100`.

use crate::logging::{default_log_level, init_logging, normalize_level};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DB_PATH_ENV: &str = "STACKDECK_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "STACKDECK_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "STACKDECK_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "stackdeck.sqlite3";
const DEFAULT_ACCENT_COLOR: &str = "#0ea5e9";
const MAX_PERCENT: u8 = 100;

/// Configuration resolution errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnsupportedLogLevel(String),
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLogLevel(level) => write!(
                f,
                "unsupported log level `{level}` in {LOG_LEVEL_ENV}; expected trace|debug|info|warn|error"
            ),
            Self::RelativeLogDir(path) => write!(
                f,
                "{LOG_DIR_ENV} must be an absolute path, got `{}`",
                path.display()
            ),
        }
    }
}

impl Error for ConfigError {}

/// Process-level settings for the workspace core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// Logging stays disabled when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads `STACKDECK_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = read(DB_PATH_ENV) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(LOG_LEVEL_ENV) {
            config.log_level = normalize_level(&level)
                .map_err(|_| ConfigError::UnsupportedLogLevel(level.clone()))?
                .to_string();
        }
        if let Some(dir) = read(LOG_DIR_ENV) {
            let dir = PathBuf::from(dir);
            if !dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir));
            }
            config.log_dir = Some(dir);
        }

        Ok(config)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Starts file logging when a log directory is configured.
    pub fn init_logging(&self) -> Result<(), String> {
        match &self.log_dir {
            Some(dir) => init_logging(&self.log_level, &dir.to_string_lossy()),
            None => Ok(()),
        }
    }
}

/// Color scheme selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    System,
    Light,
    Dark,
}

impl Theme {
    /// Cycles `system -> light -> dark -> system`.
    pub fn next(self) -> Self {
        match self {
            Self::System => Self::Light,
            Self::Light => Self::Dark,
            Self::Dark => Self::System,
        }
    }
}

/// Display preferences. Not part of the workspace collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayPreferences {
    /// Percent, `0..=100`.
    pub background_blur: u8,
    /// Percent, `0..=100`.
    pub background_grain: u8,
    /// Percent, `0..=100`.
    pub background_darken: u8,
    pub show_hero: bool,
    pub accent_color: String,
    pub theme: Theme,
    /// Browser chrome color derived from the background image, if any.
    pub theme_color: Option<String>,
}

impl Default for DisplayPreferences {
    fn default() -> Self {
        Self {
            background_blur: 0,
            background_grain: 0,
            background_darken: 0,
            show_hero: true,
            accent_color: DEFAULT_ACCENT_COLOR.to_string(),
            theme: Theme::System,
            theme_color: None,
        }
    }
}

impl DisplayPreferences {
    /// Returns a copy with percentages clamped to `0..=100`.
    pub fn clamped(&self) -> Self {
        Self {
            background_blur: self.background_blur.min(MAX_PERCENT),
            background_grain: self.background_grain.min(MAX_PERCENT),
            background_darken: self.background_darken.min(MAX_PERCENT),
            ..self.clone()
        }
    }
}
