//! All things related to user-facing configurations.

use std::env;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::Pt2Error;

/// Output time unit in seconds, i.e. each output tick is 100 ns.
pub const DEFAULT_RESOLUTION: f64 = 1e-7;

/// Environment variable that points to a configuration file, overriding the
/// platform default location.
pub const CONFIG_PATH_ENV_VAR: &str = "PT2TIMES_CONFIG";

const CONFIG_FILENAME: &str = "config.toml";

/// Parameters of a single extraction.
///
/// The command line tool always uses [`DEFAULT_RESOLUTION`], but library
/// users may pick a different one through [`ExtractConfigBuilder`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractConfig {
    /// Seconds per output tick
    pub(crate) resolution: f64,
}

impl ExtractConfig {
    pub fn resolution(&self) -> f64 {
        self.resolution
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        ExtractConfig {
            resolution: DEFAULT_RESOLUTION,
        }
    }
}

#[derive(Clone)]
pub struct ExtractConfigBuilder {
    resolution: f64,
}

impl ExtractConfigBuilder {
    /// Generate an instance with default values.
    pub fn default() -> ExtractConfigBuilder {
        ExtractConfigBuilder {
            resolution: DEFAULT_RESOLUTION,
        }
    }

    pub fn with_resolution(&mut self, resolution: f64) -> &mut Self {
        self.resolution = resolution;
        self
    }

    /// Validates the values and creates the config. The resolution has to be
    /// a positive, finite number.
    pub fn build(&self) -> Result<ExtractConfig, Pt2Error> {
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(Pt2Error::InvalidResolution(self.resolution));
        }
        Ok(ExtractConfig {
            resolution: self.resolution,
        })
    }
}

/// Verbosity of the application logs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> LevelFilter {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Application-wide settings, read from a TOML file.
///
/// Everything here is about how the tool runs rather than what it computes,
/// so the output resolution is deliberately not part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: LogLevel,
    /// When set, logs are also appended to this file
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            log_level: LogLevel::Warn,
            log_file: None,
        }
    }
}

impl AppConfig {
    pub fn try_from_config_path(config_path: &Path) -> Result<Self> {
        let contents = read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
        let cfg: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;
        Ok(cfg)
    }

    /// Loads the configuration from the path in [`CONFIG_PATH_ENV_VAR`], or
    /// from the platform's config directory. A missing file at the default
    /// location means default values, while a missing file that was asked
    /// for explicitly is an error.
    pub fn load() -> Result<Self> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV_VAR) {
            return AppConfig::try_from_config_path(Path::new(&path));
        }
        match default_config_path() {
            Some(path) if path.exists() => AppConfig::try_from_config_path(&path),
            _ => Ok(AppConfig::default()),
        }
    }
}

/// Location of the configuration file in the platform's config directory
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "PBLab", "pt2times").map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}
