//! Settings for the command line tool.
//!
//! Values come from, highest priority first: command line flags, an
//! optional TOML config file, the `TAXI_QUERY_DATA_DIR` environment
//! variable, and built-in defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use taxi_query_analytics_models::SampleSize;

/// Environment variable overriding the built-in data directory.
pub const DATA_DIR_ENV: &str = "TAXI_QUERY_DATA_DIR";

pub const DEFAULT_TRIPS_FILE: &str = "taxis-large.csv";
pub const DEFAULT_NEIGHBORHOODS_FILE: &str = "nyc-neighborhoods.csv";

/// Errors reading the config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error reading config {path}: {source}")]
    Io {
        /// Path of the config file.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or has unknown/mistyped keys.
    #[error("Invalid config {path}: {source}")]
    Parse {
        /// Path of the config file.
        path: String,
        /// Underlying error.
        #[source]
        source: toml::de::Error,
    },
}

/// Contents of the TOML config file. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Directory holding the data files.
    pub data_dir: Option<PathBuf>,
    /// Trip file name, relative to the data directory.
    pub trips_file: String,
    /// Neighborhood file name, relative to the data directory.
    pub neighborhoods_file: String,
    /// Sample size used when a query does not ask for one.
    pub default_sample_size: SampleSize,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            data_dir: None,
            trips_file: DEFAULT_TRIPS_FILE.to_string(),
            neighborhoods_file: DEFAULT_NEIGHBORHOODS_FILE.to_string(),
            default_sample_size: SampleSize::DEFAULT,
        }
    }
}

impl ConfigFile {
    /// Reads and parses the config file at `path`.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::Io`] if the file cannot be read
    /// * [`ConfigError::Parse`] if it is not a valid config
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&text, path)
    }

    /// Parses config text read from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if `text` is not a valid config.
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub trips: Option<PathBuf>,
    pub neighborhoods: Option<PathBuf>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub trips_path: PathBuf,
    pub neighborhoods_path: PathBuf,
    pub sample_size: SampleSize,
}

impl Settings {
    /// Merges the config sources, highest priority first: `overrides`,
    /// `file`, `env_data_dir`, then [`default_data_dir`].
    #[must_use]
    pub fn resolve(file: &ConfigFile, overrides: &Overrides, env_data_dir: Option<PathBuf>) -> Self {
        let data_dir = overrides
            .data_dir
            .clone()
            .or_else(|| file.data_dir.clone())
            .or(env_data_dir)
            .unwrap_or_else(default_data_dir);

        Self {
            trips_path: overrides
                .trips
                .clone()
                .unwrap_or_else(|| data_dir.join(&file.trips_file)),
            neighborhoods_path: overrides
                .neighborhoods
                .clone()
                .unwrap_or_else(|| data_dir.join(&file.neighborhoods_file)),
            sample_size: file.default_sample_size,
        }
    }
}

/// Reads [`DATA_DIR_ENV`], ignoring it when unset or empty.
#[must_use]
pub fn env_data_dir() -> Option<PathBuf> {
    std::env::var_os(DATA_DIR_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`; falls back to the
/// current directory if the crate is not two levels below the root.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Returns the built-in `data/` directory.
#[must_use]
pub fn default_data_dir() -> PathBuf {
    project_root().join("data")
}
