//! Settings file for the chart-config CLI.
//!
//! The CLI reads optional settings from a TOML file. By default it looks for
//! `chart-config.toml` in the current directory and silently falls back to
//! built-in defaults when that file is missing. A path given with `--settings`
//! must exist.
//!
//! # Example TOML Configuration
//!
//! ```toml
//! [resolver]
//! release_name = "gitlab"
//! evaluation = "parallel"
//! workers = 8
//!
//! [output]
//! format = "yaml"
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use chart_config::ResolverSettings;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::Error;

/// Default settings file name
pub const DEFAULT_CONFIG_FILENAME: &str = "chart-config.toml";

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Format used to print a resolved configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Top-level CLI settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Settings handed to the resolution pipeline.
    #[serde(default)]
    pub resolver: ResolverSettings,

    #[serde(default)]
    pub output: OutputConfig,
}

impl CliConfig {
    /// Loads settings from a TOML file at the specified path.
    ///
    /// # Errors
    ///
    /// Returns `Error::LoadFile` if the file cannot be read and
    /// `Error::ParseTomlFile` if it is not valid settings TOML.
    pub fn load(path: &Path) -> Result<Self, Error> {
        debug!("Loading settings from {:?}", path);

        let content = fs::read_to_string(path).map_err(|source| Error::LoadFile {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| Error::ParseTomlFile {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the explicit settings file, or the default file if present.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = default_config_path();
                if default_path.exists() {
                    Self::load(&default_path)
                } else {
                    debug!("No settings file found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Settings file looked up in the working directory when `--settings` is not given.
pub fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_FILENAME)
}
