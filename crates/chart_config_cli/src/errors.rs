use std::{io, path::PathBuf};

use chart_config::{ConfigurationError, ValidationFailure};
use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Exit status for a configuration rejected by the rule catalogue.
pub const EXIT_INVALID_CONFIGURATION: i32 = 1;

/// Exit status for unreadable input or bad arguments.
pub const EXIT_SETUP_ERROR: i32 = 2;

/// Errors that can occur in the chart-config CLI.
///
/// Everything except [`Error::Configuration`] is a setup problem: the values
/// were never checked.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid command-line arguments were provided.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Failed to read a values or settings file.
    #[error("Failed to load file {path:?}: {source}")]
    LoadFile { path: PathBuf, source: io::Error },

    /// A values file is not valid YAML.
    #[error("Failed to parse YAML values file {path:?}: {source}")]
    ParseYamlFile {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// A values file is not valid JSON.
    #[error("Failed to parse JSON values file {path:?}: {source}")]
    ParseJsonFile {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The settings file is not valid TOML or does not match the settings schema.
    #[error("Failed to parse TOML settings file {path:?}: {source}")]
    ParseTomlFile {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// The merged values are not a mapping at the top level.
    #[error("Invalid values: {0}")]
    InvalidValues(String),

    /// The resolved configuration could not be written in the requested format.
    #[error("Failed to serialize output: {0}")]
    Serialize(String),

    /// Validation or resolution failed.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// Several rules failed; listed in catalogue order, one per line.
    #[error("{}", render_failures(.0))]
    ValidationFailures(Vec<ValidationFailure>),
}

fn render_failures(failures: &[ValidationFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl Error {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Configuration(ConfigurationError::ConfigurationInvalid(_))
            | Error::ValidationFailures(_) => EXIT_INVALID_CONFIGURATION,
            _ => EXIT_SETUP_ERROR,
        }
    }
}
