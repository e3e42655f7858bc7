//! Configuration system error types.
//!
//! Domain-specific errors for value path parsing, instance resolution
//! and validation operations.
//!
//! Absence of a value is deliberately not represented here. Lookups that find
//! nothing return [`crate::path_resolver::Lookup::Absent`] and the caller falls
//! back to the next layer.

use thiserror::Error;

use crate::validator::ValidationFailure;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Configuration system errors.
///
/// `ConfigurationInvalid` is the only variant an operator is expected to see
/// from a pipeline run. Its message is rendered by the rule catalogue and is
/// surfaced verbatim.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("{0}")]
    ConfigurationInvalid(ValidationFailure),

    #[error("Invalid value path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Conflicting configuration for instance '{instance}': {reason}")]
    ResolutionConflict { instance: String, reason: String },

    #[error("No service descriptor registered for '{service}'")]
    UnknownService { service: String },
}

impl ConfigurationError {
    /// Returns the failed validation if this error came from the rule catalogue.
    pub fn validation_failure(&self) -> Option<&ValidationFailure> {
        match self {
            Self::ConfigurationInvalid(failure) => Some(failure),
            _ => None,
        }
    }
}

impl From<ValidationFailure> for ConfigurationError {
    fn from(failure: ValidationFailure) -> Self {
        Self::ConfigurationInvalid(failure)
    }
}

/// Result type alias for configuration operations.
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;
