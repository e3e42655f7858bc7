//! Resolver settings.
//!
//! Settings that shape how a tree is validated and resolved but are not part
//! of the operator's values: the release name used for generated names, and
//! how the rule catalogue is evaluated.
//!
//! Settings deserialize from any serde format; the CLI reads them from TOML.
//! Every field has a default, so an empty document is valid.
//!
//! ```toml
//! release_name = "gitlab"
//! evaluation = "parallel"
//! workers = 8
//! report_all_failures = true
//! ```

use serde::{Deserialize, Serialize};

use crate::validator::EvaluationMode;

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;

/// Default release name, matching the chart's test harness.
pub const DEFAULT_RELEASE_NAME: &str = "test";

/// Default number of workers for parallel evaluation.
pub const DEFAULT_WORKERS: usize = 4;

/// How the rule catalogue is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStrategy {
    #[default]
    Sequential,
    Parallel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Release name used for generated hosts and secret names.
    pub release_name: String,

    pub evaluation: EvaluationStrategy,

    /// Worker count for parallel evaluation. Zero is treated as one.
    pub workers: usize,

    /// Evaluate every rule and log all failures, not just the first.
    pub report_all_failures: bool,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            release_name: DEFAULT_RELEASE_NAME.to_string(),
            evaluation: EvaluationStrategy::Sequential,
            workers: DEFAULT_WORKERS,
            report_all_failures: false,
        }
    }
}

impl ResolverSettings {
    pub fn with_release_name(mut self, release_name: impl Into<String>) -> Self {
        self.release_name = release_name.into();
        self
    }

    pub fn evaluation_mode(&self) -> EvaluationMode {
        match self.evaluation {
            EvaluationStrategy::Sequential => EvaluationMode::Sequential,
            EvaluationStrategy::Parallel => EvaluationMode::Parallel {
                workers: self.workers.max(1),
            },
        }
    }
}
