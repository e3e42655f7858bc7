//! Validation engine.
//!
//! Runs the [`RuleCatalogue`] over a merged value tree before anything is
//! resolved or rendered. The engine is fail-fast: the first failing rule, in
//! declared catalogue order, aborts the run and its rendered message becomes
//! the operator-facing error. [`ValidationEngine::validate_all`] evaluates every
//! rule instead, for diagnostics.
//!
//! In [`EvaluationMode::Parallel`] the catalogue is split into contiguous
//! chunks evaluated on scoped threads. The reported failure is still the one
//! with the lowest catalogue index, so the result never depends on scheduling.
//!
//! # Examples
//!
//! ```rust
//! use chart_config::{RuleCatalogue, ValidationEngine};
//! use serde_json::json;
//!
//! let engine = ValidationEngine::new(RuleCatalogue::standard());
//! let tree = json!({ "certmanager-issuer": { "email": "ops@example.com" } });
//!
//! assert!(engine.validate(&tree).is_ok());
//! ```

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    errors::{ConfigurationError, ConfigurationResult},
    path_resolver::ValueTree,
    rule::ValidationRule,
    rules::RuleCatalogue,
};

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;

/// A failed rule and its rendered message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    rule_id: String,
    message: String,
}

impl ValidationFailure {
    pub fn new(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            message: message.into(),
        }
    }

    pub fn rule_id(&self) -> &str {
        &self.rule_id
    }

    /// The operator-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.rule_id, self.message)
    }
}

/// Outcome of evaluating the whole catalogue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Failures in declared catalogue order.
    pub failures: Vec<ValidationFailure>,

    pub rules_evaluated: usize,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn first(&self) -> Option<&ValidationFailure> {
        self.failures.first()
    }

    /// Converts to the fail-fast result: the first failure, if any.
    pub fn into_result(self) -> ConfigurationResult<()> {
        match self.failures.into_iter().next() {
            Some(failure) => Err(ConfigurationError::ConfigurationInvalid(failure)),
            None => Ok(()),
        }
    }
}

/// How rules are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaluationMode {
    #[default]
    Sequential,
    Parallel {
        workers: usize,
    },
}

/// Evaluates a rule catalogue against value trees.
#[derive(Debug, Clone)]
pub struct ValidationEngine {
    catalogue: RuleCatalogue,
    mode: EvaluationMode,
}

impl ValidationEngine {
    pub fn new(catalogue: RuleCatalogue) -> Self {
        Self {
            catalogue,
            mode: EvaluationMode::Sequential,
        }
    }

    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn catalogue(&self) -> &RuleCatalogue {
        &self.catalogue
    }

    pub fn mode(&self) -> EvaluationMode {
        self.mode
    }

    /// Validates the tree, stopping at the first failing rule.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::ConfigurationInvalid` carrying the failure
    /// of the earliest failing rule in catalogue order.
    #[instrument(skip(self, tree), fields(rules = self.catalogue.len(), mode = ?self.mode))]
    pub fn validate(&self, tree: &ValueTree) -> ConfigurationResult<()> {
        let failure = match self.mode {
            EvaluationMode::Sequential => first_failure(self.catalogue.rules(), tree),
            EvaluationMode::Parallel { workers } => {
                first_failure_parallel(self.catalogue.rules(), tree, workers)
            }
        };

        match failure {
            Some(failure) => {
                debug!(rule = failure.rule_id(), "Validation rule failed");
                Err(ConfigurationError::ConfigurationInvalid(failure))
            }
            None => {
                info!("Configuration passed all validation rules");
                Ok(())
            }
        }
    }

    /// Evaluates every rule and returns all failures in catalogue order.
    #[instrument(skip(self, tree), fields(rules = self.catalogue.len()))]
    pub fn validate_all(&self, tree: &ValueTree) -> ValidationReport {
        let rules = self.catalogue.rules();
        let failures = match self.mode {
            EvaluationMode::Sequential => all_failures(rules, tree),
            EvaluationMode::Parallel { workers } => {
                run_chunks(rules, workers, |_, chunk| all_failures(chunk, tree))
                    .into_iter()
                    .flatten()
                    .collect()
            }
        };

        debug!(failures = failures.len(), "Evaluated full rule catalogue");
        ValidationReport {
            failures,
            rules_evaluated: rules.len(),
        }
    }
}

fn first_failure(rules: &[ValidationRule], tree: &ValueTree) -> Option<ValidationFailure> {
    rules.iter().find_map(|rule| rule.evaluate(tree))
}

fn all_failures(rules: &[ValidationRule], tree: &ValueTree) -> Vec<ValidationFailure> {
    rules.iter().filter_map(|rule| rule.evaluate(tree)).collect()
}

/// Parallel fail-fast evaluation.
///
/// Workers skip rules past the lowest failing index seen so far; the
/// minimum-index failure is returned.
fn first_failure_parallel(
    rules: &[ValidationRule],
    tree: &ValueTree,
    workers: usize,
) -> Option<ValidationFailure> {
    let cutoff = AtomicUsize::new(usize::MAX);

    let found = run_chunks(rules, workers, |offset, chunk| {
        for (position, rule) in chunk.iter().enumerate() {
            let index = offset + position;
            if index > cutoff.load(Ordering::Acquire) {
                return None;
            }
            if let Some(failure) = rule.evaluate(tree) {
                cutoff.fetch_min(index, Ordering::AcqRel);
                return Some((index, failure));
            }
        }
        None
    });

    debug!(workers, "Parallel evaluation finished");
    found
        .into_iter()
        .flatten()
        .min_by_key(|(index, _)| *index)
        .map(|(_, failure)| failure)
}

fn chunk_size(len: usize, workers: usize) -> usize {
    len.div_ceil(workers.max(1)).max(1)
}

/// Runs `work` over contiguous chunks of `rules` on scoped threads and
/// returns the per-chunk results in chunk order. `work` receives the catalogue
/// index of the chunk's first rule.
fn run_chunks<R, F>(rules: &[ValidationRule], workers: usize, work: F) -> Vec<R>
where
    R: Send,
    F: Fn(usize, &[ValidationRule]) -> R + Sync,
{
    let size = chunk_size(rules.len(), workers);
    thread::scope(|scope| {
        let work = &work;
        let handles: Vec<_> = rules
            .chunks(size)
            .enumerate()
            .map(|(position, chunk)| scope.spawn(move || work(position * size, chunk)))
            .collect();

        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    })
}
