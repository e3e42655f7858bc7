//! Task runner rules.

use crate::path_resolver::{resolve_keys, ValueTree};
use crate::rule::{MessageParams, MessageTemplate, RuleOutcome, ValidationRule};

#[cfg(test)]
#[path = "task_runner_tests.rs"]
mod tests;

pub const RULES: &[ValidationRule] = &[ValidationRule::new(
    "task-runner.replicas",
    MessageTemplate::new(
        "The task-runner is configured with more than 1 replica ({replicas}), but also with a PersistentVolumeClaim",
    ),
    single_replica_with_persistence,
)];

/// A ReadWriteOnce claim can only be mounted by one replica.
fn single_replica_with_persistence(tree: &ValueTree) -> RuleOutcome {
    let task_runner = resolve_keys(tree, &["gitlab", "task-runner"]);
    let replicas = task_runner.get("replicas").as_i64().unwrap_or(1);
    let persistent = task_runner.get("persistence").get("enabled").is_truthy();

    if persistent && replicas > 1 {
        RuleOutcome::Fail(MessageParams::new().with("replicas", replicas))
    } else {
        RuleOutcome::Pass
    }
}
