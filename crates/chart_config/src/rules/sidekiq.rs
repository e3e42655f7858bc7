//! Sidekiq pod queue-selection rules.
//!
//! Each entry of `gitlab.sidekiq.pods` selects the queues it processes. A pod
//! inherits `cluster` from `gitlab.sidekiq.cluster` when it does not set it.

use serde_json::Value;

use crate::path_resolver::{resolve_keys, Lookup, ValueTree};
use crate::rule::{MessageParams, MessageTemplate, RuleOutcome, ValidationRule};

#[cfg(test)]
#[path = "sidekiq_tests.rs"]
mod tests;

pub const RULES: &[ValidationRule] = &[
    ValidationRule::new(
        "sidekiq.queues.mixed",
        MessageTemplate::new(
            "The pod definition `{name}` (gitlab.sidekiq.pods[{index}]) sets both `queues` and `negateQueues`: `negateQueues` is not usable if `queues` is provided",
        ),
        mixed_queues,
    ),
    ValidationRule::new(
        "sidekiq.queues.cluster",
        MessageTemplate::new(
            "The pod definition `{name}` has `cluster` enabled, but `{field}` is not a string",
        ),
        cluster_queue_strings,
    ),
    ValidationRule::new(
        "sidekiq.queues.queueSelector",
        MessageTemplate::new(
            "The pod definition `{name}` uses `{field}`, but `{field}` only works when `cluster` is enabled",
        ),
        queue_selector_needs_cluster,
    ),
];

const QUEUE_FIELDS: [&str; 2] = ["queues", "negateQueues"];
const SELECTOR_FIELDS: [&str; 2] = ["queueSelector", "experimentalQueueSelector"];

/// Pods in declaration order.
fn pods(tree: &ValueTree) -> impl Iterator<Item = (usize, Lookup<'_>)> {
    resolve_keys(tree, &["gitlab", "sidekiq", "pods"])
        .as_sequence()
        .map(|pods| pods.as_slice())
        .unwrap_or_default()
        .iter()
        .map(Lookup::Present)
        .enumerate()
}

fn pod_name(pod: Lookup<'_>) -> &str {
    pod.get("name").as_str().unwrap_or_default()
}

fn cluster_enabled(tree: &ValueTree, pod: Lookup<'_>) -> bool {
    match pod.get("cluster") {
        Lookup::Present(Value::Null) | Lookup::Absent => {
            resolve_keys(tree, &["gitlab", "sidekiq", "cluster"]).is_truthy()
        }
        cluster => cluster.is_truthy(),
    }
}

fn mixed_queues(tree: &ValueTree) -> RuleOutcome {
    for (index, pod) in pods(tree) {
        if QUEUE_FIELDS.iter().all(|field| pod.get(field).is_truthy()) {
            return RuleOutcome::Fail(
                MessageParams::new()
                    .with("name", pod_name(pod))
                    .with("index", index),
            );
        }
    }
    RuleOutcome::Pass
}

/// Cluster mode takes queue selections as comma-separated strings.
fn cluster_queue_strings(tree: &ValueTree) -> RuleOutcome {
    for (_, pod) in pods(tree) {
        if !cluster_enabled(tree, pod) {
            continue;
        }
        for field in QUEUE_FIELDS {
            let value = pod.get(field);
            if value.is_truthy() && value.as_str().is_none() {
                return RuleOutcome::Fail(
                    MessageParams::new()
                        .with("name", pod_name(pod))
                        .with("field", field),
                );
            }
        }
    }
    RuleOutcome::Pass
}

fn queue_selector_needs_cluster(tree: &ValueTree) -> RuleOutcome {
    for (_, pod) in pods(tree) {
        if cluster_enabled(tree, pod) {
            continue;
        }
        if let Some(field) = SELECTOR_FIELDS
            .into_iter()
            .find(|field| pod.get(field).is_truthy())
        {
            return RuleOutcome::Fail(
                MessageParams::new()
                    .with("name", pod_name(pod))
                    .with("field", field),
            );
        }
    }
    RuleOutcome::Pass
}
