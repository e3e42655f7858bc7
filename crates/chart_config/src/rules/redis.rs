//! Redis rules.
//!
//! These run before the inheritance resolver and reject every input it would
//! otherwise have to guess about: mixing the in-chart server with external
//! instances, contradictory or malformed topologies, bad ports and empty
//! secret references.

use serde_json::Value;

use crate::inheritance::InheritanceResolver;
use crate::path_resolver::{resolve, Lookup, ValueTree};
use crate::rule::{MessageParams, MessageTemplate, RuleOutcome, ValidationRule};
use crate::service::{InstanceDeclaration, ServiceDescriptor, REDIS};
use crate::value_path::ValuePath;

#[cfg(test)]
#[path = "redis_tests.rs"]
mod tests;

pub const RULES: &[ValidationRule] = &[
    ValidationRule::new(
        "redis.multipleInstances",
        MessageTemplate::new(
            "If configuring multiple Redis servers, you can not use the in-chart Redis server (found global.redis.{instance})",
        ),
        single_instance_when_installed,
    ),
    ValidationRule::new(
        "redis.yml.override",
        MessageTemplate::new(
            "global.redis.redisYmlOverride can not be used with the in-chart Redis server",
        ),
        no_override_when_installed,
    ),
    ValidationRule::new(
        "redis.topology.conflict",
        MessageTemplate::new("{path}: `sentinels` and `cluster` are mutually exclusive"),
        exclusive_topology,
    ),
    ValidationRule::new(
        "redis.topology.shape",
        MessageTemplate::new("{path} must be a list of endpoints with a host"),
        endpoint_lists,
    ),
    ValidationRule::new(
        "redis.port",
        MessageTemplate::new("{path} must be a port number between 1 and 65535, got {value}"),
        port_numbers,
    ),
    ValidationRule::new(
        "redis.auth.secret",
        MessageTemplate::new(
            "{path} must not be empty when authentication is enabled for the {instance} instance",
        ),
        non_empty_secrets,
    ),
];

const TOPOLOGY_FIELDS: [&str; 2] = ["sentinels", "cluster"];

/// Generated names do not matter to the auth check.
const CHECK_RELEASE_NAME: &str = "release";

fn single_instance_when_installed(tree: &ValueTree) -> RuleOutcome {
    if !REDIS.is_installed(tree) {
        return RuleOutcome::Pass;
    }
    match REDIS.named_instances(tree).first() {
        Some(instance) => RuleOutcome::Fail(MessageParams::new().with("instance", &instance.name)),
        None => RuleOutcome::Pass,
    }
}

fn no_override_when_installed(tree: &ValueTree) -> RuleOutcome {
    let Some(key) = REDIS.override_key else {
        return RuleOutcome::Pass;
    };
    let has_override = REDIS.global_layer(tree).get(key).is_set();
    RuleOutcome::pass_if(!(has_override && REDIS.is_installed(tree)))
}

/// Instance declarations with the path of their own mapping.
fn declared(tree: &ValueTree) -> Vec<(InstanceDeclaration, ValuePath)> {
    REDIS
        .discover_instances(tree)
        .into_iter()
        .map(|instance| {
            let path = REDIS.instance_path(&instance);
            (instance, path)
        })
        .collect()
}

fn exclusive_topology(tree: &ValueTree) -> RuleOutcome {
    for (_, path) in declared(tree) {
        let layer = resolve(tree, &path);
        if TOPOLOGY_FIELDS.iter().all(|field| layer.get(field).is_set()) {
            return RuleOutcome::Fail(MessageParams::new().with("path", path));
        }
    }
    RuleOutcome::Pass
}

fn is_endpoint(entry: &Value) -> bool {
    Lookup::Present(entry)
        .get("host")
        .as_str()
        .is_some_and(|host| !host.is_empty())
}

fn endpoint_lists(tree: &ValueTree) -> RuleOutcome {
    for (_, path) in declared(tree) {
        for field in TOPOLOGY_FIELDS {
            let path = path.child(field);
            let valid = match resolve(tree, &path) {
                Lookup::Absent | Lookup::Present(Value::Null) => true,
                Lookup::Present(Value::Array(entries)) => entries.iter().all(is_endpoint),
                Lookup::Present(_) => false,
            };
            if !valid {
                return RuleOutcome::Fail(MessageParams::new().with("path", path));
            }
        }
    }
    RuleOutcome::Pass
}

fn valid_port(value: &Value) -> bool {
    Lookup::Present(value)
        .as_i64()
        .is_some_and(|port| (1..=65535).contains(&port))
}

/// Paths of every port an instance declares: its own and its endpoints'.
fn port_paths(tree: &ValueTree, instance_path: &ValuePath) -> Vec<ValuePath> {
    let mut paths = vec![instance_path.child("port")];
    for field in TOPOLOGY_FIELDS {
        let list = instance_path.child(field);
        let count = resolve(tree, &list).as_sequence().map_or(0, Vec::len);
        paths.extend((0..count).map(|index| list.index(index).child("port")));
    }
    paths
}

fn port_numbers(tree: &ValueTree) -> RuleOutcome {
    for (_, instance_path) in declared(tree) {
        for path in port_paths(tree, &instance_path) {
            match resolve(tree, &path) {
                Lookup::Absent | Lookup::Present(Value::Null) => {}
                Lookup::Present(value) if valid_port(value) => {}
                Lookup::Present(value) => {
                    return RuleOutcome::Fail(
                        MessageParams::new().with("path", path).with("value", value),
                    );
                }
            }
        }
    }
    RuleOutcome::Pass
}

/// Auth blocks an instance reads, in precedence order.
fn auth_blocks(
    service: &ServiceDescriptor,
    instance: &InstanceDeclaration,
    is_cluster: bool,
) -> Vec<ValuePath> {
    let Some(block) = service.field("password") else {
        return Vec::new();
    };
    let service_block = service.global_path().child(block.service_key);
    if instance.is_default() {
        return vec![service_block];
    }

    let mut blocks = vec![service.instance_path(instance).child(block.name)];
    if !is_cluster || block.inherit_into_cluster {
        blocks.push(service_block);
    }
    blocks
}

/// An explicitly empty secret name or key would otherwise be replaced by the
/// default silently.
fn non_empty_secrets(tree: &ValueTree) -> RuleOutcome {
    let resolver = InheritanceResolver::new(CHECK_RELEASE_NAME);
    for instance in REDIS.discover_instances(tree) {
        let Ok(config) = resolver.resolve_declared(tree, &REDIS, &instance) else {
            continue;
        };
        if !config.auth_enabled() {
            continue;
        }

        let blocks = auth_blocks(&REDIS, &instance, config.topology.is_cluster());
        for member in ["secret", "key"] {
            let deciding = blocks
                .iter()
                .map(|block| block.child(member))
                .find(|path| resolve(tree, path).is_present());
            if let Some(path) = deciding {
                if resolve(tree, &path).as_str() == Some("") {
                    return RuleOutcome::Fail(
                        MessageParams::new()
                            .with("path", path)
                            .with("instance", &instance.name),
                    );
                }
            }
        }
    }
    RuleOutcome::Pass
}
