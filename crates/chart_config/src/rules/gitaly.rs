//! Gitaly and Praefect rules.

use crate::path_resolver::{resolve_keys, Lookup, ValueTree};
use crate::rule::{MessageParams, MessageTemplate, RuleOutcome, ValidationRule};

#[cfg(test)]
#[path = "gitaly_tests.rs"]
mod tests;

pub const RULES: &[ValidationRule] = &[
    ValidationRule::new(
        "gitaly.tls",
        MessageTemplate::new("global.gitaly.tls.secretName not specified"),
        tls_secret,
    ),
    ValidationRule::new(
        "gitaly.tls.praefect",
        MessageTemplate::new(
            "global.praefect.virtualStorages[{index}].tlsSecretName not specified ('{name}')",
        ),
        praefect_tls_secrets,
    ),
    ValidationRule::new(
        "gitaly.extern.repos",
        MessageTemplate::new(
            "external Gitaly repos needs to be specified if global.gitaly.enabled is not set",
        ),
        external_repos,
    ),
];

fn gitaly(tree: &ValueTree) -> Lookup<'_> {
    resolve_keys(tree, &["global", "gitaly"])
}

fn gitaly_enabled(tree: &ValueTree) -> bool {
    gitaly(tree).get("enabled").flag_or(true)
}

fn tls_enabled(tree: &ValueTree) -> bool {
    gitaly(tree).get("tls").get("enabled").is_truthy()
}

fn praefect_enabled(tree: &ValueTree) -> bool {
    resolve_keys(tree, &["global", "praefect", "enabled"]).is_truthy()
}

/// Without Praefect, TLS-enabled Gitaly needs a single certificate secret.
fn tls_secret(tree: &ValueTree) -> RuleOutcome {
    if !gitaly_enabled(tree) || !tls_enabled(tree) || praefect_enabled(tree) {
        return RuleOutcome::Pass;
    }
    RuleOutcome::pass_if(gitaly(tree).get("tls").get("secretName").is_set())
}

/// With Praefect, every virtual storage needs its own certificate secret.
fn praefect_tls_secrets(tree: &ValueTree) -> RuleOutcome {
    if !gitaly_enabled(tree) || !tls_enabled(tree) || !praefect_enabled(tree) {
        return RuleOutcome::Pass;
    }

    let storages = resolve_keys(tree, &["global", "praefect", "virtualStorages"]);
    let Some(storages) = storages.as_sequence() else {
        return RuleOutcome::Pass;
    };
    for (index, storage) in storages.iter().enumerate() {
        let storage = Lookup::Present(storage);
        if !storage.get("tlsSecretName").is_set() {
            return RuleOutcome::Fail(
                MessageParams::new()
                    .with("index", index)
                    .with("name", storage.get("name").as_str().unwrap_or_default()),
            );
        }
    }
    RuleOutcome::Pass
}

/// Disabling the bundled Gitaly requires at least one external server.
fn external_repos(tree: &ValueTree) -> RuleOutcome {
    if gitaly_enabled(tree) || praefect_enabled(tree) {
        return RuleOutcome::Pass;
    }
    RuleOutcome::pass_if(gitaly(tree).get("external").is_set())
}
