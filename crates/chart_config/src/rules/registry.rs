//! Container registry rules.
//!
//! The registry's metadata database can be configured under `registry.database`
//! or `global.registry.database`. Both locations are checked.

use serde_json::Value;

use crate::path_resolver::{resolve_keys, Lookup, ValueTree};
use crate::rule::{MessageParams, MessageTemplate, RuleOutcome, ValidationRule};

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

pub const RULES: &[ValidationRule] = &[
    ValidationRule::new(
        "registry.sentry.dsn",
        MessageTemplate::new("When enabling sentry, you must configure at least one DSN."),
        sentry_dsn,
    ),
    ValidationRule::new(
        "registry.database.version",
        MessageTemplate::new(
            "PostgreSQL {minimum} is the minimum required version for the registry metadata database, found {actual}",
        ),
        database_version,
    ),
    ValidationRule::new(
        "registry.database.sslmode",
        MessageTemplate::new(
            "Invalid SSL mode \"{value}\" for the registry database, must be one of: disable, allow, prefer, require, verify-ca, verify-full",
        ),
        database_sslmode,
    ),
    ValidationRule::new(
        "registry.migration.disablemirrorfs",
        MessageTemplate::new(
            "Disabling filesystem metadata requires the metadata database to be enabled",
        ),
        mirror_fs_needs_database,
    ),
];

/// Minimum PostgreSQL major version for the metadata database.
pub const MINIMUM_POSTGRESQL_MAJOR: u64 = 12;

const SSL_MODES: [&str; 6] = [
    "disable",
    "allow",
    "prefer",
    "require",
    "verify-ca",
    "verify-full",
];

fn database_layers(tree: &ValueTree) -> [Lookup<'_>; 2] {
    [
        resolve_keys(tree, &["registry", "database"]),
        resolve_keys(tree, &["global", "registry", "database"]),
    ]
}

fn database_enabled(tree: &ValueTree) -> bool {
    database_layers(tree)
        .iter()
        .any(|layer| layer.get("enabled").is_truthy())
}

fn sentry_dsn(tree: &ValueTree) -> RuleOutcome {
    let sentry = resolve_keys(tree, &["registry", "reporting", "sentry"]);
    if !sentry.get("enabled").is_truthy() {
        return RuleOutcome::Pass;
    }
    RuleOutcome::pass_if(sentry.get("dsn").is_set())
}

/// Major version of an image tag such as `12`, `"11.9.0"` or `"13-alpine"`.
fn major_version(tag: Lookup<'_>) -> Option<u64> {
    let text = match tag.value()? {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.clone(),
        _ => return None,
    };
    let digits: String = text.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Only checked when the bundled PostgreSQL is installed; an external server's
/// version is not visible here.
fn database_version(tree: &ValueTree) -> RuleOutcome {
    if !database_enabled(tree) || !resolve_keys(tree, &["postgresql", "install"]).flag_or(true) {
        return RuleOutcome::Pass;
    }
    let tag = resolve_keys(tree, &["postgresql", "image", "tag"]);
    match major_version(tag) {
        Some(major) if major < MINIMUM_POSTGRESQL_MAJOR => RuleOutcome::Fail(
            MessageParams::new()
                .with("minimum", MINIMUM_POSTGRESQL_MAJOR)
                .with("actual", major),
        ),
        _ => RuleOutcome::Pass,
    }
}

fn database_sslmode(tree: &ValueTree) -> RuleOutcome {
    for layer in database_layers(tree) {
        let mode = layer.get("sslmode");
        if !mode.is_set() {
            continue;
        }
        match mode.as_str() {
            Some(value) if SSL_MODES.contains(&value) => {}
            Some(value) => return RuleOutcome::Fail(MessageParams::new().with("value", value)),
            None => {
                let shown = mode.value().map(ToString::to_string).unwrap_or_default();
                return RuleOutcome::Fail(MessageParams::new().with("value", shown));
            }
        }
    }
    RuleOutcome::Pass
}

fn mirror_fs_needs_database(tree: &ValueTree) -> RuleOutcome {
    let disabled = resolve_keys(tree, &["registry", "migration", "disablemirrorfs"]).is_truthy();
    RuleOutcome::pass_if(!disabled || database_enabled(tree))
}
