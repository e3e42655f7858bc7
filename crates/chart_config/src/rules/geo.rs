//! Geo replication rules.

use crate::path_resolver::{resolve_keys, Lookup, ValueTree};
use crate::rule::{MessageTemplate, RuleOutcome, ValidationRule};

#[cfg(test)]
#[path = "geo_tests.rs"]
mod tests;

pub const RULES: &[ValidationRule] = &[
    ValidationRule::new(
        "geo.database",
        MessageTemplate::new("Geo was configured but no database was provided"),
        primary_database,
    ),
    ValidationRule::new(
        "geo.secondary.database",
        MessageTemplate::new(
            "Geo was configured with `role: secondary`, but no database was provided",
        ),
        secondary_database,
    ),
];

fn geo(tree: &ValueTree) -> Lookup<'_> {
    resolve_keys(tree, &["global", "geo"])
}

/// Geo cannot run against the bundled database.
fn primary_database(tree: &ValueTree) -> RuleOutcome {
    if !geo(tree).get("enabled").is_truthy() {
        return RuleOutcome::Pass;
    }
    RuleOutcome::pass_if(resolve_keys(tree, &["global", "psql", "host"]).is_set())
}

/// A secondary site also needs its tracking database.
fn secondary_database(tree: &ValueTree) -> RuleOutcome {
    let geo = geo(tree);
    if !geo.get("enabled").is_truthy() || geo.get("role").as_str() != Some("secondary") {
        return RuleOutcome::Pass;
    }
    RuleOutcome::pass_if(geo.get("psql").get("host").is_set())
}
