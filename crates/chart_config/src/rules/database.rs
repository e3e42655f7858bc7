//! PostgreSQL load-balancing rules.

use crate::path_resolver::{resolve_keys, Lookup, ValueTree};
use crate::rule::{MessageTemplate, RuleOutcome, ValidationRule};

#[cfg(test)]
#[path = "database_tests.rs"]
mod tests;

pub const RULES: &[ValidationRule] = &[
    ValidationRule::new(
        "database.externalLoadBalancing",
        MessageTemplate::new(
            "PostgreSQL is set to install, but database load balancing is also enabled",
        ),
        not_with_bundled_postgresql,
    ),
    ValidationRule::new(
        "database.externalLoadBalancing.missingRequirements",
        MessageTemplate::new(
            "You must specify `load_balancing.hosts` or `load_balancing.discover`",
        ),
        hosts_or_discover,
    ),
    ValidationRule::new(
        "database.externalLoadBalancing.hosts",
        MessageTemplate::new(
            "Database load balancing using `hosts` is configured, but does not appear to be a list",
        ),
        hosts_is_list,
    ),
    ValidationRule::new(
        "database.externalLoadBalancing.discover",
        MessageTemplate::new(
            "Database load balancing using `discover` is configured, but does not appear to be a map",
        ),
        discover_is_map,
    ),
];

fn load_balancing(tree: &ValueTree) -> Lookup<'_> {
    resolve_keys(tree, &["global", "psql", "load_balancing"])
}

fn not_with_bundled_postgresql(tree: &ValueTree) -> RuleOutcome {
    let bundled = resolve_keys(tree, &["postgresql", "install"]).flag_or(true);
    RuleOutcome::pass_if(!(bundled && load_balancing(tree).is_set()))
}

fn hosts_or_discover(tree: &ValueTree) -> RuleOutcome {
    let config = load_balancing(tree);
    if !config.is_set() {
        return RuleOutcome::Pass;
    }
    RuleOutcome::pass_if(config.get("hosts").is_present() || config.get("discover").is_present())
}

fn hosts_is_list(tree: &ValueTree) -> RuleOutcome {
    let hosts = load_balancing(tree).get("hosts");
    RuleOutcome::pass_if(hosts.is_absent() || hosts.as_sequence().is_some())
}

fn discover_is_map(tree: &ValueTree) -> RuleOutcome {
    let discover = load_balancing(tree).get("discover");
    RuleOutcome::pass_if(discover.is_absent() || discover.as_mapping().is_some())
}
