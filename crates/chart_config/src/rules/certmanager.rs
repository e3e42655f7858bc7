//! cert-manager issuer rules.

use crate::path_resolver::{resolve_keys, ValueTree};
use crate::rule::{MessageTemplate, RuleOutcome, ValidationRule};

#[cfg(test)]
#[path = "certmanager_tests.rs"]
mod tests;

pub const RULES: &[ValidationRule] = &[ValidationRule::new(
    "certmanager-issuer.email",
    MessageTemplate::new("Please set certmanager-issuer.email"),
    issuer_email,
)];

/// The issuer needs a contact email whenever the chart configures
/// cert-manager itself.
fn issuer_email(tree: &ValueTree) -> RuleOutcome {
    let configures_certmanager =
        resolve_keys(tree, &["global", "ingress", "configureCertmanager"]).flag_or(true);
    let installs_certmanager = resolve_keys(tree, &["certmanager", "install"]).flag_or(true);
    if !configures_certmanager || !installs_certmanager {
        return RuleOutcome::Pass;
    }

    if resolve_keys(tree, &["certmanager-issuer", "email"]).is_set() {
        RuleOutcome::Pass
    } else {
        RuleOutcome::fail()
    }
}
