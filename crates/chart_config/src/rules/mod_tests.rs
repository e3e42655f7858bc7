use super::*;
use crate::rule::{MessageTemplate, RuleOutcome};
use crate::path_resolver::ValueTree;

fn always_fails(_: &ValueTree) -> RuleOutcome {
    RuleOutcome::fail()
}

#[test]
fn test_standard_catalogue_order() {
    let ids = RuleCatalogue::standard().ids();

    assert_eq!(
        ids,
        vec![
            "certmanager-issuer.email",
            "gitaly.tls",
            "gitaly.tls.praefect",
            "gitaly.extern.repos",
            "sidekiq.queues.mixed",
            "sidekiq.queues.cluster",
            "sidekiq.queues.queueSelector",
            "database.externalLoadBalancing",
            "database.externalLoadBalancing.missingRequirements",
            "database.externalLoadBalancing.hosts",
            "database.externalLoadBalancing.discover",
            "geo.database",
            "geo.secondary.database",
            "webservice.numbers",
            "appConfig.maxRequestDurationSeconds",
            "webservice.webServer",
            "dependencyProxy.puma",
            "webservice.terminationGracePeriodSeconds",
            "task-runner.replicas",
            "registry.sentry.dsn",
            "registry.database.version",
            "registry.database.sslmode",
            "registry.migration.disablemirrorfs",
            "redis.multipleInstances",
            "redis.yml.override",
            "redis.topology.conflict",
            "redis.topology.shape",
            "redis.port",
            "redis.auth.secret",
        ]
    );
}

#[test]
fn test_rule_ids_are_unique() {
    let mut ids = RuleCatalogue::standard().ids();
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();

    assert_eq!(ids.len(), total);
}

#[test]
fn test_get_by_id() {
    let catalogue = RuleCatalogue::standard();

    assert_eq!(
        catalogue.get("redis.port").map(|rule| rule.id()),
        Some("redis.port")
    );
    assert!(catalogue.get("nope").is_none());
}

#[test]
fn test_with_rule_appends() {
    let rule = ValidationRule::new("custom", MessageTemplate::new("custom"), always_fails);
    let catalogue = RuleCatalogue::from_rules(Vec::new()).with_rule(rule);

    assert_eq!(catalogue.len(), 1);
    assert!(!catalogue.is_empty());
    assert_eq!(catalogue.ids(), vec!["custom"]);
}

#[test]
fn test_default_is_standard() {
    assert_eq!(
        RuleCatalogue::default().len(),
        RuleCatalogue::standard().len()
    );
}
