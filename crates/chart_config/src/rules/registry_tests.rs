use super::*;
use serde_json::json;

fn failure_of(id: &str, tree: &ValueTree) -> Option<String> {
    RULES
        .iter()
        .find(|rule| rule.id() == id)
        .and_then(|rule| rule.evaluate(tree))
        .map(|failure| failure.message().to_string())
}

#[test]
fn test_sentry_with_dsn_passes() {
    let tree = json!({
        "registry": { "reporting": { "sentry": { "enabled": true, "dsn": "somedsn" } } }
    });

    assert_eq!(failure_of("registry.sentry.dsn", &tree), None);
}

#[test]
fn test_sentry_without_dsn_fails() {
    let tree = json!({ "registry": { "reporting": { "sentry": { "enabled": true } } } });

    assert_eq!(
        failure_of("registry.sentry.dsn", &tree).as_deref(),
        Some("When enabling sentry, you must configure at least one DSN.")
    );
}

#[test]
fn test_supported_postgresql_version_passes() {
    let tree = json!({
        "postgresql": { "image": { "tag": 12 } },
        "global": { "registry": { "database": { "enabled": true } } }
    });

    assert_eq!(failure_of("registry.database.version", &tree), None);
}

#[test]
fn test_old_postgresql_version_fails() {
    let tree = json!({
        "postgresql": { "image": { "tag": 11 } },
        "global": { "registry": { "database": { "enabled": true } } }
    });

    assert_eq!(
        failure_of("registry.database.version", &tree).as_deref(),
        Some("PostgreSQL 12 is the minimum required version for the registry metadata database, found 11")
    );
}

#[test]
fn test_version_parsed_from_string_tag() {
    let tree = json!({
        "postgresql": { "image": { "tag": "11.9.0" } },
        "registry": { "database": { "enabled": true } }
    });

    assert!(failure_of("registry.database.version", &tree)
        .unwrap()
        .ends_with("found 11"));
}

#[test]
fn test_version_ignored_for_external_postgresql() {
    let tree = json!({
        "postgresql": { "install": false, "image": { "tag": 11 } },
        "registry": { "database": { "enabled": true } }
    });

    assert_eq!(failure_of("registry.database.version", &tree), None);
}

#[test]
fn test_valid_sslmode_passes() {
    let tree = json!({
        "global": { "registry": { "database": { "enabled": true, "sslmode": "disable" } } }
    });

    assert_eq!(failure_of("registry.database.sslmode", &tree), None);
}

#[test]
fn test_invalid_sslmode_fails() {
    let tree = json!({
        "global": { "registry": { "database": { "enabled": true, "sslmode": "testing" } } }
    });

    assert_eq!(
        failure_of("registry.database.sslmode", &tree).as_deref(),
        Some("Invalid SSL mode \"testing\" for the registry database, must be one of: disable, allow, prefer, require, verify-ca, verify-full")
    );
}

#[test]
fn test_disablemirrorfs_with_database_passes() {
    let tree = json!({
        "postgresql": { "image": { "tag": 12 } },
        "registry": { "database": { "enabled": true }, "migration": { "disablemirrorfs": true } }
    });

    assert_eq!(failure_of("registry.migration.disablemirrorfs", &tree), None);
}

#[test]
fn test_disablemirrorfs_without_database_fails() {
    let tree = json!({
        "postgresql": { "image": { "tag": 12 } },
        "registry": { "migration": { "disablemirrorfs": true } }
    });

    assert_eq!(
        failure_of("registry.migration.disablemirrorfs", &tree).as_deref(),
        Some("Disabling filesystem metadata requires the metadata database to be enabled")
    );
}
