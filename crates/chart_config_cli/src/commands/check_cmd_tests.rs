//! Tests for the check command.

use super::*;
use crate::errors::EXIT_INVALID_CONFIGURATION;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn values_file(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("values.yaml");
    fs::write(&path, content).expect("Failed to write values file");
    path
}

fn args_for(values: PathBuf, all: bool) -> CheckArgs {
    CheckArgs {
        input: InputArgs {
            values: vec![values],
            release_name: None,
            settings: None,
        },
        all,
    }
}

#[test]
fn test_collect_failures_valid_values() {
    let tree = json!({ "certmanager-issuer": { "email": "ops@example.com" } });

    assert!(collect_failures(&tree, &ResolverSettings::default(), false).is_empty());
    assert!(collect_failures(&tree, &ResolverSettings::default(), true).is_empty());
}

#[test]
fn test_collect_failures_first_only() {
    let tree = json!({
        "global": { "geo": { "enabled": true } },
        "gitlab": { "task-runner": { "replicas": 2, "persistence": { "enabled": true } } }
    });

    let failures = collect_failures(&tree, &ResolverSettings::default(), false);

    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].rule_id(), "certmanager-issuer.email");
}

#[test]
fn test_collect_failures_all() {
    let tree = json!({
        "global": { "geo": { "enabled": true } },
        "gitlab": { "task-runner": { "replicas": 2, "persistence": { "enabled": true } } }
    });

    let failures = collect_failures(&tree, &ResolverSettings::default(), true);
    let ids: Vec<&str> = failures.iter().map(|f| f.rule_id()).collect();

    assert_eq!(
        ids,
        vec!["certmanager-issuer.email", "geo.database", "task-runner.replicas"]
    );
}

#[test]
fn test_execute_valid_values_file() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let values = values_file(
        &dir,
        "certmanager-issuer:\n  email: ops@example.com\nredis:\n  install: false\n",
    );

    assert!(execute(&args_for(values, false)).is_ok());
}

#[test]
fn test_execute_invalid_values_file() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let values = values_file(
        &dir,
        r#"
certmanager-issuer:
  email: ops@example.com
gitlab:
  sidekiq:
    pods:
      - name: valid-1
        queues: merge
      - name: invalid-1
        queues: merge
        negateQueues: post_receive
"#,
    );

    let error = execute(&args_for(values, true)).unwrap_err();

    assert_eq!(error.exit_code(), EXIT_INVALID_CONFIGURATION);
    assert!(error
        .to_string()
        .contains("`negateQueues` is not usable if `queues` is provided"));
}

#[test]
fn test_execute_missing_values_file() {
    let error = execute(&args_for(PathBuf::from("missing-values.yaml"), false)).unwrap_err();

    assert!(matches!(error, Error::LoadFile { .. }));
}

#[test]
fn test_collect_failures_honours_report_all_setting() {
    let tree = json!({
        "global": { "geo": { "enabled": true } },
        "gitlab": { "task-runner": { "replicas": 2, "persistence": { "enabled": true } } }
    });
    let settings = ResolverSettings {
        report_all_failures: true,
        ..ResolverSettings::default()
    };

    let failures = collect_failures(&tree, &settings, false);

    assert_eq!(failures.len(), 3);
}

#[test]
fn test_execute_all_reports_failures_in_catalogue_order() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let values = values_file(
        &dir,
        r#"
global:
  geo:
    enabled: true
gitlab:
  task-runner:
    replicas: 2
    persistence:
      enabled: true
"#,
    );

    let error = execute(&args_for(values, true)).unwrap_err();

    assert_eq!(error.exit_code(), EXIT_INVALID_CONFIGURATION);
    let rendered = error.to_string();
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("certmanager-issuer.email: "));
    assert!(lines[1].starts_with("geo.database: "));
    assert!(lines[2].starts_with("task-runner.replicas: "));
}

#[test]
fn test_execute_settings_file_enables_full_report() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let values = values_file(
        &dir,
        "global:\n  geo:\n    enabled: true\n",
    );
    let settings = dir.path().join("chart-config.toml");
    fs::write(&settings, "[resolver]\nreport_all_failures = true\n")
        .expect("Failed to write settings");

    let mut args = args_for(values, false);
    args.input.settings = Some(settings);

    let error = execute(&args).unwrap_err();

    assert!(matches!(&error, Error::ValidationFailures(failures) if failures.len() == 2));
}
