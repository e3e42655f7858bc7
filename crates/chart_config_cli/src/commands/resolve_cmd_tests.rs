//! Tests for the resolve command.

use super::*;
use crate::errors::EXIT_INVALID_CONFIGURATION;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn valid_tree() -> ValueTree {
    json!({
        "certmanager-issuer": { "email": "ops@example.com" },
        "redis": { "install": false },
        "global": {
            "redis": {
                "host": "resque.redis",
                "auth": { "enabled": true, "secret": "rspec-resque", "key": "password" },
                "cache": { "port": 9999 }
            }
        }
    })
}

#[test]
fn test_resolve_values_inherits_service_settings() {
    let resolved = resolve_values(&valid_tree(), &ResolverSettings::default()).unwrap();
    let cache = resolved.instance("redis", "cache").unwrap();

    assert_eq!(cache.host, "resque.redis");
    assert_eq!(cache.port, 9999);
    assert_eq!(cache.secret().map(|s| s.name.as_str()), Some("rspec-resque"));
}

#[test]
fn test_resolve_values_invalid_tree() {
    let error = resolve_values(&json!({}), &ResolverSettings::default()).unwrap_err();

    assert_eq!(error.exit_code(), EXIT_INVALID_CONFIGURATION);
    assert!(error.to_string().contains("Please set certmanager-issuer.email"));
}

#[test]
fn test_render_json() {
    let resolved = resolve_values(&valid_tree(), &ResolverSettings::default()).unwrap();

    let output = render(&resolved, OutputFormat::Json).unwrap();
    let parsed: Value = serde_json::from_str(&output).unwrap();

    assert_eq!(
        parsed["services"]["redis"]["instances"]["cache"]["port"],
        9999
    );
}

#[test]
fn test_render_yaml() {
    let resolved = resolve_values(&valid_tree(), &ResolverSettings::default()).unwrap();

    let output = render(&resolved, OutputFormat::Yaml).unwrap();
    let parsed: Value = serde_yaml::from_str(&output).unwrap();

    assert_eq!(
        parsed["services"]["redis"]["instances"]["cache"]["host"],
        "resque.redis"
    );
}

#[test]
fn test_execute_with_values_file() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let values = dir.path().join("values.json");
    fs::write(&values, valid_tree().to_string()).expect("Failed to write values file");

    let args = ResolveArgs {
        input: InputArgs {
            values: vec![values],
            release_name: Some("gitlab".to_string()),
            settings: None,
        },
        format: Some(OutputFormat::Yaml),
    };

    assert!(execute(&args).is_ok());
}

#[test]
fn test_execute_missing_values_file() {
    let args = ResolveArgs {
        input: InputArgs {
            values: vec![PathBuf::from("missing-values.yaml")],
            release_name: None,
            settings: None,
        },
        format: None,
    };

    assert!(matches!(execute(&args), Err(Error::LoadFile { .. })));
}
