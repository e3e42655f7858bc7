//! Tests for effective configuration types.

use super::*;

fn secret() -> SecretReference {
    SecretReference {
        name: "rspec-resque".to_string(),
        key: "secret".to_string(),
        mount_path: "redis/redis-password".to_string(),
    }
}

fn config(auth: AuthDecision, topology: Topology) -> EffectiveConfig {
    EffectiveConfig {
        instance: "redis".to_string(),
        host: "resque.redis".to_string(),
        port: 6379,
        user: None,
        auth,
        topology,
        config_file: "resque.yml.erb".to_string(),
        sources: FieldSourceTrace::new(),
    }
}

#[test]
fn test_auth_enabled_carries_secret() {
    let config = config(AuthDecision::Enabled(secret()), Topology::Standalone);

    assert!(config.auth_enabled());
    assert_eq!(config.secret(), Some(&secret()));
}

#[test]
fn test_auth_disabled_has_no_secret() {
    let config = config(AuthDecision::Disabled, Topology::Standalone);

    assert!(!config.auth_enabled());
    assert!(config.secret().is_none());
}

#[test]
fn test_address() {
    let config = config(AuthDecision::Disabled, Topology::Standalone);

    assert_eq!(config.address(), "resque.redis:6379");
}

#[test]
fn test_topology_endpoints() {
    let endpoint = Endpoint {
        host: "s1.resque.redis".to_string(),
        port: 26379,
    };

    assert!(Topology::Standalone.endpoints().is_empty());
    assert_eq!(
        Topology::Sentinels(vec![endpoint.clone()]).endpoints(),
        &[endpoint.clone()]
    );
    assert!(Topology::Cluster(vec![endpoint.clone()]).is_cluster());
    assert!(!Topology::Sentinels(vec![endpoint]).is_cluster());
}

#[test]
fn test_source_trace_add_and_overwrite() {
    let mut trace = FieldSourceTrace::new();

    trace.add_source("host", FieldSource::Service);
    trace.add_source("port", FieldSource::Instance);
    assert_eq!(trace.get_source("host"), Some(FieldSource::Service));

    trace.add_source("host", FieldSource::Instance);
    assert_eq!(trace.get_source("port"), Some(FieldSource::Instance));
    assert_eq!(trace.get_source("host"), Some(FieldSource::Instance));
    assert_eq!(trace.get_source("user"), None);
}

#[test]
fn test_field_source_display() {
    assert_eq!(FieldSource::Instance.to_string(), "Instance");
    assert_eq!(FieldSource::Service.to_string(), "Service");
    assert_eq!(FieldSource::Default.to_string(), "Default");
}

#[test]
fn test_serialized_shape() {
    let config = config(AuthDecision::Enabled(secret()), Topology::Standalone);
    let value = serde_json::to_value(&config).unwrap();

    assert_eq!(value["auth"]["state"], "enabled");
    assert_eq!(value["auth"]["name"], "rspec-resque");
    assert_eq!(value["topology"]["kind"], "standalone");
}
