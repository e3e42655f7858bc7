//! Tests for the field inheritance table.

use super::*;

#[test]
fn test_redis_table_declares_every_field_once() {
    let mut names: Vec<&str> = REDIS_FIELDS.iter().map(|field| field.name).collect();
    let total = names.len();
    names.sort_unstable();
    names.dedup();

    assert_eq!(names.len(), total);
    for expected in ["host", "port", "user", "password", "sentinels", "cluster"] {
        assert!(find_field(REDIS_FIELDS, expected).is_some(), "{expected}");
    }
}

#[test]
fn test_host_and_port_are_independent() {
    let host = find_field(REDIS_FIELDS, "host").unwrap();
    let port = find_field(REDIS_FIELDS, "port").unwrap();

    assert_eq!(host.mode, InheritanceMode::Independent);
    assert_eq!(host.default, FieldDefault::ServiceHost);
    assert_eq!(port.mode, InheritanceMode::Independent);
    assert_eq!(port.default, FieldDefault::Integer(6379));
}

#[test]
fn test_user_is_not_inherited_into_clusters() {
    let user = find_field(REDIS_FIELDS, "user").unwrap();

    assert_eq!(user.mode, InheritanceMode::Independent);
    assert!(!user.inherit_into_cluster);
    assert_eq!(user.default, FieldDefault::Unset);
}

#[test]
fn test_topology_fields_are_local_only() {
    for name in ["sentinels", "cluster"] {
        let field = find_field(REDIS_FIELDS, name).unwrap();
        assert_eq!(field.mode, InheritanceMode::LocalOnly);
    }
}

#[test]
fn test_password_block_uses_auth_key_at_service_layer() {
    let password = find_field(REDIS_FIELDS, "password").unwrap();

    assert_eq!(password.service_key, "auth");
    assert!(!password.inherit_into_cluster);
    match password.mode {
        InheritanceMode::AllOrNothing { switch, members } => {
            assert_eq!(switch, "enabled");
            assert_eq!(members.len(), 3);
        }
        other => panic!("Expected AllOrNothing, got {:?}", other),
    }
}

#[test]
fn test_password_members_and_defaults() {
    let password = find_field(REDIS_FIELDS, "password").unwrap();

    assert_eq!(
        password.member("enabled").unwrap().default,
        FieldDefault::Flag(true)
    );
    assert_eq!(
        password.member("secret").unwrap().default,
        FieldDefault::ReleaseSecret
    );
    assert_eq!(
        password.member("key").unwrap().default,
        FieldDefault::Text("secret")
    );
    assert!(password.member("user").is_none());
}

#[test]
fn test_member_on_scalar_field_is_none() {
    let host = find_field(REDIS_FIELDS, "host").unwrap();

    assert!(host.member("enabled").is_none());
}
