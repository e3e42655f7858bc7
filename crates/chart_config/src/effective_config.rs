//! Effective configuration of one service instance.
//!
//! An [`EffectiveConfig`] is the fully merged result of layering an instance's
//! own values over the service-level values and the built-in defaults. It is
//! what the renderer turns into a `resque.yml` / `redis.<instance>.yml` file
//! and what the secret projection uses to decide which secret to mount.
//!
//! Two invariants are enforced by construction:
//! - authentication enabled always carries a [`SecretReference`]
//!   ([`AuthDecision::Enabled`] owns it, [`AuthDecision::Disabled`] has none);
//! - an instance is standalone, sentinel-fronted or a cluster, never both
//!   sentinel-fronted and a cluster ([`Topology`] is a single enum).
//!
//! # Source tracing
//!
//! `sources` records which layer supplied each resolved field, which is what
//! operators need when a cache unexpectedly points at the wrong host.

use serde::Serialize;
use std::collections::BTreeMap;

#[cfg(test)]
#[path = "effective_config_tests.rs"]
mod tests;

/// Resolved settings for one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveConfig {
    /// Instance name (`redis` for the default instance, `cache`, ...).
    pub instance: String,

    pub host: String,

    pub port: u16,

    pub user: Option<String>,

    pub auth: AuthDecision,

    pub topology: Topology,

    /// Name of the file the renderer emits for this instance.
    pub config_file: String,

    /// Which layer supplied each field.
    pub sources: FieldSourceTrace,
}

impl EffectiveConfig {
    pub fn auth_enabled(&self) -> bool {
        self.auth.is_enabled()
    }

    pub fn secret(&self) -> Option<&SecretReference> {
        self.auth.secret()
    }

    /// `host:port` of the primary endpoint.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn source_of(&self, field_path: &str) -> Option<FieldSource> {
        self.sources.get_source(field_path)
    }
}

/// Whether an instance authenticates, and with which secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AuthDecision {
    Disabled,
    Enabled(SecretReference),
}

impl AuthDecision {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }

    pub fn secret(&self) -> Option<&SecretReference> {
        match self {
            Self::Enabled(secret) => Some(secret),
            Self::Disabled => None,
        }
    }
}

/// A reference to one key of a Kubernetes secret.
///
/// Names and keys are passed through exactly as the operator wrote them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SecretReference {
    pub name: String,
    pub key: String,
    /// Path, relative to the secrets volume, where the value is projected.
    pub mount_path: String,
}

/// Secondary or member endpoints of an instance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", content = "endpoints", rename_all = "snake_case")]
pub enum Topology {
    /// A single primary endpoint.
    #[default]
    Standalone,
    /// A primary discovered through sentinels.
    Sentinels(Vec<Endpoint>),
    /// A set of cluster members.
    Cluster(Vec<Endpoint>),
}

impl Topology {
    pub fn endpoints(&self) -> &[Endpoint] {
        match self {
            Self::Standalone => &[],
            Self::Sentinels(endpoints) | Self::Cluster(endpoints) => endpoints,
        }
    }

    pub fn is_cluster(&self) -> bool {
        matches!(self, Self::Cluster(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

/// Tracks which layer provided each resolved field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FieldSourceTrace {
    sources: BTreeMap<String, FieldSource>,
}

impl FieldSourceTrace {
    pub fn new() -> Self {
        Self {
            sources: BTreeMap::new(),
        }
    }

    /// Records the source of a field, replacing any earlier record.
    pub fn add_source(&mut self, field_path: &str, source: FieldSource) {
        self.sources.insert(field_path.to_string(), source);
    }

    pub fn get_source(&self, field_path: &str) -> Option<FieldSource> {
        self.sources.get(field_path).copied()
    }
}

/// Layer that supplied a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    /// The instance's own mapping (highest precedence).
    Instance,

    /// The service's global namespace.
    Service,

    /// A built-in default (lowest precedence).
    Default,
}

impl std::fmt::Display for FieldSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldSource::Instance => write!(f, "Instance"),
            FieldSource::Service => write!(f, "Service"),
            FieldSource::Default => write!(f, "Default"),
        }
    }
}
