//! Multi-instance dependent services.
//!
//! A [`ServiceDescriptor`] describes, as data, a dependent service the chart
//! can either install itself or connect to externally, and which operators may
//! split into several logical instances (Redis: a primary for job queues plus
//! `cache`, `sharedState`, `clusterCache`, ...).
//!
//! Instances are declared implicitly. The service's own top-level fields form
//! the default instance, named after the service. Every recognised key under
//! the service's global namespace whose value is a mapping declares a named
//! instance.
//!
//! # Examples
//!
//! ```rust
//! use chart_config::ServiceDescriptor;
//! use serde_json::json;
//!
//! let redis = ServiceDescriptor::redis();
//! let tree = json!({
//!     "global": { "redis": { "host": "resque.redis", "cache": { "port": 9999 } } }
//! });
//!
//! let names: Vec<String> = redis
//!     .discover_instances(&tree)
//!     .into_iter()
//!     .map(|instance| instance.name)
//!     .collect();
//! assert_eq!(names, vec!["redis".to_string(), "cache".to_string()]);
//! ```

use serde::Serialize;

use crate::field_spec::{find_field, FieldSpec, REDIS_FIELDS};
use crate::path_resolver::{resolve, resolve_keys, Lookup, ValueTree};
use crate::value_path::ValuePath;

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;

/// Whether an instance is the implicit default or a named override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceKind {
    Default,
    Named,
}

/// One logical instance of a dependent service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct InstanceDeclaration {
    pub name: String,
    pub kind: InstanceKind,
}

impl InstanceDeclaration {
    pub fn default_for(service: &ServiceDescriptor) -> Self {
        Self {
            name: service.name.to_string(),
            kind: InstanceKind::Default,
        }
    }

    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: InstanceKind::Named,
        }
    }

    pub fn is_default(&self) -> bool {
        self.kind == InstanceKind::Default
    }
}

/// Static description of a multi-instance dependent service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// Service name; also the name of the default instance.
    pub name: &'static str,

    /// Keys of the service's global namespace, e.g. `global.redis`.
    pub global_keys: &'static [&'static str],

    /// Keys of the flag that makes the chart install its own server.
    pub install_flag: &'static [&'static str],

    /// Value of the install flag when the operator does not set it.
    pub install_default: bool,

    /// Sub-keys of the global namespace that declare named instances.
    pub instance_keys: &'static [&'static str],

    /// Inheritance policy for every instance field.
    pub fields: &'static [FieldSpec],

    /// Port used for sentinel endpoints that do not declare one.
    pub sentinel_port: u16,

    /// Key of an opaque document handed to the renderer untouched.
    pub override_key: Option<&'static str>,

    /// Key of extra named password blocks that only contribute secrets.
    pub override_secrets_key: Option<&'static str>,
}

/// Redis as deployed alongside the chart.
pub const REDIS: ServiceDescriptor = ServiceDescriptor {
    name: "redis",
    global_keys: &["global", "redis"],
    install_flag: &["redis", "install"],
    install_default: true,
    instance_keys: &[
        "cache",
        "sharedState",
        "queues",
        "actioncable",
        "traceChunks",
        "rateLimiting",
        "sessions",
        "repositoryCache",
        "workhorse",
        "clusterCache",
        "clusterRateLimiting",
        "clusterSharedState",
    ],
    fields: REDIS_FIELDS,
    sentinel_port: 26379,
    override_key: Some("redisYmlOverride"),
    override_secrets_key: Some("redisYmlOverrideSecrets"),
};

impl ServiceDescriptor {
    pub fn redis() -> Self {
        REDIS
    }

    pub fn global_path(&self) -> ValuePath {
        ValuePath::from_keys(self.global_keys)
    }

    /// Path of the mapping holding an instance's own fields.
    ///
    /// The default instance lives directly in the global namespace.
    pub fn instance_path(&self, instance: &InstanceDeclaration) -> ValuePath {
        match instance.kind {
            InstanceKind::Default => self.global_path(),
            InstanceKind::Named => self.global_path().child(&instance.name),
        }
    }

    pub fn global_layer<'a>(&self, tree: &'a ValueTree) -> Lookup<'a> {
        resolve_keys(tree, self.global_keys)
    }

    pub fn instance_layer<'a>(
        &self,
        tree: &'a ValueTree,
        instance: &InstanceDeclaration,
    ) -> Lookup<'a> {
        resolve(tree, &self.instance_path(instance))
    }

    /// Whether the chart installs its own server for this service.
    pub fn is_installed(&self, tree: &ValueTree) -> bool {
        resolve_keys(tree, self.install_flag).flag_or(self.install_default)
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        find_field(self.fields, name)
    }

    /// Resolves an instance name to its declaration.
    pub fn instance(&self, name: &str) -> InstanceDeclaration {
        if name == self.name {
            InstanceDeclaration::default_for(self)
        } else {
            InstanceDeclaration::named(name)
        }
    }

    /// Named instances declared in the tree, in descriptor order.
    pub fn named_instances(&self, tree: &ValueTree) -> Vec<InstanceDeclaration> {
        let global = self.global_layer(tree);
        self.instance_keys
            .iter()
            .filter(|key| global.get(key).as_mapping().is_some())
            .map(|key| InstanceDeclaration::named(key))
            .collect()
    }

    /// The default instance followed by every declared named instance.
    pub fn discover_instances(&self, tree: &ValueTree) -> Vec<InstanceDeclaration> {
        let mut instances = vec![InstanceDeclaration::default_for(self)];
        instances.extend(self.named_instances(tree));
        instances
    }

    /// Chart full name: the release name, suffixed with the service name
    /// unless the release name already contains it.
    pub fn fullname(&self, release_name: &str) -> String {
        if release_name.contains(self.name) {
            release_name.to_string()
        } else {
            format!("{}-{}", release_name, self.name)
        }
    }

    /// Host of the in-chart primary service.
    pub fn service_host(&self, release_name: &str) -> String {
        format!("{}-master", self.fullname(release_name))
    }

    /// Name of the secret the chart generates for this service.
    pub fn release_secret_name(&self, release_name: &str) -> String {
        format!("{}-{}-secret", release_name, self.name)
    }

    /// Where the renderer mounts an instance's password.
    pub fn secret_mount_path(&self, instance_name: &str) -> String {
        format!("{}/{}-password", self.name, instance_name)
    }

    /// Where the renderer mounts a password declared for the override
    /// document. Kept apart from instance paths so an entry named like an
    /// instance never lands on that instance's file.
    pub fn override_secret_mount_path(&self, entry_name: &str) -> String {
        format!("{}/override/{}-password", self.name, entry_name)
    }

    /// File the renderer emits for an instance.
    pub fn config_file_name(&self, instance: &InstanceDeclaration) -> String {
        match instance.kind {
            InstanceKind::Default => "resque.yml.erb".to_string(),
            InstanceKind::Named => {
                format!("{}.{}.yml.erb", self.name, snake_case(&instance.name))
            }
        }
    }
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
