//! Instance inheritance resolver.
//!
//! Computes the [`EffectiveConfig`] of one instance of a multi-instance
//! service by walking the service's [`FieldSpec`] table. For each field the
//! instance layer is consulted first, then the service layer, then the
//! built-in default, following the field's [`InheritanceMode`].
//!
//! # Layers
//!
//! For a named instance such as `cache`:
//! 1. **Instance** - `global.redis.cache.*`
//! 2. **Service** - `global.redis.*` (the auth block lives at `global.redis.auth`)
//! 3. **Default** - built-in values such as port `6379` or the release secret
//!
//! The default instance has no separate instance layer; its own fields are the
//! service layer.
//!
//! # Examples
//!
//! ```rust
//! use chart_config::{InheritanceResolver, ServiceDescriptor};
//! use serde_json::json;
//!
//! let tree = json!({
//!     "global": { "redis": { "host": "resque.redis", "port": 6379, "cache": { "port": 9999 } } }
//! });
//!
//! let resolver = InheritanceResolver::new("test");
//! let cache = resolver.resolve_instance(&tree, &ServiceDescriptor::redis(), "cache")?;
//! assert_eq!(cache.address(), "resque.redis:9999");
//! # Ok::<(), chart_config::ConfigurationError>(())
//! ```

use serde_json::Value;
use tracing::debug;

use crate::{
    effective_config::{
        AuthDecision, EffectiveConfig, Endpoint, FieldSource, FieldSourceTrace, SecretReference,
        Topology,
    },
    errors::{ConfigurationError, ConfigurationResult},
    field_spec::{FieldDefault, FieldSpec, InheritanceMode},
    path_resolver::{Lookup, ValueTree},
    service::{InstanceDeclaration, ServiceDescriptor},
    settings::ResolverSettings,
};

#[cfg(test)]
#[path = "inheritance_tests.rs"]
mod tests;

/// Stateless per-instance resolver.
///
/// The only input besides the tree is the release name, which the generated
/// defaults (service host, release secret) are derived from.
#[derive(Debug, Clone)]
pub struct InheritanceResolver {
    release_name: String,
}

/// The value layers consulted for one instance.
#[derive(Debug, Clone, Copy)]
struct Layers<'a> {
    /// The instance's own mapping. Absent for the default instance.
    instance: Lookup<'a>,
    /// The service namespace.
    service: Lookup<'a>,
    /// Where the instance's topology is declared.
    topology: Lookup<'a>,
}

impl<'a> Layers<'a> {
    fn new(
        tree: &'a ValueTree,
        service: &ServiceDescriptor,
        instance: &InstanceDeclaration,
    ) -> Self {
        let global = service.global_layer(tree);
        if instance.is_default() {
            Self {
                instance: Lookup::Absent,
                service: global,
                topology: global,
            }
        } else {
            let own = service.instance_layer(tree, instance);
            Self {
                instance: own,
                service: global,
                topology: own,
            }
        }
    }
}

impl InheritanceResolver {
    pub fn new(release_name: impl Into<String>) -> Self {
        Self {
            release_name: release_name.into(),
        }
    }

    pub fn from_settings(settings: &ResolverSettings) -> Self {
        Self::new(settings.release_name.clone())
    }

    pub fn release_name(&self) -> &str {
        &self.release_name
    }

    /// Resolves an instance by name.
    ///
    /// The service's own name selects the default instance; any other name is
    /// looked up under the service's global namespace.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::ResolutionConflict` when the instance
    /// declares both sentinels and cluster members. Pipelines never see this
    /// error because the `redis.topology.conflict` rule rejects such trees
    /// before resolution.
    pub fn resolve_instance(
        &self,
        tree: &ValueTree,
        service: &ServiceDescriptor,
        instance_name: &str,
    ) -> ConfigurationResult<EffectiveConfig> {
        self.resolve_declared(tree, service, &service.instance(instance_name))
    }

    /// Resolves an already-discovered instance declaration.
    pub fn resolve_declared(
        &self,
        tree: &ValueTree,
        service: &ServiceDescriptor,
        instance: &InstanceDeclaration,
    ) -> ConfigurationResult<EffectiveConfig> {
        let layers = Layers::new(tree, service, instance);
        let mut sources = FieldSourceTrace::new();

        let sentinels = service
            .field("sentinels")
            .map(|field| raw_endpoints(layers.topology.get(field.name)))
            .unwrap_or_default();
        let members = service
            .field("cluster")
            .map(|field| raw_endpoints(layers.topology.get(field.name)))
            .unwrap_or_default();

        if !sentinels.is_empty() && !members.is_empty() {
            return Err(ConfigurationError::ResolutionConflict {
                instance: instance.name.clone(),
                reason: "both `sentinels` and `cluster` are declared".to_string(),
            });
        }
        let is_cluster = !members.is_empty();
        // The default instance's own fields are the service layer.
        let cluster_scoped = is_cluster && !instance.is_default();

        let host = self
            .pick_field(service, "host", &layers, cluster_scoped, non_empty_string)
            .map(|(host, source)| {
                sources.add_source("host", source);
                host
            })
            .unwrap_or_else(|| service.service_host(&self.release_name));

        let port = self
            .pick_field(service, "port", &layers, cluster_scoped, port_number)
            .map(|(port, source)| {
                sources.add_source("port", source);
                port
            })
            .unwrap_or(DEFAULT_PORT);

        let user = self
            .pick_field(service, "user", &layers, cluster_scoped, non_empty_string)
            .map(|(user, source)| {
                sources.add_source("user", source);
                user
            });

        let auth = self.resolve_auth(service, instance, &layers, cluster_scoped, &mut sources);

        let topology = if is_cluster {
            sources.add_source("topology", FieldSource::Instance);
            Topology::Cluster(into_endpoints(members, port))
        } else if !sentinels.is_empty() {
            sources.add_source("topology", FieldSource::Instance);
            Topology::Sentinels(into_endpoints(sentinels, service.sentinel_port))
        } else {
            Topology::Standalone
        };

        let config = EffectiveConfig {
            instance: instance.name.clone(),
            host,
            port,
            user,
            auth,
            topology,
            config_file: service.config_file_name(instance),
            sources,
        };

        debug!(
            instance = %config.instance,
            address = %config.address(),
            auth_enabled = config.auth_enabled(),
            cluster = config.topology.is_cluster(),
            "Resolved instance configuration"
        );

        Ok(config)
    }

    /// Resolves the all-or-nothing auth block of an instance.
    fn resolve_auth(
        &self,
        service: &ServiceDescriptor,
        instance: &InstanceDeclaration,
        layers: &Layers<'_>,
        cluster_scoped: bool,
        sources: &mut FieldSourceTrace,
    ) -> AuthDecision {
        let Some(block) = service
            .fields
            .iter()
            .find(|field| matches!(field.mode, InheritanceMode::AllOrNothing { .. }))
        else {
            return AuthDecision::Disabled;
        };
        let InheritanceMode::AllOrNothing { switch, .. } = block.mode else {
            return AuthDecision::Disabled;
        };

        // Only a mapping counts as the instance declaring its own block.
        let own_block = match layers.instance.get(block.name) {
            found @ Lookup::Present(Value::Object(_)) => found,
            _ => Lookup::Absent,
        };
        let service_block = if cluster_scoped && !block.inherit_into_cluster {
            // A cluster instance authenticates only with its own block.
            if own_block.is_absent() {
                return AuthDecision::Disabled;
            }
            Lookup::Absent
        } else {
            layers.service.get(block.service_key)
        };

        let mut member = |name: &str| -> Option<(String, FieldSource)> {
            let spec = block.member(name)?;
            let picked = self.pick(service, spec, own_block, service_block, non_empty_string);
            if let Some((_, source)) = &picked {
                sources.add_source(&format!("{}.{}", block.name, name), *source);
            }
            picked
        };

        let enabled = block
            .member(switch)
            .and_then(|spec| self.pick(service, spec, own_block, service_block, flag_value));
        let secret = member("secret");
        let key = member("key");

        let Some((enabled, enabled_source)) = enabled else {
            return AuthDecision::Disabled;
        };
        sources.add_source(&format!("{}.{}", block.name, switch), enabled_source);
        if !enabled {
            return AuthDecision::Disabled;
        }

        let name = secret
            .map(|(name, _)| name)
            .unwrap_or_else(|| service.release_secret_name(&self.release_name));
        let key = key.map(|(key, _)| key).unwrap_or_else(|| "secret".to_string());

        AuthDecision::Enabled(SecretReference {
            name,
            key,
            mount_path: service.secret_mount_path(&instance.name),
        })
    }

    /// Picks an independent field from the instance/service/default layers.
    fn pick_field<T>(
        &self,
        service: &ServiceDescriptor,
        name: &str,
        layers: &Layers<'_>,
        cluster_scoped: bool,
        convert: impl Fn(Lookup<'_>) -> Option<T>,
    ) -> Option<(T, FieldSource)> {
        let spec = service.field(name)?;
        if spec.mode != InheritanceMode::Independent {
            return None;
        }
        let service_layer = if cluster_scoped && !spec.inherit_into_cluster {
            Lookup::Absent
        } else {
            layers.service
        };
        self.pick(service, spec, layers.instance, service_layer, convert)
    }

    /// Layered lookup of one field. A value that is present but fails
    /// conversion is treated as absent and the next layer is consulted.
    fn pick<T>(
        &self,
        service: &ServiceDescriptor,
        spec: &FieldSpec,
        instance_layer: Lookup<'_>,
        service_layer: Lookup<'_>,
        convert: impl Fn(Lookup<'_>) -> Option<T>,
    ) -> Option<(T, FieldSource)> {
        if let Some(value) = convert(instance_layer.get(spec.name)) {
            return Some((value, FieldSource::Instance));
        }
        if let Some(value) = convert(service_layer.get(spec.service_key)) {
            return Some((value, FieldSource::Service));
        }
        let default = self.default_value(service, spec.default)?;
        convert(Lookup::Present(&default)).map(|value| (value, FieldSource::Default))
    }

    fn default_value(&self, service: &ServiceDescriptor, default: FieldDefault) -> Option<Value> {
        match default {
            FieldDefault::Unset => None,
            FieldDefault::Integer(number) => Some(Value::from(number)),
            FieldDefault::Flag(flag) => Some(Value::Bool(flag)),
            FieldDefault::Text(text) => Some(Value::from(text)),
            FieldDefault::ServiceHost => Some(Value::from(service.service_host(&self.release_name))),
            FieldDefault::ReleaseSecret => {
                Some(Value::from(service.release_secret_name(&self.release_name)))
            }
        }
    }
}

const DEFAULT_PORT: u16 = 6379;

fn non_empty_string(lookup: Lookup<'_>) -> Option<String> {
    lookup
        .as_str()
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn port_number(lookup: Lookup<'_>) -> Option<u16> {
    lookup
        .as_i64()
        .and_then(|port| u16::try_from(port).ok())
        .filter(|port| *port > 0)
}

fn flag_value(lookup: Lookup<'_>) -> Option<bool> {
    match lookup.value()? {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) => text.parse().ok(),
        _ => None,
    }
}

/// Host and optional port of each well-formed endpoint entry.
fn raw_endpoints(lookup: Lookup<'_>) -> Vec<(String, Option<u16>)> {
    lookup
        .as_sequence()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| {
                    let entry = Lookup::Present(entry);
                    let host = non_empty_string(entry.get("host"))?;
                    Some((host, port_number(entry.get("port"))))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn into_endpoints(raw: Vec<(String, Option<u16>)>, default_port: u16) -> Vec<Endpoint> {
    raw.into_iter()
        .map(|(host, port)| Endpoint {
            host,
            port: port.unwrap_or(default_port),
        })
        .collect()
}
