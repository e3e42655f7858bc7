//! Renderer override document and its extra secrets.
//!
//! Operators who need a Redis layout the instance model cannot express hand
//! the renderer a complete document under `global.redis.redisYmlOverride`.
//! The document is copied verbatim, including embedded template expressions,
//! and wrapped under the `production` environment key. Any credentials it
//! refers to are declared under `global.redis.redisYmlOverrideSecrets` so the
//! secret projection can mount them.

use serde_json::{json, Value};
use tracing::debug;

use crate::effective_config::SecretReference;
use crate::path_resolver::{Lookup, ValueTree};
use crate::service::ServiceDescriptor;

#[cfg(test)]
#[path = "overrides_tests.rs"]
mod tests;

/// Environment key the renderer expects at the top of the document.
pub const OVERRIDE_ENVIRONMENT: &str = "production";

const DEFAULT_SECRET_KEY: &str = "secret";

/// The override document ready for the renderer, if one is configured.
pub fn override_document(tree: &ValueTree, service: &ServiceDescriptor) -> Option<ValueTree> {
    let key = service.override_key?;
    let document = service.global_layer(tree).get(key);
    if !document.is_set() {
        return None;
    }
    document
        .value()
        .map(|document| json!({ OVERRIDE_ENVIRONMENT: document.clone() }))
}

/// Secret references declared for the override document.
///
/// Each entry's `password` block contributes one reference when enabled
/// (the default) and naming a secret. Entries come back in key order.
pub fn override_secrets(tree: &ValueTree, service: &ServiceDescriptor) -> Vec<SecretReference> {
    let Some(key) = service.override_secrets_key else {
        return Vec::new();
    };
    let Some(entries) = service.global_layer(tree).get(key).as_mapping() else {
        return Vec::new();
    };

    let mut entries: Vec<(&String, &Value)> = entries.iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));

    entries
        .into_iter()
        .filter_map(|(name, entry)| {
            let password = Lookup::Present(entry).get("password");
            let enabled = match password.get("enabled").value() {
                Some(Value::Bool(flag)) => *flag,
                Some(Value::String(flag)) => flag.parse().unwrap_or(true),
                _ => true,
            };
            if !enabled {
                debug!(entry = %name, "Override secret disabled");
                return None;
            }
            let secret = password.get("secret").as_str().filter(|s| !s.is_empty())?;
            let key = password
                .get("key")
                .as_str()
                .filter(|k| !k.is_empty())
                .unwrap_or(DEFAULT_SECRET_KEY);
            Some(SecretReference {
                name: secret.to_string(),
                key: key.to_string(),
                mount_path: service.override_secret_mount_path(name),
            })
        })
        .collect()
}
