//! Validation-then-resolution pipeline.
//!
//! The [`ResolutionPipeline`] is the entry point the renderer and the CLI use:
//!
//! 1. the [`ValidationEngine`] gates the tree; the first failing rule aborts
//!    the run with `ConfigurationError::ConfigurationInvalid`;
//! 2. every registered service has its instances discovered and resolved by
//!    the [`InheritanceResolver`];
//! 3. the per-instance results, plus any override document and its secrets,
//!    are returned as a [`ResolvedConfiguration`].
//!
//! Success is all-or-nothing: no partial output is returned on failure.
//!
//! # Examples
//!
//! ```rust
//! use chart_config::{ResolutionPipeline, ResolverSettings};
//! use serde_json::json;
//!
//! let tree = json!({
//!     "certmanager-issuer": { "email": "ops@example.com" },
//!     "redis": { "install": false },
//!     "global": { "redis": { "host": "resque.redis", "cache": { "port": 9999 } } }
//! });
//!
//! let resolved = ResolutionPipeline::new(ResolverSettings::default()).run(&tree)?;
//! let cache = resolved.instance("redis", "cache").unwrap();
//! assert_eq!(cache.address(), "resque.redis:9999");
//! # Ok::<(), chart_config::ConfigurationError>(())
//! ```

use std::collections::BTreeMap;
use std::thread;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{
    effective_config::{EffectiveConfig, SecretReference},
    errors::{ConfigurationError, ConfigurationResult},
    inheritance::InheritanceResolver,
    overrides::{override_document, override_secrets},
    path_resolver::ValueTree,
    rules::RuleCatalogue,
    service::{InstanceDeclaration, ServiceDescriptor},
    settings::{EvaluationStrategy, ResolverSettings},
    validator::ValidationEngine,
};

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;

/// Resolved instances of one service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedService {
    /// Effective configuration per instance name.
    pub instances: BTreeMap<String, EffectiveConfig>,

    /// Renderer override document, wrapped under its environment key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_document: Option<ValueTree>,

    /// Secrets referenced only by the override document.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub override_secrets: Vec<SecretReference>,
}

impl ResolvedService {
    /// Every secret the projection must mount: enabled instance secrets by
    /// instance name, then override secrets.
    pub fn secret_references(&self) -> Vec<&SecretReference> {
        self.instances
            .values()
            .filter_map(EffectiveConfig::secret)
            .chain(self.override_secrets.iter())
            .collect()
    }
}

/// Output of a successful pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedConfiguration {
    pub services: BTreeMap<String, ResolvedService>,
}

impl ResolvedConfiguration {
    pub fn service(&self, name: &str) -> Option<&ResolvedService> {
        self.services.get(name)
    }

    pub fn instances(&self, service: &str) -> Option<&BTreeMap<String, EffectiveConfig>> {
        self.service(service).map(|service| &service.instances)
    }

    pub fn instance(&self, service: &str, instance: &str) -> Option<&EffectiveConfig> {
        self.instances(service)
            .and_then(|instances| instances.get(instance))
    }
}

/// Orchestrates validation and per-instance resolution.
#[derive(Debug, Clone)]
pub struct ResolutionPipeline {
    engine: ValidationEngine,
    resolver: InheritanceResolver,
    services: Vec<ServiceDescriptor>,
    settings: ResolverSettings,
}

impl ResolutionPipeline {
    /// Pipeline with the standard rule catalogue and the Redis service.
    pub fn new(settings: ResolverSettings) -> Self {
        Self {
            engine: ValidationEngine::new(RuleCatalogue::standard())
                .with_mode(settings.evaluation_mode()),
            resolver: InheritanceResolver::from_settings(&settings),
            services: vec![ServiceDescriptor::redis()],
            settings,
        }
    }

    pub fn with_catalogue(mut self, catalogue: RuleCatalogue) -> Self {
        self.engine = ValidationEngine::new(catalogue).with_mode(self.settings.evaluation_mode());
        self
    }

    /// Registers a service, replacing any registered service of the same name.
    pub fn with_service(mut self, service: ServiceDescriptor) -> Self {
        match self.services.iter_mut().find(|existing| existing.name == service.name) {
            Some(existing) => *existing = service,
            None => self.services.push(service),
        }
        self
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    pub fn engine(&self) -> &ValidationEngine {
        &self.engine
    }

    /// Validates the tree, then resolves every registered service.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::ConfigurationInvalid` with the first
    /// failing rule when validation fails; nothing is resolved in that case.
    #[instrument(skip(self, tree), fields(release = %self.settings.release_name))]
    pub fn run(&self, tree: &ValueTree) -> ConfigurationResult<ResolvedConfiguration> {
        self.validate(tree)?;

        let mut services = BTreeMap::new();
        for service in &self.services {
            let resolved = self.resolve_validated(tree, service)?;
            services.insert(service.name.to_string(), resolved);
        }

        info!(
            services = services.len(),
            "Resolved configuration for all services"
        );
        Ok(ResolvedConfiguration { services })
    }

    /// Validates the tree, then resolves a single service by name.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::UnknownService` when no descriptor with
    /// that name is registered, or `ConfigurationInvalid` as for [`Self::run`].
    #[instrument(skip(self, tree))]
    pub fn resolve_service(
        &self,
        tree: &ValueTree,
        name: &str,
    ) -> ConfigurationResult<ResolvedService> {
        let service = self
            .services
            .iter()
            .find(|service| service.name == name)
            .ok_or_else(|| ConfigurationError::UnknownService {
                service: name.to_string(),
            })?;

        self.validate(tree)?;
        self.resolve_validated(tree, service)
    }

    fn validate(&self, tree: &ValueTree) -> ConfigurationResult<()> {
        if !self.settings.report_all_failures {
            return self.engine.validate(tree);
        }

        let report = self.engine.validate_all(tree);
        for failure in report.failures.iter().skip(1) {
            warn!(
                rule = failure.rule_id(),
                message = failure.message(),
                "Additional validation failure"
            );
        }
        report.into_result()
    }

    fn resolve_validated(
        &self,
        tree: &ValueTree,
        service: &ServiceDescriptor,
    ) -> ConfigurationResult<ResolvedService> {
        let declarations = service.discover_instances(tree);
        debug!(
            service = service.name,
            instances = declarations.len(),
            "Discovered instances"
        );

        let resolved = match self.settings.evaluation {
            EvaluationStrategy::Sequential => declarations
                .iter()
                .map(|instance| self.resolver.resolve_declared(tree, service, instance))
                .collect::<ConfigurationResult<Vec<_>>>()?,
            EvaluationStrategy::Parallel => self.resolve_parallel(tree, service, &declarations)?,
        };

        let instances = resolved
            .into_iter()
            .map(|config| (config.instance.clone(), config))
            .collect();

        Ok(ResolvedService {
            instances,
            override_document: override_document(tree, service),
            override_secrets: override_secrets(tree, service),
        })
    }

    /// One scoped thread per instance; results keep declaration order.
    fn resolve_parallel(
        &self,
        tree: &ValueTree,
        service: &ServiceDescriptor,
        declarations: &[InstanceDeclaration],
    ) -> ConfigurationResult<Vec<EffectiveConfig>> {
        thread::scope(|scope| {
            let handles: Vec<_> = declarations
                .iter()
                .map(|instance| {
                    scope.spawn(move || self.resolver.resolve_declared(tree, service, instance))
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(result) => result,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        })
    }
}

impl Default for ResolutionPipeline {
    fn default() -> Self {
        Self::new(ResolverSettings::default())
    }
}
