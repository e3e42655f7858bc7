//! Chart values validation and multi-instance inheritance.
//!
//! The crate takes the merged values tree of a chart release, checks it against
//! the rule catalogue, and resolves the effective settings of every instance of
//! a multi-instance service (Redis): host, port, credentials and topology, each
//! inherited from the instance block, the service-wide block or a default.
//!
//! The core is pure: it accepts and returns in-memory values and performs no
//! I/O. The `chart_config_cli` crate wraps it for the command line.

pub mod effective_config;
pub mod errors;
pub mod field_spec;
pub mod inheritance;
pub mod overrides;
pub mod path_resolver;
pub mod pipeline;
pub mod rule;
pub mod rules;
pub mod service;
pub mod settings;
pub mod validator;
pub mod value_path;

// Re-export for convenient access
pub use effective_config::{
    AuthDecision, EffectiveConfig, Endpoint, FieldSource, FieldSourceTrace, SecretReference,
    Topology,
};
pub use errors::{ConfigurationError, ConfigurationResult};
pub use field_spec::{FieldDefault, FieldSpec, InheritanceMode};
pub use inheritance::InheritanceResolver;
pub use path_resolver::{Lookup, ValueTree};
pub use pipeline::{ResolutionPipeline, ResolvedConfiguration, ResolvedService};
pub use rule::{MessageParams, MessageTemplate, RuleOutcome, ValidationRule};
pub use rules::RuleCatalogue;
pub use service::{InstanceDeclaration, InstanceKind, ServiceDescriptor};
pub use settings::{EvaluationStrategy, ResolverSettings};
pub use validator::{EvaluationMode, ValidationEngine, ValidationFailure, ValidationReport};
pub use value_path::{PathSegment, ValuePath};
