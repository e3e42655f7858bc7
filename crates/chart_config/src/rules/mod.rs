//! The standard rule catalogue.
//!
//! Rules are grouped by the chart component they guard. Each submodule
//! exposes a `RULES` table; [`RuleCatalogue::standard`] concatenates the tables
//! in a fixed order, and that order is the evaluation order the engine uses
//! for fail-fast reporting.
//!
//! | group         | rules |
//! |---------------|-------|
//! | `certmanager` | issuer email |
//! | `gitaly`      | TLS secrets, Praefect virtual storages, external repos |
//! | `sidekiq`     | per-pod queue selection |
//! | `database`    | external load balancing |
//! | `geo`         | primary and secondary databases |
//! | `webservice`  | request duration, web server, dependency proxy, shutdown |
//! | `task_runner` | replicas with persistence |
//! | `registry`    | sentry, metadata database, migration |
//! | `redis`       | multi-instance install, override document, topology, port, auth |

use crate::rule::ValidationRule;

pub mod certmanager;
pub mod database;
pub mod geo;
pub mod gitaly;
pub mod redis;
pub mod registry;
pub mod sidekiq;
pub mod task_runner;
pub mod webservice;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

/// An ordered collection of validation rules.
#[derive(Debug, Clone)]
pub struct RuleCatalogue {
    rules: Vec<ValidationRule>,
}

impl RuleCatalogue {
    /// The full chart catalogue in evaluation order.
    pub fn standard() -> Self {
        let groups: [&[ValidationRule]; 9] = [
            certmanager::RULES,
            gitaly::RULES,
            sidekiq::RULES,
            database::RULES,
            geo::RULES,
            webservice::RULES,
            task_runner::RULES,
            registry::RULES,
            redis::RULES,
        ];
        Self::from_rules(groups.concat())
    }

    pub fn from_rules(rules: Vec<ValidationRule>) -> Self {
        Self { rules }
    }

    /// Appends a rule after the existing ones.
    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[ValidationRule] {
        &self.rules
    }

    /// Rule identifiers in evaluation order.
    pub fn ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(ValidationRule::id).collect()
    }

    pub fn get(&self, id: &str) -> Option<&ValidationRule> {
        self.rules.iter().find(|rule| rule.id() == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleCatalogue {
    fn default() -> Self {
        Self::standard()
    }
}
