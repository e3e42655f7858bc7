//! Validation rule model.
//!
//! A [`ValidationRule`] pairs a stable identifier with a pure check over the
//! whole value tree and a message template. Checks never build user-facing
//! text themselves: they return the parameters the template needs, and the
//! rule renders the message. That keeps every operator-visible message in the
//! catalogue tables where it can be reviewed.
//!
//! # Examples
//!
//! ```rust
//! use chart_config::path_resolver::{resolve_keys, ValueTree};
//! use chart_config::rule::{MessageParams, MessageTemplate, RuleOutcome, ValidationRule};
//! use serde_json::json;
//!
//! fn email_required(tree: &ValueTree) -> RuleOutcome {
//!     if resolve_keys(tree, &["certmanager-issuer", "email"]).is_set() {
//!         RuleOutcome::Pass
//!     } else {
//!         RuleOutcome::fail()
//!     }
//! }
//!
//! let rule = ValidationRule::new(
//!     "certmanager-issuer.email",
//!     MessageTemplate::new("Please set certmanager-issuer.email"),
//!     email_required,
//! );
//!
//! let failure = rule.evaluate(&json!({})).unwrap();
//! assert_eq!(failure.message(), "Please set certmanager-issuer.email");
//! ```

use std::fmt;

use crate::path_resolver::ValueTree;
use crate::validator::ValidationFailure;

#[cfg(test)]
#[path = "rule_tests.rs"]
mod tests;

/// A pure predicate over the merged tree.
pub type RuleCheck = fn(&ValueTree) -> RuleOutcome;

/// Result of running one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    Pass,
    /// The check failed; the parameters fill the rule's message template.
    Fail(MessageParams),
}

impl RuleOutcome {
    /// Failure without template parameters.
    pub fn fail() -> Self {
        Self::Fail(MessageParams::new())
    }

    /// `Pass` when the condition holds, a parameterless failure otherwise.
    pub fn pass_if(condition: bool) -> Self {
        if condition {
            Self::Pass
        } else {
            Self::fail()
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// Named values substituted into a [`MessageTemplate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageParams {
    values: Vec<(&'static str, String)>,
}

impl MessageParams {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Adds a parameter. A later value for the same name replaces the earlier.
    pub fn with(mut self, name: &'static str, value: impl fmt::Display) -> Self {
        let value = value.to_string();
        match self.values.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(existing, _)| *existing == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Message text with `{name}` placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageTemplate(&'static str);

impl MessageTemplate {
    pub const fn new(template: &'static str) -> Self {
        Self(template)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Substitutes every `{name}` that has a parameter. Placeholders without a
    /// parameter are left as written.
    pub fn render(&self, params: &MessageParams) -> String {
        let mut out = String::with_capacity(self.0.len());
        let mut rest = self.0;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    let name = &after[..close];
                    match params.get(name) {
                        Some(value) => out.push_str(value),
                        None => {
                            out.push('{');
                            out.push_str(name);
                            out.push('}');
                        }
                    }
                    rest = &after[close + 1..];
                }
                None => {
                    out.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// Names of the placeholders in order of appearance.
    pub fn placeholders(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let mut rest = self.0;
        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                break;
            };
            names.push(&after[..close]);
            rest = &after[close + 1..];
        }
        names
    }
}

/// One entry of the rule catalogue.
#[derive(Clone, Copy)]
pub struct ValidationRule {
    id: &'static str,
    template: MessageTemplate,
    check: RuleCheck,
}

impl fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRule")
            .field("id", &self.id)
            .field("template", &self.template)
            .finish()
    }
}

impl ValidationRule {
    pub const fn new(id: &'static str, template: MessageTemplate, check: RuleCheck) -> Self {
        Self {
            id,
            template,
            check,
        }
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn template(&self) -> MessageTemplate {
        self.template
    }

    /// Runs the check and renders the failure message, if any.
    pub fn evaluate(&self, tree: &ValueTree) -> Option<ValidationFailure> {
        match (self.check)(tree) {
            RuleOutcome::Pass => None,
            RuleOutcome::Fail(params) => Some(ValidationFailure::new(
                self.id,
                self.template.render(&params),
            )),
        }
    }
}
