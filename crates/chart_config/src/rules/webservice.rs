//! Webservice rules.
//!
//! Covers request timeouts, the web server choice, features that need Puma
//! and the shutdown sequence.

use serde_json::Value;

use crate::path_resolver::{resolve_keys, shape_name, Lookup, ValueTree};
use crate::rule::{MessageParams, MessageTemplate, RuleOutcome, ValidationRule};

#[cfg(test)]
#[path = "webservice_tests.rs"]
mod tests;

pub const RULES: &[ValidationRule] = &[
    ValidationRule::new(
        "webservice.numbers",
        MessageTemplate::new("{path} must be a number, got {shape}"),
        numeric_settings,
    ),
    ValidationRule::new(
        "appConfig.maxRequestDurationSeconds",
        MessageTemplate::new(
            "global.appConfig.maxRequestDurationSeconds ({duration}) is greater than or equal to global.webservice.workerTimeout ({timeout})",
        ),
        request_duration_below_timeout,
    ),
    ValidationRule::new(
        "webservice.webServer",
        MessageTemplate::new(
            "`{value}` is not a valid gitlab.webservice.webServer, must be one of: puma, unicorn",
        ),
        known_web_server,
    ),
    ValidationRule::new(
        "dependencyProxy.puma",
        MessageTemplate::new(
            "You must be using the Puma webservice in order to use Dependency Proxy.",
        ),
        dependency_proxy_needs_puma,
    ),
    ValidationRule::new(
        "webservice.terminationGracePeriodSeconds",
        MessageTemplate::new(
            "gitlab.webservice.deployment.terminationGracePeriodSeconds ({grace}) is less than gitlab.webservice.shutdown.blackoutSeconds ({blackout}), requests would fail during shutdown",
        ),
        grace_period_covers_blackout,
    ),
];

const DEFAULT_WORKER_TIMEOUT: i64 = 60;
const DEFAULT_WEB_SERVER: &str = "puma";
const WEB_SERVERS: [&str; 2] = ["puma", "unicorn"];
const DEFAULT_GRACE_PERIOD: i64 = 30;
const DEFAULT_BLACKOUT: i64 = 10;

const REQUEST_DURATION: &[&str] = &["global", "appConfig", "maxRequestDurationSeconds"];
const WORKER_TIMEOUT: &[&str] = &["global", "webservice", "workerTimeout"];
const GRACE_PERIOD: &[&str] = &[
    "gitlab",
    "webservice",
    "deployment",
    "terminationGracePeriodSeconds",
];
const BLACKOUT: &[&str] = &["gitlab", "webservice", "shutdown", "blackoutSeconds"];

/// Settings compared numerically by the rules below.
const NUMERIC_SETTINGS: [&[&str]; 4] = [REQUEST_DURATION, WORKER_TIMEOUT, GRACE_PERIOD, BLACKOUT];

/// A numeric setting and the literal the operator wrote for it.
struct Setting {
    value: f64,
    literal: String,
}

impl Setting {
    fn builtin(value: i64) -> Self {
        Self {
            value: value as f64,
            literal: value.to_string(),
        }
    }
}

/// Reads a numeric setting. Unset yields `None`; a non-numeric value also
/// yields `None` and is reported by `webservice.numbers`.
fn setting(lookup: Lookup<'_>) -> Option<Setting> {
    let value = lookup.as_f64()?;
    let literal = match lookup.value()? {
        Value::String(text) => text.trim().to_string(),
        other => other.to_string(),
    };
    Some(Setting { value, literal })
}

fn is_unset(lookup: Lookup<'_>) -> bool {
    matches!(lookup, Lookup::Absent | Lookup::Present(Value::Null))
}

/// Setting value, or the built-in default when unset. `None` when the value
/// is present but not a number.
fn setting_or(lookup: Lookup<'_>, default: i64) -> Option<Setting> {
    if is_unset(lookup) {
        Some(Setting::builtin(default))
    } else {
        setting(lookup)
    }
}

fn web_server(tree: &ValueTree) -> &str {
    resolve_keys(tree, &["gitlab", "webservice", "webServer"])
        .as_str()
        .unwrap_or(DEFAULT_WEB_SERVER)
}

fn numeric_settings(tree: &ValueTree) -> RuleOutcome {
    for keys in NUMERIC_SETTINGS {
        let lookup = resolve_keys(tree, keys);
        if is_unset(lookup) || lookup.as_f64().is_some() {
            continue;
        }
        let shape = lookup.value().map(shape_name).unwrap_or("null");
        return RuleOutcome::Fail(
            MessageParams::new()
                .with("path", keys.join("."))
                .with("shape", shape),
        );
    }
    RuleOutcome::Pass
}

fn request_duration_below_timeout(tree: &ValueTree) -> RuleOutcome {
    let duration = resolve_keys(tree, REQUEST_DURATION);
    if is_unset(duration) {
        return RuleOutcome::Pass;
    }
    let (Some(duration), Some(timeout)) = (
        setting(duration),
        setting_or(resolve_keys(tree, WORKER_TIMEOUT), DEFAULT_WORKER_TIMEOUT),
    ) else {
        return RuleOutcome::Pass;
    };

    if duration.value < timeout.value {
        RuleOutcome::Pass
    } else {
        RuleOutcome::Fail(
            MessageParams::new()
                .with("duration", duration.literal)
                .with("timeout", timeout.literal),
        )
    }
}

fn known_web_server(tree: &ValueTree) -> RuleOutcome {
    let server = web_server(tree);
    if WEB_SERVERS.contains(&server) {
        RuleOutcome::Pass
    } else {
        RuleOutcome::Fail(MessageParams::new().with("value", server))
    }
}

fn dependency_proxy_needs_puma(tree: &ValueTree) -> RuleOutcome {
    let proxy_enabled =
        resolve_keys(tree, &["global", "appConfig", "dependencyProxy", "enabled"]).is_truthy();
    RuleOutcome::pass_if(!proxy_enabled || web_server(tree) == "puma")
}

/// Pods must outlive the blackout window or in-flight requests are cut.
fn grace_period_covers_blackout(tree: &ValueTree) -> RuleOutcome {
    let (Some(grace), Some(blackout)) = (
        setting_or(resolve_keys(tree, GRACE_PERIOD), DEFAULT_GRACE_PERIOD),
        setting_or(resolve_keys(tree, BLACKOUT), DEFAULT_BLACKOUT),
    ) else {
        return RuleOutcome::Pass;
    };

    if grace.value >= blackout.value {
        RuleOutcome::Pass
    } else {
        RuleOutcome::Fail(
            MessageParams::new()
                .with("grace", grace.literal)
                .with("blackout", blackout.literal),
        )
    }
}
