//! Read-only lookups into the operator's value tree.
//!
//! The tree is the deserialized chart values (`serde_json::Value`). Lookups
//! never fail: a missing key, an out-of-range index, or a segment that meets
//! the wrong shape (indexing into a string, keying into a list) all yield
//! [`Lookup::Absent`], so callers can fall back to the next layer.
//!
//! An explicit `null` or `false` is *present*. Use [`Lookup::is_truthy`] or
//! [`Lookup::flag_or`] when template-style truthiness is what matters.
//!
//! # Examples
//!
//! ```rust
//! use chart_config::path_resolver::{resolve_keys, Lookup};
//! use serde_json::json;
//!
//! let tree = json!({ "global": { "redis": { "auth": { "enabled": false } } } });
//!
//! let enabled = resolve_keys(&tree, &["global", "redis", "auth", "enabled"]);
//! assert!(enabled.is_present());
//! assert_eq!(enabled.as_bool(), Some(false));
//!
//! let host = resolve_keys(&tree, &["global", "redis", "host"]);
//! assert_eq!(host, Lookup::Absent);
//! ```

use serde_json::{Map, Value};

use crate::value_path::{PathSegment, ValuePath};

#[cfg(test)]
#[path = "path_resolver_tests.rs"]
mod tests;

/// The parsed, merged operator input.
pub type ValueTree = Value;

/// Outcome of a lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Present(&'a ValueTree),
    Absent,
}

/// Resolves a path against a tree.
pub fn resolve<'a>(tree: &'a ValueTree, path: &ValuePath) -> Lookup<'a> {
    let mut current = tree;
    for segment in path.segments() {
        let next = match (segment, current) {
            (PathSegment::Key(key), Value::Object(map)) => map.get(key),
            (PathSegment::Index(index), Value::Array(items)) => items.get(*index),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return Lookup::Absent,
        }
    }
    Lookup::Present(current)
}

/// Resolves a chain of mapping keys without building a [`ValuePath`].
pub fn resolve_keys<'a>(tree: &'a ValueTree, keys: &[&str]) -> Lookup<'a> {
    let mut current = tree;
    for key in keys {
        match current.as_object().and_then(|map| map.get(*key)) {
            Some(value) => current = value,
            None => return Lookup::Absent,
        }
    }
    Lookup::Present(current)
}

/// Template-engine truthiness.
///
/// `null`, `false`, `0`, `""` and empty collections are falsy. Any other value
/// is truthy, including the strings `"true"` and `"false"`.
pub fn is_truthy(value: &ValueTree) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Human-readable name of a value's shape, used in shape-rule messages.
pub fn shape_name(value: &ValueTree) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

impl<'a> Lookup<'a> {
    pub fn value(self) -> Option<&'a ValueTree> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent => None,
        }
    }

    pub fn is_present(self) -> bool {
        matches!(self, Self::Present(_))
    }

    pub fn is_absent(self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Continues the lookup from this point. Absent stays absent.
    pub fn get(self, key: &str) -> Lookup<'a> {
        match self {
            Self::Present(value) => resolve_keys(value, &[key]),
            Self::Absent => Self::Absent,
        }
    }

    pub fn as_str(self) -> Option<&'a str> {
        self.value().and_then(Value::as_str)
    }

    pub fn as_bool(self) -> Option<bool> {
        self.value().and_then(Value::as_bool)
    }

    /// Integer view of the value. Accepts integral numbers and numeric strings
    /// such as `"6379"`.
    pub fn as_i64(self) -> Option<i64> {
        match self.value()? {
            Value::Number(number) => number.as_i64().or_else(|| {
                number
                    .as_f64()
                    .filter(|n| n.fract() == 0.0 && *n >= i64::MIN as f64 && *n < i64::MAX as f64)
                    .map(|n| n as i64)
            }),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// Floating-point view of the value. Accepts any JSON number and numeric
    /// strings such as `"60.5"`; non-finite values are rejected.
    pub fn as_f64(self) -> Option<f64> {
        match self.value()? {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|n| n.is_finite())
    }

    pub fn as_mapping(self) -> Option<&'a Map<String, Value>> {
        self.value().and_then(Value::as_object)
    }

    pub fn as_sequence(self) -> Option<&'a Vec<Value>> {
        self.value().and_then(Value::as_array)
    }

    /// Truthiness of the value; absent is falsy.
    pub fn is_truthy(self) -> bool {
        self.value().is_some_and(is_truthy)
    }

    /// Truthiness of the value, or `default` when nothing is set.
    ///
    /// Used for chart flags whose default is on, e.g. `redis.install`.
    pub fn flag_or(self, default: bool) -> bool {
        match self {
            Self::Present(Value::Null) | Self::Absent => default,
            Self::Present(value) => is_truthy(value),
        }
    }

    /// Present and carrying something: not null, not an empty string and not
    /// an empty collection. `false` and `0` count as set.
    pub fn is_set(self) -> bool {
        match self.value() {
            None | Some(Value::Null) => false,
            Some(Value::String(text)) => !text.is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(Value::Object(map)) => !map.is_empty(),
            Some(_) => true,
        }
    }
}
