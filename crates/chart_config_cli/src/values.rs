//! Loading and merging of values files.
//!
//! Files ending in `.json` are parsed as JSON, everything else as YAML. Files
//! are merged left to right: mappings merge recursively, while scalars and
//! sequences from a later file replace the earlier value.

use std::{fs, path::Path};

use chart_config::ValueTree;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::errors::Error;

#[cfg(test)]
#[path = "values_tests.rs"]
mod tests;

/// Reads and merges the given values files into one tree.
///
/// # Errors
///
/// Fails when no file is given, a file cannot be read or parsed, or the
/// merged document is not a mapping.
#[instrument]
pub fn load_values<P: AsRef<Path> + std::fmt::Debug>(paths: &[P]) -> Result<ValueTree, Error> {
    if paths.is_empty() {
        return Err(Error::InvalidArguments(
            "at least one values file is required".to_string(),
        ));
    }

    let mut merged = Value::Object(Map::new());
    for path in paths {
        let document = load_file(path.as_ref())?;
        deep_merge(&mut merged, document);
    }

    if !merged.is_object() {
        return Err(Error::InvalidValues(
            "the merged values must be a mapping at the top level".to_string(),
        ));
    }
    Ok(merged)
}

/// Parses one values file. An empty document is an empty mapping.
pub fn load_file(path: &Path) -> Result<ValueTree, Error> {
    let content = fs::read_to_string(path).map_err(|source| Error::LoadFile {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = ?path, bytes = content.len(), "Read values file");
    parse_values(path, &content)
}

pub fn parse_values(path: &Path, content: &str) -> Result<ValueTree, Error> {
    let is_json = path
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));

    let document: Value = if is_json {
        serde_json::from_str(content).map_err(|source| Error::ParseJsonFile {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        serde_yaml::from_str(content).map_err(|source| Error::ParseYamlFile {
            path: path.to_path_buf(),
            source,
        })?
    };

    Ok(match document {
        Value::Null => Value::Object(Map::new()),
        other => other,
    })
}

/// Merges `overlay` into `base`.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
