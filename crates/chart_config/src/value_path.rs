//! Segmented paths into a value tree.
//!
//! A [`ValuePath`] is the address every other component uses to reach into the
//! operator's values: `global.praefect.virtualStorages[1].tlsSecretName` is
//! the key `global`, the key `praefect`, the key `virtualStorages`, the list
//! index `1` and finally the key `tlsSecretName`.
//!
//! # Examples
//!
//! ```rust
//! use chart_config::ValuePath;
//!
//! let path = ValuePath::parse("global.praefect.virtualStorages[1].tlsSecretName")?;
//! assert_eq!(path.len(), 5);
//! assert_eq!(path.to_string(), "global.praefect.virtualStorages[1].tlsSecretName");
//!
//! let built = ValuePath::from_keys(&["global", "redis"]).child("cache");
//! assert_eq!(built.to_string(), "global.redis.cache");
//! # Ok::<(), chart_config::ConfigurationError>(())
//! ```

use std::fmt;
use std::str::FromStr;

use crate::errors::{ConfigurationError, ConfigurationResult};

#[cfg(test)]
#[path = "value_path_tests.rs"]
mod tests;

/// One step of a [`ValuePath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Look up a key in a mapping.
    Key(String),
    /// Look up a position in a sequence.
    Index(usize),
}

/// An ordered sequence of keys and indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ValuePath {
    segments: Vec<PathSegment>,
}

impl ValuePath {
    /// The empty path, which addresses the whole tree.
    pub fn root() -> Self {
        Self::default()
    }

    /// Builds a path made only of mapping keys.
    pub fn from_keys(keys: &[&str]) -> Self {
        Self {
            segments: keys
                .iter()
                .map(|key| PathSegment::Key((*key).to_string()))
                .collect(),
        }
    }

    /// Parses the dotted textual form, e.g. `gitlab.sidekiq.pods[0].queues`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidPath` for empty input, empty key
    /// segments, or malformed `[index]` suffixes.
    pub fn parse(text: &str) -> ConfigurationResult<Self> {
        let invalid = |reason: String| ConfigurationError::InvalidPath {
            path: text.to_string(),
            reason,
        };

        if text.is_empty() {
            return Err(invalid("path is empty".to_string()));
        }

        let mut segments = Vec::new();
        for part in text.split('.') {
            let (key, mut rest) = match part.find('[') {
                Some(open) => (&part[..open], &part[open..]),
                None => (part, ""),
            };

            if key.is_empty() {
                return Err(invalid("empty key segment".to_string()));
            }
            if key.contains(']') {
                return Err(invalid(format!("unexpected ']' in key '{}'", key)));
            }
            segments.push(PathSegment::Key(key.to_string()));

            while !rest.is_empty() {
                if !rest.starts_with('[') {
                    return Err(invalid(format!("unexpected '{}' after index", rest)));
                }
                let close = rest
                    .find(']')
                    .ok_or_else(|| invalid("unterminated index".to_string()))?;
                let digits = &rest[1..close];
                let index = digits
                    .parse::<usize>()
                    .map_err(|_| invalid(format!("'{}' is not a list index", digits)))?;
                segments.push(PathSegment::Index(index));
                rest = &rest[close + 1..];
            }
        }

        Ok(Self { segments })
    }

    /// Returns a new path extended by a mapping key.
    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Key(key.to_string()));
        Self { segments }
    }

    /// Returns a new path extended by a sequence index.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if position == 0 => write!(f, "{}", key)?,
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

impl FromStr for ValuePath {
    type Err = ConfigurationError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}
