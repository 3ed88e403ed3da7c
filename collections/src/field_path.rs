//! Field paths into nested JSON records
//!
//! A path is written either with dots (`author.first_name`) or with double
//! underscores (`author__first_name`); both spellings resolve the same way.

use crate::error::{CollectionError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Ordered list of keys addressing a (possibly nested) record field
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Parse a dotted or double-underscore path
    #[must_use]
    pub fn parse(source: &str) -> Self {
        Self(
            source
                .split("__")
                .flat_map(|part| part.split('.'))
                .map(str::to_string)
                .collect(),
        )
    }

    /// Keys in lookup order
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Walk `value` along this path
    ///
    /// A key that is present resolves even when it holds `null`, `0` or
    /// an empty string.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::MissingKey`] when any segment is absent or
    /// the value at that depth is not an object.
    pub fn resolve<'a>(&self, value: &'a Value) -> Result<&'a Value> {
        self.0.iter().try_fold(value, |current, key| {
            current
                .as_object()
                .and_then(|object| object.get(key))
                .ok_or_else(|| CollectionError::MissingKey { path: self.clone() })
        })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl From<&str> for FieldPath {
    fn from(source: &str) -> Self {
        Self::parse(source)
    }
}

impl From<String> for FieldPath {
    fn from(source: String) -> Self {
        Self::parse(&source)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.to_string()
    }
}
