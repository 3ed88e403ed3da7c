//! Error types for collection transitions and derived views

use crate::field_path::FieldPath;
use thiserror::Error;

/// Errors raised while reading fields out of collection records
///
/// A transition that fails with one of these is not applied: the slice is
/// left exactly as it was before the action.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    /// A configured filter or sort field is absent from a record
    #[error("Object has no key '{path}'")]
    MissingKey {
        /// The path that could not be resolved
        path: FieldPath,
    },

    /// A filter field resolved to a value that has no text form
    #[error("Field '{path}' holds {kind}, which cannot be used for filtering")]
    NotFilterable {
        /// The offending path
        path: FieldPath,
        /// JSON kind found at the path (`array` or `object`)
        kind: &'static str,
    },
}

/// Result alias for collection operations
pub type Result<T> = std::result::Result<T, CollectionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_path() {
        let missing = CollectionError::MissingKey {
            path: FieldPath::parse("author__first_name"),
        };
        assert_eq!(missing.to_string(), "Object has no key 'author.first_name'");

        let not_filterable = CollectionError::NotFilterable {
            path: FieldPath::parse("tags"),
            kind: "array",
        };
        assert!(not_filterable.to_string().contains("holds array"));
    }
}
