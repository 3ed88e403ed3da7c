//! Records held by a collection slice

use crate::error::Result;
use crate::field_path::FieldPath;
use crate::ordering::build_filter_string;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier of a remote record (`id` field)
///
/// REST backends hand out either integer or string keys; both are kept
/// verbatim and compared against the record's own `id` value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Integer primary key
    Int(i64),
    /// String key (slug, UUID, ...)
    Text(String),
}

impl RecordId {
    /// Read an id out of a JSON value
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => number.as_i64().map(Self::Int),
            Value::String(text) => Some(Self::Text(text.clone())),
            _ => None,
        }
    }

    /// Whether `value` is this id
    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Int(id), Value::Number(number)) => number.as_i64() == Some(*id),
            (Self::Text(id), Value::String(text)) => id == text,
            _ => false,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

/// Anything list helpers can read fields from
pub trait FieldSource {
    /// The JSON object holding the fields
    fn fields(&self) -> &Value;
}

impl FieldSource for Value {
    fn fields(&self) -> &Value {
        self
    }
}

impl<T: FieldSource + ?Sized> FieldSource for &T {
    fn fields(&self) -> &Value {
        (**self).fields()
    }
}

/// One element of a collection
///
/// `data` is the record as the server sent it. `filter_string` is the
/// lowercased search text cached when the record entered the slice; it is
/// `None` when the slice has no filter fields configured.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Server representation
    pub data: Value,
    /// Cached search text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_string: Option<String>,
}

impl Record {
    /// Wrap a server record without search text
    #[must_use]
    pub const fn new(data: Value) -> Self {
        Self {
            data,
            filter_string: None,
        }
    }

    /// Wrap a server record, caching search text for `filter_on_fields`
    ///
    /// # Errors
    ///
    /// Fails when a filter field is missing from `data` or holds a value
    /// with no text form.
    pub fn indexed(data: Value, filter_on_fields: &[FieldPath]) -> Result<Self> {
        let filter_string = if filter_on_fields.is_empty() {
            None
        } else {
            Some(build_filter_string(&data, filter_on_fields)?)
        };
        Ok(Self { data, filter_string })
    }

    /// The record's `id`, when it has a usable one
    #[must_use]
    pub fn id(&self) -> Option<RecordId> {
        self.data.get("id").and_then(RecordId::from_value)
    }

    /// Whether this record carries `id`
    #[must_use]
    pub fn has_id(&self, id: &RecordId) -> bool {
        self.data.get("id").is_some_and(|value| id.matches(value))
    }

    /// Cached search text
    #[must_use]
    pub fn filter_string(&self) -> Option<&str> {
        self.filter_string.as_deref()
    }
}

impl FieldSource for Record {
    fn fields(&self) -> &Value {
        &self.data
    }
}
