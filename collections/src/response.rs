//! Classification of fetch response bodies

use crate::pagination::PaginationInfo;
use serde_json::{Map, Value};

/// Shape of a fetch response body
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseShape {
    /// An object whose configured key holds the records; every other key is
    /// extra metadata
    Envelope {
        /// The records array
        records: Vec<Value>,
        /// All remaining top-level fields
        extra_info: Map<String, Value>,
        /// Present when the envelope carries `count`, `next` and `previous`
        pagination: Option<PaginationInfo>,
    },
    /// A plain array of records
    BareArray(Vec<Value>),
    /// A single record
    SingleObject(Value),
}

impl ResponseShape {
    /// Classify `body`
    ///
    /// The envelope form requires `elems_key` to name an array inside an
    /// object. Anything that is neither an envelope nor an array is treated
    /// as one record.
    #[must_use]
    pub fn classify(body: Value, elems_key: Option<&str>) -> Self {
        match (body, elems_key) {
            (Value::Object(mut object), Some(key))
                if object.get(key).is_some_and(Value::is_array) =>
            {
                let records = match object.remove(key) {
                    Some(Value::Array(records)) => records,
                    _ => Vec::new(),
                };
                let pagination = match (object.get("count"), object.get("next"), object.get("previous")) {
                    (Some(count), Some(next), Some(previous)) => {
                        Some(PaginationInfo::from_envelope(count, next, previous))
                    },
                    _ => None,
                };
                Self::Envelope {
                    records,
                    extra_info: object,
                    pagination,
                }
            },
            (Value::Array(records), _) => Self::BareArray(records),
            (other, _) => Self::SingleObject(other),
        }
    }

    /// Records carried by the body, in server order
    #[must_use]
    pub fn into_records(self) -> Vec<Value> {
        match self {
            Self::Envelope { records, .. } | Self::BareArray(records) => records,
            Self::SingleObject(record) => vec![record],
        }
    }
}
