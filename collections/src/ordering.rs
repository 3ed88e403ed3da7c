//! Filtering and sorting shared by the slice selectors and the list helpers

use crate::error::{CollectionError, Result};
use crate::field_path::FieldPath;
use crate::record::{FieldSource, Record};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::cmp::Ordering;

/// Sort direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending
    Asc,
    /// Descending
    Desc,
}

/// Active sort column and direction
///
/// Both halves are set together or cleared together.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    /// Field to sort on
    pub key: Option<FieldPath>,
    /// Direction for `key`
    pub direction: Option<SortDirection>,
}

impl SortState {
    /// Sort ascending on `key`
    #[must_use]
    pub const fn ascending(key: FieldPath) -> Self {
        Self {
            key: Some(key),
            direction: Some(SortDirection::Asc),
        }
    }

    /// Tri-state column toggle
    ///
    /// A new column sorts ascending, a second click on the same column sorts
    /// descending, a third clears the sort.
    #[must_use]
    pub fn toggled(&self, key: FieldPath) -> Self {
        if self.key.as_ref() != Some(&key) {
            return Self::ascending(key);
        }
        match self.direction {
            Some(SortDirection::Asc) => Self {
                key: Some(key),
                direction: Some(SortDirection::Desc),
            },
            Some(SortDirection::Desc) | None => Self::default(),
        }
    }

    /// Key and direction when a sort is active
    #[must_use]
    pub fn active(&self) -> Option<(&FieldPath, SortDirection)> {
        self.key.as_ref().zip(self.direction)
    }
}

/// Lowercased search text for `value` over `fields`, space separated
///
/// Strings are lowercased, numbers and booleans contribute their text
/// (integral floats without a fraction, so `2.0` reads `2`) and a present
/// `null` contributes nothing.
///
/// # Errors
///
/// [`CollectionError::MissingKey`] when a field is absent and
/// [`CollectionError::NotFilterable`] when it holds an array or an object.
pub fn build_filter_string(value: &Value, fields: &[FieldPath]) -> Result<String> {
    let parts = fields
        .iter()
        .map(|path| searchable_text(path, path.resolve(value)?))
        .collect::<Result<Vec<_>>>()?;
    Ok(parts.join(" "))
}

fn searchable_text(path: &FieldPath, value: &Value) -> Result<String> {
    let kind = match value {
        Value::String(text) => return Ok(text.to_lowercase()),
        Value::Number(number) => return Ok(number_text(number)),
        Value::Bool(flag) => return Ok(flag.to_string()),
        Value::Null => return Ok(String::new()),
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    Err(CollectionError::NotFilterable {
        path: path.clone(),
        kind,
    })
}

fn number_text(number: &Number) -> String {
    match number.as_f64() {
        Some(float) if number.is_f64() => float.to_string(),
        _ => number.to_string(),
    }
}

/// Whether cached search text matches a filter value
///
/// An empty filter matches everything; otherwise the lowercased filter must
/// be a substring of the text, and records without text never match.
#[must_use]
pub fn matches_filter(filter_string: Option<&str>, filter_value: &str) -> bool {
    if filter_value.is_empty() {
        return true;
    }
    let needle = filter_value.to_lowercase();
    filter_string.is_some_and(|text| text.contains(&needle))
}

/// Records whose cached search text contains `filter_value`
#[must_use]
pub fn filter_records<'a>(records: &'a [Record], filter_value: &str) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|record| matches_filter(record.filter_string(), filter_value))
        .collect()
}

/// Items whose search text over `fields` contains `filter_value`
///
/// Search text is computed on the fly; an empty filter returns every item
/// without reading any field.
///
/// # Errors
///
/// Propagates [`build_filter_string`] failures.
pub fn filter_by_fields<'a, T: FieldSource>(
    items: &'a [T],
    fields: &[FieldPath],
    filter_value: &str,
) -> Result<Vec<&'a T>> {
    if filter_value.is_empty() {
        return Ok(items.iter().collect());
    }
    let mut kept = Vec::new();
    for item in items {
        let text = build_filter_string(item.fields(), fields)?;
        if matches_filter(Some(&text), filter_value) {
            kept.push(item);
        }
    }
    Ok(kept)
}

/// Compare two field values for sorting
///
/// Numbers compare numerically and strings case-insensitively. A `null`
/// sorts first ascending and last descending. Any other pairing (mixed
/// kinds, booleans, nested values) compares equal.
#[must_use]
pub fn compare_values(a: &Value, b: &Value, direction: SortDirection) -> Ordering {
    let ascending = match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => return null_first(direction),
        (_, Value::Null) => return null_first(direction).reverse(),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or_default(), y.as_f64().unwrap_or_default());
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        },
        (Value::String(x), Value::String(y)) => x.to_uppercase().cmp(&y.to_uppercase()),
        _ => Ordering::Equal,
    };
    match direction {
        SortDirection::Asc => ascending,
        SortDirection::Desc => ascending.reverse(),
    }
}

const fn null_first(direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => Ordering::Less,
        SortDirection::Desc => Ordering::Greater,
    }
}

/// Stable sort of `items` on `key`
///
/// Every item is checked for the key before anything moves, so a failure
/// leaves the input order intact. Fewer than two items are returned as is.
///
/// # Errors
///
/// [`CollectionError::MissingKey`] when an item lacks `key`.
pub fn sort_by_field<'a, T: FieldSource>(
    items: Vec<&'a T>,
    key: &FieldPath,
    direction: SortDirection,
) -> Result<Vec<&'a T>> {
    if items.len() < 2 {
        return Ok(items);
    }
    let mut keyed = items
        .into_iter()
        .map(|item| Ok((key.resolve(item.fields())?, item)))
        .collect::<Result<Vec<_>>>()?;
    merge_sort_by(&mut keyed, &|(a, _): &(&Value, &T), (b, _): &(&Value, &T)| {
        compare_values(a, b, direction)
    });
    Ok(keyed.into_iter().map(|(_, item)| item).collect())
}

/// Apply an optional sort to `items`
///
/// # Errors
///
/// See [`sort_by_field`].
pub fn apply_sort<'a, T: FieldSource>(items: Vec<&'a T>, sort: &SortState) -> Result<Vec<&'a T>> {
    match sort.active() {
        Some((key, direction)) => sort_by_field(items, key, direction),
        None => Ok(items),
    }
}

/// Stable top-down merge sort
///
/// Only `Less` is acted on, so the comparator need not be a total order.
fn merge_sort_by<T: Copy>(items: &mut Vec<T>, compare: &impl Fn(&T, &T) -> Ordering) {
    if items.len() < 2 {
        return;
    }
    let mut right = items.split_off(items.len() / 2);
    let mut left = std::mem::take(items);
    merge_sort_by(&mut left, compare);
    merge_sort_by(&mut right, compare);

    items.reserve(left.len() + right.len());
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        if compare(&right[j], &left[i]) == Ordering::Less {
            items.push(right[j]);
            j += 1;
        } else {
            items.push(left[i]);
            i += 1;
        }
    }
    items.extend_from_slice(&left[i..]);
    items.extend_from_slice(&right[j..]);
}
