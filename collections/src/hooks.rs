//! List helpers for UI components that hold their own records
//!
//! These work on any list of JSON objects, independent of a collection
//! slice, with the same filter and sort rules as the slice selectors.

use crate::error::Result;
use crate::field_path::FieldPath;
use crate::ordering::{SortDirection, SortState, apply_sort, filter_by_fields};
use crate::record::FieldSource;

/// Items whose search text over `fields` contains `filter_value`
///
/// An empty filter value returns every item untouched.
///
/// # Errors
///
/// Fails when a non-empty filter meets an item missing one of `fields`, or
/// a field holding an array or object.
pub fn use_filter<'a, T: FieldSource>(items: &'a [T], fields: &[FieldPath], filter_value: &str) -> Result<Vec<&'a T>> {
    filter_by_fields(items, fields, filter_value)
}

/// Locally sorted list with a tri-state column toggle
///
/// The sort survives replacing the items, so a list refreshed from the
/// server keeps its column ordering.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SortedList<T> {
    items: Vec<T>,
    sort: SortState,
}

impl<T: FieldSource> SortedList<T> {
    /// Unsorted list of `items`
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            sort: SortState::default(),
        }
    }

    /// Replace the items, keeping the current sort
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
    }

    /// Column header click
    pub fn handle_sort(&mut self, key: impl Into<FieldPath>) {
        self.sort = self.sort.toggled(key.into());
    }

    /// Active sort column
    #[must_use]
    pub const fn sort_key(&self) -> Option<&FieldPath> {
        self.sort.key.as_ref()
    }

    /// Active sort direction
    #[must_use]
    pub const fn sort_direction(&self) -> Option<SortDirection> {
        self.sort.direction
    }

    /// Items in input order
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Items in sort order
    ///
    /// # Errors
    ///
    /// Fails when an item lacks the sort key.
    pub fn sorted(&self) -> Result<Vec<&T>> {
        apply_sort(self.items.iter().collect(), &self.sort)
    }
}
