//! Read-only views over a collection slice
//!
//! Plain accessors mirror the slice fields. The derived views filter on the
//! cached search text and then sort, reading nothing but the slice.

use crate::error::Result;
use crate::field_path::FieldPath;
use crate::ordering::{SortDirection, apply_sort, filter_records};
use crate::pagination::PaginationInfo;
use crate::record::{Record, RecordId};
use crate::state::{BusySet, CollectionSlice, CollectionsState, ExpandTarget, UpdateTarget};
use serde_json::{Map, Value};

/// Slice registered under `namespace`
#[must_use]
pub fn slice<'a>(state: &'a CollectionsState, namespace: &str) -> Option<&'a CollectionSlice> {
    state.slice(namespace)
}

/// All records, unfiltered and unsorted
#[must_use]
pub fn all_records(slice: &CollectionSlice) -> &[Record] {
    &slice.records
}

/// Record in the edit form
#[must_use]
pub const fn update_id(slice: &CollectionSlice) -> &UpdateTarget {
    &slice.update_id
}

/// Records with an update in flight
#[must_use]
pub const fn update_busy_ids(slice: &CollectionSlice) -> &BusySet {
    &slice.update_busy_ids
}

/// Record awaiting delete confirmation
#[must_use]
pub const fn delete_id(slice: &CollectionSlice) -> Option<&RecordId> {
    slice.delete_id.as_ref()
}

/// Records with a delete in flight
#[must_use]
pub const fn delete_busy_ids(slice: &CollectionSlice) -> &BusySet {
    &slice.delete_busy_ids
}

/// Free-text filter
#[must_use]
pub fn filter_value(slice: &CollectionSlice) -> &str {
    &slice.filter_value
}

/// Active sort column
#[must_use]
pub const fn sort_key(slice: &CollectionSlice) -> Option<&FieldPath> {
    slice.sort.key.as_ref()
}

/// Active sort direction
#[must_use]
pub const fn sort_direction(slice: &CollectionSlice) -> Option<SortDirection> {
    slice.sort.direction
}

/// Expanded record(s)
#[must_use]
pub const fn expand_id(slice: &CollectionSlice) -> &ExpandTarget {
    &slice.expand_id
}

/// Pagination of the last response
#[must_use]
pub const fn pagination(slice: &CollectionSlice) -> Option<&PaginationInfo> {
    slice.pagination.as_ref()
}

/// Envelope metadata
#[must_use]
pub const fn extra_info(slice: &CollectionSlice) -> &Map<String, Value> {
    &slice.extra_info
}

/// Records matching the filter value, in stored order
#[must_use]
pub fn filtered_records(slice: &CollectionSlice) -> Vec<&Record> {
    filter_records(&slice.records, &slice.filter_value)
}

/// Filtered records in sort order
///
/// # Errors
///
/// [`crate::CollectionError::MissingKey`] when a record lacks the sort key.
pub fn sorted_records(slice: &CollectionSlice) -> Result<Vec<&Record>> {
    apply_sort(filtered_records(slice), &slice.sort)
}

/// The derived list to display: filtered, then sorted
///
/// Empty until the slice is up to date.
///
/// # Errors
///
/// See [`sorted_records`].
pub fn derived_view(slice: &CollectionSlice) -> Result<Vec<&Record>> {
    if !slice.is_up_to_date() {
        return Ok(Vec::new());
    }
    sorted_records(slice)
}

/// A fetch is in flight
#[must_use]
pub const fn is_fetching(slice: &CollectionSlice) -> bool {
    slice.is_fetching
}

/// The last fetch failed
#[must_use]
pub const fn did_invalidate(slice: &CollectionSlice) -> bool {
    slice.did_invalidate
}

/// Fetched, not invalidated and not fetching
#[must_use]
pub const fn fetching_complete(slice: &CollectionSlice) -> bool {
    slice.fetching_complete()
}

/// Fetched and not invalidated
#[must_use]
pub const fn is_up_to_date(slice: &CollectionSlice) -> bool {
    slice.is_up_to_date()
}

/// The record being edited
///
/// `None` when nothing is selected, when a new record is being created,
/// when the id is unknown, and while the slice is not up to date.
#[must_use]
pub fn record_to_edit(slice: &CollectionSlice) -> Option<&Record> {
    if !slice.is_up_to_date() {
        return None;
    }
    slice.update_id.record_id().and_then(|id| slice.record(id))
}

/// Number of records held, regardless of fetch state
#[must_use]
pub fn total_count(slice: &CollectionSlice) -> usize {
    slice.records.len()
}

/// Length of [`derived_view`]
///
/// # Errors
///
/// See [`sorted_records`].
pub fn filtered_count(slice: &CollectionSlice) -> Result<usize> {
    derived_view(slice).map(|records| records.len())
}
