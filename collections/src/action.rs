//! Collection actions and their creators
//!
//! Every action is addressed to one namespace. Its full type string is
//! `"<namespace>/<ACTION_TYPE>"`, e.g. `tags/FETCH_SUCCESS`, which is what the
//! reducer logs.

use crate::field_path::FieldPath;
use crate::pagination::QueryParams;
use crate::record::RecordId;
use crate::state::{ExpandTarget, UpdateTarget};
use composable_collections_core::environment::TransportError;
use composable_collections_macros::Action;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Inputs to a collection slice
///
/// Commands ask for remote work and are answered by the completion events
/// at the end of the list; the remaining events are plain state changes.
#[derive(Action, Clone, Debug, PartialEq)]
pub enum CollectionAction {
    // Commands
    /// Load records from `path`
    #[command]
    FetchElems {
        /// Path below the API base URL, e.g. `tags/`
        path: String,
        /// Query parameters
        query: QueryParams,
        /// Cache lifetime; `0` always fetches
        max_age_minutes: u32,
        /// Concatenate instead of replacing
        append: bool,
        /// Dispatched after `FetchFailure` when the request fails
        on_error: Option<ErrorAction>,
    },

    /// Create (`id` = [`UpdateTarget::New`] or [`UpdateTarget::None`]) or
    /// update a record
    #[command]
    CreateUpdateElem {
        /// Path below the API base URL
        path: String,
        /// Record to save
        id: UpdateTarget,
        /// Request body
        data: Value,
    },

    /// Delete a record
    #[command]
    DeleteElem {
        /// Path below the API base URL
        path: String,
        /// Record to delete
        id: RecordId,
    },

    // Events
    /// A fetch started
    #[event]
    FetchBusy,

    /// A fetch answered with `body`
    #[event]
    FetchSuccess {
        /// Response body
        body: Value,
        /// Concatenate instead of replacing
        append: bool,
    },

    /// A fetch failed
    #[event]
    FetchFailure,

    /// Return the slice to its initial state
    #[event]
    ResetState,

    /// Select a record for editing
    #[event]
    SetUpdateId {
        /// Selection
        id: UpdateTarget,
    },

    /// Mark an update as in flight or finished
    #[event]
    SetUpdateBusyId {
        /// Record id
        id: RecordId,
        /// In flight
        busy: bool,
    },

    /// A save or delete succeeded on the server
    ///
    /// `New` with a record prepends it; an id with a record replaces it in
    /// place; an id without a record removes it.
    #[event]
    UpdateSuccess {
        /// Saved or deleted record
        id: UpdateTarget,
        /// Server representation, absent for deletes
        record: Option<Value>,
    },

    /// Select a record for delete confirmation
    #[event]
    SetDeleteId {
        /// Selection
        id: Option<RecordId>,
    },

    /// Mark a delete as in flight or finished
    #[event]
    SetDeleteBusyId {
        /// Record id
        id: RecordId,
        /// In flight
        busy: bool,
    },

    /// Change the free-text filter
    #[event]
    SetFilterValue {
        /// Filter text
        value: String,
    },

    /// Toggle sorting on a column
    #[event]
    SetSortKey {
        /// Column
        key: FieldPath,
    },

    /// Toggle the expanded record
    #[event]
    SetExpandId {
        /// Selection
        id: ExpandTarget,
    },

    /// A `CreateUpdateElem` request finished
    #[event]
    SaveCompleted {
        /// Saved record
        id: UpdateTarget,
        /// Server representation or the failure
        outcome: Result<Value, TransportError>,
    },

    /// A `DeleteElem` request finished
    #[event]
    DeleteCompleted {
        /// Deleted record
        id: RecordId,
        /// Failure, if any
        outcome: Result<(), TransportError>,
    },
}

/// A [`CollectionAction`] addressed to a namespace
#[derive(Clone, Debug, PartialEq)]
pub struct NamespacedAction {
    /// Target slice
    pub namespace: String,
    /// The action
    pub action: CollectionAction,
}

impl NamespacedAction {
    /// Address `action` to `namespace`
    #[must_use]
    pub fn new(namespace: impl Into<String>, action: CollectionAction) -> Self {
        Self {
            namespace: namespace.into(),
            action,
        }
    }

    /// `"<namespace>/<ACTION_TYPE>"`
    #[must_use]
    pub fn type_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for NamespacedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.action.action_type())
    }
}

/// Builds the action dispatched after a failed fetch
///
/// The action may address any namespace, so a caller can route the
/// failure (and its [`TransportError::notification_id`]) into its own slice.
/// Two builders are equal only when they share the same closure.
#[derive(Clone)]
pub struct ErrorAction(Arc<dyn Fn(&TransportError) -> NamespacedAction + Send + Sync>);

impl ErrorAction {
    /// Wrap an action builder
    pub fn new<F>(build: F) -> Self
    where
        F: Fn(&TransportError) -> NamespacedAction + Send + Sync + 'static,
    {
        Self(Arc::new(build))
    }

    /// Action for `error`
    #[must_use]
    pub fn build(&self, error: &TransportError) -> NamespacedAction {
        (self.0)(error)
    }
}

impl fmt::Debug for ErrorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ErrorAction(..)")
    }
}

impl PartialEq for ErrorAction {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ErrorAction {}

/// Options for [`fetch_elems`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Query parameters
    pub query: QueryParams,
    /// Cache lifetime; `0` always fetches
    pub max_age_minutes: u32,
    /// Concatenate instead of replacing
    pub append: bool,
    /// Action dispatched after a failed fetch
    pub on_error: Option<ErrorAction>,
}

/// Load records from `path`
#[must_use]
pub fn fetch_elems(namespace: &str, path: impl Into<String>, options: FetchOptions) -> NamespacedAction {
    NamespacedAction::new(
        namespace,
        CollectionAction::FetchElems {
            path: path.into(),
            query: options.query,
            max_age_minutes: options.max_age_minutes,
            append: options.append,
            on_error: options.on_error,
        },
    )
}

/// Create a record (`id` = `New` or `None`) or update an existing one
#[must_use]
pub fn create_update_elem(
    namespace: &str,
    path: impl Into<String>,
    id: UpdateTarget,
    data: Value,
) -> NamespacedAction {
    NamespacedAction::new(
        namespace,
        CollectionAction::CreateUpdateElem {
            path: path.into(),
            id,
            data,
        },
    )
}

/// Delete a record
#[must_use]
pub fn delete_elem(namespace: &str, path: impl Into<String>, id: impl Into<RecordId>) -> NamespacedAction {
    NamespacedAction::new(
        namespace,
        CollectionAction::DeleteElem {
            path: path.into(),
            id: id.into(),
        },
    )
}

/// A fetch started
#[must_use]
pub fn fetch_busy(namespace: &str) -> NamespacedAction {
    NamespacedAction::new(namespace, CollectionAction::FetchBusy)
}

/// A fetch answered with `body`
#[must_use]
pub fn fetch_success(namespace: &str, body: Value, append: bool) -> NamespacedAction {
    NamespacedAction::new(namespace, CollectionAction::FetchSuccess { body, append })
}

/// A fetch failed
#[must_use]
pub fn fetch_failure(namespace: &str) -> NamespacedAction {
    NamespacedAction::new(namespace, CollectionAction::FetchFailure)
}

/// Reset the slice
#[must_use]
pub fn reset_state(namespace: &str) -> NamespacedAction {
    NamespacedAction::new(namespace, CollectionAction::ResetState)
}

/// Select a record for editing
#[must_use]
pub fn set_update_id(namespace: &str, id: UpdateTarget) -> NamespacedAction {
    NamespacedAction::new(namespace, CollectionAction::SetUpdateId { id })
}

/// Mark an update as in flight or finished
#[must_use]
pub fn set_update_busy_id(namespace: &str, id: impl Into<RecordId>, busy: bool) -> NamespacedAction {
    NamespacedAction::new(
        namespace,
        CollectionAction::SetUpdateBusyId { id: id.into(), busy },
    )
}

/// A save or delete succeeded
#[must_use]
pub fn update_success(namespace: &str, id: UpdateTarget, record: Option<Value>) -> NamespacedAction {
    NamespacedAction::new(namespace, CollectionAction::UpdateSuccess { id, record })
}

/// Select a record for delete confirmation
#[must_use]
pub fn set_delete_id(namespace: &str, id: Option<RecordId>) -> NamespacedAction {
    NamespacedAction::new(namespace, CollectionAction::SetDeleteId { id })
}

/// Mark a delete as in flight or finished
#[must_use]
pub fn set_delete_busy_id(namespace: &str, id: impl Into<RecordId>, busy: bool) -> NamespacedAction {
    NamespacedAction::new(
        namespace,
        CollectionAction::SetDeleteBusyId { id: id.into(), busy },
    )
}

/// Change the free-text filter
#[must_use]
pub fn set_filter_value(namespace: &str, value: impl Into<String>) -> NamespacedAction {
    NamespacedAction::new(namespace, CollectionAction::SetFilterValue { value: value.into() })
}

/// Toggle sorting on a column
#[must_use]
pub fn set_sort_key(namespace: &str, key: impl Into<FieldPath>) -> NamespacedAction {
    NamespacedAction::new(namespace, CollectionAction::SetSortKey { key: key.into() })
}

/// Toggle the expanded record
#[must_use]
pub fn set_expand_id(namespace: &str, id: ExpandTarget) -> NamespacedAction {
    NamespacedAction::new(namespace, CollectionAction::SetExpandId { id })
}
