//! # Composable Collections
//!
//! Client-side state for remote REST collections.
//!
//! Each collection lives in a namespaced [`CollectionSlice`]: its records,
//! fetch status, edit/delete selections, busy ids, filter text, sort column,
//! expanded record, pagination window and envelope metadata. Slices change
//! only through [`NamespacedAction`]s applied by a reducer, and are read
//! through the [`selectors`].
//!
//! - [`reducer::apply`] is the pure transition of one slice.
//! - [`CollectionReducer`] and [`CollectionsReducer`] plug slices into a
//!   store; their fetch/save/delete commands become transport effects.
//! - [`hooks`] gives components the same filter and sort rules for lists
//!   they hold themselves.
//!
//! ## Example
//!
//! ```
//! use composable_collections::{
//!     CollectionConfig, CollectionSlice, action::{fetch_success, set_filter_value},
//!     reducer::apply, selectors,
//! };
//! use serde_json::json;
//!
//! # fn main() -> Result<(), composable_collections::CollectionError> {
//! let mut slice = CollectionSlice::new(CollectionConfig::new().filter_on(["title"]));
//! let now = chrono::Utc::now();
//!
//! let body = json!([{"id": 1, "title": "Gold"}, {"id": 2, "title": "Silver"}]);
//! apply(&mut slice, fetch_success("tags", body, false).action, now)?;
//! apply(&mut slice, set_filter_value("tags", "gol").action, now)?;
//!
//! let view = selectors::derived_view(&slice)?;
//! assert_eq!(view.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod config;
pub mod error;
pub mod field_path;
pub mod hooks;
pub mod ordering;
pub mod pagination;
pub mod record;
pub mod reducer;
pub mod response;
pub mod selectors;
pub mod state;

// Re-export commonly used types
pub use action::{CollectionAction, ErrorAction, FetchOptions, NamespacedAction};
pub use config::{ApiConfig, ConfigError, Environment};
pub use error::CollectionError;
pub use field_path::FieldPath;
pub use ordering::{SortDirection, SortState};
pub use pagination::{PageDescriptor, PaginationInfo, QueryParams};
pub use record::{Record, RecordId};
pub use reducer::{CollectionEnvironment, CollectionReducer, CollectionsReducer};
pub use response::ResponseShape;
pub use state::{
    BusySet, CollectionConfig, CollectionSlice, CollectionsState, ExpandTarget, ResetPolicy, UpdateTarget,
};
