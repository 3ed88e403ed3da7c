//! Collection slice state

use crate::error::Result;
use crate::field_path::FieldPath;
use crate::ordering::SortState;
use crate::pagination::PaginationInfo;
use crate::record::{Record, RecordId};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// What `ResetState` keeps
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPolicy {
    /// Keep filter fields and the envelope key, clear everything else
    #[default]
    PreserveConfig,
    /// Return to a blank slice
    Defaults,
}

/// Per-slice configuration fixed at construction time
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Fields folded into each record's search text
    pub filter_on_fields: Vec<FieldPath>,
    /// Envelope key holding the records array
    pub response_elems_key: Option<String>,
    /// Behaviour of `ResetState`
    pub reset_policy: ResetPolicy,
}

impl CollectionConfig {
    /// Blank configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration for a DRF-style paginated endpoint (`results` envelope)
    #[must_use]
    pub fn paginated() -> Self {
        Self::new().elems_key("results")
    }

    /// Add search fields
    #[must_use]
    pub fn filter_on<I, P>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<FieldPath>,
    {
        self.filter_on_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Set the envelope key
    #[must_use]
    pub fn elems_key(mut self, key: impl Into<String>) -> Self {
        self.response_elems_key = Some(key.into());
        self
    }

    /// Set the reset policy
    #[must_use]
    pub const fn reset_policy(mut self, policy: ResetPolicy) -> Self {
        self.reset_policy = policy;
        self
    }
}

/// Record selected for editing
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateTarget {
    /// Nothing is being edited
    #[default]
    None,
    /// A new record is being created
    New,
    /// An existing record is being edited
    Id(RecordId),
}

impl UpdateTarget {
    /// The existing record id, if any
    #[must_use]
    pub const fn record_id(&self) -> Option<&RecordId> {
        match self {
            Self::Id(id) => Some(id),
            Self::None | Self::New => None,
        }
    }
}

/// Record (or records) shown expanded
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpandTarget {
    /// Everything collapsed
    #[default]
    None,
    /// Everything expanded
    All,
    /// One record expanded
    Id(RecordId),
}

/// Ids with a request in flight, in insertion order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusySet(Vec<RecordId>);

impl BusySet {
    /// Mark or unmark `id`; repeating either is a no-op
    pub fn set(&mut self, id: RecordId, busy: bool) {
        let present = self.contains(&id);
        if busy && !present {
            self.0.push(id);
        } else if !busy && present {
            self.0.retain(|existing| *existing != id);
        }
    }

    /// Whether `id` is busy
    #[must_use]
    pub fn contains(&self, id: &RecordId) -> bool {
        self.0.contains(id)
    }

    /// Busy ids
    #[must_use]
    pub fn ids(&self) -> &[RecordId] {
        &self.0
    }

    /// True when nothing is busy
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<const N: usize> From<[i64; N]> for BusySet {
    fn from(ids: [i64; N]) -> Self {
        let mut set = Self::default();
        for id in ids {
            set.set(RecordId::Int(id), true);
        }
        set
    }
}

/// State of one remote collection
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionSlice {
    /// A fetch is in flight
    pub is_fetching: bool,
    /// The cached records are known to be stale
    pub did_invalidate: bool,
    /// When the last fetch completed
    pub last_updated: Option<DateTime<Utc>>,
    /// Records in display order
    pub records: Vec<Record>,
    /// Construction-time configuration
    pub config: CollectionConfig,
    /// Record in the edit form
    pub update_id: UpdateTarget,
    /// Records with an update in flight
    pub update_busy_ids: BusySet,
    /// Record awaiting delete confirmation
    pub delete_id: Option<RecordId>,
    /// Records with a delete in flight
    pub delete_busy_ids: BusySet,
    /// Free-text filter
    pub filter_value: String,
    /// Active sort
    pub sort: SortState,
    /// Expanded record(s)
    pub expand_id: ExpandTarget,
    /// Offset pagination, when the last response was paginated
    pub pagination: Option<PaginationInfo>,
    /// Envelope fields other than the records
    pub extra_info: Map<String, Value>,
    /// Message of the last failed save or delete
    pub last_error: Option<String>,
}

impl CollectionSlice {
    /// Blank slice with `config`
    #[must_use]
    pub fn new(config: CollectionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Fields folded into search text
    #[must_use]
    pub fn filter_on_fields(&self) -> &[FieldPath] {
        &self.config.filter_on_fields
    }

    /// Envelope key
    #[must_use]
    pub fn response_elems_key(&self) -> Option<&str> {
        self.config.response_elems_key.as_deref()
    }

    /// Wrap a server record with this slice's search text
    ///
    /// # Errors
    ///
    /// See [`Record::indexed`].
    pub fn index(&self, data: Value) -> Result<Record> {
        Record::indexed(data, self.filter_on_fields())
    }

    /// Slice state after `ResetState`
    #[must_use]
    pub fn reset(&self) -> Self {
        match self.config.reset_policy {
            ResetPolicy::PreserveConfig => Self::new(self.config.clone()),
            ResetPolicy::Defaults => Self::default(),
        }
    }

    /// Record carrying `id`
    #[must_use]
    pub fn record(&self, id: &RecordId) -> Option<&Record> {
        self.records.iter().find(|record| record.has_id(id))
    }

    /// Fetched and not invalidated
    #[must_use]
    pub const fn is_up_to_date(&self) -> bool {
        !self.did_invalidate && self.last_updated.is_some()
    }

    /// Up to date with no fetch in flight
    #[must_use]
    pub const fn fetching_complete(&self) -> bool {
        !self.is_fetching && self.is_up_to_date()
    }

    /// Whether a fetch should be issued given a cache lifetime
    ///
    /// Never fetched: yes. In flight: no. Older than `max_age`: yes.
    /// Otherwise only when invalidated.
    #[must_use]
    pub fn should_fetch(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        if self.is_fetching {
            return false;
        }
        match self.last_updated {
            None => true,
            Some(last_updated) if last_updated <= now - max_age => true,
            Some(_) => self.did_invalidate,
        }
    }
}

/// Every collection slice of an application, keyed by namespace
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionsState {
    /// Slices by namespace
    pub slices: BTreeMap<String, CollectionSlice>,
}

impl CollectionsState {
    /// No slices
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a namespace
    #[must_use]
    pub fn with_collection(mut self, namespace: impl Into<String>, config: CollectionConfig) -> Self {
        self.slices.insert(namespace.into(), CollectionSlice::new(config));
        self
    }

    /// Slice for `namespace`
    #[must_use]
    pub fn slice(&self, namespace: &str) -> Option<&CollectionSlice> {
        self.slices.get(namespace)
    }

    /// Mutable slice for `namespace`
    pub fn slice_mut(&mut self, namespace: &str) -> Option<&mut CollectionSlice> {
        self.slices.get_mut(namespace)
    }

    /// Registered namespaces
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.slices.keys().map(String::as_str)
    }
}
