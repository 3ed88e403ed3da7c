//! Collection reducers
//!
//! [`apply`] is the pure transition of one slice. It either applies an event
//! completely or fails and leaves the slice untouched.
//!
//! The [`Reducer`] implementations wrap it for a store: commands are turned
//! into transport effects whose outcomes come back as events, and failed
//! transitions are logged and dropped.

use crate::action::{CollectionAction, NamespacedAction};
use crate::config::ApiConfig;
use crate::error::Result;
use crate::pagination::QueryParams;
use crate::record::RecordId;
use crate::response::ResponseShape;
use crate::state::{CollectionSlice, CollectionsState, ExpandTarget, UpdateTarget};
use chrono::{DateTime, Utc};
use composable_collections_core::{
    SmallVec,
    effect::Effect,
    environment::{Clock, Method, MutationRequest, Transport, TransportError},
    reducer::Reducer,
    smallvec,
};
use serde_json::Value;
use std::sync::{Arc, OnceLock};

/// Dependencies of the collection reducers
#[derive(Clone)]
pub struct CollectionEnvironment {
    /// Stamps `last_updated` and ages the cache
    pub clock: Arc<dyn Clock>,
    /// Performs HTTP requests
    pub transport: Arc<dyn Transport>,
    /// Base URL and environment
    pub api: ApiConfig,
}

impl CollectionEnvironment {
    /// Creates a new `CollectionEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, transport: Arc<dyn Transport>, api: ApiConfig) -> Self {
        Self { clock, transport, api }
    }
}

/// Apply an event to a slice
///
/// Commands carry no state change of their own and are ignored here.
///
/// # Errors
///
/// Fails when a record entering the slice lacks a filter field (or holds
/// an unfilterable value there). The slice is then unchanged.
pub fn apply(slice: &mut CollectionSlice, action: CollectionAction, now: DateTime<Utc>) -> Result<()> {
    match action {
        CollectionAction::FetchBusy => slice.is_fetching = true,
        CollectionAction::FetchSuccess { body, append } => apply_fetch_success(slice, body, append, now)?,
        CollectionAction::FetchFailure => {
            slice.is_fetching = false;
            slice.did_invalidate = true;
        },
        CollectionAction::ResetState => *slice = slice.reset(),
        CollectionAction::SetUpdateId { id } => slice.update_id = id,
        CollectionAction::SetUpdateBusyId { id, busy } => slice.update_busy_ids.set(id, busy),
        CollectionAction::UpdateSuccess { id, record } => apply_update_success(slice, id, record)?,
        CollectionAction::SetDeleteId { id } => slice.delete_id = id,
        CollectionAction::SetDeleteBusyId { id, busy } => slice.delete_busy_ids.set(id, busy),
        CollectionAction::SetFilterValue { value } => slice.filter_value = value,
        CollectionAction::SetSortKey { key } => slice.sort = slice.sort.toggled(key),
        CollectionAction::SetExpandId { id } => {
            slice.expand_id = if slice.expand_id == id { ExpandTarget::None } else { id };
        },
        CollectionAction::SaveCompleted { id, outcome } => {
            match outcome {
                Ok(record) => {
                    apply_update_success(slice, id.clone(), Some(record))?;
                    slice.last_error = None;
                },
                Err(error) => slice.last_error = Some(error.to_string()),
            }
            if let UpdateTarget::Id(id) = id {
                slice.update_busy_ids.set(id, false);
            }
        },
        CollectionAction::DeleteCompleted { id, outcome } => {
            match outcome {
                Ok(()) => {
                    apply_update_success(slice, UpdateTarget::Id(id.clone()), None)?;
                    slice.last_error = None;
                },
                Err(error) => slice.last_error = Some(error.to_string()),
            }
            slice.delete_busy_ids.set(id, false);
        },
        // Commands are not applied to state
        CollectionAction::FetchElems { .. }
        | CollectionAction::CreateUpdateElem { .. }
        | CollectionAction::DeleteElem { .. } => {},
    }
    Ok(())
}

fn apply_fetch_success(
    slice: &mut CollectionSlice,
    body: Value,
    append: bool,
    now: DateTime<Utc>,
) -> Result<()> {
    let (records, extra_info, pagination) = match ResponseShape::classify(body, slice.response_elems_key()) {
        ResponseShape::Envelope {
            records,
            extra_info,
            pagination,
        } => (records, Some(extra_info), pagination),
        ResponseShape::BareArray(records) => (records, None, None),
        ResponseShape::SingleObject(record) => (vec![record], None, None),
    };
    let records = records
        .into_iter()
        .map(|data| slice.index(data))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        received = records.len(),
        append,
        paginated = pagination.is_some(),
        "Fetch succeeded"
    );

    if append {
        slice.records.extend(records);
    } else {
        slice.records = records;
    }
    if let Some(extra_info) = extra_info {
        slice.extra_info.extend(extra_info);
    }
    slice.pagination = pagination;
    slice.is_fetching = false;
    slice.did_invalidate = false;
    slice.last_updated = Some(now);
    Ok(())
}

fn apply_update_success(slice: &mut CollectionSlice, id: UpdateTarget, record: Option<Value>) -> Result<()> {
    match (id, record) {
        (UpdateTarget::New, Some(data)) => {
            let record = slice.index(data)?;
            slice.records.insert(0, record);
        },
        (UpdateTarget::Id(id), Some(data)) => {
            let record = slice.index(data)?;
            match position(slice, &id) {
                Some(index) => slice.records[index] = record,
                None => tracing::warn!(%id, "Updated record is not in the collection"),
            }
        },
        (UpdateTarget::Id(id), None) => match position(slice, &id) {
            Some(index) => {
                slice.records.remove(index);
                if let Some(pagination) = slice.pagination.as_mut() {
                    pagination.record_removed();
                }
            },
            None => tracing::warn!(%id, "Deleted record is not in the collection"),
        },
        (UpdateTarget::New, None) | (UpdateTarget::None, _) => {
            tracing::warn!("Update success without a record target ignored");
        },
    }
    Ok(())
}

fn position(slice: &CollectionSlice, id: &RecordId) -> Option<usize> {
    slice.records.iter().position(|record| record.has_id(id))
}

/// Reduce one action for the slice of `namespace`
fn reduce_slice(
    namespace: &str,
    slice: &mut CollectionSlice,
    action: CollectionAction,
    env: &CollectionEnvironment,
) -> SmallVec<[Effect<NamespacedAction>; 4]> {
    let action_type = action.action_type();
    let _span = tracing::debug_span!("collection_reduce", namespace, action_type).entered();

    match action {
        CollectionAction::FetchElems {
            path,
            query,
            max_age_minutes,
            append,
            on_error,
        } => {
            if max_age_minutes > 0 && !slice.should_fetch(env.api.max_age(max_age_minutes), env.clock.now()) {
                tracing::debug!(max_age_minutes, "Cached records are fresh, skipping fetch");
                metrics::counter!("collections.fetch.skipped").increment(1);
                return SmallVec::new();
            }
            slice.is_fetching = true;

            let url = env.api.url(&path, &query);
            let transport = Arc::clone(&env.transport);
            let namespace = namespace.to_string();
            let failure = Arc::new(OnceLock::new());
            let recorded = Arc::clone(&failure);
            tracing::debug!(%url, "Fetching records");

            let fetch = Effect::future(async move {
                let action = match transport.get(&url).await {
                    Ok(body) => CollectionAction::FetchSuccess { body, append },
                    Err(error) => {
                        tracing::warn!(
                            %namespace,
                            %url,
                            %error,
                            notification = %error.notification_id(),
                            "Fetch failed"
                        );
                        let _ = recorded.set(error);
                        CollectionAction::FetchFailure
                    },
                };
                Some(NamespacedAction::new(namespace, action))
            });

            match on_error {
                None => smallvec![fetch],
                Some(on_error) => smallvec![Effect::Sequential(vec![
                    fetch,
                    Effect::future(async move { failure.get().map(|error| on_error.build(error)) }),
                ])],
            }
        },

        CollectionAction::CreateUpdateElem { path, id, data } => {
            // Without a record id the save is a create
            let id = match id {
                UpdateTarget::None => UpdateTarget::New,
                id => id,
            };
            let (method, url) = match &id {
                UpdateTarget::Id(record_id) => {
                    slice.update_busy_ids.set(record_id.clone(), true);
                    (Method::Patch, env.api.record_url(&path, record_id))
                },
                UpdateTarget::New | UpdateTarget::None => (Method::Post, env.api.url(&path, &QueryParams::new())),
            };
            let request = MutationRequest {
                method,
                url,
                body: Some(data),
            };
            let transport = Arc::clone(&env.transport);
            let namespace = namespace.to_string();

            smallvec![Effect::future(async move {
                let url = request.url.clone();
                let outcome = match transport.send(request).await {
                    Ok(Some(record)) => Ok(record),
                    Ok(None) => Err(TransportError::InvalidJson {
                        url,
                        message: "empty response body".to_string(),
                    }),
                    Err(error) => Err(error),
                };
                if let Err(error) = &outcome {
                    tracing::warn!(%namespace, %error, notification = %error.notification_id(), "Save failed");
                }
                Some(NamespacedAction::new(
                    namespace,
                    CollectionAction::SaveCompleted { id, outcome },
                ))
            })]
        },

        CollectionAction::DeleteElem { path, id } => {
            slice.delete_busy_ids.set(id.clone(), true);
            let request = MutationRequest {
                method: Method::Delete,
                url: env.api.record_url(&path, &id),
                body: None,
            };
            let transport = Arc::clone(&env.transport);
            let namespace = namespace.to_string();

            smallvec![Effect::future(async move {
                let outcome = transport.send(request).await.map(|_| ());
                if let Err(error) = &outcome {
                    tracing::warn!(%namespace, %error, notification = %error.notification_id(), "Delete failed");
                }
                Some(NamespacedAction::new(
                    namespace,
                    CollectionAction::DeleteCompleted { id, outcome },
                ))
            })]
        },

        event => {
            tracing::debug!("Applying collection event");
            if let Err(error) = apply(slice, event, env.clock.now()) {
                tracing::error!(%error, "Rejected collection action");
                metrics::counter!("collections.transitions.rejected").increment(1);
            }
            SmallVec::new()
        },
    }
}

/// Reducer for a single collection slice
///
/// Actions addressed to other namespaces leave the slice unchanged.
#[derive(Clone, Debug)]
pub struct CollectionReducer {
    namespace: String,
}

impl CollectionReducer {
    /// Reducer for `namespace`
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Namespace this reducer owns
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Apply a namespaced event without a store
    ///
    /// # Errors
    ///
    /// See [`apply`].
    pub fn apply(&self, slice: &mut CollectionSlice, action: NamespacedAction, now: DateTime<Utc>) -> Result<()> {
        if action.namespace != self.namespace {
            return Ok(());
        }
        apply(slice, action.action, now)
    }
}

impl Reducer for CollectionReducer {
    type State = CollectionSlice;
    type Action = NamespacedAction;
    type Environment = CollectionEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        if action.namespace != self.namespace {
            return SmallVec::new();
        }
        reduce_slice(&self.namespace, state, action.action, env)
    }
}

/// Reducer routing namespaced actions to the slices of a [`CollectionsState`]
///
/// Actions for unregistered namespaces are ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct CollectionsReducer;

impl CollectionsReducer {
    /// Creates a new `CollectionsReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for CollectionsReducer {
    type State = CollectionsState;
    type Action = NamespacedAction;
    type Environment = CollectionEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let NamespacedAction { namespace, action } = action;
        match state.slice_mut(&namespace) {
            Some(slice) => reduce_slice(&namespace, slice, action, env),
            None => {
                tracing::debug!(%namespace, action_type = action.action_type(), "No collection registered");
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::action::{
        ErrorAction, FetchOptions, create_update_elem, delete_elem, fetch_busy, fetch_elems, fetch_failure,
        fetch_success, reset_state, set_delete_busy_id, set_expand_id, set_filter_value, set_sort_key,
        set_update_busy_id, update_success,
    };
    use crate::error::CollectionError;
    use crate::field_path::FieldPath;
    use crate::ordering::{SortDirection, SortState};
    use crate::state::{BusySet, CollectionConfig, ResetPolicy};
    use composable_collections_core::environment::Clock;
    use composable_collections_testing::{MockTransport, ReducerTest, assertions, resolve_effects, test_clock};
    use serde_json::json;

    const API: &str = "http://api.test/api/v1/";

    fn env_with(transport: MockTransport) -> CollectionEnvironment {
        CollectionEnvironment::new(Arc::new(test_clock()), Arc::new(transport), ApiConfig::new(API))
    }

    fn env() -> CollectionEnvironment {
        env_with(MockTransport::new())
    }

    fn tags() -> CollectionReducer {
        CollectionReducer::new("tags")
    }

    fn titled() -> CollectionSlice {
        CollectionSlice::new(CollectionConfig::new().filter_on(["title", "sub_title"]))
    }

    fn with_records(mut slice: CollectionSlice, records: &[Value]) -> CollectionSlice {
        slice.records = records.iter().map(|data| slice.index(data.clone()).unwrap()).collect();
        slice
    }

    fn ids(slice: &CollectionSlice) -> Vec<Option<RecordId>> {
        slice.records.iter().map(crate::record::Record::id).collect()
    }

    #[test]
    fn fetch_busy_marks_fetching() {
        ReducerTest::new(tags())
            .with_env(env())
            .given_state(CollectionSlice::default())
            .when_action(fetch_busy("tags"))
            .then_state(|slice| assert!(slice.is_fetching))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn fetch_success_indexes_records() {
        let now = test_clock().now();
        ReducerTest::new(tags())
            .with_env(env())
            .given_state(titled())
            .when_action(fetch_busy("tags"))
            .when_action(fetch_success(
                "tags",
                json!([{"id": 1, "title": "Alpha", "sub_title": "Charlie"}]),
                false,
            ))
            .then_state(move |slice| {
                assert!(!slice.is_fetching);
                assert!(!slice.did_invalidate);
                assert_eq!(slice.last_updated, Some(now));
                assert_eq!(slice.records[0].filter_string(), Some("alpha charlie"));
                assert_eq!(slice.pagination, None);
            })
            .run();
    }

    #[test]
    fn append_concatenates_and_replace_overwrites() {
        let start = with_records(CollectionSlice::default(), &[json!({"id": 1})]);

        ReducerTest::new(tags())
            .with_env(env())
            .given_state(start.clone())
            .when_action(fetch_success("tags", json!([{"id": 2}]), true))
            .then_state(|slice| assert_eq!(ids(slice), vec![Some(RecordId::Int(1)), Some(RecordId::Int(2))]))
            .run();

        ReducerTest::new(tags())
            .with_env(env())
            .given_state(start)
            .when_action(fetch_success("tags", json!([{"id": 2}]), false))
            .then_state(|slice| assert_eq!(ids(slice), vec![Some(RecordId::Int(2))]))
            .run();
    }

    #[test]
    fn single_object_becomes_one_record() {
        ReducerTest::new(tags())
            .with_env(env())
            .given_state(CollectionSlice::default())
            .when_action(fetch_success("tags", json!({"id": 9, "title": "Solo"}), false))
            .then_state(|slice| assert_eq!(ids(slice), vec![Some(RecordId::Int(9))]))
            .run();
    }

    #[test]
    fn envelope_fills_pagination_and_extra_info() {
        let mut start = CollectionSlice::new(CollectionConfig::paginated());
        start.extra_info.insert("kept".to_string(), json!(true));

        ReducerTest::new(tags())
            .with_env(env())
            .given_state(start)
            .when_action(fetch_success(
                "tags",
                json!({
                    "count": 12,
                    "next": null,
                    "previous": "http://www.xyz.com/api/v1/search/?q=gold&limit=10",
                    "facets": [],
                    "results": [{"id": 11}, {"id": 12}],
                }),
                false,
            ))
            .then_state(|slice| {
                assert_eq!(slice.records.len(), 2);
                assert_eq!(slice.extra_info.get("kept"), Some(&json!(true)));
                assert_eq!(slice.extra_info.get("facets"), Some(&json!([])));
                assert_eq!(slice.extra_info.get("count"), Some(&json!(12)));

                let pagination = slice.pagination.as_ref().unwrap();
                assert_eq!(pagination.page_number, Some(1));
                assert_eq!(pagination.pages.len(), 2);
                assert!(pagination.pages[1].active);
            })
            .run();
    }

    #[test]
    fn unpaginated_envelope_clears_previous_pagination() {
        let mut start = CollectionSlice::new(CollectionConfig::paginated());
        start.pagination = Some(crate::pagination::PaginationInfo::default());

        ReducerTest::new(tags())
            .with_env(env())
            .given_state(start)
            .when_action(fetch_success("tags", json!({"results": [{"id": 1}]}), false))
            .then_state(|slice| assert_eq!(slice.pagination, None))
            .run();
    }

    #[test]
    fn fetch_failure_invalidates() {
        ReducerTest::new(tags())
            .with_env(env())
            .given_state(CollectionSlice::default())
            .when_action(fetch_busy("tags"))
            .when_action(fetch_failure("tags"))
            .then_state(|slice| {
                assert!(!slice.is_fetching);
                assert!(slice.did_invalidate);
                assert!(!slice.is_up_to_date());
            })
            .run();
    }

    #[test]
    fn missing_filter_field_rejects_the_whole_fetch() {
        let start = with_records(titled(), &[json!({"id": 1, "title": "a", "sub_title": "b"})]);
        let mut slice = start.clone();

        let result = apply(
            &mut slice,
            CollectionAction::FetchSuccess {
                body: json!([{"id": 2, "title": "c", "sub_title": "d"}, {"id": 3, "title": "e"}]),
                append: false,
            },
            test_clock().now(),
        );

        assert_eq!(
            result,
            Err(CollectionError::MissingKey {
                path: FieldPath::parse("sub_title")
            })
        );
        assert_eq!(slice, start);

        ReducerTest::new(tags())
            .with_env(env())
            .given_state(start.clone())
            .when_action(fetch_success("tags", json!([{"id": 3}]), true))
            .then_state(move |slice| assert_eq!(*slice, start))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn create_prepends_with_filter_string() {
        let start = with_records(titled(), &[json!({"id": 1, "title": "Old", "sub_title": "x"})]);

        ReducerTest::new(tags())
            .with_env(env())
            .given_state(start)
            .when_action(update_success(
                "tags",
                UpdateTarget::New,
                Some(json!({"id": 2, "title": "New", "sub_title": "Y"})),
            ))
            .then_state(|slice| {
                assert_eq!(ids(slice), vec![Some(RecordId::Int(2)), Some(RecordId::Int(1))]);
                assert_eq!(slice.records[0].filter_string(), Some("new y"));
            })
            .run();
    }

    #[test]
    fn update_replaces_in_place() {
        let start = with_records(
            titled(),
            &[
                json!({"id": 1, "title": "a", "sub_title": "a"}),
                json!({"id": 2, "title": "b", "sub_title": "b"}),
                json!({"id": 3, "title": "c", "sub_title": "c"}),
            ],
        );

        ReducerTest::new(tags())
            .with_env(env())
            .given_state(start)
            .when_action(update_success(
                "tags",
                UpdateTarget::Id(RecordId::Int(2)),
                Some(json!({"id": 2, "title": "Bee", "sub_title": "B"})),
            ))
            .then_state(|slice| {
                assert_eq!(slice.records.len(), 3);
                assert_eq!(slice.records[1].data["title"], json!("Bee"));
                assert_eq!(slice.records[1].filter_string(), Some("bee b"));
            })
            .run();
    }

    #[test]
    fn delete_removes_and_decrements_count() {
        let mut start = with_records(CollectionSlice::default(), &[json!({"id": 1}), json!({"id": 2})]);
        start.pagination = Some(crate::pagination::PaginationInfo {
            count: 2,
            ..Default::default()
        });

        ReducerTest::new(tags())
            .with_env(env())
            .given_state(start)
            .when_action(update_success("tags", UpdateTarget::Id(RecordId::Int(1)), None))
            .then_state(|slice| {
                assert_eq!(ids(slice), vec![Some(RecordId::Int(2))]);
                assert_eq!(slice.pagination.as_ref().map(|p| p.count), Some(1));
            })
            .run();
    }

    #[test]
    fn delete_of_unknown_id_changes_nothing() {
        let start = with_records(CollectionSlice::default(), &[json!({"id": 1})]);

        ReducerTest::new(tags())
            .with_env(env())
            .given_state(start.clone())
            .when_action(update_success("tags", UpdateTarget::Id(RecordId::Int(42)), None))
            .then_state(move |slice| assert_eq!(*slice, start))
            .run();
    }

    #[test]
    fn busy_ids_toggle() {
        ReducerTest::new(tags())
            .with_env(env())
            .given_state(CollectionSlice {
                update_busy_ids: BusySet::from([9, 8]),
                ..CollectionSlice::default()
            })
            .when_action(set_update_busy_id("tags", 15, true))
            .when_action(set_update_busy_id("tags", 9, false))
            .when_action(set_delete_busy_id("tags", 4, true))
            .then_state(|slice| {
                assert_eq!(slice.update_busy_ids, BusySet::from([8, 15]));
                assert_eq!(slice.delete_busy_ids, BusySet::from([4]));
            })
            .run();
    }

    #[test]
    fn sort_key_cycles() {
        ReducerTest::new(tags())
            .with_env(env())
            .given_state(CollectionSlice::default())
            .when_action(set_sort_key("tags", "title"))
            .when_action(set_sort_key("tags", "title"))
            .then_state(|slice| {
                assert_eq!(slice.sort.direction, Some(SortDirection::Desc));
                assert_eq!(slice.sort.key, Some(FieldPath::parse("title")));
            })
            .run();

        ReducerTest::new(tags())
            .with_env(env())
            .given_state(CollectionSlice {
                sort: SortState {
                    key: Some(FieldPath::parse("title")),
                    direction: Some(SortDirection::Desc),
                },
                ..CollectionSlice::default()
            })
            .when_action(set_sort_key("tags", "title"))
            .then_state(|slice| assert_eq!(slice.sort, SortState::default()))
            .run();
    }

    #[test]
    fn expand_id_toggles_off() {
        ReducerTest::new(tags())
            .with_env(env())
            .given_state(CollectionSlice::default())
            .when_action(set_expand_id("tags", ExpandTarget::Id(RecordId::Int(15))))
            .then_state(|slice| assert_eq!(slice.expand_id, ExpandTarget::Id(RecordId::Int(15))))
            .run();

        ReducerTest::new(tags())
            .with_env(env())
            .given_state(CollectionSlice::default())
            .when_action(set_expand_id("tags", ExpandTarget::All))
            .when_action(set_expand_id("tags", ExpandTarget::All))
            .then_state(|slice| assert_eq!(slice.expand_id, ExpandTarget::None))
            .run();
    }

    #[test]
    fn reset_keeps_or_drops_config() {
        let config = CollectionConfig::paginated().filter_on(["title"]);
        let mut start = with_records(CollectionSlice::new(config.clone()), &[json!({"id": 1, "title": "x"})]);
        start.filter_value = "x".to_string();

        ReducerTest::new(tags())
            .with_env(env())
            .given_state(start.clone())
            .when_action(reset_state("tags"))
            .then_state(move |slice| assert_eq!(*slice, CollectionSlice::new(config)))
            .run();

        start.config.reset_policy = ResetPolicy::Defaults;
        ReducerTest::new(tags())
            .with_env(env())
            .given_state(start)
            .when_action(reset_state("tags"))
            .then_state(|slice| assert_eq!(*slice, CollectionSlice::default()))
            .run();
    }

    #[test]
    fn other_namespaces_are_ignored() {
        ReducerTest::new(tags())
            .with_env(env())
            .given_state(CollectionSlice::default())
            .when_action(fetch_busy("websites"))
            .when_action(fetch_elems("websites", "websites/", FetchOptions::default()))
            .then_state(|slice| assert_eq!(*slice, CollectionSlice::default()))
            .then_effects(assertions::assert_no_effects)
            .run();

        let mut slice = CollectionSlice::default();
        tags().apply(&mut slice, fetch_busy("websites"), test_clock().now()).unwrap();
        assert!(!slice.is_fetching);
    }

    #[test]
    fn late_fetch_completion_still_applies_after_reset() {
        ReducerTest::new(tags())
            .with_env(env())
            .given_state(CollectionSlice::default())
            .when_action(fetch_busy("tags"))
            .when_action(reset_state("tags"))
            .when_action(fetch_success("tags", json!([{"id": 5}]), false))
            .then_state(|slice| {
                assert_eq!(ids(slice), vec![Some(RecordId::Int(5))]);
                assert!(slice.is_up_to_date());
            })
            .run();
    }

    #[test]
    fn fresh_cache_skips_fetch() {
        let fresh = CollectionSlice {
            last_updated: Some(test_clock().now()),
            ..CollectionSlice::default()
        };
        let options = FetchOptions {
            max_age_minutes: 5,
            ..FetchOptions::default()
        };

        ReducerTest::new(tags())
            .with_env(env())
            .given_state(fresh)
            .when_action(fetch_elems("tags", "tags/", options))
            .then_state(|slice| assert!(!slice.is_fetching))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[tokio::test]
    async fn fetch_command_requests_and_feeds_back() {
        let transport = MockTransport::new().with_get(format!("{API}tags/?limit=10"), json!([{"id": 1}]));
        let env = env_with(transport.clone());
        let mut slice = CollectionSlice::default();

        let options = FetchOptions {
            query: crate::pagination::QueryParams::new().with("limit", 10),
            ..FetchOptions::default()
        };
        let effects = tags().reduce(&mut slice, fetch_elems("tags", "tags/", options), &env);
        assert!(slice.is_fetching);
        assertions::assert_has_future_effect(&effects);

        let actions = resolve_effects(effects).await;
        assert_eq!(actions, vec![fetch_success("tags", json!([{"id": 1}]), false)]);
        assert_eq!(transport.requested_urls(), vec![format!("{API}tags/?limit=10")]);
    }

    #[tokio::test]
    async fn failed_fetch_feeds_back_failure() {
        let env = env();
        let mut slice = CollectionSlice::default();

        let effects = tags().reduce(&mut slice, fetch_elems("tags", "missing/", FetchOptions::default()), &env);
        assert_eq!(resolve_effects(effects).await, vec![fetch_failure("tags")]);
    }

    #[tokio::test]
    async fn failed_fetch_dispatches_the_error_action_last() {
        let env = env();
        let mut slice = CollectionSlice::default();
        let options = FetchOptions {
            on_error: Some(ErrorAction::new(|error| set_filter_value("notices", error.notification_id()))),
            ..FetchOptions::default()
        };

        let effects = tags().reduce(&mut slice, fetch_elems("tags", "missing/", options), &env);
        assert_eq!(
            resolve_effects(effects).await,
            vec![fetch_failure("tags"), set_filter_value("notices", "404_NOT_FOUND")]
        );
    }

    #[tokio::test]
    async fn successful_fetch_skips_the_error_action() {
        let transport = MockTransport::new().with_get(format!("{API}tags/"), json!([{"id": 1}]));
        let env = env_with(transport);
        let mut slice = CollectionSlice::default();
        let options = FetchOptions {
            on_error: Some(ErrorAction::new(|_| fetch_failure("websites"))),
            ..FetchOptions::default()
        };

        let effects = tags().reduce(&mut slice, fetch_elems("tags", "tags/", options), &env);
        assert_eq!(
            resolve_effects(effects).await,
            vec![fetch_success("tags", json!([{"id": 1}]), false)]
        );
    }

    #[tokio::test]
    async fn update_command_marks_busy_until_saved() {
        let saved = json!({"id": 2, "title": "Saved"});
        let transport = MockTransport::new().with_mutation_response(Ok(Some(saved.clone())));
        let env = env_with(transport.clone());
        let mut slice = with_records(CollectionSlice::default(), &[json!({"id": 2, "title": "Draft"})]);

        let effects = tags().reduce(
            &mut slice,
            create_update_elem("tags", "tags/", UpdateTarget::Id(RecordId::Int(2)), json!({"title": "Saved"})),
            &env,
        );
        assert!(slice.update_busy_ids.contains(&RecordId::Int(2)));

        for action in resolve_effects(effects).await {
            tags().reduce(&mut slice, action, &env);
        }

        assert!(slice.update_busy_ids.is_empty());
        assert_eq!(slice.records[0].data, saved);
        let mutation = &transport.mutations()[0];
        assert_eq!(mutation.method, Method::Patch);
        assert_eq!(mutation.url, format!("{API}tags/2/"));
    }

    #[tokio::test]
    async fn save_without_a_target_creates() {
        let transport = MockTransport::new().with_mutation_response(Ok(Some(json!({"id": 7, "title": "Fresh"}))));
        let env = env_with(transport.clone());
        let mut slice = CollectionSlice::default();

        let effects = tags().reduce(
            &mut slice,
            create_update_elem("tags", "tags/", UpdateTarget::None, json!({"title": "Fresh"})),
            &env,
        );
        let actions = resolve_effects(effects).await;
        assert!(matches!(
            actions[0].action,
            CollectionAction::SaveCompleted {
                id: UpdateTarget::New,
                ..
            }
        ));

        for action in actions {
            tags().reduce(&mut slice, action, &env);
        }

        assert_eq!(ids(&slice), vec![Some(RecordId::Int(7))]);
        assert_eq!(transport.mutations()[0].method, Method::Post);
        assert_eq!(transport.mutations()[0].url, format!("{API}tags/"));
    }

    #[tokio::test]
    async fn failed_save_records_the_error() {
        let error = TransportError::Status {
            status: 400,
            url: format!("{API}tags/"),
            message: "Bad Request".to_string(),
            body: Some(json!({"title": ["required"]})),
        };
        let transport = MockTransport::new().with_mutation_response(Err(error.clone()));
        let env = env_with(transport.clone());
        let mut slice = CollectionSlice::default();

        let effects = tags().reduce(&mut slice, create_update_elem("tags", "tags/", UpdateTarget::New, json!({})), &env);
        assert!(slice.update_busy_ids.is_empty());

        for action in resolve_effects(effects).await {
            tags().reduce(&mut slice, action, &env);
        }

        assert!(slice.records.is_empty());
        assert_eq!(slice.last_error, Some(error.to_string()));
        assert_eq!(transport.mutations()[0].method, Method::Post);
    }

    #[tokio::test]
    async fn delete_command_removes_after_success() {
        let transport = MockTransport::new();
        let env = env_with(transport.clone());
        let mut slice = with_records(CollectionSlice::default(), &[json!({"id": "a"}), json!({"id": "b"})]);

        let effects = tags().reduce(&mut slice, delete_elem("tags", "tags/", "a"), &env);
        assert!(slice.delete_busy_ids.contains(&RecordId::from("a")));

        for action in resolve_effects(effects).await {
            tags().reduce(&mut slice, action, &env);
        }

        assert_eq!(ids(&slice), vec![Some(RecordId::from("b"))]);
        assert!(slice.delete_busy_ids.is_empty());
        assert_eq!(transport.mutations()[0].url, format!("{API}tags/a/"));
    }

    #[test]
    fn collections_reducer_routes_by_namespace() {
        let state = CollectionsState::new()
            .with_collection("tags", CollectionConfig::new())
            .with_collection("websites", CollectionConfig::new());

        ReducerTest::new(CollectionsReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(fetch_busy("websites"))
            .when_action(fetch_busy("unknown"))
            .then_state(|state| {
                assert!(state.slice("websites").unwrap().is_fetching);
                assert!(!state.slice("tags").unwrap().is_fetching);
                assert!(state.slice("unknown").is_none());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }
}
