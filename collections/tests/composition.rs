//! Collection slices embedded in a larger application state

#![allow(clippy::unwrap_used)] // Test code

use composable_collections::action::{fetch_success, set_filter_value, set_sort_key};
use composable_collections::{
    ApiConfig, CollectionConfig, CollectionEnvironment, CollectionReducer, CollectionSlice, FieldPath,
    NamespacedAction, selectors,
};
use composable_collections_core::composition::{combine_reducers, scope_reducer};
use composable_collections_core::reducer::Reducer;
use composable_collections_testing::{MockTransport, assertions, test_clock};
use serde_json::json;
use std::sync::Arc;

#[derive(Clone, Debug)]
struct AppState {
    tags: CollectionSlice,
    authors: CollectionSlice,
    user_name: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            tags: CollectionSlice::new(CollectionConfig::new().filter_on(["title"])),
            authors: CollectionSlice::new(CollectionConfig::new().filter_on(["name"])),
            user_name: "jerry".to_string(),
        }
    }
}

fn env() -> CollectionEnvironment {
    CollectionEnvironment::new(
        Arc::new(test_clock()),
        Arc::new(MockTransport::new()),
        ApiConfig::new("http://api.test/api/v1/"),
    )
}

fn app_reducer() -> impl Reducer<State = AppState, Action = NamespacedAction, Environment = CollectionEnvironment> {
    combine_reducers(vec![
        Box::new(scope_reducer(
            CollectionReducer::new("tags"),
            |app: &AppState| &app.tags,
            |app: &mut AppState, tags: CollectionSlice| app.tags = tags,
        )),
        Box::new(scope_reducer(
            CollectionReducer::new("authors"),
            |app: &AppState| &app.authors,
            |app: &mut AppState, authors: CollectionSlice| app.authors = authors,
        )),
    ])
}

#[test]
fn actions_reach_only_their_slice() {
    let reducer = app_reducer();
    let env = env();
    let mut state = AppState::default();

    let body = json!([{"id": 1, "name": "Kramer"}, {"id": 2, "name": "Elaine"}]);
    let effects = reducer.reduce(&mut state, fetch_success("authors", body, false), &env);
    assertions::assert_no_effects(&effects);

    reducer.reduce(&mut state, set_filter_value("tags", "gold"), &env);
    reducer.reduce(&mut state, set_sort_key("authors", "name"), &env);

    assert_eq!(state.authors.records.len(), 2);
    assert!(state.tags.records.is_empty());
    assert_eq!(selectors::filter_value(&state.tags), "gold");
    assert_eq!(selectors::filter_value(&state.authors), "");
    assert_eq!(selectors::sort_key(&state.authors), Some(&FieldPath::parse("name")));
    assert_eq!(selectors::sort_key(&state.tags), None);
    assert_eq!(state.user_name, "jerry");

    let names: Vec<_> = selectors::derived_view(&state.authors)
        .unwrap()
        .into_iter()
        .map(|record| record.data["name"].clone())
        .collect();
    assert_eq!(names, vec![json!("Elaine"), json!("Kramer")]);
}

#[test]
fn rejected_transition_leaves_the_app_state_alone() {
    let reducer = app_reducer();
    let env = env();
    let mut state = AppState::default();

    // `title` is the search field of the tags slice
    let body = json!([{"id": 1, "label": "untitled"}]);
    reducer.reduce(&mut state, fetch_success("tags", body, false), &env);

    assert!(state.tags.records.is_empty());
    assert!(!selectors::is_up_to_date(&state.tags));
}
