//! CLI demo: a paginated book catalog kept in a collection store
//!
//! Set `API_URL` and `CONFIG_ENV` to change the configured API; the
//! in-memory catalog answers whatever base URL is configured.

use catalog::{BOOKS_PATH, CatalogApi};
use composable_collections::action::{
    FetchOptions, create_update_elem, delete_elem, fetch_elems, set_expand_id, set_filter_value, set_sort_key,
};
use composable_collections::{
    ApiConfig, CollectionConfig, CollectionEnvironment, CollectionSlice, CollectionsReducer, CollectionsState,
    ExpandTarget, NamespacedAction, QueryParams, RecordId, UpdateTarget, selectors,
};
use composable_collections_core::environment::SystemClock;
use composable_collections_runtime::Store;
use serde_json::json;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_API_URL: &str = "http://catalog.local/api/";
const BOOKS: &str = "books";

type CatalogStore = Store<CollectionsState, NamespacedAction, CollectionEnvironment, CollectionsReducer>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog=info,composable_collections=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let api = ApiConfig::from_env().unwrap_or_else(|error| {
        tracing::info!(%error, "Falling back to the built-in API URL");
        ApiConfig::new(DEFAULT_API_URL)
    });
    println!("=== Catalog Example ({}) ===\n", api.environment);

    let transport = Arc::new(CatalogApi::new(api.base_url.clone()));
    let env = CollectionEnvironment::new(Arc::new(SystemClock), transport, api);
    let state = CollectionsState::new().with_collection(
        BOOKS,
        CollectionConfig::paginated().filter_on(["title", "author__name"]),
    );
    let store = Store::new(state, CollectionsReducer::new(), env);

    println!("Fetching the first page...");
    let first_page = FetchOptions {
        query: QueryParams::new().with("limit", 3),
        ..FetchOptions::default()
    };
    send(&store, fetch_elems(BOOKS, BOOKS_PATH, first_page)).await?;
    print_view(&store).await?;

    println!("\nAppending the next page...");
    let next_page = store
        .state(|s| {
            s.slice(BOOKS)
                .and_then(selectors::pagination)
                .and_then(|pagination| pagination.next_query_params.clone())
        })
        .await;
    if let Some(query) = next_page {
        let options = FetchOptions {
            query,
            append: true,
            ..FetchOptions::default()
        };
        send(&store, fetch_elems(BOOKS, BOOKS_PATH, options)).await?;
    }
    print_view(&store).await?;

    println!("\nFiltering on 'herbert', sorted by year descending...");
    send(&store, set_filter_value(BOOKS, "herbert")).await?;
    send(&store, set_sort_key(BOOKS, "year")).await?;
    send(&store, set_sort_key(BOOKS, "year")).await?;
    print_view(&store).await?;

    println!("\nClearing the filter and sort, adding 'Children of Dune'...");
    send(&store, set_filter_value(BOOKS, "")).await?;
    send(&store, set_sort_key(BOOKS, "year")).await?;
    let book = json!({"title": "Children of Dune", "year": 1976, "author": {"name": "Frank Herbert"}});
    send(&store, create_update_elem(BOOKS, BOOKS_PATH, UpdateTarget::New, book)).await?;
    print_view(&store).await?;

    println!("\nRenaming book 2 and deleting book 3...");
    let rename = create_update_elem(
        BOOKS,
        BOOKS_PATH,
        UpdateTarget::Id(RecordId::Int(2)),
        json!({"title": "Neuromancer (Sprawl #1)"}),
    );
    send(&store, rename).await?;
    send(&store, delete_elem(BOOKS, BOOKS_PATH, 3)).await?;
    send(&store, set_expand_id(BOOKS, ExpandTarget::Id(RecordId::Int(2)))).await?;
    print_view(&store).await?;

    println!("\n=== Demo Complete ===");
    Ok(())
}

async fn send(store: &CatalogStore, action: NamespacedAction) -> Result<(), Box<dyn std::error::Error>> {
    tracing::debug!(action = %action, "Dispatching");
    let mut handle = store.send(action).await?;
    handle.wait().await;
    Ok(())
}

async fn print_view(store: &CatalogStore) -> Result<(), Box<dyn std::error::Error>> {
    let slice = store
        .state(|s| s.slice(BOOKS).cloned())
        .await
        .ok_or("books collection is not registered")?;
    print_slice(&slice)
}

fn print_slice(slice: &CollectionSlice) -> Result<(), Box<dyn std::error::Error>> {
    let view = selectors::derived_view(slice)?;
    let expanded = selectors::expand_id(slice);

    println!("  {} of {} loaded books shown", view.len(), selectors::total_count(slice));
    for record in view {
        let marker = match (expanded, record.id()) {
            (ExpandTarget::All, _) => "v",
            (ExpandTarget::Id(id), Some(record_id)) if *id == record_id => "v",
            _ => ">",
        };
        println!(
            "  {marker} [{}] {} ({}, {})",
            record.data["id"], record.data["title"], record.data["author"]["name"], record.data["year"]
        );
    }

    if let Some(pagination) = selectors::pagination(slice) {
        let pages: Vec<String> = pagination
            .pages
            .iter()
            .map(|page| {
                if page.active {
                    format!("[{}]", page.page_number + 1)
                } else {
                    (page.page_number + 1).to_string()
                }
            })
            .collect();
        println!("  pages: {} (total {} books on server)", pages.join(" "), pagination.count);
    }
    if let Some(error) = &slice.last_error {
        println!("  last error: {error}");
    }
    Ok(())
}
