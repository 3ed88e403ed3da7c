//! In-memory book catalog API for the collections demo
//!
//! [`CatalogApi`] answers the requests a collection store makes the way a
//! paginated REST backend would: list endpoints return a `results`
//! envelope with `count`, `next` and `previous`, mutations echo the stored
//! record.

use composable_collections::QueryParams;
use composable_collections_core::environment::{
    Method, MutationRequest, Transport, TransportError, TransportFuture,
};
use serde_json::{Map, Value, json};
use std::sync::{Mutex, PoisonError};

/// Page size used when a request has no `limit`
pub const DEFAULT_LIMIT: i64 = 3;

/// Collection path of the books endpoint
pub const BOOKS_PATH: &str = "books/";

/// A books endpoint backed by a vector
#[derive(Debug)]
pub struct CatalogApi {
    base_url: String,
    inner: Mutex<Catalog>,
}

#[derive(Debug)]
struct Catalog {
    books: Vec<Value>,
    next_id: i64,
}

impl CatalogApi {
    /// Catalog served under `base_url`, seeded with a few books
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let books = vec![
            json!({"id": 1, "title": "Dune", "year": 1965, "author": {"name": "Frank Herbert"}}),
            json!({"id": 2, "title": "Neuromancer", "year": 1984, "author": {"name": "William Gibson"}}),
            json!({"id": 3, "title": "Hyperion", "year": 1989, "author": {"name": "Dan Simmons"}}),
            json!({"id": 4, "title": "Dune Messiah", "year": 1969, "author": {"name": "Frank Herbert"}}),
            json!({"id": 5, "title": "Solaris", "year": 1961, "author": {"name": "Stanislaw Lem"}}),
            json!({"id": 6, "title": "The Dispossessed", "year": 1974, "author": {"name": "Ursula K. Le Guin"}}),
            json!({"id": 7, "title": "Foundation", "year": 1951, "author": {"name": "Isaac Asimov"}}),
        ];
        Self {
            base_url: base_url.into(),
            inner: Mutex::new(Catalog { books, next_id: 8 }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Catalog> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn path<'a>(&self, url: &'a str) -> Result<&'a str, TransportError> {
        url.strip_prefix(&self.base_url)
            .map(|rest| rest.split_once('?').map_or(rest, |(path, _)| path))
            .ok_or_else(|| not_found(url))
    }

    fn list(&self, url: &str) -> Value {
        let query = QueryParams::parse(url);
        let limit = query.limit().filter(|limit| *limit > 0).unwrap_or(DEFAULT_LIMIT);
        let offset = query.offset().unwrap_or_default().max(0);

        let catalog = self.lock();
        let count = i64::try_from(catalog.books.len()).unwrap_or(i64::MAX);
        let results: Vec<Value> = catalog
            .books
            .iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect();

        let page_url = |offset: i64| {
            let params = QueryParams::new().with("limit", limit);
            let params = if offset > 0 { params.with("offset", offset) } else { params };
            format!("{}{BOOKS_PATH}{}", self.base_url, params.to_query_string())
        };
        let next = (offset + limit < count).then(|| page_url(offset + limit));
        let previous = (offset > 0).then(|| page_url((offset - limit).max(0)));

        json!({
            "count": count,
            "next": next,
            "previous": previous,
            "results": results,
        })
    }

    fn create(&self, body: Option<Value>) -> Value {
        let mut catalog = self.lock();
        let mut book = match body {
            Some(Value::Object(fields)) => fields,
            _ => Map::new(),
        };
        book.insert("id".to_string(), json!(catalog.next_id));
        catalog.next_id += 1;

        let book = Value::Object(book);
        catalog.books.push(book.clone());
        book
    }

    fn update(&self, url: &str, id: i64, body: Option<Value>) -> Result<Value, TransportError> {
        let mut catalog = self.lock();
        let book = catalog
            .books
            .iter_mut()
            .find(|book| book["id"] == json!(id))
            .ok_or_else(|| not_found(url))?;
        if let (Value::Object(book), Some(Value::Object(changes))) = (&mut *book, body) {
            book.extend(changes);
        }
        Ok(book.clone())
    }

    fn delete(&self, url: &str, id: i64) -> Result<(), TransportError> {
        let mut catalog = self.lock();
        let before = catalog.books.len();
        catalog.books.retain(|book| book["id"] != json!(id));
        if catalog.books.len() == before {
            return Err(not_found(url));
        }
        Ok(())
    }
}

fn not_found(url: &str) -> TransportError {
    TransportError::Status {
        status: 404,
        url: url.to_string(),
        message: "Not Found".to_string(),
        body: Some(json!({"detail": "Not found."})),
    }
}

/// `books/<id>/` into the id
fn record_id(path: &str) -> Option<i64> {
    path.strip_prefix(BOOKS_PATH)?.trim_end_matches('/').parse().ok()
}

impl Transport for CatalogApi {
    fn get<'a>(&'a self, url: &'a str) -> TransportFuture<'a, Value> {
        Box::pin(async move {
            match self.path(url)? {
                BOOKS_PATH => Ok(self.list(url)),
                _ => Err(not_found(url)),
            }
        })
    }

    fn send(&self, request: MutationRequest) -> TransportFuture<'_, Option<Value>> {
        Box::pin(async move {
            let MutationRequest { method, url, body } = request;
            tracing::info!(%method, %url, "Catalog mutation");
            let path = self.path(&url)?;

            match (method, record_id(path)) {
                (Method::Post, None) if path == BOOKS_PATH => Ok(Some(self.create(body))),
                (Method::Patch, Some(id)) => self.update(&url, id, body).map(Some),
                (Method::Delete, Some(id)) => self.delete(&url, id).map(|()| None),
                _ => Err(not_found(&url)),
            }
        })
    }
}
