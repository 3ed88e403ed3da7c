//! Offset/limit pagination derived from `next`/`previous` cursors
//!
//! A paginated envelope carries `count`, `next` and `previous`. The cursors
//! are URLs whose query strings hold `limit` and `offset`; from them the page
//! size, the current page and a window of at most nine page links are
//! reconstructed.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use url::{Url, form_urlencoded};

/// Number of page links shown around the active page
pub const PAGE_WINDOW: i64 = 9;

/// A query parameter value; `limit` and `offset` are integers when they parse
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Integer value
    Int(i64),
    /// Anything else
    Text(String),
}

impl ParamValue {
    /// Integer view of the value
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Text(text) => text.parse().ok(),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Query parameters in their original order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams(Vec<(String, ParamValue)>);

impl QueryParams {
    /// Empty parameter list
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Builder form of [`QueryParams::set`]
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Parse the query of a cursor
    ///
    /// Accepts an absolute URL, a bare `?a=b` string, or `a=b` pairs. A key
    /// seen twice keeps its first position and its last value.
    #[must_use]
    pub fn parse(cursor: &str) -> Self {
        let query = match Url::parse(cursor) {
            Ok(url) => url.query().unwrap_or_default().to_string(),
            Err(_) => cursor
                .split_once('?')
                .map_or(cursor, |(_, query)| query)
                .to_string(),
        };

        let mut params = Self::new();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let value = if key == "limit" || key == "offset" {
                value.parse().map_or_else(|_| ParamValue::Text(value.to_string()), ParamValue::Int)
            } else {
                ParamValue::Text(value.into_owned())
            };
            params.set(key.into_owned(), value);
        }
        params
    }

    /// Replace `key` in place, or append it
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((key, value)),
        }
    }

    /// Value of `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.iter().find(|(existing, _)| existing == key).map(|(_, value)| value)
    }

    /// `limit` as an integer
    #[must_use]
    pub fn limit(&self) -> Option<i64> {
        self.get("limit").and_then(ParamValue::as_int)
    }

    /// `offset` as an integer
    #[must_use]
    pub fn offset(&self) -> Option<i64> {
        self.get("offset").and_then(ParamValue::as_int)
    }

    /// Pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// True when there are no parameters
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encode as `?a=b&c=d` (empty string when there are no parameters)
    #[must_use]
    pub fn to_query_string(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let mut serializer = form_urlencoded::Serializer::new(String::from("?"));
        for (key, value) in self.iter() {
            serializer.append_pair(key, &value.to_string());
        }
        serializer.finish()
    }
}

/// One entry of the page-link window
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDescriptor {
    /// Zero-based page index
    pub page_number: u64,
    /// True for the page currently displayed
    pub active: bool,
    /// Parameters that fetch this page
    pub query_params: QueryParams,
}

impl PageDescriptor {
    /// Encoded query for this page
    #[must_use]
    pub fn query_string(&self) -> String {
        self.query_params.to_query_string()
    }
}

/// Pagination metadata of a slice
///
/// The page fields are `None` when the cursors do not carry a usable
/// `limit`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInfo {
    /// Total number of records on the server
    pub count: u64,
    /// Cursor to the following page
    pub next: Option<String>,
    /// Cursor to the preceding page
    pub previous: Option<String>,
    /// Parsed `next` query
    pub next_query_params: Option<QueryParams>,
    /// Parsed `previous` query
    pub previous_query_params: Option<QueryParams>,
    /// Records per page
    pub page_size: Option<u64>,
    /// Number of pages
    pub page_count: Option<u64>,
    /// Zero-based index of the displayed page
    pub page_number: Option<u64>,
    /// Window of page links around the displayed page
    pub pages: Vec<PageDescriptor>,
}

impl PaginationInfo {
    /// Build pagination from envelope fields
    ///
    /// `next` wins over `previous` when both are present. A non-numeric
    /// `count` counts as zero; a non-string cursor counts as absent.
    #[must_use]
    pub fn from_envelope(count: &Value, next: &Value, previous: &Value) -> Self {
        let next = next.as_str().map(str::to_string);
        let previous = previous.as_str().map(str::to_string);
        let mut info = Self {
            count: count.as_u64().unwrap_or_default(),
            next_query_params: next.as_deref().map(QueryParams::parse),
            previous_query_params: previous.as_deref().map(QueryParams::parse),
            next,
            previous,
            ..Self::default()
        };
        info.compute_pages();
        info
    }

    /// Cursor parameters used to rebuild page links (`next` preferred)
    #[must_use]
    pub fn base_params(&self) -> Option<&QueryParams> {
        self.next_query_params
            .as_ref()
            .or(self.previous_query_params.as_ref())
    }

    /// Account for a record removed on the server
    pub fn record_removed(&mut self) {
        self.count = self.count.saturating_sub(1);
    }

    fn compute_pages(&mut self) {
        let Some(base) = self.base_params().cloned() else {
            return;
        };
        let Some(limit) = base.limit().filter(|limit| *limit > 0) else {
            tracing::debug!(count = self.count, "Pagination cursors carry no usable limit");
            return;
        };

        let offset = base.offset().unwrap_or_default();
        let shifted = if self.next_query_params.is_some() {
            offset.checked_sub(limit)
        } else {
            offset.checked_add(limit)
        };
        let Some(page_number) = shifted.map(|shifted| (shifted / limit).max(0)) else {
            tracing::debug!(offset, limit, "Pagination cursor offset out of range");
            return;
        };
        let page_count = i64::try_from(self.count.div_ceil(limit.unsigned_abs())).unwrap_or(i64::MAX);

        let (first, last) = window(page_number, page_count);
        let pages = (first..last)
            .map(|index| {
                index.checked_mul(limit).map(|page_offset| PageDescriptor {
                    page_number: index.unsigned_abs(),
                    active: index == page_number,
                    query_params: base.clone().with("offset", page_offset),
                })
            })
            .collect::<Option<Vec<_>>>();
        let Some(pages) = pages else {
            tracing::debug!(limit, page_count, "Page offsets out of range");
            return;
        };
        self.pages = pages;
        self.page_size = Some(limit.unsigned_abs());
        self.page_count = Some(page_count.unsigned_abs());
        self.page_number = Some(page_number.unsigned_abs());
    }
}

/// Half-open page range shown around `page_number`
///
/// Four pages lead and five trail the active page; near either end the
/// unused slots move to the other side so nine links stay visible.
#[must_use]
pub fn window(page_number: i64, page_count: i64) -> (i64, i64) {
    let to_left = page_number;
    let to_right = page_count.saturating_sub(page_number);
    let shown_left = if to_right < 5 { PAGE_WINDOW.saturating_sub(to_right) } else { 4 };
    let shown_right = if to_left < 4 { PAGE_WINDOW.saturating_sub(to_left) } else { 5 };
    let first = page_number.saturating_sub(shown_left).max(0);
    let last = page_number.saturating_add(shown_right).min(page_count);
    (first.min(last), last)
}
