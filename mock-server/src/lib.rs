//! In-memory stand-in for the item backend.
//!
//! Reproduces the behaviors of the real REST service that the sync core
//! depends on: page-number pagination with a `{count, next, previous,
//! results}` envelope, `page_size` capped at 100, 404 `"Invalid page."` for
//! out-of-range pages, whitespace/comma-split search terms matched against
//! name and category, and field-presence validation with per-field error
//! bodies. Items are stored in insertion order under sequential ids, which
//! is also the listing order.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

/// Characters escaped when echoing the search term back in page links.
const QUERY: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'=')
    .add(b'?');

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub name: String,
    pub category: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// List response envelope, matching the backend's pagination output.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemPage {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<Item>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
}

#[derive(Debug, Default)]
pub struct Store {
    next_id: u64,
    items: BTreeMap<u64, Item>,
}

pub type Db = Arc<RwLock<Store>>;

type ApiFailure = (StatusCode, Json<Value>);

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/api/items/", get(list_items).post(create_item))
        .route(
            "/api/items/{id}/",
            get(get_item).put(update_item).delete(delete_item),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_items(
    State(db): State<Db>,
    Query(params): Query<ListParams>,
) -> Result<Json<ItemPage>, ApiFailure> {
    let search = params.search.unwrap_or_default();
    let page_size = effective_page_size(params.page_size);
    let page = params.page.unwrap_or(1);

    let store = db.read().await;
    let matching: Vec<&Item> = store
        .items
        .values()
        .filter(|item| matches_search(item, &search))
        .collect();
    let count = matching.len();
    let pages = page_count(count, page_size);

    tracing::debug!(page, page_size, search = %search, count, "list items");

    if page == 0 || page > pages {
        return Err(invalid_page());
    }

    let start = (page as usize - 1) * page_size as usize;
    let results: Vec<Item> = matching
        .into_iter()
        .skip(start)
        .take(page_size as usize)
        .cloned()
        .collect();

    Ok(Json(ItemPage {
        count: count as u64,
        next: (page < pages).then(|| page_url(page + 1, page_size, &search)),
        previous: (page > 1).then(|| page_url(page - 1, page_size, &search)),
        results,
    }))
}

async fn create_item(
    State(db): State<Db>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Item>), ApiFailure> {
    let (name, category, description) =
        validate_write(&body).map_err(|errors| (StatusCode::BAD_REQUEST, Json(errors)))?;

    let mut store = db.write().await;
    store.next_id += 1;
    let item = Item {
        id: store.next_id,
        name,
        category,
        description,
        created_at: Utc::now(),
    };
    store.items.insert(item.id, item.clone());
    tracing::info!(id = item.id, "created item");
    Ok((StatusCode::CREATED, Json(item)))
}

async fn get_item(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Item>, ApiFailure> {
    let store = db.read().await;
    store.items.get(&id).cloned().map(Json).ok_or_else(no_match)
}

async fn update_item(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Result<Json<Item>, ApiFailure> {
    let (name, category, description) =
        validate_write(&body).map_err(|errors| (StatusCode::BAD_REQUEST, Json(errors)))?;

    let mut store = db.write().await;
    let item = store.items.get_mut(&id).ok_or_else(no_match)?;
    item.name = name;
    item.category = category;
    item.description = description;
    tracing::info!(id, "updated item");
    Ok(Json(item.clone()))
}

async fn delete_item(State(db): State<Db>, Path(id): Path<u64>) -> Result<StatusCode, ApiFailure> {
    let mut store = db.write().await;
    match store.items.remove(&id) {
        Some(_) => {
            tracing::info!(id, "deleted item");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(no_match()),
    }
}

/// Apply the backend's page-size rules: default 10, silently capped at 100,
/// zero falls back to the default.
fn effective_page_size(requested: Option<u32>) -> u32 {
    match requested {
        Some(0) | None => DEFAULT_PAGE_SIZE,
        Some(n) => n.min(MAX_PAGE_SIZE),
    }
}

/// Number of pages for `count` matches; an empty collection still has one
/// (empty) page, so page 1 is always valid.
fn page_count(count: usize, page_size: u32) -> u32 {
    (count.div_ceil(page_size as usize) as u32).max(1)
}

/// Every whitespace- or comma-separated term must match name or category,
/// case-insensitively. An empty query matches everything.
fn matches_search(item: &Item, query: &str) -> bool {
    let name = item.name.to_lowercase();
    let category = item.category.to_lowercase();
    query.replace(',', " ").split_whitespace().all(|term| {
        let term = term.to_lowercase();
        name.contains(&term) || category.contains(&term)
    })
}

/// Relative link for the `next`/`previous` fields. The first page is the
/// bare URL without a `page` parameter, matching the backend's links.
fn page_url(page: u32, page_size: u32, search: &str) -> String {
    let mut url = String::from("/api/items/?");
    if page > 1 {
        url.push_str(&format!("page={page}&"));
    }
    url.push_str(&format!("page_size={page_size}"));
    if !search.is_empty() {
        url.push_str(&format!("&search={}", utf8_percent_encode(search, QUERY)));
    }
    url
}

/// Check a create/update payload for the two required text fields; returns
/// `(name, category, description)` trimmed, or a per-field error body.
fn validate_write(body: &Value) -> Result<(String, String, String), Value> {
    let mut errors = serde_json::Map::new();
    let name = required_text(body, "name", &mut errors);
    let category = required_text(body, "category", &mut errors);
    let description = match body.get("description") {
        None | Some(Value::Null) => Some(String::new()),
        Some(Value::String(s)) => Some(s.trim().to_string()),
        Some(_) => {
            errors.insert("description".to_string(), json!(["Not a valid string."]));
            None
        }
    };
    if !errors.is_empty() {
        return Err(Value::Object(errors));
    }
    // Unwraps cannot fail once errors is empty.
    Ok((name.unwrap(), category.unwrap(), description.unwrap()))
}

fn required_text(
    body: &Value,
    field: &str,
    errors: &mut serde_json::Map<String, Value>,
) -> Option<String> {
    match body.get(field) {
        None | Some(Value::Null) => {
            errors.insert(field.to_string(), json!(["This field is required."]));
            None
        }
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                errors.insert(field.to_string(), json!(["This field may not be blank."]));
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Some(_) => {
            errors.insert(field.to_string(), json!(["Not a valid string."]));
            None
        }
    }
}

fn invalid_page() -> ApiFailure {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "detail": "Invalid page." })),
    )
}

fn no_match() -> ApiFailure {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "detail": "No Item matches the given query." })),
    )
}
