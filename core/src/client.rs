//! Stateless HTTP request builder and response parser for the item API.
//!
//! # Design
//! `ItemsClient` holds only an [`ApiConfig`] and carries no mutable state
//! between calls. Each REST operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The caller executes the actual HTTP round-trip, keeping
//! the client deterministic and free of I/O dependencies.
//!
//! Error responses are reduced to the server's `detail` message when the
//! body carries one (the backend's error envelope), falling back to the raw
//! body otherwise.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Item, ItemDraft, ItemPage, ListQuery};

/// Characters escaped in the search query parameter.
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

/// Explicit client configuration, passed to [`ItemsClient::new`] at
/// construction instead of living in any process-wide default.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    base_url: String,
}

impl ApiConfig {
    /// `base_url` is the API root the `items/` resource hangs off, e.g.
    /// `http://localhost:8000/api`; a trailing slash is tolerated.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Synchronous, stateless client for the item API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network. The caller is responsible for executing the HTTP
/// round-trip between `build_*` and `parse_*`.
#[derive(Debug, Clone)]
pub struct ItemsClient {
    config: ApiConfig,
}

impl ItemsClient {
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    /// Collection URL; the backend routes with trailing slashes.
    fn items_url(&self) -> String {
        format!("{}/items/", self.config.base_url)
    }

    fn item_url(&self, id: u64) -> String {
        format!("{}/items/{id}/", self.config.base_url)
    }

    pub fn build_list(&self, query: &ListQuery) -> HttpRequest {
        let mut url = format!(
            "{}?page={}&page_size={}",
            self.items_url(),
            query.page,
            query.page_size
        );
        if !query.search.is_empty() {
            url.push_str(&format!(
                "&search={}",
                utf8_percent_encode(&query.search, QUERY)
            ));
        }
        HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create(&self, draft: &ItemDraft) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(draft).map_err(|e| ApiError::Encode(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.items_url(),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn build_update(&self, id: u64, draft: &ItemDraft) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(draft).map_err(|e| ApiError::Encode(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Put,
            url: self.item_url(id),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn build_delete(&self, id: u64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url: self.item_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list(&self, response: HttpResponse) -> Result<ItemPage, ApiError> {
        check_status(&response, 200)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub fn parse_create(&self, response: HttpResponse) -> Result<Item, ApiError> {
        check_status(&response, 201)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub fn parse_update(&self, response: HttpResponse) -> Result<Item, ApiError> {
        check_status(&response, 200)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)?;
        Ok(())
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    let detail = error_detail(&response.body);
    if response.status == 404 {
        return Err(ApiError::NotFound { detail });
    }
    Err(ApiError::Http {
        status: response.status,
        detail,
    })
}

/// The server's `detail` message when the error body carries one; otherwise
/// the raw body (the validation error shape has per-field messages instead).
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
        .unwrap_or_else(|| body.to_string())
}
