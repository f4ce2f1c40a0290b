//! HTTP requests and responses as plain data.
//!
//! # Design
//! The core builds `HttpRequest` values and interprets `HttpResponse`
//! values without touching the network; a [`Transport`](crate::transport)
//! implementation executes the round-trip in between. This keeps every
//! state transition deterministic and testable against hand-written
//! responses, and makes the point where a request is in flight explicit in
//! the API.
//!
//! All fields are owned (`String`, `Vec`) so requests and responses can be
//! moved freely across threads and stored in tickets.

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// An HTTP request described as plain data. The `url` is absolute, already
/// carrying the configured base URL and any query string.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data, as produced by a transport.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Bare response with the given status and body; headers are rarely
    /// relevant to this API.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}
