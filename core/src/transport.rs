//! The black-box HTTP executor between `build_*` and `apply_*`.
//!
//! # Design
//! A [`Transport`] turns one [`HttpRequest`] into one [`HttpResponse`] or a
//! [`TransportError`]; everything above it treats HTTP as data. Non-success
//! status codes are responses, not errors — status interpretation belongs
//! to the client's `parse_*` methods. The blanket impl for closures lets
//! tests script responses without a network.

use thiserror::Error;

use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// The round-trip could not complete at all (connection refused, DNS
/// failure, broken stream). Carries only a message; callers do not branch
/// on transport failure shape.
#[derive(Debug, Clone, Error)]
#[error("transport failed: {0}")]
pub struct TransportError(pub String);

/// Executes one HTTP round-trip.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError>,
{
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

/// Production transport over a blocking ureq agent.
///
/// Configured with `http_status_as_error(false)` so 4xx/5xx responses come
/// back as data rather than `Err`.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let result = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => self.agent.get(&request.url).call(),
            (HttpMethod::Delete, _) => self.agent.delete(&request.url).call(),
            (HttpMethod::Post, Some(body)) => self
                .agent
                .post(&request.url)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Post, None) => self.agent.post(&request.url).send_empty(),
            (HttpMethod::Put, Some(body)) => self
                .agent
                .put(&request.url)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Put, None) => self.agent.put(&request.url).send_empty(),
        };

        let mut response = result.map_err(|e| TransportError(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_act_as_transports() {
        let transport = |req: &HttpRequest| {
            assert_eq!(req.method, HttpMethod::Get);
            Ok(HttpResponse::new(200, "{}"))
        };
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: "http://test/items/".to_string(),
            headers: Vec::new(),
            body: None,
        };
        let response = transport.execute(&request).unwrap();
        assert_eq!(response.status, 200);
    }

    #[test]
    fn connection_refused_is_a_transport_error() {
        // Port 1 is never listening on loopback.
        let transport = UreqTransport::new();
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: "http://127.0.0.1:1/items/".to_string(),
            headers: Vec::new(),
            body: None,
        };
        assert!(transport.execute(&request).is_err());
    }
}
