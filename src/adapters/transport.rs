//! HTTP transport
//!
//! The dispatcher never touches sockets or wire bytes itself; it hands a
//! fully-built request to an `HttpTransport` and gets back the status and
//! the decoded body.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::adapters::descriptor::HttpMethod;
use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::types::create_http_client;
use crate::config::HttpConfig;

/// Request ready to be put on the wire
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// Status plus decoded body
///
/// A body that is not valid JSON is kept as `Value::String` with the raw
/// text so callers can still report it.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> ExchangeResult<HttpResponse>;
}

/// `reqwest`-backed transport with a pooled client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    /// Whole-request timeout `client` was built with, reported on expiry
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(exchange_name: &str, http: &HttpConfig) -> Self {
        Self {
            client: create_http_client(exchange_name, http),
            timeout: http.timeout(),
        }
    }

    pub fn with_client(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> ExchangeResult<HttpResponse> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let map_err = |e: reqwest::Error| ExchangeError::from_reqwest(e, self.timeout);
        let response = builder.send().await.map_err(map_err)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(map_err)?;

        tracing::trace!(status, bytes = text.len(), "HTTP response received");

        Ok(HttpResponse {
            status,
            body: decode_body(&text),
        })
    }
}

/// Decode a response body, keeping non-JSON text verbatim
fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
