//! Shared test utilities for adapter testing
//!
//! Provides a scripted `MockTransport` that records every request it is
//! handed and replays queued responses in order.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::adapters::descriptor::DescriptorRegistry;
use crate::adapters::descriptor::ExchangeDescriptor;
use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::transport::{HttpRequest, HttpResponse, HttpTransport};

/// Transport double for dispatcher and adapter tests
#[derive(Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<VecDeque<ExchangeResult<HttpResponse>>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a 200 response with the given body
    pub fn ok(self, body: Value) -> Self {
        self.respond(200, body)
    }

    pub fn respond(self, status: u16, body: Value) -> Self {
        self.push(Ok(HttpResponse { status, body }));
        self
    }

    pub fn fail(self, error: ExchangeError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, response: ExchangeResult<HttpResponse>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Requests sent so far, oldest first
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests().pop().expect("no request was sent")
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> ExchangeResult<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ExchangeError::ConnectionFailed("no scripted response".into())))
    }
}

/// Built-in descriptor by id
pub fn builtin_descriptor(id: &str) -> Arc<ExchangeDescriptor> {
    Arc::new(DescriptorRegistry::builtin().unwrap().resolve(id).unwrap())
}
