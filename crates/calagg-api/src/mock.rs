//! Recording transport for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::transport::{BoxFuture, HttpRequest, HttpResponse, Transport, TransportError};

/// Returns queued responses in FIFO order and records every request.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    recorded: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, response: HttpResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn enqueue_json(&self, status: u16, body: serde_json::Value) {
        self.enqueue(
            HttpResponse::new(status, body.to_string())
                .with_header("Content-Type", "application/json"),
        );
    }

    pub fn request_count(&self) -> usize {
        self.recorded.lock().unwrap().len()
    }

    pub fn take_requests(&self) -> Vec<HttpRequest> {
        self.recorded.lock().unwrap().drain(..).collect()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, TransportError>> {
        self.recorded.lock().unwrap().push(request);
        let next = self.responses.lock().unwrap().pop_front();
        Box::pin(async move { next.ok_or_else(|| TransportError::new("no queued response")) })
    }
}
