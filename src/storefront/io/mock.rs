//! # Mock I/O Implementations
//!
//! In-memory transports and clipboards for driving the page controllers in tests.
//! Every request is recorded so tests can assert on paths, headers and bodies.

use super::{Clipboard, Method, Transport, TransportRequest, TransportResponse};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Canned reply for a mocked route
#[derive(Debug, Clone)]
pub struct MockReply {
    status: u16,
    body: String,
    delay: Option<Duration>,
    fail: bool,
}

impl MockReply {
    pub fn json(body: serde_json::Value) -> Self {
        Self::status(200, &body.to_string())
    }

    pub fn html(body: &str) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: None,
            fail: false,
        }
    }

    /// A transport-level failure (connection refused and the like)
    pub fn fail() -> Self {
        Self {
            fail: true,
            ..Self::status(0, "")
        }
    }

    /// Hold the reply back for `delay` before answering
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Debug, Clone)]
struct Route {
    method: Method,
    target: String,
    reply: MockReply,
    once: bool,
}

impl Route {
    /// Targets with a query string match path and query; bare paths match any query
    fn matches(&self, request: &TransportRequest) -> bool {
        if self.method != request.method {
            return false;
        }
        match self.target.split_once('?') {
            Some((path, query)) => {
                request.url.path() == path && request.url.query() == Some(query)
            }
            None => request.url.path() == self.target,
        }
    }
}

/// Transport answering from a route table
#[derive(Clone, Default)]
pub struct MockTransport {
    routes: Arc<Mutex<Vec<Route>>>,
    requests: Arc<Mutex<Vec<TransportRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn add_route(&self, method: Method, target: &str, reply: MockReply, once: bool) {
        self.routes.lock().unwrap().push(Route {
            method,
            target: target.to_string(),
            reply,
            once,
        });
    }

    /// Answer every matching request with `reply`
    pub fn on(&self, method: Method, target: &str, reply: MockReply) -> &Self {
        self.add_route(method, target, reply, false);
        self
    }

    /// Answer only the next matching request; one-shot routes win over standing ones,
    /// and among standing routes the most recently added wins
    pub fn once(&self, method: Method, target: &str, reply: MockReply) -> &Self {
        self.add_route(method, target, reply, true);
        self
    }

    /// All requests received so far
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests whose path equals `path`
    pub fn requests_to(&self, path: &str) -> Vec<TransportRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.url.path() == path)
            .collect()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    fn take_reply(&self, request: &TransportRequest) -> Option<MockReply> {
        let mut routes = self.routes.lock().unwrap();
        if let Some(index) = routes.iter().position(|r| r.once && r.matches(request)) {
            return Some(routes.remove(index).reply);
        }
        routes
            .iter()
            .rev()
            .find(|r| r.matches(request))
            .map(|r| r.reply.clone())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self.take_reply(&request).unwrap_or_else(|| {
            tracing::debug!("mock transport: no route for {}", request.url);
            MockReply::status(404, "")
        });

        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }
        if reply.fail {
            return Err(anyhow!("connection refused: {}", request.url));
        }
        Ok(TransportResponse {
            status: reply.status,
            body: reply.body,
        })
    }
}

/// Clipboard recording every copy, with switchable availability and failures
#[derive(Clone, Default)]
pub struct MockClipboard {
    secure_context: bool,
    fail_async: bool,
    fail_exec: bool,
    copies: Arc<Mutex<Vec<(String, &'static str)>>>,
}

impl MockClipboard {
    pub fn secure() -> Self {
        Self {
            secure_context: true,
            ..Self::default()
        }
    }

    pub fn insecure() -> Self {
        Self::default()
    }

    pub fn failing_async(mut self) -> Self {
        self.fail_async = true;
        self
    }

    pub fn failing_exec(mut self) -> Self {
        self.fail_exec = true;
        self
    }

    /// Copied texts with the path that copied them (`"async"` or `"exec"`)
    pub fn copies(&self) -> Vec<(String, &'static str)> {
        self.copies.lock().unwrap().clone()
    }

    fn record(&self, text: &str, via: &'static str) {
        self.copies.lock().unwrap().push((text.to_string(), via));
    }
}

#[async_trait]
impl Clipboard for MockClipboard {
    fn async_api_available(&self) -> bool {
        self.secure_context
    }

    async fn write_text(&self, text: &str) -> Result<()> {
        if self.fail_async {
            return Err(anyhow!("clipboard write denied"));
        }
        self.record(text, "async");
        Ok(())
    }

    fn exec_copy(&self, text: &str) -> Result<()> {
        if self.fail_exec {
            return Err(anyhow!("copy command unsupported"));
        }
        self.record(text, "exec");
        Ok(())
    }
}
