//! In-memory transport for tests.
//!
//! [`MockConnector`] hands out transports that record every request (with the
//! body bytes the caller produced) and answer with queued [`MockResponse`]s.
//! When the queue is empty a bare `200 OK` is returned. Clones share state,
//! so a test keeps one handle and gives another to the request context.

use std::collections::VecDeque;
use std::sync::Arc;

use http::Method;
use parking_lot::Mutex;

use crate::error::TransportError;
use crate::transport::{
    ConnectionSettings, Connector, Exchange, RequestBody, Transport, TransportRequest,
};

/// A canned response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockResponse {
    /// Status code.
    pub status: u16,
    /// Reason phrase.
    pub reason: String,
    /// Header `(name, value)` pairs.
    pub headers: Vec<(String, String)>,
    /// Body bytes.
    pub body: Vec<u8>,
}

impl MockResponse {
    /// A response with `status`, `reason` and no headers or body.
    pub fn new(status: u16, reason: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// `200 OK`.
    #[must_use]
    pub fn ok() -> Self {
        Self::new(200, "OK")
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}

/// A request as seen by the mock transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Headers in send order, values as text.
    pub headers: Vec<(String, String)>,
    /// Body framing.
    pub body_mode: RequestBody,
    /// Body bytes pulled from the caller.
    pub body: Vec<u8>,
    /// Whether a fresh connection was requested.
    pub fresh_connect: bool,
}

impl RecordedRequest {
    /// Value of the first header called `name` (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Header names in send order.
    #[must_use]
    pub fn header_names(&self) -> Vec<&str> {
        self.headers.iter().map(|(n, _)| n.as_str()).collect()
    }
}

#[derive(Debug, Default)]
struct MockState {
    responses: VecDeque<MockResponse>,
    requests: Vec<RecordedRequest>,
    connects: Vec<ConnectionSettings>,
    resets: usize,
    chunk_size: Option<usize>,
    fail_connect: Option<String>,
}

/// Connector producing [`MockTransport`]s that share one recorder.
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    state: Arc<Mutex<MockState>>,
}

impl MockConnector {
    /// An empty mock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response.
    pub fn push_response(&self, response: MockResponse) {
        self.state.lock().responses.push_back(response);
    }

    /// Deliver response bodies in chunks of at most `size` bytes.
    pub fn set_chunk_size(&self, size: usize) {
        self.state.lock().chunk_size = Some(size.max(1));
    }

    /// Make the next connects fail with `message`.
    pub fn fail_connect(&self, message: impl Into<String>) {
        self.state.lock().fail_connect = Some(message.into());
    }

    /// All requests performed so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }

    /// The most recent request.
    #[must_use]
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state.lock().requests.last().cloned()
    }

    /// Settings of every transport created so far.
    #[must_use]
    pub fn connects(&self) -> Vec<ConnectionSettings> {
        self.state.lock().connects.clone()
    }

    /// Number of transport resets before reuse.
    #[must_use]
    pub fn resets(&self) -> usize {
        self.state.lock().resets
    }
}

impl Connector for MockConnector {
    fn connect(&self, settings: &ConnectionSettings) -> Result<Box<dyn Transport>, TransportError> {
        let mut state = self.state.lock();
        if let Some(message) = state.fail_connect.clone() {
            return Err(TransportError::Connect(message));
        }
        state.connects.push(settings.clone());
        Ok(Box::new(MockTransport {
            state: Arc::clone(&self.state),
        }))
    }
}

/// Transport created by [`MockConnector`].
#[derive(Debug)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl Transport for MockTransport {
    fn perform(
        &mut self,
        request: &TransportRequest,
        exchange: &mut dyn Exchange,
    ) -> Result<(), TransportError> {
        let body = pull_body(exchange, request.body)?;

        let (response, chunk_size) = {
            let mut state = self.state.lock();
            state.requests.push(RecordedRequest {
                method: request.method.clone(),
                url: request.url.clone(),
                headers: request
                    .headers
                    .iter()
                    .map(|(n, v)| {
                        (
                            n.as_str().to_owned(),
                            String::from_utf8_lossy(v.as_bytes()).into_owned(),
                        )
                    })
                    .collect(),
                body_mode: request.body,
                body,
                fresh_connect: request.fresh_connect,
            });
            let response = state.responses.pop_front().unwrap_or_else(MockResponse::ok);
            (response, state.chunk_size)
        };

        let status_line = format!("HTTP/1.1 {} {}\r\n", response.status, response.reason);
        deliver_header(exchange, status_line.as_bytes())?;
        let has_length = response
            .headers
            .iter()
            .any(|(n, _)| n.eq_ignore_ascii_case("content-length"));
        if !has_length {
            let line = format!("Content-Length: {}\r\n", response.body.len());
            deliver_header(exchange, line.as_bytes())?;
        }
        for (name, value) in &response.headers {
            deliver_header(exchange, format!("{name}: {value}\r\n").as_bytes())?;
        }
        deliver_header(exchange, b"\r\n")?;

        let chunk_size = chunk_size.unwrap_or(response.body.len().max(1));
        for chunk in response.body.chunks(chunk_size) {
            if exchange.on_write(chunk) < chunk.len() {
                return Err(TransportError::Aborted { stage: "write" });
            }
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.state.lock().resets += 1;
    }
}

fn pull_body(exchange: &mut dyn Exchange, mode: RequestBody) -> Result<Vec<u8>, TransportError> {
    let limit = match mode {
        RequestBody::Empty => return Ok(Vec::new()),
        RequestBody::Sized(len) => len,
        RequestBody::Chunked => u64::MAX,
    };
    let mut body = Vec::new();
    let mut chunk = [0_u8; 4096];
    while (body.len() as u64) < limit {
        let rest = limit - body.len() as u64;
        let want = usize::try_from(rest).map_or(chunk.len(), |r| r.min(chunk.len()));
        let n = exchange.on_read(&mut chunk[..want])?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    if let RequestBody::Sized(expected) = mode
        && body.len() as u64 != expected
    {
        return Err(TransportError::ShortBody {
            expected,
            actual: body.len() as u64,
        });
    }
    Ok(body)
}

fn deliver_header(exchange: &mut dyn Exchange, line: &[u8]) -> Result<(), TransportError> {
    if exchange.on_header(line) < line.len() {
        return Err(TransportError::Aborted { stage: "header" });
    }
    Ok(())
}
