//! Transport abstraction.
//!
//! A [`Transport`] performs one HTTP exchange at a time. It streams the
//! request body by pulling from an [`Exchange`], and pushes the response back
//! as raw header lines (status line first, then `Name: value\r\n` lines, then
//! an empty `\r\n` line) followed by body chunks.
//!
//! Transports are created by a [`Connector`], which lets the request context
//! open a fresh connection whenever its connection settings change or reuse
//! is disabled. [`HttpConnector`](crate::blocking::HttpConnector) talks to a real
//! server; [`MockConnector`](crate::mock::MockConnector) replays canned
//! responses in tests.

use std::fmt;

use http::{HeaderName, HeaderValue, Method};

use crate::error::TransportError;

/// How the request body is framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestBody {
    /// No body is sent.
    Empty,
    /// Exactly this many bytes are sent with a `Content-Length`.
    Sized(u64),
    /// The body is streamed until the source is exhausted.
    Chunked,
}

/// One outgoing request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Headers, in the order they are sent.
    pub headers: Vec<(HeaderName, HeaderValue)>,
    /// Body framing.
    pub body: RequestBody,
    /// Open a new connection instead of reusing a pooled one.
    pub fresh_connect: bool,
}

impl TransportRequest {
    /// A request without headers or body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: RequestBody::Empty,
            fresh_connect: false,
        }
    }

    /// Value of the first header called `name`, if it is valid text.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.as_str().eq_ignore_ascii_case(name))
            .and_then(|(_, v)| v.to_str().ok())
    }
}

/// The caller side of an exchange: where request bytes come from and where
/// response bytes go.
///
/// Each method returns the number of bytes consumed or produced. A header or
/// write callback that returns less than the length it was given aborts the
/// transfer, and so does a read error.
pub trait Exchange {
    /// Receive one raw response header line.
    fn on_header(&mut self, line: &[u8]) -> usize;

    /// Receive a chunk of the response body.
    fn on_write(&mut self, data: &[u8]) -> usize;

    /// Fill `dst` with request body bytes; `Ok(0)` signals the end of the
    /// body.
    fn on_read(&mut self, dst: &mut [u8]) -> std::io::Result<usize>;
}

/// Performs HTTP exchanges over one logical connection.
pub trait Transport: Send + fmt::Debug {
    /// Send `request` and stream the response into `exchange`.
    ///
    /// Non-2xx responses are not errors; the status line is delivered to the
    /// header callback like any other.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the request could not be sent, the
    /// response could not be read, or a callback aborted the transfer.
    fn perform(
        &mut self,
        request: &TransportRequest,
        exchange: &mut dyn Exchange,
    ) -> Result<(), TransportError>;

    /// Clear per-request state before the transport is reused.
    fn reset(&mut self) {}
}

/// Settings that require a new connection when they change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// HTTP proxy (`host:port` or a URL).
    pub proxy: Option<String>,
    /// Skip TLS certificate verification.
    pub accept_invalid_certs: bool,
}

/// Creates transports.
pub trait Connector: Send + Sync + fmt::Debug {
    /// Open a transport configured with `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Connect`] if the transport cannot be built.
    fn connect(&self, settings: &ConnectionSettings) -> Result<Box<dyn Transport>, TransportError>;
}
