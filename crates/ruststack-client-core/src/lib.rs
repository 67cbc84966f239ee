//! Request context and transport plumbing for the RustStack S3/SQS client.
//!
//! The S3 and queue clients build requests; this crate runs them. A
//! [`RequestContext`] holds credentials and per-connection settings and owns
//! one transport at a time, created through a [`Connector`]. Request and
//! response bytes move between the caller's [`IoBuf`](ruststack_iobuf::IoBuf)
//! and the transport through a [`BufferExchange`].
//!
//! # Modules
//!
//! - [`blocking`] - Blocking HTTP transport over `reqwest`
//! - [`config`] - Environment-driven client configuration
//! - [`context`] - Request context and connection lifecycle
//! - [`error`] - Client and transport error types
//! - [`exchange`] - Buffer/file wiring for request and response bodies
//! - [`mock`] - In-memory transport for tests
//! - [`transport`] - Transport and connector traits

pub mod blocking;
pub mod config;
pub mod context;
pub mod error;
pub mod exchange;
pub mod mock;
pub mod transport;

pub use blocking::{HttpConnector, HttpTransport};
pub use config::ClientConfig;
pub use context::{ByteRange, ConnectionState, RequestContext};
pub use error::{ClientError, ClientResult, ErrorKind, TransportError};
pub use exchange::{BodySink, BodySource, BufferExchange};
pub use mock::{MockConnector, MockResponse, RecordedRequest};
pub use transport::{
    ConnectionSettings, Connector, Exchange, RequestBody, Transport, TransportRequest,
};
