//! Client error types.
//!
//! A request that completes at the HTTP level returns `Ok(())` whatever its
//! status code; the code and status text are recorded on the buffer. Errors
//! are reserved for requests that could not be issued or completed.

use std::path::PathBuf;

use ruststack_iobuf::IoBufError;
use ruststack_sigv2::AuthError;

/// Transport-level failures.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The transport could not be created or configured.
    #[error("Failed to set up connection: {0}")]
    Connect(String),

    /// The HTTP exchange failed (DNS, TCP, TLS or protocol error).
    #[error("HTTP exchange failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Local I/O failed while moving body bytes.
    #[error("I/O error during transfer: {0}")]
    Io(#[from] std::io::Error),

    /// The request body ended before its declared length.
    #[error("Request body ended after {actual} of {expected} bytes")]
    ShortBody {
        /// Declared `Content-Length`.
        expected: u64,
        /// Bytes the source produced.
        actual: u64,
    },

    /// A callback consumed fewer bytes than offered.
    #[error("Transfer aborted by {stage} callback")]
    Aborted {
        /// Which callback stopped the transfer (`"header"` or `"write"`).
        stage: &'static str,
    },
}

/// Broad classification of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller combined options that cannot work together.
    Usage,
    /// The request could not be sent or its response not received.
    Transport,
    /// Memory for the response could not be obtained.
    ResourceExhausted,
    /// Credentials are missing or could not be loaded.
    Credentials,
}

/// Errors returned by client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A byte range on a write requires EMC extensions.
    #[error("A byte range on PUT/POST requires EMC extensions")]
    ByteRangeRequiresEmc,

    /// An append range was requested on a read.
    #[error("Append range is only valid on writes")]
    AppendRangeOnRead,

    /// The byte range ends past `u64::MAX`.
    #[error("Byte range of {length} bytes at offset {offset} overflows")]
    InvalidByteRange {
        /// First byte.
        offset: u64,
        /// Number of bytes.
        length: u64,
    },

    /// The request must be signed but no credentials are configured.
    #[error("Request requires a signature but no credentials are configured")]
    MissingSignature,

    /// EMC and Scality extensions were both requested.
    #[error("EMC and Scality extensions are mutually exclusive")]
    ConflictingExtensions,

    /// Connection settings changed while a request is running.
    #[error("Connection settings cannot change while a request is in flight")]
    RequestInFlight,

    /// A header value could not be sent.
    #[error("Invalid value for header {name}: {value:?}")]
    InvalidHeader {
        /// Header name.
        name: String,
        /// Rejected value.
        value: String,
    },

    /// A local source or destination file could not be used.
    #[error("Cannot use file {path}: {source}")]
    File {
        /// Path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Transport failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Credential loading failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The response buffer could not grow.
    #[error(transparent)]
    Buffer(#[from] IoBufError),
}

impl ClientError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ByteRangeRequiresEmc
            | Self::AppendRangeOnRead
            | Self::InvalidByteRange { .. }
            | Self::ConflictingExtensions
            | Self::RequestInFlight
            | Self::MissingSignature
            | Self::InvalidHeader { .. }
            | Self::File { .. } => ErrorKind::Usage,
            Self::Auth(_) => ErrorKind::Credentials,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Buffer(_) => ErrorKind::ResourceExhausted,
        }
    }
}

/// Convenience result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
